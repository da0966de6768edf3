use clap::Parser;
use serde::Serialize;
use site_score::utils::is_valid_url;
use site_score::{AnalysisMode, Analyzer, AnalyzerConfig, Progress, RetrieverConfig};
use std::process::ExitCode;

mod args;
use args::Args;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    env_logger::init();

    // Parse command-line arguments
    let args = Args::parse();

    if !is_valid_url(&args.url) {
        eprintln!("Invalid URL: {}", args.url);
        return ExitCode::FAILURE;
    }

    let config = match build_config(&args) {
        Ok(config) => config,
        Err(e) => {
            ::log::error!("Failed to load configuration: {}", e);
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    ::log::info!(
        "Analyzing {} (plan: {:?}, mode: {:?})",
        args.url,
        config.retriever.plan(),
        config.mode
    );

    let analyzer = Analyzer::new(config);
    let on_progress = |p: Progress| {
        ::log::info!("[{:>3}%] {}", p.progress, p.message);
    };

    let result = match analyzer.analyze(&args.url, Some(&on_progress)).await {
        Ok(result) => result,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let printed = if args.suggestion_input {
        print_json(&result.suggestion_input(), args.pretty)
    } else {
        print_json(&result, args.pretty)
    };

    match printed {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            ::log::error!("Failed to serialize result: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Config file if given, environment otherwise, then command-line overrides
fn build_config(args: &Args) -> Result<AnalyzerConfig, site_score::ConfigError> {
    let mut config = match &args.config {
        Some(path) => AnalyzerConfig::from_file(path)?,
        None => AnalyzerConfig {
            retriever: RetrieverConfig::from_env(),
            ..AnalyzerConfig::default()
        },
    };

    if args.fetch_only {
        // Same plan a constrained host gets
        config.retriever.constrained_hosting = true;
    }
    if let Some(url) = &args.webdriver_url {
        config.retriever.webdriver_url = url.clone();
    }
    if args.quick {
        config.mode = AnalysisMode::Quick;
    }
    if args.paced {
        config.pace_progress = true;
    }

    Ok(config)
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<(), serde_json::Error> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{json}");
    Ok(())
}
