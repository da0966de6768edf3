use clap::Parser;
use site_score::{AnalysisMode, Analyzer, AnalyzerConfig, IssueType, Progress, RetrieverConfig};
use std::error::Error;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// URL to analyze
    #[arg(short, long)]
    url: String,

    /// Render with a browser at this WebDriver URL instead of a plain fetch
    #[arg(short, long)]
    webdriver_url: Option<String>,

    /// Run the three-step quick analysis
    #[arg(short, long)]
    quick: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize logger
    env_logger::init();

    // Parse command line arguments
    let args = Args::parse();

    // Plain fetch unless a browser was asked for
    let retriever = match args.webdriver_url {
        Some(webdriver_url) => RetrieverConfig {
            webdriver_url,
            ..RetrieverConfig::default()
        },
        None => RetrieverConfig {
            constrained_hosting: true,
            ..RetrieverConfig::default()
        },
    };
    let config = AnalyzerConfig {
        retriever,
        mode: if args.quick {
            AnalysisMode::Quick
        } else {
            AnalysisMode::Full
        },
        ..AnalyzerConfig::default()
    };

    println!("Analyzing {} ({:?} plan)", args.url, config.retriever.plan());

    let analyzer = Analyzer::new(config);
    let on_progress = |p: Progress| println!("  [{:>3}%] {}", p.progress, p.message);
    let result = analyzer.analyze(&args.url, Some(&on_progress)).await?;

    println!("\n{} ({})", result.title, result.domain);
    println!("  SEO:         {}", result.seo_score);
    println!("  AI:          {}", result.ai_score);
    println!("  Performance: {}", result.performance_score);

    for kind in [IssueType::Error, IssueType::Warning, IssueType::Info] {
        for issue in result.issues_of(kind) {
            println!("  {:?}: {} ({})", kind, issue.message, issue.suggestion);
        }
    }

    println!("\nFinished in {}ms", result.duration);

    Ok(())
}
