use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "site-score")]
#[command(about = "Scores a web page for SEO, AI readiness and performance")]
#[command(version)]
pub struct Args {
    /// Page to analyze (absolute http or https URL)
    pub url: String,

    /// JSON configuration file; environment defaults apply otherwise
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Never launch a browser, use a plain HTTP fetch
    #[arg(long)]
    pub fetch_only: bool,

    /// Run the quick analysis with fewer checkpoints
    #[arg(short, long)]
    pub quick: bool,

    /// Pace progress checkpoints with short fixed delays
    #[arg(long)]
    pub paced: bool,

    /// WebDriver endpoint for the render strategy
    #[arg(long)]
    pub webdriver_url: Option<String>,

    /// Pretty-print the JSON output
    #[arg(short, long)]
    pub pretty: bool,

    /// Print only the input for the suggestion generator
    #[arg(long)]
    pub suggestion_input: bool,
}
