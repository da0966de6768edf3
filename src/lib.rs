// Re-export modules
pub mod config;
pub mod crawlers;
pub mod error;
pub mod parsers;
pub mod pipeline;
pub mod report;
pub mod results;
pub mod scoring;
pub mod signals;
pub mod utils;

// Re-export commonly used types for convenience
pub use config::{AnalysisMode, AnalyzerConfig, ClsEstimate, RetrieverConfig, StrategyPlan};
pub use crawlers::{PageSource, Retriever};
pub use error::{AnalysisError, ConfigError, RetrieveError};
pub use pipeline::{Analyzer, Progress, ProgressFn, ProgressStep};
pub use report::{AnalysisResult, Issue, IssueCategory, IssueType, SuggestionInput};
pub use results::PageDocument;
