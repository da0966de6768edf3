use crate::config::{AnalysisMode, AnalyzerConfig};
use crate::crawlers::Retriever;
use crate::error::AnalysisError;
use crate::report::{AnalysisResult, AnalysisStatus, DetailedData, PerformanceSummary};
use crate::results::PageDocument;
use crate::scoring::{self, Scorecard};
use crate::signals::{self, Signals};
use crate::utils::{extract_domain, generate_analysis_id};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Stage an analysis has reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProgressStep {
    Crawling,
    Parsing,
    SeoAnalysis,
    AiAnalysis,
    GeneratingSuggestions,
    Completed,
}

/// One progress checkpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub step: ProgressStep,
    /// Percentage, non-decreasing within one analysis
    pub progress: u8,
    pub message: String,
}

/// Observer called synchronously at each checkpoint
pub type ProgressFn = dyn Fn(Progress) + Send + Sync;

/// Runs retrieval, scoring and report assembly for one URL at a time
///
/// Holds no per-request state, so one instance can serve concurrent
/// analyses behind an `Arc`.
#[derive(Debug, Clone)]
pub struct Analyzer {
    config: AnalyzerConfig,
    retriever: Retriever,
}

impl Analyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        let retriever = Retriever::new(&config.retriever);
        Self { config, retriever }
    }

    /// Use a prepared retriever instead of building one from `config`
    pub fn with_retriever(config: AnalyzerConfig, retriever: Retriever) -> Self {
        Self { config, retriever }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Analyze `url` in the configured mode
    pub async fn analyze(
        &self,
        url: &str,
        progress: Option<&ProgressFn>,
    ) -> Result<AnalysisResult, AnalysisError> {
        match self.config.mode {
            AnalysisMode::Full => self.analyze_full(url, progress).await,
            AnalysisMode::Quick => self.analyze_quick(url, progress).await,
        }
    }

    async fn analyze_full(
        &self,
        url: &str,
        progress: Option<&ProgressFn>,
    ) -> Result<AnalysisResult, AnalysisError> {
        ::log::info!("Starting full analysis of {}", url);
        let started = Instant::now();

        report(progress, ProgressStep::Crawling, 5, "Validating URL...");
        self.pace(500).await;

        report(progress, ProgressStep::Crawling, 15, "Starting crawl...");
        let doc = self.retriever.retrieve(url).await;
        if let Some(message) = &doc.error {
            ::log::error!("Analysis of {} failed: {}", url, message);
            return Err(AnalysisError::Retrieval(message.clone()));
        }
        ::log::debug!(
            "Crawled {}: {} bytes, {} headings, {} images",
            doc.url,
            doc.html.len(),
            doc.headings.len(),
            doc.images.len()
        );

        report(progress, ProgressStep::Parsing, 40, "Analyzing HTML structure...");
        self.pace(800).await;

        report(progress, ProgressStep::SeoAnalysis, 65, "Analyzing SEO factors...");
        let signals = signals::derive_signals(&doc, self.config.retriever.cls_estimate);
        let card = scoring::score(&doc, &signals);
        self.pace(700).await;

        report(progress, ProgressStep::AiAnalysis, 85, "Analyzing AI optimization...");
        self.pace(600).await;

        report(
            progress,
            ProgressStep::GeneratingSuggestions,
            95,
            "Finalizing results...",
        );
        self.pace(300).await;

        report(progress, ProgressStep::Completed, 100, "Analysis complete!");

        let result = assemble(url, doc, signals, card, started);
        ::log::info!(
            "Analysis {} of {} finished in {}ms (seo={})",
            result.id,
            result.domain,
            result.duration,
            result.seo_score
        );
        Ok(result)
    }

    async fn analyze_quick(
        &self,
        url: &str,
        progress: Option<&ProgressFn>,
    ) -> Result<AnalysisResult, AnalysisError> {
        ::log::info!("Starting quick analysis of {}", url);
        let started = Instant::now();

        report(progress, ProgressStep::Crawling, 20, "Starting quick crawl...");
        let doc = self.retriever.retrieve(url).await;
        if let Some(message) = &doc.error {
            ::log::error!("Quick analysis of {} failed: {}", url, message);
            return Err(AnalysisError::QuickRetrieval(message.clone()));
        }

        report(
            progress,
            ProgressStep::SeoAnalysis,
            70,
            "Analyzing basic SEO factors...",
        );
        let signals = signals::derive_signals(&doc, self.config.retriever.cls_estimate);
        let card = scoring::score(&doc, &signals);

        report(progress, ProgressStep::Completed, 100, "Quick analysis complete!");

        Ok(assemble(url, doc, signals, card, started))
    }

    /// Fixed delay between checkpoints, only when pacing is enabled
    async fn pace(&self, ms: u64) {
        if self.config.pace_progress {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
    }
}

fn report(progress: Option<&ProgressFn>, step: ProgressStep, percent: u8, message: &str) {
    ::log::debug!("[{:>3}%] {:?}: {}", percent, step, message);
    if let Some(callback) = progress {
        callback(Progress {
            step,
            progress: percent,
            message: message.to_string(),
        });
    }
}

/// Build the final report; `url` is the address the caller asked for
fn assemble(
    url: &str,
    doc: PageDocument,
    signals: Signals,
    card: Scorecard,
    started: Instant,
) -> AnalysisResult {
    AnalysisResult {
        id: generate_analysis_id(),
        url: url.to_string(),
        domain: extract_domain(url),
        title: doc.title,
        description: doc.description,
        seo_score: card.seo_score,
        ai_score: card.ai_score,
        performance_score: card.performance_score,
        meta_tags: signals.meta_tags,
        structured_data: signals.structured_data,
        performance: PerformanceSummary {
            load_time: doc.load_time,
            image_optimization: signals.image_optimization,
            core_web_vitals: signals.core_web_vitals,
        },
        ai_optimization: signals.ai_optimization,
        detailed_data: Some(DetailedData {
            headings: doc.headings,
            images: doc.images,
            total_words: signals.text_stats.total_words,
            avg_sentence_length: signals.text_stats.avg_sentence_length,
        }),
        issues: card.issues,
        status: AnalysisStatus::Completed,
        analyzed_at: Utc::now(),
        duration: started.elapsed().as_millis() as u64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StrategyPlan;
    use crate::crawlers::PageSource;
    use crate::error::RetrieveError;
    use crate::parsers;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    const PAGE: &str = r#"<html><head>
        <title>Widgets and Gadgets</title>
        <meta name="description" content="Everything about widgets.">
        </head><body><h1>Widgets</h1><h2>Small</h2><h2>Large</h2>
        <img src="/w.png" alt="A widget"></body></html>"#;

    /// Serves `PAGE` as if redirected to a canonical URL
    struct Canned;

    #[async_trait]
    impl PageSource for Canned {
        fn name(&self) -> &'static str {
            "canned"
        }

        async fn fetch_page(&self, _url: &str) -> Result<PageDocument, RetrieveError> {
            Ok(parsers::extract(PAGE).into_document(
                "https://www.example.com/widgets/",
                PAGE.to_string(),
                900,
            ))
        }
    }

    struct NotFound;

    #[async_trait]
    impl PageSource for NotFound {
        fn name(&self) -> &'static str {
            "not-found"
        }

        async fn fetch_page(&self, _url: &str) -> Result<PageDocument, RetrieveError> {
            Err(RetrieveError::Http {
                status: 404,
                reason: "Not Found".to_string(),
            })
        }
    }

    fn analyzer(mode: AnalysisMode, source: Arc<dyn PageSource>) -> Analyzer {
        let config = AnalyzerConfig {
            mode,
            ..AnalyzerConfig::default()
        };
        let retriever = Retriever::with_sources(StrategyPlan::FetchOnly, source.clone(), source);
        Analyzer::with_retriever(config, retriever)
    }

    fn recorder() -> (Arc<Mutex<Vec<Progress>>>, impl Fn(Progress) + Send + Sync) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        (seen, move |p: Progress| sink.lock().unwrap().push(p))
    }

    #[tokio::test]
    async fn full_mode_reports_every_checkpoint() {
        let (seen, callback) = recorder();
        let result = analyzer(AnalysisMode::Full, Arc::new(Canned))
            .analyze("https://www.example.com/widgets", Some(&callback))
            .await
            .unwrap();

        let seen = seen.lock().unwrap();
        let percents: Vec<u8> = seen.iter().map(|p| p.progress).collect();
        assert_eq!(percents, vec![5, 15, 40, 65, 85, 95, 100]);
        assert_eq!(seen[0].step, ProgressStep::Crawling);
        assert_eq!(seen[4].step, ProgressStep::AiAnalysis);
        assert_eq!(seen.last().unwrap().step, ProgressStep::Completed);

        assert_eq!(result.status, AnalysisStatus::Completed);
        assert_eq!(result.title, "Widgets and Gadgets");
    }

    #[tokio::test]
    async fn quick_mode_reports_three_checkpoints() {
        let (seen, callback) = recorder();
        analyzer(AnalysisMode::Quick, Arc::new(Canned))
            .analyze("https://example.com", Some(&callback))
            .await
            .unwrap();

        let steps: Vec<(ProgressStep, u8)> = seen
            .lock()
            .unwrap()
            .iter()
            .map(|p| (p.step, p.progress))
            .collect();
        assert_eq!(
            steps,
            vec![
                (ProgressStep::Crawling, 20),
                (ProgressStep::SeoAnalysis, 70),
                (ProgressStep::Completed, 100),
            ]
        );
    }

    #[tokio::test]
    async fn result_keeps_requested_url() {
        let result = analyzer(AnalysisMode::Full, Arc::new(Canned))
            .analyze("https://www.example.com/widgets", None)
            .await
            .unwrap();

        assert_eq!(result.url, "https://www.example.com/widgets");
        assert_eq!(result.domain, "example.com");
        assert!(result.id.starts_with("analysis_"));
        assert_eq!(result.performance.load_time, 900);

        let detail = result.detailed_data.as_ref().unwrap();
        assert_eq!(detail.headings.len(), 3);
        assert_eq!(detail.images.len(), 1);
        assert!(detail.total_words > 0);
    }

    #[tokio::test]
    async fn retrieval_failure_aborts_with_message() {
        let (seen, callback) = recorder();
        let err = analyzer(AnalysisMode::Full, Arc::new(NotFound))
            .analyze("https://example.com/missing", Some(&callback))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Analysis failed: HTTP 404: Not Found");
        // Nothing past the crawl checkpoint is reported
        assert_eq!(seen.lock().unwrap().last().unwrap().progress, 15);
    }

    #[tokio::test]
    async fn quick_failure_uses_quick_prefix() {
        let err = analyzer(AnalysisMode::Quick, Arc::new(NotFound))
            .analyze("https://example.com/missing", None)
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::QuickRetrieval(_)));
        assert!(err.to_string().starts_with("Quick analysis failed: HTTP 404"));
    }

    #[test]
    fn progress_step_names() {
        let json = serde_json::to_string(&ProgressStep::GeneratingSuggestions).unwrap();
        assert_eq!(json, "\"generating-suggestions\"");
        let json = serde_json::to_string(&ProgressStep::SeoAnalysis).unwrap();
        assert_eq!(json, "\"seo-analysis\"");
    }

    #[test]
    fn analyzer_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Analyzer>();
    }
}
