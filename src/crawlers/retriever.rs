use crate::config::{RetrieverConfig, StrategyPlan};
use crate::crawlers::{FetchSource, PageSource, RenderSource};
use crate::error::normalize_error;
use crate::results::PageDocument;
use std::sync::Arc;

/// Picks a retrieval strategy and falls back when the browser fails
///
/// `retrieve` never returns an error: failures end up in
/// [`PageDocument::error`] for the caller to act on.
#[derive(Clone)]
pub struct Retriever {
    plan: StrategyPlan,
    render: Arc<dyn PageSource>,
    fetch: Arc<dyn PageSource>,
}

impl std::fmt::Debug for Retriever {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Retriever")
            .field("plan", &self.plan)
            .field("render", &self.render.name())
            .field("fetch", &self.fetch.name())
            .finish()
    }
}

impl Retriever {
    /// Build the default browser and HTTP strategies from configuration
    pub fn new(config: &RetrieverConfig) -> Self {
        Self::with_sources(
            config.plan(),
            Arc::new(RenderSource::new(config)),
            Arc::new(FetchSource::new(config)),
        )
    }

    /// Use explicit strategies, mainly for tests and custom backends
    pub fn with_sources(
        plan: StrategyPlan,
        render: Arc<dyn PageSource>,
        fetch: Arc<dyn PageSource>,
    ) -> Self {
        Self {
            plan,
            render,
            fetch,
        }
    }

    pub fn plan(&self) -> StrategyPlan {
        self.plan
    }

    /// Retrieve a page, encoding any failure in the returned document
    pub async fn retrieve(&self, url: &str) -> PageDocument {
        match self.plan {
            StrategyPlan::FetchOnly => {
                ::log::info!("Retrieving {} with {}", url, self.fetch.name());
                self.fetch_or_fail(url).await
            }
            StrategyPlan::RenderWithFallback => {
                ::log::info!("Retrieving {} with {}", url, self.render.name());
                match self.render.fetch_page(url).await {
                    Ok(doc) => doc,
                    Err(e) => {
                        ::log::warn!(
                            "{} strategy failed for {}: {}; retrying with {}",
                            self.render.name(),
                            url,
                            e,
                            self.fetch.name()
                        );
                        self.fetch_or_fail(url).await
                    }
                }
            }
        }
    }

    async fn fetch_or_fail(&self, url: &str) -> PageDocument {
        match self.fetch.fetch_page(url).await {
            Ok(doc) => doc,
            Err(e) => {
                let message = normalize_error(&e);
                ::log::error!("Could not retrieve {}: {}", url, message);
                PageDocument::failed(url, message)
            }
        }
    }
}
