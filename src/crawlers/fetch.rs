use crate::config::RetrieverConfig;
use crate::crawlers::PageSource;
use crate::error::RetrieveError;
use crate::parsers;
use crate::parsers::spa::{MarkerSpaDetector, SpaDetector};
use crate::results::PageDocument;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";

/// Direct-fetch strategy: one HTTP GET, no script execution
#[derive(Clone)]
pub struct FetchSource {
    user_agent: String,
    accept_language: String,
    timeout: Duration,
    spa_detector: Arc<dyn SpaDetector>,
}

impl std::fmt::Debug for FetchSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchSource")
            .field("user_agent", &self.user_agent)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl FetchSource {
    pub fn new(config: &RetrieverConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            accept_language: config.accept_language.clone(),
            timeout: config.fetch_timeout(),
            spa_detector: Arc::new(MarkerSpaDetector),
        }
    }

    /// Replace the client-rendering heuristic
    pub fn with_spa_detector(mut self, detector: Arc<dyn SpaDetector>) -> Self {
        self.spa_detector = detector;
        self
    }

    /// Builds a client for one request with browser-like default headers
    fn build_client(&self) -> Result<Client, RetrieveError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
        if let Ok(lang) = HeaderValue::from_str(&self.accept_language) {
            headers.insert(ACCEPT_LANGUAGE, lang);
        }
        headers.insert("dnt", HeaderValue::from_static("1"));
        headers.insert("upgrade-insecure-requests", HeaderValue::from_static("1"));

        Client::builder()
            .user_agent(self.user_agent.as_str())
            .default_headers(headers)
            .gzip(true)
            .build()
            .map_err(|e| RetrieveError::Client(e.to_string()))
    }

    /// GET the page and read the body, returning the final URL too
    async fn download(&self, client: &Client, url: &str) -> Result<(String, String), RetrieveError> {
        let response = client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(RetrieveError::Http {
                status: status.as_u16(),
                reason: reason_phrase(status),
            });
        }

        let final_url = response.url().to_string();
        let body = response.text().await?;
        Ok((final_url, body))
    }
}

fn reason_phrase(status: StatusCode) -> String {
    status
        .canonical_reason()
        .unwrap_or("Unknown Status")
        .to_string()
}

#[async_trait]
impl PageSource for FetchSource {
    fn name(&self) -> &'static str {
        "fetch"
    }

    async fn fetch_page(&self, url: &str) -> Result<PageDocument, RetrieveError> {
        ::log::debug!("FETCH: {}", url);
        let client = self.build_client()?;
        let start = Instant::now();

        // Cancelled by the deadline task; dropping the download future aborts the request
        let cancel = CancellationToken::new();
        let deadline = {
            let cancel = cancel.clone();
            let limit = self.timeout;
            tokio::spawn(async move {
                tokio::time::sleep(limit).await;
                cancel.cancel();
            })
        };

        let outcome = tokio::select! {
            _ = cancel.cancelled() => Err(RetrieveError::Timeout {
                after_ms: self.timeout.as_millis() as u64,
            }),
            result = self.download(&client, url) => result,
        };
        deadline.abort();

        let (final_url, html) = match outcome {
            Ok(ok) => ok,
            Err(e) => {
                ::log::error!("Fetch failed for {}: {}", url, e);
                return Err(e);
            }
        };

        let load_time = start.elapsed().as_millis() as u64;
        ::log::info!("Fetched {} in {}ms ({} bytes)", url, load_time, html.len());

        let extracted = parsers::extract(&html);
        let is_spa = self
            .spa_detector
            .looks_client_rendered(&html, &extracted.title);

        if is_spa {
            ::log::warn!(
                "{} looks client-rendered; content from a plain fetch may be incomplete",
                url
            );
        }

        let mut doc = extracted.into_document(&final_url, html, load_time);
        doc.is_spa = Some(is_spa);

        Ok(doc)
    }
}
