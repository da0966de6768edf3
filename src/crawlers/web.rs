use crate::config::{RetrieverConfig, Viewport};
use crate::crawlers::PageSource;
use crate::error::RetrieveError;
use crate::parsers;
use crate::results::{PageDocument, PerformanceMetrics};
use async_trait::async_trait;
use fantoccini::error::CmdError;
use fantoccini::{Client, ClientBuilder};
use serde_json::{Map, Value, json};
use std::time::{Duration, Instant};
use tokio::time::timeout;

/// Reads navigation and paint timings from the browser's performance timeline
const TIMING_SCRIPT: &str = r#"
const nav = performance.getEntriesByType('navigation')[0];
const paint = (name) => {
    const entry = performance.getEntriesByName(name)[0];
    return entry ? entry.startTime : 0;
};
return {
    domContentLoaded: nav ? nav.domContentLoadedEventEnd - nav.domContentLoadedEventStart : 0,
    loadComplete: nav ? nav.loadEventEnd - nav.loadEventStart : 0,
    firstPaint: paint('first-paint'),
    firstContentfulPaint: paint('first-contentful-paint'),
};
"#;

/// Alternatives tried when the configured WebDriver endpoint refuses a session
const FALLBACK_WEBDRIVER_URLS: &[&str] = &[
    "http://localhost:9515", // ChromeDriver default
    "http://127.0.0.1:4444",
];

/// Full-render strategy: a fresh headless browser session per page
#[derive(Debug, Clone)]
pub struct RenderSource {
    webdriver_url: String,
    navigation_timeout: Duration,
    command_timeout: Duration,
    connect_timeout: Duration,
    settle_delay: Duration,
    user_agent: String,
    viewport: Viewport,
}

impl RenderSource {
    pub fn new(config: &RetrieverConfig) -> Self {
        Self {
            webdriver_url: config.webdriver_url.clone(),
            navigation_timeout: config.navigation_timeout(),
            command_timeout: config.command_timeout(),
            connect_timeout: config.connect_timeout(),
            settle_delay: config.settle_delay(),
            user_agent: config.user_agent.clone(),
            viewport: config.viewport,
        }
    }

    /// Headless Chrome capabilities for an isolated session
    fn capabilities(&self) -> Map<String, Value> {
        let args = vec![
            "--headless".to_string(),
            "--no-sandbox".to_string(),
            "--disable-setuid-sandbox".to_string(),
            "--disable-dev-shm-usage".to_string(),
            "--disable-accelerated-2d-canvas".to_string(),
            "--disable-gpu".to_string(),
            format!(
                "--window-size={},{}",
                self.viewport.width, self.viewport.height
            ),
            format!("--user-agent={}", self.user_agent),
        ];

        let mut caps = Map::new();
        caps.insert("browserName".to_string(), json!("chrome"));
        caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
        // Driver-side limits matching ours
        caps.insert(
            "timeouts".to_string(),
            json!({
                "pageLoad": millis(self.navigation_timeout),
                "script": millis(self.command_timeout),
            }),
        );
        caps
    }

    async fn connect_to(&self, webdriver_url: &str) -> Result<Client, RetrieveError> {
        let mut builder = ClientBuilder::native();
        builder.capabilities(self.capabilities());

        // A session the driver creates after this deadline is deleted by
        // fantoccini's session task once the handshake completes
        match timeout(self.connect_timeout, builder.connect(webdriver_url)).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(RetrieveError::Timeout {
                after_ms: millis(self.connect_timeout),
            }),
        }
    }

    /// Connects to the WebDriver instance, trying common alternatives on failure
    async fn connect(&self) -> Result<Client, RetrieveError> {
        let first_error = match self.connect_to(&self.webdriver_url).await {
            Ok(client) => {
                ::log::debug!("Connected to WebDriver at {}", self.webdriver_url);
                return Ok(client);
            }
            Err(e) => {
                ::log::error!(
                    "Failed to connect to WebDriver at {}: {}",
                    self.webdriver_url,
                    e
                );
                e
            }
        };

        for url in FALLBACK_WEBDRIVER_URLS {
            if *url == self.webdriver_url {
                continue;
            }
            ::log::info!("Trying fallback WebDriver URL: {}", url);
            if let Ok(client) = self.connect_to(url).await {
                ::log::debug!("Connected to fallback WebDriver at {}", url);
                return Ok(client);
            }
        }

        ::log::error!(
            "Make sure a WebDriver server is running or set the WEBDRIVER_URL environment variable"
        );
        Err(first_error)
    }

    /// Navigate, let deferred scripts settle, then read the DOM and timings
    async fn render(&self, client: &Client, url: &str) -> Result<PageDocument, RetrieveError> {
        let start = Instant::now();
        ::log::debug!("RENDER: {}", url);

        bounded(self.navigation_timeout, client.goto(url), "navigating to", url).await?;

        let load_time = start.elapsed().as_millis() as u64;
        ::log::info!("Loaded {} in {}ms", url, load_time);

        tokio::time::sleep(self.settle_delay).await;

        let html = bounded(
            self.command_timeout,
            client.source(),
            "getting source for",
            url,
        )
        .await?;

        let final_url = match timeout(self.command_timeout, client.current_url()).await {
            Ok(Ok(current)) => current.to_string(),
            _ => url.to_string(),
        };

        let performance_metrics = self.read_timings(client, url).await;

        let mut doc = parsers::extract(&html).into_document(&final_url, html, load_time);
        doc.performance_metrics = performance_metrics;

        ::log::debug!(
            "Rendered {} in {:.2} seconds",
            url,
            start.elapsed().as_secs_f64()
        );

        Ok(doc)
    }

    /// Read the navigation timeline, tolerating browsers that lack it
    async fn read_timings(&self, client: &Client, url: &str) -> Option<PerformanceMetrics> {
        let value = match timeout(
            self.command_timeout,
            client.execute(TIMING_SCRIPT, Vec::new()),
        )
        .await
        {
            Ok(Ok(value)) => value,
            Ok(Err(e)) => {
                ::log::warn!("Could not read performance timings for {}: {}", url, e);
                return None;
            }
            Err(_) => {
                ::log::warn!("Timeout reading performance timings for {}", url);
                return None;
            }
        };

        match serde_json::from_value::<PerformanceMetrics>(value) {
            Ok(metrics) => Some(metrics),
            Err(e) => {
                ::log::warn!("Unexpected performance timing shape: {}", e);
                None
            }
        }
    }

    /// End the session without waiting longer than one command
    async fn release(&self, client: Client, url: &str) {
        match timeout(self.command_timeout, client.close()).await {
            Ok(Ok(())) => ::log::debug!("Closed WebDriver session for {}", url),
            Ok(Err(e)) => ::log::warn!("Failed to close WebDriver session for {}: {}", url, e),
            // The shutdown stays queued and is sent once the stuck command returns
            Err(_) => ::log::warn!(
                "Timeout closing WebDriver session for {}, it will close in the background",
                url
            ),
        }
    }
}

#[async_trait]
impl PageSource for RenderSource {
    fn name(&self) -> &'static str {
        "render"
    }

    async fn fetch_page(&self, url: &str) -> Result<PageDocument, RetrieveError> {
        let client = self.connect().await?;

        let result = self.render(&client, url).await;

        // The session is released on every path, including render failures
        self.release(client, url).await;

        result
    }
}

/// Run one session command, giving up after `limit`
async fn bounded<T, F>(
    limit: Duration,
    command: F,
    context: &str,
    url: &str,
) -> Result<T, RetrieveError>
where
    F: Future<Output = Result<T, CmdError>>,
{
    match timeout(limit, command).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(navigation_error(e, context, url, limit)),
        Err(_) => {
            ::log::error!("Timeout {} {}", context, url);
            Err(RetrieveError::Timeout {
                after_ms: millis(limit),
            })
        }
    }
}

fn millis(duration: Duration) -> u64 {
    duration.as_millis() as u64
}

/// Handles errors that occur during navigation or page source retrieval
fn navigation_error(error: CmdError, context: &str, url: &str, limit: Duration) -> RetrieveError {
    if error.is_timeout() || error.is_script_timeout() {
        ::log::error!("Browser timed out {} {}", context, url);
        return RetrieveError::Timeout {
            after_ms: millis(limit),
        };
    }
    if error.to_string().contains("Unable to find session") {
        ::log::warn!("Lost session while {} {}", context, url);
    } else {
        ::log::error!("Failed {} {}: {}", context, url, error);
    }
    RetrieveError::from(error)
}
