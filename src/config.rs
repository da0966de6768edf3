use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Which retrieval strategies an analysis may use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyPlan {
    /// Plain HTTP GET only
    FetchOnly,
    /// Headless browser first, one HTTP GET retry if it fails
    RenderWithFallback,
}

/// How Cumulative Layout Shift is filled in when nothing measured it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ClsEstimate {
    /// Always report this value
    Fixed { value: f64 },
    /// A bounded random value in `[0, 0.15)`, matching the legacy behaviour
    Random,
}

impl Default for ClsEstimate {
    fn default() -> Self {
        ClsEstimate::Fixed { value: 0.0 }
    }
}

/// Browser viewport used by the render strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

/// Configuration for the retriever
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrieverConfig {
    /// Hosting enforces execution-time limits, so never launch a browser
    #[serde(default)]
    pub constrained_hosting: bool,

    /// Local development, prefer the fast fetch path
    #[serde(default)]
    pub development: bool,

    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Upper bound on browser navigation
    #[serde(default = "default_navigation_timeout_ms")]
    pub navigation_timeout_ms: u64,

    /// Upper bound on any other single browser command (source, scripts, close)
    #[serde(default = "default_command_timeout_ms")]
    pub command_timeout_ms: u64,

    /// Upper bound on creating a browser session
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Grace period after navigation for deferred scripts
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    /// Upper bound on the direct HTTP fetch
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_accept_language")]
    pub accept_language: String,

    #[serde(default)]
    pub viewport: Viewport,

    #[serde(default)]
    pub cls_estimate: ClsEstimate,
}

/// Default value for webdriver_url
fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_navigation_timeout_ms() -> u64 {
    20_000
}

fn default_command_timeout_ms() -> u64 {
    10_000
}

/// Cold browser starts are slow, so this is longer than navigation
fn default_connect_timeout_ms() -> u64 {
    30_000
}

fn default_settle_delay_ms() -> u64 {
    2_000
}

fn default_fetch_timeout_ms() -> u64 {
    30_000
}

/// A desktop Chrome user agent, so bot filters serve the normal page
fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string()
}

fn default_accept_language() -> String {
    "en-US,en;q=0.9".to_string()
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        Self {
            constrained_hosting: false,
            development: false,
            webdriver_url: default_webdriver_url(),
            navigation_timeout_ms: default_navigation_timeout_ms(),
            command_timeout_ms: default_command_timeout_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
            settle_delay_ms: default_settle_delay_ms(),
            fetch_timeout_ms: default_fetch_timeout_ms(),
            user_agent: default_user_agent(),
            accept_language: default_accept_language(),
            viewport: Viewport::default(),
            cls_estimate: ClsEstimate::default(),
        }
    }
}

impl RetrieverConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Build a configuration from process environment variables
    ///
    /// Only the binary should call this; library code takes the config
    /// it is handed.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let is_set = |key: &str| lookup(key).is_some_and(|v| !v.is_empty() && v != "0");
        let mut config = Self::default();

        config.constrained_hosting = is_set("SITE_SCORE_CONSTRAINED")
            || is_set("VERCEL")
            || is_set("AWS_LAMBDA_FUNCTION_NAME");

        config.development = ["APP_ENV", "NODE_ENV"]
            .iter()
            .any(|key| lookup(key).is_some_and(|v| v == "development"));

        // Override the WebDriver URL with an environment variable if provided
        if let Some(webdriver_url) = lookup("WEBDRIVER_URL") {
            if !webdriver_url.is_empty() {
                config.webdriver_url = webdriver_url;
            }
        }

        config
    }

    /// Pick the strategy plan for this environment
    pub fn plan(&self) -> StrategyPlan {
        if self.constrained_hosting || self.development {
            StrategyPlan::FetchOnly
        } else {
            StrategyPlan::RenderWithFallback
        }
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    /// Reject values that would leave a suspension unbounded
    pub fn validate(&self) -> Result<(), ConfigError> {
        let timeouts = [
            ("navigation_timeout_ms", self.navigation_timeout_ms),
            ("command_timeout_ms", self.command_timeout_ms),
            ("connect_timeout_ms", self.connect_timeout_ms),
            ("fetch_timeout_ms", self.fetch_timeout_ms),
        ];
        for (name, value) in timeouts {
            if value == 0 {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be greater than zero"
                )));
            }
        }
        if let ClsEstimate::Fixed { value } = self.cls_estimate {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "cls_estimate value {value} is outside [0, 1]"
                )));
            }
        }
        Ok(())
    }
}

/// Which pipeline an analysis runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnalysisMode {
    /// Every progress checkpoint, optionally paced for a UI
    #[default]
    Full,
    /// Crawl and score with three checkpoints and no pacing
    Quick,
}

/// Configuration for the whole analysis pipeline
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    #[serde(default)]
    pub retriever: RetrieverConfig,

    /// Insert the short fixed delays between progress checkpoints
    #[serde(default)]
    pub pace_progress: bool,

    #[serde(default)]
    pub mode: AnalysisMode,
}

impl AnalyzerConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.retriever.validate()?;
        Ok(config)
    }
}
