use thiserror::Error;

/// Failure of a single retrieval strategy
///
/// These never leave the retriever; they are flattened into
/// `PageDocument::error` by [`normalize_error`].
#[derive(Debug, Error)]
pub enum RetrieveError {
    #[error("HTTP {status}: {reason}")]
    Http { status: u16, reason: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Timed out after {after_ms}ms")]
    Timeout { after_ms: u64 },

    #[error("WebDriver session error: {0}")]
    WebDriver(String),

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("HTTP client error: {0}")]
    Client(String),
}

impl From<reqwest::Error> for RetrieveError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RetrieveError::Network("request timed out".to_string())
        } else if err.is_connect() {
            RetrieveError::Network(format!("connection failed: {err}"))
        } else if err.is_builder() {
            RetrieveError::Client(err.to_string())
        } else {
            RetrieveError::Network(err.to_string())
        }
    }
}

impl From<fantoccini::error::NewSessionError> for RetrieveError {
    fn from(err: fantoccini::error::NewSessionError) -> Self {
        RetrieveError::WebDriver(err.to_string())
    }
}

impl From<fantoccini::error::CmdError> for RetrieveError {
    fn from(err: fantoccini::error::CmdError) -> Self {
        RetrieveError::Browser(err.to_string())
    }
}

/// The single error an analysis can end with
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Both retrieval strategies failed, or the only allowed one did
    #[error("Analysis failed: {0}")]
    Retrieval(String),

    /// Same as `Retrieval`, raised by the quick analysis mode
    #[error("Quick analysis failed: {0}")]
    QuickRetrieval(String),
}

/// Errors loading a configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Turn any error into the plain message stored on a failed document
pub fn normalize_error(error: &dyn std::error::Error) -> String {
    let message = error.to_string();
    if message.trim().is_empty() {
        "An unknown error occurred".to_string()
    } else {
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_message_includes_status() {
        let err = RetrieveError::Http {
            status: 404,
            reason: "Not Found".to_string(),
        };
        assert_eq!(normalize_error(&err), "HTTP 404: Not Found");
    }

    #[test]
    fn analysis_error_is_user_displayable() {
        let err = AnalysisError::Retrieval("HTTP 503: Service Unavailable".to_string());
        assert_eq!(
            err.to_string(),
            "Analysis failed: HTTP 503: Service Unavailable"
        );

        let err = AnalysisError::QuickRetrieval("Timed out after 30000ms".to_string());
        assert_eq!(
            err.to_string(),
            "Quick analysis failed: Timed out after 30000ms"
        );
    }

    #[test]
    fn empty_message_gets_placeholder() {
        let err = RetrieveError::Network(String::new());
        assert_eq!(normalize_error(&err), "Network error: ");
        let err = std::io::Error::other("");
        assert_eq!(normalize_error(&err), "An unknown error occurred");
    }
}
