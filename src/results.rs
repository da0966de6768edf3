use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A heading element (`h1`..`h6`) found on the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    /// Heading level, 1 through 6
    pub level: u8,
    /// Trimmed text content
    pub text: String,
}

/// An image with a non-empty `src`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub src: String,
    /// Alt text, empty when the attribute is missing
    pub alt: String,
}

/// An anchor with both an href and visible text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub href: String,
    pub text: String,
}

/// Navigation and paint timings read from a real browser timeline (ms)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetrics {
    #[serde(default)]
    pub dom_content_loaded: f64,
    #[serde(default)]
    pub load_complete: f64,
    #[serde(default)]
    pub first_paint: f64,
    #[serde(default)]
    pub first_contentful_paint: f64,
}

/// Everything the retriever learned about one page
///
/// A document either carries `error` or has its content fields populated,
/// never both. Failed documents must not be scored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageDocument {
    /// URL of the page
    pub url: String,

    /// Full markup, empty on failure
    pub html: String,

    pub title: String,

    /// Meta description, falling back to `og:description`
    pub description: String,

    /// Headings in document order
    pub headings: Vec<Heading>,

    pub images: Vec<Image>,

    pub links: Vec<Link>,

    /// Meta `name`/`property` to content, later duplicates overwrite earlier ones
    pub meta_tags: BTreeMap<String, String>,

    /// One entry per JSON-LD block that parsed
    pub json_ld_data: Vec<Value>,

    /// Milliseconds from navigation start until content was ready
    pub load_time: u64,

    /// Only present when a browser timeline was available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance_metrics: Option<PerformanceMetrics>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Set by the direct-fetch path when the page looks client-rendered
    #[serde(rename = "isSPA", skip_serializing_if = "Option::is_none")]
    pub is_spa: Option<bool>,
}

impl PageDocument {
    /// Create the error-only form of a document
    pub fn failed(url: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            error: Some(error.into()),
            ..Self::default()
        }
    }

    /// Returns true if retrieval failed
    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }

    /// Shorthand for looking up a meta tag by name or property
    pub fn meta(&self, name: &str) -> Option<&str> {
        self.meta_tags.get(name).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_document_has_only_error_and_url() {
        let doc = PageDocument::failed("https://example.com", "HTTP 500: Internal Server Error");
        assert!(doc.is_failed());
        assert_eq!(doc.url, "https://example.com");
        assert!(doc.html.is_empty());
        assert!(doc.headings.is_empty());
        assert_eq!(doc.load_time, 0);
        assert!(doc.performance_metrics.is_none());
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let mut doc = PageDocument {
            url: "https://example.com".to_string(),
            is_spa: Some(true),
            ..PageDocument::default()
        };
        doc.meta_tags
            .insert("og:title".to_string(), "Example".to_string());

        let json = serde_json::to_value(&doc).unwrap();
        assert!(json.get("metaTags").is_some());
        assert!(json.get("jsonLdData").is_some());
        assert_eq!(json["isSPA"], Value::Bool(true));
        assert!(json.get("error").is_none());
    }
}
