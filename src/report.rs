use crate::results::{Heading, Image};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Validity flags for the common meta tags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaTagChecks {
    pub title: bool,
    pub description: bool,
    pub keywords: bool,
    pub og_tags: bool,
    pub twitter_tags: bool,
}

impl MetaTagChecks {
    /// Number of flags that are true
    pub fn passed(&self) -> usize {
        self.as_array().iter().filter(|b| **b).count()
    }

    pub fn as_array(&self) -> [bool; 5] {
        [
            self.title,
            self.description,
            self.keywords,
            self.og_tags,
            self.twitter_tags,
        ]
    }
}

/// What the page declares through JSON-LD
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredDataSummary {
    pub has_json_ld: bool,
    /// `@type` values in document order, duplicates kept
    pub schemas: Vec<String>,
    pub article_schema: bool,
    pub organization_schema: bool,
    pub faq_schema: bool,
    pub json_ld_data: Vec<Value>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoreWebVitals {
    /// First Contentful Paint (ms)
    pub fcp: f64,
    /// Largest Contentful Paint (ms), always estimated
    pub lcp: f64,
    /// Cumulative Layout Shift
    pub cls: f64,
    /// CLS came from a configured estimate, not a measurement
    pub cls_estimated: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSummary {
    pub load_time: u64,
    /// Percentage of images with alt text, 0 to 100
    pub image_optimization: f64,
    pub core_web_vitals: CoreWebVitals,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiOptimization {
    pub has_headings: bool,
    pub has_structured_content: bool,
    pub has_summary: bool,
    pub readability_score: u8,
}

/// Raw material kept for drill-down views, not used in scoring
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedData {
    pub headings: Vec<Heading>,
    pub images: Vec<Image>,
    pub total_words: usize,
    pub avg_sentence_length: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueType {
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueCategory {
    Seo,
    Performance,
    Ai,
    Technical,
}

/// A single problem found on the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    #[serde(rename = "type")]
    pub kind: IssueType,
    pub category: IssueCategory,
    pub message: String,
    pub suggestion: String,
}

impl Issue {
    pub fn new(
        kind: IssueType,
        category: IssueCategory,
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            category,
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }
}

/// Lifecycle of a stored report
///
/// The analyzer only ever returns `Completed` results. The other states
/// belong to the same record format, for callers that persist a report
/// before a run finishes or after it fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisStatus {
    Analyzing,
    #[default]
    Completed,
    Failed,
}

/// The finished report for one URL
///
/// Built once per successful run and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub id: String,
    pub url: String,
    /// Host without a leading `www.`
    pub domain: String,
    pub title: String,
    pub description: String,

    pub seo_score: u8,
    pub ai_score: u8,
    pub performance_score: u8,

    pub meta_tags: MetaTagChecks,
    pub structured_data: StructuredDataSummary,
    pub performance: PerformanceSummary,
    pub ai_optimization: AiOptimization,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub detailed_data: Option<DetailedData>,

    pub issues: Vec<Issue>,

    pub status: AnalysisStatus,
    pub analyzed_at: DateTime<Utc>,
    /// Wall-clock time of the whole run (ms)
    pub duration: u64,
}

impl AnalysisResult {
    /// The subset of the report the suggestion generator consumes
    pub fn suggestion_input(&self) -> SuggestionInput {
        SuggestionInput {
            title: self.title.clone(),
            description: self.description.clone(),
            url: self.url.clone(),
            structured_data: self.structured_data.clone(),
            ai_optimization: self.ai_optimization,
        }
    }

    /// Issues of a given severity, in report order
    pub fn issues_of(&self, kind: IssueType) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(move |i| i.kind == kind)
    }
}

/// Input for the external suggestion generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionInput {
    pub title: String,
    pub description: String,
    pub url: String,
    pub structured_data: StructuredDataSummary,
    pub ai_optimization: AiOptimization,
}
