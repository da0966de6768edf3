//! Measurements derived from a retrieved page.
//!
//! Everything here is a pure function of a [`PageDocument`]; the only
//! exception is the opt-in random CLS estimate.

use crate::config::ClsEstimate;
use crate::parsers::text::{self, TextStats};
use crate::report::{AiOptimization, CoreWebVitals, MetaTagChecks, StructuredDataSummary};
use crate::results::PageDocument;
use rand::Rng;
use serde_json::Value;

pub const MAX_TITLE_CHARS: usize = 60;
pub const MAX_DESCRIPTION_CHARS: usize = 160;
/// Descriptions longer than this count as a summary
pub const SUMMARY_MIN_CHARS: usize = 120;
pub const MIN_STRUCTURED_HEADINGS: usize = 3;

/// Intermediate measurements consumed by scoring and issue detection
#[derive(Debug, Clone, PartialEq)]
pub struct Signals {
    pub meta_tags: MetaTagChecks,
    pub structured_data: StructuredDataSummary,
    pub h1_count: usize,
    pub heading_structure_valid: bool,
    pub images_with_alt: usize,
    /// Percentage in `[0, 100]`
    pub image_optimization: f64,
    pub ai_optimization: AiOptimization,
    pub core_web_vitals: CoreWebVitals,
    pub text_stats: TextStats,
}

/// Derive every signal for a successfully retrieved document
pub fn derive_signals(doc: &PageDocument, cls: ClsEstimate) -> Signals {
    let content = content_text(doc);
    let heading_structure_valid = heading_structure_valid(doc);

    Signals {
        meta_tags: meta_tag_checks(doc),
        structured_data: structured_data_summary(&doc.json_ld_data),
        h1_count: h1_count(doc),
        heading_structure_valid,
        images_with_alt: images_with_alt(doc),
        image_optimization: image_optimization(doc),
        ai_optimization: ai_optimization(doc, heading_structure_valid, &content),
        core_web_vitals: core_web_vitals(doc, cls),
        text_stats: text::text_stats(&content),
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Length limits are hard cutoffs here even though issues only warn about them
pub fn meta_tag_checks(doc: &PageDocument) -> MetaTagChecks {
    let within = |key: &str, max: usize| {
        doc.meta(key)
            .is_some_and(|v| !v.is_empty() && char_len(v) <= max)
    };
    let present = |key: &str| doc.meta(key).is_some_and(|v| !v.is_empty());

    MetaTagChecks {
        title: within("title", MAX_TITLE_CHARS),
        description: within("description", MAX_DESCRIPTION_CHARS),
        keywords: present("keywords"),
        og_tags: present("og:title") && present("og:description") && present("og:image"),
        twitter_tags: present("twitter:card"),
    }
}

/// The `@type` values of one JSON-LD block
///
/// Array-valued types contribute each string member.
pub fn schema_types(block: &Value) -> Vec<String> {
    match block.get("@type") {
        Some(Value::String(t)) if !t.is_empty() => vec![t.clone()],
        Some(Value::Array(types)) => types
            .iter()
            .filter_map(Value::as_str)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

pub fn structured_data_summary(json_ld: &[Value]) -> StructuredDataSummary {
    let has_type = |name: &str| {
        json_ld
            .iter()
            .any(|block| schema_types(block).iter().any(|t| t == name))
    };

    StructuredDataSummary {
        has_json_ld: !json_ld.is_empty(),
        schemas: json_ld.iter().flat_map(schema_types).collect(),
        article_schema: has_type("Article"),
        organization_schema: has_type("Organization"),
        faq_schema: has_type("FAQPage"),
        json_ld_data: json_ld.to_vec(),
    }
}

pub fn h1_count(doc: &PageDocument) -> usize {
    doc.headings.iter().filter(|h| h.level == 1).count()
}

/// Exactly one `h1` and at least three headings overall
pub fn heading_structure_valid(doc: &PageDocument) -> bool {
    h1_count(doc) == 1 && doc.headings.len() >= MIN_STRUCTURED_HEADINGS
}

pub fn images_with_alt(doc: &PageDocument) -> usize {
    doc.images
        .iter()
        .filter(|img| !img.alt.trim().is_empty())
        .count()
}

/// Share of images carrying alt text, 100 when there are none
pub fn image_optimization(doc: &PageDocument) -> f64 {
    if doc.images.is_empty() {
        return 100.0;
    }
    images_with_alt(doc) as f64 / doc.images.len() as f64 * 100.0
}

/// Title, description and heading texts joined by spaces
pub fn content_text(doc: &PageDocument) -> String {
    let mut parts: Vec<&str> = Vec::with_capacity(doc.headings.len() + 2);
    parts.push(&doc.title);
    parts.push(&doc.description);
    parts.extend(doc.headings.iter().map(|h| h.text.as_str()));
    parts.join(" ")
}

pub fn ai_optimization(
    doc: &PageDocument,
    heading_structure_valid: bool,
    content: &str,
) -> AiOptimization {
    AiOptimization {
        has_headings: !doc.headings.is_empty(),
        has_structured_content: heading_structure_valid,
        has_summary: char_len(&doc.description) > SUMMARY_MIN_CHARS,
        readability_score: text::calculate_readability_score(content),
    }
}

/// Measured FCP when a browser reported one, estimates otherwise
pub fn core_web_vitals(doc: &PageDocument, cls: ClsEstimate) -> CoreWebVitals {
    let load_time = doc.load_time as f64;

    let fcp = doc
        .performance_metrics
        .map(|m| m.first_contentful_paint)
        .filter(|fcp| *fcp > 0.0)
        .unwrap_or_else(|| (load_time * 0.6).clamp(800.0, 3000.0));

    let lcp = (load_time * 0.8).clamp(1200.0, 4000.0);

    let cls = match cls {
        ClsEstimate::Fixed { value } => value,
        ClsEstimate::Random => rand::rng().random_range(0.0..0.15),
    };

    CoreWebVitals {
        fcp,
        lcp,
        cls,
        cls_estimated: true,
    }
}
