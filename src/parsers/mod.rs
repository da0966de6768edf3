pub mod html;
pub mod spa;
pub mod text;


use crate::results::{Heading, Image, Link, PageDocument};
use serde_json::Value;
use std::collections::BTreeMap;

/// Content fields pulled out of a page's markup
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extracted {
    pub title: String,
    pub description: String,
    pub headings: Vec<Heading>,
    pub images: Vec<Image>,
    pub links: Vec<Link>,
    pub meta_tags: BTreeMap<String, String>,
    pub json_ld_data: Vec<Value>,
}

impl Extracted {
    /// Combine with retrieval facts into a full document
    pub fn into_document(self, url: &str, html: String, load_time: u64) -> PageDocument {
        PageDocument {
            url: url.to_string(),
            html,
            title: self.title,
            description: self.description,
            headings: self.headings,
            images: self.images,
            links: self.links,
            meta_tags: self.meta_tags,
            json_ld_data: self.json_ld_data,
            load_time,
            performance_metrics: None,
            error: None,
            is_spa: None,
        }
    }
}

/// Parse markup into its content fields
///
/// Shared by every retrieval strategy so the DOM walk lives in one place.
pub fn extract(html: &str) -> Extracted {
    html::parse(html)
}
