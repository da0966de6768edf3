use crate::parsers::Extracted;
use crate::results::{Heading, Image, Link};
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use std::sync::LazyLock;

/// Every element the extractor cares about, matched in one document-order walk
static PAGE_ELEMENTS: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(
        r#"title, meta, h1, h2, h3, h4, h5, h6, img, a[href], script[type="application/ld+json"]"#,
    )
    .expect("page element selector is valid")
});

/// Parses HTML content into the structured page fields
pub fn parse(html: &str) -> Extracted {
    let doc = Html::parse_document(html);
    let mut out = Extracted::default();

    let mut title = String::new();
    // First match wins for the description, unlike the meta map
    let mut named_description: Option<Option<String>> = None;
    let mut og_description: Option<Option<String>> = None;

    for element in doc.select(&PAGE_ELEMENTS) {
        match element.value().name() {
            "title" => title.push_str(&element.text().collect::<String>()),
            "meta" => {
                let attrs = element.value();
                let content = attrs.attr("content");

                if attrs.attr("name") == Some("description") && named_description.is_none() {
                    named_description = Some(content.map(str::to_string));
                }
                if attrs.attr("property") == Some("og:description") && og_description.is_none() {
                    og_description = Some(content.map(str::to_string));
                }

                let key = attrs
                    .attr("name")
                    .filter(|n| !n.is_empty())
                    .or_else(|| attrs.attr("property"))
                    .unwrap_or_default();
                let content = content.unwrap_or_default();
                if !key.is_empty() && !content.is_empty() {
                    out.meta_tags.insert(key.to_string(), content.to_string());
                }
            }
            "img" => {
                let src = element.value().attr("src").unwrap_or_default();
                if !src.is_empty() {
                    out.images.push(Image {
                        src: src.to_string(),
                        alt: element.value().attr("alt").unwrap_or_default().to_string(),
                    });
                }
            }
            "a" => {
                let href = element.value().attr("href").unwrap_or_default();
                let text = trimmed_text(&element);
                if !href.is_empty() && !text.is_empty() {
                    out.links.push(Link {
                        href: href.to_string(),
                        text,
                    });
                }
            }
            "script" => {
                if let Some(value) = parse_json_ld(&element) {
                    out.json_ld_data.push(value);
                }
            }
            name => {
                if let Some(level) = heading_level(name) {
                    let text = trimmed_text(&element);
                    if !text.is_empty() {
                        out.headings.push(Heading { level, text });
                    }
                }
            }
        }
    }

    out.title = title.trim().to_string();

    let non_empty = |d: Option<Option<String>>| d.flatten().filter(|s| !s.is_empty());
    out.description = non_empty(named_description)
        .or_else(|| non_empty(og_description))
        .unwrap_or_default();

    // The title element always mirrors into the map
    if !out.title.is_empty() {
        out.meta_tags.insert("title".to_string(), out.title.clone());
    }

    ::log::debug!(
        "HTML parser found {} headings, {} images, {} links, {} meta tags, {} JSON-LD blocks",
        out.headings.len(),
        out.images.len(),
        out.links.len(),
        out.meta_tags.len(),
        out.json_ld_data.len()
    );

    out
}

/// Returns the heading level for `h1`..`h6`
fn heading_level(name: &str) -> Option<u8> {
    match name {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

fn trimmed_text(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Parse one JSON-LD block, skipping it if it is malformed
fn parse_json_ld(element: &ElementRef) -> Option<Value> {
    let content = element.text().collect::<String>();
    if content.trim().is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(&content) {
        Ok(value) => Some(value),
        Err(e) => {
            ::log::warn!("Skipping malformed JSON-LD block: {}", e);
            None
        }
    }
}

