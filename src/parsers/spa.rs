//! Heuristics for spotting pages whose content is rendered client-side.
//!
//! A plain HTTP fetch cannot run scripts, so a single-page application
//! often arrives as an empty shell. Detection only annotates the document;
//! it never stops the analysis.

use regex::Regex;
use std::sync::LazyLock;

/// Strings that framework runtimes leave in server-sent markup
const FRAMEWORK_MARKERS: &[&str] = &[
    "__NEXT_DATA__",
    "__NUXT__",
    "data-reactroot",
    "data-react-helmet",
    "ng-version",
    "ng-app",
    "data-v-app",
    "data-server-rendered",
    "window.__INITIAL_STATE__",
    "_app-",
    "svelte-",
];

/// Titles that scaffolding tools ship with
const PLACEHOLDER_TITLES: &[&str] = &[
    "react app",
    "vite app",
    "vite + react",
    "vue app",
    "angular",
    "document",
    "loading...",
    "loading",
    "untitled",
];

const MIN_TITLE_CHARS: usize = 10;

static ROOT_MOUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<div[^>]+id\s*=\s*["'](root|app|__next|__nuxt|svelte)["'][^>]*>\s*</div>"#)
        .expect("root mount regex is valid")
});

static BUNDLE_SCRIPT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<script[^>]+src\s*=\s*["'][^"']*(bundle|main|app|chunk|vendor|index)[.-][^"']*\.js["']"#)
        .expect("bundle script regex is valid")
});

/// A predicate deciding whether a fetched page is probably client-rendered
pub trait SpaDetector: Send + Sync {
    fn looks_client_rendered(&self, html: &str, title: &str) -> bool;
}

/// Default rule set: a framework fingerprint plus a missing or weak title
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkerSpaDetector;

impl MarkerSpaDetector {
    fn has_framework_fingerprint(html: &str) -> bool {
        FRAMEWORK_MARKERS.iter().any(|m| html.contains(m))
            || ROOT_MOUNT.is_match(html)
            || BUNDLE_SCRIPT.is_match(html)
    }

    fn has_weak_title(title: &str) -> bool {
        let title = title.trim();
        title.is_empty()
            || title.chars().count() < MIN_TITLE_CHARS
            || PLACEHOLDER_TITLES.contains(&title.to_lowercase().as_str())
    }
}

impl SpaDetector for MarkerSpaDetector {
    fn looks_client_rendered(&self, html: &str, title: &str) -> bool {
        Self::has_framework_fingerprint(html) && Self::has_weak_title(title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn react_shell_is_flagged() {
        let html = r#"<!doctype html><html><head><title>React App</title></head>
            <body><div id="root"></div><script src="/static/js/main.3f2a.js"></script></body></html>"#;
        assert!(MarkerSpaDetector.looks_client_rendered(html, "React App"));
    }

    #[test]
    fn content_page_with_good_title_is_not_flagged() {
        let html = r#"<html><head><title>How we rebuilt our billing pipeline</title></head>
            <body><div id="root"></div><script src="/main.js"></script></body></html>"#;
        assert!(
            !MarkerSpaDetector.looks_client_rendered(html, "How we rebuilt our billing pipeline")
        );
    }

    #[test]
    fn short_title_without_fingerprint_is_not_flagged() {
        let html = "<html><head><title>Home</title></head><body><h1>Welcome</h1></body></html>";
        assert!(!MarkerSpaDetector.looks_client_rendered(html, "Home"));
    }

    #[test]
    fn next_data_with_empty_title_is_flagged() {
        let html = r#"<html><body><script id="__NEXT_DATA__" type="application/json">{}</script></body></html>"#;
        assert!(MarkerSpaDetector.looks_client_rendered(html, ""));
    }
}
