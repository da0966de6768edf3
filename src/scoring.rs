//! Category scores and issue detection.
//!
//! Scores and issues read the same [`Signals`] but are computed
//! independently. Issues come out in a fixed order so callers can rely
//! on position.

use crate::report::{CoreWebVitals, Issue, IssueCategory, IssueType};
use crate::results::PageDocument;
use crate::signals::{MAX_DESCRIPTION_CHARS, MAX_TITLE_CHARS, Signals};

/// Readability below this gets an info issue
pub const READABILITY_THRESHOLD: u8 = 50;
/// Load times above this (ms) get a performance warning
pub const SLOW_LOAD_MS: u64 = 3000;

/// The three category scores plus the issue list for one page
#[derive(Debug, Clone, PartialEq)]
pub struct Scorecard {
    pub seo_score: u8,
    pub ai_score: u8,
    pub performance_score: u8,
    pub issues: Vec<Issue>,
}

/// Score a document and collect its issues
pub fn score(doc: &PageDocument, signals: &Signals) -> Scorecard {
    let card = Scorecard {
        seo_score: seo_score(doc, signals),
        ai_score: ai_score(signals),
        performance_score: performance_score(doc.load_time, &signals.core_web_vitals),
        issues: detect_issues(doc, signals),
    };

    ::log::debug!(
        "Scored {}: seo={} ai={} performance={} issues={}",
        doc.url,
        card.seo_score,
        card.ai_score,
        card.performance_score,
        card.issues.len()
    );

    card
}

/// Rounded mean of 0-100 factor values, clamped to `[0, 100]`
pub fn calculate_score(factors: &[f64]) -> u8 {
    if factors.is_empty() {
        return 0;
    }
    let average = factors.iter().sum::<f64>() / factors.len() as f64;
    average.clamp(0.0, 100.0).round() as u8
}

fn flag(value: bool) -> f64 {
    if value { 100.0 } else { 0.0 }
}

fn is_https(url: &str) -> bool {
    url.starts_with("https://")
}

pub fn seo_score(doc: &PageDocument, signals: &Signals) -> u8 {
    let headings = if signals.heading_structure_valid {
        100.0
    } else if !doc.headings.is_empty() {
        70.0
    } else {
        0.0
    };
    let meta_completeness = signals.meta_tags.passed() as f64 / 5.0 * 100.0;

    calculate_score(&[
        flag(signals.meta_tags.title),
        flag(signals.meta_tags.description),
        headings,
        signals.image_optimization,
        meta_completeness,
        flag(is_https(&doc.url)),
    ])
}

pub fn ai_score(signals: &Signals) -> u8 {
    let ai = &signals.ai_optimization;
    calculate_score(&[
        flag(ai.has_headings),
        if ai.has_structured_content { 100.0 } else { 70.0 },
        f64::from(ai.readability_score),
        flag(signals.structured_data.has_json_ld),
        if ai.has_summary { 100.0 } else { 50.0 },
    ])
}

/// Step function on load time with a floor of 20
pub fn load_time_score(load_time: u64) -> f64 {
    let load_time = load_time as f64;
    if load_time < 2000.0 {
        100.0
    } else if load_time < 3000.0 {
        80.0
    } else {
        (100.0 - (load_time - 3000.0) / 100.0).max(20.0)
    }
}

/// Mean of the per-metric scores for load time, FCP, LCP and CLS
pub fn core_web_vitals_score(load_time: u64, vitals: &CoreWebVitals) -> u8 {
    let load_time = load_time as f64;
    let decay = |value: f64, good: f64, divisor: f64| {
        if value < good {
            100.0
        } else {
            (100.0 - (value - good) / divisor).max(0.0)
        }
    };
    let cls = if vitals.cls < 0.1 {
        100.0
    } else {
        (100.0 - (vitals.cls - 0.1) * 1000.0).max(0.0)
    };

    calculate_score(&[
        decay(load_time, 3000.0, 100.0),
        decay(vitals.fcp, 1800.0, 50.0),
        decay(vitals.lcp, 2500.0, 50.0),
        cls,
    ])
}

pub fn performance_score(load_time: u64, vitals: &CoreWebVitals) -> u8 {
    calculate_score(&[
        load_time_score(load_time),
        f64::from(core_web_vitals_score(load_time, vitals)),
    ])
}

/// Collect issues in their fixed precedence order
pub fn detect_issues(doc: &PageDocument, signals: &Signals) -> Vec<Issue> {
    let mut issues = Vec::new();

    match doc.meta("title").filter(|t| !t.is_empty()) {
        None => issues.push(Issue::new(
            IssueType::Error,
            IssueCategory::Seo,
            "Page title is missing",
            "Add a <title> tag with a title of 30-60 characters",
        )),
        Some(title) if title.chars().count() > MAX_TITLE_CHARS => issues.push(Issue::new(
            IssueType::Warning,
            IssueCategory::Seo,
            format!(
                "Page title is {} characters long, which is too long",
                title.chars().count()
            ),
            "Shorten the title to 60 characters or fewer",
        )),
        Some(_) => {}
    }

    match doc.meta("description").filter(|d| !d.is_empty()) {
        None => issues.push(Issue::new(
            IssueType::Error,
            IssueCategory::Seo,
            "Meta description is missing",
            r#"Add a <meta name="description"> tag with a 120-160 character summary"#,
        )),
        Some(description) if description.chars().count() > MAX_DESCRIPTION_CHARS => {
            issues.push(Issue::new(
                IssueType::Warning,
                IssueCategory::Seo,
                format!(
                    "Meta description is {} characters long, which is too long",
                    description.chars().count()
                ),
                "Shorten the description to 160 characters or fewer",
            ))
        }
        Some(_) => {}
    }

    match signals.h1_count {
        0 => issues.push(Issue::new(
            IssueType::Error,
            IssueCategory::Seo,
            "No H1 heading found",
            "Mark up the main title of the page as an H1",
        )),
        1 => {}
        n => issues.push(Issue::new(
            IssueType::Warning,
            IssueCategory::Seo,
            format!("Found {n} H1 headings, which is too many"),
            "Use a single H1 per page",
        )),
    }

    // Signals may come from a different document than `doc`
    let missing_alt = doc.images.len().saturating_sub(signals.images_with_alt);
    if missing_alt > 0 {
        issues.push(Issue::new(
            IssueType::Warning,
            IssueCategory::Seo,
            format!("{missing_alt} image(s) are missing alt text"),
            "Add a descriptive alt attribute to every image",
        ));
    }

    if doc.load_time > SLOW_LOAD_MS {
        issues.push(Issue::new(
            IssueType::Warning,
            IssueCategory::Performance,
            format!(
                "Page took {:.1}s to load, which is slow",
                doc.load_time as f64 / 1000.0
            ),
            "Optimize images, minify code and serve assets from a CDN to speed up loading",
        ));
    }

    if !signals.structured_data.has_json_ld {
        issues.push(Issue::new(
            IssueType::Warning,
            IssueCategory::Ai,
            "No structured data found",
            "Add JSON-LD structured data so AI search engines can understand the page",
        ));
    }

    if !signals.heading_structure_valid {
        issues.push(Issue::new(
            IssueType::Info,
            IssueCategory::Ai,
            "Heading structure could be improved",
            "Use H1-H6 headings hierarchically to make the content structure clear",
        ));
    }

    if signals.ai_optimization.readability_score < READABILITY_THRESHOLD {
        issues.push(Issue::new(
            IssueType::Info,
            IssueCategory::Ai,
            "Text readability is low",
            "Use shorter sentences and simpler words to improve readability",
        ));
    }

    if !is_https(&doc.url) {
        issues.push(Issue::new(
            IssueType::Error,
            IssueCategory::Technical,
            "Page is not served over HTTPS",
            "Install a TLS certificate and serve the site over HTTPS",
        ));
    }

    let has = |key: &str| doc.meta(key).is_some_and(|v| !v.is_empty());
    if !has("og:title") || !has("og:description") {
        issues.push(Issue::new(
            IssueType::Warning,
            IssueCategory::Seo,
            "Open Graph tags are missing",
            "Add og:title, og:description and og:image tags to improve social sharing",
        ));
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClsEstimate;
    use crate::results::{Heading, Image};
    use crate::signals::derive_signals;

    fn vitals(fcp: f64, lcp: f64, cls: f64) -> CoreWebVitals {
        CoreWebVitals {
            fcp,
            lcp,
            cls,
            cls_estimated: true,
        }
    }

    fn messages(issues: &[Issue]) -> Vec<&str> {
        issues.iter().map(|i| i.message.as_str()).collect()
    }

    #[test]
    fn calculate_score_rounds_and_clamps() {
        assert_eq!(calculate_score(&[100.0, 0.0]), 50);
        assert_eq!(calculate_score(&[100.0, 70.0, 0.0]), 57);
        assert_eq!(calculate_score(&[250.0]), 100);
        assert_eq!(calculate_score(&[-10.0]), 0);
        assert_eq!(calculate_score(&[]), 0);
        assert_eq!(calculate_score(&[0.5]), 1);
    }

    #[test]
    fn load_time_steps() {
        assert_eq!(load_time_score(0), 100.0);
        assert_eq!(load_time_score(1999), 100.0);
        assert_eq!(load_time_score(2000), 80.0);
        assert_eq!(load_time_score(2999), 80.0);
        assert_eq!(load_time_score(3000), 100.0);
        assert_eq!(load_time_score(5000), 80.0);
        assert_eq!(load_time_score(20_000), 20.0);
    }

    #[test]
    fn core_web_vitals_all_good() {
        assert_eq!(core_web_vitals_score(1000, &vitals(800.0, 1200.0, 0.0)), 100);
    }

    #[test]
    fn core_web_vitals_decay() {
        // load 100, fcp 100 - 1200/50 = 76, lcp 100 - 1500/50 = 70, cls 100 - 100 = 0
        assert_eq!(
            core_web_vitals_score(2000, &vitals(3000.0, 4000.0, 0.2)),
            62
        );
        // Everything far past the thresholds floors at zero
        assert_eq!(
            core_web_vitals_score(1_000_000, &vitals(100_000.0, 100_000.0, 5.0)),
            0
        );
    }

    #[test]
    fn performance_score_for_fast_page() {
        // load_time 1500: factor 100; vitals fcp 900, lcp 1200, cls 0 -> 100
        assert_eq!(performance_score(1500, &vitals(900.0, 1200.0, 0.0)), 100);
    }

    #[test]
    fn performance_score_for_slow_page() {
        // load 8000: factor max(20, 50) = 50
        // vitals: load 100 - 50 = 50, fcp 3000 -> 76, lcp 4000 -> 70, cls 100 => 74
        assert_eq!(performance_score(8000, &vitals(3000.0, 4000.0, 0.0)), 62);
    }

    #[test]
    fn issue_order_for_bare_http_page() {
        let mut doc = PageDocument::default();
        doc.url = "http://example.com".to_string();
        doc.load_time = 4200;
        let signals = derive_signals(&doc, ClsEstimate::default());
        let issues = detect_issues(&doc, &signals);

        let kinds: Vec<(IssueType, IssueCategory)> =
            issues.iter().map(|i| (i.kind, i.category)).collect();
        assert_eq!(
            kinds,
            vec![
                (IssueType::Error, IssueCategory::Seo),
                (IssueType::Error, IssueCategory::Seo),
                (IssueType::Error, IssueCategory::Seo),
                (IssueType::Warning, IssueCategory::Performance),
                (IssueType::Warning, IssueCategory::Ai),
                (IssueType::Info, IssueCategory::Ai),
                (IssueType::Info, IssueCategory::Ai),
                (IssueType::Error, IssueCategory::Technical),
                (IssueType::Warning, IssueCategory::Seo),
            ]
        );
        assert_eq!(issues[0].message, "Page title is missing");
        assert_eq!(issues[1].message, "Meta description is missing");
        assert_eq!(issues[2].message, "No H1 heading found");
        assert_eq!(issues[3].message, "Page took 4.2s to load, which is slow");
    }

    #[test]
    fn long_title_and_description_warn_instead_of_error() {
        let mut doc = PageDocument::default();
        doc.url = "https://example.com".to_string();
        doc.meta_tags.insert("title".to_string(), "t".repeat(61));
        doc.meta_tags
            .insert("description".to_string(), "d".repeat(161));
        let signals = derive_signals(&doc, ClsEstimate::default());
        let issues = detect_issues(&doc, &signals);

        assert_eq!(issues[0].kind, IssueType::Warning);
        assert_eq!(
            issues[0].message,
            "Page title is 61 characters long, which is too long"
        );
        assert_eq!(issues[1].kind, IssueType::Warning);
        assert_eq!(
            issues[1].message,
            "Meta description is 161 characters long, which is too long"
        );
        // Double accounting: the validity flags are off too
        assert!(!signals.meta_tags.title);
        assert!(!signals.meta_tags.description);
    }

    #[test]
    fn multiple_h1_and_missing_alt() {
        let mut doc = PageDocument::default();
        doc.url = "https://example.com".to_string();
        doc.headings = vec![
            Heading { level: 1, text: "A".to_string() },
            Heading { level: 1, text: "B".to_string() },
        ];
        doc.images = vec![
            Image { src: "/1.png".to_string(), alt: String::new() },
            Image { src: "/2.png".to_string(), alt: "ok".to_string() },
            Image { src: "/3.png".to_string(), alt: " ".to_string() },
        ];
        let signals = derive_signals(&doc, ClsEstimate::default());
        let issues = detect_issues(&doc, &signals);
        let messages = messages(&issues);

        assert!(messages.contains(&"Found 2 H1 headings, which is too many"));
        assert!(messages.contains(&"2 image(s) are missing alt text"));
        assert!(!messages.contains(&"No H1 heading found"));
    }

    #[test]
    fn alt_count_from_richer_signals_does_not_underflow() {
        let mut rich = PageDocument::default();
        rich.url = "https://example.com".to_string();
        rich.images = vec![
            Image { src: "/1.png".to_string(), alt: "one".to_string() },
            Image { src: "/2.png".to_string(), alt: "two".to_string() },
        ];
        let signals = derive_signals(&rich, ClsEstimate::default());
        assert_eq!(signals.images_with_alt, 2);

        let mut bare = PageDocument::default();
        bare.url = "https://example.com".to_string();
        let issues = detect_issues(&bare, &signals);

        assert!(!messages(&issues).iter().any(|m| m.contains("missing alt text")));
    }

    #[test]
    fn open_graph_needs_title_and_description() {
        let mut doc = PageDocument::default();
        doc.url = "https://example.com".to_string();
        doc.meta_tags.insert("og:title".to_string(), "T".to_string());
        let signals = derive_signals(&doc, ClsEstimate::default());
        assert!(messages(&detect_issues(&doc, &signals)).contains(&"Open Graph tags are missing"));

        doc.meta_tags
            .insert("og:description".to_string(), "D".to_string());
        let signals = derive_signals(&doc, ClsEstimate::default());
        assert!(!messages(&detect_issues(&doc, &signals)).contains(&"Open Graph tags are missing"));
    }

    #[test]
    fn scores_stay_in_bounds_for_extreme_input() {
        let mut doc = PageDocument::default();
        doc.url = "https://example.com".to_string();
        doc.description = "word ".repeat(10_000);
        doc.meta_tags
            .insert("description".to_string(), doc.description.clone());
        doc.load_time = 0;
        let signals = derive_signals(&doc, ClsEstimate::default());
        let card = score(&doc, &signals);
        assert!(card.seo_score <= 100);
        assert!(card.ai_score <= 100);
        assert!(card.performance_score <= 100);

        doc.load_time = u64::MAX / 2;
        let signals = derive_signals(&doc, ClsEstimate::Fixed { value: 1.0 });
        let card = score(&doc, &signals);
        assert!(card.performance_score <= 100);
        assert_eq!(
            core_web_vitals_score(doc.load_time, &signals.core_web_vitals),
            0
        );
    }
}
