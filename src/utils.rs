use chrono::Utc;
use rand::Rng;
use url::Url;

const ID_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const ID_SUFFIX_LEN: usize = 9;

/// Host of `url` without a leading `www.`
///
/// Falls back to the input unchanged when it does not parse.
pub fn extract_domain(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => match parsed.host_str() {
            Some(host) => host.strip_prefix("www.").unwrap_or(host).to_string(),
            None => url.to_string(),
        },
        Err(_) => url.to_string(),
    }
}

/// True for absolute http(s) URLs with a host
pub fn is_valid_url(url: &str) -> bool {
    Url::parse(url)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some())
        .unwrap_or(false)
}

/// `analysis_<epoch ms>_<9 lowercase alphanumerics>`
pub fn generate_analysis_id() -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| ID_CHARSET[rng.random_range(0..ID_CHARSET.len())] as char)
        .collect();
    format!("analysis_{}_{}", Utc::now().timestamp_millis(), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    #[test]
    fn domain_drops_www() {
        assert_eq!(extract_domain("https://www.example.com/a?b=c"), "example.com");
        assert_eq!(extract_domain("http://blog.example.com"), "blog.example.com");
        assert_eq!(extract_domain("https://example.com:8443/"), "example.com");
        assert_eq!(extract_domain("not a url"), "not a url");
    }

    #[test]
    fn only_http_urls_are_valid() {
        assert!(is_valid_url("https://example.com"));
        assert!(is_valid_url("http://localhost:3000/page"));
        assert!(!is_valid_url("ftp://example.com"));
        assert!(!is_valid_url("example.com"));
        assert!(!is_valid_url(""));
    }

    #[test]
    fn analysis_ids_have_expected_shape() {
        let pattern = Regex::new(r"^analysis_\d{13,}_[a-z0-9]{9}$").unwrap();
        let a = generate_analysis_id();
        let b = generate_analysis_id();
        assert!(pattern.is_match(&a), "{a}");
        assert_ne!(a, b);
    }
}
