//! URL helpers for attachments.

use std::sync::OnceLock;

use regex::Regex;
use url::Url;

/// Maximum length of a name derived from a URL.
pub const MAX_LINK_NAME: usize = 80;

const FALLBACK_LINK_NAME: &str = "link";

fn scheme_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^https?://\S+$").expect("valid regex"))
}

/// Trimmed URL if it is an http(s) link, otherwise `None`.
pub fn sanitize_url(input: &str) -> Option<String> {
    let url = input.trim();
    scheme_re().is_match(url).then(|| url.to_string())
}

/// Display name for a link: the last path segment, at most
/// [`MAX_LINK_NAME`] characters, `link` when there is none.
pub fn link_name_from_url(input: &str) -> String {
    let segment = Url::parse(input.trim()).ok().and_then(|url| {
        url.path_segments()
            .and_then(|mut segments| segments.rfind(|s| !s.is_empty()).map(str::to_string))
    });

    match segment {
        Some(s) => s.chars().take(MAX_LINK_NAME).collect(),
        None => FALLBACK_LINK_NAME.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_accepts_http_and_https() {
        assert_eq!(
            sanitize_url("  https://example.com/a.pdf ").as_deref(),
            Some("https://example.com/a.pdf")
        );
        assert!(sanitize_url("HTTP://example.com").is_some());
    }

    #[test]
    fn test_sanitize_rejects_other_input() {
        assert_eq!(sanitize_url("ftp://example.com/a"), None);
        assert_eq!(sanitize_url("example.com"), None);
        assert_eq!(sanitize_url("https://"), None);
        assert_eq!(sanitize_url("https://a b"), None);
    }

    #[test]
    fn test_link_name_last_segment() {
        assert_eq!(link_name_from_url("https://x.io/docs/plan-3.pdf"), "plan-3.pdf");
        assert_eq!(link_name_from_url("https://x.io/docs/folder/"), "folder");
    }

    #[test]
    fn test_link_name_fallback() {
        assert_eq!(link_name_from_url("https://x.io"), "link");
        assert_eq!(link_name_from_url("https://x.io/"), "link");
        assert_eq!(link_name_from_url("not a url"), "link");
    }

    #[test]
    fn test_link_name_truncated() {
        let long = "a".repeat(120);
        let name = link_name_from_url(&format!("https://x.io/{long}"));
        assert_eq!(name.chars().count(), MAX_LINK_NAME);
    }
}
