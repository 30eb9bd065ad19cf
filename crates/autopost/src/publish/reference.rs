//! Public post URL resolution.

use regex::Regex;
use std::sync::OnceLock;
use url::Url;

fn status_path() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^/[A-Za-z0-9_]+/status/\d+$").expect("valid regex"))
}

/// Turn a post link's `href` into an absolute status URL.
///
/// Returns `None` for links that do not point at a single post, such as
/// analytics or photo sub-pages.
#[must_use]
pub fn resolve_status_url(base: &str, href: &str) -> Option<String> {
    let base = Url::parse(base).ok()?;
    let mut url = base.join(href.trim()).ok()?;
    url.set_query(None);
    url.set_fragment(None);

    if url.host_str() != base.host_str() || !status_path().is_match(url.path()) {
        return None;
    }
    Some(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_href() {
        assert_eq!(
            resolve_status_url("https://x.com", "/acme/status/1790000000000000000"),
            Some("https://x.com/acme/status/1790000000000000000".to_string())
        );
    }

    #[test]
    fn test_absolute_href_with_query() {
        assert_eq!(
            resolve_status_url("https://x.com", "https://x.com/acme/status/42?s=20#top"),
            Some("https://x.com/acme/status/42".to_string())
        );
    }

    #[test]
    fn test_rejects_non_post_links() {
        assert_eq!(
            resolve_status_url("https://x.com", "/acme/status/42/analytics"),
            None
        );
        assert_eq!(resolve_status_url("https://x.com", "/acme"), None);
        assert_eq!(
            resolve_status_url("https://x.com", "https://evil.example/acme/status/42"),
            None
        );
    }
}
