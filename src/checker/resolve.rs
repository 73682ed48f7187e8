// src/checker/resolve.rs
// =============================================================================
// This module turns references found in HTML (href, src, srcset, url(...))
// into absolute URLs we can compare and fetch.
//
// Rules:
// - Relative references resolve against the page they were found on
// - data: URLs are never resolved (nothing to fetch)
// - Malformed references are dropped silently (None), never reported
// - Fragments are stripped so "/docs/foo" and "/docs/foo#intro" are the
//   same URL
// =============================================================================

use url::Url;

// Resolves a reference against the page it appeared on
//
// Returns None for empty references, data: URLs, and anything the url crate
// refuses to parse.
//
// Examples (page = "https://example.com/docs/guide"):
//   "img/a.png"              -> https://example.com/docs/img/a.png
//   "/logo.png?w=200"        -> https://example.com/logo.png?w=200
//   "//cdn.example.net/x.jpg" -> https://cdn.example.net/x.jpg
//   "/about#team"            -> https://example.com/about
//   "data:image/png;base64," -> None
pub fn resolve(reference: &str, page: &Url) -> Option<Url> {
    let reference = reference.trim();

    if reference.is_empty() || is_data_url(reference) {
        return None;
    }

    // Url::join handles absolute, scheme-relative and relative references
    let mut resolved = page.join(reference).ok()?;
    resolved.set_fragment(None);
    Some(resolved)
}

// Checks for the data: scheme (case-insensitive, like browsers do)
pub fn is_data_url(reference: &str) -> bool {
    reference
        .trim_start()
        .get(..5)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("data:"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> Url {
        Url::parse("https://example.com/docs/guide").unwrap()
    }

    #[test]
    fn test_resolve_relative_path() {
        let url = resolve("img/a.png", &page()).unwrap();
        assert_eq!(url.as_str(), "https://example.com/docs/img/a.png");
    }

    #[test]
    fn test_resolve_keeps_query() {
        let url = resolve("/logo.png?w=200", &page()).unwrap();
        assert_eq!(url.as_str(), "https://example.com/logo.png?w=200");
    }

    #[test]
    fn test_resolve_scheme_relative() {
        let url = resolve("//cdn.example.net/x.jpg", &page()).unwrap();
        assert_eq!(url.as_str(), "https://cdn.example.net/x.jpg");
    }

    #[test]
    fn test_resolve_strips_fragment() {
        let with_fragment = resolve("/about#team", &page()).unwrap();
        let without = resolve("/about", &page()).unwrap();
        assert_eq!(with_fragment, without);
    }

    #[test]
    fn test_skip_data_urls() {
        assert_eq!(resolve("data:image/png;base64,AAAA", &page()), None);
        assert_eq!(resolve("  DATA:image/gif,xyz", &page()), None);
    }

    #[test]
    fn test_skip_empty_and_malformed() {
        assert_eq!(resolve("", &page()), None);
        assert_eq!(resolve("   ", &page()), None);
        assert_eq!(resolve("http://[::1", &page()), None);
    }

    #[test]
    fn test_short_references_are_not_data_urls() {
        assert!(!is_data_url("da"));
        assert!(!is_data_url("/data/x.png"));
    }
}
