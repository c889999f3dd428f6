// src/utils/url.rs

//! URL manipulation utilities.

use url::Url;

/// Resolve a potentially relative link against the page it was found on.
///
/// Listing pages routinely emit `/article/123`-style hrefs; notifications
/// need absolute links. Unresolvable hrefs are passed through unchanged.
///
/// # Examples
/// ```
/// use exwatch::utils::url::resolve;
///
/// assert_eq!(
///     resolve("https://example.com/sports/news", "/article/123"),
///     "https://example.com/article/123"
/// );
/// ```
pub fn resolve(base: &str, href: &str) -> String {
    match Url::parse(base).and_then(|b| b.join(href)) {
        Ok(url) => url.into(),
        Err(_) => href.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_absolute_url() {
        assert_eq!(
            resolve("https://example.com/path/", "https://other.com/page"),
            "https://other.com/page"
        );
    }

    #[test]
    fn test_resolve_absolute_path() {
        assert_eq!(
            resolve("https://example.com/a/b", "/root.html"),
            "https://example.com/root.html"
        );
    }

    #[test]
    fn test_resolve_relative_path() {
        assert_eq!(
            resolve("https://example.com/path/", "page.html"),
            "https://example.com/path/page.html"
        );
    }

    #[test]
    fn test_resolve_invalid_base_passes_through() {
        assert_eq!(resolve("not a url", "page.html"), "page.html");
    }
}
