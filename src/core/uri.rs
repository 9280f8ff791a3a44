//! Public URI helpers.
//!
//! URIs inside the engine are always decoded, start with `/`, and never
//! contain repeated separators. Request URIs from a browser are decoded
//! and stripped of query/fragment at the boundary via [`from_request`].

use std::sync::LazyLock;

use percent_encoding::percent_decode_str;
use regex::Regex;

static REPEATED_SLASHES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("/{2,}").expect("static regex"));

/// Collapse runs of `/` into a single separator.
///
/// # Examples
/// ```
/// use assetforge::core::uri::squeeze_slashes;
/// assert_eq!(squeeze_slashes("//js///app.js"), "/js/app.js");
/// assert_eq!(squeeze_slashes("/js/app.js"), "/js/app.js");
/// ```
pub fn squeeze_slashes(uri: &str) -> String {
    REPEATED_SLASHES.replace_all(uri, "/").into_owned()
}

/// Normalize a browser request URI: strip query and fragment, decode
/// percent-encoding, ensure a leading slash and collapse separators.
pub fn from_request(encoded: &str) -> String {
    let path = encoded.split(['?', '#']).next().unwrap_or(encoded);
    let decoded = percent_decode_str(path)
        .decode_utf8()
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string());
    squeeze_slashes(&format!("/{decoded}"))
}

/// Join URI segments with `/` and normalize the result.
pub fn join(prefix: &str, rest: &str) -> String {
    squeeze_slashes(&format!("/{prefix}/{rest}"))
}

/// Final extension of the last URI segment, without the dot.
///
/// Dotfiles (`/css/.keep`) have no extension.
pub fn extension(uri: &str) -> Option<&str> {
    let name = file_name(uri);
    match name.rfind('.') {
        Some(0) | None => None,
        Some(idx) => Some(&name[idx + 1..]),
    }
}

/// Last segment of a URI.
pub fn file_name(uri: &str) -> &str {
    uri.rsplit('/').next().unwrap_or(uri)
}

/// Check whether a URI tries to climb out of its root.
pub fn has_parent_segment(uri: &str) -> bool {
    uri.split('/').any(|segment| segment == "..")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_squeeze_slashes() {
        assert_eq!(squeeze_slashes("/js//app.js"), "/js/app.js");
        assert_eq!(squeeze_slashes("///"), "/");
        assert_eq!(squeeze_slashes(""), "");
    }

    #[test]
    fn test_from_request() {
        assert_eq!(from_request("/js/app.js?v=1"), "/js/app.js");
        assert_eq!(from_request("js//app.js#top"), "/js/app.js");
        assert_eq!(from_request("/images/my%20logo.png"), "/images/my logo.png");
    }

    #[test]
    fn test_join() {
        assert_eq!(join("/js", "app.js"), "/js/app.js");
        assert_eq!(join("/js/", "/vendor/jquery.js"), "/js/vendor/jquery.js");
        assert_eq!(join("/", "robots.txt"), "/robots.txt");
    }

    #[test]
    fn test_extension() {
        assert_eq!(extension("/css/app.sass"), Some("sass"));
        assert_eq!(extension("/js/app.min.js"), Some("js"));
        assert_eq!(extension("/css/.keep"), None);
        assert_eq!(extension("/LICENSE"), None);
        assert_eq!(extension("/v1.2/README"), None);
    }

    #[test]
    fn test_has_parent_segment() {
        assert!(has_parent_segment("/js/../secret"));
        assert!(!has_parent_segment("/js/app..js"));
    }
}
