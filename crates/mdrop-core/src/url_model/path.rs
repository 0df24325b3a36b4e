//! Source URL parsing and extension hints from the URL path.

use url::Url;

/// Longest extension accepted as a hint; anything longer is treated as ambiguous.
const MAX_EXTENSION_LEN: usize = 5;

/// Parses a source URL, accepting only `http`/`https` URLs with a host.
pub fn parse_source_url(raw: &str) -> Option<Url> {
    let parsed = Url::parse(raw.trim()).ok()?;
    match parsed.scheme() {
        "http" | "https" => {}
        _ => return None,
    }
    parsed.host_str().filter(|h| !h.is_empty())?;
    Some(parsed)
}

/// Extracts a lowercase extension (no dot) from the last path segment.
///
/// Returns `None` when the segment has no extension or the candidate is
/// ambiguous (empty, too long, or not purely alphanumeric). Query strings and
/// fragments are ignored.
pub fn extension_from_url_path(url: &Url) -> Option<String> {
    let segment = url
        .path_segments()?
        .filter(|s| !s.is_empty())
        .last()?;
    let (stem, ext) = segment.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() || ext.len() > MAX_EXTENSION_LEN {
        return None;
    }
    if !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ext(raw: &str) -> Option<String> {
        extension_from_url_path(&parse_source_url(raw).unwrap())
    }

    #[test]
    fn normal() {
        assert_eq!(ext("https://example.com/a/b/clip.mp4").as_deref(), Some("mp4"));
        assert_eq!(ext("https://example.com/Photo.JPEG").as_deref(), Some("jpeg"));
    }

    #[test]
    fn with_query_and_fragment() {
        assert_eq!(
            ext("https://cdn.example.com/v/clip.webm?token=abc.def#t=10").as_deref(),
            Some("webm")
        );
    }

    #[test]
    fn absent_or_ambiguous() {
        assert_eq!(ext("https://example.com/"), None);
        assert_eq!(ext("https://example.com"), None);
        assert_eq!(ext("https://example.com/watch"), None);
        assert_eq!(ext("https://example.com/.hidden"), None);
        assert_eq!(ext("https://example.com/file.verylongext"), None);
        assert_eq!(ext("https://example.com/file.m%20p4"), None);
    }

    #[test]
    fn unsupported_extension_is_still_reported() {
        assert_eq!(ext("https://example.com/pic.bmp").as_deref(), Some("bmp"));
    }

    #[test]
    fn rejects_non_http_urls() {
        assert!(parse_source_url("ftp://example.com/clip.mp4").is_none());
        assert!(parse_source_url("file:///etc/passwd").is_none());
        assert!(parse_source_url("not a url").is_none());
        assert!(parse_source_url("").is_none());
        assert!(parse_source_url("http://example.com/x").is_some());
    }
}
