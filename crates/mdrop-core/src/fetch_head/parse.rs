//! Parse HTTP response header lines into ResourceMetadata.

use super::ResourceMetadata;

/// Parse collected header lines into ResourceMetadata.
///
/// Lines from every response in a redirect chain arrive in one list; each
/// status line (`HTTP/...`) starts a new response, so only the final
/// response's headers count.
pub(crate) fn parse_headers(lines: &[String]) -> ResourceMetadata {
    let mut size_bytes = None;
    let mut content_type = None;

    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with("HTTP/") {
            size_bytes = None;
            content_type = None;
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim();
            let value = value.trim();
            if name.eq_ignore_ascii_case("content-length") {
                size_bytes = value.parse::<u64>().ok();
            }
            if name.eq_ignore_ascii_case("content-type") && !value.is_empty() {
                content_type = Some(value.to_string());
            }
        }
    }

    ResourceMetadata {
        size_bytes,
        content_type,
    }
}
