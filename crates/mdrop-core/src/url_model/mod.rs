//! URL modeling and stored-filename derivation.
//!
//! Turns a source URL plus caller prefix into a safe local filename and the
//! public URL it will be served at.

mod path;
mod sanitize;

pub use path::{extension_from_url_path, parse_source_url};
pub use sanitize::sanitize_prefix;

use crate::media::MediaKind;

/// Prefix used when the caller supplies none (or nothing survives sanitizing).
pub const DEFAULT_PREFIX: &str = "file";

/// Builds `<prefix>_<stamp>.<ext>` with a sanitized prefix.
///
/// # Examples
///
/// - `stored_filename("abc", 1700000000000, "mp4")` → `"abc_1700000000000.mp4"`
/// - `stored_filename("../x", 5, "jpg")` → `"x_5.jpg"`
pub fn stored_filename(prefix: &str, stamp: i64, ext: &str) -> String {
    let sanitized = sanitize_prefix(prefix);
    let prefix = if sanitized.is_empty() {
        DEFAULT_PREFIX
    } else {
        sanitized.as_str()
    };
    format!("{}_{}.{}", prefix, stamp, ext.trim_start_matches('.'))
}

/// Public URL for a stored file: `<base>/<videos|images>/<filename>`.
pub fn public_url(base_url: &str, kind: MediaKind, filename: &str) -> String {
    format!(
        "{}/{}/{}",
        base_url.trim_end_matches('/'),
        kind.subdir(),
        filename
    )
}
