//! Media kinds accepted by the service and their per-kind rules.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "webm", "mkv"];
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// Content types accepted for any kind; many origins label media this way.
const GENERIC_BINARY_TYPES: &[&str] = &["application/octet-stream", "binary/octet-stream"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Image,
}

impl MediaKind {
    pub const ALL: [MediaKind; 2] = [MediaKind::Video, MediaKind::Image];

    /// Extensions (lowercase, no dot) accepted for this kind.
    pub fn supported_extensions(self) -> &'static [&'static str] {
        match self {
            MediaKind::Video => VIDEO_EXTENSIONS,
            MediaKind::Image => IMAGE_EXTENSIONS,
        }
    }

    /// Extension used when the URL carries no usable hint.
    pub fn default_extension(self) -> &'static str {
        match self {
            MediaKind::Video => "mp4",
            MediaKind::Image => "jpg",
        }
    }

    pub fn is_supported_extension(self, ext: &str) -> bool {
        let ext = ext.trim_start_matches('.');
        self.supported_extensions()
            .iter()
            .any(|e| e.eq_ignore_ascii_case(ext))
    }

    /// Subdirectory of the static root (and URL path segment) for this kind.
    pub fn subdir(self) -> &'static str {
        match self {
            MediaKind::Video => "videos",
            MediaKind::Image => "images",
        }
    }

    /// Content-type family substring (`video`, `image`).
    pub fn family(self) -> &'static str {
        match self {
            MediaKind::Video => "video",
            MediaKind::Image => "image",
        }
    }

    /// Capitalized label used in user-facing messages.
    pub fn label(self) -> &'static str {
        match self {
            MediaKind::Video => "Video",
            MediaKind::Image => "Image",
        }
    }

    /// Loose content-type check: family substring or a generic binary type.
    pub fn accepts_content_type(self, content_type: &str) -> bool {
        let ct = content_type.to_ascii_lowercase();
        ct.contains(self.family()) || GENERIC_BINARY_TYPES.iter().any(|g| ct.contains(g))
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.family())
    }
}

impl FromStr for MediaKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "video" => Ok(MediaKind::Video),
            "image" => Ok(MediaKind::Image),
            other => Err(format!("unknown media type: {other:?} (expected video or image)")),
        }
    }
}
