//! Pre-flight validation: decide whether a remote resource is acceptable
//! before committing any disk I/O.
//!
//! Format is checked from the URL alone (no network); size and content type
//! come from a `MetadataProbe`.

use std::sync::Arc;

use url::Url;

use crate::config::LimitsConfig;
use crate::error::{MdropError, Result};
use crate::fetch_head::{MetadataProbe, ProbeError, ResourceMetadata};
use crate::media::MediaKind;
use crate::url_model;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Outcome of a successful pre-flight check.
#[derive(Debug, Clone)]
pub struct Preflight {
    pub url: Url,
    pub kind: MediaKind,
    /// Extension (lowercase, no dot) the stored file will carry.
    pub extension: String,
    pub metadata: ResourceMetadata,
    /// Declared size in bytes.
    pub size_bytes: u64,
    /// Declared size in megabytes (unrounded).
    pub size_mb: f64,
}

/// Bytes to megabytes.
pub fn bytes_to_mb(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_MB
}

/// Megabytes rounded to two decimals, as reported to callers.
pub fn round_mb(bytes: u64) -> f64 {
    (bytes_to_mb(bytes) * 100.0).round() / 100.0
}

/// Parses the URL and resolves the stored extension for `kind`.
///
/// Falls back to the kind's default extension when the URL carries no usable
/// hint; rejects extensions outside the kind's supported set.
pub fn check_format(raw_url: &str, kind: MediaKind) -> Result<(Url, String)> {
    let url = url_model::parse_source_url(raw_url)
        .ok_or_else(|| MdropError::bad_request(format!("Invalid URL: {}", raw_url.trim())))?;
    let extension = url_model::extension_from_url_path(&url)
        .unwrap_or_else(|| kind.default_extension().to_string());
    if !kind.is_supported_extension(&extension) {
        return Err(MdropError::bad_request(format!(
            "Unsupported {} format: .{} (supported: {})",
            kind,
            extension,
            kind.supported_extensions().join(", ")
        )));
    }
    Ok((url, extension))
}

/// Loose content-type check. A missing content type is accepted.
pub fn check_content_type(kind: MediaKind, content_type: Option<&str>) -> Result<()> {
    match content_type {
        Some(ct) if !kind.accepts_content_type(ct) => Err(MdropError::bad_request(format!(
            "Invalid content type {:?}: expected {} content",
            ct, kind
        ))),
        _ => Ok(()),
    }
}

/// Rejects sizes strictly above `ceiling_mb`; returns the size in MB.
pub fn check_size(kind: MediaKind, size_bytes: u64, ceiling_mb: u64) -> Result<f64> {
    let size_mb = bytes_to_mb(size_bytes);
    if size_mb > ceiling_mb as f64 {
        return Err(MdropError::too_large(format!(
            "{} exceeds size limit of {}MB",
            kind.label(),
            ceiling_mb
        )));
    }
    Ok(size_mb)
}

/// Runs the full pre-flight check against an injectable probe.
#[derive(Clone)]
pub struct Validator {
    probe: Arc<dyn MetadataProbe>,
    limits: LimitsConfig,
}

impl Validator {
    pub fn new(probe: Arc<dyn MetadataProbe>, limits: LimitsConfig) -> Self {
        Self { probe, limits }
    }

    /// Format check, metadata probe, content-type and size checks, in that order.
    pub async fn validate(&self, raw_url: &str, kind: MediaKind) -> Result<Preflight> {
        let (url, extension) = check_format(raw_url, kind)?;

        let probe = Arc::clone(&self.probe);
        let target = url.to_string();
        let probed = tokio::task::spawn_blocking(move || probe.probe(&target))
            .await
            .map_err(|e| MdropError::internal(format!("probe task failed: {}", e)))?;

        let metadata = match probed {
            Ok(m) => m,
            Err(ProbeError::Http(code)) => {
                return Err(MdropError::bad_request(format!(
                    "Remote resource returned HTTP {}",
                    code
                )));
            }
            Err(ProbeError::Curl(e)) => {
                return Err(MdropError::internal(format!("Download failed: {}", e)));
            }
        };

        let size_bytes = metadata
            .size_bytes
            .ok_or_else(|| MdropError::bad_request(format!("Could not retrieve {} size", kind)))?;
        check_content_type(kind, metadata.content_type.as_deref())?;
        let size_mb = check_size(kind, size_bytes, self.limits.ceiling_mb(kind))?;

        tracing::debug!(
            url = %url,
            kind = %kind,
            extension = %extension,
            size_bytes,
            content_type = ?metadata.content_type,
            "pre-flight passed"
        );

        Ok(Preflight {
            url,
            kind,
            extension,
            metadata,
            size_bytes,
            size_mb,
        })
    }
}
