//! Fetch a validated resource into the static root.

use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::{download_single, DownloadError};
use crate::client::RequestOptions;
use crate::error::{MdropError, Result};
use crate::media::MediaKind;
use crate::preflight::round_mb;
use crate::storage::{self, StorageWriter};
use crate::url_model;

/// Give up reserving a name after this many collisions.
const MAX_NAME_ATTEMPTS: u32 = 1000;

/// A file that landed in the static root.
#[derive(Debug, Clone, Serialize)]
pub struct StoredFile {
    pub path: PathBuf,
    pub filename: String,
    pub public_url: String,
    pub kind: MediaKind,
    pub size_bytes: u64,
    /// Size on disk in MB, rounded to two decimals.
    pub size_mb: f64,
}

/// Streams remote media into `<base_dir>/<videos|images>/`.
#[derive(Debug, Clone)]
pub struct Fetcher {
    base_dir: PathBuf,
    base_url: String,
    options: RequestOptions,
}

impl Fetcher {
    pub fn new(base_dir: PathBuf, base_url: String, options: RequestOptions) -> Self {
        Self {
            base_dir,
            base_url,
            options,
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Downloads `url` as `<prefix>_<millis>.<extension>`, enforcing `ceiling_mb`
    /// on the bytes actually received. No file is left behind on failure.
    pub async fn fetch(
        &self,
        url: &str,
        kind: MediaKind,
        extension: &str,
        prefix: &str,
        ceiling_mb: u64,
    ) -> Result<StoredFile> {
        let dir = storage::kind_dir(&self.base_dir, kind);
        let url_owned = url.to_string();
        let ext = extension.to_string();
        let prefix = prefix.to_string();
        let options = self.options.clone();
        let max_bytes = ceiling_mb.saturating_mul(1024 * 1024);

        let (final_path, filename, written) = tokio::task::spawn_blocking(
            move || -> std::result::Result<(PathBuf, String, u64), DownloadError> {
            let (final_path, filename, mut writer) = reserve(&dir, &prefix, &ext)?;
            tracing::debug!(url = %url_owned, path = %final_path.display(), "download started");
            match download_single(&url_owned, &options, &mut writer, max_bytes) {
                Ok(written) => {
                    writer
                        .finalize(&final_path)
                        .map_err(DownloadError::Storage)?;
                    Ok((final_path, filename, written))
                }
                Err(e) => {
                    writer.discard();
                    Err(e)
                }
            }
        })
        .await
        .map_err(|e| MdropError::internal(format!("download task failed: {}", e)))?
        .map_err(|e| {
            tracing::warn!(url = %url, kind = %kind, "download failed: {}", e);
            into_request_error(e, kind, ceiling_mb)
        })?;

        let size_bytes = match tokio::fs::metadata(&final_path).await {
            Ok(meta) => meta.len(),
            Err(e) => {
                tracing::warn!(path = %final_path.display(), "stat after download failed: {}", e);
                written
            }
        };

        let public_url = url_model::public_url(&self.base_url, kind, &filename);
        tracing::info!(
            url = %url,
            path = %final_path.display(),
            size_bytes,
            "download complete"
        );

        Ok(StoredFile {
            path: final_path,
            filename,
            public_url,
            kind,
            size_bytes,
            size_mb: round_mb(size_bytes),
        })
    }
}

/// Picks a free `<prefix>_<millis>.<ext>` in `dir` and opens its temp file.
/// On collision the timestamp is bumped by one millisecond.
fn reserve(
    dir: &Path,
    prefix: &str,
    ext: &str,
) -> std::result::Result<(PathBuf, String, StorageWriter), DownloadError> {
    let mut stamp = chrono::Utc::now().timestamp_millis();
    for _ in 0..MAX_NAME_ATTEMPTS {
        let filename = url_model::stored_filename(prefix, stamp, ext);
        let final_path = dir.join(&filename);
        if final_path.exists() {
            stamp += 1;
            continue;
        }
        match StorageWriter::create(&storage::temp_path(&final_path)) {
            Ok(writer) => return Ok((final_path, filename, writer)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => stamp += 1,
            Err(e) => {
                return Err(DownloadError::Storage(anyhow::Error::new(e).context(format!(
                    "failed to create temp file in {}",
                    dir.display()
                ))))
            }
        }
    }
    Err(DownloadError::Storage(anyhow::anyhow!(
        "no free file name in {} after {} attempts",
        dir.display(),
        MAX_NAME_ATTEMPTS
    )))
}

fn into_request_error(err: DownloadError, kind: MediaKind, ceiling_mb: u64) -> MdropError {
    match err {
        DownloadError::TooLarge { .. } => MdropError::too_large(format!(
            "{} exceeds size limit of {}MB",
            kind.label(),
            ceiling_mb
        )),
        DownloadError::Http(code) => {
            MdropError::bad_request(format!("Remote resource returned HTTP {}", code))
        }
        DownloadError::Curl(e) => MdropError::internal(format!("Download failed: {}", e)),
        DownloadError::Storage(e) => MdropError::internal(format!("File write error: {:#}", e)),
    }
}
