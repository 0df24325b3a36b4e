//! Streaming downloader: one GET per request, body written sequentially to a
//! `.part` file and renamed into the static root on success.

mod fetcher;
mod single;

pub use fetcher::{Fetcher, StoredFile};
pub use single::download_single;

use thiserror::Error;

/// Failure of a single streaming transfer.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("transfer failed: {0}")]
    Curl(#[from] curl::Error),
    #[error("remote returned HTTP {0}")]
    Http(u32),
    #[error("storage error: {0:#}")]
    Storage(anyhow::Error),
    /// The body grew past `limit` bytes; the transfer was aborted.
    #[error("body exceeded {limit} bytes")]
    TooLarge { limit: u64 },
}
