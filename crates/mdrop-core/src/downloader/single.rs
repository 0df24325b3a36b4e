//! Single-stream HTTP GET downloader.
//!
//! Writes the response body sequentially to storage and aborts as soon as the
//! realized byte count passes the ceiling, whatever the origin declared.

use super::DownloadError;
use crate::client::RequestOptions;
use crate::storage::StorageWriter;

/// Downloads `url` with a single GET, appending to `storage`.
/// Returns the number of bytes written.
pub fn download_single(
    url: &str,
    opts: &RequestOptions,
    storage: &mut StorageWriter,
    max_bytes: u64,
) -> Result<u64, DownloadError> {
    let mut easy = curl::easy::Easy::new();
    opts.apply(&mut easy, url)?;
    // Error statuses must not land in the file.
    easy.fail_on_error(true)?;

    let mut exceeded = false;
    let mut storage_err: Option<anyhow::Error> = None;
    let result = {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| {
            if storage.written() + data.len() as u64 > max_bytes {
                exceeded = true;
                return Ok(0); // abort transfer
            }
            match storage.write_chunk(data) {
                Ok(()) => Ok(data.len()),
                Err(e) => {
                    tracing::warn!("single download write failed: {}", e);
                    storage_err = Some(e);
                    Ok(0)
                }
            }
        })?;
        let result = transfer.perform();
        result
    };

    if exceeded {
        return Err(DownloadError::TooLarge { limit: max_bytes });
    }
    if let Some(e) = storage_err {
        return Err(DownloadError::Storage(e));
    }
    if let Err(e) = result {
        if e.is_http_returned_error() {
            return Err(DownloadError::Http(easy.response_code()?));
        }
        return Err(DownloadError::Curl(e));
    }

    let code = easy.response_code()?;
    if !(200..300).contains(&code) {
        return Err(DownloadError::Http(code));
    }
    Ok(storage.written())
}
