//! The two curl requests behind the probe strategies.

use std::str;

use super::parse::parse_headers;
use super::{ProbeError, ResourceMetadata};
use crate::client::RequestOptions;

/// Performs a HEAD request and returns parsed metadata.
///
/// Runs in the current thread; call from `spawn_blocking` if used from async code.
pub fn head(url: &str, opts: &RequestOptions) -> Result<ResourceMetadata, ProbeError> {
    let mut headers: Vec<String> = Vec::new();

    let mut easy = curl::easy::Easy::new();
    opts.apply(&mut easy, url)?;
    easy.nobody(true)?; // HEAD request

    {
        let mut transfer = easy.transfer();
        transfer.header_function(|data| {
            if let Ok(s) = str::from_utf8(data) {
                headers.push(s.trim_end().to_string());
            }
            true
        })?;
        transfer.perform()?;
    }

    let code = easy.response_code()?;
    if !(200..300).contains(&code) {
        return Err(ProbeError::Http(code));
    }

    Ok(parse_headers(&headers))
}

/// Performs a GET, keeps the response headers, and abandons the body as soon
/// as the first chunk arrives.
///
/// Runs in the current thread; call from `spawn_blocking` if used from async code.
pub fn get_headers(url: &str, opts: &RequestOptions) -> Result<ResourceMetadata, ProbeError> {
    let mut headers: Vec<String> = Vec::new();

    let mut easy = curl::easy::Easy::new();
    opts.apply(&mut easy, url)?;
    easy.get(true)?;

    let performed = {
        let mut transfer = easy.transfer();
        transfer.header_function(|data| {
            if let Ok(s) = str::from_utf8(data) {
                headers.push(s.trim_end().to_string());
            }
            true
        })?;
        // Returning 0 makes libcurl abort the transfer with a write error.
        transfer.write_function(|_data| Ok(0))?;
        let result = transfer.perform();
        result
    };

    match performed {
        Ok(()) => {}
        Err(e) if e.is_write_error() => {}
        Err(e) => return Err(ProbeError::Curl(e)),
    }

    let code = easy.response_code()?;
    if !(200..300).contains(&code) {
        return Err(ProbeError::Http(code));
    }

    Ok(parse_headers(&headers))
}
