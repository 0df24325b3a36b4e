//! Outbound request options shared by the metadata probe and the downloader.
//!
//! Some origins refuse requests carrying a default client identifier or
//! answer lightweight probes badly, so every outbound request looks like a
//! desktop browser.

use std::time::Duration;

use crate::config::MdropConfig;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

const MAX_REDIRECTIONS: u32 = 10;

/// Headers sent with every outbound request (besides User-Agent).
pub fn browser_headers() -> Vec<(String, String)> {
    [
        ("Accept", "*/*"),
        ("Accept-Language", "en-US,en;q=0.9"),
        // Identity keeps Content-Length equal to the bytes written to disk.
        ("Accept-Encoding", "identity"),
        ("Connection", "keep-alive"),
        ("Sec-Fetch-Dest", "empty"),
        ("Sec-Fetch-Mode", "no-cors"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// curl settings for one request.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub user_agent: String,
    pub headers: Vec<(String, String)>,
    pub connect_timeout: Duration,
    pub timeout: Duration,
    /// Abort when the transfer stays under 1 KiB/s for this long.
    pub low_speed_time: Option<Duration>,
}

impl RequestOptions {
    /// Options for the HEAD probe and the header-only GET fallback.
    pub fn probe(cfg: &MdropConfig) -> Self {
        Self {
            user_agent: user_agent(cfg),
            headers: browser_headers(),
            connect_timeout: Duration::from_secs(cfg.timeouts.connect_secs),
            timeout: Duration::from_secs(cfg.timeouts.probe_secs),
            low_speed_time: None,
        }
    }

    /// Options for the streaming body download.
    pub fn download(cfg: &MdropConfig) -> Self {
        Self {
            user_agent: user_agent(cfg),
            headers: browser_headers(),
            connect_timeout: Duration::from_secs(cfg.timeouts.connect_secs),
            timeout: Duration::from_secs(cfg.timeouts.download_secs),
            low_speed_time: Some(Duration::from_secs(60)),
        }
    }

    /// Applies URL, redirects, timeouts and headers to a curl handle.
    pub(crate) fn apply(&self, easy: &mut curl::easy::Easy, url: &str) -> Result<(), curl::Error> {
        easy.url(url)?;
        easy.follow_location(true)?;
        easy.max_redirections(MAX_REDIRECTIONS)?;
        easy.connect_timeout(self.connect_timeout)?;
        easy.timeout(self.timeout)?;
        if let Some(t) = self.low_speed_time {
            easy.low_speed_limit(1024)?;
            easy.low_speed_time(t)?;
        }
        easy.useragent(&self.user_agent)?;

        // Build curl list for headers (e.g. "Name: value").
        let mut list = curl::easy::List::new();
        for (k, v) in &self.headers {
            list.append(&format!("{}: {}", k.trim(), v.trim()))?;
        }
        if !self.headers.is_empty() {
            easy.http_headers(list)?;
        }
        Ok(())
    }
}

fn user_agent(cfg: &MdropConfig) -> String {
    cfg.user_agent
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_USER_AGENT)
        .to_string()
}
