//! `mdrop fetch` – one-off download printing the JSON response.

use anyhow::{Context, Result};
use mdrop_core::config::MdropConfig;
use mdrop_core::{DownloadRequest, MediaKind, MediaService};

pub async fn run_fetch(
    cfg: MdropConfig,
    url: &str,
    kind: MediaKind,
    name_prefix: Option<String>,
) -> Result<()> {
    let service = MediaService::new(cfg);
    let req = DownloadRequest {
        url: url.to_string(),
        name_prefix,
        kind,
    };
    let response = service
        .download_detached(req)
        .await
        .map_err(|e| anyhow::anyhow!("{} (HTTP {})", e, e.status_code()))?;
    let json = serde_json::to_string_pretty(&response).context("failed to encode response")?;
    println!("{}", json);
    Ok(())
}
