//! Service facade: validate, fetch, schedule expiry, answer.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::client::RequestOptions;
use crate::config::MdropConfig;
use crate::downloader::{Fetcher, StoredFile};
use crate::error::{MdropError, Result};
use crate::expiry::{self, DeletionScheduler, ExpiryRecord, ReconcileReport};
use crate::fetch_head::{MetadataProbe, ProbeChain};
use crate::media::MediaKind;
use crate::preflight::Validator;
use crate::storage;
use crate::url_model::DEFAULT_PREFIX;

/// One fetch-and-serve request.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DownloadRequest {
    pub url: String,
    #[serde(default)]
    pub name_prefix: Option<String>,
    pub kind: MediaKind,
}

impl DownloadRequest {
    pub fn new(url: impl Into<String>, kind: MediaKind) -> Self {
        Self {
            url: url.into(),
            name_prefix: None,
            kind,
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.name_prefix = Some(prefix.into());
        self
    }

    fn prefix(&self) -> &str {
        self.name_prefix
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .unwrap_or(DEFAULT_PREFIX)
    }
}

/// Success body: public URL and on-disk size in MB (two decimals).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadResponse {
    pub url: String,
    pub size: f64,
}

impl From<&StoredFile> for DownloadResponse {
    fn from(file: &StoredFile) -> Self {
        Self {
            url: file.public_url.clone(),
            size: file.size_mb,
        }
    }
}

/// Composes validator, fetcher and deletion scheduler over one config.
#[derive(Clone)]
pub struct MediaService {
    config: Arc<MdropConfig>,
    validator: Validator,
    fetcher: Fetcher,
    scheduler: DeletionScheduler,
}

impl MediaService {
    /// Service with the standard HEAD-then-GET probe chain.
    pub fn new(config: MdropConfig) -> Self {
        let probe = Arc::new(ProbeChain::standard(RequestOptions::probe(&config)));
        Self::with_probe(config, probe)
    }

    pub fn with_probe(config: MdropConfig, probe: Arc<dyn MetadataProbe>) -> Self {
        let validator = Validator::new(probe, config.limits.clone());
        let fetcher = Fetcher::new(
            config.base_dir.clone(),
            config.base_url.clone(),
            RequestOptions::download(&config),
        );
        Self {
            config: Arc::new(config),
            validator,
            fetcher,
            scheduler: DeletionScheduler::new(),
        }
    }

    pub fn config(&self) -> &MdropConfig {
        &self.config
    }

    pub fn scheduler(&self) -> &DeletionScheduler {
        &self.scheduler
    }

    /// Provisions the layout and re-arms deletions for files already on disk.
    pub async fn prepare(&self) -> anyhow::Result<ReconcileReport> {
        storage::ensure_layout(&self.config.base_dir).await?;
        expiry::reconcile(&self.config.base_dir, self.config.retention(), &self.scheduler).await
    }

    /// Validates and stores the resource. Nothing is scheduled.
    pub async fn store(&self, req: &DownloadRequest) -> Result<StoredFile> {
        let pre = self.validator.validate(&req.url, req.kind).await?;
        storage::ensure_layout(&self.config.base_dir)
            .await
            .map_err(|e| MdropError::internal(format!("File write error: {:#}", e)))?;
        self.fetcher
            .fetch(
                pre.url.as_str(),
                req.kind,
                &pre.extension,
                req.prefix(),
                self.config.limits.ceiling_mb(req.kind),
            )
            .await
    }

    /// Full request: store, then arm deletion after the retention window.
    pub async fn download(&self, req: DownloadRequest) -> Result<DownloadResponse> {
        let stored = self.store(&req).await?;
        self.scheduler
            .schedule(stored.path.clone(), self.config.retention())
            .await;
        Ok(DownloadResponse::from(&stored))
    }

    /// Store and persist the deadline only; the next reconcile or sweep enforces it.
    pub async fn download_detached(&self, req: DownloadRequest) -> Result<DownloadResponse> {
        let stored = self.store(&req).await?;
        let record = ExpiryRecord::new(chrono::Utc::now(), self.config.retention());
        if let Err(e) = record.save(&stored.path).await {
            tracing::warn!(path = %stored.path.display(), "failed to write expiry record: {:#}", e);
        }
        Ok(DownloadResponse::from(&stored))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch_head::{ProbeError, ResourceMetadata};

    struct Oversized;

    impl MetadataProbe for Oversized {
        fn name(&self) -> &'static str {
            "oversized"
        }

        fn probe(&self, _url: &str) -> std::result::Result<ResourceMetadata, ProbeError> {
            Ok(ResourceMetadata {
                size_bytes: Some(150 * 1024 * 1024),
                content_type: Some("video/mp4".to_string()),
            })
        }
    }

    #[test]
    fn prefix_defaults_to_file() {
        let req = DownloadRequest::new("https://example.com/a.mp4", MediaKind::Video);
        assert_eq!(req.prefix(), "file");
        assert_eq!(req.clone().with_prefix("  ").prefix(), "file");
        assert_eq!(req.with_prefix("abc").prefix(), "abc");
    }

    #[test]
    fn response_serializes_url_and_size() {
        let json = serde_json::to_value(DownloadResponse {
            url: "http://localhost:6003/videos/abc_1.mp4".to_string(),
            size: 5.0,
        })
        .unwrap();
        assert_eq!(json["url"], "http://localhost:6003/videos/abc_1.mp4");
        assert_eq!(json["size"], 5.0);
    }

    #[tokio::test]
    async fn rejected_request_touches_no_disk() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("public");
        let cfg = MdropConfig {
            base_dir: base.clone(),
            ..MdropConfig::default()
        };
        let service = MediaService::with_probe(cfg, Arc::new(Oversized));
        let err = service
            .download(DownloadRequest::new("https://example.com/big.mp4", MediaKind::Video))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 413);
        assert!(!base.exists());
        assert_eq!(service.scheduler().pending_count(), 0);
    }

    #[tokio::test]
    async fn prepare_creates_layout() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = MdropConfig {
            base_dir: dir.path().join("public"),
            ..MdropConfig::default()
        };
        let service = MediaService::new(cfg);
        let report = service.prepare().await.unwrap();
        assert_eq!(report, ReconcileReport::default());
        assert!(dir.path().join("public").join("videos").is_dir());
        assert!(dir.path().join("public").join("images").is_dir());
    }
}
