//! On-disk expiry sidecars (`<file>.expiry.json`) so deadlines survive restarts.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const RECORD_SUFFIX: &str = ".expiry.json";

/// When a stored file was written and when it must be gone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpiryRecord {
    pub created_at: DateTime<Utc>,
    pub delete_at: DateTime<Utc>,
}

impl ExpiryRecord {
    pub fn new(created_at: DateTime<Utc>, retention: Duration) -> Self {
        let retention = chrono::Duration::from_std(retention).unwrap_or(chrono::Duration::MAX);
        let delete_at = created_at
            .checked_add_signed(retention)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self {
            created_at,
            delete_at,
        }
    }

    /// Time left until `delete_at`; zero once the deadline has passed.
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        (self.delete_at - now).to_std().unwrap_or(Duration::ZERO)
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.delete_at <= now
    }

    pub async fn save(&self, file: &Path) -> Result<()> {
        let path = record_path(file);
        let json = serde_json::to_vec_pretty(self)?;
        tokio::fs::write(&path, json)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }

    /// Reads the sidecar for `file`. `Ok(None)` when there is none.
    pub async fn load(file: &Path) -> Result<Option<Self>> {
        let path = record_path(file);
        let data = match tokio::fs::read(&path).await {
            Ok(d) => d,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read {}", path.display()))
            }
        };
        let record = serde_json::from_slice(&data)
            .with_context(|| format!("invalid expiry record: {}", path.display()))?;
        Ok(Some(record))
    }
}

/// Sidecar path for a stored file.
pub fn record_path(file: &Path) -> PathBuf {
    let mut o = file.as_os_str().to_owned();
    o.push(RECORD_SUFFIX);
    PathBuf::from(o)
}

pub fn is_record_path(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.ends_with(RECORD_SUFFIX))
        .unwrap_or(false)
}

/// The stored file a sidecar belongs to.
pub fn file_for_record(record: &Path) -> Option<PathBuf> {
    let name = record.file_name()?.to_str()?;
    let stem = name.strip_suffix(RECORD_SUFFIX)?;
    if stem.is_empty() {
        return None;
    }
    Some(record.with_file_name(stem))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sidecar_paths() {
        let file = Path::new("/srv/public/videos/a_1.mp4");
        let rec = record_path(file);
        assert_eq!(rec, Path::new("/srv/public/videos/a_1.mp4.expiry.json"));
        assert!(is_record_path(&rec));
        assert!(!is_record_path(file));
        assert_eq!(file_for_record(&rec).unwrap(), file);
        assert!(file_for_record(Path::new("/x/.expiry.json")).is_none());
    }

    #[test]
    fn remaining_and_due() {
        let t0 = Utc::now();
        let rec = ExpiryRecord::new(t0, Duration::from_secs(3600));
        assert_eq!(rec.remaining(t0), Duration::from_secs(3600));
        assert!(!rec.is_due(t0));
        let later = t0 + chrono::Duration::hours(2);
        assert_eq!(rec.remaining(later), Duration::ZERO);
        assert!(rec.is_due(later));
    }

    #[tokio::test]
    async fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a_1.png");
        assert!(ExpiryRecord::load(&file).await.unwrap().is_none());
        let rec = ExpiryRecord::new(Utc::now(), Duration::from_secs(60));
        rec.save(&file).await.unwrap();
        assert_eq!(ExpiryRecord::load(&file).await.unwrap(), Some(rec));
    }

    #[tokio::test]
    async fn corrupt_record_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a_1.png");
        std::fs::write(record_path(&file), b"{not json").unwrap();
        assert!(ExpiryRecord::load(&file).await.is_err());
    }
}
