//! Startup reconciliation: re-arm or execute deletions for files already on disk.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::path::Path;
use std::time::Duration;

use super::record::{file_for_record, is_record_path, ExpiryRecord};
use super::scheduler::{delete_now, DeletionScheduler};
use crate::media::MediaKind;
use crate::storage;

/// What a reconcile or sweep pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Files past their deadline, removed now.
    pub deleted: usize,
    /// Files still within retention, re-armed in the scheduler.
    pub rescheduled: usize,
    /// Files without a record; a deadline was derived from their mtime.
    pub adopted: usize,
    /// Leftover `.part` files and records with no file, removed.
    pub stale_removed: usize,
}

/// Scans every kind directory under `base_dir`: deletes what is due and
/// schedules the rest on `scheduler`.
pub async fn reconcile(
    base_dir: &Path,
    retention: Duration,
    scheduler: &DeletionScheduler,
) -> Result<ReconcileReport> {
    let report = scan(base_dir, retention, None, Some(scheduler)).await?;
    tracing::info!(
        deleted = report.deleted,
        rescheduled = report.rescheduled,
        adopted = report.adopted,
        stale_removed = report.stale_removed,
        "expiry reconciled"
    );
    Ok(report)
}

/// One-shot pass: deletes what is due and leaves the rest untouched on disk.
///
/// A running server may be writing `.part` files, so only those last modified
/// at least `partial_max_age` ago are removed.
pub async fn sweep(
    base_dir: &Path,
    retention: Duration,
    partial_max_age: Duration,
) -> Result<ReconcileReport> {
    scan(base_dir, retention, Some(partial_max_age), None).await
}

/// `partial_max_age: None` removes every temp file.
async fn scan(
    base_dir: &Path,
    retention: Duration,
    partial_max_age: Option<Duration>,
    scheduler: Option<&DeletionScheduler>,
) -> Result<ReconcileReport> {
    let mut report = ReconcileReport::default();
    let now = Utc::now();
    for kind in MediaKind::ALL {
        let dir = storage::kind_dir(base_dir, kind);
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(e) => e,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read {}", dir.display()))
            }
        };

        while let Some(entry) = entries
            .next_entry()
            .await
            .with_context(|| format!("failed to read entry in {}", dir.display()))?
        {
            let path = entry.path();
            let meta = match entry.metadata().await {
                Ok(m) => m,
                // Removed earlier in this pass along with its file.
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "failed to read file metadata");
                    continue;
                }
            };
            if !meta.is_file() {
                continue;
            }

            if is_record_path(&path) {
                let orphaned = file_for_record(&path).map_or(true, |f| !f.exists());
                if orphaned && remove_quietly(&path).await {
                    report.stale_removed += 1;
                }
                continue;
            }
            if storage::is_temp_path(&path) {
                let stale = partial_max_age.map_or(true, |max_age| {
                    meta.modified()
                        .map(|m| m.elapsed().unwrap_or_default() >= max_age)
                        .unwrap_or(false)
                });
                if stale && remove_quietly(&path).await {
                    report.stale_removed += 1;
                }
                continue;
            }

            let record = match ExpiryRecord::load(&path).await {
                Ok(Some(r)) => r,
                Ok(None) | Err(_) => {
                    let created: DateTime<Utc> = meta
                        .modified()
                        .map(DateTime::<Utc>::from)
                        .unwrap_or(now);
                    let r = ExpiryRecord::new(created, retention);
                    if let Err(e) = r.save(&path).await {
                        tracing::warn!(path = %path.display(), "failed to write expiry record: {:#}", e);
                    }
                    report.adopted += 1;
                    r
                }
            };

            if record.is_due(now) {
                delete_now(&path).await;
                report.deleted += 1;
            } else if let Some(s) = scheduler {
                s.schedule_in(path, record.remaining(now));
                report.rescheduled += 1;
            }
        }
    }
    Ok(report)
}

async fn remove_quietly(path: &Path) -> bool {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "removed stale file");
            true
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to remove stale file");
            false
        }
    }
}
