//! In-process deletion timers for stored files.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::Utc;
use tokio::task::AbortHandle;

use super::record::{record_path, ExpiryRecord};

struct Pending {
    id: u64,
    handle: AbortHandle,
}

/// Deletes each scheduled file once its delay elapses. Cheap to clone.
///
/// Scheduling a path that is already pending replaces the earlier timer.
#[derive(Clone, Default)]
pub struct DeletionScheduler {
    pending: Arc<Mutex<HashMap<PathBuf, Pending>>>,
    next_id: Arc<AtomicU64>,
}

impl DeletionScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Persists an expiry record for `path` and deletes the file after `retention`.
    pub async fn schedule(&self, path: PathBuf, retention: Duration) {
        let record = ExpiryRecord::new(Utc::now(), retention);
        if let Err(e) = record.save(&path).await {
            // The in-memory timer still runs; only restart recovery is lost.
            tracing::warn!(path = %path.display(), "failed to write expiry record: {:#}", e);
        }
        self.schedule_in(path, retention);
    }

    /// Deletes `path` (and its expiry record) after `delay`. Requires a tokio runtime.
    pub fn schedule_in(&self, path: PathBuf, delay: Duration) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let pending = Arc::clone(&self.pending);
        let task_path = path.clone();
        // Deadline is fixed here, not when the task is first polled.
        let deadline = tokio::time::Instant::now() + delay;

        // Spawn under the lock so the task cannot finish before it is registered.
        let mut map = lock(&self.pending);
        let handle = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            delete_now(&task_path).await;
            let mut map = lock(&pending);
            if map.get(&task_path).map(|p| p.id) == Some(id) {
                map.remove(&task_path);
            }
        });
        if let Some(old) = map.insert(
            path.clone(),
            Pending {
                id,
                handle: handle.abort_handle(),
            },
        ) {
            old.handle.abort();
        }
        tracing::debug!(path = %path.display(), delay_secs = delay.as_secs(), "deletion scheduled");
    }

    /// Cancels a pending deletion. Returns false if none was pending.
    pub fn cancel(&self, path: &Path) -> bool {
        match lock(&self.pending).remove(path) {
            Some(p) => {
                p.handle.abort();
                true
            }
            None => false,
        }
    }

    pub fn is_pending(&self, path: &Path) -> bool {
        lock(&self.pending).contains_key(path)
    }

    pub fn pending_count(&self) -> usize {
        lock(&self.pending).len()
    }

    /// Aborts every pending timer. Files stay on disk with their records.
    pub fn shutdown(&self) {
        let mut map = lock(&self.pending);
        for (_, p) in map.drain() {
            p.handle.abort();
        }
    }
}

fn lock(m: &Mutex<HashMap<PathBuf, Pending>>) -> MutexGuard<'_, HashMap<PathBuf, Pending>> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

/// Removes a stored file and its expiry record. Missing files are fine.
pub(crate) async fn delete_now(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => tracing::info!(path = %path.display(), "expired file deleted"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "expired file already gone")
        }
        Err(e) => tracing::warn!(
            path = %path.display(),
            error = %e,
            "failed to delete expired file"
        ),
    }
    let record = record_path(path);
    if let Err(e) = tokio::fs::remove_file(&record).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(path = %record.display(), error = %e, "failed to delete expiry record");
        }
    }
}
