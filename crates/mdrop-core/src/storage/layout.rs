//! Static-root directory layout: `<base>/videos` and `<base>/images`.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::media::MediaKind;

/// Directory holding files of `kind` under `base_dir`.
pub fn kind_dir(base_dir: &Path, kind: MediaKind) -> PathBuf {
    base_dir.join(kind.subdir())
}

/// Creates the base directory and one subdirectory per kind. Idempotent.
pub async fn ensure_layout(base_dir: &Path) -> Result<()> {
    for kind in MediaKind::ALL {
        let dir = kind_dir(base_dir, kind);
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("failed to create {}", dir.display()))?;
    }
    tracing::debug!(base_dir = %base_dir.display(), "storage layout ready");
    Ok(())
}
