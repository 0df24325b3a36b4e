//! Sequential writer for temp download files.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Writer for a `.part` file. Bytes are appended in arrival order.
pub struct StorageWriter {
    file: BufWriter<File>,
    temp_path: PathBuf,
    written: u64,
}

impl StorageWriter {
    /// Create a new temp file at `temp_path`. Fails with `AlreadyExists` if the
    /// path is taken, so two requests never share a file.
    pub fn create(temp_path: &Path) -> std::io::Result<Self> {
        let file = File::options()
            .write(true)
            .create_new(true)
            .open(temp_path)?;
        Ok(StorageWriter {
            file: BufWriter::new(file),
            temp_path: temp_path.to_path_buf(),
            written: 0,
        })
    }

    /// Append `data` at the current end of file.
    pub fn write_chunk(&mut self, data: &[u8]) -> Result<()> {
        self.file
            .write_all(data)
            .with_context(|| format!("write to {} failed", self.temp_path.display()))?;
        self.written += data.len() as u64;
        Ok(())
    }

    /// Bytes appended so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Path to the current temp file.
    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Flush, sync and move the temp file to `final_path`. Consumes the writer.
    ///
    /// Never replaces an existing file at `final_path`. On any failure the
    /// temp file is removed.
    pub fn finalize(mut self, final_path: &Path) -> Result<()> {
        let result = self.persist(final_path);
        if result.is_err() {
            self.discard();
        }
        result
    }

    fn persist(&mut self, final_path: &Path) -> Result<()> {
        self.file.flush().context("storage flush failed")?;
        self.file.get_ref().sync_all().context("storage sync failed")?;

        match std::fs::hard_link(&self.temp_path, final_path) {
            Ok(()) => {
                if let Err(e) = std::fs::remove_file(&self.temp_path) {
                    tracing::warn!(path = %self.temp_path.display(), "failed to remove temp file: {}", e);
                }
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Err(anyhow::Error::new(e)
                .context(format!("{} already exists", final_path.display()))),
            // Filesystems without hard links: check, then rename.
            Err(link_err) => {
                if final_path.exists() {
                    anyhow::bail!("{} already exists", final_path.display());
                }
                tracing::debug!("hard link unavailable ({}), renaming", link_err);
                std::fs::rename(&self.temp_path, final_path).with_context(|| {
                    format!(
                        "failed to rename {} to {}",
                        self.temp_path.display(),
                        final_path.display()
                    )
                })
            }
        }
    }

    /// Drop the writer and remove the temp file.
    pub fn discard(self) {
        let temp_path = self.temp_path.clone();
        drop(self.file);
        if let Err(e) = std::fs::remove_file(&temp_path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %temp_path.display(), "failed to remove partial file: {}", e);
            }
        }
    }
}
