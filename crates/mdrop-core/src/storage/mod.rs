//! Disk I/O and file lifecycle for downloaded media.
//!
//! Downloads stream into a `.part` file created exclusively next to the
//! final path, then are renamed into place. Partial data never sits under a
//! served name.

mod layout;
mod writer;

pub use layout::{ensure_layout, kind_dir};
pub use writer::StorageWriter;

/// Temporary file suffix used before the final rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the temp file: appends `.part` to the final path (e.g. `a_1.mp4` → `a_1.mp4.part`).
pub fn temp_path(final_path: &std::path::Path) -> std::path::PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    std::path::PathBuf::from(o)
}

/// True when `path` names an in-progress download.
pub fn is_temp_path(path: &std::path::Path) -> bool {
    path.to_string_lossy().ends_with(TEMP_SUFFIX)
}
