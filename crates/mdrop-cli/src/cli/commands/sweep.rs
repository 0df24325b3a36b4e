//! `mdrop sweep` – delete expired files once.

use anyhow::Result;
use mdrop_core::config::MdropConfig;
use mdrop_core::expiry;

pub async fn run_sweep(cfg: &MdropConfig) -> Result<()> {
    let report = expiry::sweep(&cfg.base_dir, cfg.retention(), cfg.partial_max_age()).await?;
    println!(
        "deleted {}, adopted {}, stale removed {}",
        report.deleted, report.adopted, report.stale_removed
    );
    Ok(())
}
