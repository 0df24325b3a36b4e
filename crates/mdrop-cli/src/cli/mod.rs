//! CLI for the mdrop media service.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use mdrop_core::config::{self, MdropConfig};
use mdrop_core::MediaKind;
use std::path::PathBuf;

use commands::{run_fetch, run_serve, run_sweep};

/// Top-level CLI for mdrop.
#[derive(Debug, Parser)]
#[command(name = "mdrop")]
#[command(about = "mdrop: fetch remote media, serve it, delete it after a retention window", long_about = None)]
pub struct Cli {
    /// Log to stderr instead of the state-dir log file.
    #[arg(long, global = true)]
    pub log_stderr: bool,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Run the HTTP service (download endpoints + static files).
    Serve {
        /// Port to listen on (overrides config and PORT).
        #[arg(long)]
        port: Option<u16>,
        /// Interface to bind.
        #[arg(long)]
        host: Option<String>,
        /// Public base URL used in returned links (overrides config and BASE_URL).
        #[arg(long)]
        base_url: Option<String>,
        /// Static-serving root holding videos/ and images/.
        #[arg(long)]
        base_dir: Option<PathBuf>,
    },

    /// Download one URL, print the JSON response and exit.
    ///
    /// The deletion deadline is recorded on disk and enforced by the next
    /// `serve` start or `sweep`.
    Fetch {
        /// Direct HTTP/HTTPS URL of the media.
        url: String,
        /// Media type.
        #[arg(long = "type", value_name = "video|image")]
        kind: MediaKind,
        /// Prefix for the stored file name (default "file").
        #[arg(long)]
        name_prefix: Option<String>,
        /// Static-serving root holding videos/ and images/.
        #[arg(long)]
        base_dir: Option<PathBuf>,
    },

    /// Delete expired files and stale partials once, then exit.
    Sweep {
        /// Static-serving root holding videos/ and images/.
        #[arg(long)]
        base_dir: Option<PathBuf>,
    },
}

/// Flag values that take precedence over file and environment configuration.
#[derive(Debug, Default)]
pub struct Overrides {
    pub port: Option<u16>,
    pub host: Option<String>,
    pub base_url: Option<String>,
    pub base_dir: Option<PathBuf>,
}

impl Overrides {
    pub fn apply(self, cfg: &mut MdropConfig) {
        if let Some(port) = self.port {
            cfg.port = port;
        }
        if let Some(host) = self.host {
            cfg.host = host;
        }
        if let Some(base_url) = self.base_url {
            cfg.base_url = base_url;
        }
        if let Some(base_dir) = self.base_dir {
            cfg.base_dir = base_dir;
        }
    }
}

/// Config file, then environment, then flags.
fn load_config(overrides: Overrides) -> Result<MdropConfig> {
    let mut cfg = config::load_or_init()?;
    cfg.apply_env()?;
    overrides.apply(&mut cfg);
    tracing::debug!("loaded config: {:?}", cfg);
    Ok(cfg)
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            CliCommand::Serve {
                port,
                host,
                base_url,
                base_dir,
            } => {
                let cfg = load_config(Overrides {
                    port,
                    host,
                    base_url,
                    base_dir,
                })?;
                run_serve(cfg).await?;
            }
            CliCommand::Fetch {
                url,
                kind,
                name_prefix,
                base_dir,
            } => {
                let cfg = load_config(Overrides {
                    base_dir,
                    ..Overrides::default()
                })?;
                run_fetch(cfg, &url, kind, name_prefix).await?;
            }
            CliCommand::Sweep { base_dir } => {
                let cfg = load_config(Overrides {
                    base_dir,
                    ..Overrides::default()
                })?;
                run_sweep(&cfg).await?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
