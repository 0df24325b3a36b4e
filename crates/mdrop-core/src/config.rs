use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::media::MediaKind;

/// Per-kind size ceilings in megabytes (1 MB = 1024 * 1024 bytes).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    pub video_mb: u64,
    pub image_mb: u64,
}

impl LimitsConfig {
    /// Size ceiling in megabytes for `kind`.
    pub fn ceiling_mb(&self, kind: MediaKind) -> u64 {
        match kind {
            MediaKind::Video => self.video_mb,
            MediaKind::Image => self.image_mb,
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            video_mb: 100,
            image_mb: 10,
        }
    }
}

/// Network timeouts for probe and download transfers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    /// TCP/TLS connect timeout in seconds.
    pub connect_secs: u64,
    /// Whole-request timeout for the HEAD probe and the header-only GET fallback.
    pub probe_secs: u64,
    /// Whole-request timeout for the streaming download.
    pub download_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 15,
            probe_secs: 30,
            download_secs: 3600,
        }
    }
}

/// Global configuration loaded from `~/.config/mdrop/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MdropConfig {
    /// Public base URL used to build returned download links.
    pub base_url: String,
    /// Interface the HTTP server binds to.
    pub host: String,
    /// Port the HTTP server listens on.
    pub port: u16,
    /// Static-serving root; `videos/` and `images/` live beneath it.
    pub base_dir: PathBuf,
    /// Hours a downloaded file is kept before deletion.
    pub retention_hours: f64,
    /// Optional User-Agent override for outbound requests (browser-like default otherwise).
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub timeouts: TimeoutConfig,
}

impl Default for MdropConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:6003".to_string(),
            host: "0.0.0.0".to_string(),
            port: 6003,
            base_dir: PathBuf::from("public"),
            retention_hours: 1.0,
            user_agent: None,
            limits: LimitsConfig::default(),
            timeouts: TimeoutConfig::default(),
        }
    }
}

impl MdropConfig {
    /// Retention window as a `Duration`. Negative or non-finite values count as zero.
    pub fn retention(&self) -> Duration {
        let secs = self.retention_hours * 3600.0;
        if secs.is_finite() && secs > 0.0 {
            Duration::from_secs_f64(secs)
        } else {
            Duration::ZERO
        }
    }

    /// Age after which a `.part` file cannot belong to a running transfer.
    pub fn partial_max_age(&self) -> Duration {
        Duration::from_secs(
            self.timeouts
                .probe_secs
                .saturating_add(self.timeouts.download_secs),
        )
    }

    /// Applies `BASE_URL`, `PORT` and `MDROP_BASE_DIR` from the process environment.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Applies overrides using `lookup` instead of the real environment.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base_url) = lookup("BASE_URL").filter(|s| !s.trim().is_empty()) {
            self.base_url = base_url.trim().to_string();
        }
        if let Some(port) = lookup("PORT").filter(|s| !s.trim().is_empty()) {
            self.port = port
                .trim()
                .parse()
                .with_context(|| format!("invalid PORT value: {port:?}"))?;
        }
        if let Some(dir) = lookup("MDROP_BASE_DIR").filter(|s| !s.trim().is_empty()) {
            self.base_dir = PathBuf::from(dir.trim());
        }
        Ok(())
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("mdrop")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<MdropConfig> {
    load_or_init_at(&config_path()?)
}

/// Like `load_or_init` but at an explicit path.
pub fn load_or_init_at(path: &Path) -> Result<MdropConfig> {
    if !path.exists() {
        let default_cfg = MdropConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    let cfg: MdropConfig =
        toml::from_str(&data).with_context(|| format!("invalid config: {}", path.display()))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn default_config_values() {
        let cfg = MdropConfig::default();
        assert_eq!(cfg.port, 6003);
        assert_eq!(cfg.limits.video_mb, 100);
        assert_eq!(cfg.limits.image_mb, 10);
        assert_eq!(cfg.retention(), Duration::from_secs(3600));
        assert_eq!(cfg.limits.ceiling_mb(MediaKind::Image), 10);
        assert_eq!(cfg.limits.ceiling_mb(MediaKind::Video), 100);
        assert_eq!(cfg.partial_max_age(), Duration::from_secs(3630));
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = MdropConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: MdropConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.base_url, cfg.base_url);
        assert_eq!(parsed.base_dir, cfg.base_dir);
        assert_eq!(parsed.limits.video_mb, cfg.limits.video_mb);
        assert_eq!(parsed.timeouts.download_secs, cfg.timeouts.download_secs);
    }

    #[test]
    fn config_toml_custom_values() {
        let toml = r#"
            base_url = "https://media.example.com"
            host = "127.0.0.1"
            port = 8080
            base_dir = "/srv/mdrop"
            retention_hours = 0.5

            [limits]
            video_mb = 250
            image_mb = 5
        "#;
        let cfg: MdropConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.base_dir, PathBuf::from("/srv/mdrop"));
        assert_eq!(cfg.retention(), Duration::from_secs(1800));
        assert_eq!(cfg.limits.ceiling_mb(MediaKind::Video), 250);
        assert_eq!(cfg.limits.ceiling_mb(MediaKind::Image), 5);
        // Missing section falls back to defaults.
        assert_eq!(cfg.timeouts.connect_secs, 15);
        assert!(cfg.user_agent.is_none());
    }

    #[test]
    fn negative_retention_is_zero() {
        let cfg = MdropConfig {
            retention_hours: -2.0,
            ..MdropConfig::default()
        };
        assert_eq!(cfg.retention(), Duration::ZERO);
    }

    #[test]
    fn env_overrides() {
        let env: HashMap<&str, &str> = [
            ("BASE_URL", "https://cdn.example.com"),
            ("PORT", "9000"),
            ("MDROP_BASE_DIR", "/var/lib/mdrop"),
        ]
        .into_iter()
        .collect();
        let mut cfg = MdropConfig::default();
        cfg.apply_env_from(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(cfg.base_url, "https://cdn.example.com");
        assert_eq!(cfg.port, 9000);
        assert_eq!(cfg.base_dir, PathBuf::from("/var/lib/mdrop"));
    }

    #[test]
    fn env_invalid_port_is_error() {
        let mut cfg = MdropConfig::default();
        let res = cfg.apply_env_from(|k| (k == "PORT").then(|| "http".to_string()));
        assert!(res.is_err());
        assert_eq!(cfg.port, 6003);
    }

    #[test]
    fn load_or_init_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let cfg = load_or_init_at(&path).unwrap();
        assert!(path.exists());
        assert_eq!(cfg.port, 6003);
        let again = load_or_init_at(&path).unwrap();
        assert_eq!(again.base_url, cfg.base_url);
    }
}
