//! CLI configuration: optional `config.toml` plus env-var overrides.
//!
//! Resolution order for the shared root: `--root` flag, `DROPCHAT_ROOT`,
//! then the `root` key in `config.toml`. The user name resolves the same
//! way via `--as` / `DROPCHAT_USER` / `user`. Intervals and the presence
//! TTL fall back to built-in defaults.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// How often a watch session polls the room for new records.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 2;
/// How often a watch session refreshes its presence heartbeat.
pub const DEFAULT_HEARTBEAT_INTERVAL_SECS: u64 = 30;
/// Staleness window after which a heartbeat no longer counts as present.
pub const DEFAULT_PRESENCE_TTL_SECS: i64 = 90;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Shared root directory (typically a mounted network folder).
    pub root: Option<PathBuf>,

    /// Display name used for posts and heartbeats.
    pub user: Option<String>,

    pub poll_interval_secs: Option<u64>,
    pub heartbeat_interval_secs: Option<u64>,
    pub presence_ttl_secs: Option<i64>,
}

impl Config {
    /// Load the config file, falling back to defaults when it is missing or
    /// malformed. A malformed file is logged, never fatal.
    pub fn load() -> Self {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    fn load_from(path: &Path) -> Self {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(_) => return Self::default(),
        };
        match toml::from_str(&raw) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("ignoring malformed config {}: {e}", path.display());
                Self::default()
            }
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.unwrap_or(DEFAULT_POLL_INTERVAL_SECS))
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(
            self.heartbeat_interval_secs
                .unwrap_or(DEFAULT_HEARTBEAT_INTERVAL_SECS),
        )
    }

    pub fn presence_ttl_secs(&self) -> i64 {
        self.presence_ttl_secs.unwrap_or(DEFAULT_PRESENCE_TTL_SECS)
    }
}

fn config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("DROPCHAT_CONFIG") {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|dir| dir.join("dropchat").join("config.toml"))
}

/// Resolve the shared root from flag, env, or config.
pub fn resolve_root(flag: Option<PathBuf>, config: &Config) -> Result<PathBuf> {
    if let Some(root) = flag {
        return Ok(root);
    }
    if let Ok(root) = std::env::var("DROPCHAT_ROOT") {
        return Ok(PathBuf::from(root));
    }
    config.root.clone().context(
        "No shared root configured. Pass --root, set DROPCHAT_ROOT, \
         or add `root` to config.toml",
    )
}

/// Resolve the user display name from flag, env, or config.
pub fn resolve_user(flag: Option<String>, config: &Config) -> Result<String> {
    flag.or_else(|| std::env::var("DROPCHAT_USER").ok())
        .or_else(|| config.user.clone())
        .context(
            "No user name configured. Pass --as, set DROPCHAT_USER, \
             or add `user` to config.toml",
        )
}
