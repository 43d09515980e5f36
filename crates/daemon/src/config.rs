use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use lifeline_core::{LocationFix, PermissionGrant, TriggerTuning};

#[derive(Debug, Clone)]
pub struct DaemonConfig {
    pub listen: SocketAddr,
    /// JSON contact store. In-memory when absent.
    pub store_path: Option<PathBuf>,
    pub notify_url: String,
    pub notify_timeout_ms: u64,
    pub tuning: TriggerTuning,
    pub initial_volume: Option<i32>,
    pub fixed_location: Option<LocationFix>,
    pub grant: PermissionGrant,
    pub queue_capacity: usize,
}

/// Read tuning overrides from a TOML file. Missing keys keep their defaults.
pub fn load_tuning(path: &Path) -> Result<TriggerTuning> {
    let s = std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let tuning: TriggerTuning =
        toml::from_str(&s).with_context(|| format!("parse {}", path.display()))?;
    Ok(tuning)
}
