// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the monitor.

use std::path::{Path, PathBuf};

use crate::config::ConfigError;

/// Resolve state directory:
/// SLURM_MONITOR_STATE_DIR > XDG_STATE_HOME/slurm-monitor > ~/.local/state/slurm-monitor
pub fn state_dir() -> Result<PathBuf, ConfigError> {
    if let Ok(dir) = std::env::var("SLURM_MONITOR_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("slurm-monitor"));
    }
    let home = std::env::var("HOME").map_err(|_| ConfigError::NoStateDir)?;
    Ok(PathBuf::from(home).join(".local/state/slurm-monitor"))
}

/// Where the config file is looked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigLocation {
    /// Named by SLURM_MONITOR_CONFIG; the file must exist
    Explicit(PathBuf),
    /// Per-user default; a missing file means defaults
    Default(PathBuf),
}

impl ConfigLocation {
    pub fn path(&self) -> &Path {
        match self {
            ConfigLocation::Explicit(path) | ConfigLocation::Default(path) => path,
        }
    }

    pub fn is_explicit(&self) -> bool {
        matches!(self, ConfigLocation::Explicit(_))
    }
}

/// Config file location: SLURM_MONITOR_CONFIG > <config_dir>/slurm-monitor/config.toml
pub fn config_path() -> Option<ConfigLocation> {
    if let Some(path) = std::env::var("SLURM_MONITOR_CONFIG").ok().filter(|s| !s.is_empty()) {
        return Some(ConfigLocation::Explicit(PathBuf::from(path)));
    }
    dirs::config_dir()
        .map(|dir| ConfigLocation::Default(dir.join("slurm-monitor").join("config.toml")))
}

/// Log filter directive: SLURM_MONITOR_LOG > RUST_LOG
pub fn log_filter() -> Option<String> {
    std::env::var("SLURM_MONITOR_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .ok()
        .filter(|s| !s.is_empty())
}

/// Login name used for the default owner filter.
pub fn current_user() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("LOGNAME"))
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Settings that may be overridden from the environment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvOverrides {
    pub webhook_url: Option<String>,
    /// Raw value; parsed during resolution so a bad value is reported.
    pub interval: Option<String>,
    pub squeue: Option<PathBuf>,
    pub sinfo: Option<PathBuf>,
    pub user: String,
}

impl EnvOverrides {
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|s| !s.is_empty());
        Self {
            webhook_url: var("SLURM_MONITOR_WEBHOOK_URL"),
            interval: var("SLURM_MONITOR_INTERVAL"),
            squeue: var("SLURM_MONITOR_SQUEUE").map(PathBuf::from),
            sinfo: var("SLURM_MONITOR_SINFO").map(PathBuf::from),
            user: current_user(),
        }
    }
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
