// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Settings resolution.
//!
//! Precedence: command-line flags, then environment, then the TOML config
//! file, then built-in defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use sm_adapters::{OwnerFilter, SlurmConfig, QUERY_TIMEOUT, WEBHOOK_TIMEOUT};
use thiserror::Error;

use crate::args::Cli;
use crate::env::EnvOverrides;
use crate::output::OutputFormat;

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid {name} {value:?}: expected a whole number of seconds")]
    InvalidSeconds { name: &'static str, value: String },
    #[error("refresh interval must be at least 1 second")]
    ZeroInterval,
    #[error("--format json requires --once")]
    JsonRequiresOnce,
    #[error("cannot determine state directory (HOME not set)")]
    NoStateDir,
}

/// Contents of `config.toml`. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub interval_secs: Option<u64>,
    pub all_users: Option<bool>,
    pub compact: Option<bool>,
    pub webhook_url: Option<String>,
    pub desktop: Option<bool>,
    pub squeue: Option<PathBuf>,
    pub sinfo: Option<PathBuf>,
    pub command_timeout_secs: Option<u64>,
    pub webhook_timeout_secs: Option<u64>,
}

impl FileConfig {
    pub fn parse(path: &Path, text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }

    /// Read `path`. A missing file is an error only when `required`.
    pub fn read(path: &Path, required: bool) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::parse(path, &text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && !required => {
                tracing::debug!(path = %path.display(), "no config file");
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Read { path: path.to_path_buf(), source }),
        }
    }

    /// Locate and read the config file. An explicitly named file must exist.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::read(path, true);
        }
        match crate::env::config_path() {
            Some(location) => Self::read(location.path(), location.is_explicit()),
            None => Ok(Self::default()),
        }
    }
}

/// Where transition notifications go
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifySettings {
    pub webhook_url: Option<String>,
    pub desktop: bool,
    pub webhook_timeout: Duration,
}

impl NotifySettings {
    pub fn is_enabled(&self) -> bool {
        self.webhook_url.is_some() || self.desktop
    }
}

/// Fully resolved runtime settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub interval: Duration,
    pub filter: OwnerFilter,
    pub compact: bool,
    pub once: bool,
    pub format: OutputFormat,
    pub notify: NotifySettings,
    pub slurm: SlurmConfig,
}

impl Settings {
    pub fn resolve(cli: &Cli, env: &EnvOverrides, file: &FileConfig) -> Result<Self, ConfigError> {
        let interval_secs = match (cli.interval, env.interval.as_deref(), file.interval_secs) {
            (Some(secs), _, _) => secs,
            (None, Some(raw), _) => raw.trim().parse().map_err(|_| ConfigError::InvalidSeconds {
                name: "SLURM_MONITOR_INTERVAL",
                value: raw.to_string(),
            })?,
            (None, None, Some(secs)) => secs,
            (None, None, None) => DEFAULT_INTERVAL.as_secs(),
        };
        if interval_secs == 0 {
            return Err(ConfigError::ZeroInterval);
        }

        if cli.format == OutputFormat::Json && !cli.once {
            return Err(ConfigError::JsonRequiresOnce);
        }

        let filter = if cli.all_users || file.all_users.unwrap_or(false) {
            OwnerFilter::AllUsers
        } else {
            OwnerFilter::CurrentUser(env.user.clone())
        };

        let webhook_timeout =
            file.webhook_timeout_secs.map(Duration::from_secs).unwrap_or(WEBHOOK_TIMEOUT);
        let notify = if cli.no_notify {
            NotifySettings { webhook_url: None, desktop: false, webhook_timeout }
        } else {
            NotifySettings {
                webhook_url: cli
                    .webhook_url
                    .clone()
                    .or_else(|| env.webhook_url.clone())
                    .or_else(|| file.webhook_url.clone()),
                desktop: cli.desktop || file.desktop.unwrap_or(false),
                webhook_timeout,
            }
        };

        let defaults = SlurmConfig::default();
        let slurm = SlurmConfig {
            squeue: env.squeue.clone().or_else(|| file.squeue.clone()).unwrap_or(defaults.squeue),
            sinfo: env.sinfo.clone().or_else(|| file.sinfo.clone()).unwrap_or(defaults.sinfo),
            timeout: file.command_timeout_secs.map(Duration::from_secs).unwrap_or(QUERY_TIMEOUT),
        };

        Ok(Self {
            interval: Duration::from_secs(interval_secs),
            filter,
            compact: cli.compact || file.compact.unwrap_or(false),
            once: cli.once,
            format: cli.format,
            notify,
            slurm,
        })
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
