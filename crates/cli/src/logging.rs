// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tracing subscriber setup.
//!
//! The live dashboard owns the terminal, so live mode logs to
//! `<state_dir>/monitor.log`. Single-shot mode logs to stderr.

use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

pub const LOG_FILE: &str = "monitor.log";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
}

impl LogTarget {
    /// Default directive when neither `SLURM_MONITOR_LOG` nor `RUST_LOG` is set.
    fn default_directive(&self) -> &'static str {
        match self {
            LogTarget::Stderr => "warn",
            LogTarget::File(_) => "info",
        }
    }
}

/// Keeps the non-blocking file writer alive; drop flushes it.
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

pub fn log_path(state_dir: &Path) -> PathBuf {
    state_dir.join(LOG_FILE)
}

/// Build the filter from `directive`, falling back to `default` if it does not parse.
pub fn env_filter(directive: Option<&str>, default: &str) -> EnvFilter {
    match directive {
        Some(d) => EnvFilter::try_new(d).unwrap_or_else(|e| {
            eprintln!("warning: ignoring invalid log filter {d:?}: {e}");
            EnvFilter::new(default)
        }),
        None => EnvFilter::new(default),
    }
}

pub fn init(target: &LogTarget) -> anyhow::Result<LoggingGuard> {
    let directive = crate::env::log_filter();
    let filter = env_filter(directive.as_deref(), target.default_directive());

    match target {
        LogTarget::Stderr => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .try_init()?;
            Ok(LoggingGuard { _file_guard: None })
        }
        LogTarget::File(path) => {
            let dir = path.parent().unwrap_or_else(|| Path::new("."));
            std::fs::create_dir_all(dir)?;
            let name = path.file_name().map(PathBuf::from).unwrap_or_else(|| PathBuf::from(LOG_FILE));
            let appender = tracing_appender::rolling::never(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(writer).with_ansi(false))
                .try_init()?;
            Ok(LoggingGuard { _file_guard: Some(guard) })
        }
    }
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
