// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command-line arguments

use std::path::PathBuf;

use clap::Parser;

use crate::output::OutputFormat;

/// Watch Slurm jobs and announce when they start or finish.
#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "slurm-monitor",
    version = concat!(env!("CARGO_PKG_VERSION"), "+", env!("BUILD_GIT_HASH")),
    styles = crate::color::styles()
)]
pub struct Cli {
    /// Seconds between refreshes
    #[arg(short = 'i', long)]
    pub interval: Option<u64>,

    /// Show jobs from every user instead of only your own
    #[arg(short = 'a', long)]
    pub all_users: bool,

    /// Print a single view and exit
    #[arg(short = '1', long)]
    pub once: bool,

    /// Use the single-table compact view
    #[arg(short = 'c', long)]
    pub compact: bool,

    /// POST transition notifications to this URL
    #[arg(long, value_name = "URL")]
    pub webhook_url: Option<String>,

    /// Show desktop notifications for transitions
    #[arg(long)]
    pub desktop: bool,

    /// Disable all notifications
    #[arg(long, conflicts_with_all = ["webhook_url", "desktop"])]
    pub no_notify: bool,

    /// Output format (json requires --once)
    #[arg(long, value_enum, default_value_t)]
    pub format: OutputFormat,

    /// Config file (default: $SLURM_MONITOR_CONFIG or <config dir>/slurm-monitor/config.toml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}
