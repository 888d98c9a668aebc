// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! slurm-monitor: live view of Slurm jobs with start/finish notifications

mod args;
mod color;
mod config;
mod env;
mod exit_error;
mod logging;
mod monitor;
mod output;
mod table;
mod view;

use std::io::Write;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use sm_adapters::{DesktopNotifier, FanoutNotifier, SlurmCli, WebhookNotifier};
use sm_core::SystemClock;

use crate::args::Cli;
use crate::config::{FileConfig, NotifySettings, Settings};
use crate::env::EnvOverrides;
use crate::exit_error::ExitError;
use crate::logging::LogTarget;
use crate::monitor::{DashboardData, Monitor};
use crate::output::OutputFormat;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if let Some(exit) = e.downcast_ref::<ExitError>() {
                eprintln!("error: {exit}");
                return ExitCode::from(exit.code);
            }
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let file = FileConfig::discover(cli.config.as_deref()).map_err(ExitError::config)?;
    let settings =
        Settings::resolve(&cli, &EnvOverrides::from_env(), &file).map_err(ExitError::config)?;

    let target = if settings.once {
        LogTarget::Stderr
    } else {
        LogTarget::File(logging::log_path(&env::state_dir()?))
    };
    let _guard = logging::init(&target)?;

    let source = SlurmCli::new(settings.slurm.clone());
    if settings.once {
        return once(source, &settings).await;
    }

    if !settings.notify.is_enabled() {
        tracing::info!("no notification targets configured");
    }
    let notifier = notifier(&settings.notify)?;
    let mut monitor = Monitor::new(source, notifier, SystemClock, settings.filter.clone());
    monitor.run(settings.interval, |data| redraw(data, &settings), shutdown_signal()).await
}

/// Single cold-start poll. Nothing to compare against, so nothing is notified.
async fn once(source: SlurmCli, settings: &Settings) -> Result<()> {
    let mut monitor =
        Monitor::new(source, FanoutNotifier::default(), SystemClock, settings.filter.clone());
    let cycle = monitor.poll().await;
    let data = monitor.dashboard().await;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match settings.format {
        OutputFormat::Json => view::render_json(&data, &mut out)?,
        OutputFormat::Text => draw(&data, settings, &mut out)?,
    }
    out.flush()?;

    if cycle.jobs.is_none() {
        anyhow::bail!("job fetch failed: {}", data.fetch_error.unwrap_or_default());
    }
    Ok(())
}

fn notifier(settings: &NotifySettings) -> Result<FanoutNotifier> {
    let webhook = settings
        .webhook_url
        .as_deref()
        .map(|url| WebhookNotifier::new(url, settings.webhook_timeout))
        .transpose()?;
    let desktop = settings.desktop.then(DesktopNotifier::new);
    Ok(FanoutNotifier::new(webhook, desktop))
}

fn draw(data: &DashboardData, settings: &Settings, out: &mut dyn Write) -> std::io::Result<()> {
    if settings.compact {
        view::render_compact(data, out)
    } else {
        view::render_dashboard(data, settings.interval, out)
    }
}

fn redraw(data: &DashboardData, settings: &Settings) -> std::io::Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    write!(out, "{}", view::CLEAR_SCREEN)?;
    draw(data, settings, &mut out)?;
    out.flush()
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "cannot listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}
