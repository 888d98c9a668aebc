// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dashboard and compact terminal views

use std::io::{self, Write};
use std::time::Duration;

use sm_core::{GpuPool, JobRecord, NAME_MAX, REASON_MAX};

use crate::color;
use crate::monitor::DashboardData;
use crate::table::{Column, Table};

/// Rows shown per job table before the remainder is summarized.
pub const MAX_ROWS: usize = 15;

/// Cells in a GPU usage bar.
pub const BAR_CELLS: usize = 15;

/// Erase the screen and home the cursor.
pub const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

pub fn render_dashboard(
    data: &DashboardData,
    interval: Duration,
    out: &mut dyn Write,
) -> io::Result<()> {
    writeln!(
        out,
        "{}  |  User: {}  |  GPUs in use: {}  |  {}",
        color::header("SLURM Job Monitor"),
        data.owner,
        data.cluster.gpus_in_use,
        data.taken_at.format("%H:%M:%S"),
    )?;
    if let Some(err) = &data.fetch_error {
        writeln!(out, "{}", color::red(&format!("Refresh failed: {err}")))?;
    }

    let running: Vec<&JobRecord> = data.jobs.running().collect();
    section(out, &format!("Running Jobs ({})", running.len()))?;
    job_table(out, &running, false, "No running jobs")?;

    section(out, "Running Summary")?;
    let mut summary = Table::new(vec![
        Column::left("PARTITION"),
        Column::right("JOBS"),
        Column::right("GPUS"),
    ]);
    let (mut jobs, mut gpus) = (0, 0);
    for usage in &data.partition_usage {
        jobs += usage.jobs;
        gpus += usage.gpus;
        summary.row(vec![usage.partition.clone(), usage.jobs.to_string(), usage.gpus.to_string()]);
    }
    summary.row(vec![color::literal("TOTAL"), jobs.to_string(), gpus.to_string()]);
    summary.render(out)?;

    let pending: Vec<&JobRecord> = data.jobs.pending().collect();
    section(out, &format!("Pending Jobs ({})", pending.len()))?;
    job_table(out, &pending, true, "No pending jobs")?;

    section(out, "GPU Availability")?;
    let pools: Vec<&GpuPool> = data.gpu_pools.iter().filter(|p| p.total > 0).collect();
    if pools.is_empty() {
        writeln!(out, "{}", color::muted("No GPU partitions"))?;
    } else {
        let mut table = Table::new(vec![
            Column::left("PARTITION"),
            Column::muted("TYPE"),
            Column::right("AVAILABLE"),
            Column::right("TOTAL"),
            Column::left("USAGE"),
        ]);
        for pool in pools {
            let available = pool.idle.to_string();
            let available =
                if pool.idle > 0 { color::green(&available) } else { color::red(&available) };
            table.row(vec![
                pool.name.clone(),
                pool.gpu_type.clone(),
                available,
                pool.total.to_string(),
                usage_bar(pool),
            ]);
        }
        table.render(out)?;
    }

    writeln!(out)?;
    writeln!(
        out,
        "{}",
        color::muted(&format!("Press Ctrl+C to exit  |  Refresh: {}s", interval.as_secs()))
    )
}

/// Single table of every job, in id order.
pub fn render_compact(data: &DashboardData, out: &mut dyn Write) -> io::Result<()> {
    writeln!(
        out,
        "{}",
        color::header(&format!("SLURM Jobs ({})", data.taken_at.format("%H:%M:%S")))
    )?;
    if let Some(err) = &data.fetch_error {
        writeln!(out, "{}", color::red(&format!("Refresh failed: {err}")))?;
    }
    if data.jobs.is_empty() {
        return writeln!(out, "{}", color::muted("No jobs found"));
    }

    let mut table = Table::new(vec![
        Column::muted("ID"),
        Column::left("NAME").with_max(NAME_MAX),
        Column::left("PARTITION"),
        Column::status("STATE"),
        Column::left("GPUS"),
        Column::right("TIME"),
        Column::left("REASON").with_max(REASON_MAX),
    ]);
    for job in &data.jobs {
        let reason = if job.state.is_pending() { job.reason.clone() } else { String::new() };
        table.row(vec![
            job.id.to_string(),
            job.name.clone(),
            job.partition.clone(),
            job.state.to_string(),
            job.gpu_label(),
            job.elapsed.clone(),
            reason,
        ]);
    }
    table.render(out)
}

pub fn render_json(data: &DashboardData, out: &mut dyn Write) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, data)?;
    writeln!(out)
}

/// Fixed-width bar of used (red) and free (green) cells followed by the percentage.
pub fn usage_bar(pool: &GpuPool) -> String {
    let percent = pool.usage_percent();
    let used = ((percent / 100.0) * BAR_CELLS as f64).floor() as usize;
    let used = used.min(BAR_CELLS);
    format!(
        "{}{} {:>3.0}%",
        color::red(&"█".repeat(used)),
        color::green(&"░".repeat(BAR_CELLS - used)),
        percent
    )
}

fn section(out: &mut dyn Write, title: &str) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", color::header(title))
}

fn job_table(
    out: &mut dyn Write,
    jobs: &[&JobRecord],
    with_reason: bool,
    placeholder: &str,
) -> io::Result<()> {
    if jobs.is_empty() {
        return writeln!(out, "{}", color::muted(placeholder));
    }

    let mut columns = vec![
        Column::muted("ID"),
        Column::left("NAME").with_max(NAME_MAX),
        Column::left("USER"),
        Column::left("PARTITION"),
        Column::left("GPUS"),
        Column::right("TIME"),
        Column::right("LIMIT"),
    ];
    if with_reason {
        columns.push(Column::left("REASON").with_max(REASON_MAX));
    }
    let mut table = Table::new(columns);
    for job in jobs.iter().take(MAX_ROWS) {
        let mut row = vec![
            job.id.to_string(),
            job.name.clone(),
            job.user.clone(),
            job.partition.clone(),
            job.gpu_label(),
            job.elapsed.clone(),
            job.time_limit.clone(),
        ];
        if with_reason {
            row.push(job.reason.clone());
        }
        table.row(row);
    }
    table.render(out)?;

    if jobs.len() > MAX_ROWS {
        writeln!(out, "{}", color::muted(&format!("… and {} more", jobs.len() - MAX_ROWS)))?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "view_tests.rs"]
mod tests;
