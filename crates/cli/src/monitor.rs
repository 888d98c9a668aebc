// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Polling loop: fetch, observe, notify, render.
//!
//! Each cycle is strictly sequential. A failed fetch leaves the tracker
//! untouched, so the next successful fetch is compared against the last
//! good snapshot. Failed deliveries are logged and dropped.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Local, TimeZone};
use serde::Serialize;
use sm_adapters::{Notifier, OwnerFilter, SnapshotSource};
use sm_core::{
    gpus_in_use, partition_usage, Clock, ClusterSummary, GpuPool, Observation, PartitionUsage,
    Snapshot, Tracker, TransitionKind,
};

/// Result of delivering one batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryOutcome {
    pub kind: TransitionKind,
    pub jobs: usize,
    pub error: Option<String>,
}

impl DeliveryOutcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// What happened during one poll
#[derive(Debug, Clone, Default)]
pub struct Cycle {
    /// `None` when the fetch failed
    pub jobs: Option<Snapshot>,
    /// `None` when the fetch failed; empty on cold start
    pub observation: Option<Observation>,
    pub deliveries: Vec<DeliveryOutcome>,
}

/// Everything a view needs to draw one frame
#[derive(Debug, Clone, Serialize)]
pub struct DashboardData {
    pub owner: String,
    pub taken_at: DateTime<Local>,
    pub jobs: Snapshot,
    pub gpu_pools: Vec<GpuPool>,
    pub partition_usage: Vec<PartitionUsage>,
    pub cluster: ClusterSummary,
    /// Set when the latest job fetch failed and `jobs` is from an earlier poll
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetch_error: Option<String>,
}

pub struct Monitor<S: SnapshotSource, N: Notifier, C: Clock> {
    source: S,
    notifier: N,
    tracker: Tracker<C>,
    clock: C,
    filter: OwnerFilter,
    shown: Snapshot,
    fetch_error: Option<String>,
}

impl<S: SnapshotSource, N: Notifier, C: Clock> Monitor<S, N, C> {
    pub fn new(source: S, notifier: N, clock: C, filter: OwnerFilter) -> Self {
        Self {
            source,
            notifier,
            tracker: Tracker::new(clock.clone()),
            clock,
            filter,
            shown: Snapshot::new(),
            fetch_error: None,
        }
    }

    /// Fetch one snapshot, classify it against the previous one and deliver
    /// each non-empty batch.
    pub async fn poll(&mut self) -> Cycle {
        let snapshot = match self.source.list_jobs(&self.filter).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(error = %e, "job fetch failed, skipping cycle");
                self.fetch_error = Some(e.to_string());
                return Cycle::default();
            }
        };
        self.fetch_error = None;
        self.shown = snapshot.clone();

        let primed = self.tracker.is_primed();
        let observation = self.tracker.observe(snapshot.clone());
        if !primed {
            tracing::info!(jobs = snapshot.len(), filter = %self.filter, "baseline snapshot recorded");
        } else if !observation.is_empty() {
            tracing::info!(
                started = observation.started.len(),
                completed = observation.completed.len(),
                "job transitions observed"
            );
            for t in observation.transitions() {
                tracing::debug!(job = %t.job.id, kind = %t.kind, state = %t.job.state, "transition");
            }
        }

        let mut deliveries = Vec::new();
        for batch in observation.batches() {
            let error = match self.notifier.deliver(&batch).await {
                Ok(()) => None,
                Err(e) => {
                    tracing::warn!(kind = %batch.kind, jobs = batch.len(), error = %e, "notification failed");
                    Some(e.to_string())
                }
            };
            deliveries.push(DeliveryOutcome { kind: batch.kind, jobs: batch.len(), error });
        }

        Cycle { jobs: Some(snapshot), observation: Some(observation), deliveries }
    }

    /// Gather display data. Pool and partition failures degrade to empty sections.
    pub async fn dashboard(&self) -> DashboardData {
        let gpu_pools = self.source.list_gpu_pools().await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "gpu pool fetch failed");
            Vec::new()
        });
        let partitions = self.source.list_partitions().await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "partition fetch failed");
            Vec::new()
        });

        DashboardData {
            owner: self.filter.to_string(),
            taken_at: local_time(self.clock.epoch_ms()),
            jobs: self.shown.clone(),
            gpu_pools,
            partition_usage: partition_usage(&self.shown),
            cluster: ClusterSummary::from_parts(&partitions, gpus_in_use(&self.shown)),
            fetch_error: self.fetch_error.clone(),
        }
    }

    /// Poll and render every `interval` until `shutdown` resolves.
    ///
    /// Shutdown is only observed between cycles; an in-flight poll finishes first.
    pub async fn run<F>(
        &mut self,
        interval: Duration,
        mut render: F,
        shutdown: impl Future<Output = ()>,
    ) -> anyhow::Result<()>
    where
        F: FnMut(&DashboardData) -> std::io::Result<()>,
    {
        tokio::pin!(shutdown);
        tracing::info!(interval_secs = interval.as_secs(), filter = %self.filter, "monitor started");
        loop {
            let cycle = self.poll().await;
            tracing::debug!(
                jobs = cycle.jobs.as_ref().map(Snapshot::len),
                transitions = cycle.observation.as_ref().map_or(0, |o| o.started.len() + o.completed.len()),
                delivered = cycle.deliveries.iter().filter(|d| d.is_ok()).count(),
                "cycle complete"
            );
            let data = self.dashboard().await;
            render(&data)?;

            tokio::select! {
                () = &mut shutdown => {
                    tracing::info!("monitor stopped");
                    return Ok(());
                }
                () = tokio::time::sleep(interval) => {}
            }
        }
    }
}

fn local_time(epoch_ms: u64) -> DateTime<Local> {
    i64::try_from(epoch_ms)
        .ok()
        .and_then(|ms| Local.timestamp_millis_opt(ms).single())
        .unwrap_or_else(Local::now)
}

#[cfg(test)]
#[path = "monitor_tests.rs"]
mod tests;
