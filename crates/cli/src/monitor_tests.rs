// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use sm_adapters::{FakeNotifier, FakeSnapshotSource};
use sm_core::test_support::snapshot;
use sm_core::{CpuCounts, FakeClock, JobState, PartitionInfo};
use std::sync::{Arc, Mutex};

type TestMonitor = Monitor<FakeSnapshotSource, FakeNotifier, FakeClock>;

fn setup() -> (TestMonitor, FakeSnapshotSource, FakeNotifier, FakeClock) {
    let source = FakeSnapshotSource::new();
    let notifier = FakeNotifier::new();
    let clock = FakeClock::new();
    let monitor = Monitor::new(
        source.clone(),
        notifier.clone(),
        clock.clone(),
        OwnerFilter::CurrentUser("alice".to_string()),
    );
    (monitor, source, notifier, clock)
}

fn ids(jobs: &[sm_core::JobRecord]) -> Vec<&str> {
    jobs.iter().map(|j| j.id.as_str()).collect()
}

#[tokio::test]
async fn cold_start_delivers_nothing() {
    let (mut monitor, source, notifier, _) = setup();
    source.push_jobs(snapshot(&[("1", JobState::Running), ("2", JobState::Pending)]));

    let cycle = monitor.poll().await;

    assert_eq!(cycle.jobs.map(|s| s.len()), Some(2));
    assert!(cycle.observation.is_some_and(|o| o.is_empty()));
    assert!(cycle.deliveries.is_empty());
    assert_eq!(notifier.attempts(), 0);
}

#[tokio::test]
async fn start_is_delivered_on_next_poll() {
    let (mut monitor, source, notifier, clock) = setup();
    source
        .push_jobs(snapshot(&[("1", JobState::Pending)]))
        .push_jobs(snapshot(&[("1", JobState::Running)]));

    monitor.poll().await;
    clock.advance(Duration::from_secs(5));
    let cycle = monitor.poll().await;

    assert_eq!(cycle.deliveries.len(), 1);
    assert_eq!(cycle.deliveries[0].kind, TransitionKind::Started);
    assert!(cycle.deliveries[0].is_ok());

    let delivered = notifier.delivered();
    assert_eq!(delivered.len(), 1);
    assert_eq!(ids(&delivered[0].jobs), vec!["1"]);
    assert_eq!(delivered[0].observed_at_ms, 1_005_000);
}

#[tokio::test]
async fn one_delivery_per_kind_started_first() {
    let (mut monitor, source, notifier, _) = setup();
    source
        .push_jobs(snapshot(&[
            ("1", JobState::Running),
            ("2", JobState::Pending),
            ("3", JobState::Pending),
        ]))
        .push_jobs(snapshot(&[("2", JobState::Running), ("3", JobState::Running)]));

    monitor.poll().await;
    let cycle = monitor.poll().await;

    let kinds: Vec<_> = cycle.deliveries.iter().map(|d| (d.kind, d.jobs)).collect();
    assert_eq!(kinds, vec![(TransitionKind::Started, 2), (TransitionKind::Completed, 1)]);

    let delivered = notifier.delivered();
    assert_eq!(ids(&delivered[0].jobs), vec!["2", "3"]);
    assert_eq!(ids(&delivered[1].jobs), vec!["1"]);
}

#[tokio::test]
async fn fetch_failure_leaves_previous_snapshot_in_place() {
    let (mut monitor, source, notifier, _) = setup();
    source
        .push_jobs(snapshot(&[("1", JobState::Pending)]))
        .push_failure("slurm_load_jobs error: Socket timed out")
        .push_jobs(snapshot(&[("1", JobState::Running)]));

    monitor.poll().await;
    let failed = monitor.poll().await;
    assert!(failed.jobs.is_none());
    assert!(failed.observation.is_none());
    assert!(failed.deliveries.is_empty());

    let recovered = monitor.poll().await;
    assert_eq!(recovered.deliveries.len(), 1);
    assert_eq!(ids(&notifier.delivered()[0].jobs), vec!["1"]);
}

#[tokio::test]
async fn failed_fetch_does_not_mark_jobs_completed() {
    let (mut monitor, source, notifier, _) = setup();
    source
        .push_jobs(snapshot(&[("1", JobState::Running)]))
        .push_failure("squeue: error: Invalid user")
        .push_jobs(snapshot(&[("1", JobState::Running)]));

    for _ in 0..3 {
        monitor.poll().await;
    }
    assert_eq!(notifier.attempts(), 0);
}

#[tokio::test]
async fn delivery_failure_is_not_retried() {
    let (mut monitor, source, notifier, _) = setup();
    source
        .push_jobs(snapshot(&[("1", JobState::Pending), ("2", JobState::Pending)]))
        .push_jobs(snapshot(&[("1", JobState::Running), ("2", JobState::Pending)]))
        .push_jobs(snapshot(&[("1", JobState::Running), ("2", JobState::Running)]));

    monitor.poll().await;
    notifier.set_failing(true);
    let failed = monitor.poll().await;
    assert_eq!(failed.deliveries.len(), 1);
    assert!(!failed.deliveries[0].is_ok());
    assert!(failed.jobs.is_some(), "tracker still advances");

    notifier.set_failing(false);
    monitor.poll().await;

    assert_eq!(notifier.attempts(), 2);
    let delivered = notifier.delivered();
    assert_eq!(delivered.len(), 1);
    assert_eq!(ids(&delivered[0].jobs), vec!["2"], "job 1 is not announced again");
}

#[tokio::test]
async fn queries_with_configured_filter() {
    let source = FakeSnapshotSource::new();
    let mut monitor =
        Monitor::new(source.clone(), FakeNotifier::new(), FakeClock::new(), OwnerFilter::AllUsers);

    monitor.poll().await;
    monitor.poll().await;

    assert_eq!(source.job_queries(), vec![OwnerFilter::AllUsers, OwnerFilter::AllUsers]);
}

#[tokio::test]
async fn dashboard_collects_pools_and_usage() {
    let (mut monitor, source, _, clock) = setup();
    clock.set_epoch_ms(1_700_000_000_000);
    source.push_jobs(snapshot(&[
        ("1", JobState::Running),
        ("2", JobState::Running),
        ("3", JobState::Pending),
    ]));
    source.set_pools(vec![GpuPool {
        name: "gpu".into(),
        gpu_type: "a100".into(),
        total: 16,
        idle: 4,
    }]);
    source.set_partitions(vec![PartitionInfo {
        name: "gpu".into(),
        availability: "up".into(),
        nodes: 2,
        cpus: CpuCounts::parse("40/24/0/64"),
    }]);

    monitor.poll().await;
    let data = monitor.dashboard().await;

    assert_eq!(data.owner, "alice");
    assert_eq!(data.taken_at.timestamp_millis(), 1_700_000_000_000);
    assert_eq!(data.jobs.len(), 3);
    assert_eq!(data.gpu_pools.len(), 1);
    assert_eq!(
        data.partition_usage,
        vec![PartitionUsage { partition: "gpu".into(), jobs: 2, gpus: 2 }]
    );
    assert_eq!(data.cluster.gpus_in_use, 2);
    assert_eq!(data.cluster.total_nodes, 2);
    assert_eq!(data.cluster.cpus_alloc, 40);
    assert_eq!(data.cluster.cpus_total, 64);
    assert!(data.fetch_error.is_none());
}

#[tokio::test]
async fn dashboard_keeps_last_jobs_after_fetch_failure() {
    let (mut monitor, source, _, _) = setup();
    source
        .push_jobs(snapshot(&[("1", JobState::Running)]))
        .push_failure("connection refused");

    monitor.poll().await;
    monitor.poll().await;
    let data = monitor.dashboard().await;

    assert_eq!(data.jobs.len(), 1);
    assert!(data.fetch_error.as_deref().is_some_and(|e| e.contains("connection refused")));

    let json = serde_json::to_value(&data).unwrap();
    assert!(json["fetch_error"].is_string());
    assert!(json["jobs"]["1"].is_object());
}

#[tokio::test(start_paused = true)]
async fn run_renders_each_cycle_until_shutdown() {
    let (mut monitor, source, notifier, _) = setup();
    source
        .push_jobs(snapshot(&[("1", JobState::Pending)]))
        .push_jobs(snapshot(&[("1", JobState::Running)]))
        .push_jobs(snapshot(&[]));

    let frames = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&frames);
    let render = move |data: &DashboardData| -> std::io::Result<()> {
        seen.lock().unwrap().push(data.jobs.len());
        Ok(())
    };
    let shutdown = tokio::time::sleep(Duration::from_secs(12));

    monitor.run(Duration::from_secs(5), render, shutdown).await.unwrap();

    assert_eq!(*frames.lock().unwrap(), vec![1, 1, 0]);
    let kinds: Vec<_> = notifier.delivered().iter().map(|b| b.kind).collect();
    assert_eq!(kinds, vec![TransitionKind::Started, TransitionKind::Completed]);
}

#[tokio::test]
async fn run_stops_on_render_error() {
    let (mut monitor, _, _, _) = setup();
    let render = |_: &DashboardData| -> std::io::Result<()> { Err(std::io::Error::other("stdout closed")) };

    let result = monitor.run(Duration::from_secs(5), render, std::future::pending()).await;
    assert!(result.is_err());
}
