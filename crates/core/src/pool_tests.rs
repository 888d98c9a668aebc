// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::job::{JobRecord, JobState};

fn group(partition: &str, gres: &str, nodes: u32, state: &str) -> NodeGroup {
    NodeGroup {
        partition: partition.to_string(),
        gres: gres.to_string(),
        nodes,
        state: state.to_string(),
    }
}

#[test]
fn aggregates_gpu_capacity_per_partition() {
    let pools = GpuPool::aggregate(vec![
        group("gpu", "gpu:a100:8(S:0-1)", 2, "idle"),
        group("gpu", "gpu:a100:8(S:0-1)", 3, "alloc"),
        group("gpu", "gpu:a100:8(S:0-1)", 1, "mix"),
        group("debug", "gpu:2", 1, "idle"),
        group("cpu", "(null)", 10, "idle"),
    ]);

    assert_eq!(
        pools,
        vec![
            GpuPool { name: "cpu".into(), gpu_type: String::new(), total: 0, idle: 0 },
            GpuPool { name: "debug".into(), gpu_type: String::new(), total: 2, idle: 2 },
            GpuPool { name: "gpu".into(), gpu_type: "a100".into(), total: 48, idle: 20 },
        ]
    );
}

#[yare::parameterized(
    plain     = { "mix",    "mix" },
    star      = { "idle*",  "idle" },
    tilde     = { "idle~",  "idle" },
    drain     = { "drain",  "drain" },
)]
fn base_state_strips_flags(state: &str, expected: &str) {
    assert_eq!(group("p", "", 1, state).base_state(), expected);
}

#[test]
fn usage_percent() {
    let pool = GpuPool { name: "gpu".into(), gpu_type: String::new(), total: 8, idle: 2 };
    assert_eq!(pool.in_use(), 6);
    assert!((pool.usage_percent() - 75.0).abs() < f64::EPSILON);

    let empty = GpuPool::default();
    assert_eq!(empty.usage_percent(), 0.0);
}

#[yare::parameterized(
    valid      = { "10/20/2/32",  Some(CpuCounts { alloc: 10, idle: 20, other: 2, total: 32 }) },
    too_short  = { "10/20/32",    None },
    not_number = { "a/b/c/d",     None },
    empty      = { "",            None },
)]
fn cpu_counts_parse(input: &str, expected: Option<CpuCounts>) {
    assert_eq!(CpuCounts::parse(input), expected);
}

#[test]
fn cluster_summary_sums_partitions() {
    let partitions = vec![
        PartitionInfo {
            name: "gpu".into(),
            availability: "up".into(),
            nodes: 4,
            cpus: CpuCounts::parse("10/20/2/32"),
        },
        PartitionInfo { name: "old".into(), availability: "down".into(), nodes: 2, cpus: None },
    ];
    let summary = ClusterSummary::from_parts(&partitions, 5);
    assert_eq!(
        summary,
        ClusterSummary { total_nodes: 6, cpus_alloc: 10, cpus_total: 32, gpus_in_use: 5 }
    );
}

fn record(id: &str, partition: &str, state: JobState, gres: &str) -> JobRecord {
    JobRecord::builder().id(id).partition(partition).state(state).gres(gres).build()
}

fn jobs() -> Snapshot {
    Snapshot::try_from_records(vec![
        record("1", "gpu", JobState::Running, "gpu:a100:4"),
        record("2", "gpu", JobState::Running, "gpu:2"),
        record("3", "cpu", JobState::Running, "N/A"),
        record("4", "gpu", JobState::Pending, "gpu:8"),
    ])
    .unwrap()
}

#[test]
fn partition_usage_counts_running_jobs_only() {
    assert_eq!(
        partition_usage(&jobs()),
        vec![
            PartitionUsage { partition: "cpu".into(), jobs: 1, gpus: 0 },
            PartitionUsage { partition: "gpu".into(), jobs: 2, gpus: 6 },
        ]
    );
}

#[test]
fn gpus_in_use_ignores_pending() {
    assert_eq!(gpus_in_use(&jobs()), 6);
}
