// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `--once` renders a single frame from the scheduler tools and exits.

use crate::prelude::*;

#[test]
fn dashboard_shows_running_and_pending_jobs() {
    let cluster = Cluster::new();
    cluster
        .monitor()
        .args(&["--once"])
        .passes()
        .stdout_has("SLURM Job Monitor  |  User: spec-user  |  GPUs in use: 4")
        .stdout_has("Running Jobs (1)")
        .stdout_has("train-llm")
        .stdout_has("Pending Jobs (1)")
        .stdout_has("Resources")
        .stdout_has("Press Ctrl+C to exit  |  Refresh: 5s");
}

#[test]
fn dashboard_shows_gpu_partitions_only() {
    let cluster = Cluster::new();
    let run = cluster.monitor().args(&["--once"]).passes();
    let stdout = run.stdout();
    let gpu_section = stdout.split("GPU Availability").nth(1).unwrap();

    // one mixed node counts half its GPUs free, the idle node all of them
    assert!(gpu_section.contains("gpu        a100         12     16"), "{gpu_section}");
    assert!(!gpu_section.contains("cpu"), "{gpu_section}");
}

#[test]
fn queries_only_current_user_by_default() {
    let cluster = Cluster::new();
    cluster.monitor().args(&["--once"]).passes();
    assert!(cluster.squeue_args().starts_with("-u spec-user -o"), "{}", cluster.squeue_args());
}

#[test]
fn all_users_drops_user_filter() {
    let cluster = Cluster::new();
    cluster.monitor().args(&["--once", "-a"]).passes().stdout_has("User: All Users");
    assert!(cluster.squeue_args().starts_with("-o"), "{}", cluster.squeue_args());
}

#[test]
fn compact_view_lists_every_job() {
    let cluster = Cluster::new();
    cluster
        .monitor()
        .args(&["-1", "-c"])
        .passes()
        .stdout_has("SLURM Jobs (")
        .stdout_has("RUNNING")
        .stdout_has("PENDING")
        .stdout_lacks("Running Summary");
}

#[test]
fn empty_queue_shows_placeholders() {
    let cluster = Cluster::with_jobs("");
    cluster
        .monitor()
        .args(&["--once"])
        .passes()
        .stdout_has("No running jobs")
        .stdout_has("No pending jobs");

    cluster.monitor().args(&["--once", "--compact"]).passes().stdout_has("No jobs found");
}

#[test]
fn json_output_is_machine_readable() {
    let cluster = Cluster::new();
    let run = cluster.monitor().args(&["--once", "--format", "json"]).passes();
    let value: serde_json::Value = serde_json::from_str(&run.stdout()).unwrap();

    assert_eq!(value["owner"], "spec-user");
    assert_eq!(value["jobs"]["101"]["state"], "RUNNING");
    assert_eq!(value["jobs"]["102"]["state"], "PENDING");
    assert_eq!(value["gpu_pools"][0]["name"], "cpu");
    assert_eq!(value["gpu_pools"][1]["total"], 16);
    assert_eq!(value["cluster"]["total_nodes"], 6);
}

#[test]
fn scheduler_failure_exits_nonzero() {
    let cluster = Cluster::new().failing_squeue("slurm_load_jobs error: Unable to contact controller");
    cluster
        .monitor()
        .args(&["--once"])
        .fails_with(1)
        .stdout_has("Refresh failed")
        .stderr_has("job fetch failed")
        .stderr_has("Unable to contact controller");
}

#[test]
fn malformed_output_is_reported() {
    let cluster = Cluster::with_jobs("101|truncated");
    cluster.monitor().args(&["--once"]).fails_with(1).stderr_has("unexpected");
}
