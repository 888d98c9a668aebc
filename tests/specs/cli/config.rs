// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration file and environment handling

use crate::prelude::*;

#[test]
fn config_file_sets_defaults() {
    let cluster = Cluster::new();
    cluster.file("config/slurm-monitor/config.toml", "interval_secs = 30\ncompact = true\n");

    cluster.monitor().args(&["--once"]).passes().stdout_has("SLURM Jobs (");
}

#[test]
fn cli_interval_overrides_env() {
    let cluster = Cluster::new();
    cluster
        .monitor()
        .env("SLURM_MONITOR_INTERVAL", "9")
        .args(&["--once", "-i", "3"])
        .passes()
        .stdout_has("Refresh: 3s");

    cluster
        .monitor()
        .env("SLURM_MONITOR_INTERVAL", "9")
        .args(&["--once"])
        .passes()
        .stdout_has("Refresh: 9s");
}

#[test]
fn explicit_config_path_must_exist() {
    let cluster = Cluster::new();
    let missing = cluster.path().join("nope.toml");
    cluster
        .monitor()
        .args(&["--once", "--config", missing.to_str().unwrap()])
        .fails_with(2)
        .stderr_has("failed to read config");
}

#[test]
fn invalid_config_is_fatal() {
    let cluster = Cluster::new();
    let path = cluster.file("bad.toml", "interval_secs = \"often\"\n");
    cluster
        .monitor()
        .args(&["--once", "--config", path.to_str().unwrap()])
        .fails_with(2)
        .stderr_has("invalid config");
}

#[test]
fn zero_interval_is_rejected() {
    let cluster = Cluster::new();
    cluster
        .monitor()
        .args(&["--once", "--interval", "0"])
        .fails_with(2)
        .stderr_has("at least 1 second");
}

#[test]
fn json_requires_once() {
    let cluster = Cluster::new();
    cluster.monitor().args(&["--format", "json"]).fails_with(2).stderr_has("requires --once");
}
