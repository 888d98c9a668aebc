// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resource-pool capacity and usage figures.
//!
//! A resource pool is a scheduler partition. GPU capacity is aggregated from
//! per-node-group inventory rows; CPU figures come straight from the
//! scheduler's `allocated/idle/other/total` column.

use crate::gres;
use crate::snapshot::Snapshot;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One `sinfo` row: a group of nodes in a partition sharing a state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeGroup {
    pub partition: String,
    /// Node GRES inventory, e.g. `gpu:a100:8(S:0-1)`
    pub gres: String,
    pub nodes: u32,
    /// Compact node state, e.g. `idle`, `mix`, `alloc`, `drain*`
    pub state: String,
}

impl NodeGroup {
    /// Node state with the scheduler's flag suffixes (`*`, `~`, `#`, ...) removed.
    pub fn base_state(&self) -> &str {
        self.state.trim_end_matches(|c: char| !c.is_ascii_alphanumeric())
    }
}

/// GPU capacity of one partition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GpuPool {
    pub name: String,
    pub gpu_type: String,
    pub total: u32,
    /// Estimated free GPUs: all of an idle node, half of a mixed one
    pub idle: u32,
}

impl GpuPool {
    /// Aggregate node groups into per-partition pools, sorted by name.
    pub fn aggregate(groups: impl IntoIterator<Item = NodeGroup>) -> Vec<GpuPool> {
        let mut pools: BTreeMap<String, GpuPool> = BTreeMap::new();
        for group in groups {
            let (gpu_type, per_node) = gres::node_gpus(&group.gres);
            let gpus = group.nodes.saturating_mul(per_node);
            let pool = pools.entry(group.partition.clone()).or_insert_with(|| GpuPool {
                name: group.partition.clone(),
                gpu_type,
                ..GpuPool::default()
            });
            pool.total += gpus;
            match group.base_state() {
                "idle" => pool.idle += gpus,
                "mix" => pool.idle += gpus / 2,
                _ => {}
            }
        }
        pools.into_values().collect()
    }

    pub fn in_use(&self) -> u32 {
        self.total.saturating_sub(self.idle)
    }

    /// Share of GPUs in use, 0–100.
    pub fn usage_percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        f64::from(self.in_use()) / f64::from(self.total) * 100.0
    }
}

/// CPU counts in `allocated/idle/other/total` form
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CpuCounts {
    pub alloc: u32,
    pub idle: u32,
    pub other: u32,
    pub total: u32,
}

impl CpuCounts {
    /// Parse `A/I/O/T`. Returns `None` for any other shape.
    pub fn parse(s: &str) -> Option<Self> {
        let parts: Vec<u32> = s.trim().split('/').map(|p| p.parse().ok()).collect::<Option<_>>()?;
        match parts.as_slice() {
            [alloc, idle, other, total] => {
                Some(Self { alloc: *alloc, idle: *idle, other: *other, total: *total })
            }
            _ => None,
        }
    }
}

/// Partition availability row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionInfo {
    pub name: String,
    /// `up`, `down`, `drain` or `inact`
    pub availability: String,
    pub nodes: u32,
    pub cpus: Option<CpuCounts>,
}

/// Cluster-wide totals shown in the dashboard header
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterSummary {
    pub total_nodes: u32,
    pub cpus_alloc: u32,
    pub cpus_total: u32,
    pub gpus_in_use: u32,
}

impl ClusterSummary {
    pub fn from_parts(partitions: &[PartitionInfo], gpus_in_use: u32) -> Self {
        let mut summary = Self { gpus_in_use, ..Self::default() };
        for partition in partitions {
            summary.total_nodes += partition.nodes;
            if let Some(cpus) = partition.cpus {
                summary.cpus_alloc += cpus.alloc;
                summary.cpus_total += cpus.total;
            }
        }
        summary
    }
}

/// GPUs requested by the running jobs of a snapshot.
pub fn gpus_in_use(jobs: &Snapshot) -> u32 {
    jobs.running().map(|j| j.gpu_count()).sum()
}

/// Running jobs and their GPUs in one partition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionUsage {
    pub partition: String,
    pub jobs: u32,
    pub gpus: u32,
}

/// Per-partition usage of running jobs, sorted by partition name.
pub fn partition_usage(jobs: &Snapshot) -> Vec<PartitionUsage> {
    let mut usage: BTreeMap<&str, (u32, u32)> = BTreeMap::new();
    for job in jobs.running() {
        let entry = usage.entry(job.partition.as_str()).or_default();
        entry.0 += 1;
        entry.1 += job.gpu_count();
    }
    usage
        .into_iter()
        .map(|(partition, (jobs, gpus))| PartitionUsage {
            partition: partition.to_string(),
            jobs,
            gpus,
        })
        .collect()
}

#[cfg(test)]
#[path = "pool_tests.rs"]
mod tests;
