// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! sm-core: job model and transition tracking for the slurm-monitor tool

pub mod macros;

pub mod clock;
pub mod gres;
pub mod job;
pub mod pool;
pub mod snapshot;
pub mod tracker;
pub mod transition;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use clock::{Clock, FakeClock, SystemClock};
pub use job::{truncate_chars, JobId, JobPhase, JobRecord, JobState, NAME_MAX, REASON_MAX};
#[cfg(any(test, feature = "test-support"))]
pub use job::JobRecordBuilder;
pub use pool::{
    gpus_in_use, partition_usage, ClusterSummary, CpuCounts, GpuPool, NodeGroup, PartitionInfo,
    PartitionUsage,
};
pub use snapshot::{Snapshot, SnapshotError};
pub use tracker::Tracker;
pub use transition::{classify, Batch, Observation, Transition, TransitionKind};
