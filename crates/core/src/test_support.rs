// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::job::{JobRecord, JobState};
use crate::snapshot::Snapshot;

// ── Proptest strategies ─────────────────────────────────────────────────

/// Proptest strategies for snapshot sequences.
pub mod strategies {
    use super::{job, JobState, Snapshot};
    use proptest::collection::btree_map;
    use proptest::prelude::*;

    pub fn arb_job_state() -> impl Strategy<Value = JobState> {
        prop_oneof![
            3 => Just(JobState::Pending),
            3 => Just(JobState::Running),
            1 => Just(JobState::Requeued),
            1 => Just(JobState::Configuring),
            1 => Just(JobState::Completing),
            1 => Just(JobState::Suspended),
            1 => Just(JobState::Completed),
            1 => Just(JobState::Cancelled),
            1 => Just(JobState::StageOut),
            1 => Just(JobState::BootFail),
            1 => Just(JobState::RequeueFed),
            1 => Just(JobState::Other("POWER_UP_NODE".into())),
        ]
    }

    /// Snapshots over a small id space so consecutive samples overlap.
    pub fn arb_snapshot() -> impl Strategy<Value = Snapshot> {
        btree_map(0u8..8, arb_job_state(), 0..8).prop_map(|jobs| {
            let mut snap = Snapshot::new();
            for (id, state) in jobs {
                snap.insert(job(&id.to_string(), state));
            }
            snap
        })
    }
}

// ── Record factories ─────────────────────────────────────────────────

/// A job record with test defaults and the given id and state.
pub fn job(id: &str, state: JobState) -> JobRecord {
    JobRecord::builder().id(id).name(format!("job-{id}")).state(state).build()
}

/// Build a snapshot from `(id, state)` pairs.
///
/// Later pairs win on duplicate ids; use [`Snapshot::try_from_records`] to
/// exercise duplicate detection.
pub fn snapshot(jobs: &[(&str, JobState)]) -> Snapshot {
    let mut snap = Snapshot::new();
    for (id, state) in jobs {
        snap.insert(job(id, state.clone()));
    }
    snap
}
