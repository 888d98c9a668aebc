// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Transition tracker: diffs successive snapshots into notification batches.
//!
//! The tracker owns the most recently observed [`Snapshot`] plus the phase
//! each of its jobs was last classified in. Each call to [`Tracker::observe`]
//! classifies every job id present in either the retained or the new
//! snapshot, then replaces both wholesale. The first observation after
//! construction only primes the tracker, so restarting the monitor does not
//! re-announce jobs that were already running.
//!
//! A job in a state name the scheduler reports but this build does not know
//! keeps the phase it had on the previous poll, so an unknown intermediate
//! state neither starts nor finishes a job.

use crate::clock::Clock;
use crate::job::{JobId, JobPhase};
use crate::snapshot::Snapshot;
use crate::transition::{classify, Observation};
use std::collections::HashMap;

/// Stateful diff engine for one monitoring session.
///
/// `observe` takes `&mut self`, so overlapping observations are ruled out by
/// the borrow checker rather than by locking.
#[derive(Debug)]
pub struct Tracker<C: Clock> {
    previous: Option<Snapshot>,
    /// Effective phase per retained job; jobs never seen in a known state are absent
    phases: HashMap<JobId, JobPhase>,
    clock: C,
}

impl<C: Clock> Tracker<C> {
    pub fn new(clock: C) -> Self {
        Self { previous: None, phases: HashMap::new(), clock }
    }

    /// Whether a first snapshot has been observed.
    pub fn is_primed(&self) -> bool {
        self.previous.is_some()
    }

    /// The snapshot retained from the last observation.
    pub fn retained(&self) -> Option<&Snapshot> {
        self.previous.as_ref()
    }

    /// Effective phase of a retained job, after carrying over unknown states.
    pub fn phase_of(&self, id: &JobId) -> Option<JobPhase> {
        self.phases.get(id).copied()
    }

    /// Diff `snapshot` against the retained one and retain it.
    pub fn observe(&mut self, snapshot: Snapshot) -> Observation {
        let mut observation = Observation::empty(self.clock.epoch_ms());

        let mut phases = HashMap::with_capacity(snapshot.len());
        let Some(previous) = self.previous.as_ref() else {
            for job in snapshot.iter() {
                if let Some(phase) = job.state.phase() {
                    phases.insert(job.id.clone(), phase);
                }
            }
            self.previous = Some(snapshot);
            self.phases = phases;
            return observation;
        };

        // Set difference first: ids only in the retained snapshot
        let departed: Vec<_> = snapshot
            .departed_from(previous)
            .into_iter()
            .filter_map(|job| classify(self.phase_of(&job.id), None).map(|k| (k, job.clone())))
            .collect();

        for job in snapshot.iter() {
            let old = self.phase_of(&job.id);
            let Some(new) = job.state.phase().or(old) else {
                continue;
            };
            if let Some(kind) = classify(old, Some(new)) {
                observation.push(kind, job.clone());
            }
            phases.insert(job.id.clone(), new);
        }
        for (kind, job) in departed {
            observation.push(kind, job);
        }

        self.previous = Some(snapshot);
        self.phases = phases;
        observation
    }
}

#[cfg(test)]
#[path = "tracker_tests.rs"]
mod tests;
