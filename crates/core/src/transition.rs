// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Transition events and per-poll batches.

use crate::job::{JobPhase, JobRecord};
use serde::{Deserialize, Serialize};

/// Kind of a notification-worthy transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    /// Job entered the active phase (e.g. pending → running)
    Started,
    /// Job left the active phase by finishing or disappearing
    Completed,
}

crate::simple_display! {
    TransitionKind {
        Started => "started",
        Completed => "completed",
    }
}

/// Classify one job's change between two consecutive snapshots.
///
/// `None` on either side means the job was absent from that snapshot.
/// Requeues (active → queued) and queued jobs that vanish are silent.
pub fn classify(old: Option<JobPhase>, new: Option<JobPhase>) -> Option<TransitionKind> {
    use JobPhase::{Active, Finished, Queued};
    match (old, new) {
        (None | Some(Queued), Some(Active)) => Some(TransitionKind::Started),
        (Some(Active), None | Some(Finished)) => Some(TransitionKind::Completed),
        (Some(Active), Some(Active | Queued)) => None,
        (Some(Queued), None | Some(Queued | Finished)) => None,
        (None, Some(Queued | Finished)) => None,
        (Some(Finished), _) => None,
        (None, None) => None,
    }
}

/// A single detected transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    /// Post-transition record, or the last-known record if the job vanished
    pub job: JobRecord,
    pub kind: TransitionKind,
    pub observed_at_ms: u64,
}

/// Same-kind transitions from one poll, delivered as one notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    pub kind: TransitionKind,
    pub jobs: Vec<JobRecord>,
    pub observed_at_ms: u64,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

/// Result of observing one snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub started: Vec<JobRecord>,
    pub completed: Vec<JobRecord>,
    pub observed_at_ms: u64,
}

impl Observation {
    pub(crate) fn empty(observed_at_ms: u64) -> Self {
        Self { observed_at_ms, ..Self::default() }
    }

    /// True when no notification is needed this cycle.
    pub fn is_empty(&self) -> bool {
        self.started.is_empty() && self.completed.is_empty()
    }

    /// At most one batch per kind, started first; empty groups are omitted.
    pub fn batches(&self) -> Vec<Batch> {
        [(TransitionKind::Started, &self.started), (TransitionKind::Completed, &self.completed)]
            .into_iter()
            .filter(|(_, jobs)| !jobs.is_empty())
            .map(|(kind, jobs)| Batch {
                kind,
                jobs: jobs.clone(),
                observed_at_ms: self.observed_at_ms,
            })
            .collect()
    }

    /// Flattened view of the individual transitions.
    pub fn transitions(&self) -> Vec<Transition> {
        self.batches()
            .into_iter()
            .flat_map(|batch| {
                let (kind, at) = (batch.kind, batch.observed_at_ms);
                batch.jobs.into_iter().map(move |job| Transition { job, kind, observed_at_ms: at })
            })
            .collect()
    }

    pub(crate) fn push(&mut self, kind: TransitionKind, job: JobRecord) {
        match kind {
            TransitionKind::Started => self.started.push(job),
            TransitionKind::Completed => self.completed.push(job),
        }
    }
}

#[cfg(test)]
#[path = "transition_tests.rs"]
mod tests;
