// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Point-in-time view of every job visible to the monitor.

use crate::job::{JobId, JobRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors building a snapshot
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("duplicate job id in snapshot: {0}")]
    DuplicateId(JobId),
}

/// All jobs visible at one poll, keyed by id.
///
/// Iteration is ordered by [`JobId`], which keeps every derived listing
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    jobs: BTreeMap<JobId, JobRecord>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a snapshot, rejecting repeated ids.
    pub fn try_from_records(
        records: impl IntoIterator<Item = JobRecord>,
    ) -> Result<Self, SnapshotError> {
        let mut jobs = BTreeMap::new();
        for record in records {
            let id = record.id.clone();
            if jobs.insert(id.clone(), record).is_some() {
                return Err(SnapshotError::DuplicateId(id));
            }
        }
        Ok(Self { jobs })
    }

    /// Insert or replace a record, returning the one it replaced.
    pub fn insert(&mut self, record: JobRecord) -> Option<JobRecord> {
        self.jobs.insert(record.id.clone(), record)
    }

    pub fn get(&self, id: &JobId) -> Option<&JobRecord> {
        self.jobs.get(id)
    }

    pub fn contains(&self, id: &JobId) -> bool {
        self.jobs.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &JobId> {
        self.jobs.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = &JobRecord> {
        self.jobs.values()
    }

    /// Jobs in the `RUNNING` state.
    pub fn running(&self) -> impl Iterator<Item = &JobRecord> {
        self.iter().filter(|j| j.state.is_running())
    }

    /// Jobs in the `PENDING` state.
    pub fn pending(&self) -> impl Iterator<Item = &JobRecord> {
        self.iter().filter(|j| j.state.is_pending())
    }

    /// Jobs present in `previous` but missing from `self`, in id order.
    pub fn departed_from<'a>(&self, previous: &'a Snapshot) -> Vec<&'a JobRecord> {
        previous.iter().filter(|job| !self.contains(&job.id)).collect()
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = &'a JobRecord;
    type IntoIter = std::collections::btree_map::Values<'a, JobId, JobRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.jobs.values()
    }
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
