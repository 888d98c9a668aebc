// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job records as reported by the scheduler.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;

/// Maximum characters of a job name kept for display.
pub const NAME_MAX: usize = 30;
/// Maximum characters of a pending reason kept for display.
pub const REASON_MAX: usize = 25;

/// Scheduler job identifier (e.g. `"4182"`, `"4182_7"` for array tasks).
///
/// Stable across polls for the same workload instance. Ordering is
/// numeric-aware so `"9"` sorts before `"10"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(SmolStr);

impl JobId {
    pub fn new(id: impl Into<SmolStr>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for JobId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl Borrow<str> for JobId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for JobId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for JobId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl Ord for JobId {
    fn cmp(&self, other: &Self) -> Ordering {
        natural_cmp(&self.0, &other.0).then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for JobId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Compare two strings treating runs of ASCII digits as numbers.
fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut a = a;
    let mut b = b;
    loop {
        match (a.is_empty(), b.is_empty()) {
            (true, true) => return Ordering::Equal,
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            (false, false) => {}
        }
        let (chunk_a, rest_a) = split_chunk(a);
        let (chunk_b, rest_b) = split_chunk(b);
        let a_digits = chunk_a.starts_with(|c: char| c.is_ascii_digit());
        let b_digits = chunk_b.starts_with(|c: char| c.is_ascii_digit());
        let ord = match (a_digits, b_digits) {
            (true, true) => {
                let ta = chunk_a.trim_start_matches('0');
                let tb = chunk_b.trim_start_matches('0');
                ta.len().cmp(&tb.len()).then_with(|| ta.cmp(tb))
            }
            // Numbers sort before text
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => chunk_a.cmp(chunk_b),
        };
        if ord != Ordering::Equal {
            return ord;
        }
        a = rest_a;
        b = rest_b;
    }
}

/// Split off the leading run of all-digit or all-non-digit characters.
fn split_chunk(s: &str) -> (&str, &str) {
    let digits = s.starts_with(|c: char| c.is_ascii_digit());
    let end = s
        .char_indices()
        .find(|(_, c)| c.is_ascii_digit() != digits)
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    s.split_at(end)
}

/// Lifecycle state of a job, as named by `squeue %T`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum JobState {
    Pending,
    Requeued,
    RequeueHold,
    RequeueFed,
    ResvDelHold,
    Configuring,
    Running,
    Completing,
    Suspended,
    Stopped,
    Signaling,
    StageOut,
    Resizing,
    Completed,
    Cancelled,
    Failed,
    Timeout,
    Preempted,
    NodeFail,
    OutOfMemory,
    BootFail,
    Deadline,
    SpecialExit,
    Revoked,
    /// A state name this build does not know about
    Other(SmolStr),
}

/// Coarse phase used for transition classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobPhase {
    /// Waiting in the queue (includes requeued and held jobs)
    Queued,
    /// Holding or releasing resources (running, suspended, staging out, ...)
    Active,
    /// Terminal state still visible in the queue listing
    Finished,
}

crate::simple_display! {
    JobPhase {
        Queued => "queued",
        Active => "active",
        Finished => "finished",
    }
}

impl JobState {
    /// Parse a scheduler state name. Unknown names become [`JobState::Other`].
    pub fn parse(name: &str) -> Self {
        let name = name.trim();
        match name.to_ascii_uppercase().as_str() {
            "PENDING" | "PD" => JobState::Pending,
            "REQUEUED" | "RQ" => JobState::Requeued,
            "REQUEUE_HOLD" | "RH" => JobState::RequeueHold,
            "REQUEUE_FED" | "RF" => JobState::RequeueFed,
            "RESV_DEL_HOLD" | "RD" => JobState::ResvDelHold,
            "CONFIGURING" | "CF" => JobState::Configuring,
            "RUNNING" | "R" => JobState::Running,
            "COMPLETING" | "CG" => JobState::Completing,
            "SUSPENDED" | "S" => JobState::Suspended,
            "STOPPED" | "ST" => JobState::Stopped,
            "SIGNALING" | "SI" => JobState::Signaling,
            "STAGE_OUT" | "SO" => JobState::StageOut,
            "RESIZING" | "RS" => JobState::Resizing,
            "COMPLETED" | "CD" => JobState::Completed,
            "CANCELLED" | "CA" => JobState::Cancelled,
            "FAILED" | "F" => JobState::Failed,
            "TIMEOUT" | "TO" => JobState::Timeout,
            "PREEMPTED" | "PR" => JobState::Preempted,
            "NODE_FAIL" | "NF" => JobState::NodeFail,
            "OUT_OF_MEMORY" | "OOM" => JobState::OutOfMemory,
            "BOOT_FAIL" | "BF" => JobState::BootFail,
            "DEADLINE" | "DL" => JobState::Deadline,
            "SPECIAL_EXIT" | "SE" => JobState::SpecialExit,
            "REVOKED" | "RV" => JobState::Revoked,
            _ => JobState::Other(SmolStr::new(name)),
        }
    }

    /// Scheduler spelling of this state.
    pub fn as_str(&self) -> &str {
        match self {
            JobState::Pending => "PENDING",
            JobState::Requeued => "REQUEUED",
            JobState::RequeueHold => "REQUEUE_HOLD",
            JobState::RequeueFed => "REQUEUE_FED",
            JobState::ResvDelHold => "RESV_DEL_HOLD",
            JobState::Configuring => "CONFIGURING",
            JobState::Running => "RUNNING",
            JobState::Completing => "COMPLETING",
            JobState::Suspended => "SUSPENDED",
            JobState::Stopped => "STOPPED",
            JobState::Signaling => "SIGNALING",
            JobState::StageOut => "STAGE_OUT",
            JobState::Resizing => "RESIZING",
            JobState::Completed => "COMPLETED",
            JobState::Cancelled => "CANCELLED",
            JobState::Failed => "FAILED",
            JobState::Timeout => "TIMEOUT",
            JobState::Preempted => "PREEMPTED",
            JobState::NodeFail => "NODE_FAIL",
            JobState::OutOfMemory => "OUT_OF_MEMORY",
            JobState::BootFail => "BOOT_FAIL",
            JobState::Deadline => "DEADLINE",
            JobState::SpecialExit => "SPECIAL_EXIT",
            JobState::Revoked => "REVOKED",
            JobState::Other(name) => name,
        }
    }

    /// Phase of a known state; `None` for [`JobState::Other`].
    pub fn phase(&self) -> Option<JobPhase> {
        let phase = match self {
            JobState::Pending
            | JobState::Requeued
            | JobState::RequeueHold
            | JobState::RequeueFed
            | JobState::ResvDelHold => JobPhase::Queued,
            JobState::Configuring
            | JobState::Running
            | JobState::Completing
            | JobState::Suspended
            | JobState::Stopped
            | JobState::Signaling
            | JobState::StageOut
            | JobState::Resizing => JobPhase::Active,
            JobState::Completed
            | JobState::Cancelled
            | JobState::Failed
            | JobState::Timeout
            | JobState::Preempted
            | JobState::NodeFail
            | JobState::OutOfMemory
            | JobState::BootFail
            | JobState::Deadline
            | JobState::SpecialExit
            | JobState::Revoked => JobPhase::Finished,
            JobState::Other(_) => return None,
        };
        Some(phase)
    }

    pub fn is_running(&self) -> bool {
        matches!(self, JobState::Running)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, JobState::Pending)
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for JobState {
    fn from(s: String) -> Self {
        JobState::parse(&s)
    }
}

impl From<JobState> for String {
    fn from(s: JobState) -> Self {
        s.as_str().to_string()
    }
}

/// One job as seen in a single poll.
///
/// Only `id` and `state` take part in transition detection; the rest is
/// carried through for display and notification content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: JobId,
    pub name: String,
    pub user: String,
    pub partition: String,
    pub state: JobState,
    /// Elapsed run time as printed by the scheduler (`%M`)
    pub elapsed: String,
    /// Time limit as printed by the scheduler (`%l`)
    pub time_limit: String,
    /// Node count (`%D`)
    pub nodes: String,
    /// Pending reason or node list (`%R`)
    pub reason: String,
    /// Generic resources requested (`%b`), e.g. `gpu:a100:4`
    pub gres: String,
}

impl JobRecord {
    /// Requested GPUs parsed from the GRES field.
    pub fn gpu_count(&self) -> u32 {
        crate::gres::gpu_count(&self.gres)
    }

    /// GRES without the `gpu:` prefix, or `-` when no GPU was requested.
    pub fn gpu_label(&self) -> String {
        if self.gres.contains("gpu") {
            self.gres.replace("gpu:", "")
        } else {
            "-".to_string()
        }
    }
}

/// Truncate to at most `max` characters (not bytes).
pub fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

crate::builder! {
    pub struct JobRecordBuilder => JobRecord {
        into {
            id: JobId = "1000",
            name: String = "train",
            user: String = "alice",
            partition: String = "gpu",
            elapsed: String = "0:00",
            time_limit: String = "1:00:00",
            nodes: String = "1",
            reason: String = "None",
            gres: String = "gpu:1",
        }
        set {
            state: JobState = JobState::Running,
        }
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
