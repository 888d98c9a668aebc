// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Snapshot source backed by the Slurm command-line tools.
//!
//! Each query runs the tool directly (no shell) with a fixed output format
//! and a timeout. A query that cannot be performed surfaces as a
//! [`SourceError`]; a query that succeeds with no rows is an empty result.

pub mod parse;

use crate::command::{run_with_timeout, CommandError, QUERY_TIMEOUT};
use async_trait::async_trait;
use parse::{ParseError, GRES_FORMAT, JOB_FORMAT, PARTITION_FORMAT};
use sm_core::{GpuPool, PartitionInfo, Snapshot, SnapshotError};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;

/// Errors fetching scheduler state
#[derive(Debug, Error)]
pub enum SourceError {
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error("unexpected {program} output: {source}")]
    Parse {
        program: String,
        #[source]
        source: ParseError,
    },
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

/// Whose jobs to list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnerFilter {
    CurrentUser(String),
    AllUsers,
}

impl OwnerFilter {
    pub fn user(&self) -> Option<&str> {
        match self {
            OwnerFilter::CurrentUser(user) => Some(user),
            OwnerFilter::AllUsers => None,
        }
    }
}

impl fmt::Display for OwnerFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OwnerFilter::CurrentUser(user) => f.write_str(user),
            OwnerFilter::AllUsers => f.write_str("All Users"),
        }
    }
}

/// Source of job snapshots and resource-pool figures
#[async_trait]
pub trait SnapshotSource: Clone + Send + Sync + 'static {
    /// Current jobs matching `filter`. No visible jobs is an empty snapshot.
    async fn list_jobs(&self, filter: &OwnerFilter) -> Result<Snapshot, SourceError>;

    /// Partition availability and CPU counts.
    async fn list_partitions(&self) -> Result<Vec<PartitionInfo>, SourceError>;

    /// GPU capacity per partition, sorted by name.
    async fn list_gpu_pools(&self) -> Result<Vec<GpuPool>, SourceError>;
}

/// Locations of the scheduler tools and the per-query timeout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlurmConfig {
    pub squeue: PathBuf,
    pub sinfo: PathBuf,
    pub timeout: Duration,
}

impl Default for SlurmConfig {
    fn default() -> Self {
        Self { squeue: "squeue".into(), sinfo: "sinfo".into(), timeout: QUERY_TIMEOUT }
    }
}

/// [`SnapshotSource`] that shells out to `squeue` and `sinfo`.
#[derive(Debug, Clone, Default)]
pub struct SlurmCli {
    config: SlurmConfig,
}

impl SlurmCli {
    pub fn new(config: SlurmConfig) -> Self {
        Self { config }
    }

    async fn query(&self, program: &Path, args: &[&str]) -> Result<String, SourceError> {
        let label = program.display().to_string();
        let mut cmd = Command::new(program);
        cmd.args(args);
        tracing::debug!(program = %label, ?args, "querying scheduler");
        let output = run_with_timeout(cmd, self.config.timeout, &label).await?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

fn parse_err(program: &Path) -> impl FnOnce(ParseError) -> SourceError + '_ {
    move |source| SourceError::Parse { program: program.display().to_string(), source }
}

#[async_trait]
impl SnapshotSource for SlurmCli {
    async fn list_jobs(&self, filter: &OwnerFilter) -> Result<Snapshot, SourceError> {
        let mut args = Vec::new();
        if let Some(user) = filter.user() {
            args.extend(["-u", user]);
        }
        args.extend(["-o", JOB_FORMAT, "--noheader"]);

        let stdout = self.query(&self.config.squeue, &args).await?;
        let records = parse::parse_jobs(&stdout).map_err(parse_err(&self.config.squeue))?;
        Ok(Snapshot::try_from_records(records)?)
    }

    async fn list_partitions(&self) -> Result<Vec<PartitionInfo>, SourceError> {
        let stdout =
            self.query(&self.config.sinfo, &["-o", PARTITION_FORMAT, "--noheader"]).await?;
        parse::parse_partitions(&stdout).map_err(parse_err(&self.config.sinfo))
    }

    async fn list_gpu_pools(&self) -> Result<Vec<GpuPool>, SourceError> {
        let stdout = self.query(&self.config.sinfo, &["-o", GRES_FORMAT, "--noheader"]).await?;
        let groups = parse::parse_node_groups(&stdout).map_err(parse_err(&self.config.sinfo))?;
        Ok(GpuPool::aggregate(groups))
    }
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{OwnerFilter, SnapshotSource, SourceError};
    use crate::command::CommandError;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use sm_core::{GpuPool, PartitionInfo, Snapshot};
    use std::collections::VecDeque;
    use std::sync::Arc;

    enum Scripted {
        Jobs(Snapshot),
        Fail(String),
    }

    #[derive(Default)]
    struct FakeSourceState {
        script: VecDeque<Scripted>,
        last: Snapshot,
        partitions: Vec<PartitionInfo>,
        pools: Vec<GpuPool>,
        job_queries: Vec<OwnerFilter>,
    }

    /// Scripted snapshot source for testing.
    ///
    /// Job queries pop scripted responses in order; once the script runs out
    /// the last successful snapshot is repeated.
    #[derive(Clone, Default)]
    pub struct FakeSnapshotSource {
        inner: Arc<Mutex<FakeSourceState>>,
    }

    impl FakeSnapshotSource {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn push_jobs(&self, snapshot: Snapshot) -> &Self {
            self.inner.lock().script.push_back(Scripted::Jobs(snapshot));
            self
        }

        pub fn push_failure(&self, message: &str) -> &Self {
            self.inner.lock().script.push_back(Scripted::Fail(message.to_string()));
            self
        }

        pub fn set_partitions(&self, partitions: Vec<PartitionInfo>) {
            self.inner.lock().partitions = partitions;
        }

        pub fn set_pools(&self, pools: Vec<GpuPool>) {
            self.inner.lock().pools = pools;
        }

        /// Filters passed to `list_jobs`, in call order
        pub fn job_queries(&self) -> Vec<OwnerFilter> {
            self.inner.lock().job_queries.clone()
        }
    }

    #[async_trait]
    impl SnapshotSource for FakeSnapshotSource {
        async fn list_jobs(&self, filter: &OwnerFilter) -> Result<Snapshot, SourceError> {
            let mut state = self.inner.lock();
            state.job_queries.push(filter.clone());
            match state.script.pop_front() {
                Some(Scripted::Jobs(snapshot)) => {
                    state.last = snapshot.clone();
                    Ok(snapshot)
                }
                Some(Scripted::Fail(stderr)) => Err(CommandError::Failed {
                    program: "squeue".to_string(),
                    status: "exit status: 1".to_string(),
                    stderr,
                }
                .into()),
                None => Ok(state.last.clone()),
            }
        }

        async fn list_partitions(&self) -> Result<Vec<PartitionInfo>, SourceError> {
            Ok(self.inner.lock().partitions.clone())
        }

        async fn list_gpu_pools(&self) -> Result<Vec<GpuPool>, SourceError> {
            Ok(self.inner.lock().pools.clone())
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeSnapshotSource;

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
