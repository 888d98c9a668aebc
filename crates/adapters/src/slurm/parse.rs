// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Parsers for `squeue` / `sinfo` pipe-delimited output.
//!
//! Every query uses an explicit `-o` format with `|` separators and
//! `--noheader`, so each non-blank line is one record. A line with too few
//! fields means the output is not what we asked for; the whole fetch is
//! rejected instead of guessing, since a silently dropped job would later
//! read as a completion.

use sm_core::{
    truncate_chars, CpuCounts, JobId, JobRecord, JobState, NodeGroup, PartitionInfo, NAME_MAX,
    REASON_MAX,
};
use thiserror::Error;

/// `squeue -o` format: id, name, user, partition, state, elapsed, limit, nodes, reason, gres
pub const JOB_FORMAT: &str = "%i|%j|%u|%P|%T|%M|%l|%D|%R|%b";
/// `sinfo -o` format for partition availability and CPU counts
pub const PARTITION_FORMAT: &str = "%P|%a|%D|%C";
/// `sinfo -o` format for per-node-group GPU inventory
pub const GRES_FORMAT: &str = "%P|%G|%D|%t|%C";

const JOB_FIELDS: usize = 10;
const PARTITION_FIELDS: usize = 4;
const GRES_FIELDS: usize = 5;

/// A line that does not match the requested format
#[derive(Debug, Error, PartialEq, Eq)]
#[error("line {line}: expected {expected} fields, found {found}: {text:?}")]
pub struct ParseError {
    pub line: usize,
    pub expected: usize,
    pub found: usize,
    pub text: String,
}

/// Split non-blank lines into trimmed fields, enforcing a minimum field count.
fn records(output: &str, expected: usize) -> impl Iterator<Item = Result<Vec<&str>, ParseError>> {
    output.lines().enumerate().filter(|(_, line)| !line.trim().is_empty()).map(
        move |(idx, line)| {
            let fields: Vec<&str> = line.split('|').map(str::trim).collect();
            if fields.len() < expected {
                return Err(ParseError {
                    line: idx + 1,
                    expected,
                    found: fields.len(),
                    text: line.to_string(),
                });
            }
            Ok(fields)
        },
    )
}

/// Partition names carry a `*` suffix on the default partition.
fn partition_name(raw: &str) -> String {
    raw.trim_end_matches('*').to_string()
}

pub fn parse_jobs(output: &str) -> Result<Vec<JobRecord>, ParseError> {
    records(output, JOB_FIELDS)
        .map(|fields| {
            let f = fields?;
            Ok(JobRecord {
                id: JobId::new(f[0]),
                name: truncate_chars(f[1], NAME_MAX),
                user: f[2].to_string(),
                partition: f[3].to_string(),
                state: JobState::parse(f[4]),
                elapsed: f[5].to_string(),
                time_limit: f[6].to_string(),
                nodes: f[7].to_string(),
                reason: truncate_chars(f[8], REASON_MAX),
                gres: f[9].to_string(),
            })
        })
        .collect()
}

pub fn parse_partitions(output: &str) -> Result<Vec<PartitionInfo>, ParseError> {
    records(output, PARTITION_FIELDS)
        .map(|fields| {
            let f = fields?;
            Ok(PartitionInfo {
                name: partition_name(f[0]),
                availability: f[1].to_string(),
                nodes: f[2].parse().unwrap_or(0),
                cpus: CpuCounts::parse(f[3]),
            })
        })
        .collect()
}

pub fn parse_node_groups(output: &str) -> Result<Vec<NodeGroup>, ParseError> {
    records(output, GRES_FIELDS)
        .map(|fields| {
            let f = fields?;
            Ok(NodeGroup {
                partition: partition_name(f[0]),
                gres: f[1].to_string(),
                nodes: f[2].parse().unwrap_or(0),
                state: f[3].to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
#[path = "parse_tests.rs"]
mod tests;
