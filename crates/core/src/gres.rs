// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! GPU counts from generic-resource (GRES) strings.
//!
//! Job requests look like `gpu:4`, `gpu:a100:4` or `gres/gpu:2`; node
//! inventories look like `gpu:a100:8(S:0-1)`. Anything unparsable counts
//! as zero GPUs.

/// The `gpu:` entry of a GRES list, without the prefix or socket suffix.
fn gpu_entry(gres: &str) -> Option<&str> {
    let (_, after) = gres.split_once("gpu:")?;
    let entry = after.split(',').next().unwrap_or(after);
    Some(entry.split('(').next().unwrap_or(entry))
}

/// GPUs requested by a job.
pub fn gpu_count(gres: &str) -> u32 {
    node_gpus(gres).1
}

/// GPU type and per-node count from a node GRES string.
///
/// The type is empty when the scheduler does not name one (`gpu:4`).
pub fn node_gpus(gres: &str) -> (String, u32) {
    let Some(entry) = gpu_entry(gres) else {
        return (String::new(), 0);
    };
    match entry.rsplit_once(':') {
        Some((kind, count)) => (kind.to_string(), count.trim().parse().unwrap_or(0)),
        None => (String::new(), entry.trim().parse().unwrap_or(0)),
    }
}

#[cfg(test)]
#[path = "gres_tests.rs"]
mod tests;
