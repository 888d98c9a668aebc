// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! sm-adapters: scheduler queries and notification delivery

pub mod command;
pub mod notify;
pub mod slurm;
pub mod webhook;

pub use command::{run_with_timeout, CommandError, QUERY_TIMEOUT};
#[cfg(any(test, feature = "test-support"))]
pub use notify::FakeNotifier;
pub use notify::{format_batch, DesktopNotifier, FanoutNotifier, Notifier, NotifyError};
pub use slurm::parse::ParseError;
#[cfg(any(test, feature = "test-support"))]
pub use slurm::FakeSnapshotSource;
pub use slurm::{OwnerFilter, SlurmCli, SlurmConfig, SnapshotSource, SourceError};
pub use webhook::{WebhookNotifier, WEBHOOK_TIMEOUT};
