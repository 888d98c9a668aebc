// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Notification delivery for transition batches.
//!
//! Delivery is best-effort: callers log a failed batch and move on, nothing
//! is queued for retry.

use crate::webhook::WebhookNotifier;
use async_trait::async_trait;
use sm_core::{Batch, JobRecord, TransitionKind};
use thiserror::Error;

/// Errors from notify operations
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("send failed: {0}")]
    SendFailed(String),
    #[error("webhook request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("webhook rejected notification with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Delivers one batch of same-kind transitions
#[async_trait]
pub trait Notifier: Clone + Send + Sync + 'static {
    async fn deliver(&self, batch: &Batch) -> Result<(), NotifyError>;
}

/// Title and body text for a batch.
pub fn format_batch(batch: &Batch) -> (String, String) {
    let verb = match batch.kind {
        TransitionKind::Started => "started",
        TransitionKind::Completed => "completed",
    };
    let plural = if batch.len() == 1 { "" } else { "s" };
    let title = format!("{} job{} {}", batch.len(), plural, verb);
    let body = batch.jobs.iter().map(|job| job_line(job, batch.kind)).collect::<Vec<_>>().join("\n");
    (title, body)
}

fn job_line(job: &JobRecord, kind: TransitionKind) -> String {
    let mut line = format!("{} {} ({})", job.id, job.name, job.partition);
    let gpus = job.gpu_count();
    if gpus > 0 {
        line.push_str(&format!(", {} GPU{}", gpus, if gpus == 1 { "" } else { "s" }));
    }
    if kind == TransitionKind::Completed && !job.elapsed.is_empty() {
        line.push_str(&format!(", ran {}", job.elapsed));
    }
    line
}

/// Desktop notification adapter using notify-rust.
///
/// On macOS, `notify-rust` uses `mac-notification-sys` (Cocoa bindings) to send
/// notifications via the Notification Center. The first notification triggers
/// an AppleScript lookup of a bundle identifier, which blocks forever without
/// Automation permissions. We pre-set the bundle identifier at construction
/// time to bypass the lookup entirely.
#[derive(Clone, Copy, Debug, Default)]
pub struct DesktopNotifier;

impl DesktopNotifier {
    pub fn new() -> Self {
        #[cfg(target_os = "macos")]
        {
            let _ = mac_notification_sys::set_application("com.apple.Terminal");
        }
        Self
    }
}

#[async_trait]
impl Notifier for DesktopNotifier {
    async fn deliver(&self, batch: &Batch) -> Result<(), NotifyError> {
        let (title, message) = format_batch(batch);
        // notify_rust::Notification::show() is synchronous on macOS.
        // Fire-and-forget on tokio's bounded blocking thread pool.
        tokio::task::spawn_blocking(move || {
            tracing::info!(%title, "sending desktop notification");
            match notify_rust::Notification::new().summary(&title).body(&message).show() {
                Ok(_) => {
                    tracing::info!(%title, "desktop notification sent");
                }
                Err(e) => {
                    tracing::warn!(%title, error = %e, "desktop notification failed");
                }
            }
        });
        Ok(())
    }
}

/// Delivers to every configured notifier.
///
/// All targets are attempted; the first error is returned. With nothing
/// configured, batches are only logged.
#[derive(Clone, Debug, Default)]
pub struct FanoutNotifier {
    webhook: Option<WebhookNotifier>,
    desktop: Option<DesktopNotifier>,
}

impl FanoutNotifier {
    pub fn new(webhook: Option<WebhookNotifier>, desktop: Option<DesktopNotifier>) -> Self {
        Self { webhook, desktop }
    }

    pub fn is_empty(&self) -> bool {
        self.webhook.is_none() && self.desktop.is_none()
    }
}

#[async_trait]
impl Notifier for FanoutNotifier {
    async fn deliver(&self, batch: &Batch) -> Result<(), NotifyError> {
        if self.is_empty() {
            let (title, body) = format_batch(batch);
            tracing::info!(%title, %body, "no notifier configured");
            return Ok(());
        }

        let mut first_err = None;
        if let Some(webhook) = &self.webhook {
            if let Err(e) = webhook.deliver(batch).await {
                first_err.get_or_insert(e);
            }
        }
        if let Some(desktop) = &self.desktop {
            if let Err(e) = desktop.deliver(batch).await {
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{Notifier, NotifyError};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use sm_core::Batch;
    use std::sync::Arc;

    #[derive(Default)]
    struct FakeNotifierState {
        delivered: Vec<Batch>,
        attempts: usize,
        fail: bool,
    }

    /// Fake notifier for testing
    #[derive(Clone, Default)]
    pub struct FakeNotifier {
        inner: Arc<Mutex<FakeNotifierState>>,
    }

    impl FakeNotifier {
        pub fn new() -> Self {
            Self::default()
        }

        /// Make subsequent deliveries fail
        pub fn set_failing(&self, fail: bool) {
            self.inner.lock().fail = fail;
        }

        /// Batches that were delivered successfully
        pub fn delivered(&self) -> Vec<Batch> {
            self.inner.lock().delivered.clone()
        }

        /// Delivery attempts, including failed ones
        pub fn attempts(&self) -> usize {
            self.inner.lock().attempts
        }
    }

    #[async_trait]
    impl Notifier for FakeNotifier {
        async fn deliver(&self, batch: &Batch) -> Result<(), NotifyError> {
            let mut state = self.inner.lock();
            state.attempts += 1;
            if state.fail {
                return Err(NotifyError::SendFailed("fake failure".to_string()));
            }
            state.delivered.push(batch.clone());
            Ok(())
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeNotifier;

#[cfg(test)]
#[path = "notify_tests.rs"]
mod tests;
