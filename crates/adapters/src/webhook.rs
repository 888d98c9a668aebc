// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Webhook delivery of transition batches.
//!
//! Posts one JSON document per batch:
//!
//! ```text
//! { "text": "2 jobs started\n12 train (gpu), 4 GPUs\n...",
//!   "kind": "started",
//!   "observed_at_ms": 1760000000000,
//!   "jobs": [ { "id": "12", "name": "train", ... }, ... ] }
//! ```
//!
//! `text` makes the payload usable as-is with Slack-style incoming webhooks;
//! the structured fields are for anything else.

use crate::notify::{format_batch, Notifier, NotifyError};
use async_trait::async_trait;
use serde::Serialize;
use sm_core::{Batch, JobRecord, TransitionKind};
use std::time::Duration;

/// Default bound on a webhook request.
pub const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

/// Longest response body kept in a rejection error.
const BODY_EXCERPT: usize = 200;

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    text: String,
    kind: TransitionKind,
    observed_at_ms: u64,
    jobs: &'a [JobRecord],
}

impl<'a> WebhookPayload<'a> {
    fn new(batch: &'a Batch) -> Self {
        let (title, body) = format_batch(batch);
        Self {
            text: format!("{title}\n{body}"),
            kind: batch.kind,
            observed_at_ms: batch.observed_at_ms,
            jobs: &batch.jobs,
        }
    }
}

/// Posts batches to an HTTP endpoint
#[derive(Clone, Debug)]
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, url: url.into() })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn deliver(&self, batch: &Batch) -> Result<(), NotifyError> {
        let payload = WebhookPayload::new(batch);
        tracing::info!(kind = %batch.kind, jobs = batch.len(), "posting webhook notification");

        let response = self.client.post(&self.url).json(&payload).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body: body.chars().take(BODY_EXCERPT).collect(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "webhook_tests.rs"]
mod tests;
