//! # upload: conflict-safe upsert of one file into the destination repository
//!
//! The uploader is the only component that mutates anything. For each
//! [`FileTask`] it:
//!   1. downloads the source bytes (absent → `SourceUnavailable`, no retry)
//!   2. base64-encodes them for the contents API
//!   3. derives the destination path (see [`crate::model::destination_path`])
//!   4. looks up the destination's current `sha`, if any
//!   5. `PUT`s the file, retrying on 409 and transport errors with a doubling
//!      backoff and a freshly fetched `sha` after every conflict
//!
//! Any non-409 failure status is terminal. A conflict on the last attempt
//! yields `ConflictExhausted`, which is reported as a failure, never as success.
//!
//! The destination is not checked for unrelated content written by another
//! party between attempts: the freshest `sha` simply wins.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::api::ApiEndpoints;
use crate::config::{Destination, PipelineConfig};
use crate::contract::{HttpResponse, Transport, TransportError};
use crate::fetch::Fetcher;
use crate::model::{DestinationRecord, FileTask, UploadOutcome};

const STATUS_OK: u16 = 200;
const STATUS_CREATED: u16 = 201;
const STATUS_CONFLICT: u16 = 409;

/// Attempt budget and backoff schedule for writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
}

impl RetryPolicy {
    /// Delay slept after failed attempt `attempt` (1-based): `initial * 2^(attempt-1)`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        self.initial_backoff.saturating_mul(1u32 << exponent)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_secs(1),
        }
    }
}

impl From<&PipelineConfig> for RetryPolicy {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            initial_backoff: config.initial_backoff(),
        }
    }
}

/// Body of `PUT /repos/{owner}/{repo}/contents/{path}`.
#[derive(Debug, Clone, Serialize)]
pub struct WritePayload {
    pub message: String,
    pub content: String,
    pub branch: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
}

/// What happened to one file task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReport {
    pub destination_path: String,
    pub outcome: UploadOutcome,
    /// Write attempts made; zero when the source could not be read.
    pub attempts: u32,
    /// Backoff delays slept between attempts, in order.
    pub backoffs: Vec<Duration>,
}

pub struct Uploader<'a, T: ?Sized> {
    fetcher: Fetcher<'a, T>,
    endpoints: &'a ApiEndpoints,
    destination: &'a Destination,
    retry: RetryPolicy,
}

impl<'a, T> Uploader<'a, T>
where
    T: Transport + ?Sized,
{
    pub fn new(
        fetcher: Fetcher<'a, T>,
        endpoints: &'a ApiEndpoints,
        destination: &'a Destination,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            fetcher,
            endpoints,
            destination,
            retry,
        }
    }

    pub async fn upload(&self, task: &FileTask) -> UploadReport {
        let target_path = task.destination_path(&self.destination.root);
        let mut report = UploadReport {
            destination_path: target_path.clone(),
            outcome: UploadOutcome::SourceUnavailable,
            attempts: 0,
            backoffs: Vec::new(),
        };

        let Some(bytes) = self.fetcher.fetch_bytes(&task.download_url).await else {
            error!(
                repo = %task.source_repo,
                source_path = %task.source_path,
                url = %task.download_url,
                "Failed to download source file, skipping"
            );
            return report;
        };

        let existing = self.lookup(&target_path).await;
        info!(
            repo = %task.source_repo,
            path = %target_path,
            bytes = bytes.len(),
            mode = if existing.exists() { "update" } else { "create" },
            "Uploading file to destination"
        );
        let mut payload = WritePayload {
            message: format!("Add/update {target_path}"),
            content: BASE64.encode(&bytes),
            branch: self.destination.branch.clone(),
            sha: existing.version_token,
        };

        let put_url = self.endpoints.contents(
            &self.destination.owner,
            &self.destination.repo,
            &target_path,
            None,
        );
        let max_attempts = self.retry.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            report.attempts = attempt;
            let body = match serde_json::to_value(&payload) {
                Ok(body) => body,
                Err(e) => {
                    error!(path = %target_path, error = %e, "Failed to encode write payload");
                    report.outcome = UploadOutcome::PermanentlyFailed;
                    return report;
                }
            };
            let result = {
                let Ok(_permit) = self.fetcher.governor().acquire().await else {
                    error!(path = %target_path, "Governor closed, abandoning upload");
                    report.outcome = UploadOutcome::PermanentlyFailed;
                    return report;
                };
                self.write(&put_url, &body).await
            };

            match result {
                Ok(response) if response.status == STATUS_OK || response.status == STATUS_CREATED => {
                    report.outcome = if payload.sha.is_some() {
                        UploadOutcome::Updated
                    } else {
                        UploadOutcome::Created
                    };
                    info!(path = %target_path, status = response.status, attempt, outcome = %report.outcome, "Uploaded");
                    return report;
                }
                Ok(response) if response.status == STATUS_CONFLICT => {
                    warn!(
                        path = %target_path,
                        attempt,
                        max_attempts,
                        response = %response.text(),
                        "Conflict when uploading"
                    );
                    if attempt == max_attempts {
                        report.outcome = UploadOutcome::ConflictExhausted;
                        error!(path = %target_path, attempts = attempt, "Retries exhausted on repeated conflict");
                        return report;
                    }
                    let latest = self.lookup(&target_path).await;
                    if latest.exists() {
                        payload.sha = latest.version_token;
                    }
                }
                Ok(response) => {
                    report.outcome = UploadOutcome::PermanentlyFailed;
                    error!(path = %target_path, status = response.status, response = %response.text(), "Failed to upload");
                    return report;
                }
                Err(e) => {
                    error!(path = %target_path, attempt, error = %e, "Exception while uploading");
                    if attempt == max_attempts {
                        report.outcome = UploadOutcome::PermanentlyFailed;
                        return report;
                    }
                }
            }

            let delay = self.retry.backoff(attempt);
            debug!(path = %target_path, delay_ms = delay.as_millis() as u64, "Backing off before retry");
            tokio::time::sleep(delay).await;
            report.backoffs.push(delay);
        }

        report.outcome = UploadOutcome::PermanentlyFailed;
        report
    }

    /// Current version token of `path` on the destination branch. Any status
    /// other than 200, or a body without `sha`, means absent.
    pub async fn lookup(&self, path: &str) -> DestinationRecord {
        let url = self.endpoints.contents(
            &self.destination.owner,
            &self.destination.repo,
            path,
            Some(&self.destination.branch),
        );
        let Some(response) = self.fetcher.get(&url).await else {
            return DestinationRecord::absent();
        };
        if !response.is_ok() {
            debug!(path, status = response.status, "Destination file absent");
            return DestinationRecord::absent();
        }
        let version_token = serde_json::from_slice::<serde_json::Value>(&response.body)
            .ok()
            .and_then(|value| value.get("sha").and_then(|sha| sha.as_str()).map(String::from));
        DestinationRecord { version_token }
    }

    /// One write attempt. The caller holds the permit and drops it before any
    /// backoff.
    async fn write(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<HttpResponse, TransportError> {
        self.fetcher.transport().put_json(url, body).await
    }
}
