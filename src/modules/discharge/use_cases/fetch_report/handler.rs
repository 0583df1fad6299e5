use crate::modules::discharge::core::report::DashboardResponse;
use crate::modules::discharge::use_cases::fetch_report::report_port::ReportSource;
use crate::shared::infrastructure::upstream::UpstreamError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::NaiveDate;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchReportError {
    #[error(transparent)]
    Unavailable(UpstreamError),

    #[error("Failed to fetch data after {attempts} attempts: {source}")]
    Exhausted {
        attempts: u32,
        #[source]
        source: UpstreamError,
    },
}

impl IntoResponse for FetchReportError {
    fn into_response(self) -> Response {
        match self {
            FetchReportError::Unavailable(err) => err.into_response(),
            exhausted @ FetchReportError::Exhausted { .. } => (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "status": "error", "message": exhausted.to_string() })),
            )
                .into_response(),
        }
    }
}

/// Sequential retry with a linear backoff: the n-th retry waits
/// `n * backoff_unit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff_unit: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff_unit: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff_unit,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1))
    }
}

pub struct FetchReportHandler {
    source: Arc<dyn ReportSource>,
    policy: RetryPolicy,
}

impl FetchReportHandler {
    pub fn new(source: Arc<dyn ReportSource>, policy: RetryPolicy) -> Self {
        Self { source, policy }
    }

    pub async fn handle(
        &self,
        workflow_name: &str,
        date: NaiveDate,
    ) -> Result<DashboardResponse, FetchReportError> {
        let mut attempt = 1;
        loop {
            match self.source.fetch(workflow_name, date).await {
                Ok(report) => {
                    tracing::debug!(workflow_name, %date, attempt, "report fetched");
                    return Ok(report);
                }
                Err(err) if !err.is_retryable() => {
                    tracing::error!(workflow_name, error = %err, "report fetch not attempted");
                    return Err(FetchReportError::Unavailable(err));
                }
                Err(err) if attempt >= self.policy.max_attempts => {
                    tracing::error!(
                        workflow_name,
                        %date,
                        attempt,
                        error = %err,
                        "report fetch failed, giving up"
                    );
                    return Err(FetchReportError::Exhausted {
                        attempts: attempt,
                        source: err,
                    });
                }
                Err(err) => {
                    tracing::warn!(
                        workflow_name,
                        %date,
                        attempt,
                        max_attempts = self.policy.max_attempts,
                        error = %err,
                        "report fetch failed, retrying"
                    );
                    tokio::time::sleep(self.policy.backoff_unit * attempt).await;
                    attempt += 1;
                }
            }
        }
    }
}
