//! Completion reporter: fire-and-forget notification of finished surveys.
//!
//! The turn never waits on the network: `report()` spawns a task that POSTs
//! the summary and logs any failure.

use std::time::Duration;

use serde::Serialize;

use crate::error::ReportError;
use crate::survey::CompletionReport;

/// Fixed `message` field of every report body.
pub const REPORT_MESSAGE: &str = "Details for the question";

/// Receives completed-survey reports. Implementations must not block.
pub trait CompletionReporter: Send + Sync {
    fn report(&self, report: CompletionReport);
}

/// JSON body POSTed to the report endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ReportBody {
    pub message: String,
    pub details: String,
}

impl From<&CompletionReport> for ReportBody {
    fn from(report: &CompletionReport) -> Self {
        Self {
            message: REPORT_MESSAGE.to_string(),
            details: report.summary.clone(),
        }
    }
}

/// POSTs reports to a request-bin style HTTP endpoint.
pub struct HttpReporter {
    url: String,
    client: reqwest::Client,
}

impl HttpReporter {
    /// Build a reporter whose requests give up after `timeout`.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, ReportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ReportError::Client(e.to_string()))?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }

    /// Send one report and wait for the response status.
    pub async fn send(&self, report: &CompletionReport) -> Result<(), ReportError> {
        post_report(&self.client, &self.url, &ReportBody::from(report)).await
    }
}

async fn post_report(
    client: &reqwest::Client,
    url: &str,
    body: &ReportBody,
) -> Result<(), ReportError> {
    let resp = client
        .post(url)
        .json(body)
        .send()
        .await
        .map_err(|e| ReportError::RequestFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    if !resp.status().is_success() {
        return Err(ReportError::BadStatus {
            url: url.to_string(),
            status: resp.status().as_u16(),
        });
    }
    Ok(())
}

impl CompletionReporter for HttpReporter {
    fn report(&self, report: CompletionReport) {
        let client = self.client.clone();
        let url = self.url.clone();
        let body = ReportBody::from(&report);
        tokio::spawn(async move {
            match post_report(&client, &url, &body).await {
                Ok(()) => tracing::debug!(
                    questions = report.question_count,
                    "Completion report delivered"
                ),
                Err(e) => tracing::warn!(error = %e, "Failed to deliver completion report"),
            }
        });
    }
}

/// Used when no report URL is configured. Drops every report.
pub struct DisabledReporter;

impl CompletionReporter for DisabledReporter {
    fn report(&self, report: CompletionReport) {
        tracing::debug!(
            summary = %report.summary,
            "Completion reporting disabled; report dropped"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CompletionReport {
        CompletionReport {
            summary: "Answers were given for 2 questions".into(),
            question_count: 2,
        }
    }

    #[test]
    fn body_shape() {
        let body = ReportBody::from(&sample());
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "message": "Details for the question",
                "details": "Answers were given for 2 questions"
            })
        );
    }

    /// A localhost URL nothing is listening on.
    fn closed_url() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        format!("http://127.0.0.1:{port}/bin")
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_report_error() {
        let reporter = HttpReporter::new(closed_url(), Duration::from_millis(500)).unwrap();
        let err = reporter.send(&sample()).await.unwrap_err();
        assert!(matches!(err, ReportError::RequestFailed { .. }));
    }

    #[tokio::test]
    async fn report_does_not_block_or_panic_on_failure() {
        let reporter = HttpReporter::new(closed_url(), Duration::from_millis(500)).unwrap();
        // Returns immediately; the spawned task logs the failure.
        reporter.report(sample());
        DisabledReporter.report(sample());
    }
}
