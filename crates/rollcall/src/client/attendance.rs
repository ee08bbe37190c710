//! Attendance submission over HTTP.

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::capture::{AttendanceSink, AttendanceSubmission};
use crate::error::CaptureError;

#[derive(Debug, Serialize)]
struct AttendancePayload<'a> {
    image: String,
    code: &'a str,
}

#[derive(Debug, Deserialize)]
struct AttendanceReceipt {
    message: String,
}

/// Posts completed submissions to the attendance service.
///
/// The image travels as a base64 data URL inside the JSON payload, next to
/// the attendance code.
pub struct HttpAttendanceSink {
    http: reqwest::Client,
    base_url: String,
}

impl HttpAttendanceSink {
    /// Create a sink with a default HTTP client.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    /// Create a sink reusing an already configured HTTP client.
    pub fn with_client(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl AttendanceSink for HttpAttendanceSink {
    async fn submit(&self, submission: AttendanceSubmission) -> Result<String, CaptureError> {
        let url = format!("{}/attendance/update", self.base_url);
        let image = format!(
            "data:{};base64,{}",
            submission.image.mime_type,
            general_purpose::STANDARD.encode(&submission.image.data)
        );
        let payload = AttendancePayload {
            image,
            code: &submission.code,
        };

        debug!(%url, code = %submission.code, bytes = submission.image.data.len(), "posting attendance");

        let response = self
            .http
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| CaptureError::SubmissionFailed {
                reason: format!("request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CaptureError::SubmissionFailed {
                reason: format!("service answered {status}"),
            });
        }

        // The service answers either {"message": ...} or plain text
        let body = response
            .text()
            .await
            .map_err(|e| CaptureError::SubmissionFailed {
                reason: format!("unreadable response: {e}"),
            })?;

        let receipt = match serde_json::from_str::<AttendanceReceipt>(&body) {
            Ok(receipt) => receipt.message,
            Err(_) => body.trim().to_string(),
        };

        if receipt.is_empty() {
            Ok("attendance recorded".to_string())
        } else {
            Ok(receipt)
        }
    }
}
