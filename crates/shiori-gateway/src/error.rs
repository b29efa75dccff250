use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

/// Message used when the upstream could not be reached at all.
pub const FORWARD_FAILED: &str = "Failed to fetch from API";

/// Wire shape of every gateway error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub status_code: u16,
    pub status_message: String,
}

#[derive(Debug, thiserror::Error)]
#[error("{status}: {message}")]
pub struct GatewayError {
    pub status: StatusCode,
    pub message: String,
}

impl GatewayError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// The outbound request failed before any upstream status was seen.
    pub fn forwarding_failed() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, FORWARD_FAILED)
    }

    /// An upstream non-success response. Uses the upstream's own message
    /// when its body carries one.
    pub fn from_upstream(status: StatusCode, body: &[u8]) -> Self {
        let message = upstream_message(body).unwrap_or_else(|| {
            format!(
                "{} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Upstream Error")
            )
        });
        Self::new(status, message)
    }
}

/// `detail`, `message` or `statusMessage` from a JSON error body.
fn upstream_message(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    ["detail", "message", "statusMessage"]
        .iter()
        .find_map(|field| value.get(field)?.as_str())
        .filter(|message| !message.is_empty())
        .map(str::to_owned)
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            status_code: self.status.as_u16(),
            status_message: self.message,
        });
        (self.status, body).into_response()
    }
}
