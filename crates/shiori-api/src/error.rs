use thiserror::Error;

/// Errors from the catalog API client.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid URL: {0}")]
    Url(String),

    #[error("failed to {operation}: {status_text}")]
    Status {
        operation: &'static str,
        status: u16,
        status_text: String,
    },

    #[error("parse error: {0}")]
    Parse(String),
}

impl ApiError {
    /// HTTP status code reported by the gateway, if the failure carried one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
