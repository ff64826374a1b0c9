//! Errors raised while talking to the consent platform backend.

/// API-level errors. Every variant renders as a message fit to show a user.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    #[error("Cannot reach the server at {0}")]
    Connection(String),
    #[error("Request timed out after {0}s")]
    Timeout(u64),
    /// Non-2xx response. `message` is the server's own text when it sent one.
    #[error("{message}")]
    Status { status: u16, message: String },
    #[error("Unexpected response: {0}")]
    Decode(String),
    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),
    #[error("{0}")]
    Http(String),
}

impl ApiError {
    /// Build a status error from a response body.
    ///
    /// Uses the body's `error` or `message` string when it is JSON carrying
    /// one, otherwise a generic line naming the status code.
    pub fn from_status(status: u16, body: &str) -> Self {
        let server_message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|json| {
                ["error", "message"].iter().find_map(|key| {
                    json.get(key)
                        .and_then(|v| v.as_str())
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                })
            });

        ApiError::Status {
            status,
            message: server_message
                .unwrap_or_else(|| format!("Request failed with status code {status}")),
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Message for an error, or `fallback` when the error carries no text.
pub fn error_message(err: &ApiError, fallback: &str) -> String {
    let message = err.to_string();
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}
