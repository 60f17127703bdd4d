use thiserror::Error;

/// Why an exchange with the backend produced no usable reply.
///
/// A backend-reported `error` field is not one of these: it arrives in a
/// well-formed body and is surfaced through [`crate::protocol::QueryReply::Error`].
#[derive(Debug, Error)]
pub enum BackendError {
    /// Connecting, sending, or reading the body failed (including timeouts
    /// and a background task that never finished).
    #[error("transport failed: {0}")]
    Transport(String),

    /// The body was not JSON, or not the shape this variant expects.
    #[error("unexpected reply: {0}")]
    Decode(String),

    /// Non-success status with a body that could not be decoded.
    #[error("backend returned status {status}")]
    Status { status: u16, body: String },
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        BackendError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(err: serde_json::Error) -> Self {
        BackendError::Decode(err.to_string())
    }
}
