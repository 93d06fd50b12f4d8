//! Error types for the notification client
//!
//! Connection-level failures never surface here: they drive the socket
//! state machine instead. These errors cover configuration and the
//! request/response calls made on behalf of the user.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Error, Debug)]
pub enum ClientError {
    /// Request never produced a response
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a failure status or a `success: false` envelope
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Payload did not match the expected shape
    #[error("Failed to decode payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("No session credential available")]
    MissingCredential,

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Timed out: {0}")]
    Timeout(#[from] resilience::TimeoutError),

    #[error("Gave up after {retries} retries: {last}")]
    Retry { retries: u32, last: Box<ClientError> },
}

impl ClientError {
    /// Whether a retry could plausibly succeed.
    ///
    /// Server-side failures (5xx) and transport errors are transient; a
    /// rejected request or a missing credential is not.
    pub fn is_transient(&self) -> bool {
        match self {
            ClientError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            ClientError::Api { status, .. } => *status >= 500,
            ClientError::Timeout(_) => true,
            _ => false,
        }
    }
}

impl From<resilience::RetryError<ClientError>> for ClientError {
    fn from(err: resilience::RetryError<ClientError>) -> Self {
        match err {
            resilience::RetryError::MaxRetriesExceeded { retries, last } => ClientError::Retry {
                retries,
                last: Box::new(last),
            },
            resilience::RetryError::OperationFailed(e) => e,
        }
    }
}
