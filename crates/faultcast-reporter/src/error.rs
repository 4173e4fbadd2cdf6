//! Reporter error types
//!
//! `ReporterError` covers building a reporter; it is logged by
//! `reconfigure` and never reaches callers of `send`. `DeliveryError` only
//! ever reaches the unavailability hook.

use thiserror::Error;

/// Failure to build a reporter instance.
#[derive(Debug, Error)]
pub enum ReporterError {
    /// The sender's async runtime could not be built
    #[error("Failed to build report sender runtime: {0}")]
    Runtime(#[source] std::io::Error),

    /// The background sender thread could not be started
    #[error("Failed to start report sender thread: {0}")]
    SpawnWorker(#[source] std::io::Error),

    /// The HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),

    /// The endpoint host cannot be used as a submission base URL
    #[error("Endpoint host {host:?} is not usable: {reason}")]
    InvalidHost { host: String, reason: String },
}

/// Failure to hand a payload to the endpoint.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    /// The endpoint could not be reached
    #[error("Server unavailable: {0}")]
    Unavailable(String),

    /// The payload could not be encoded
    #[error("Failed to encode report: {0}")]
    Serialize(String),
}

impl DeliveryError {
    /// Whether the report is worth keeping for a later attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DeliveryError::Unavailable(_))
    }
}
