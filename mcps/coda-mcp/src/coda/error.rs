//! Error types for Coda API calls

use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur when calling the Coda API
#[derive(Error, Debug)]
pub enum CodaError {
    /// The API answered with a non-success status
    #[error("Coda API returned {status}: {message}")]
    Status {
        /// HTTP status of the response
        status: StatusCode,
        /// The API's `message` field, or the raw body
        message: String,
    },

    /// The request did not complete within the configured timeout
    #[error("request to Coda timed out after {0:?}")]
    Timeout(Duration),

    /// Connection, TLS or body-read failure
    #[error("request to Coda failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body was not the expected JSON
    #[error("unexpected response from Coda: {0}")]
    Decode(#[from] serde_json::Error),

    /// The configured base URL cannot have path segments appended
    #[error("invalid Coda API base URL: {0}")]
    InvalidBaseUrl(String),
}

/// Result type alias for Coda operations
pub type CodaResult<T> = Result<T, CodaError>;
