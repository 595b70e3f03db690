//! Error types for the protocols.io client.
//!
//! # Design
//! Every variant carries a `context` string naming the call that failed
//! ("getting profile", "getting protocols p2/3"), so a printed error tells
//! the reader which request went wrong without a backtrace. HTTP failures
//! keep the raw body; application-level failures keep the decoded body.

use serde_json::Value;
use thiserror::Error;

/// Errors returned by `ProtocolsApi` parse methods and `ProtocolsClient`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced an HTTP response (DNS, refused, TLS, I/O).
    #[error("transport failure: {0}")]
    Transport(String),

    /// The server answered with a non-2xx status.
    #[error("error {context}: HTTP {status}: {body}")]
    HttpStatus {
        context: String,
        status: u16,
        body: String,
    },

    /// HTTP succeeded but the envelope's `status_code` was missing or non-zero.
    #[error("{context} returned error code {body}")]
    ApplicationStatus {
        context: String,
        status_code: Option<i64>,
        body: Value,
    },

    /// Items collected across all pages disagree with the reported total.
    #[error("{context}: expected {expected} items across all pages, got {actual}")]
    PaginationIntegrity {
        context: String,
        expected: u64,
        actual: u64,
    },

    /// The response body was not the JSON shape the endpoint promises.
    #[error("{context}: could not decode response: {message}")]
    Deserialization { context: String, message: String },

    /// A success envelope lacked the field holding the result.
    #[error("{context}: response has no `{field}` field")]
    MissingField {
        context: String,
        field: &'static str,
    },
}

impl ApiError {
    /// HTTP status carried by the error, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<ureq::Error> for ApiError {
    fn from(e: ureq::Error) -> Self {
        ApiError::Transport(e.to_string())
    }
}
