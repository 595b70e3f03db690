//! Executes `HttpRequest`s against the network.
//!
//! # Design
//! `Transport` is the seam between the pure build/parse layer and real I/O.
//! `UreqTransport` is the blocking implementation used in production; tests
//! substitute scripted transports.

use std::fmt;

use tracing::debug;

use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};

/// Performs one HTTP round-trip.
///
/// Implementations must hand back non-2xx responses as data rather than as
/// `Err`; `Err` is reserved for failures where no response arrived.
pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError>;
}

/// Blocking transport backed by a reusable `ureq::Agent`.
///
/// The agent keeps its connection pool for as long as the transport lives;
/// dropping the transport closes it.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UreqTransport").finish_non_exhaustive()
    }
}

impl UreqTransport {
    pub fn new() -> Self {
        // Status interpretation belongs to the parser, so 4xx/5xx must not
        // surface as ureq errors.
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!("GET {} {:?}", request.url, request.query);

        let mut builder = self.agent.get(request.url.as_str());
        for (key, value) in &request.query {
            builder = builder.query(key, value);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let mut response = builder.call()?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.body_mut().read_to_string()?;

        debug!("GET {} -> {status}", request.url);
        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
