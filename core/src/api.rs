//! Stateless request builder and response parser for the protocols.io API.
//!
//! # Design
//! `ProtocolsApi` holds only a base URL and the `BearerAuth`; it carries no
//! mutable state between calls. Each operation is split into a `build_*`
//! method that produces an authorized `HttpRequest` and a `parse_*` method
//! that consumes an `HttpResponse`. The caller (normally `ProtocolsClient`)
//! executes the round-trip in between.
//!
//! The service wraps single-object results in an envelope carrying a
//! `status_code` that must be 0 even when HTTP says 200. The listing
//! endpoint does not reliably send one, so pages are checked on HTTP status
//! alone.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::auth::BearerAuth;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::pagination::{ListQuery, PAGE_SIZE};
use crate::types::{Page, ProtocolFilter, ProtocolId};

/// Scheme and host of the production service. Endpoint paths carry their
/// own `/api/v3` or `/api/v4` prefix.
pub const DEFAULT_BASE_URL: &str = "https://www.protocols.io";

/// Synchronous, stateless request builder for the protocols.io API.
#[derive(Debug, Clone)]
pub struct ProtocolsApi {
    base_url: String,
    auth: BearerAuth,
}

impl ProtocolsApi {
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_base_url(token, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(token: impl Into<String>, base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            auth: BearerAuth::new(token),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get(&self, path: &str) -> HttpRequest {
        self.auth
            .apply(HttpRequest::get(format!("{}{path}", self.base_url)))
    }

    pub fn build_get_profile(&self) -> HttpRequest {
        self.get("/api/v3/session/profile")
    }

    pub fn parse_get_profile(&self, response: HttpResponse) -> Result<Value, ApiError> {
        parse_envelope(response, "getting profile", "user")
    }

    /// Listing of protocols matching `key` within `filter`'s scope.
    pub fn protocols_query(&self, filter: ProtocolFilter, key: &str) -> ListQuery {
        ListQuery::new("/api/v3/protocols", "protocols")
            .param("filter", filter)
            .param("key", key)
    }

    /// One page of `query`. `None` asks for the initial page, which also
    /// carries the pagination metadata.
    pub fn build_page(&self, query: &ListQuery, page_id: Option<u32>) -> HttpRequest {
        let mut request = self.get(&query.path);
        for (key, value) in &query.params {
            request = request.with_query(key.as_str(), value);
        }
        request = request.with_query("page_size", PAGE_SIZE);
        if let Some(page_id) = page_id {
            request = request.with_query("page_id", page_id);
        }
        request
    }

    pub fn parse_page(&self, response: HttpResponse, context: &str) -> Result<Page, ApiError> {
        check_status(&response, context)?;
        decode(&response, context)
    }

    pub fn build_get_protocol_steps(&self, protocol_id: ProtocolId) -> HttpRequest {
        self.get(&format!("/api/v4/protocols/{protocol_id}/steps"))
            .with_query("content_format", "json")
    }

    pub fn parse_get_protocol_steps(
        &self,
        protocol_id: ProtocolId,
        response: HttpResponse,
    ) -> Result<Value, ApiError> {
        let context = format!("getting protocol {protocol_id} steps");
        parse_envelope(response, &context, "payload")
    }

    pub fn build_get_protocol_materials(&self, protocol_id: ProtocolId) -> HttpRequest {
        self.get(&format!("/api/v3/protocols/{protocol_id}/materials"))
    }

    pub fn parse_get_protocol_materials(
        &self,
        protocol_id: ProtocolId,
        response: HttpResponse,
    ) -> Result<Value, ApiError> {
        let context = format!("getting protocol {protocol_id} materials");
        parse_envelope(response, &context, "materials")
    }
}

/// Map a non-2xx status to `ApiError::HttpStatus`, keeping the raw body.
fn check_status(response: &HttpResponse, context: &str) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    Err(ApiError::HttpStatus {
        context: context.to_string(),
        status: response.status,
        body: response.body.clone(),
    })
}

fn decode<T: DeserializeOwned>(response: &HttpResponse, context: &str) -> Result<T, ApiError> {
    serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization {
        context: context.to_string(),
        message: e.to_string(),
    })
}

/// Validate a single-object envelope and pull out `field`.
fn parse_envelope(
    response: HttpResponse,
    context: &str,
    field: &'static str,
) -> Result<Value, ApiError> {
    check_status(&response, context)?;
    let mut body: Value = decode(&response, context)?;

    let status_code = body.get("status_code").and_then(Value::as_i64);
    if status_code != Some(0) {
        return Err(ApiError::ApplicationStatus {
            context: context.to_string(),
            status_code,
            body,
        });
    }

    body.get_mut(field)
        .map(Value::take)
        .ok_or_else(|| ApiError::MissingField {
            context: context.to_string(),
            field,
        })
}
