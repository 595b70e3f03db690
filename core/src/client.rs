//! Blocking protocols.io client.
//!
//! # Design
//! `ProtocolsClient` pairs the stateless `ProtocolsApi` with a `Transport`.
//! One client owns one transport (one connection pool) for its lifetime and
//! every operation reuses it. Requests are strictly sequential; the first
//! failure aborts the operation and nothing partial is returned.

use serde_json::Value;
use tracing::info;

use crate::api::ProtocolsApi;
use crate::error::ApiError;
use crate::pagination::{ListQuery, PageCollector};
use crate::transport::{Transport, UreqTransport};
use crate::types::{ProtocolFilter, ProtocolId};

/// Authenticated client for the protocols.io read endpoints.
#[derive(Debug, Clone)]
pub struct ProtocolsClient<T = UreqTransport> {
    api: ProtocolsApi,
    transport: T,
}

impl ProtocolsClient<UreqTransport> {
    /// Client for the production service.
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_transport(ProtocolsApi::new(token), UreqTransport::new())
    }

    pub fn with_base_url(token: impl Into<String>, base_url: &str) -> Self {
        Self::with_transport(
            ProtocolsApi::with_base_url(token, base_url),
            UreqTransport::new(),
        )
    }
}

impl<T: Transport> ProtocolsClient<T> {
    pub fn with_transport(api: ProtocolsApi, transport: T) -> Self {
        Self { api, transport }
    }

    pub fn api(&self) -> &ProtocolsApi {
        &self.api
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The authenticated user's profile (`user` field of the session profile).
    pub fn get_profile(&self) -> Result<Value, ApiError> {
        let response = self.transport.execute(&self.api.build_get_profile())?;
        self.api.parse_get_profile(response)
    }

    /// Every protocol matching `key` within `filter`, across all pages.
    pub fn list_protocols(&self, filter: ProtocolFilter, key: &str) -> Result<Vec<Value>, ApiError> {
        let query = self.api.protocols_query(filter, key);
        self.get_with_pagination(&query)
    }

    /// Steps of one protocol in JSON content format (`payload` field).
    pub fn get_protocol_steps(&self, protocol_id: ProtocolId) -> Result<Value, ApiError> {
        let response = self
            .transport
            .execute(&self.api.build_get_protocol_steps(protocol_id))?;
        self.api.parse_get_protocol_steps(protocol_id, response)
    }

    /// Materials of one protocol (`materials` field).
    pub fn get_protocol_materials(&self, protocol_id: ProtocolId) -> Result<Value, ApiError> {
        let response = self
            .transport
            .execute(&self.api.build_get_protocol_materials(protocol_id))?;
        self.api.parse_get_protocol_materials(protocol_id, response)
    }

    /// Fetch every page of `query` and concatenate the items.
    ///
    /// Issues `max(total_pages, 1)` requests; see `pagination` for the page
    /// indexing this relies on.
    pub fn get_with_pagination(&self, query: &ListQuery) -> Result<Vec<Value>, ApiError> {
        let response = self.transport.execute(&self.api.build_page(query, None))?;
        let first = self.api.parse_page(response, &query.context())?;

        let mut collector = PageCollector::start(query, first);
        for page_id in collector.remaining_pages() {
            let context = collector.page_context(page_id);
            info!("{context}");
            let response = self
                .transport
                .execute(&self.api.build_page(query, Some(page_id)))?;
            let page = self.api.parse_page(response, &context)?;
            collector.push(page_id, page);
        }
        collector.finish()
    }
}
