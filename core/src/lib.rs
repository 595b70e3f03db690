//! Synchronous client core for the protocols.io REST API.
//!
//! # Overview
//! Authenticates with a bearer token and exposes the read endpoints for the
//! user profile, protocol listing, protocol steps and protocol materials.
//! Multi-page listings are fetched sequentially and concatenated.
//!
//! # Design
//! - `ProtocolsApi` is stateless: `build_*` produces an authorized
//!   `HttpRequest`, `parse_*` validates an `HttpResponse` (host-does-IO).
//! - `ProtocolsClient` pairs it with a `Transport` and drives multi-request
//!   operations; `UreqTransport` is the blocking default.
//! - Protocol records stay opaque `serde_json::Value`s.
//!
//! ```no_run
//! use protocols_core::{ProtocolFilter, ProtocolsClient};
//!
//! let client = ProtocolsClient::new("my-token");
//! let protocols = client.list_protocols(ProtocolFilter::Public, "plasmid")?;
//! println!("{} protocols", protocols.len());
//! # Ok::<(), protocols_core::ApiError>(())
//! ```

pub mod api;
pub mod auth;
pub mod client;
pub mod error;
pub mod http;
pub mod pagination;
pub mod transport;
pub mod types;

pub use api::{ProtocolsApi, DEFAULT_BASE_URL};
pub use auth::BearerAuth;
pub use client::ProtocolsClient;
pub use error::ApiError;
pub use http::{HttpRequest, HttpResponse};
pub use pagination::{ListQuery, PageCollector, PAGE_SIZE};
pub use transport::{Transport, UreqTransport};
pub use types::{Page, Pagination, ParseFilterError, ProtocolFilter, ProtocolId};
