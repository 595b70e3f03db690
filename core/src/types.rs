//! Domain types for the protocols.io API.
//!
//! # Design
//! Protocol, step and material records stay opaque `serde_json::Value`s:
//! the service's schemas are large and drift between API versions, and this
//! crate only routes them. Only the envelope pieces the client acts on
//! (filters, pagination metadata) get real types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Numeric identifier of a protocol.
pub type ProtocolId = u64;

/// Restricts a protocol listing to one visibility scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtocolFilter {
    Public,
    UserPublic,
    UserPrivate,
    SharedWithUser,
}

impl ProtocolFilter {
    pub const ALL: [ProtocolFilter; 4] = [
        ProtocolFilter::Public,
        ProtocolFilter::UserPublic,
        ProtocolFilter::UserPrivate,
        ProtocolFilter::SharedWithUser,
    ];

    /// Wire form used as the `filter` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProtocolFilter::Public => "public",
            ProtocolFilter::UserPublic => "user_public",
            ProtocolFilter::UserPrivate => "user_private",
            ProtocolFilter::SharedWithUser => "shared_with_user",
        }
    }
}

impl fmt::Display for ProtocolFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown protocol filter `{0}` (expected public, user_public, user_private or shared_with_user)")]
pub struct ParseFilterError(pub String);

impl FromStr for ProtocolFilter {
    type Err = ParseFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProtocolFilter::ALL
            .into_iter()
            .find(|filter| filter.as_str() == s)
            .ok_or_else(|| ParseFilterError(s.to_string()))
    }
}

/// Result-size metadata reported by a list endpoint on every page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub total_pages: u32,
    pub total_results: u64,
}

/// One page of a list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub items: Vec<Value>,
    pub pagination: Pagination,
}
