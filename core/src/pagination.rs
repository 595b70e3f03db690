//! Page accumulation for list endpoints.
//!
//! # Design
//! The service's page indexing is irregular: the documented contract is
//! 1-indexed, but a request without `page_id` answers with the first page
//! and `page_id=1` answers with the second. This module treats pages as
//! 0-indexed, uses the initial `page_id`-less fetch as page 0, and then asks
//! for `page_id = 1 .. total_pages`. Because that contract is observed rather
//! than documented, the collected item count is always checked against the
//! first page's `total_results`; a mismatch (indexing drift, or results
//! changing between requests) fails the whole listing.
//!
//! `PageCollector` does no I/O. `ProtocolsClient::get_with_pagination`
//! drives it.

use std::ops::Range;

use serde_json::Value;
use tracing::{info, warn};

use crate::error::ApiError;
use crate::types::{Page, Pagination};

/// Items requested per page.
pub const PAGE_SIZE: u32 = 20;

/// A list endpoint plus the caller's query parameters.
///
/// `label` names the listed resource in logs and error contexts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub path: String,
    pub params: Vec<(String, String)>,
    pub label: String,
}

impl ListQuery {
    pub fn new(path: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            params: Vec::new(),
            label: label.into(),
        }
    }

    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.push((key.into(), value.to_string()));
        self
    }

    /// Error context for the initial, metadata-discovering request.
    pub fn context(&self) -> String {
        format!("getting {}", self.label)
    }
}

/// Accumulates the pages of one listing and validates completeness.
#[derive(Debug)]
pub struct PageCollector {
    label: String,
    pagination: Pagination,
    items: Vec<Value>,
}

impl PageCollector {
    /// Seed the collector with the initial page, which doubles as page 0.
    pub fn start(query: &ListQuery, first: Page) -> Self {
        let pagination = first.pagination;
        info!(
            "Getting {} has {} pages, {} items",
            query.label, pagination.total_pages, pagination.total_results
        );
        Self {
            label: query.label.clone(),
            pagination,
            items: first.items,
        }
    }

    /// `page_id`s still to fetch after the initial page.
    pub fn remaining_pages(&self) -> Range<u32> {
        1..self.pagination.total_pages
    }

    /// Error context naming one page, displayed 1-based: `getting protocols p2/3`.
    pub fn page_context(&self, page_id: u32) -> String {
        format!(
            "getting {} p{}/{}",
            self.label,
            page_id + 1,
            self.pagination.total_pages
        )
    }

    pub fn push(&mut self, page_id: u32, page: Page) {
        if page.pagination.total_results != self.pagination.total_results {
            warn!(
                "{} reports {} items, first page reported {}",
                self.page_context(page_id),
                page.pagination.total_results,
                self.pagination.total_results
            );
        }
        self.items.extend(page.items);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Hand back every item in arrival order, or fail if the count disagrees
    /// with the first page's `total_results`.
    pub fn finish(self) -> Result<Vec<Value>, ApiError> {
        let actual = self.items.len() as u64;
        if actual != self.pagination.total_results {
            return Err(ApiError::PaginationIntegrity {
                context: format!("getting {}", self.label),
                expected: self.pagination.total_results,
                actual,
            });
        }
        Ok(self.items)
    }
}
