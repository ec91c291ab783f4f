//! Core traits for fenestra abstractions.
//!
//! These traits define the interfaces that concrete implementations must
//! satisfy, enabling pluggable backends and testability.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;

/// Request for listing catalog records.
///
/// Filter fields carry already-validated domain values: `Some(Unknown)` is a
/// real filter (records whose field was never determined), `None` means the
/// field is not filtered at all.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListWindowsRequest {
    pub daytime: Option<Daytime>,
    pub location: Option<Location>,
    pub kind: Option<WindowKind>,
    pub material: Option<Material>,
    pub panes: Option<Panes>,
    pub covering: Option<Covering>,
    pub open_state: Option<OpenState>,
    pub is_duplicate: Option<bool>,
    /// Sanitized description search term (word chars, whitespace, hyphen).
    pub search: Option<String>,
    /// Maximum results.
    pub limit: i64,
    /// Pagination offset.
    pub offset: i64,
}

/// Response for listing catalog records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListWindowsResponse {
    pub windows: Vec<WindowRecord>,
    /// Total matching count across all pages.
    pub total: i64,
}

/// Repository for the append-only window catalog.
#[async_trait]
pub trait WindowRepository: Send + Sync {
    /// Insert a fully assembled record. Fails if the id already exists.
    async fn insert(&self, record: &WindowRecord) -> Result<()>;

    /// Fetch a record by id.
    async fn fetch(&self, id: Uuid) -> Result<Option<WindowRecord>>;

    /// Find the oldest record with the given content hash, if any.
    async fn find_by_hash(&self, content_hash: &str) -> Result<Option<WindowRecord>>;

    /// All records sharing `content_hash` except `exclude_id`, newest first.
    async fn find_duplicates(
        &self,
        content_hash: &str,
        exclude_id: Uuid,
    ) -> Result<Vec<WindowRecord>>;

    /// Filtered, paginated listing sorted by creation time descending.
    async fn list(&self, req: ListWindowsRequest) -> Result<ListWindowsResponse>;
}
