//! Catalog query parameter validation.
//!
//! The boundary between raw query strings and the repository: pagination is
//! range-checked (out-of-range values are rejected, not clamped), categorical
//! filters are matched against their closed domains (out-of-domain values are
//! silently dropped so stale client filter state never 400s or reaches SQL),
//! and the search term is reduced to word characters, whitespace, and hyphens
//! before any pattern is built from it.

use serde::Deserialize;

use fenestra_core::defaults::{PAGE_LIMIT, PAGE_LIMIT_MAX, SEARCH_MAX_CHARS};
use fenestra_core::{
    Covering, Daytime, ListWindowsRequest, Location, Material, OpenState, Panes, WindowKind,
};

/// Raw query parameters for `GET /api/windows`, exactly as the client sent
/// them.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListWindowsParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub daytime: Option<String>,
    pub location: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub material: Option<String>,
    pub panes: Option<String>,
    pub covering: Option<String>,
    pub open_state: Option<String>,
    pub is_duplicate: Option<bool>,
    pub search: Option<String>,
}

/// A validated listing query ready for the repository.
#[derive(Debug, Clone, PartialEq)]
pub struct ListWindowsQuery {
    pub request: ListWindowsRequest,
    pub page: i64,
    pub limit: i64,
}

impl ListWindowsParams {
    /// Validate pagination and translate filters into domain values.
    pub fn validate(self) -> Result<ListWindowsQuery, String> {
        let page = self.page.unwrap_or(1);
        if page < 1 {
            return Err("page must be >= 1".to_string());
        }

        let limit = self.limit.unwrap_or(PAGE_LIMIT);
        if !(1..=PAGE_LIMIT_MAX).contains(&limit) {
            return Err(format!("limit must be between 1 and {}", PAGE_LIMIT_MAX));
        }

        let offset = (page - 1)
            .checked_mul(limit)
            .ok_or_else(|| "page is out of range".to_string())?;

        let request = ListWindowsRequest {
            daytime: self.daytime.as_deref().and_then(Daytime::try_parse),
            location: self.location.as_deref().and_then(Location::try_parse),
            kind: self.kind.as_deref().and_then(WindowKind::try_parse),
            material: self.material.as_deref().and_then(Material::try_parse),
            panes: self.panes.as_deref().and_then(Panes::try_parse),
            covering: self.covering.as_deref().and_then(Covering::try_parse),
            open_state: self.open_state.as_deref().and_then(OpenState::try_parse),
            is_duplicate: self.is_duplicate,
            search: self.search.as_deref().and_then(sanitize_search),
            limit,
            offset,
        };

        Ok(ListWindowsQuery {
            request,
            page,
            limit,
        })
    }
}

/// Reduce a search term to word characters, whitespace, and hyphens, capped
/// at 100 characters. Returns `None` when nothing searchable remains.
pub fn sanitize_search(raw: &str) -> Option<String> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-' || c.is_whitespace())
        .take(SEARCH_MAX_CHARS)
        .collect();

    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Pagination law: `max(1, ceil(total / limit))`.
pub fn total_pages(total: i64, limit: i64) -> i64 {
    if total <= 0 {
        1
    } else {
        (total + limit - 1) / limit
    }
}
