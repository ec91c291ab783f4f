//! Scenario tests for the catalog query engine: pagination policy, filter
//! domain enforcement, and search sanitization as observed at the API
//! boundary.

use fenestra_api::query_types::{sanitize_search, total_pages, ListWindowsParams};
use fenestra_core::{Daytime, Panes};

#[test]
fn twenty_five_records_at_limit_twelve_is_three_pages() {
    // GET /api/windows?limit=12&page=1 over 25 stored records
    let query = ListWindowsParams {
        page: Some(1),
        limit: Some(12),
        ..Default::default()
    }
    .validate()
    .unwrap();

    assert_eq!(query.limit, 12);
    assert_eq!(query.request.offset, 0);
    assert_eq!(total_pages(25, query.limit), 3);
}

#[test]
fn page_beyond_total_pages_is_a_valid_query() {
    // Pages past the end return an empty list, not an error, so validation
    // must accept them.
    let query = ListWindowsParams {
        page: Some(9999),
        limit: Some(12),
        ..Default::default()
    }
    .validate()
    .unwrap();

    assert_eq!(query.request.offset, 9998 * 12);
}

#[test]
fn empty_catalog_still_reports_one_page() {
    assert_eq!(total_pages(0, 12), 1);
}

#[test]
fn out_of_range_pagination_is_rejected_not_clamped() {
    for params in [
        ListWindowsParams {
            page: Some(0),
            ..Default::default()
        },
        ListWindowsParams {
            limit: Some(0),
            ..Default::default()
        },
        ListWindowsParams {
            limit: Some(101),
            ..Default::default()
        },
    ] {
        assert!(params.validate().is_err());
    }
}

#[test]
fn stale_client_filters_do_not_narrow_results() {
    // A value outside the enumerated domain is dropped, never forwarded.
    let query = ListWindowsParams {
        daytime: Some("morning".to_string()),
        panes: Some("7".to_string()),
        ..Default::default()
    }
    .validate()
    .unwrap();

    assert_eq!(query.request.daytime, None);
    assert_eq!(query.request.panes, None);
}

#[test]
fn exact_domain_filters_are_forwarded() {
    let query = ListWindowsParams {
        daytime: Some("day".to_string()),
        panes: Some("3".to_string()),
        ..Default::default()
    }
    .validate()
    .unwrap();

    assert_eq!(query.request.daytime, Some(Daytime::Day));
    assert_eq!(query.request.panes, Some(Panes::Three));
}

#[test]
fn search_input_cannot_smuggle_pattern_syntax() {
    assert_eq!(
        sanitize_search("'; DROP TABLE windows; --"),
        Some("DROP TABLE windows --".to_string())
    );
    assert_eq!(sanitize_search("%%%"), None);
}
