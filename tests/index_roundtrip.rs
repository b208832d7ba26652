//! Index Round-Trip Tests
//!
//! Tests for index invariants:
//! - Computed indexes match the profiles' filter rules exactly
//! - Recompute is idempotent
//! - Removing one profile never disturbs entries shared with another

use std::sync::Arc;

use chargerd::api::{
    AdminApi, ArgsComputeFilterIndexes, AttrGetFilterIndexes, AttrRemFilterIndexes,
};
use chargerd::filter::{Filter, FilterRule};
use chargerd::index::{remove_item_indexes, set_item_indexes, IndexError, Paginator};
use chargerd::profile::{AttributeProfile, ItemType, ThresholdProfile};
use chargerd::storage::{DataStore, IndexStore};

// =============================================================================
// Helper Functions
// =============================================================================

fn account_filter(id: &str, account: &str) -> Filter {
    Filter {
        tenant: "cgrates.org".to_string(),
        id: id.to_string(),
        rules: vec![FilterRule {
            rule_type: "*string".to_string(),
            element: "~*req.Account".to_string(),
            values: vec![account.to_string()],
        }],
        activation_interval: None,
    }
}

fn threshold(id: &str, filter_ids: &[&str]) -> ThresholdProfile {
    ThresholdProfile {
        tenant: "cgrates.org".to_string(),
        id: id.to_string(),
        filter_ids: filter_ids.iter().map(|f| f.to_string()).collect(),
        ..Default::default()
    }
}

fn setup() -> (Arc<DataStore>, AdminApi) {
    let store = Arc::new(DataStore::new());
    let admin = AdminApi::new(Arc::clone(&store));
    (store, admin)
}

fn compute_thresholds(admin: &AdminApi) {
    admin
        .compute_filter_indexes(&ArgsComputeFilterIndexes {
            tenant: "cgrates.org".to_string(),
            thresholds: true,
            ..Default::default()
        })
        .unwrap();
}

fn query_thresholds(admin: &AdminApi, filter_type: Option<&str>) -> Result<Vec<String>, IndexError> {
    query_thresholds_narrowed(admin, filter_type, None, None, Paginator::default())
}

fn query_thresholds_narrowed(
    admin: &AdminApi,
    filter_type: Option<&str>,
    filter_field: Option<&str>,
    filter_value: Option<&str>,
    paginator: Paginator,
) -> Result<Vec<String>, IndexError> {
    admin.get_filter_indexes(&AttrGetFilterIndexes {
        tenant: "cgrates.org".to_string(),
        item_type: "*thresholds".to_string(),
        filter_type: filter_type.map(str::to_string),
        filter_field: filter_field.map(str::to_string),
        filter_value: filter_value.map(str::to_string),
        paginator,
        ..Default::default()
    })
}

/// Three entries across two rule types and two fields, for narrowing
fn narrowing_fixture() -> (Arc<DataStore>, AdminApi) {
    let (store, admin) = setup();
    store.set_filter(account_filter("FLTR_ACC", "1001")).unwrap();
    store
        .set_filter(Filter {
            tenant: "cgrates.org".to_string(),
            id: "FLTR_SUBJ".to_string(),
            rules: vec![FilterRule {
                rule_type: "*string".to_string(),
                element: "~*req.Subject".to_string(),
                values: vec!["1001".to_string()],
            }],
            activation_interval: None,
        })
        .unwrap();
    store
        .set_threshold_profile(threshold("TH_A", &["FLTR_ACC", "FLTR_SUBJ"]))
        .unwrap();
    store
        .set_threshold_profile(threshold("TH_B", &["*prefix:~*req.Destination:+49"]))
        .unwrap();
    compute_thresholds(&admin);
    (store, admin)
}

// =============================================================================
// Round-Trip Tests
// =============================================================================

/// A single profile with one string rule yields exactly one entry.
#[test]
fn test_round_trip_single_profile() {
    let (store, admin) = setup();
    store.set_filter(account_filter("FLTR_ACC", "1001")).unwrap();
    store
        .set_threshold_profile(threshold("TEST_PROFILE1", &["FLTR_ACC"]))
        .unwrap();

    compute_thresholds(&admin);

    let entries = query_thresholds(&admin, Some("*string")).unwrap();
    assert_eq!(entries, vec!["*string:*req.Account:1001:TEST_PROFILE1".to_string()]);
}

/// An empty filter list produces the sentinel entry.
#[test]
fn test_empty_filter_list_yields_sentinel() {
    let (store, admin) = setup();
    store
        .set_threshold_profile(threshold("TH_NO_FLTR", &[]))
        .unwrap();

    compute_thresholds(&admin);

    let entries = query_thresholds(&admin, None).unwrap();
    assert_eq!(entries, vec!["*none:*any:*any:TH_NO_FLTR".to_string()]);
}

/// Inline filter IDs are parsed instead of resolved from storage.
#[test]
fn test_inline_filter_is_indexed() {
    let (store, admin) = setup();
    store
        .set_threshold_profile(threshold("TH_INLINE", &["*string:~*req.Account:1010"]))
        .unwrap();

    compute_thresholds(&admin);

    let entries = query_thresholds(&admin, None).unwrap();
    assert_eq!(entries, vec!["*string:*req.Account:1010:TH_INLINE".to_string()]);
}

/// Recomputing an unchanged profile set leaves the bucket identical.
#[test]
fn test_recompute_is_idempotent() {
    let (store, admin) = setup();
    store.set_filter(account_filter("FLTR_ACC", "1001")).unwrap();
    store
        .set_threshold_profile(threshold("TEST_PROFILE1", &["FLTR_ACC"]))
        .unwrap();
    store
        .set_threshold_profile(threshold("TEST_PROFILE2", &["FLTR_ACC"]))
        .unwrap();

    compute_thresholds(&admin);
    let first = store
        .get_indexes(
            ItemType::Thresholds.index_cache_id(),
            "cgrates.org",
            None,
            true,
            true,
        )
        .unwrap();
    compute_thresholds(&admin);
    let second = store
        .get_indexes(
            ItemType::Thresholds.index_cache_id(),
            "cgrates.org",
            None,
            true,
            true,
        )
        .unwrap();

    assert_eq!(first, second);
}

/// A referenced filter that does not resolve aborts the computation.
#[test]
fn test_broken_filter_reference_aborts() {
    let (store, admin) = setup();
    store
        .set_threshold_profile(threshold("TH_BROKEN", &["FLTR_MISSING"]))
        .unwrap();

    let err = admin
        .compute_filter_indexes(&ArgsComputeFilterIndexes {
            tenant: "cgrates.org".to_string(),
            thresholds: true,
            ..Default::default()
        })
        .unwrap_err();

    assert!(matches!(err, IndexError::BrokenReference { .. }));
    assert!(err.to_string().contains("FLTR_MISSING"));
}

// =============================================================================
// Shared-Entry Isolation Tests
// =============================================================================

/// Two profiles sharing one filter value both appear under its key.
#[test]
fn test_shared_value_lists_both_profiles() {
    let (store, admin) = setup();
    store.set_filter(account_filter("FLTR_ACC", "1001")).unwrap();
    store
        .set_threshold_profile(threshold("TEST_PROFILE1", &["FLTR_ACC"]))
        .unwrap();
    store
        .set_threshold_profile(threshold("TEST_PROFILE2", &["FLTR_ACC"]))
        .unwrap();

    compute_thresholds(&admin);

    let entries = query_thresholds(&admin, Some("*string")).unwrap();
    assert_eq!(
        entries,
        vec![
            "*string:*req.Account:1001:TEST_PROFILE1".to_string(),
            "*string:*req.Account:1001:TEST_PROFILE2".to_string(),
        ]
    );
}

/// Removing one profile leaves entries shared with the other intact.
#[test]
fn test_deletion_isolation() {
    let (store, admin) = setup();
    store.set_filter(account_filter("FLTR_ACC", "1001")).unwrap();
    store
        .set_threshold_profile(threshold("TEST_PROFILE1", &["FLTR_ACC"]))
        .unwrap();
    store
        .set_threshold_profile(threshold("TEST_PROFILE2", &["FLTR_ACC"]))
        .unwrap();
    compute_thresholds(&admin);

    store
        .remove_threshold_profile("cgrates.org", "TEST_PROFILE2")
        .unwrap();
    remove_item_indexes(
        store.as_ref(),
        ItemType::Thresholds,
        "cgrates.org",
        None,
        "TEST_PROFILE2",
    )
    .unwrap();

    let entries = query_thresholds(&admin, Some("*string")).unwrap();
    assert_eq!(entries, vec!["*string:*req.Account:1001:TEST_PROFILE1".to_string()]);
}

/// Removing the only profile empties the bucket; queries turn not-found.
#[test]
fn test_remove_last_profile_yields_not_found() {
    let (store, admin) = setup();
    store.set_filter(account_filter("FLTR_ACC", "1001")).unwrap();
    store
        .set_threshold_profile(threshold("TEST_PROFILE1", &["FLTR_ACC"]))
        .unwrap();
    compute_thresholds(&admin);

    store
        .remove_threshold_profile("cgrates.org", "TEST_PROFILE1")
        .unwrap();
    remove_item_indexes(
        store.as_ref(),
        ItemType::Thresholds,
        "cgrates.org",
        None,
        "TEST_PROFILE1",
    )
    .unwrap();

    let err = query_thresholds(&admin, Some("*string")).unwrap_err();
    assert!(err.is_not_found());
}

/// Re-indexing a changed profile applies only its own delta.
#[test]
fn test_incremental_update_applies_delta() {
    let (store, admin) = setup();
    store.set_filter(account_filter("FLTR_ACC", "1001")).unwrap();
    store.set_filter(account_filter("FLTR_NEW", "2002")).unwrap();
    store
        .set_threshold_profile(threshold("TEST_PROFILE1", &["FLTR_ACC"]))
        .unwrap();
    store
        .set_threshold_profile(threshold("TEST_PROFILE2", &["FLTR_ACC"]))
        .unwrap();
    compute_thresholds(&admin);

    store
        .set_threshold_profile(threshold("TEST_PROFILE1", &["FLTR_NEW"]))
        .unwrap();
    set_item_indexes(
        store.as_ref(),
        ItemType::Thresholds,
        "cgrates.org",
        None,
        "TEST_PROFILE1",
        &["FLTR_NEW".to_string()],
    )
    .unwrap();

    let entries = query_thresholds(&admin, Some("*string")).unwrap();
    assert_eq!(
        entries,
        vec![
            "*string:*req.Account:1001:TEST_PROFILE2".to_string(),
            "*string:*req.Account:2002:TEST_PROFILE1".to_string(),
        ]
    );
}

// =============================================================================
// Narrowing and Pagination Tests
// =============================================================================

/// Adding a field needle to a type-narrowed query yields a strict
/// subset whose decoded fields all contain the needle.
#[test]
fn test_field_narrowing_composes() {
    let (_store, admin) = narrowing_fixture();

    let by_type =
        query_thresholds_narrowed(&admin, Some("*string"), None, None, Paginator::default())
            .unwrap();
    assert_eq!(by_type.len(), 2);

    let by_field = query_thresholds_narrowed(
        &admin,
        Some("*string"),
        Some("Account"),
        None,
        Paginator::default(),
    )
    .unwrap();
    assert_eq!(by_field, vec!["*string:*req.Account:1001:TH_A".to_string()]);
    assert!(by_field.len() < by_type.len());
    assert!(by_field.iter().all(|entry| by_type.contains(entry)));
}

/// A field stage that empties the narrowed set is not-found, even
/// though the field matches entries of another rule type.
#[test]
fn test_field_narrowing_empty_stage_is_not_found() {
    let (_store, admin) = narrowing_fixture();

    let err = query_thresholds_narrowed(
        &admin,
        Some("*string"),
        Some("Destination"),
        None,
        Paginator::default(),
    )
    .unwrap_err();
    assert!(err.is_not_found());
}

/// Value narrowing works with no preceding stage and respects the
/// not-found-on-empty rule.
#[test]
fn test_value_narrowing() {
    let (_store, admin) = narrowing_fixture();

    let entries =
        query_thresholds_narrowed(&admin, None, None, Some("+49"), Paginator::default()).unwrap();
    assert_eq!(entries, vec!["*prefix:*req.Destination:+49:TH_B".to_string()]);

    let err = query_thresholds_narrowed(&admin, None, None, Some("+40"), Paginator::default())
        .unwrap_err();
    assert!(err.is_not_found());
}

/// Limit and offset window the sorted entry list after narrowing.
#[test]
fn test_pagination_windows_sorted_entries() {
    let (_store, admin) = narrowing_fixture();

    let all = query_thresholds(&admin, None).unwrap();
    assert_eq!(
        all,
        vec![
            "*prefix:*req.Destination:+49:TH_B".to_string(),
            "*string:*req.Account:1001:TH_A".to_string(),
            "*string:*req.Subject:1001:TH_A".to_string(),
        ]
    );

    let first_two = query_thresholds_narrowed(
        &admin,
        None,
        None,
        None,
        Paginator {
            limit: Some(2),
            offset: None,
        },
    )
    .unwrap();
    assert_eq!(first_two, all[..2].to_vec());

    let middle = query_thresholds_narrowed(
        &admin,
        None,
        None,
        None,
        Paginator {
            limit: Some(1),
            offset: Some(1),
        },
    )
    .unwrap();
    assert_eq!(middle, vec!["*string:*req.Account:1001:TH_A".to_string()]);
}

// =============================================================================
// Request Validation Tests
// =============================================================================

/// Context-scoped kinds cannot be queried without a context.
#[test]
fn test_attribute_query_without_context_is_rejected() {
    let (_store, admin) = setup();

    let err = admin
        .get_filter_indexes(&AttrGetFilterIndexes {
            tenant: "cgrates.org".to_string(),
            item_type: "*attributes".to_string(),
            ..Default::default()
        })
        .unwrap_err();

    assert!(matches!(err, IndexError::MandatoryIeMissing(_)));
    assert_eq!(err.to_string(), "MANDATORY_IE_MISSING: [Context]");
}

/// The removal endpoint enforces the same context requirement.
#[test]
fn test_dispatcher_removal_without_context_is_rejected() {
    let (_store, admin) = setup();

    let err = admin
        .remove_filter_indexes(&AttrRemFilterIndexes {
            tenant: "cgrates.org".to_string(),
            item_type: "*dispatchers".to_string(),
            ..Default::default()
        })
        .unwrap_err();

    assert_eq!(err.to_string(), "MANDATORY_IE_MISSING: [Context]");
}

// =============================================================================
// Context-Scoped Bucket Tests
// =============================================================================

/// An attribute profile with no filters gets one sentinel per context.
#[test]
fn test_attribute_sentinel_per_context() {
    let (store, admin) = setup();
    store
        .set_attribute_profile(AttributeProfile {
            tenant: "cgrates.org".to_string(),
            id: "ATTR_NO_FLTR".to_string(),
            contexts: vec!["*sessions".to_string(), "*cdrs".to_string()],
            ..Default::default()
        })
        .unwrap();

    for context in ["*sessions", "*cdrs"] {
        admin
            .compute_filter_indexes(&ArgsComputeFilterIndexes {
                tenant: "cgrates.org".to_string(),
                context: Some(context.to_string()),
                attributes: true,
                ..Default::default()
            })
            .unwrap();
    }

    for context in ["*sessions", "*cdrs"] {
        let entries = admin
            .get_filter_indexes(&AttrGetFilterIndexes {
                tenant: "cgrates.org".to_string(),
                context: Some(context.to_string()),
                item_type: "*attributes".to_string(),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(entries, vec!["*none:*any:*any:ATTR_NO_FLTR".to_string()]);
    }
}

/// A profile outside the computed context is skipped entirely.
#[test]
fn test_attribute_outside_context_not_indexed() {
    let (store, admin) = setup();
    store
        .set_attribute_profile(AttributeProfile {
            tenant: "cgrates.org".to_string(),
            id: "ATTR_SESSIONS".to_string(),
            contexts: vec!["*sessions".to_string()],
            ..Default::default()
        })
        .unwrap();

    admin
        .compute_filter_indexes(&ArgsComputeFilterIndexes {
            tenant: "cgrates.org".to_string(),
            context: Some("*cdrs".to_string()),
            attributes: true,
            ..Default::default()
        })
        .unwrap();

    let err = admin
        .get_filter_indexes(&AttrGetFilterIndexes {
            tenant: "cgrates.org".to_string(),
            context: Some("*cdrs".to_string()),
            item_type: "*attributes".to_string(),
            ..Default::default()
        })
        .unwrap_err();
    assert!(err.is_not_found());
}
