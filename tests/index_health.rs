//! Index Health Tests
//!
//! Tests for the health checker:
//! - A freshly computed index reports all-clear
//! - Each discrepancy class lands in its own report field
//! - The secondary account-action-plan and reverse-destination
//!   indexes get their own typed reports

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chargerd::api::{AdminApi, ArgsComputeFilterIndexes, IndexHealthArgs};
use chargerd::filter::{Filter, FilterRule};
use chargerd::index::{
    account_action_plan_health, filter_index_health, reverse_destination_health,
    AccountActionPlanHealthReport, FilterHealthReport, HealthCheckLimits,
    ReverseDestinationHealthReport,
};
use chargerd::profile::{ActionPlan, Destination, ItemType, ThresholdProfile};
use chargerd::storage::{DataStore, IndexStore, NON_TRANSACTIONAL};

// =============================================================================
// Helper Functions
// =============================================================================

fn seeded_store() -> (Arc<DataStore>, AdminApi) {
    let store = Arc::new(DataStore::new());
    store
        .set_filter(Filter {
            tenant: "cgrates.org".to_string(),
            id: "FLTR_ACC".to_string(),
            rules: vec![FilterRule {
                rule_type: "*string".to_string(),
                element: "~*req.Account".to_string(),
                values: vec!["1001".to_string()],
            }],
            activation_interval: None,
        })
        .unwrap();
    store
        .set_threshold_profile(ThresholdProfile {
            tenant: "cgrates.org".to_string(),
            id: "TH1".to_string(),
            filter_ids: vec!["FLTR_ACC".to_string()],
            ..Default::default()
        })
        .unwrap();
    let admin = AdminApi::new(Arc::clone(&store));
    admin
        .compute_filter_indexes(&ArgsComputeFilterIndexes {
            tenant: "cgrates.org".to_string(),
            thresholds: true,
            ..Default::default()
        })
        .unwrap();
    (store, admin)
}

fn inject_forward_entry(store: &DataStore, key: &str, item_ids: &[&str]) {
    let mut delta = BTreeMap::new();
    delta.insert(
        key.to_string(),
        item_ids.iter().map(|id| id.to_string()).collect::<BTreeSet<_>>(),
    );
    store
        .set_indexes(
            ItemType::Thresholds.index_cache_id(),
            "cgrates.org",
            delta,
            false,
            NON_TRANSACTIONAL,
        )
        .unwrap();
}

// =============================================================================
// Filter Index Health Tests
// =============================================================================

/// Right after a successful compute every report field is empty.
#[test]
fn test_all_clear_after_compute() {
    let (store, _admin) = seeded_store();

    let report =
        filter_index_health(&store, ItemType::Thresholds, HealthCheckLimits::default()).unwrap();

    assert_eq!(report, FilterHealthReport::default());
    assert!(report.is_clean());
}

/// The admin endpoint wraps the same check.
#[test]
fn test_health_endpoint_all_clear() {
    let (_store, admin) = seeded_store();

    let report = admin
        .get_filter_indexes_health("*thresholds", &IndexHealthArgs::default())
        .unwrap();

    assert!(report.is_clean());
}

/// An index entry pointing at a vanished profile is a missing object.
#[test]
fn test_missing_object_detected() {
    let (store, _admin) = seeded_store();
    inject_forward_entry(&store, "*string:*req.Account:1001", &["GHOST", "TH1"]);

    let report =
        filter_index_health(&store, ItemType::Thresholds, HealthCheckLimits::default()).unwrap();

    assert_eq!(report.missing_objects, vec!["cgrates.org:GHOST".to_string()]);
    assert!(report.missing_indexes.is_empty());
}

/// A profile whose key is absent from storage is a missing index.
#[test]
fn test_missing_index_detected() {
    let (store, _admin) = seeded_store();
    store
        .remove_indexes(ItemType::Thresholds.index_cache_id(), "cgrates.org", None)
        .unwrap();

    let report =
        filter_index_health(&store, ItemType::Thresholds, HealthCheckLimits::default()).unwrap();

    assert_eq!(
        report.missing_indexes["cgrates.org:*string:*req.Account:1001"],
        vec!["cgrates.org:TH1".to_string()]
    );
    assert!(report.missing_objects.is_empty());
}

/// A stored key the profile no longer produces is a broken index.
#[test]
fn test_broken_index_detected() {
    let (store, _admin) = seeded_store();
    inject_forward_entry(&store, "*string:*req.Account:9999", &["TH1"]);

    let report =
        filter_index_health(&store, ItemType::Thresholds, HealthCheckLimits::default()).unwrap();

    assert_eq!(
        report.broken_indexes["cgrates.org:*string:*req.Account:9999"],
        vec!["cgrates.org:TH1".to_string()]
    );
}

/// A filter ID that stopped resolving is reported per referencing item.
#[test]
fn test_missing_filter_detected() {
    let (store, _admin) = seeded_store();
    store.remove_filter("cgrates.org", "FLTR_ACC").unwrap();

    let report =
        filter_index_health(&store, ItemType::Thresholds, HealthCheckLimits::default()).unwrap();

    assert_eq!(
        report.missing_filters["cgrates.org:FLTR_ACC"],
        vec!["cgrates.org:TH1".to_string()]
    );
}

/// Bounded caches produce the same verdict as unbounded ones.
#[test]
fn test_tight_cache_limits_do_not_change_verdict() {
    let (store, _admin) = seeded_store();

    let limits = HealthCheckLimits {
        index_cache_limit: 1,
        object_cache_limit: 1,
        filter_cache_limit: 1,
    };
    let report = filter_index_health(&store, ItemType::Thresholds, limits).unwrap();

    assert!(report.is_clean());
}

// =============================================================================
// Secondary Index Health Tests
// =============================================================================

/// A plan listing an account the reverse entry forgot is missing;
/// a reverse entry naming a dead plan is broken.
#[test]
fn test_account_action_plan_health() {
    let store = DataStore::new();
    store
        .set_action_plan(ActionPlan {
            id: "AP1".to_string(),
            account_ids: vec!["1001".to_string()],
            ..Default::default()
        })
        .unwrap();
    store
        .set_account_action_plans("1002", vec!["AP_GONE".to_string()])
        .unwrap();

    let report = account_action_plan_health(&store).unwrap();

    assert_eq!(report.missing_account_action_plans["1001"], vec!["AP1".to_string()]);
    assert_eq!(report.broken_references["1002"], vec!["AP_GONE".to_string()]);
}

/// A clean account-action-plan store reports all-empty.
#[test]
fn test_account_action_plan_all_clear() {
    let store = DataStore::new();
    store
        .set_action_plan(ActionPlan {
            id: "AP1".to_string(),
            account_ids: vec!["1001".to_string()],
            ..Default::default()
        })
        .unwrap();
    store
        .set_account_action_plans("1001", vec!["AP1".to_string()])
        .unwrap();

    let report = account_action_plan_health(&store).unwrap();

    assert_eq!(report, AccountActionPlanHealthReport::default());
}

/// The destination writer mirrors prefixes, so a fresh store is clean;
/// a manually broken reverse entry is reported.
#[test]
fn test_reverse_destination_health() {
    let store = DataStore::new();
    store
        .set_destination(Destination {
            id: "DST_1001".to_string(),
            prefixes: vec!["1001".to_string()],
        })
        .unwrap();

    let report = reverse_destination_health(&store).unwrap();
    assert_eq!(report, ReverseDestinationHealthReport::default());

    store
        .set_reverse_destination("2002", vec!["DST_GONE".to_string()])
        .unwrap();
    let report = reverse_destination_health(&store).unwrap();
    assert_eq!(report.broken_references["2002"], vec!["DST_GONE".to_string()]);
}

/// Dropping a reverse entry behind a destination's back is missing.
#[test]
fn test_reverse_destination_missing_mirror() {
    let store = DataStore::new();
    store
        .set_destination(Destination {
            id: "DST_1001".to_string(),
            prefixes: vec!["1001".to_string()],
        })
        .unwrap();
    store.set_reverse_destination("1001", Vec::new()).unwrap();

    let report = reverse_destination_health(&store).unwrap();

    assert_eq!(
        report.missing_reverse_destinations["DST_1001"],
        vec!["1001".to_string()]
    );
}
