//! Index health checker.
//!
//! Cross-references stored indexes against the profiles they were
//! derived from and reports every discrepancy. Discrepancies are data,
//! not errors; a clean store yields a report with every field empty.

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::filter::{is_inline_filter, Filter};
use crate::profile::{scope_key, ItemType};
use crate::storage::{DataStore, IndexStore, ProfileStore, StorageError};

use super::codec::{keys_for_rules, sentinel_key};
use super::errors::IndexResult;

/// Maximum entries held by each scan cache; negative is unbounded,
/// zero disables caching
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HealthCheckLimits {
    #[serde(rename = "IndexCacheLimit")]
    pub index_cache_limit: i64,
    #[serde(rename = "ObjectCacheLimit")]
    pub object_cache_limit: i64,
    #[serde(rename = "FilterCacheLimit")]
    pub filter_cache_limit: i64,
}

impl Default for HealthCheckLimits {
    fn default() -> Self {
        Self {
            index_cache_limit: -1,
            object_cache_limit: -1,
            filter_cache_limit: -1,
        }
    }
}

/// FIFO-bounded lookup cache used while streaming large stores
struct BoundedCache<K, V> {
    limit: i64,
    entries: HashMap<K, V>,
    order: VecDeque<K>,
}

impl<K: Eq + Hash + Clone, V> BoundedCache<K, V> {
    fn new(limit: i64) -> Self {
        Self {
            limit,
            entries: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    fn put(&mut self, key: K, value: V) {
        if self.limit == 0 {
            return;
        }
        if self.limit > 0 && self.entries.len() as i64 >= self.limit {
            if let Some(evicted) = self.order.pop_front() {
                self.entries.remove(&evicted);
            }
        }
        if self.entries.insert(key.clone(), value).is_none() {
            self.order.push_back(key);
        }
    }
}

/// Discrepancy report for one item type's filter indexes.
///
/// Keys of the map fields are `tenant[:context]:indexKey` for index
/// discrepancies and `tenant:filterID` for filter ones; values are the
/// affected item IDs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterHealthReport {
    #[serde(rename = "MissingObjects")]
    pub missing_objects: Vec<String>,
    #[serde(rename = "MissingIndexes")]
    pub missing_indexes: BTreeMap<String, Vec<String>>,
    #[serde(rename = "BrokenIndexes")]
    pub broken_indexes: BTreeMap<String, Vec<String>>,
    #[serde(rename = "MissingFilters")]
    pub missing_filters: BTreeMap<String, Vec<String>>,
}

impl FilterHealthReport {
    pub fn is_clean(&self) -> bool {
        self == &Self::default()
    }
}

/// Expected keys of one item, tolerating unresolvable filters.
///
/// Missing filters are collected instead of aborting; the item still
/// gets the keys its resolvable filters produce.
fn expected_keys_lenient(
    store: &DataStore,
    tenant: &str,
    item_key: &str,
    filter_ids: &[String],
    filter_cache: &mut BoundedCache<String, Option<Filter>>,
    missing_filters: &mut BTreeMap<String, Vec<String>>,
) -> IndexResult<BTreeSet<String>> {
    if filter_ids.is_empty() {
        let mut keys = BTreeSet::new();
        keys.insert(sentinel_key());
        return Ok(keys);
    }
    let mut keys = BTreeSet::new();
    for filter_id in filter_ids {
        let cache_key = format!("{tenant}:{filter_id}");
        let cached = match filter_cache.get(&cache_key) {
            Some(entry) => entry.clone(),
            None => {
                let resolved = if is_inline_filter(filter_id) {
                    Some(Filter::from_inline(tenant, filter_id)?)
                } else {
                    match store.get_filter(tenant, filter_id) {
                        Ok(filter) => Some(filter),
                        Err(StorageError::NotFound) => None,
                        Err(err) => return Err(err.into()),
                    }
                };
                filter_cache.put(cache_key.clone(), resolved.clone());
                resolved
            }
        };
        match cached {
            Some(filter) => keys.extend(keys_for_rules(&filter.rules)),
            None => missing_filters
                .entry(cache_key)
                .or_default()
                .push(item_key.to_string()),
        }
    }
    Ok(keys)
}

fn contexts_for(store: &DataStore, item_type: ItemType, tenant: &str, id: &str) -> Vec<Option<String>> {
    if !item_type.context_scoped() {
        return vec![None];
    }
    match store.contexts_of(item_type, tenant, id) {
        Ok(contexts) => contexts.into_iter().map(Some).collect(),
        Err(_) => Vec::new(),
    }
}

/// Checks the filter indexes of one item type both ways: every profile
/// key must be stored, every stored entry must trace back to a live
/// profile that still produces it
pub fn filter_index_health(
    store: &DataStore,
    item_type: ItemType,
    limits: HealthCheckLimits,
) -> IndexResult<FilterHealthReport> {
    let cache_id = item_type.index_cache_id();
    let mut report = FilterHealthReport::default();
    let mut filter_cache: BoundedCache<String, Option<Filter>> =
        BoundedCache::new(limits.filter_cache_limit);
    let mut object_cache: BoundedCache<String, Option<BTreeSet<String>>> =
        BoundedCache::new(limits.object_cache_limit);
    let mut index_cache: BoundedCache<String, BTreeMap<String, BTreeSet<String>>> =
        BoundedCache::new(limits.index_cache_limit);

    // objects against stored indexes
    let profiles = match store.profile_keys(item_type) {
        Ok(keys) => keys,
        Err(StorageError::NotFound) => Vec::new(),
        Err(err) => return Err(err.into()),
    };
    for (tenant, id) in &profiles {
        let item_key = format!("{tenant}:{id}");
        for context in contexts_for(store, item_type, tenant, id) {
            let filter_ids = match store.filter_ids_of(item_type, tenant, id, context.as_deref()) {
                Ok(Some(ids)) => ids,
                Ok(None) => continue,
                Err(StorageError::NotFound) => continue,
                Err(err) => return Err(err.into()),
            };
            let expected = expected_keys_lenient(
                store,
                tenant,
                &item_key,
                &filter_ids,
                &mut filter_cache,
                &mut report.missing_filters,
            )?;
            let scope = scope_key(tenant, context.as_deref());
            let bucket = load_bucket(store, cache_id, &scope, &mut index_cache)?;
            for key in expected {
                let stored = bucket.get(&key).map_or(false, |ids| ids.contains(id));
                if !stored {
                    report
                        .missing_indexes
                        .entry(format!("{scope}:{key}"))
                        .or_default()
                        .push(item_key.clone());
                }
            }
        }
    }

    // stored indexes against objects
    for scope in store.index_scopes(cache_id)? {
        let (tenant, context) = match item_type.context_scoped() {
            true => match scope.split_once(':') {
                Some((tenant, context)) => (tenant.to_string(), Some(context.to_string())),
                None => (scope.clone(), None),
            },
            false => (scope.clone(), None),
        };
        let bucket = load_bucket(store, cache_id, &scope, &mut index_cache)?;
        for (key, item_ids) in bucket {
            for item_id in item_ids {
                let item_key = format!("{tenant}:{item_id}");
                let expected = match object_cache.get(&format!("{scope}:{item_id}")) {
                    Some(cached) => cached.clone(),
                    None => {
                        let computed = match store.filter_ids_of(
                            item_type,
                            &tenant,
                            &item_id,
                            context.as_deref(),
                        ) {
                            Ok(Some(filter_ids)) => Some(expected_keys_lenient(
                                store,
                                &tenant,
                                &item_key,
                                &filter_ids,
                                &mut filter_cache,
                                &mut BTreeMap::new(),
                            )?),
                            Ok(None) => Some(BTreeSet::new()),
                            Err(StorageError::NotFound) => None,
                            Err(err) => return Err(err.into()),
                        };
                        object_cache.put(format!("{scope}:{item_id}"), computed.clone());
                        computed
                    }
                };
                match expected {
                    None => {
                        if !report.missing_objects.contains(&item_key) {
                            report.missing_objects.push(item_key);
                        }
                    }
                    Some(expected) if !expected.contains(&key) => {
                        report
                            .broken_indexes
                            .entry(format!("{scope}:{key}"))
                            .or_default()
                            .push(item_key);
                    }
                    Some(_) => {}
                }
            }
        }
    }
    report.missing_objects.sort();
    Ok(report)
}

fn load_bucket(
    store: &DataStore,
    cache_id: &str,
    scope: &str,
    cache: &mut BoundedCache<String, BTreeMap<String, BTreeSet<String>>>,
) -> IndexResult<BTreeMap<String, BTreeSet<String>>> {
    if let Some(bucket) = cache.get(&scope.to_string()) {
        return Ok(bucket.clone());
    }
    let bucket = match store.get_indexes(cache_id, scope, None, true, true) {
        Ok(bucket) => bucket,
        Err(StorageError::NotFound) => BTreeMap::new(),
        Err(err) => return Err(err.into()),
    };
    cache.put(scope.to_string(), bucket.clone());
    Ok(bucket)
}

/// Discrepancies between action plans and the per-account reverse list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountActionPlanHealthReport {
    /// account -> plan IDs that list the account but are absent from
    /// its reverse entry
    #[serde(rename = "MissingAccountActionPlans")]
    pub missing_account_action_plans: BTreeMap<String, Vec<String>>,
    /// account -> referenced plan IDs that no longer exist
    #[serde(rename = "BrokenReferences")]
    pub broken_references: BTreeMap<String, Vec<String>>,
}

pub fn account_action_plan_health(
    store: &DataStore,
) -> IndexResult<AccountActionPlanHealthReport> {
    let mut report = AccountActionPlanHealthReport::default();
    let plans = match store.all_action_plans() {
        Ok(plans) => plans,
        Err(StorageError::NotFound) => Vec::new(),
        Err(err) => return Err(err.into()),
    };
    for plan in &plans {
        for account_id in &plan.account_ids {
            let listed = match store.get_account_action_plans(account_id) {
                Ok(ids) => ids.contains(&plan.id),
                Err(StorageError::NotFound) => false,
                Err(err) => return Err(err.into()),
            };
            if !listed {
                report
                    .missing_account_action_plans
                    .entry(account_id.clone())
                    .or_default()
                    .push(plan.id.clone());
            }
        }
    }
    let plan_ids: BTreeSet<&String> = plans.iter().map(|plan| &plan.id).collect();
    for account_id in store.account_action_plan_accounts() {
        let referenced = match store.get_account_action_plans(&account_id) {
            Ok(ids) => ids,
            Err(StorageError::NotFound) => continue,
            Err(err) => return Err(err.into()),
        };
        for plan_id in referenced {
            if !plan_ids.contains(&plan_id) {
                report
                    .broken_references
                    .entry(account_id.clone())
                    .or_default()
                    .push(plan_id);
            }
        }
    }
    Ok(report)
}

/// Discrepancies between destinations and the prefix reverse index
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReverseDestinationHealthReport {
    /// destination -> prefixes missing from the reverse index
    #[serde(rename = "MissingReverseDestinations")]
    pub missing_reverse_destinations: BTreeMap<String, Vec<String>>,
    /// prefix -> destination IDs that no longer exist
    #[serde(rename = "BrokenReferences")]
    pub broken_references: BTreeMap<String, Vec<String>>,
}

pub fn reverse_destination_health(
    store: &DataStore,
) -> IndexResult<ReverseDestinationHealthReport> {
    let mut report = ReverseDestinationHealthReport::default();
    let dest_ids = store.destination_ids();
    for dest_id in &dest_ids {
        let destination = match store.get_destination(dest_id) {
            Ok(destination) => destination,
            Err(StorageError::NotFound) => continue,
            Err(err) => return Err(err.into()),
        };
        for prefix in &destination.prefixes {
            let mirrored = match store.get_reverse_destination(prefix) {
                Ok(ids) => ids.contains(dest_id),
                Err(StorageError::NotFound) => false,
                Err(err) => return Err(err.into()),
            };
            if !mirrored {
                report
                    .missing_reverse_destinations
                    .entry(dest_id.clone())
                    .or_default()
                    .push(prefix.clone());
            }
        }
    }
    for prefix in store.reverse_destination_prefixes() {
        let referenced = match store.get_reverse_destination(&prefix) {
            Ok(ids) => ids,
            Err(StorageError::NotFound) => continue,
            Err(err) => return Err(err.into()),
        };
        for dest_id in referenced {
            if !dest_ids.contains(&dest_id) {
                report
                    .broken_references
                    .entry(prefix.clone())
                    .or_default()
                    .push(dest_id);
            }
        }
    }
    Ok(report)
}
