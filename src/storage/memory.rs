//! In-memory data store.
//!
//! Reference implementation of the index store adapter and the
//! profile/filter store, shared by every request-handling thread.
//! Index buckets live under `cache_id:scope`; transactional writes
//! accumulate in a staging area keyed by the transaction ID and replace
//! the live bucket atomically on commit.

use std::collections::{BTreeSet, HashMap};
use std::sync::RwLock;

use chrono::Utc;

use crate::filter::{Filter, META_ANY, META_NONE};
use crate::profile::{
    Account, Action, ActionPlan, ActionTriggers, AttributeProfile, ChargerProfile, Destination,
    DispatcherHost, DispatcherProfile, ItemType, RatingPlan, RatingProfile, Resource,
    ResourceProfile, RouteProfile, SharedGroup, StatQueue, StatQueueProfile, ThresholdProfile,
    Threshold, Timing,
};

use super::adapter::{IndexBucket, IndexStore, ProfileStore};
use super::errors::{StorageError, StorageResult};

/// Cache instance of the filter objects themselves
pub const CACHE_FILTERS: &str = "filters";

fn tenant_key(tenant: &str, id: &str) -> String {
    format!("{tenant}:{id}")
}

fn sentinel_key() -> String {
    format!("{META_NONE}:{META_ANY}:{META_ANY}")
}

#[derive(Default)]
struct Inner {
    filters: HashMap<String, Filter>,

    threshold_profiles: HashMap<String, ThresholdProfile>,
    stat_queue_profiles: HashMap<String, StatQueueProfile>,
    resource_profiles: HashMap<String, ResourceProfile>,
    route_profiles: HashMap<String, RouteProfile>,
    attribute_profiles: HashMap<String, AttributeProfile>,
    charger_profiles: HashMap<String, ChargerProfile>,
    dispatcher_profiles: HashMap<String, DispatcherProfile>,

    thresholds: HashMap<String, Threshold>,
    stat_queues: HashMap<String, StatQueue>,
    resources: HashMap<String, Resource>,

    accounts: HashMap<String, Account>,
    destinations: HashMap<String, Destination>,
    reverse_destinations: HashMap<String, BTreeSet<String>>,
    action_plans: HashMap<String, ActionPlan>,
    account_action_plans: HashMap<String, Vec<String>>,
    actions: HashMap<String, Vec<Action>>,
    action_triggers: HashMap<String, ActionTriggers>,
    timings: HashMap<String, Timing>,
    shared_groups: HashMap<String, SharedGroup>,
    rating_plans: HashMap<String, RatingPlan>,
    rating_profiles: HashMap<String, RatingProfile>,
    dispatcher_hosts: HashMap<String, DispatcherHost>,

    /// Live buckets, keyed `cache_id:scope`
    indexes: HashMap<String, IndexBucket>,
    /// Staged buckets, keyed `cache_id:scope:transaction_id`
    staged: HashMap<String, IndexBucket>,

    /// Per-cache-instance version stamps for staleness detection
    load_ids: HashMap<String, i64>,
}

/// Shared in-memory storage engine
#[derive(Default)]
pub struct DataStore {
    inner: RwLock<Inner>,
}

impl DataStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn stamp(inner: &mut Inner, cache_id: &str) {
        let now = Utc::now().timestamp_nanos_opt().unwrap_or_default();
        inner.load_ids.insert(cache_id.to_string(), now);
    }

    // ==================
    // Filters
    // ==================

    pub fn set_filter(&self, filter: Filter) -> StorageResult<()> {
        let mut inner = self.inner.write().expect("lock poisoned");
        let key = filter.tenant_id();
        inner.filters.insert(key, filter);
        Self::stamp(&mut inner, CACHE_FILTERS);
        Ok(())
    }

    pub fn remove_filter(&self, tenant: &str, id: &str) -> StorageResult<()> {
        let mut inner = self.inner.write().expect("lock poisoned");
        inner
            .filters
            .remove(&tenant_key(tenant, id))
            .ok_or(StorageError::NotFound)?;
        Self::stamp(&mut inner, CACHE_FILTERS);
        Ok(())
    }

    // ==================
    // Indexed profiles
    // ==================

    pub fn get_threshold_profile(&self, tenant: &str, id: &str) -> StorageResult<ThresholdProfile> {
        let inner = self.inner.read().expect("lock poisoned");
        inner
            .threshold_profiles
            .get(&tenant_key(tenant, id))
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    pub fn set_threshold_profile(&self, profile: ThresholdProfile) -> StorageResult<()> {
        let mut inner = self.inner.write().expect("lock poisoned");
        let key = tenant_key(&profile.tenant, &profile.id);
        inner.threshold_profiles.insert(key, profile);
        Self::stamp(&mut inner, ItemType::Thresholds.profile_cache_id());
        Ok(())
    }

    pub fn remove_threshold_profile(&self, tenant: &str, id: &str) -> StorageResult<()> {
        let mut inner = self.inner.write().expect("lock poisoned");
        inner
            .threshold_profiles
            .remove(&tenant_key(tenant, id))
            .ok_or(StorageError::NotFound)?;
        Self::stamp(&mut inner, ItemType::Thresholds.profile_cache_id());
        Ok(())
    }

    pub fn get_stat_queue_profile(&self, tenant: &str, id: &str) -> StorageResult<StatQueueProfile> {
        let inner = self.inner.read().expect("lock poisoned");
        inner
            .stat_queue_profiles
            .get(&tenant_key(tenant, id))
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    pub fn set_stat_queue_profile(&self, profile: StatQueueProfile) -> StorageResult<()> {
        let mut inner = self.inner.write().expect("lock poisoned");
        let key = tenant_key(&profile.tenant, &profile.id);
        inner.stat_queue_profiles.insert(key, profile);
        Self::stamp(&mut inner, ItemType::Stats.profile_cache_id());
        Ok(())
    }

    pub fn remove_stat_queue_profile(&self, tenant: &str, id: &str) -> StorageResult<()> {
        let mut inner = self.inner.write().expect("lock poisoned");
        inner
            .stat_queue_profiles
            .remove(&tenant_key(tenant, id))
            .ok_or(StorageError::NotFound)?;
        Self::stamp(&mut inner, ItemType::Stats.profile_cache_id());
        Ok(())
    }

    pub fn get_resource_profile(&self, tenant: &str, id: &str) -> StorageResult<ResourceProfile> {
        let inner = self.inner.read().expect("lock poisoned");
        inner
            .resource_profiles
            .get(&tenant_key(tenant, id))
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    pub fn set_resource_profile(&self, profile: ResourceProfile) -> StorageResult<()> {
        let mut inner = self.inner.write().expect("lock poisoned");
        let key = tenant_key(&profile.tenant, &profile.id);
        inner.resource_profiles.insert(key, profile);
        Self::stamp(&mut inner, ItemType::Resources.profile_cache_id());
        Ok(())
    }

    pub fn remove_resource_profile(&self, tenant: &str, id: &str) -> StorageResult<()> {
        let mut inner = self.inner.write().expect("lock poisoned");
        inner
            .resource_profiles
            .remove(&tenant_key(tenant, id))
            .ok_or(StorageError::NotFound)?;
        Self::stamp(&mut inner, ItemType::Resources.profile_cache_id());
        Ok(())
    }

    pub fn get_route_profile(&self, tenant: &str, id: &str) -> StorageResult<RouteProfile> {
        let inner = self.inner.read().expect("lock poisoned");
        inner
            .route_profiles
            .get(&tenant_key(tenant, id))
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    pub fn set_route_profile(&self, profile: RouteProfile) -> StorageResult<()> {
        let mut inner = self.inner.write().expect("lock poisoned");
        let key = tenant_key(&profile.tenant, &profile.id);
        inner.route_profiles.insert(key, profile);
        Self::stamp(&mut inner, ItemType::Routes.profile_cache_id());
        Ok(())
    }

    pub fn remove_route_profile(&self, tenant: &str, id: &str) -> StorageResult<()> {
        let mut inner = self.inner.write().expect("lock poisoned");
        inner
            .route_profiles
            .remove(&tenant_key(tenant, id))
            .ok_or(StorageError::NotFound)?;
        Self::stamp(&mut inner, ItemType::Routes.profile_cache_id());
        Ok(())
    }

    pub fn get_attribute_profile(&self, tenant: &str, id: &str) -> StorageResult<AttributeProfile> {
        let inner = self.inner.read().expect("lock poisoned");
        inner
            .attribute_profiles
            .get(&tenant_key(tenant, id))
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    pub fn set_attribute_profile(&self, profile: AttributeProfile) -> StorageResult<()> {
        let mut inner = self.inner.write().expect("lock poisoned");
        let key = tenant_key(&profile.tenant, &profile.id);
        inner.attribute_profiles.insert(key, profile);
        Self::stamp(&mut inner, ItemType::Attributes.profile_cache_id());
        Ok(())
    }

    pub fn remove_attribute_profile(&self, tenant: &str, id: &str) -> StorageResult<()> {
        let mut inner = self.inner.write().expect("lock poisoned");
        inner
            .attribute_profiles
            .remove(&tenant_key(tenant, id))
            .ok_or(StorageError::NotFound)?;
        Self::stamp(&mut inner, ItemType::Attributes.profile_cache_id());
        Ok(())
    }

    pub fn get_charger_profile(&self, tenant: &str, id: &str) -> StorageResult<ChargerProfile> {
        let inner = self.inner.read().expect("lock poisoned");
        inner
            .charger_profiles
            .get(&tenant_key(tenant, id))
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    pub fn set_charger_profile(&self, profile: ChargerProfile) -> StorageResult<()> {
        let mut inner = self.inner.write().expect("lock poisoned");
        let key = tenant_key(&profile.tenant, &profile.id);
        inner.charger_profiles.insert(key, profile);
        Self::stamp(&mut inner, ItemType::Chargers.profile_cache_id());
        Ok(())
    }

    pub fn remove_charger_profile(&self, tenant: &str, id: &str) -> StorageResult<()> {
        let mut inner = self.inner.write().expect("lock poisoned");
        inner
            .charger_profiles
            .remove(&tenant_key(tenant, id))
            .ok_or(StorageError::NotFound)?;
        Self::stamp(&mut inner, ItemType::Chargers.profile_cache_id());
        Ok(())
    }

    pub fn get_dispatcher_profile(&self, tenant: &str, id: &str) -> StorageResult<DispatcherProfile> {
        let inner = self.inner.read().expect("lock poisoned");
        inner
            .dispatcher_profiles
            .get(&tenant_key(tenant, id))
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    pub fn set_dispatcher_profile(&self, profile: DispatcherProfile) -> StorageResult<()> {
        let mut inner = self.inner.write().expect("lock poisoned");
        let key = tenant_key(&profile.tenant, &profile.id);
        inner.dispatcher_profiles.insert(key, profile);
        Self::stamp(&mut inner, ItemType::Dispatchers.profile_cache_id());
        Ok(())
    }

    pub fn remove_dispatcher_profile(&self, tenant: &str, id: &str) -> StorageResult<()> {
        let mut inner = self.inner.write().expect("lock poisoned");
        inner
            .dispatcher_profiles
            .remove(&tenant_key(tenant, id))
            .ok_or(StorageError::NotFound)?;
        Self::stamp(&mut inner, ItemType::Dispatchers.profile_cache_id());
        Ok(())
    }

    // ==================
    // Runtime objects
    // ==================

    pub fn get_threshold(&self, tenant: &str, id: &str) -> StorageResult<Threshold> {
        let inner = self.inner.read().expect("lock poisoned");
        inner
            .thresholds
            .get(&tenant_key(tenant, id))
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    pub fn set_threshold(&self, threshold: Threshold) -> StorageResult<()> {
        let mut inner = self.inner.write().expect("lock poisoned");
        let key = tenant_key(&threshold.tenant, &threshold.id);
        inner.thresholds.insert(key, threshold);
        Ok(())
    }

    pub fn get_stat_queue(&self, tenant: &str, id: &str) -> StorageResult<StatQueue> {
        let inner = self.inner.read().expect("lock poisoned");
        inner
            .stat_queues
            .get(&tenant_key(tenant, id))
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    pub fn set_stat_queue(&self, queue: StatQueue) -> StorageResult<()> {
        let mut inner = self.inner.write().expect("lock poisoned");
        let key = tenant_key(&queue.tenant, &queue.id);
        inner.stat_queues.insert(key, queue);
        Ok(())
    }

    pub fn get_resource(&self, tenant: &str, id: &str) -> StorageResult<Resource> {
        let inner = self.inner.read().expect("lock poisoned");
        inner
            .resources
            .get(&tenant_key(tenant, id))
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    pub fn set_resource(&self, resource: Resource) -> StorageResult<()> {
        let mut inner = self.inner.write().expect("lock poisoned");
        let key = tenant_key(&resource.tenant, &resource.id);
        inner.resources.insert(key, resource);
        Ok(())
    }

    // ==================
    // Auxiliary entities
    // ==================

    pub fn get_account(&self, id: &str) -> StorageResult<Account> {
        let inner = self.inner.read().expect("lock poisoned");
        inner.accounts.get(id).cloned().ok_or(StorageError::NotFound)
    }

    pub fn set_account(&self, account: Account) -> StorageResult<()> {
        let mut inner = self.inner.write().expect("lock poisoned");
        inner.accounts.insert(account.id.clone(), account);
        Self::stamp(&mut inner, "accounts");
        Ok(())
    }

    pub fn get_destination(&self, id: &str) -> StorageResult<Destination> {
        let inner = self.inner.read().expect("lock poisoned");
        inner
            .destinations
            .get(id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    /// Stores the destination and mirrors every prefix into the reverse
    /// destination index
    pub fn set_destination(&self, destination: Destination) -> StorageResult<()> {
        let mut inner = self.inner.write().expect("lock poisoned");
        for prefix in &destination.prefixes {
            inner
                .reverse_destinations
                .entry(prefix.clone())
                .or_default()
                .insert(destination.id.clone());
        }
        inner
            .destinations
            .insert(destination.id.clone(), destination);
        Self::stamp(&mut inner, "destinations");
        Ok(())
    }

    pub fn get_reverse_destination(&self, prefix: &str) -> StorageResult<Vec<String>> {
        let inner = self.inner.read().expect("lock poisoned");
        inner
            .reverse_destinations
            .get(prefix)
            .map(|ids| ids.iter().cloned().collect())
            .ok_or(StorageError::NotFound)
    }

    /// Raw reverse-destination write, replication only
    pub fn set_reverse_destination(&self, prefix: &str, dest_ids: Vec<String>) -> StorageResult<()> {
        let mut inner = self.inner.write().expect("lock poisoned");
        inner
            .reverse_destinations
            .insert(prefix.to_string(), dest_ids.into_iter().collect());
        Ok(())
    }

    pub fn reverse_destination_prefixes(&self) -> Vec<String> {
        let inner = self.inner.read().expect("lock poisoned");
        let mut prefixes: Vec<String> = inner.reverse_destinations.keys().cloned().collect();
        prefixes.sort();
        prefixes
    }

    pub fn destination_ids(&self) -> Vec<String> {
        let inner = self.inner.read().expect("lock poisoned");
        let mut ids: Vec<String> = inner.destinations.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn get_action_plan(&self, id: &str) -> StorageResult<ActionPlan> {
        let inner = self.inner.read().expect("lock poisoned");
        inner
            .action_plans
            .get(id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    pub fn set_action_plan(&self, plan: ActionPlan) -> StorageResult<()> {
        let mut inner = self.inner.write().expect("lock poisoned");
        inner.action_plans.insert(plan.id.clone(), plan);
        Self::stamp(&mut inner, "action_plans");
        Ok(())
    }

    pub fn all_action_plans(&self) -> StorageResult<Vec<ActionPlan>> {
        let inner = self.inner.read().expect("lock poisoned");
        if inner.action_plans.is_empty() {
            return Err(StorageError::NotFound);
        }
        let mut plans: Vec<ActionPlan> = inner.action_plans.values().cloned().collect();
        plans.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(plans)
    }

    pub fn get_account_action_plans(&self, account_id: &str) -> StorageResult<Vec<String>> {
        let inner = self.inner.read().expect("lock poisoned");
        inner
            .account_action_plans
            .get(account_id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    pub fn set_account_action_plans(
        &self,
        account_id: &str,
        plan_ids: Vec<String>,
    ) -> StorageResult<()> {
        let mut inner = self.inner.write().expect("lock poisoned");
        inner
            .account_action_plans
            .insert(account_id.to_string(), plan_ids);
        Self::stamp(&mut inner, "account_action_plans");
        Ok(())
    }

    pub fn account_action_plan_accounts(&self) -> Vec<String> {
        let inner = self.inner.read().expect("lock poisoned");
        let mut ids: Vec<String> = inner.account_action_plans.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn get_actions(&self, id: &str) -> StorageResult<Vec<Action>> {
        let inner = self.inner.read().expect("lock poisoned");
        inner.actions.get(id).cloned().ok_or(StorageError::NotFound)
    }

    pub fn set_actions(&self, id: &str, actions: Vec<Action>) -> StorageResult<()> {
        let mut inner = self.inner.write().expect("lock poisoned");
        inner.actions.insert(id.to_string(), actions);
        Self::stamp(&mut inner, "actions");
        Ok(())
    }

    pub fn get_action_triggers(&self, id: &str) -> StorageResult<ActionTriggers> {
        let inner = self.inner.read().expect("lock poisoned");
        inner
            .action_triggers
            .get(id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    pub fn set_action_triggers(&self, triggers: ActionTriggers) -> StorageResult<()> {
        let mut inner = self.inner.write().expect("lock poisoned");
        inner.action_triggers.insert(triggers.id.clone(), triggers);
        Ok(())
    }

    pub fn get_timing(&self, id: &str) -> StorageResult<Timing> {
        let inner = self.inner.read().expect("lock poisoned");
        inner.timings.get(id).cloned().ok_or(StorageError::NotFound)
    }

    pub fn set_timing(&self, timing: Timing) -> StorageResult<()> {
        let mut inner = self.inner.write().expect("lock poisoned");
        inner.timings.insert(timing.id.clone(), timing);
        Ok(())
    }

    pub fn get_shared_group(&self, id: &str) -> StorageResult<SharedGroup> {
        let inner = self.inner.read().expect("lock poisoned");
        inner
            .shared_groups
            .get(id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    pub fn set_shared_group(&self, group: SharedGroup) -> StorageResult<()> {
        let mut inner = self.inner.write().expect("lock poisoned");
        inner.shared_groups.insert(group.id.clone(), group);
        Ok(())
    }

    pub fn get_rating_plan(&self, id: &str) -> StorageResult<RatingPlan> {
        let inner = self.inner.read().expect("lock poisoned");
        inner
            .rating_plans
            .get(id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    pub fn set_rating_plan(&self, plan: RatingPlan) -> StorageResult<()> {
        let mut inner = self.inner.write().expect("lock poisoned");
        inner.rating_plans.insert(plan.id.clone(), plan);
        Ok(())
    }

    pub fn get_rating_profile(&self, id: &str) -> StorageResult<RatingProfile> {
        let inner = self.inner.read().expect("lock poisoned");
        inner
            .rating_profiles
            .get(id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    pub fn set_rating_profile(&self, profile: RatingProfile) -> StorageResult<()> {
        let mut inner = self.inner.write().expect("lock poisoned");
        inner.rating_profiles.insert(profile.id.clone(), profile);
        Ok(())
    }

    pub fn get_dispatcher_host(&self, tenant: &str, id: &str) -> StorageResult<DispatcherHost> {
        let inner = self.inner.read().expect("lock poisoned");
        inner
            .dispatcher_hosts
            .get(&tenant_key(tenant, id))
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    pub fn set_dispatcher_host(&self, host: DispatcherHost) -> StorageResult<()> {
        let mut inner = self.inner.write().expect("lock poisoned");
        let key = tenant_key(&host.tenant, &host.id);
        inner.dispatcher_hosts.insert(key, host);
        Ok(())
    }

    // ==================
    // Load IDs
    // ==================

    /// Version stamps of the queried cache instances (all when empty)
    pub fn get_item_load_ids(&self, item_id_prefix: &str) -> StorageResult<HashMap<String, i64>> {
        let inner = self.inner.read().expect("lock poisoned");
        let stamps: HashMap<String, i64> = inner
            .load_ids
            .iter()
            .filter(|(key, _)| item_id_prefix.is_empty() || key.starts_with(item_id_prefix))
            .map(|(key, stamp)| (key.clone(), *stamp))
            .collect();
        if stamps.is_empty() {
            return Err(StorageError::NotFound);
        }
        Ok(stamps)
    }

    pub fn set_load_ids(&self, stamps: HashMap<String, i64>) -> StorageResult<()> {
        let mut inner = self.inner.write().expect("lock poisoned");
        inner.load_ids.extend(stamps);
        Ok(())
    }
}

fn bucket_key(cache_id: &str, scope: &str) -> String {
    format!("{cache_id}:{scope}")
}

fn staging_key(cache_id: &str, scope: &str, transaction_id: &str) -> String {
    format!("{cache_id}:{scope}:{transaction_id}")
}

impl IndexStore for DataStore {
    fn get_indexes(
        &self,
        cache_id: &str,
        scope: &str,
        key_prefix: Option<&str>,
        include_sentinel: bool,
        include_all: bool,
    ) -> StorageResult<IndexBucket> {
        let inner = self.inner.read().expect("lock poisoned");
        let bucket = inner
            .indexes
            .get(&bucket_key(cache_id, scope))
            .ok_or(StorageError::NotFound)?;
        let sentinel = sentinel_key();
        let selected: IndexBucket = bucket
            .iter()
            .filter(|(key, _)| {
                if include_all {
                    return true;
                }
                if key.as_str() == sentinel {
                    return include_sentinel;
                }
                match key_prefix {
                    Some(prefix) => key.starts_with(prefix),
                    None => true,
                }
            })
            .map(|(key, ids)| (key.clone(), ids.clone()))
            .collect();
        if selected.is_empty() {
            return Err(StorageError::NotFound);
        }
        Ok(selected)
    }

    fn set_indexes(
        &self,
        cache_id: &str,
        scope: &str,
        indexes: IndexBucket,
        commit: bool,
        transaction_id: &str,
    ) -> StorageResult<()> {
        let mut inner = self.inner.write().expect("lock poisoned");
        if transaction_id.is_empty() {
            // direct write, visible immediately
            let live = inner
                .indexes
                .entry(bucket_key(cache_id, scope))
                .or_default();
            for (key, ids) in indexes {
                if ids.is_empty() {
                    live.remove(&key);
                } else {
                    live.insert(key, ids);
                }
            }
            if live.is_empty() {
                inner.indexes.remove(&bucket_key(cache_id, scope));
            }
            Self::stamp(&mut inner, cache_id);
            return Ok(());
        }
        let stage_key = staging_key(cache_id, scope, transaction_id);
        if !commit {
            let staged = inner.staged.entry(stage_key).or_default();
            for (key, ids) in indexes {
                if ids.is_empty() {
                    staged.remove(&key);
                } else {
                    staged.entry(key).or_default().extend(ids);
                }
            }
            return Ok(());
        }
        // commit: staged content replaces the live bucket wholesale
        let mut staged = inner.staged.remove(&stage_key).unwrap_or_default();
        for (key, ids) in indexes {
            if ids.is_empty() {
                staged.remove(&key);
            } else {
                staged.entry(key).or_default().extend(ids);
            }
        }
        if staged.is_empty() {
            inner.indexes.remove(&bucket_key(cache_id, scope));
        } else {
            inner.indexes.insert(bucket_key(cache_id, scope), staged);
        }
        Self::stamp(&mut inner, cache_id);
        Ok(())
    }

    fn remove_indexes(
        &self,
        cache_id: &str,
        scope: &str,
        key_prefix: Option<&str>,
    ) -> StorageResult<()> {
        let mut inner = self.inner.write().expect("lock poisoned");
        match key_prefix {
            None => {
                inner.indexes.remove(&bucket_key(cache_id, scope));
            }
            Some(prefix) => {
                if let Some(bucket) = inner.indexes.get_mut(&bucket_key(cache_id, scope)) {
                    bucket.retain(|key, _| !key.starts_with(prefix));
                    if bucket.is_empty() {
                        inner.indexes.remove(&bucket_key(cache_id, scope));
                    }
                }
            }
        }
        Self::stamp(&mut inner, cache_id);
        Ok(())
    }

    fn match_filter_index(
        &self,
        cache_id: &str,
        scope: &str,
        rule_type: &str,
        field: &str,
        value: &str,
    ) -> StorageResult<BTreeSet<String>> {
        let inner = self.inner.read().expect("lock poisoned");
        inner
            .indexes
            .get(&bucket_key(cache_id, scope))
            .and_then(|bucket| bucket.get(&format!("{rule_type}:{field}:{value}")))
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    fn index_scopes(&self, cache_id: &str) -> StorageResult<Vec<String>> {
        let inner = self.inner.read().expect("lock poisoned");
        let prefix = format!("{cache_id}:");
        let mut scopes: Vec<String> = inner
            .indexes
            .keys()
            .filter_map(|key| key.strip_prefix(&prefix))
            .map(str::to_string)
            .collect();
        scopes.sort();
        Ok(scopes)
    }
}

impl ProfileStore for DataStore {
    fn get_filter(&self, tenant: &str, id: &str) -> StorageResult<Filter> {
        let inner = self.inner.read().expect("lock poisoned");
        inner
            .filters
            .get(&tenant_key(tenant, id))
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    fn profile_ids(&self, item_type: ItemType, tenant: &str) -> StorageResult<Vec<String>> {
        let mut ids: Vec<String> = self
            .profile_keys(item_type)?
            .into_iter()
            .filter(|(tnt, _)| tnt == tenant)
            .map(|(_, id)| id)
            .collect();
        ids.sort();
        Ok(ids)
    }

    fn profile_keys(&self, item_type: ItemType) -> StorageResult<Vec<(String, String)>> {
        let inner = self.inner.read().expect("lock poisoned");
        let keys: Vec<&String> = match item_type {
            ItemType::Thresholds => inner.threshold_profiles.keys().collect(),
            ItemType::Stats => inner.stat_queue_profiles.keys().collect(),
            ItemType::Resources => inner.resource_profiles.keys().collect(),
            ItemType::Routes => inner.route_profiles.keys().collect(),
            ItemType::Attributes => inner.attribute_profiles.keys().collect(),
            ItemType::Chargers => inner.charger_profiles.keys().collect(),
            ItemType::Dispatchers => inner.dispatcher_profiles.keys().collect(),
        };
        let mut pairs: Vec<(String, String)> = keys
            .into_iter()
            .filter_map(|key| {
                key.split_once(':')
                    .map(|(tnt, id)| (tnt.to_string(), id.to_string()))
            })
            .collect();
        pairs.sort();
        Ok(pairs)
    }

    fn filter_ids_of(
        &self,
        item_type: ItemType,
        tenant: &str,
        id: &str,
        context: Option<&str>,
    ) -> StorageResult<Option<Vec<String>>> {
        let inner = self.inner.read().expect("lock poisoned");
        let key = tenant_key(tenant, id);
        let (filter_ids, contexts): (Vec<String>, Option<Vec<String>>) = match item_type {
            ItemType::Thresholds => (
                inner
                    .threshold_profiles
                    .get(&key)
                    .ok_or(StorageError::NotFound)?
                    .filter_ids
                    .clone(),
                None,
            ),
            ItemType::Stats => (
                inner
                    .stat_queue_profiles
                    .get(&key)
                    .ok_or(StorageError::NotFound)?
                    .filter_ids
                    .clone(),
                None,
            ),
            ItemType::Resources => (
                inner
                    .resource_profiles
                    .get(&key)
                    .ok_or(StorageError::NotFound)?
                    .filter_ids
                    .clone(),
                None,
            ),
            ItemType::Routes => (
                inner
                    .route_profiles
                    .get(&key)
                    .ok_or(StorageError::NotFound)?
                    .filter_ids
                    .clone(),
                None,
            ),
            ItemType::Chargers => (
                inner
                    .charger_profiles
                    .get(&key)
                    .ok_or(StorageError::NotFound)?
                    .filter_ids
                    .clone(),
                None,
            ),
            ItemType::Attributes => {
                let profile = inner
                    .attribute_profiles
                    .get(&key)
                    .ok_or(StorageError::NotFound)?;
                (profile.filter_ids.clone(), Some(profile.contexts.clone()))
            }
            ItemType::Dispatchers => {
                let profile = inner
                    .dispatcher_profiles
                    .get(&key)
                    .ok_or(StorageError::NotFound)?;
                (profile.filter_ids.clone(), Some(profile.subsystems.clone()))
            }
        };
        if let (Some(ctx), Some(declared)) = (context, contexts.as_ref()) {
            if ctx != META_ANY && !declared.iter().any(|c| c == ctx) {
                return Ok(None);
            }
        }
        Ok(Some(filter_ids))
    }

    fn contexts_of(
        &self,
        item_type: ItemType,
        tenant: &str,
        id: &str,
    ) -> StorageResult<Vec<String>> {
        let inner = self.inner.read().expect("lock poisoned");
        let key = tenant_key(tenant, id);
        match item_type {
            ItemType::Attributes => Ok(inner
                .attribute_profiles
                .get(&key)
                .ok_or(StorageError::NotFound)?
                .contexts
                .clone()),
            ItemType::Dispatchers => Ok(inner
                .dispatcher_profiles
                .get(&key)
                .ok_or(StorageError::NotFound)?
                .subsystems
                .clone()),
            _ => Ok(Vec::new()),
        }
    }
}
