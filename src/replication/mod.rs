//! Replication facade.
//!
//! One Get/Set pair per replicated entity kind, each an exact
//! passthrough to the corresponding storage read or write. No business
//! logic lives here; that contract is what lets an independently
//! versioned peer call these safely. Retries and reconciliation are the
//! caller's problem, divergence is audited with the health checker.

use std::collections::HashMap;
use std::sync::Arc;

use crate::filter::Filter;
use crate::profile::{
    Account, Action, ActionPlan, ActionTriggers, AttributeProfile, ChargerProfile, Destination,
    DispatcherHost, DispatcherProfile, RatingPlan, RatingProfile, Resource, ResourceProfile,
    RouteProfile, SharedGroup, StatQueue, StatQueueProfile, Threshold, ThresholdProfile, Timing,
};
use crate::storage::{
    DataStore, IndexBucket, IndexStore, ProfileStore, StorageResult, NON_TRANSACTIONAL,
};

pub const OK: &str = "OK";
pub const PONG: &str = "Pong";

/// Remote-callable storage passthrough
pub struct Replicator {
    store: Arc<DataStore>,
}

impl Replicator {
    pub fn new(store: Arc<DataStore>) -> Self {
        Self { store }
    }

    pub fn ping(&self) -> &'static str {
        PONG
    }

    // ==================
    // Entity reads
    // ==================

    pub fn get_account(&self, id: &str) -> StorageResult<Account> {
        self.store.get_account(id)
    }

    pub fn get_destination(&self, id: &str) -> StorageResult<Destination> {
        self.store.get_destination(id)
    }

    pub fn get_reverse_destination(&self, prefix: &str) -> StorageResult<Vec<String>> {
        self.store.get_reverse_destination(prefix)
    }

    pub fn get_stat_queue(&self, tenant: &str, id: &str) -> StorageResult<StatQueue> {
        self.store.get_stat_queue(tenant, id)
    }

    pub fn get_filter(&self, tenant: &str, id: &str) -> StorageResult<Filter> {
        ProfileStore::get_filter(self.store.as_ref(), tenant, id)
    }

    pub fn get_threshold(&self, tenant: &str, id: &str) -> StorageResult<Threshold> {
        self.store.get_threshold(tenant, id)
    }

    pub fn get_threshold_profile(&self, tenant: &str, id: &str) -> StorageResult<ThresholdProfile> {
        self.store.get_threshold_profile(tenant, id)
    }

    pub fn get_stat_queue_profile(&self, tenant: &str, id: &str) -> StorageResult<StatQueueProfile> {
        self.store.get_stat_queue_profile(tenant, id)
    }

    pub fn get_timing(&self, id: &str) -> StorageResult<Timing> {
        self.store.get_timing(id)
    }

    pub fn get_resource(&self, tenant: &str, id: &str) -> StorageResult<Resource> {
        self.store.get_resource(tenant, id)
    }

    pub fn get_resource_profile(&self, tenant: &str, id: &str) -> StorageResult<ResourceProfile> {
        self.store.get_resource_profile(tenant, id)
    }

    pub fn get_action_triggers(&self, id: &str) -> StorageResult<ActionTriggers> {
        self.store.get_action_triggers(id)
    }

    pub fn get_shared_group(&self, id: &str) -> StorageResult<SharedGroup> {
        self.store.get_shared_group(id)
    }

    pub fn get_actions(&self, id: &str) -> StorageResult<Vec<Action>> {
        self.store.get_actions(id)
    }

    pub fn get_action_plan(&self, id: &str) -> StorageResult<ActionPlan> {
        self.store.get_action_plan(id)
    }

    pub fn get_all_action_plans(&self) -> StorageResult<Vec<ActionPlan>> {
        self.store.all_action_plans()
    }

    pub fn get_account_action_plans(&self, account_id: &str) -> StorageResult<Vec<String>> {
        self.store.get_account_action_plans(account_id)
    }

    pub fn get_rating_plan(&self, id: &str) -> StorageResult<RatingPlan> {
        self.store.get_rating_plan(id)
    }

    pub fn get_rating_profile(&self, id: &str) -> StorageResult<RatingProfile> {
        self.store.get_rating_profile(id)
    }

    pub fn get_route_profile(&self, tenant: &str, id: &str) -> StorageResult<RouteProfile> {
        self.store.get_route_profile(tenant, id)
    }

    pub fn get_attribute_profile(&self, tenant: &str, id: &str) -> StorageResult<AttributeProfile> {
        self.store.get_attribute_profile(tenant, id)
    }

    pub fn get_charger_profile(&self, tenant: &str, id: &str) -> StorageResult<ChargerProfile> {
        self.store.get_charger_profile(tenant, id)
    }

    pub fn get_dispatcher_profile(&self, tenant: &str, id: &str) -> StorageResult<DispatcherProfile> {
        self.store.get_dispatcher_profile(tenant, id)
    }

    pub fn get_dispatcher_host(&self, tenant: &str, id: &str) -> StorageResult<DispatcherHost> {
        self.store.get_dispatcher_host(tenant, id)
    }

    pub fn get_item_load_ids(&self, item_id_prefix: &str) -> StorageResult<HashMap<String, i64>> {
        self.store.get_item_load_ids(item_id_prefix)
    }

    /// Bucket read, optionally narrowed to a key prefix
    pub fn get_indexes(
        &self,
        cache_id: &str,
        scope: &str,
        key_prefix: Option<&str>,
    ) -> StorageResult<IndexBucket> {
        self.store
            .get_indexes(cache_id, scope, key_prefix, true, key_prefix.is_none())
    }

    pub fn match_filter_index(
        &self,
        cache_id: &str,
        scope: &str,
        rule_type: &str,
        field: &str,
        value: &str,
    ) -> StorageResult<std::collections::BTreeSet<String>> {
        self.store
            .match_filter_index(cache_id, scope, rule_type, field, value)
    }

    // ==================
    // Entity writes
    // ==================

    pub fn set_account(&self, account: Account) -> StorageResult<&'static str> {
        self.store.set_account(account)?;
        Ok(OK)
    }

    pub fn set_destination(&self, destination: Destination) -> StorageResult<&'static str> {
        self.store.set_destination(destination)?;
        Ok(OK)
    }

    pub fn set_reverse_destination(
        &self,
        prefix: &str,
        dest_ids: Vec<String>,
    ) -> StorageResult<&'static str> {
        self.store.set_reverse_destination(prefix, dest_ids)?;
        Ok(OK)
    }

    pub fn set_stat_queue(&self, queue: StatQueue) -> StorageResult<&'static str> {
        self.store.set_stat_queue(queue)?;
        Ok(OK)
    }

    pub fn set_filter(&self, filter: Filter) -> StorageResult<&'static str> {
        self.store.set_filter(filter)?;
        Ok(OK)
    }

    pub fn set_threshold(&self, threshold: Threshold) -> StorageResult<&'static str> {
        self.store.set_threshold(threshold)?;
        Ok(OK)
    }

    pub fn set_threshold_profile(&self, profile: ThresholdProfile) -> StorageResult<&'static str> {
        self.store.set_threshold_profile(profile)?;
        Ok(OK)
    }

    pub fn set_stat_queue_profile(&self, profile: StatQueueProfile) -> StorageResult<&'static str> {
        self.store.set_stat_queue_profile(profile)?;
        Ok(OK)
    }

    pub fn set_timing(&self, timing: Timing) -> StorageResult<&'static str> {
        self.store.set_timing(timing)?;
        Ok(OK)
    }

    pub fn set_resource(&self, resource: Resource) -> StorageResult<&'static str> {
        self.store.set_resource(resource)?;
        Ok(OK)
    }

    pub fn set_resource_profile(&self, profile: ResourceProfile) -> StorageResult<&'static str> {
        self.store.set_resource_profile(profile)?;
        Ok(OK)
    }

    pub fn set_action_triggers(&self, triggers: ActionTriggers) -> StorageResult<&'static str> {
        self.store.set_action_triggers(triggers)?;
        Ok(OK)
    }

    pub fn set_shared_group(&self, group: SharedGroup) -> StorageResult<&'static str> {
        self.store.set_shared_group(group)?;
        Ok(OK)
    }

    pub fn set_actions(&self, id: &str, actions: Vec<Action>) -> StorageResult<&'static str> {
        self.store.set_actions(id, actions)?;
        Ok(OK)
    }

    pub fn set_action_plan(&self, plan: ActionPlan) -> StorageResult<&'static str> {
        self.store.set_action_plan(plan)?;
        Ok(OK)
    }

    pub fn set_account_action_plans(
        &self,
        account_id: &str,
        plan_ids: Vec<String>,
    ) -> StorageResult<&'static str> {
        self.store.set_account_action_plans(account_id, plan_ids)?;
        Ok(OK)
    }

    pub fn set_rating_plan(&self, plan: RatingPlan) -> StorageResult<&'static str> {
        self.store.set_rating_plan(plan)?;
        Ok(OK)
    }

    pub fn set_rating_profile(&self, profile: RatingProfile) -> StorageResult<&'static str> {
        self.store.set_rating_profile(profile)?;
        Ok(OK)
    }

    pub fn set_route_profile(&self, profile: RouteProfile) -> StorageResult<&'static str> {
        self.store.set_route_profile(profile)?;
        Ok(OK)
    }

    pub fn set_attribute_profile(&self, profile: AttributeProfile) -> StorageResult<&'static str> {
        self.store.set_attribute_profile(profile)?;
        Ok(OK)
    }

    pub fn set_charger_profile(&self, profile: ChargerProfile) -> StorageResult<&'static str> {
        self.store.set_charger_profile(profile)?;
        Ok(OK)
    }

    pub fn set_dispatcher_profile(&self, profile: DispatcherProfile) -> StorageResult<&'static str> {
        self.store.set_dispatcher_profile(profile)?;
        Ok(OK)
    }

    pub fn set_dispatcher_host(&self, host: DispatcherHost) -> StorageResult<&'static str> {
        self.store.set_dispatcher_host(host)?;
        Ok(OK)
    }

    pub fn set_load_ids(&self, stamps: HashMap<String, i64>) -> StorageResult<&'static str> {
        self.store.set_load_ids(stamps)?;
        Ok(OK)
    }

    /// Direct bucket write, immediately visible
    pub fn set_indexes(
        &self,
        cache_id: &str,
        scope: &str,
        indexes: IndexBucket,
    ) -> StorageResult<&'static str> {
        self.store
            .set_indexes(cache_id, scope, indexes, false, NON_TRANSACTIONAL)?;
        Ok(OK)
    }
}
