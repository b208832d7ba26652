//! Admin service over the index engine.
//!
//! Batch recomputes run staged under a generated transaction ID and
//! commit per item type, so a failing type leaves every other type's
//! live bucket untouched and readers never observe a half-built one.

use std::sync::Arc;

use uuid::Uuid;

use crate::index::{
    account_action_plan_health, commit_indexes, compute_indexes, filter_index_health,
    get_filter_indexes, remove_filter_indexes, reverse_destination_health,
    AccountActionPlanHealthReport, FilterHealthReport, IndexError, IndexResult,
    ReverseDestinationHealthReport,
};
use crate::observability::Logger;
use crate::profile::ItemType;
use crate::replication::OK;
use crate::storage::{DataStore, NON_TRANSACTIONAL};

use super::request::{
    ArgsComputeFilterIndexIDs, ArgsComputeFilterIndexes, AttrGetFilterIndexes,
    AttrRemFilterIndexes, IndexHealthArgs,
};

pub struct AdminApi {
    store: Arc<DataStore>,
}

impl AdminApi {
    pub fn new(store: Arc<DataStore>) -> Self {
        Self { store }
    }

    fn item_type_of(meta: &str) -> IndexResult<ItemType> {
        ItemType::from_meta(meta)
            .ok_or_else(|| IndexError::MandatoryIeMissing("ItemType".to_string()))
    }

    fn require_tenant(tenant: &str) -> IndexResult<()> {
        if tenant.is_empty() {
            return Err(IndexError::MandatoryIeMissing("Tenant".to_string()));
        }
        Ok(())
    }

    fn context_for(item_type: ItemType, context: Option<&str>) -> Option<String> {
        if item_type.context_scoped() {
            context.map(str::to_string)
        } else {
            None
        }
    }

    /// Query and removal address one bucket, so context-scoped kinds
    /// cannot do without a context
    fn require_context(
        item_type: ItemType,
        context: Option<&str>,
    ) -> IndexResult<Option<String>> {
        if !item_type.context_scoped() {
            return Ok(None);
        }
        match context {
            Some(ctx) => Ok(Some(ctx.to_string())),
            None => Err(IndexError::MandatoryIeMissing("Context".to_string())),
        }
    }

    /// Returns `type:field:value:itemID` entries of one scope, narrowed
    /// and paginated per the arguments
    pub fn get_filter_indexes(&self, args: &AttrGetFilterIndexes) -> IndexResult<Vec<String>> {
        Self::require_tenant(&args.tenant)?;
        let item_type = Self::item_type_of(&args.item_type)?;
        let context = Self::require_context(item_type, args.context.as_deref())?;
        get_filter_indexes(
            self.store.as_ref(),
            item_type,
            &args.tenant,
            context.as_deref(),
            args.filter_type.as_deref(),
            args.filter_field.as_deref(),
            args.filter_value.as_deref(),
            Some(&args.paginator),
        )
    }

    /// Drops one scope's bucket entirely, forward and reverse
    pub fn remove_filter_indexes(&self, args: &AttrRemFilterIndexes) -> IndexResult<&'static str> {
        Self::require_tenant(&args.tenant)?;
        let item_type = Self::item_type_of(&args.item_type)?;
        let context = Self::require_context(item_type, args.context.as_deref())?;
        remove_filter_indexes(
            self.store.as_ref(),
            item_type,
            &args.tenant,
            context.as_deref(),
        )?;
        Logger::info(
            "filter_indexes_removed",
            &[("tenant", args.tenant.as_str()), ("item_type", args.item_type.as_str())],
        );
        Ok(OK)
    }

    /// Rebuilds the selected item types from scratch.
    ///
    /// Each type computes and commits independently; the first hard
    /// error is returned but already-committed types stay committed,
    /// re-running per type is safe and idempotent.
    pub fn compute_filter_indexes(
        &self,
        args: &ArgsComputeFilterIndexes,
    ) -> IndexResult<&'static str> {
        Self::require_tenant(&args.tenant)?;
        let selected: Vec<(ItemType, bool)> = vec![
            (ItemType::Thresholds, args.thresholds),
            (ItemType::Stats, args.stats),
            (ItemType::Resources, args.resources),
            (ItemType::Routes, args.routes),
            (ItemType::Attributes, args.attributes),
            (ItemType::Chargers, args.chargers),
            (ItemType::Dispatchers, args.dispatchers),
        ];
        for (item_type, wanted) in selected {
            if !wanted {
                continue;
            }
            self.recompute_type(item_type, &args.tenant, args.context.as_deref())?;
        }
        Ok(OK)
    }

    fn recompute_type(
        &self,
        item_type: ItemType,
        tenant: &str,
        context: Option<&str>,
    ) -> IndexResult<()> {
        let context = Self::context_for(item_type, context);
        let transaction_id = Uuid::new_v4().to_string();
        let indexed = match compute_indexes(
            self.store.as_ref(),
            item_type,
            tenant,
            context.as_deref(),
            None,
            &transaction_id,
        ) {
            Ok(indexed) => indexed,
            Err(err) => {
                if !err.is_not_found() {
                    let detail = err.to_string();
                    Logger::error(
                        "filter_index_compute_failed",
                        &[
                            ("tenant", tenant),
                            ("item_type", item_type.meta()),
                            ("error", detail.as_str()),
                        ],
                    );
                }
                return Err(err);
            }
        };
        if !indexed {
            return Ok(());
        }
        commit_indexes(
            self.store.as_ref(),
            item_type,
            tenant,
            context.as_deref(),
            &transaction_id,
        )?;
        Logger::info(
            "filter_indexes_computed",
            &[("tenant", tenant), ("item_type", item_type.meta())],
        );
        Ok(())
    }

    /// Re-indexes only the named items of each selected type, applied
    /// as immediate deltas against the live buckets
    pub fn compute_filter_index_ids(
        &self,
        args: &ArgsComputeFilterIndexIDs,
    ) -> IndexResult<&'static str> {
        Self::require_tenant(&args.tenant)?;
        let selected: Vec<(ItemType, Option<&Vec<String>>)> = vec![
            (ItemType::Thresholds, args.threshold_ids.as_ref()),
            (ItemType::Stats, args.stat_ids.as_ref()),
            (ItemType::Resources, args.resource_ids.as_ref()),
            (ItemType::Routes, args.route_ids.as_ref()),
            (ItemType::Attributes, args.attribute_ids.as_ref()),
            (ItemType::Chargers, args.charger_ids.as_ref()),
            (ItemType::Dispatchers, args.dispatcher_ids.as_ref()),
        ];
        for (item_type, ids) in selected {
            let ids = match ids {
                Some(ids) if !ids.is_empty() => ids,
                _ => continue,
            };
            let context = Self::context_for(item_type, args.context.as_deref());
            compute_indexes(
                self.store.as_ref(),
                item_type,
                &args.tenant,
                context.as_deref(),
                Some(ids),
                NON_TRANSACTIONAL,
            )?;
        }
        Ok(OK)
    }

    /// Two-way audit of one item type's stored indexes
    pub fn get_filter_indexes_health(
        &self,
        item_type_meta: &str,
        args: &IndexHealthArgs,
    ) -> IndexResult<FilterHealthReport> {
        let item_type = Self::item_type_of(item_type_meta)?;
        filter_index_health(self.store.as_ref(), item_type, args.limits)
    }

    pub fn get_account_action_plans_index_health(
        &self,
    ) -> IndexResult<AccountActionPlanHealthReport> {
        account_action_plan_health(self.store.as_ref())
    }

    pub fn get_reverse_destinations_index_health(
        &self,
    ) -> IndexResult<ReverseDestinationHealthReport> {
        reverse_destination_health(self.store.as_ref())
    }
}
