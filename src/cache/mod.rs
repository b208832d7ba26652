//! Cache-reload composition.
//!
//! After a single profile mutation the caller must tell cache
//! subscribers which entries to refresh: the item's own cache key plus
//! the index-cache keys the item now contributes. The derivation here
//! matches the index builder's exactly, without rescanning the tenant.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::index::{expected_index_keys, IndexResult};
use crate::profile::{scope_key, ItemType};
use crate::storage::ProfileStore;

/// Cache keys to refresh after one item mutation, grouped per cache
/// instance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReloadArgs {
    #[serde(rename = "Tenant")]
    pub tenant: String,
    #[serde(rename = "ArgsCache")]
    pub cache_keys: BTreeMap<String, Vec<String>>,
}

/// Composes the reload hints for one mutated item.
///
/// `filter_ids` of `None` means the item was removed; only its direct
/// cache key is produced since index removal is handled separately. An
/// empty list derives the sentinel key, one per context for
/// context-scoped caches.
pub fn compose_args_reload<S: ProfileStore + ?Sized>(
    store: &S,
    tenant: &str,
    cache_id: &str,
    item_id: &str,
    filter_ids: Option<&[String]>,
    contexts: &[String],
) -> IndexResult<ReloadArgs> {
    let mut args = ReloadArgs {
        tenant: tenant.to_string(),
        cache_keys: BTreeMap::new(),
    };
    args.cache_keys
        .insert(cache_id.to_string(), vec![format!("{tenant}:{item_id}")]);

    let filter_ids = match filter_ids {
        Some(ids) => ids,
        None => return Ok(args),
    };
    let item_type = match ItemType::from_profile_cache_id(cache_id) {
        Some(item_type) => item_type,
        // not an indexed kind, nothing derived
        None => return Ok(args),
    };

    let keys = expected_index_keys(store, item_type, tenant, item_id, filter_ids)?;
    let scopes: Vec<String> = if item_type.context_scoped() {
        contexts
            .iter()
            .map(|ctx| scope_key(tenant, Some(ctx)))
            .collect()
    } else {
        vec![scope_key(tenant, None)]
    };
    let mut derived = Vec::new();
    for scope in &scopes {
        for key in &keys {
            derived.push(format!("{scope}:{key}"));
        }
    }
    if !derived.is_empty() {
        args.cache_keys
            .insert(item_type.index_cache_id().to_string(), derived);
    }
    Ok(args)
}
