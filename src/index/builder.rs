//! Index builder.
//!
//! Computes forward (`key -> item IDs`) and reverse (`item ID -> keys`)
//! indexes from profile filter lists. Full recomputes run under a
//! transaction ID so readers keep the previous bucket until commit;
//! single-item updates apply only the delta between the item's old and
//! new reverse entries, leaving keys contributed by other items alone.

use std::collections::{BTreeMap, BTreeSet};

use crate::filter::{is_inline_filter, Filter};
use crate::profile::{scope_key, ItemType};
use crate::storage::{
    IndexBucket, IndexStore, ProfileStore, StorageError, NON_TRANSACTIONAL, REVERSE_FILTER_INDEXES,
};

use super::codec::{keys_for_rules, sentinel_key};
use super::errors::{IndexError, IndexResult};

/// Index keys an item with the given filter list must be stored under.
///
/// An empty filter list yields the sentinel key. A filter ID that does
/// not resolve is a broken reference and aborts the computation.
pub fn expected_index_keys<S: ProfileStore + ?Sized>(
    store: &S,
    item_type: ItemType,
    tenant: &str,
    item_id: &str,
    filter_ids: &[String],
) -> IndexResult<BTreeSet<String>> {
    if filter_ids.is_empty() {
        let mut keys = BTreeSet::new();
        keys.insert(sentinel_key());
        return Ok(keys);
    }
    let mut keys = BTreeSet::new();
    for filter_id in filter_ids {
        let filter = resolve_filter(store, tenant, filter_id).map_err(|err| {
            if err.is_not_found() {
                IndexError::BrokenReference {
                    filter_id: filter_id.clone(),
                    item_type: item_type.meta().to_string(),
                    item_id: item_id.to_string(),
                }
            } else {
                err
            }
        })?;
        keys.extend(keys_for_rules(&filter.rules));
    }
    Ok(keys)
}

/// Inline filter IDs are parsed on the fly, stored ones are fetched
fn resolve_filter<S: ProfileStore + ?Sized>(
    store: &S,
    tenant: &str,
    filter_id: &str,
) -> IndexResult<Filter> {
    if is_inline_filter(filter_id) {
        return Ok(Filter::from_inline(tenant, filter_id)?);
    }
    Ok(store.get_filter(tenant, filter_id)?)
}

/// Stored reverse entry of an item, empty when the item was never indexed
fn reverse_keys_of<S: IndexStore + ?Sized>(
    store: &S,
    scope: &str,
    item_id: &str,
) -> IndexResult<BTreeSet<String>> {
    match store.get_indexes(REVERSE_FILTER_INDEXES, scope, Some(item_id), false, false) {
        Ok(bucket) => Ok(bucket.get(item_id).cloned().unwrap_or_default()),
        Err(StorageError::NotFound) => Ok(BTreeSet::new()),
        Err(err) => Err(err.into()),
    }
}

/// Live member set of a forward key, empty when the key is absent
fn members_of<S: IndexStore + ?Sized>(
    store: &S,
    cache_id: &str,
    scope: &str,
    key: &str,
) -> IndexResult<BTreeSet<String>> {
    match store.get_indexes(cache_id, scope, Some(key), true, false) {
        Ok(bucket) => Ok(bucket.get(key).cloned().unwrap_or_default()),
        Err(StorageError::NotFound) => Ok(BTreeSet::new()),
        Err(err) => Err(err.into()),
    }
}

/// Re-indexes a single item after its filter list changed.
///
/// Only the symmetric difference between the old and new key sets is
/// written, immediately visible to readers.
pub fn set_item_indexes<S: IndexStore + ProfileStore + ?Sized>(
    store: &S,
    item_type: ItemType,
    tenant: &str,
    context: Option<&str>,
    item_id: &str,
    filter_ids: &[String],
) -> IndexResult<()> {
    let new_keys = expected_index_keys(store, item_type, tenant, item_id, filter_ids)?;
    apply_item_delta(store, item_type, tenant, context, item_id, new_keys)
}

/// Drops every index entry a removed item contributed
pub fn remove_item_indexes<S: IndexStore + ProfileStore + ?Sized>(
    store: &S,
    item_type: ItemType,
    tenant: &str,
    context: Option<&str>,
    item_id: &str,
) -> IndexResult<()> {
    apply_item_delta(store, item_type, tenant, context, item_id, BTreeSet::new())
}

fn apply_item_delta<S: IndexStore + ?Sized>(
    store: &S,
    item_type: ItemType,
    tenant: &str,
    context: Option<&str>,
    item_id: &str,
    new_keys: BTreeSet<String>,
) -> IndexResult<()> {
    let cache_id = item_type.index_cache_id();
    let scope = scope_key(tenant, context);
    let old_keys = reverse_keys_of(store, &scope, item_id)?;

    let mut forward_delta: IndexBucket = BTreeMap::new();
    for key in old_keys.difference(&new_keys) {
        let mut members = members_of(store, cache_id, &scope, key)?;
        members.remove(item_id);
        forward_delta.insert(key.clone(), members);
    }
    for key in new_keys.difference(&old_keys) {
        let mut members = members_of(store, cache_id, &scope, key)?;
        members.insert(item_id.to_string());
        forward_delta.insert(key.clone(), members);
    }
    if !forward_delta.is_empty() {
        store.set_indexes(cache_id, &scope, forward_delta, false, NON_TRANSACTIONAL)?;
    }
    let mut reverse_delta: IndexBucket = BTreeMap::new();
    reverse_delta.insert(item_id.to_string(), new_keys);
    store.set_indexes(
        REVERSE_FILTER_INDEXES,
        &scope,
        reverse_delta,
        false,
        NON_TRANSACTIONAL,
    )?;
    Ok(())
}

/// Recomputes filter indexes for one item type under a tenant/context.
///
/// With an explicit item list only those items are re-indexed, as a
/// delta against the live bucket. Without one the whole scope is
/// rebuilt from scratch; a non-empty transaction ID stages the rebuild
/// for a later commit, the non-transactional ID replaces the bucket
/// directly.
///
/// Returns false when no candidate items exist, which callers use to
/// skip the commit step.
pub fn compute_indexes<S: IndexStore + ProfileStore + ?Sized>(
    store: &S,
    item_type: ItemType,
    tenant: &str,
    context: Option<&str>,
    item_ids: Option<&[String]>,
    transaction_id: &str,
) -> IndexResult<bool> {
    let candidates: Vec<String> = match item_ids {
        Some(ids) => ids.to_vec(),
        None => match store.profile_ids(item_type, tenant) {
            Ok(ids) => ids,
            Err(StorageError::NotFound) => Vec::new(),
            Err(err) => return Err(err.into()),
        },
    };
    if candidates.is_empty() {
        return Ok(false);
    }

    if item_ids.is_some() {
        let mut indexed = false;
        for item_id in &candidates {
            let filter_ids = match store.filter_ids_of(item_type, tenant, item_id, context) {
                Ok(Some(ids)) => ids,
                // not active in this context
                Ok(None) => continue,
                // object vanished between enumeration and resolution
                Err(StorageError::NotFound) => continue,
                Err(err) => return Err(err.into()),
            };
            set_item_indexes(store, item_type, tenant, context, item_id, &filter_ids)?;
            indexed = true;
        }
        return Ok(indexed);
    }

    let mut forward: IndexBucket = BTreeMap::new();
    let mut reverse: IndexBucket = BTreeMap::new();
    for item_id in &candidates {
        let filter_ids = match store.filter_ids_of(item_type, tenant, item_id, context) {
            Ok(Some(ids)) => ids,
            Ok(None) => continue,
            Err(StorageError::NotFound) => continue,
            Err(err) => return Err(err.into()),
        };
        let keys = expected_index_keys(store, item_type, tenant, item_id, &filter_ids)?;
        for key in &keys {
            forward
                .entry(key.clone())
                .or_default()
                .insert(item_id.clone());
        }
        reverse.insert(item_id.clone(), keys);
    }
    if reverse.is_empty() {
        return Ok(false);
    }

    let cache_id = item_type.index_cache_id();
    let scope = scope_key(tenant, context);
    if transaction_id == NON_TRANSACTIONAL {
        store.remove_indexes(cache_id, &scope, None)?;
        store.remove_indexes(REVERSE_FILTER_INDEXES, &scope, None)?;
    }
    store.set_indexes(cache_id, &scope, forward, false, transaction_id)?;
    store.set_indexes(
        REVERSE_FILTER_INDEXES,
        &scope,
        reverse,
        false,
        transaction_id,
    )?;
    Ok(true)
}

/// Publishes a staged rebuild, replacing the live buckets wholesale
pub fn commit_indexes<S: IndexStore + ?Sized>(
    store: &S,
    item_type: ItemType,
    tenant: &str,
    context: Option<&str>,
    transaction_id: &str,
) -> IndexResult<()> {
    let scope = scope_key(tenant, context);
    store.set_indexes(
        item_type.index_cache_id(),
        &scope,
        BTreeMap::new(),
        true,
        transaction_id,
    )?;
    store.set_indexes(
        REVERSE_FILTER_INDEXES,
        &scope,
        BTreeMap::new(),
        true,
        transaction_id,
    )?;
    Ok(())
}
