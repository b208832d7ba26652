//! Index query engine.
//!
//! Narrows a full bucket through up to three stages, each applied to
//! the survivors of the previous one. A stage that empties the result
//! is a not-found, not an empty list.

use serde::{Deserialize, Serialize};

use crate::profile::{scope_key, ItemType};
use crate::storage::{IndexStore, REVERSE_FILTER_INDEXES};

use super::codec::{decode_key, KEY_SEP};
use super::errors::{IndexError, IndexResult};

/// Result-window request, applied after narrowing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Paginator {
    #[serde(rename = "Limit", default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    #[serde(rename = "Offset", default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,
}

impl Paginator {
    fn apply(&self, entries: Vec<String>) -> Vec<String> {
        let offset = self.offset.unwrap_or(0);
        let limit = self.limit.unwrap_or(usize::MAX);
        entries.into_iter().skip(offset).take(limit).collect()
    }
}

/// Returns the bucket's entries as `type:field:value:itemID` strings,
/// narrowed by rule type prefix, field substring and value substring
pub fn get_filter_indexes<S: IndexStore + ?Sized>(
    store: &S,
    item_type: ItemType,
    tenant: &str,
    context: Option<&str>,
    filter_type: Option<&str>,
    field_contains: Option<&str>,
    value_contains: Option<&str>,
    paginator: Option<&Paginator>,
) -> IndexResult<Vec<String>> {
    let scope = scope_key(tenant, context);
    let bucket = store.get_indexes(item_type.index_cache_id(), &scope, None, true, true)?;

    let mut keys: Vec<&String> = bucket.keys().collect();
    if let Some(rule_type) = filter_type {
        let prefix = format!("{rule_type}{KEY_SEP}");
        keys.retain(|key| key.starts_with(&prefix));
        if keys.is_empty() {
            return Err(IndexError::NotFound);
        }
    }
    if let Some(needle) = field_contains {
        keys = retain_decoded(keys, |field, _| field.contains(needle))?;
    }
    if let Some(needle) = value_contains {
        keys = retain_decoded(keys, |_, value| value.contains(needle))?;
    }

    let mut entries = Vec::new();
    for key in keys {
        for item_id in &bucket[key] {
            entries.push(format!("{key}{KEY_SEP}{item_id}"));
        }
    }
    entries.sort();
    if let Some(paginator) = paginator {
        entries = paginator.apply(entries);
    }
    Ok(entries)
}

fn retain_decoded<'a>(
    keys: Vec<&'a String>,
    pred: impl Fn(&str, &str) -> bool,
) -> IndexResult<Vec<&'a String>> {
    let mut kept = Vec::with_capacity(keys.len());
    for key in keys {
        let (_, field, value) = decode_key(key)?;
        if pred(&field, &value) {
            kept.push(key);
        }
    }
    if kept.is_empty() {
        return Err(IndexError::NotFound);
    }
    Ok(kept)
}

/// Drops the whole bucket for a scope, forward and reverse sides both.
/// Run before a full recompute so no stale keys survive.
pub fn remove_filter_indexes<S: IndexStore + ?Sized>(
    store: &S,
    item_type: ItemType,
    tenant: &str,
    context: Option<&str>,
) -> IndexResult<()> {
    let scope = scope_key(tenant, context);
    store.remove_indexes(item_type.index_cache_id(), &scope, None)?;
    store.remove_indexes(REVERSE_FILTER_INDEXES, &scope, None)?;
    Ok(())
}
