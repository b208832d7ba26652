//! Index Store Adapter
//!
//! The narrow interface the index engine uses against the storage
//! engine. Buckets are addressed by `(cache_id, scope)` where the scope
//! is `tenant` or `tenant:context`. A non-empty transaction ID stages
//! writes in a shadow bucket which replaces the live one atomically on
//! commit, so concurrent readers never observe a half-rebuilt index.

use std::collections::{BTreeMap, BTreeSet};

use crate::filter::Filter;
use crate::profile::ItemType;

use super::errors::StorageResult;

/// The empty transaction ID: writes are applied and visible immediately
pub const NON_TRANSACTIONAL: &str = "";

/// Cache instance holding the reverse (`itemID -> index keys`) mapping,
/// scoped identically to the forward bucket it mirrors
pub const REVERSE_FILTER_INDEXES: &str = "reverse_filter_indexes";

/// One index bucket: `type:field:value` key to the profile IDs it selects
pub type IndexBucket = BTreeMap<String, BTreeSet<String>>;

/// Raw index primitives the engine consumes.
pub trait IndexStore {
    /// Loads entries of a bucket. `include_all` returns the whole
    /// bucket; otherwise `key_prefix` narrows the scan and
    /// `include_sentinel` controls whether the `*none:*any:*any` key is
    /// part of the result. Empty results map to `NotFound`.
    fn get_indexes(
        &self,
        cache_id: &str,
        scope: &str,
        key_prefix: Option<&str>,
        include_sentinel: bool,
        include_all: bool,
    ) -> StorageResult<IndexBucket>;

    /// Writes entries into a bucket. An empty ID set removes the key.
    /// With a non-empty `transaction_id` the write goes to the staging
    /// bucket until `commit` is set, at which point the staged content
    /// replaces the live bucket wholesale.
    fn set_indexes(
        &self,
        cache_id: &str,
        scope: &str,
        indexes: IndexBucket,
        commit: bool,
        transaction_id: &str,
    ) -> StorageResult<()>;

    /// Drops a bucket, or only the keys under `key_prefix`
    fn remove_indexes(
        &self,
        cache_id: &str,
        scope: &str,
        key_prefix: Option<&str>,
    ) -> StorageResult<()>;

    /// Point lookup of one `type:field:value` entry
    fn match_filter_index(
        &self,
        cache_id: &str,
        scope: &str,
        rule_type: &str,
        field: &str,
        value: &str,
    ) -> StorageResult<BTreeSet<String>>;

    /// All scopes holding a live bucket for the cache instance
    fn index_scopes(&self, cache_id: &str) -> StorageResult<Vec<String>>;
}

/// Profile/filter reads the index engine depends on.
pub trait ProfileStore {
    fn get_filter(&self, tenant: &str, id: &str) -> StorageResult<Filter>;

    /// IDs of every profile of the kind under the tenant
    fn profile_ids(&self, item_type: ItemType, tenant: &str) -> StorageResult<Vec<String>>;

    /// `(tenant, id)` of every profile of the kind, across tenants
    fn profile_keys(&self, item_type: ItemType) -> StorageResult<Vec<(String, String)>>;

    /// Filter IDs of one profile. `Ok(None)` means the profile exists
    /// but is not active in the given context; `NotFound` means the
    /// profile is gone.
    fn filter_ids_of(
        &self,
        item_type: ItemType,
        tenant: &str,
        id: &str,
        context: Option<&str>,
    ) -> StorageResult<Option<Vec<String>>>;

    /// Declared contexts of a context-scoped profile (empty for the
    /// single-context kinds)
    fn contexts_of(&self, item_type: ItemType, tenant: &str, id: &str)
        -> StorageResult<Vec<String>>;
}
