//! Inverted filter-index engine.
//!
//! Profiles reference filters; filters carry rules; index-eligible
//! rules become `type:field:value` keys pointing back at the profile
//! IDs they select. The modules here build, query, maintain and audit
//! those indexes.

pub mod builder;
pub mod codec;
pub mod errors;
pub mod health;
pub mod query;

pub use builder::{
    commit_indexes, compute_indexes, expected_index_keys, remove_item_indexes, set_item_indexes,
};
pub use codec::{decode_key, encode_key, is_index_eligible, keys_for_rule, sentinel_key};
pub use errors::{IndexError, IndexResult};
pub use health::{
    account_action_plan_health, filter_index_health, reverse_destination_health,
    AccountActionPlanHealthReport, FilterHealthReport, HealthCheckLimits,
    ReverseDestinationHealthReport,
};
pub use query::{get_filter_indexes, remove_filter_indexes, Paginator};
