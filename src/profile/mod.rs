//! Profile Model
//!
//! The seven profile kinds selected through filter indexes, the
//! `ItemType` strategy table that makes the index machinery generic over
//! them, and the auxiliary entities carried by the replication facade.

mod entities;
mod types;

pub use entities::{
    Account, Action, ActionPlan, ActionTriggers, Destination, DispatcherHost, RatingPlan,
    RatingProfile, Resource, SharedGroup, StatQueue, Threshold, Timing,
};
pub use types::{
    AttributeProfile, ChargerProfile, DispatcherProfile, ResourceProfile, RouteProfile,
    StatQueueProfile, ThresholdProfile,
};

/// Meta tags accepted by the admin API for item-type selection
pub const META_THRESHOLDS: &str = "*thresholds";
pub const META_STATS: &str = "*stats";
pub const META_RESOURCES: &str = "*resources";
pub const META_ROUTES: &str = "*routes";
pub const META_ATTRIBUTES: &str = "*attributes";
pub const META_CHARGERS: &str = "*chargers";
pub const META_DISPATCHERS: &str = "*dispatchers";

/// One indexed profile kind.
///
/// All seven kinds share the index machinery; they differ only in where
/// their filter IDs come from and whether their indexes are partitioned
/// per context. Those differences live here as a method table instead of
/// per-type branching spread through the builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemType {
    Thresholds,
    Stats,
    Resources,
    Routes,
    Attributes,
    Chargers,
    Dispatchers,
}

impl ItemType {
    pub const ALL: [ItemType; 7] = [
        ItemType::Thresholds,
        ItemType::Stats,
        ItemType::Resources,
        ItemType::Routes,
        ItemType::Attributes,
        ItemType::Chargers,
        ItemType::Dispatchers,
    ];

    /// Resolves the API meta tag (`*thresholds`, ...) to an item type
    pub fn from_meta(meta: &str) -> Option<Self> {
        match meta {
            META_THRESHOLDS => Some(Self::Thresholds),
            META_STATS => Some(Self::Stats),
            META_RESOURCES => Some(Self::Resources),
            META_ROUTES => Some(Self::Routes),
            META_ATTRIBUTES => Some(Self::Attributes),
            META_CHARGERS => Some(Self::Chargers),
            META_DISPATCHERS => Some(Self::Dispatchers),
            _ => None,
        }
    }

    pub fn meta(&self) -> &'static str {
        match self {
            Self::Thresholds => META_THRESHOLDS,
            Self::Stats => META_STATS,
            Self::Resources => META_RESOURCES,
            Self::Routes => META_ROUTES,
            Self::Attributes => META_ATTRIBUTES,
            Self::Chargers => META_CHARGERS,
            Self::Dispatchers => META_DISPATCHERS,
        }
    }

    /// Cache instance holding this kind's filter indexes
    pub fn index_cache_id(&self) -> &'static str {
        match self {
            Self::Thresholds => "threshold_filter_indexes",
            Self::Stats => "stat_filter_indexes",
            Self::Resources => "resource_filter_indexes",
            Self::Routes => "route_filter_indexes",
            Self::Attributes => "attribute_filter_indexes",
            Self::Chargers => "charger_filter_indexes",
            Self::Dispatchers => "dispatcher_filter_indexes",
        }
    }

    /// Cache instance holding this kind's profiles
    pub fn profile_cache_id(&self) -> &'static str {
        match self {
            Self::Thresholds => "threshold_profiles",
            Self::Stats => "statqueue_profiles",
            Self::Resources => "resource_profiles",
            Self::Routes => "route_profiles",
            Self::Attributes => "attribute_profiles",
            Self::Chargers => "charger_profiles",
            Self::Dispatchers => "dispatcher_profiles",
        }
    }

    /// Resolves a profile cache instance back to its item type
    pub fn from_profile_cache_id(cache_id: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|item_type| item_type.profile_cache_id() == cache_id)
    }

    /// Resolves an index cache instance back to its item type
    pub fn from_index_cache_id(cache_id: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|item_type| item_type.index_cache_id() == cache_id)
    }

    /// Attribute and Dispatcher indexes are partitioned per context;
    /// every other kind uses a single implicit context
    pub fn context_scoped(&self) -> bool {
        matches!(self, Self::Attributes | Self::Dispatchers)
    }
}

/// Builds the `tenant` or `tenant:context` scope key of an index bucket
pub fn scope_key(tenant: &str, context: Option<&str>) -> String {
    match context {
        Some(ctx) => format!("{tenant}:{ctx}"),
        None => tenant.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meta_roundtrip() {
        for item_type in ItemType::ALL {
            assert_eq!(ItemType::from_meta(item_type.meta()), Some(item_type));
        }
    }

    #[test]
    fn cache_id_roundtrip() {
        for item_type in ItemType::ALL {
            assert_eq!(
                ItemType::from_index_cache_id(item_type.index_cache_id()),
                Some(item_type)
            );
            assert_eq!(
                ItemType::from_profile_cache_id(item_type.profile_cache_id()),
                Some(item_type)
            );
        }
    }

    #[test]
    fn only_attributes_and_dispatchers_carry_context() {
        assert!(ItemType::Attributes.context_scoped());
        assert!(ItemType::Dispatchers.context_scoped());
        assert!(!ItemType::Thresholds.context_scoped());
        assert!(!ItemType::Routes.context_scoped());
    }
}
