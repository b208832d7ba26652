//! Argument structs of the admin surface, serde-shaped for the wire.

use serde::{Deserialize, Serialize};

use crate::index::{HealthCheckLimits, Paginator};

/// Query arguments for one item type's filter indexes
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttrGetFilterIndexes {
    #[serde(rename = "Tenant")]
    pub tenant: String,
    #[serde(rename = "Context", default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// Meta tag of the indexed kind, `*thresholds`, `*attributes`, ...
    #[serde(rename = "ItemType")]
    pub item_type: String,
    #[serde(rename = "FilterType", default, skip_serializing_if = "Option::is_none")]
    pub filter_type: Option<String>,
    #[serde(rename = "FilterField", default, skip_serializing_if = "Option::is_none")]
    pub filter_field: Option<String>,
    #[serde(rename = "FilterValue", default, skip_serializing_if = "Option::is_none")]
    pub filter_value: Option<String>,
    #[serde(flatten)]
    pub paginator: Paginator,
}

/// Removal arguments, one whole scope at a time
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttrRemFilterIndexes {
    #[serde(rename = "Tenant")]
    pub tenant: String,
    #[serde(rename = "Context", default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(rename = "ItemType")]
    pub item_type: String,
}

/// Full per-type recompute selection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArgsComputeFilterIndexes {
    #[serde(rename = "Tenant")]
    pub tenant: String,
    #[serde(rename = "Context", default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(rename = "ThresholdS", default)]
    pub thresholds: bool,
    #[serde(rename = "StatS", default)]
    pub stats: bool,
    #[serde(rename = "ResourceS", default)]
    pub resources: bool,
    #[serde(rename = "RouteS", default)]
    pub routes: bool,
    #[serde(rename = "AttributeS", default)]
    pub attributes: bool,
    #[serde(rename = "ChargerS", default)]
    pub chargers: bool,
    #[serde(rename = "DispatcherS", default)]
    pub dispatchers: bool,
}

/// Subset recompute, explicit item IDs per type
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArgsComputeFilterIndexIDs {
    #[serde(rename = "Tenant")]
    pub tenant: String,
    #[serde(rename = "Context", default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(rename = "ThresholdIDs", default, skip_serializing_if = "Option::is_none")]
    pub threshold_ids: Option<Vec<String>>,
    #[serde(rename = "StatIDs", default, skip_serializing_if = "Option::is_none")]
    pub stat_ids: Option<Vec<String>>,
    #[serde(rename = "ResourceIDs", default, skip_serializing_if = "Option::is_none")]
    pub resource_ids: Option<Vec<String>>,
    #[serde(rename = "RouteIDs", default, skip_serializing_if = "Option::is_none")]
    pub route_ids: Option<Vec<String>>,
    #[serde(rename = "AttributeIDs", default, skip_serializing_if = "Option::is_none")]
    pub attribute_ids: Option<Vec<String>>,
    #[serde(rename = "ChargerIDs", default, skip_serializing_if = "Option::is_none")]
    pub charger_ids: Option<Vec<String>>,
    #[serde(rename = "DispatcherIDs", default, skip_serializing_if = "Option::is_none")]
    pub dispatcher_ids: Option<Vec<String>>,
}

/// Cache-size limits for the health scans
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexHealthArgs {
    #[serde(flatten)]
    pub limits: HealthCheckLimits,
}
