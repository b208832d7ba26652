//! Indexed profile kinds.
//!
//! Each profile carries the `(tenant, id, filter_ids)` triple the index
//! engine works from; the remaining fields are the slice of business
//! configuration the engine replicates but never interprets.

use serde::{Deserialize, Serialize};

use crate::filter::ActivationInterval;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThresholdProfile {
    pub tenant: String,
    pub id: String,
    #[serde(default)]
    pub filter_ids: Vec<String>,
    #[serde(default)]
    pub activation_interval: Option<ActivationInterval>,
    #[serde(default)]
    pub max_hits: i64,
    #[serde(default)]
    pub min_hits: i64,
    #[serde(default)]
    pub weight: f64,
    #[serde(default)]
    pub action_ids: Vec<String>,
    #[serde(default)]
    pub blocker: bool,
    #[serde(default)]
    pub asynchronous: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatQueueProfile {
    pub tenant: String,
    pub id: String,
    #[serde(default)]
    pub filter_ids: Vec<String>,
    #[serde(default)]
    pub activation_interval: Option<ActivationInterval>,
    #[serde(default)]
    pub queue_length: i64,
    #[serde(default)]
    pub metrics: Vec<String>,
    #[serde(default)]
    pub stored: bool,
    #[serde(default)]
    pub weight: f64,
    #[serde(default)]
    pub min_items: i64,
    #[serde(default)]
    pub threshold_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceProfile {
    pub tenant: String,
    pub id: String,
    #[serde(default)]
    pub filter_ids: Vec<String>,
    #[serde(default)]
    pub activation_interval: Option<ActivationInterval>,
    #[serde(default)]
    pub limit: f64,
    #[serde(default)]
    pub allocation_message: String,
    #[serde(default)]
    pub stored: bool,
    #[serde(default)]
    pub weight: f64,
    #[serde(default)]
    pub threshold_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteProfile {
    pub tenant: String,
    pub id: String,
    #[serde(default)]
    pub filter_ids: Vec<String>,
    #[serde(default)]
    pub activation_interval: Option<ActivationInterval>,
    #[serde(default)]
    pub sorting: String,
    #[serde(default)]
    pub sorting_parameters: Vec<String>,
    #[serde(default)]
    pub route_ids: Vec<String>,
    #[serde(default)]
    pub weight: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributeProfile {
    pub tenant: String,
    pub id: String,
    /// Subsystems this profile is active in; indexes are kept per context
    #[serde(default)]
    pub contexts: Vec<String>,
    #[serde(default)]
    pub filter_ids: Vec<String>,
    #[serde(default)]
    pub activation_interval: Option<ActivationInterval>,
    #[serde(default)]
    pub blocker: bool,
    #[serde(default)]
    pub weight: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChargerProfile {
    pub tenant: String,
    pub id: String,
    #[serde(default)]
    pub filter_ids: Vec<String>,
    #[serde(default)]
    pub activation_interval: Option<ActivationInterval>,
    #[serde(default)]
    pub run_id: String,
    #[serde(default)]
    pub attribute_ids: Vec<String>,
    #[serde(default)]
    pub weight: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DispatcherProfile {
    pub tenant: String,
    pub id: String,
    /// Subsystems this profile dispatches for; indexes are kept per context
    #[serde(default)]
    pub subsystems: Vec<String>,
    #[serde(default)]
    pub filter_ids: Vec<String>,
    #[serde(default)]
    pub activation_interval: Option<ActivationInterval>,
    #[serde(default)]
    pub strategy: String,
    #[serde(default)]
    pub host_ids: Vec<String>,
    #[serde(default)]
    pub weight: f64,
}
