//! Auxiliary replicated entities.
//!
//! These kinds do not go through the filter index; they are carried by
//! the replication facade and by the two specialised health checks
//! (account-action-plan and reverse-destination membership).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Fully qualified `tenant:account` ID
    pub id: String,
    #[serde(default)]
    pub balances: BTreeMap<String, f64>,
    #[serde(default)]
    pub allow_negative: bool,
    #[serde(default)]
    pub disabled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    pub id: String,
    #[serde(default)]
    pub prefixes: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Timing {
    pub id: String,
    #[serde(default)]
    pub years: Vec<i32>,
    #[serde(default)]
    pub months: Vec<u32>,
    #[serde(default)]
    pub month_days: Vec<u32>,
    #[serde(default)]
    pub week_days: Vec<u32>,
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub end_time: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub id: String,
    #[serde(default)]
    pub action_type: String,
    #[serde(default)]
    pub balance_type: String,
    #[serde(default)]
    pub units: f64,
    #[serde(default)]
    pub weight: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionPlan {
    pub id: String,
    /// Accounts subscribed to this plan; source of truth for the
    /// account-action-plan index
    #[serde(default)]
    pub account_ids: Vec<String>,
    #[serde(default)]
    pub actions_id: String,
    #[serde(default)]
    pub timing_id: String,
    #[serde(default)]
    pub weight: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionTriggers {
    pub id: String,
    #[serde(default)]
    pub threshold_type: String,
    #[serde(default)]
    pub threshold_value: f64,
    #[serde(default)]
    pub actions_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SharedGroup {
    pub id: String,
    #[serde(default)]
    pub account_parameters: BTreeMap<String, String>,
    #[serde(default)]
    pub member_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RatingPlan {
    pub id: String,
    #[serde(default)]
    pub destination_rates: BTreeMap<String, String>,
    #[serde(default)]
    pub timings: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RatingProfile {
    /// Fully qualified `category:tenant:subject` ID
    pub id: String,
    #[serde(default)]
    pub rating_plan_ids: Vec<String>,
    #[serde(default)]
    pub fallback_subjects: Vec<String>,
}

/// Runtime state of a threshold (as opposed to its profile)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Threshold {
    pub tenant: String,
    pub id: String,
    #[serde(default)]
    pub hits: i64,
    #[serde(default)]
    pub snooze: Option<chrono::DateTime<chrono::Utc>>,
}

/// Runtime state of a stat queue
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatQueue {
    pub tenant: String,
    pub id: String,
    #[serde(default)]
    pub metrics: BTreeMap<String, f64>,
}

/// Runtime state of a resource
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub tenant: String,
    pub id: String,
    #[serde(default)]
    pub usages: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DispatcherHost {
    pub tenant: String,
    pub id: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub transport: String,
    #[serde(default)]
    pub tls: bool,
}
