//! chargerd - filter-driven inverted indexes for a charging platform
//!
//! Profiles (thresholds, stats, resources, routes, attributes,
//! chargers, dispatchers) are selected at event time through filters;
//! the modules here derive, maintain, query and audit the inverted
//! indexes that make that selection a lookup instead of a scan.

pub mod api;
pub mod cache;
pub mod filter;
pub mod index;
pub mod observability;
pub mod profile;
pub mod replication;
pub mod storage;
