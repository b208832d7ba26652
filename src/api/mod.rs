//! Admin surface: recompute, query, removal and health endpoints.

pub mod admin;
pub mod request;

pub use admin::AdminApi;
pub use request::{
    ArgsComputeFilterIndexIDs, ArgsComputeFilterIndexes, AttrGetFilterIndexes,
    AttrRemFilterIndexes, IndexHealthArgs,
};
