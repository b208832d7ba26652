//! Storage layer.
//!
//! The adapter traits decouple the index engine from the backing data
//! store; the in-memory engine is the reference implementation used by
//! the admin API, replication facade and tests.

pub mod adapter;
pub mod errors;
pub mod memory;

pub use adapter::{IndexBucket, IndexStore, ProfileStore, NON_TRANSACTIONAL, REVERSE_FILTER_INDEXES};
pub use errors::{StorageError, StorageResult};
pub use memory::{DataStore, CACHE_FILTERS};
