//! Structured JSON logging.
//!
//! One line per event, keys in deterministic order, written
//! synchronously. Severity and event name lead every line so log
//! pipelines can route without parsing the payload fields.

pub mod logger;

pub use logger::{Logger, Severity};
