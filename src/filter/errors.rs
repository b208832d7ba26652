//! # Filter Errors
//!
//! Error types for filter parsing and validation.

use thiserror::Error;

/// Result type for filter operations
pub type FilterResult<T> = Result<T, FilterError>;

/// Filter parsing/validation errors
#[derive(Debug, Clone, Error)]
pub enum FilterError {
    /// Rule type is not one of the supported `*`-prefixed types
    #[error("unsupported filter type: {0}")]
    UnsupportedType(String),

    /// Rule type requires an element but none was given
    #[error("element is mandatory for type: {0}")]
    MissingElement(String),

    /// Rule type requires at least one value but none was given
    #[error("values is mandatory for type: {0}")]
    MissingValues(String),

    /// Inline filter expression could not be split into type:element:values
    #[error("inline parse error for string: <{0}>")]
    InlineParse(String),

    /// A `*regex` value failed to compile
    #[error("invalid regex value: {0}")]
    InvalidRegex(String),
}
