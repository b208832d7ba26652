//! Filter Rule Model
//!
//! Named, reusable filters: a tenant-scoped ID plus an ordered list of
//! `(type, element, values)` rules and an optional activation window.
//! Filters are read-only input to the index engine; they are resolved by
//! ID from the store or parsed on the fly from inline expressions
//! (`*string:~*req.Account:1001`).

mod errors;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use errors::{FilterError, FilterResult};

/// Prefix marking meta identifiers and inline filter IDs
pub const META: &str = "*";
/// Prefix marking a dynamic data reference (event field path)
pub const DYNAMIC_DATA_PREFIX: &str = "~";

pub const META_STRING: &str = "*string";
pub const META_PREFIX: &str = "*prefix";
pub const META_SUFFIX: &str = "*suffix";
pub const META_EXISTS: &str = "*exists";
pub const META_NOTEXISTS: &str = "*notexists";
pub const META_EMPTY: &str = "*empty";
pub const META_GREATER_THAN: &str = "*gt";
pub const META_GREATER_OR_EQUAL: &str = "*gte";
pub const META_LESS_THAN: &str = "*lt";
pub const META_LESS_OR_EQUAL: &str = "*lte";
pub const META_IPNET: &str = "*ipnet";
pub const META_REGEX: &str = "*regex";

/// Sentinel rule type for profiles without filters
pub const META_NONE: &str = "*none";
/// Wildcard operand
pub const META_ANY: &str = "*any";

/// Separator between values of an inline filter expression
const INLINE_VALUE_SEP: char = '|';

/// Every rule type the model accepts
const SUPPORTED_TYPES: &[&str] = &[
    META_STRING,
    META_PREFIX,
    META_SUFFIX,
    META_EXISTS,
    META_NOTEXISTS,
    META_EMPTY,
    META_GREATER_THAN,
    META_GREATER_OR_EQUAL,
    META_LESS_THAN,
    META_LESS_OR_EQUAL,
    META_IPNET,
    META_REGEX,
];

/// Rule types that cannot work without an element
const NEEDS_ELEMENT: &[&str] = &[
    META_STRING,
    META_PREFIX,
    META_SUFFIX,
    META_EXISTS,
    META_NOTEXISTS,
    META_EMPTY,
    META_GREATER_THAN,
    META_GREATER_OR_EQUAL,
    META_LESS_THAN,
    META_LESS_OR_EQUAL,
    META_IPNET,
    META_REGEX,
];

/// Rule types that cannot work without values
const NEEDS_VALUES: &[&str] = &[
    META_STRING,
    META_PREFIX,
    META_SUFFIX,
    META_GREATER_THAN,
    META_GREATER_OR_EQUAL,
    META_LESS_THAN,
    META_LESS_OR_EQUAL,
    META_IPNET,
    META_REGEX,
];

/// Dynamic paths that must never land in an index key
const NOT_INDEXABLE_PREFIXES: &[&str] = &[
    "~*accounts",
    "~*stats",
    "~*resources",
    "~*libphonenumber",
];

/// Returns true for dynamic paths excluded from indexing
/// (`~*accounts`, `~*stats`, `~*resources`, `~*libphonenumber`)
pub fn is_dynamic_dp_path(path: &str) -> bool {
    NOT_INDEXABLE_PREFIXES
        .iter()
        .any(|prefix| path.starts_with(prefix))
}

/// Optional validity window of a filter
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationInterval {
    pub activation_time: Option<DateTime<Utc>>,
    pub expiry_time: Option<DateTime<Utc>>,
}

impl ActivationInterval {
    /// Checks whether the interval covers the given instant
    pub fn is_active(&self, at: DateTime<Utc>) -> bool {
        if let Some(start) = self.activation_time {
            if at < start {
                return false;
            }
        }
        if let Some(end) = self.expiry_time {
            if at > end {
                return false;
            }
        }
        true
    }
}

/// A single `(type, element, values)` matching predicate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterRule {
    #[serde(rename = "Type")]
    pub rule_type: String,
    #[serde(rename = "Element")]
    pub element: String,
    #[serde(rename = "Values", default)]
    pub values: Vec<String>,
}

impl FilterRule {
    /// Builds a rule, rejecting unsupported types and missing operands
    pub fn new(
        rule_type: impl Into<String>,
        element: impl Into<String>,
        values: Vec<String>,
    ) -> FilterResult<Self> {
        let rule = Self {
            rule_type: rule_type.into(),
            element: element.into(),
            values,
        };
        rule.validate()?;
        Ok(rule)
    }

    /// Checks the rule against the supported type table and compiles
    /// `*regex` values so malformed patterns are caught at set time
    pub fn validate(&self) -> FilterResult<()> {
        if !SUPPORTED_TYPES.contains(&self.rule_type.as_str()) {
            return Err(FilterError::UnsupportedType(self.rule_type.clone()));
        }
        if self.element.is_empty() && NEEDS_ELEMENT.contains(&self.rule_type.as_str()) {
            return Err(FilterError::MissingElement(self.rule_type.clone()));
        }
        if self.values.is_empty() && NEEDS_VALUES.contains(&self.rule_type.as_str()) {
            return Err(FilterError::MissingValues(self.rule_type.clone()));
        }
        if self.rule_type == META_REGEX {
            for val in &self.values {
                regex::Regex::new(val)
                    .map_err(|err| FilterError::InvalidRegex(err.to_string()))?;
            }
        }
        Ok(())
    }
}

/// A named, reusable set of matching rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    #[serde(rename = "Tenant")]
    pub tenant: String,
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Rules")]
    pub rules: Vec<FilterRule>,
    #[serde(rename = "ActivationInterval", default)]
    pub activation_interval: Option<ActivationInterval>,
}

impl Filter {
    /// The canonical `tenant:id` key of this filter
    pub fn tenant_id(&self) -> String {
        format!("{}:{}", self.tenant, self.id)
    }

    /// Validates every rule of the filter
    pub fn validate(&self) -> FilterResult<()> {
        for rule in &self.rules {
            rule.validate()?;
        }
        Ok(())
    }

    /// Parses an inline expression (`*string:~*req.Account:1001|1002`)
    /// into a single-rule filter. The filter keeps the expression as its
    /// ID and is never persisted.
    pub fn from_inline(tenant: &str, expression: &str) -> FilterResult<Self> {
        let mut parts = expression.splitn(3, ':');
        let (rule_type, element, raw_values) = match (parts.next(), parts.next(), parts.next()) {
            (Some(t), Some(e), Some(v)) => (t, e, v),
            _ => return Err(FilterError::InlineParse(expression.to_string())),
        };
        let values = if raw_values.is_empty() {
            Vec::new()
        } else {
            raw_values
                .split(INLINE_VALUE_SEP)
                .map(str::to_string)
                .collect()
        };
        let filter = Self {
            tenant: tenant.to_string(),
            id: expression.to_string(),
            rules: vec![FilterRule {
                rule_type: rule_type.to_string(),
                element: element.to_string(),
                values,
            }],
            activation_interval: None,
        };
        filter.validate()?;
        Ok(filter)
    }
}

/// True when a filter ID denotes an inline expression rather than a
/// stored filter
pub fn is_inline_filter(filter_id: &str) -> bool {
    filter_id.starts_with(META)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_single_value() {
        let fltr = Filter::from_inline("cgrates.org", "*string:~*req.Account:1001").unwrap();
        assert_eq!(fltr.id, "*string:~*req.Account:1001");
        assert_eq!(fltr.rules.len(), 1);
        assert_eq!(fltr.rules[0].rule_type, META_STRING);
        assert_eq!(fltr.rules[0].element, "~*req.Account");
        assert_eq!(fltr.rules[0].values, vec!["1001".to_string()]);
    }

    #[test]
    fn inline_multiple_values() {
        let fltr = Filter::from_inline("cgrates.org", "*prefix:~*req.Destination:10|20").unwrap();
        assert_eq!(
            fltr.rules[0].values,
            vec!["10".to_string(), "20".to_string()]
        );
    }

    #[test]
    fn inline_value_keeps_separator_in_tail() {
        // value is everything after the second colon
        let fltr = Filter::from_inline("cgrates.org", "*string:~*req.CGRID:da1:b3").unwrap();
        assert_eq!(fltr.rules[0].values, vec!["da1:b3".to_string()]);
        assert_eq!(fltr.rules[0].element, "~*req.CGRID");
    }

    #[test]
    fn inline_rejects_short_expression() {
        assert!(Filter::from_inline("cgrates.org", "*string:broken").is_err());
    }

    #[test]
    fn rule_requires_values_for_string() {
        assert!(FilterRule::new(META_STRING, "~*req.Account", Vec::new()).is_err());
    }

    #[test]
    fn rule_allows_exists_without_values() {
        assert!(FilterRule::new(META_EXISTS, "~*req.Account", Vec::new()).is_ok());
    }

    #[test]
    fn rule_rejects_bad_regex() {
        assert!(FilterRule::new(META_REGEX, "~*req.Account", vec!["[".to_string()]).is_err());
    }

    #[test]
    fn dynamic_dp_paths_detected() {
        assert!(is_dynamic_dp_path("~*stats.SQ1.Metric"));
        assert!(!is_dynamic_dp_path("~*req.Account"));
    }
}
