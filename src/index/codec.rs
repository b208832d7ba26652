//! Index key codec.
//!
//! An index key is `type:field:value`. Keys always order "dynamic
//! operand, literal operand": when the rule element references event
//! data and a value is a literal the key is built from the element,
//! when the value is the dynamic side the operands swap. The dynamic
//! marker is stripped before the operand lands in the key, so lookups
//! run on plain event-field paths.

use std::collections::BTreeSet;

use crate::filter::{
    is_dynamic_dp_path, FilterRule, DYNAMIC_DATA_PREFIX, META_ANY, META_EXISTS, META_NONE,
    META_NOTEXISTS, META_PREFIX, META_STRING, META_SUFFIX,
};

use super::errors::{IndexError, IndexResult};

pub const KEY_SEP: char = ':';

/// Rule types that can feed the inverted index
pub const INDEX_ELIGIBLE_TYPES: [&str; 5] = [
    META_STRING,
    META_PREFIX,
    META_SUFFIX,
    META_EXISTS,
    META_NOTEXISTS,
];

pub fn is_index_eligible(rule_type: &str) -> bool {
    INDEX_ELIGIBLE_TYPES.contains(&rule_type)
}

pub fn encode_key(rule_type: &str, field: &str, value: &str) -> String {
    format!("{rule_type}{KEY_SEP}{field}{KEY_SEP}{value}")
}

/// Splits a key back into its parts; the value keeps any separators it
/// contains
pub fn decode_key(key: &str) -> IndexResult<(String, String, String)> {
    let mut parts = key.splitn(3, KEY_SEP);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(rule_type), Some(field), Some(value)) if !rule_type.is_empty() => Ok((
            rule_type.to_string(),
            field.to_string(),
            value.to_string(),
        )),
        _ => Err(IndexError::WrongIdxKeyFormat(key.to_string())),
    }
}

/// Sentinel key indexed for items whose filter list is empty
pub fn sentinel_key() -> String {
    encode_key(META_NONE, META_ANY, META_ANY)
}

fn is_dynamic(operand: &str) -> bool {
    operand.starts_with(DYNAMIC_DATA_PREFIX)
}

fn strip_marker(operand: &str) -> &str {
    operand.strip_prefix(DYNAMIC_DATA_PREFIX).unwrap_or(operand)
}

/// Index keys contributed by a single rule.
///
/// Rules of non-eligible types, rules over non-indexable dynamic paths
/// and operand pairs that are both dynamic or both literal produce no
/// keys; they are evaluated only at match time.
pub fn keys_for_rule(rule: &FilterRule) -> Vec<String> {
    if !is_index_eligible(&rule.rule_type) || is_dynamic_dp_path(&rule.element) {
        return Vec::new();
    }
    let elem_dynamic = is_dynamic(&rule.element);
    if rule.values.is_empty() {
        // bare existence checks index under a wildcard value
        if !elem_dynamic {
            return Vec::new();
        }
        let value = match rule.rule_type.as_str() {
            META_EXISTS => META_ANY,
            META_NOTEXISTS => META_NONE,
            _ => return Vec::new(),
        };
        return vec![encode_key(&rule.rule_type, strip_marker(&rule.element), value)];
    }
    let mut keys = Vec::new();
    for value in &rule.values {
        if is_dynamic_dp_path(value) {
            continue;
        }
        let val_dynamic = is_dynamic(value);
        let key = if elem_dynamic {
            if val_dynamic {
                continue;
            }
            encode_key(&rule.rule_type, strip_marker(&rule.element), value)
        } else if val_dynamic {
            encode_key(&rule.rule_type, strip_marker(value), &rule.element)
        } else {
            continue;
        };
        keys.push(key);
    }
    keys
}

/// Deduplicated keys for a whole rule set
pub fn keys_for_rules(rules: &[FilterRule]) -> BTreeSet<String> {
    rules.iter().flat_map(|rule| keys_for_rule(rule)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(rule_type: &str, element: &str, values: &[&str]) -> FilterRule {
        FilterRule {
            rule_type: rule_type.to_string(),
            element: element.to_string(),
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }

    #[test]
    fn dynamic_element_literal_value() {
        let keys = keys_for_rule(&rule(META_STRING, "~*req.Account", &["1001", "1002"]));
        assert_eq!(
            keys,
            vec![
                "*string:*req.Account:1001".to_string(),
                "*string:*req.Account:1002".to_string(),
            ]
        );
    }

    #[test]
    fn literal_element_dynamic_value_swaps_operands() {
        let keys = keys_for_rule(&rule(META_PREFIX, "1001", &["~*req.Destination"]));
        assert_eq!(keys, vec!["*prefix:*req.Destination:1001".to_string()]);
    }

    #[test]
    fn both_literal_or_both_dynamic_skipped() {
        assert!(keys_for_rule(&rule(META_STRING, "1001", &["1001"])).is_empty());
        assert!(keys_for_rule(&rule(META_STRING, "~*req.Account", &["~*req.Subject"])).is_empty());
    }

    #[test]
    fn non_eligible_type_skipped() {
        assert!(keys_for_rule(&rule("*gt", "~*req.Usage", &["10"])).is_empty());
    }

    #[test]
    fn non_indexable_dynamic_path_skipped() {
        assert!(keys_for_rule(&rule(META_STRING, "~*stats.SQ1.Metric", &["1"])).is_empty());
    }

    #[test]
    fn bare_existence_checks() {
        assert_eq!(
            keys_for_rule(&rule(META_EXISTS, "~*req.Account", &[])),
            vec!["*exists:*req.Account:*any".to_string()]
        );
        assert_eq!(
            keys_for_rule(&rule(META_NOTEXISTS, "~*req.RatingPlan", &[])),
            vec!["*notexists:*req.RatingPlan:*none".to_string()]
        );
    }

    #[test]
    fn decode_tolerates_separator_in_value() {
        let (rule_type, field, value) = decode_key("*prefix:*req.Destination:+40:720").unwrap();
        assert_eq!(rule_type, "*prefix");
        assert_eq!(field, "*req.Destination");
        assert_eq!(value, "+40:720");
    }

    #[test]
    fn decode_rejects_short_keys() {
        assert!(decode_key("*string:*req.Account").is_err());
    }
}
