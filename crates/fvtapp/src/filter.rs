//! Attribute filtering.
//!
//! A [`RuleSet`] maps field names to a [`FilterRule`]: a comparison kind plus
//! the comparison text the user typed. [`matches`] decides whether a feature's
//! attribute values pass every rule.
//!
//! Evaluation rules:
//!
//! - An empty rule set matches everything.
//! - A rule on a field the feature does not carry is skipped.
//! - A null value compares as the empty string (or as `0` numerically).
//! - String comparisons ignore case; numeric ones parse both sides as `f64`
//!   and fail the rule when either side does not parse.
//! - [`FilterKind::None`] and empty comparison text never exclude anything.
//! - Rules are ANDed; the first failing rule decides.

use crate::model::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Comparison applied by a [`FilterRule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FilterKind {
    #[default]
    None,
    Contains,
    Equals,
    StartsWith,
    EndsWith,
    GreaterThan,
    LessThan,
}

impl FilterKind {
    pub const ALL: [FilterKind; 7] = [
        FilterKind::None,
        FilterKind::Contains,
        FilterKind::Equals,
        FilterKind::StartsWith,
        FilterKind::EndsWith,
        FilterKind::GreaterThan,
        FilterKind::LessThan,
    ];

    /// Label used in persisted settings and shown to users.
    pub fn label(self) -> &'static str {
        match self {
            FilterKind::None => "No filter",
            FilterKind::Contains => "Contains",
            FilterKind::Equals => "Equals",
            FilterKind::StartsWith => "Starts with",
            FilterKind::EndsWith => "Ends with",
            FilterKind::GreaterThan => "Greater than",
            FilterKind::LessThan => "Less than",
        }
    }

    /// Short command-line spelling.
    pub fn slug(self) -> &'static str {
        match self {
            FilterKind::None => "none",
            FilterKind::Contains => "contains",
            FilterKind::Equals => "equals",
            FilterKind::StartsWith => "starts-with",
            FilterKind::EndsWith => "ends-with",
            FilterKind::GreaterThan => "greater-than",
            FilterKind::LessThan => "less-than",
        }
    }

    /// Exact lookup by persisted label.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.label() == label)
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, FilterKind::GreaterThan | FilterKind::LessThan)
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for FilterKind {
    type Err = String;

    /// Accepts either the label (any case) or the slug.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|k| k.slug() == wanted || k.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                let known: Vec<&str> = Self::ALL.iter().map(|k| k.slug()).collect();
                format!(
                    "Unknown filter kind '{}' (expected one of: {})",
                    s,
                    known.join(", ")
                )
            })
    }
}

/// One comparison on one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterRule {
    pub kind: FilterKind,
    pub value: String,
}

impl FilterRule {
    pub fn new(kind: FilterKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }

    /// An inert rule matches every value.
    pub fn is_inert(&self) -> bool {
        self.kind == FilterKind::None || self.value.is_empty()
    }

    /// Check a single attribute value against this rule.
    pub fn matches(&self, value: &Value) -> bool {
        if self.is_inert() {
            return true;
        }

        if self.kind.is_numeric() {
            let lhs = if value.is_null() {
                Some(0.0)
            } else {
                value.as_f64()
            };
            let rhs = self.value.trim().parse::<f64>().ok();
            return match (lhs, rhs) {
                (Some(lhs), Some(rhs)) if self.kind == FilterKind::GreaterThan => lhs > rhs,
                (Some(lhs), Some(rhs)) => lhs < rhs,
                _ => false,
            };
        }

        let haystack = value.to_string().to_lowercase();
        let needle = self.value.to_lowercase();
        match self.kind {
            FilterKind::Contains => haystack.contains(&needle),
            FilterKind::Equals => haystack == needle,
            FilterKind::StartsWith => haystack.starts_with(&needle),
            FilterKind::EndsWith => haystack.ends_with(&needle),
            FilterKind::None | FilterKind::GreaterThan | FilterKind::LessThan => true,
        }
    }
}

/// Rules for one layer, keyed by field name.
pub type RuleSet = BTreeMap<String, FilterRule>;

/// Whether a feature's values pass every rule.
///
/// `values` holds one entry per field that exists on the layer; a rule on a
/// field without an entry is skipped.
pub fn matches(values: &BTreeMap<String, Value>, rules: &RuleSet) -> bool {
    rules.iter().all(|(field, rule)| match values.get(field) {
        Some(value) => rule.matches(value),
        None => true,
    })
}

/// Rules whose field is also selected for display. Other rules stay stored
/// but do not apply.
pub fn active_rules(rules: &RuleSet, selected: &[String]) -> RuleSet {
    rules
        .iter()
        .filter(|(field, _)| selected.contains(field))
        .map(|(field, rule)| (field.clone(), rule.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(&str, Value)]) -> BTreeMap<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn rules(pairs: &[(&str, FilterKind, &str)]) -> RuleSet {
        pairs
            .iter()
            .map(|(f, k, v)| (f.to_string(), FilterRule::new(*k, *v)))
            .collect()
    }

    #[test]
    fn contains_is_case_insensitive() {
        let r = rules(&[("name", FilterKind::Contains, "ac")]);
        assert!(matches(&values(&[("name", "Jack".into())]), &r));
        assert!(!matches(&values(&[("name", "Bob".into())]), &r));

        let upper = rules(&[("name", FilterKind::Contains, "JA")]);
        assert!(matches(&values(&[("name", "jack".into())]), &upper));
    }

    #[test]
    fn equals_prefix_suffix() {
        let v = values(&[("name", "Lakeside".into())]);
        assert!(matches(&v, &rules(&[("name", FilterKind::Equals, "lakeside")])));
        assert!(!matches(&v, &rules(&[("name", FilterKind::Equals, "lake")])));
        assert!(matches(&v, &rules(&[("name", FilterKind::StartsWith, "LAKE")])));
        assert!(matches(&v, &rules(&[("name", FilterKind::EndsWith, "side")])));
        assert!(!matches(&v, &rules(&[("name", FilterKind::EndsWith, "lake")])));
    }

    #[test]
    fn string_comparison_uses_display_text() {
        let v = values(&[("pop", Value::Int(250))]);
        assert!(matches(&v, &rules(&[("pop", FilterKind::StartsWith, "25")])));
        let r = values(&[("area", Value::Real(2.0))]);
        assert!(matches(&r, &rules(&[("area", FilterKind::Equals, "2.0")])));
    }

    #[test]
    fn numeric_comparisons() {
        let gt = rules(&[("pop", FilterKind::GreaterThan, "100")]);
        assert!(matches(&values(&[("pop", "250".into())]), &gt));
        assert!(matches(&values(&[("pop", Value::Int(101))]), &gt));
        assert!(!matches(&values(&[("pop", Value::Int(100))]), &gt));

        let lt = rules(&[("pop", FilterKind::LessThan, "100")]);
        assert!(matches(&values(&[("pop", Value::Real(99.5))]), &lt));
        assert!(!matches(&values(&[("pop", Value::Int(100))]), &lt));
    }

    #[test]
    fn numeric_parse_failure_is_a_non_match() {
        let gt = rules(&[("pop", FilterKind::GreaterThan, "100")]);
        assert!(!matches(&values(&[("pop", "abc".into())]), &gt));

        let bad_rule = rules(&[("pop", FilterKind::LessThan, "lots")]);
        assert!(!matches(&values(&[("pop", Value::Int(1))]), &bad_rule));
    }

    #[test]
    fn null_values() {
        let v = values(&[("pop", Value::Null)]);
        assert!(matches(&v, &rules(&[("pop", FilterKind::LessThan, "1")])));
        assert!(!matches(&v, &rules(&[("pop", FilterKind::GreaterThan, "0")])));
        assert!(!matches(&v, &rules(&[("pop", FilterKind::Contains, "x")])));
        assert!(matches(&v, &rules(&[("pop", FilterKind::Equals, "")])));
    }

    #[test]
    fn missing_field_skips_rule() {
        let v = values(&[("name", "Bob".into())]);
        assert!(matches(&v, &rules(&[("ghost", FilterKind::Equals, "x")])));
    }

    #[test]
    fn inert_rules_always_match() {
        let v = values(&[("name", "Bob".into())]);
        assert!(matches(&v, &rules(&[("name", FilterKind::None, "zzz")])));
        assert!(matches(&v, &rules(&[("name", FilterKind::Contains, "")])));
    }

    #[test]
    fn rules_are_anded() {
        let v = values(&[("name", "Jack".into()), ("pop", Value::Int(250))]);
        let both = rules(&[
            ("name", FilterKind::Contains, "ac"),
            ("pop", FilterKind::LessThan, "100"),
        ]);
        assert!(!matches(&v, &both));
        assert!(matches(&v, &RuleSet::new()));
        assert!(matches(&BTreeMap::new(), &RuleSet::new()));
    }

    #[test]
    fn active_rules_follow_selection() {
        let r = rules(&[
            ("name", FilterKind::Contains, "a"),
            ("pop", FilterKind::GreaterThan, "1"),
        ]);
        let active = active_rules(&r, &["pop".to_string()]);
        assert_eq!(active.len(), 1);
        assert!(active.contains_key("pop"));
        assert!(active_rules(&r, &[]).is_empty());
    }

    #[test]
    fn kind_parsing() {
        assert_eq!("contains".parse::<FilterKind>(), Ok(FilterKind::Contains));
        assert_eq!("Starts with".parse::<FilterKind>(), Ok(FilterKind::StartsWith));
        assert_eq!("greater-than".parse::<FilterKind>(), Ok(FilterKind::GreaterThan));
        assert!("bigger".parse::<FilterKind>().is_err());
        assert_eq!(FilterKind::from_label("Less than"), Some(FilterKind::LessThan));
        assert_eq!(FilterKind::from_label("less than"), None);
    }
}
