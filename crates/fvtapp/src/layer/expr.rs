//! Row filter expressions.
//!
//! Layers accept a tiny slice of the host's query syntax: the empty string
//! (no filter) and an integer equality on a quoted field name:
//!
//! ```text
//! "_fvt_vis" = 1
//! ```

use crate::error::{FvtError, Result};
use crate::model::Feature;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubsetExpr {
    FieldEquals { field: String, value: i64 },
}

impl SubsetExpr {
    pub fn field_equals(field: impl Into<String>, value: i64) -> Self {
        SubsetExpr::FieldEquals {
            field: field.into(),
            value,
        }
    }

    /// Parse a subset string. Empty (or blank) input means "no filter".
    pub fn parse(input: &str) -> Result<Option<Self>> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(None);
        }

        let unsupported = || FvtError::HostQuery(format!("Unsupported filter expression: {}", input));

        let rest = input.strip_prefix('"').ok_or_else(unsupported)?;
        let close = rest.find('"').ok_or_else(unsupported)?;
        let field = &rest[..close];
        if field.is_empty() {
            return Err(unsupported());
        }

        let rhs = rest[close + 1..]
            .trim_start()
            .strip_prefix('=')
            .ok_or_else(unsupported)?;
        let value = rhs.trim().parse::<i64>().map_err(|_| unsupported())?;

        Ok(Some(Self::field_equals(field, value)))
    }

    /// Whether a record passes the filter. Null or missing values never match.
    pub fn matches(&self, feature: &Feature) -> bool {
        match self {
            SubsetExpr::FieldEquals { field, value } => feature
                .attribute(field)
                .and_then(|v| v.as_f64())
                .is_some_and(|n| n == *value as f64),
        }
    }
}

impl fmt::Display for SubsetExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubsetExpr::FieldEquals { field, value } => write!(f, "\"{}\" = {}", field, value),
        }
    }
}
