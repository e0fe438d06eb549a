use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One data line of an uploaded terminology file after normalization.
///
/// `source_code` and `source_term` are never empty: the parser fills gaps
/// with positional placeholders so every row stays mappable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedRow {
    pub source_code: String,
    pub source_term: String,
    /// Columns beyond the first two, keyed by header name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra_fields: BTreeMap<String, String>,
}

impl NormalizedRow {
    pub fn new(source_code: impl Into<String>, source_term: impl Into<String>) -> Self {
        Self {
            source_code: source_code.into(),
            source_term: source_term.into(),
            extra_fields: BTreeMap::new(),
        }
    }
}
