use serde::{Deserialize, Serialize};

use super::enums::MappingStatus;

/// A single code in one of the target classification systems.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationTarget {
    pub code: String,
    pub term: String,
}

impl ClassificationTarget {
    pub fn new(code: impl Into<String>, term: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            term: term.into(),
        }
    }
}

/// Targets produced for one source code. Either side may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetMapping {
    /// ICD-11 TM2 side.
    pub secondary: Option<ClassificationTarget>,
    /// ICD-11 Biomedicine side.
    pub tertiary: Option<ClassificationTarget>,
}

impl TargetMapping {
    pub fn present_count(&self) -> usize {
        usize::from(self.secondary.is_some()) + usize::from(self.tertiary.is_some())
    }
}

/// Outcome of mapping one NAMASTE row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingResult {
    pub source_code: String,
    pub source_term: String,
    pub secondary_code: Option<String>,
    pub secondary_term: Option<String>,
    pub tertiary_code: Option<String>,
    pub tertiary_term: Option<String>,
    /// Always within [0.0, 1.0].
    pub confidence_score: f32,
    pub mapping_status: MappingStatus,
}

impl MappingResult {
    /// ICD-11 TM2 target as `(code, term)`, if a non-empty code is present.
    pub fn secondary(&self) -> Option<(&str, &str)> {
        present_side(&self.secondary_code, &self.secondary_term)
    }

    /// ICD-11 Biomedicine target as `(code, term)`, if a non-empty code is present.
    pub fn tertiary(&self) -> Option<(&str, &str)> {
        present_side(&self.tertiary_code, &self.tertiary_term)
    }
}

fn present_side<'a>(code: &'a Option<String>, term: &'a Option<String>) -> Option<(&'a str, &'a str)> {
    match code.as_deref() {
        Some(c) if !c.is_empty() => Some((c, term.as_deref().unwrap_or(""))),
        _ => None,
    }
}
