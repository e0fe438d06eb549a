use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// NAMC reference dataset compiled into the binary.
const BUNDLED_DATASET: &str = include_str!("../../resources/namc_codes.json");

#[derive(Error, Debug)]
pub enum ReferenceError {
    #[error("Failed to load reference data from {0}: {1}")]
    Load(String, String),

    #[error("Failed to parse reference data {0}: {1}")]
    Parse(String, String),
}

/// One known NAMASTE code with its canonical term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceEntry {
    #[serde(rename = "NAMC_CODE")]
    pub code: String,
    #[serde(rename = "NAMC_term")]
    pub term: String,
    /// Traditional system of origin (Ayurveda, Siddha, Unani).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Immutable lookup over the NAMC reference set.
///
/// Built once and shared read-only; lookups never mutate it. Keys are
/// uppercased and the first occurrence of a duplicate key wins.
#[derive(Debug, Clone)]
pub struct ReferenceIndex {
    entries: Vec<ReferenceEntry>,
    by_code: HashMap<String, usize>,
    by_term: HashMap<String, usize>,
}

impl ReferenceIndex {
    pub fn new(entries: Vec<ReferenceEntry>) -> Self {
        let mut by_code = HashMap::with_capacity(entries.len());
        let mut by_term = HashMap::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            by_code.entry(normalize_key(&entry.code)).or_insert(i);
            by_term.entry(normalize_key(&entry.term)).or_insert(i);
        }
        Self {
            entries,
            by_code,
            by_term,
        }
    }

    /// Index over the dataset shipped with the crate.
    pub fn bundled() -> Result<Self, ReferenceError> {
        Self::from_json_str("namc_codes.json", BUNDLED_DATASET)
    }

    /// Load a dataset from a JSON file (array of `NAMC_CODE` / `NAMC_term` objects).
    pub fn load(path: &Path) -> Result<Self, ReferenceError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| ReferenceError::Load(path.display().to_string(), e.to_string()))?;
        Self::from_json_str(&path.display().to_string(), &json)
    }

    pub fn from_json_str(source: &str, json: &str) -> Result<Self, ReferenceError> {
        let entries: Vec<ReferenceEntry> = serde_json::from_str(json)
            .map_err(|e| ReferenceError::Parse(source.to_string(), e.to_string()))?;
        Ok(Self::new(entries))
    }

    /// Resolve a row against the reference set.
    ///
    /// Order: exact code, exact term, then the first entry (dataset order)
    /// whose code contains or is contained in the given code.
    pub fn find(&self, code: &str, term: &str) -> Option<&ReferenceEntry> {
        let code_key = normalize_key(code);

        if let Some(&i) = self.by_code.get(&code_key) {
            return Some(&self.entries[i]);
        }
        if let Some(&i) = self.by_term.get(&normalize_key(term)) {
            return Some(&self.entries[i]);
        }
        if code_key.is_empty() {
            return None;
        }

        // Tolerates suffixes and prefixes around known codes; linear but the set is small.
        self.entries.iter().find(|entry| {
            let known = normalize_key(&entry.code);
            !known.is_empty() && (code_key.contains(&known) || known.contains(&code_key))
        })
    }

    /// Case-insensitive substring search over codes and terms, in dataset order.
    pub fn search(&self, query: &str) -> Vec<&ReferenceEntry> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.entries
            .iter()
            .filter(|e| {
                e.code.to_lowercase().contains(&needle) || e.term.to_lowercase().contains(&needle)
            })
            .collect()
    }

    pub fn entries(&self) -> &[ReferenceEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn normalize_key(raw: &str) -> String {
    raw.trim().to_uppercase()
}
