use crate::models::{ClassificationTarget, TargetMapping};

/// Produces the classification targets for a NAMASTE code.
pub trait TargetGenerator: Send + Sync {
    fn targets(&self, source_code: &str) -> TargetMapping;
}

/// Deterministic pseudo-crosswalk: the code's character sum picks one entry
/// from each target table.
///
/// Not a clinical mapping. It guarantees a stable, plausible target for any
/// code until an authoritative crosswalk table is available.
#[derive(Debug, Clone)]
pub struct HashTargetGenerator {
    secondary: Vec<ClassificationTarget>,
    tertiary: Vec<ClassificationTarget>,
}

impl HashTargetGenerator {
    /// Custom tables. An empty table means that side is never produced.
    pub fn with_tables(secondary: Vec<ClassificationTarget>, tertiary: Vec<ClassificationTarget>) -> Self {
        Self {
            secondary,
            tertiary,
        }
    }

    /// Indices chosen for `source_code` in the (secondary, tertiary) tables.
    pub fn indices(&self, source_code: &str) -> (Option<usize>, Option<usize>) {
        let hash = code_hash(source_code);
        (pick(hash, self.secondary.len()), pick(hash, self.tertiary.len()))
    }
}

impl Default for HashTargetGenerator {
    fn default() -> Self {
        Self::with_tables(default_tm2_table(), default_biomedicine_table())
    }
}

impl TargetGenerator for HashTargetGenerator {
    fn targets(&self, source_code: &str) -> TargetMapping {
        let (secondary, tertiary) = self.indices(source_code);
        TargetMapping {
            secondary: secondary.map(|i| self.secondary[i].clone()),
            tertiary: tertiary.map(|i| self.tertiary[i].clone()),
        }
    }
}

/// Sum of the code's UTF-16 code units.
pub fn code_hash(source_code: &str) -> u64 {
    source_code.encode_utf16().map(u64::from).sum()
}

fn pick(hash: u64, len: usize) -> Option<usize> {
    (len > 0).then(|| (hash % len as u64) as usize)
}

fn default_tm2_table() -> Vec<ClassificationTarget> {
    vec![
        ClassificationTarget::new("TM2.001", "Vata Dosha Imbalance"),
        ClassificationTarget::new("TM2.002", "Pitta Dosha Imbalance"),
        ClassificationTarget::new("TM2.003", "Kapha Dosha Imbalance"),
        ClassificationTarget::new("TM2.004", "Digestive Fire Weakness"),
        ClassificationTarget::new("TM2.005", "Mental Agitation Pattern"),
        ClassificationTarget::new("TM2.006", "Vital Essence Depletion Pattern"),
    ]
}

fn default_biomedicine_table() -> Vec<ClassificationTarget> {
    vec![
        ClassificationTarget::new("M79.3", "Panniculitis, unspecified"),
        ClassificationTarget::new("K30", "Functional dyspepsia"),
        ClassificationTarget::new(
            "J44.1",
            "Chronic obstructive pulmonary disease with acute exacerbation",
        ),
        ClassificationTarget::new("K59.9", "Functional intestinal disorder, unspecified"),
        ClassificationTarget::new("F41.9", "Anxiety disorder, unspecified"),
        ClassificationTarget::new("R53", "Malaise and fatigue"),
    ]
}
