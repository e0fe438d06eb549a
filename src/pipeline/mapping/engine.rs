use std::cmp::Ordering;
use std::sync::Arc;

use super::confidence::score;
use super::targets::{HashTargetGenerator, TargetGenerator};
use crate::models::{ClassificationTarget, MappingResult, NormalizedRow};
use crate::pipeline::reference::ReferenceIndex;

/// Maps normalized rows to classified results.
///
/// Stateless per row: `map` is a pure function of the row, the reference
/// index and the target generator, so batching and ordering never change
/// an individual result.
pub struct MappingEngine {
    index: Arc<ReferenceIndex>,
    generator: Box<dyn TargetGenerator>,
}

impl MappingEngine {
    pub fn new(index: Arc<ReferenceIndex>, generator: Box<dyn TargetGenerator>) -> Self {
        Self { index, generator }
    }

    /// Engine using the built-in hash target tables.
    pub fn with_default_targets(index: Arc<ReferenceIndex>) -> Self {
        Self::new(index, Box::new(HashTargetGenerator::default()))
    }

    pub fn index(&self) -> &ReferenceIndex {
        &self.index
    }

    pub fn map(&self, row: &NormalizedRow) -> MappingResult {
        let found = self.index.find(&row.source_code, &row.source_term);
        let targets = self.generator.targets(&row.source_code);
        let (mapping_status, confidence_score) = score(found.is_some(), &targets);

        let source_term = match found {
            Some(entry) => entry.term.clone(),
            None => row.source_term.clone(),
        };
        let (secondary_code, secondary_term) = split_target(targets.secondary);
        let (tertiary_code, tertiary_term) = split_target(targets.tertiary);

        MappingResult {
            source_code: row.source_code.clone(),
            source_term,
            secondary_code,
            secondary_term,
            tertiary_code,
            tertiary_term,
            confidence_score,
            mapping_status,
        }
    }

    /// Map a slice of rows, preserving order.
    pub fn map_batch(&self, rows: &[NormalizedRow]) -> Vec<MappingResult> {
        rows.iter().map(|row| self.map(row)).collect()
    }

    /// Search the reference set and map every hit.
    ///
    /// Exact code matches come first, then higher confidence; ties keep
    /// dataset order. At most `limit` results.
    pub fn search(&self, query: &str, limit: usize) -> Vec<MappingResult> {
        let needle = query.trim().to_lowercase();
        let mut results: Vec<MappingResult> = self
            .index
            .search(&needle)
            .into_iter()
            .map(|entry| self.map(&NormalizedRow::new(entry.code.clone(), entry.term.clone())))
            .collect();

        results.sort_by(|a, b| {
            let a_exact = a.source_code.to_lowercase() == needle;
            let b_exact = b.source_code.to_lowercase() == needle;
            b_exact.cmp(&a_exact).then_with(|| {
                b.confidence_score
                    .partial_cmp(&a.confidence_score)
                    .unwrap_or(Ordering::Equal)
            })
        });
        results.truncate(limit);

        tracing::debug!(query, hits = results.len(), "Reference search");
        results
    }
}

fn split_target(target: Option<ClassificationTarget>) -> (Option<String>, Option<String>) {
    match target {
        Some(t) => (Some(t.code), Some(t.term)),
        None => (None, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::MappingStatus;
    use crate::models::TargetMapping;
    use crate::pipeline::reference::ReferenceEntry;

    fn entry(code: &str, term: &str) -> ReferenceEntry {
        ReferenceEntry {
            code: code.into(),
            term: term.into(),
            system: Some("Ayurveda".into()),
            description: None,
        }
    }

    fn test_index() -> Arc<ReferenceIndex> {
        Arc::new(ReferenceIndex::new(vec![
            entry("NAM001", "Vata Dosha Imbalance"),
            entry("NAM002", "Pitta Dosha Imbalance"),
            entry("NAM010", "Amlapitta"),
        ]))
    }

    /// Generator returning a fixed mapping, for exercising the policy branches.
    struct FixedTargets(TargetMapping);

    impl TargetGenerator for FixedTargets {
        fn targets(&self, _source_code: &str) -> TargetMapping {
            self.0.clone()
        }
    }

    fn tm2_only() -> TargetMapping {
        TargetMapping {
            secondary: Some(ClassificationTarget::new("TM2.004", "Digestive Fire Weakness")),
            tertiary: None,
        }
    }

    #[test]
    fn known_code_with_both_targets_is_mapped() {
        let engine = MappingEngine::with_default_targets(test_index());
        let result = engine.map(&NormalizedRow::new("NAM001", "Vata Dosha Imbalance"));
        assert_eq!(result.mapping_status, MappingStatus::Mapped);
        assert!((result.confidence_score - 0.92).abs() < f32::EPSILON);
        assert_eq!(result.secondary_code.as_deref(), Some("TM2.006"));
        assert_eq!(result.tertiary_code.as_deref(), Some("R53"));
    }

    #[test]
    fn unknown_code_with_both_targets_is_inferred() {
        let engine = MappingEngine::with_default_targets(test_index());
        let result = engine.map(&NormalizedRow::new("XYZ-9", "Local term"));
        assert_eq!(result.mapping_status, MappingStatus::Mapped);
        assert!((result.confidence_score - 0.75).abs() < f32::EPSILON);
        assert_eq!(result.source_term, "Local term");
    }

    #[test]
    fn canonical_term_replaces_row_term() {
        let engine = MappingEngine::with_default_targets(test_index());
        let result = engine.map(&NormalizedRow::new("nam002", "pitta imbalance (typo)"));
        assert_eq!(result.source_term, "Pitta Dosha Imbalance");
        assert_eq!(result.source_code, "nam002");
    }

    #[test]
    fn term_lookup_counts_as_known() {
        let engine = MappingEngine::with_default_targets(test_index());
        let result = engine.map(&NormalizedRow::new("LOCAL-1", "amlapitta"));
        assert!((result.confidence_score - 0.92).abs() < f32::EPSILON);
        assert_eq!(result.source_term, "Amlapitta");
    }

    #[test]
    fn known_code_one_target_is_partial() {
        let engine = MappingEngine::new(test_index(), Box::new(FixedTargets(tm2_only())));
        let result = engine.map(&NormalizedRow::new("NAM001", "Vata"));
        assert_eq!(result.mapping_status, MappingStatus::Partial);
        assert!((result.confidence_score - 0.68).abs() < f32::EPSILON);
        assert!(result.tertiary_code.is_none());
    }

    #[test]
    fn unknown_code_no_targets_is_unmapped() {
        let engine = MappingEngine::new(test_index(), Box::new(FixedTargets(TargetMapping::default())));
        let result = engine.map(&NormalizedRow::new("XYZ-9", "Local term"));
        assert_eq!(result.mapping_status, MappingStatus::Unmapped);
        assert_eq!(result.confidence_score, 0.0);
    }

    #[test]
    fn known_code_no_targets_is_partial_low() {
        let engine = MappingEngine::new(test_index(), Box::new(FixedTargets(TargetMapping::default())));
        let result = engine.map(&NormalizedRow::new("NAM010", "Amlapitta"));
        assert_eq!(result.mapping_status, MappingStatus::Partial);
        assert!((result.confidence_score - 0.45).abs() < f32::EPSILON);
    }

    #[test]
    fn map_is_idempotent() {
        let engine = MappingEngine::with_default_targets(test_index());
        let row = NormalizedRow::new("NAM001", "Vata Dosha Imbalance");
        assert_eq!(engine.map(&row), engine.map(&row));
    }

    #[test]
    fn batch_size_does_not_change_output() {
        let engine = MappingEngine::with_default_targets(test_index());
        let rows: Vec<NormalizedRow> = (1..=13)
            .map(|i| NormalizedRow::new(format!("NAM{i:03}"), format!("Term {i}")))
            .collect();

        let whole = engine.map_batch(&rows);
        let singles: Vec<MappingResult> = rows.chunks(1).flat_map(|c| engine.map_batch(c)).collect();
        let fours: Vec<MappingResult> = rows.chunks(4).flat_map(|c| engine.map_batch(c)).collect();
        assert_eq!(whole, singles);
        assert_eq!(whole, fours);
    }

    #[test]
    fn search_puts_exact_code_first() {
        let engine = MappingEngine::with_default_targets(test_index());
        let hits = engine.search("NAM00", 10);
        assert_eq!(hits.len(), 2);
        let exact = engine.search("nam002", 10);
        assert_eq!(exact[0].source_code, "NAM002");
    }

    #[test]
    fn search_orders_exact_before_partial_matches() {
        let index = Arc::new(ReferenceIndex::new(vec![
            entry("NAM0011", "Vata variant"),
            entry("NAM001", "Vata Dosha Imbalance"),
        ]));
        let engine = MappingEngine::with_default_targets(index);
        let hits = engine.search("nam001", 10);
        let codes: Vec<&str> = hits.iter().map(|r| r.source_code.as_str()).collect();
        assert_eq!(codes, vec!["NAM001", "NAM0011"]);
    }

    #[test]
    fn search_respects_limit_and_blank_query() {
        let engine = MappingEngine::with_default_targets(test_index());
        assert_eq!(engine.search("nam", 2).len(), 2);
        assert!(engine.search("  ", 10).is_empty());
    }
}
