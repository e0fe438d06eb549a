use serde::{Deserialize, Serialize};

use crate::models::enums::MappingStatus;
use crate::models::MappingResult;

/// Status counts and mean confidence over a set of mapping results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MappingSummary {
    pub total: usize,
    pub mapped: usize,
    pub partial: usize,
    pub unmapped: usize,
    /// Mean confidence; 0.0 for an empty set.
    pub average_confidence: f32,
}

impl MappingSummary {
    pub fn from_results(results: &[MappingResult]) -> Self {
        let mut summary = Self {
            total: results.len(),
            ..Self::default()
        };
        let mut confidence_sum = 0.0_f64;

        for result in results {
            match result.mapping_status {
                MappingStatus::Mapped => summary.mapped += 1,
                MappingStatus::Partial => summary.partial += 1,
                MappingStatus::Unmapped => summary.unmapped += 1,
            }
            confidence_sum += f64::from(result.confidence_score);
        }

        if summary.total > 0 {
            summary.average_confidence = (confidence_sum / summary.total as f64) as f32;
        }
        summary
    }
}

impl std::fmt::Display for MappingSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} codes: {} mapped, {} partial, {} unmapped (avg confidence {:.0}%)",
            self.total,
            self.mapped,
            self.partial,
            self.unmapped,
            self.average_confidence * 100.0
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(status: MappingStatus, confidence: f32) -> MappingResult {
        MappingResult {
            source_code: "NAM001".into(),
            source_term: "Vata Dosha Imbalance".into(),
            secondary_code: None,
            secondary_term: None,
            tertiary_code: None,
            tertiary_term: None,
            confidence_score: confidence,
            mapping_status: status,
        }
    }

    #[test]
    fn empty_results() {
        let summary = MappingSummary::from_results(&[]);
        assert_eq!(summary, MappingSummary::default());
        assert_eq!(summary.average_confidence, 0.0);
    }

    #[test]
    fn counts_and_mean() {
        let summary = MappingSummary::from_results(&[
            result(MappingStatus::Mapped, 0.92),
            result(MappingStatus::Mapped, 0.75),
            result(MappingStatus::Partial, 0.55),
            result(MappingStatus::Unmapped, 0.0),
        ]);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.mapped, 2);
        assert_eq!(summary.partial, 1);
        assert_eq!(summary.unmapped, 1);
        assert!((summary.average_confidence - 0.555).abs() < 1e-4);
    }

    #[test]
    fn display_is_human_readable() {
        let summary = MappingSummary::from_results(&[result(MappingStatus::Mapped, 0.92)]);
        assert_eq!(
            summary.to_string(),
            "1 codes: 1 mapped, 0 partial, 0 unmapped (avg confidence 92%)"
        );
    }
}
