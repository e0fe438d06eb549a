use crate::models::enums::MappingStatus;
use crate::models::TargetMapping;

/// Confidence assigned by the mapping policy.
pub mod scores {
    /// Known NAMC entry, both targets present.
    pub const KNOWN_FULL: f32 = 0.92;

    /// Known NAMC entry, one target present.
    pub const KNOWN_PARTIAL: f32 = 0.68;

    /// Known NAMC entry, no target present.
    pub const KNOWN_BARE: f32 = 0.45;

    /// Unknown code, both targets present.
    pub const INFERRED_FULL: f32 = 0.75;

    /// Unknown code, one target present.
    pub const INFERRED_PARTIAL: f32 = 0.55;

    /// Unknown code, nothing to map to.
    pub const UNMAPPED: f32 = 0.0;
}

/// Status and confidence for a row, given whether the reference set knows it
/// and which targets were produced.
pub fn score(known: bool, targets: &TargetMapping) -> (MappingStatus, f32) {
    match (known, targets.present_count()) {
        (true, 2) => (MappingStatus::Mapped, scores::KNOWN_FULL),
        (true, 1) => (MappingStatus::Partial, scores::KNOWN_PARTIAL),
        (true, _) => (MappingStatus::Partial, scores::KNOWN_BARE),
        (false, 2) => (MappingStatus::Mapped, scores::INFERRED_FULL),
        (false, 1) => (MappingStatus::Partial, scores::INFERRED_PARTIAL),
        (false, _) => (MappingStatus::Unmapped, scores::UNMAPPED),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ClassificationTarget;

    fn targets(secondary: bool, tertiary: bool) -> TargetMapping {
        TargetMapping {
            secondary: secondary.then(|| ClassificationTarget::new("TM2.001", "Vata Dosha Imbalance")),
            tertiary: tertiary.then(|| ClassificationTarget::new("K30", "Functional dyspepsia")),
        }
    }

    #[test]
    fn policy_table() {
        let cases = [
            (true, true, true, MappingStatus::Mapped, 0.92),
            (true, true, false, MappingStatus::Partial, 0.68),
            (true, false, true, MappingStatus::Partial, 0.68),
            (true, false, false, MappingStatus::Partial, 0.45),
            (false, true, true, MappingStatus::Mapped, 0.75),
            (false, false, true, MappingStatus::Partial, 0.55),
            (false, true, false, MappingStatus::Partial, 0.55),
            (false, false, false, MappingStatus::Unmapped, 0.0),
        ];
        for (known, sec, ter, status, confidence) in cases {
            let (got_status, got_conf) = score(known, &targets(sec, ter));
            assert_eq!(got_status, status, "known={known} sec={sec} ter={ter}");
            assert!((got_conf - confidence).abs() < f32::EPSILON);
        }
    }

    #[test]
    fn status_bands_hold() {
        for known in [true, false] {
            for sec in [true, false] {
                for ter in [true, false] {
                    let (status, conf) = score(known, &targets(sec, ter));
                    match status {
                        MappingStatus::Mapped => assert!(conf >= scores::INFERRED_FULL),
                        MappingStatus::Partial => {
                            assert!((scores::KNOWN_BARE..=scores::KNOWN_PARTIAL).contains(&conf))
                        }
                        MappingStatus::Unmapped => assert_eq!(conf, 0.0),
                    }
                }
            }
        }
    }

    #[test]
    fn score_constants_are_ordered() {
        assert!(scores::UNMAPPED < scores::KNOWN_BARE);
        assert!(scores::KNOWN_BARE < scores::INFERRED_PARTIAL);
        assert!(scores::INFERRED_PARTIAL < scores::KNOWN_PARTIAL);
        assert!(scores::KNOWN_PARTIAL < scores::INFERRED_FULL);
        assert!(scores::INFERRED_FULL < scores::KNOWN_FULL);
    }
}
