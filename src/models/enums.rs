use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(MappingStatus {
    Mapped => "mapped",
    Partial => "partial",
    Unmapped => "unmapped",
});

str_enum!(ProcessingStatus {
    Processing => "processing",
    Completed => "completed",
    Failed => "failed",
});

/// Target classification systems a NAMASTE code is projected onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassificationSystem {
    /// ICD-11 Chapter 26, traditional medicine conditions.
    Tm2,
    /// ICD-11 biomedical chapters.
    Biomedicine,
}

impl ClassificationSystem {
    /// Human-readable label used in FHIR designations.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Tm2 => "ICD-11 TM2",
            Self::Biomedicine => "ICD-11 Biomedicine",
        }
    }

    /// Concept property code carrying `<code>|<term>` for this system.
    pub fn property_code(&self) -> &'static str {
        match self {
            Self::Tm2 => "icd11_tm2_mapping",
            Self::Biomedicine => "icd11_bio_mapping",
        }
    }
}
