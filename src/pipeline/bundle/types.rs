//! FHIR R4 resource shapes emitted by the bundle generator.
//!
//! Only the subset of Bundle and CodeSystem this crate writes. Field names
//! follow the FHIR JSON representation (camelCase).

use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════
// Shared datatypes
// ═══════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,
    pub last_updated: String,
    #[serde(default)]
    pub profile: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identifier {
    pub system: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coding {
    pub system: String,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeableConcept {
    pub coding: Vec<Coding>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactPoint {
    pub system: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDetail {
    pub name: String,
    pub telecom: Vec<ContactPoint>,
}

// ═══════════════════════════════════════════
// Bundle
// ═══════════════════════════════════════════

/// Collection bundle: one CodeSystem entry per mapping result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    pub resource_type: String,
    pub id: String,
    pub meta: Meta,
    pub identifier: Identifier,
    #[serde(rename = "type")]
    pub bundle_type: String,
    pub timestamp: String,
    pub entry: Vec<BundleEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleEntry {
    pub full_url: String,
    pub resource: CodeSystem,
}

// ═══════════════════════════════════════════
// CodeSystem
// ═══════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeSystem {
    pub resource_type: String,
    pub id: String,
    pub meta: Meta,
    pub url: String,
    pub identifier: Vec<Identifier>,
    pub version: String,
    pub name: String,
    pub title: String,
    pub status: String,
    pub experimental: bool,
    pub date: String,
    pub publisher: String,
    pub contact: Vec<ContactDetail>,
    pub description: String,
    pub jurisdiction: Vec<CodeableConcept>,
    pub purpose: String,
    pub copyright: String,
    pub case_sensitive: bool,
    pub value_set: String,
    pub content: String,
    pub count: u32,
    pub concept: Vec<Concept>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Concept {
    pub code: String,
    pub display: String,
    pub definition: String,
    #[serde(default)]
    pub designation: Vec<Designation>,
    #[serde(default)]
    pub property: Vec<ConceptProperty>,
}

impl Concept {
    /// First property with the given code.
    pub fn property(&self, code: &str) -> Option<&PropertyValue> {
        self.property.iter().find(|p| p.code == code).map(|p| &p.value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Designation {
    pub language: String,
    #[serde(rename = "use")]
    pub usage: Coding,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptProperty {
    pub code: String,
    #[serde(flatten)]
    pub value: PropertyValue,
}

/// FHIR `value[x]` choice for concept properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    #[serde(rename = "valueDecimal")]
    Decimal(f32),
    #[serde(rename = "valueCode")]
    Code(String),
    #[serde(rename = "valueString")]
    Text(String),
}

impl PropertyValue {
    pub fn as_code(&self) -> Option<&str> {
        match self {
            Self::Code(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_decimal(&self) -> Option<f32> {
        match self {
            Self::Decimal(d) => Some(*d),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_value_flattens_to_choice_key() {
        let prop = ConceptProperty {
            code: "mapping_status".into(),
            value: PropertyValue::Code("mapped".into()),
        };
        let json = serde_json::to_value(&prop).unwrap();
        assert_eq!(json, serde_json::json!({"code": "mapping_status", "valueCode": "mapped"}));
    }

    #[test]
    fn property_value_deserializes_from_choice_key() {
        let prop: ConceptProperty =
            serde_json::from_str(r#"{"code": "confidence_score", "valueDecimal": 0.92}"#).unwrap();
        assert_eq!(prop.value.as_decimal(), Some(0.92));
    }

    #[test]
    fn designation_use_field_name() {
        let designation = Designation {
            language: "en-US".into(),
            usage: Coding {
                system: "http://terminology.hl7.org/CodeSystem/designation-usage".into(),
                code: "display".into(),
                display: None,
            },
            value: "ICD-11 TM2: TM2.001 - Vata Dosha Imbalance".into(),
        };
        let json = serde_json::to_value(&designation).unwrap();
        assert_eq!(json["use"]["code"], "display");
        assert!(json["use"].get("display").is_none());
    }

    #[test]
    fn meta_omits_missing_version() {
        let meta = Meta {
            version_id: None,
            last_updated: "2024-01-01T00:00:00.000Z".into(),
            profile: vec![],
        };
        let json = serde_json::to_value(&meta).unwrap();
        assert!(json.get("versionId").is_none());
        assert_eq!(json["lastUpdated"], "2024-01-01T00:00:00.000Z");
    }
}
