use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

use super::types::*;
use crate::models::enums::ClassificationSystem;
use crate::models::MappingResult;

const URI_SYSTEM: &str = "urn:ietf:rfc:3986";
const BUNDLE_PROFILE: &str = "http://hl7.org/fhir/StructureDefinition/Bundle";
const CODE_SYSTEM_PROFILE: &str = "http://hl7.org/fhir/StructureDefinition/CodeSystem";
const CODE_SYSTEM_URL: &str = "http://namaste.gov.in/fhir/CodeSystem/namaste-terminology";
const VALUE_SET_URL: &str = "http://namaste.gov.in/fhir/ValueSet/all-namaste-codes";
const DESIGNATION_USAGE: &str = "http://terminology.hl7.org/CodeSystem/designation-usage";
/// India's OID arc; entry identifiers hang below it.
const OID_ROOT: &str = "2.16.356.10";

const CODE_SYSTEM_VERSION: &str = "2024.1";
const CODE_SYSTEM_NAME: &str = "NAMASTETerminology";
const CODE_SYSTEM_TITLE: &str = "NAMASTE Terminology System";
const PUBLISHER: &str = "Ministry of Ayush, Government of India";
const CONTACT_NAME: &str = "NAMASTE System Administrator";
const DESCRIPTION: &str =
    "NAMASTE codes with ICD-11 TM2 and Biomedicine mappings for traditional medicine integration";
const PURPOSE: &str = "To provide standardized terminology for Ayurveda, Siddha, and Unani medical systems with global ICD-11 interoperability";
const COPYRIGHT: &str = "© 2024 Ministry of Ayush, Government of India. All rights reserved.";

/// Build a bundle stamped with the current time.
pub fn generate(results: &[MappingResult], submitter: &str) -> Bundle {
    generate_at(results, submitter, Utc::now())
}

/// Build a bundle stamped with `now`.
///
/// Identifiers are fresh v4 UUIDs on every call; everything else is a
/// function of the inputs.
pub fn generate_at(results: &[MappingResult], submitter: &str, now: DateTime<Utc>) -> Bundle {
    let timestamp = now.to_rfc3339_opts(SecondsFormat::Millis, true);
    let millis = now.timestamp_millis();

    let entry = results
        .iter()
        .enumerate()
        .map(|(index, result)| BundleEntry {
            full_url: urn_uuid(),
            resource: code_system(result, submitter, &timestamp, millis, index),
        })
        .collect::<Vec<_>>();

    tracing::debug!(entries = entry.len(), "Generated FHIR bundle");

    Bundle {
        resource_type: "Bundle".into(),
        id: format!("namaste-icd11-mapping-{}", Uuid::new_v4()),
        meta: Meta {
            version_id: None,
            last_updated: timestamp.clone(),
            profile: vec![BUNDLE_PROFILE.into()],
        },
        identifier: Identifier {
            system: URI_SYSTEM.into(),
            value: urn_uuid(),
        },
        bundle_type: "collection".into(),
        timestamp,
        entry,
    }
}

/// Pretty-printed JSON, as written to disk by the CLI.
pub fn to_json_pretty(bundle: &Bundle) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(bundle)
}

fn urn_uuid() -> String {
    format!("urn:uuid:{}", Uuid::new_v4())
}

fn code_system(
    result: &MappingResult,
    submitter: &str,
    timestamp: &str,
    millis: i64,
    index: usize,
) -> CodeSystem {
    CodeSystem {
        resource_type: "CodeSystem".into(),
        id: format!("namaste-{}", result.source_code),
        meta: Meta {
            version_id: Some("1".into()),
            last_updated: timestamp.to_string(),
            profile: vec![CODE_SYSTEM_PROFILE.into()],
        },
        url: CODE_SYSTEM_URL.into(),
        identifier: vec![Identifier {
            system: URI_SYSTEM.into(),
            value: format!("urn:oid:{OID_ROOT}.{millis}.{index}"),
        }],
        version: CODE_SYSTEM_VERSION.into(),
        name: CODE_SYSTEM_NAME.into(),
        title: CODE_SYSTEM_TITLE.into(),
        status: "active".into(),
        experimental: false,
        date: timestamp.to_string(),
        publisher: PUBLISHER.into(),
        contact: vec![ContactDetail {
            name: CONTACT_NAME.into(),
            telecom: vec![ContactPoint {
                system: "email".into(),
                value: submitter.to_string(),
            }],
        }],
        description: DESCRIPTION.into(),
        jurisdiction: vec![CodeableConcept {
            coding: vec![Coding {
                system: "urn:iso:std:iso:3166".into(),
                code: "IN".into(),
                display: Some("India".into()),
            }],
        }],
        purpose: PURPOSE.into(),
        copyright: COPYRIGHT.into(),
        case_sensitive: true,
        value_set: VALUE_SET_URL.into(),
        content: "complete".into(),
        count: 1,
        concept: vec![concept(result)],
    }
}

fn concept(result: &MappingResult) -> Concept {
    let sides = [
        (ClassificationSystem::Tm2, result.secondary()),
        (ClassificationSystem::Biomedicine, result.tertiary()),
    ];

    let mut designation = Vec::new();
    let mut property = vec![
        ConceptProperty {
            code: "confidence_score".into(),
            value: PropertyValue::Decimal(result.confidence_score),
        },
        ConceptProperty {
            code: "mapping_status".into(),
            value: PropertyValue::Code(result.mapping_status.as_str().into()),
        },
    ];

    for (system, side) in sides {
        let Some((code, term)) = side else { continue };
        designation.push(Designation {
            language: "en-US".into(),
            usage: Coding {
                system: DESIGNATION_USAGE.into(),
                code: "display".into(),
                display: None,
            },
            value: format!("{}: {code} - {term}", system.label()),
        });
        property.push(ConceptProperty {
            code: system.property_code().into(),
            value: PropertyValue::Text(format!("{code}|{term}")),
        });
    }

    Concept {
        code: result.source_code.clone(),
        display: result.source_term.clone(),
        definition: format!("Traditional medicine term: {}", result.source_term),
        designation,
        property,
    }
}
