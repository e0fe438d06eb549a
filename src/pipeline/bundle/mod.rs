//! FHIR bundle generation for mapping results.

pub mod generator;
pub mod types;

pub use generator::{generate, generate_at, to_json_pretty};
pub use types::*;
