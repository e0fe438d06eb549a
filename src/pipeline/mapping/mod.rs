//! Mapping engine: NAMASTE row → ICD-11 TM2 / Biomedicine targets with a
//! confidence score and status.
//!
//! Three pieces, composed by `MappingEngine`:
//! - `ReferenceIndex` (injected): is the code/term a known NAMC entry?
//! - `TargetGenerator` (injected): which targets does the code project onto?
//! - `confidence::score`: status and score from those two answers.

pub mod confidence;
pub mod engine;
pub mod targets;

pub use confidence::{score, scores};
pub use engine::MappingEngine;
pub use targets::{HashTargetGenerator, TargetGenerator};
