//! OCR engine boundary and result normalization
//!
//! The engine itself is external; this module owns the seam around it: the
//! [`OcrEngine`] trait with its command and HTTP-sidecar backends, and the
//! normalizer that flattens whichever raw result shape the engine emitted
//! into [`ExtractionRecord`]s.

pub mod engine;
pub mod normalize;
pub mod types;

pub use engine::{CommandEngine, OcrEngine, ServingEngine};
pub use normalize::normalize;
pub use types::{EngineError, ExtractionRecord};
