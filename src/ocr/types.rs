//! OCR result types

use serde::Serialize;
use thiserror::Error;

/// One recognized text region, in engine emission order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionRecord {
    /// Recognized text
    pub text: String,
    /// Confidence score in [0, 1]
    pub confidence: f64,
}

/// Errors produced at the engine boundary.
///
/// None of this detail reaches a client; the handler logs it and collapses
/// everything into the generic processing failure.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to launch OCR helper: {0}")]
    Launch(String),

    #[error("OCR helper exited with failure: {0}")]
    Process(String),

    #[error("engine returned malformed output: {0}")]
    MalformedOutput(String),

    #[error("OCR serving request failed: {0}")]
    Api(String),
}
