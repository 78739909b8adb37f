//! Inference error taxonomy.

use thiserror::Error;

/// Errors raised while loading or running the depth model.
#[derive(Debug, Error)]
pub enum InferError {
    /// The model asset could not be loaded. Fatal at startup: no
    /// inference is possible without it and retrying a fixed asset
    /// cannot change the outcome.
    #[error("Failed to load model: {0}")]
    ModelLoad(String),

    /// The tensor shape disagrees with the expected grid.
    #[error("Shape mismatch: expected {expected}, got {got}")]
    ShapeMismatch { expected: String, got: String },

    /// The model produced values no downstream stage accepts.
    #[error("Invalid model output: {0}")]
    InvalidOutput(String),

    /// The inference engine failed internally.
    #[error("Inference backend error: {0}")]
    Backend(String),
}

impl From<parallax_data::DepthError> for InferError {
    fn from(err: parallax_data::DepthError) -> Self {
        InferError::InvalidOutput(err.to_string())
    }
}
