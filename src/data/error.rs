use thiserror::Error;

/// Result alias for pipeline operations.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

/// Typed failures surfaced by the post-processing pipeline.
///
/// Nothing here is retried internally; the caller owns retry and user messaging.
/// An empty detection list is a valid result and never an error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    /// Raw output length does not equal `num_detections * num_channels`.
    #[error("invalid output buffer: expected {expected} values, got {got}")]
    InvalidBuffer { expected: usize, got: usize },

    /// No model is loaded, or inference produced no usable output buffer.
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("invalid pipeline config: {0}")]
    InvalidConfig(String),

    /// Class-vector length derived from the channel count disagrees with the label table.
    #[error("model exports {classes} class scores but the label table has {labels} entries")]
    LabelMismatch { classes: usize, labels: usize },

    #[error("failed to convert image to tensor: {0}")]
    Preprocess(String),
}
