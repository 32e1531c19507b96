//! Error types for prominent color extraction

use thiserror::Error;

/// Result type alias for prominent color operations
pub type Result<T> = std::result::Result<T, ProminentError>;

/// Everything that can go wrong while extracting prominent colors.
///
/// `ConvergenceExceeded` and `MetricFallback` are never returned from the
/// pipeline. They describe conditions the pipeline recovers from and are
/// only logged, see [`ProminentError::is_recoverable`].
#[derive(Debug, Error)]
pub enum ProminentError {
    /// No usable pixels remain after masking
    #[error("no non-transparent pixels found (fully transparent image, or the background mask removed every pixel)")]
    EmptyInput,

    /// More clusters requested than distinct colors available
    #[error("k larger than the number of distinct colors: {k} vs {distinct}")]
    InvalidK { k: usize, distinct: usize },

    /// Invalid input parameters
    #[error("invalid parameter: {parameter} = {value}")]
    InvalidParameter { parameter: String, value: String },

    /// K-means hit the round cap before it stopped moving samples
    #[error("k-means terminated after reaching the maximum of {rounds} rounds")]
    ConvergenceExceeded { rounds: usize },

    /// Perceptual distance could not be computed for one comparison
    #[error("perceptual distance failed, falling back to RGB: {reason}")]
    MetricFallback { reason: String },

    /// Input bytes could not be decoded into an image
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
}

impl ProminentError {
    pub(crate) fn invalid_parameter(parameter: impl Into<String>, value: impl ToString) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            value: value.to_string(),
        }
    }

    /// Check if this error describes a condition the pipeline recovers from
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ProminentError::ConvergenceExceeded { .. } | ProminentError::MetricFallback { .. }
        )
    }
}
