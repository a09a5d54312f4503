//! Error types for figure rendering and animation recording.

use lib_dsp::DspError;
use thiserror::Error;

/// Errors that can occur while building or recording an animation.
#[derive(Debug, Error)]
pub enum AnimError {
    /// A scene produced an empty frame sequence.
    #[error("Animation has no frames")]
    NoFrames,

    /// A scene addressed a subplot the figure does not have.
    #[error("Axes index {index} out of range for figure with {count} axes")]
    AxesOutOfRange { index: usize, count: usize },

    /// The process-wide display settings were already set.
    #[error("Display settings already initialized")]
    DisplayAlreadyInitialized,

    /// Numeric precomputation failed.
    #[error("DSP error: {0}")]
    Dsp(#[from] DspError),

    /// Writing rendered markup failed.
    #[error("Render error: {0}")]
    Format(#[from] std::fmt::Error),
}

/// Result type for animation operations.
pub type AnimResult<T> = Result<T, AnimError>;
