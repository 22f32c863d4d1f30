//! Error types for finemap_explain.

use finemap_core::Side;
use thiserror::Error;

/// Result type alias using [`ExplainError`].
pub type Result<T> = std::result::Result<T, ExplainError>;

/// Why no position could be selected from an importance vector.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgmaxError {
    /// The importance vector has no positions.
    #[error("importance vector is empty")]
    Empty,
    /// No importance value is finite.
    #[error("importance vector has no finite values")]
    NoFiniteValues,
}

/// Errors raised while explaining and fine-mapping interactions.
///
/// Configuration and input errors abort a run; everything else is recorded
/// against the single interaction that produced it.
#[derive(Error, Debug)]
pub enum ExplainError {
    /// Invalid run configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The attribution engine failed or panicked.
    #[error("Attribution engine error: {0}")]
    Engine(String),

    /// The attribution engine returned tensors of the wrong shape.
    #[error("Attribution shape mismatch on {side} side: expected {expected:?}, got {got:?}")]
    AttributionShape {
        /// Side whose tensor is wrong.
        side: Side,
        /// Shape of the prepared input.
        expected: (usize, usize),
        /// Shape returned by the engine.
        got: (usize, usize),
    },

    /// No fine-mapped position could be selected.
    #[error("Cannot fine-map {side} side: {source}")]
    Resolve {
        /// Side whose importance vector is unusable.
        side: Side,
        /// Underlying cause.
        #[source]
        source: ArgmaxError,
    },

    /// The fine-mapped bin does not fit in `i64` coordinates.
    #[error("Fine-mapped {side} bin overflows: {positions} positions of {resolution} bp")]
    CoordinateOverflow {
        /// Side whose coordinates overflow.
        side: Side,
        /// Length of the importance vector.
        positions: usize,
        /// Bin width in base pairs.
        resolution: i64,
    },

    /// The interaction was skipped because the run was cancelled.
    #[error("Cancelled before processing")]
    Cancelled,

    /// Shape error from ndarray.
    #[error("Shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    /// Core error.
    #[error("Core error: {0}")]
    Core(#[from] finemap_core::CoreError),

    /// Data error.
    #[error("Data error: {0}")]
    Data(#[from] finemap_data::DataError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
