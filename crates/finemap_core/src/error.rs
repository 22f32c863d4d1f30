//! Error types for finemap_core.

use thiserror::Error;

/// Result type alias using [`CoreError`].
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core errors that can occur in finemap_core operations.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Crop would remove more entries than the axis holds.
    #[error("Cannot crop {left}+{right} entries from axis of length {len}")]
    CropOutOfRange {
        /// Left crop count.
        left: usize,
        /// Right crop count.
        right: usize,
        /// Length of the cropped axis.
        len: usize,
    },

    /// Axis index is not valid for the array.
    #[error("Axis {axis} out of range for array with {ndim} dimensions")]
    InvalidAxis {
        /// Requested axis.
        axis: usize,
        /// Number of dimensions of the array.
        ndim: usize,
    },

    /// Invalid tensor shape provided.
    #[error("Invalid shape: expected {expected}, got {got}")]
    InvalidShape {
        /// Expected shape description.
        expected: String,
        /// Actual shape description.
        got: String,
    },

    /// Dimension error.
    #[error("Dimension error: expected {expected} dimensions, got {got}")]
    DimensionError {
        /// Expected number of dimensions.
        expected: usize,
        /// Actual number of dimensions.
        got: usize,
    },
}
