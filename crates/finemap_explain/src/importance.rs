//! Per-position importance from restored attribution.

use ndarray::{Array2, ArrayView3, Axis};

/// Sum attribution over the track axis.
///
/// Takes a restored `(2, T, L)` attribution and returns a `(2, L)` matrix
/// holding one importance value per side and position. Values are raw sums,
/// not normalized.
#[must_use]
pub fn aggregate_importance(attribution: &ArrayView3<'_, f32>) -> Array2<f32> {
    attribution.sum_axis(Axis(1))
}
