//! Sample preparation for the attribution engine, and its inverse.
//!
//! A raw sample is `(2, T, L)`: two sides, each `T` tracks over `L`
//! positions stored 5'->3'. The attribution engine expects each side as a
//! `(positions, tracks)` matrix, with both sides running outward from the
//! interaction breakpoint. Side 1 is therefore reversed along the position
//! axis before padding, and reversed back after cropping.

use finemap_core::{crop_axis, pad_axis, Padding, Side, SIDES};
use ndarray::{s, stack, Array2, Array3, ArrayView2, ArrayView3, Axis};

use crate::error::{ExplainError, Result};

/// One `(positions, tracks)` matrix per side.
///
/// Used both for prepared samples and for the attribution the engine
/// returns for them.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplePair {
    /// Side 0 matrix.
    pub left: Array2<f32>,
    /// Side 1 matrix.
    pub right: Array2<f32>,
}

impl SamplePair {
    /// Create a pair from its two matrices.
    pub fn new(left: Array2<f32>, right: Array2<f32>) -> Self {
        Self { left, right }
    }

    /// The matrix for one side.
    #[must_use]
    pub fn side(&self, side: Side) -> &Array2<f32> {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    /// `(positions, tracks)` of each side.
    #[must_use]
    pub fn dims(&self) -> [(usize, usize); SIDES] {
        [self.left.dim(), self.right.dim()]
    }
}

/// Converts raw samples to engine input and engine output back to raw
/// sample coordinates.
///
/// # Example
///
/// ```rust
/// use finemap_explain::SamplePreparer;
/// use ndarray::Array3;
///
/// let preparer = SamplePreparer::new(2);
/// let raw = Array3::<f32>::ones((2, 3, 10));
/// let prepared = preparer.prepare(&raw.view());
/// assert_eq!(prepared.left.dim(), (14, 3));
/// assert_eq!(preparer.restore(&prepared).unwrap(), raw);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplePreparer {
    padding: Padding,
}

impl SamplePreparer {
    /// Pad each side with `half_pad` zero positions on both ends.
    #[must_use]
    pub const fn new(half_pad: usize) -> Self {
        Self::with_padding(Padding::symmetric(half_pad))
    }

    /// Use an explicit padding.
    #[must_use]
    pub const fn with_padding(padding: Padding) -> Self {
        Self { padding }
    }

    fn prepare_side(&self, side: ArrayView2<'_, f32>) -> Array2<f32> {
        if self.padding.is_none() {
            return side.t().to_owned();
        }
        pad_axis(&side, Axis(1), self.padding).reversed_axes()
    }

    /// Prepare a raw `(2, T, L)` sample.
    ///
    /// Side 0 is padded and transposed to `(L + pad, T)`. Side 1 is reversed
    /// along positions first, then padded and transposed the same way.
    ///
    /// # Panics
    ///
    /// Panics if the side axis of `raw` is shorter than 2.
    pub fn prepare(&self, raw: &ArrayView3<'_, f32>) -> SamplePair {
        let left = raw.index_axis(Axis(0), Side::Left.index());
        let right = raw.index_axis(Axis(0), Side::Right.index());
        let right = right.slice(s![.., ..;-1]);

        SamplePair::new(self.prepare_side(left), self.prepare_side(right))
    }

    fn restore_side(&self, side: &Array2<f32>) -> Result<Array2<f32>> {
        let tracks_first = side.t();
        if self.padding.is_none() {
            return Ok(tracks_first.to_owned());
        }
        Ok(crop_axis(&tracks_first, Axis(1), self.padding)?)
    }

    /// Map an attribution pair back to raw `(2, T, L)` coordinates.
    ///
    /// Each side is transposed back to `(T, L + pad)` and cropped; side 1 is
    /// then reversed to its original orientation.
    ///
    /// # Errors
    ///
    /// Returns an error if a side is shorter than the padding or the two sides
    /// disagree in shape.
    pub fn restore(&self, attribution: &SamplePair) -> Result<Array3<f32>> {
        let left = self.restore_side(&attribution.left)?;
        let right = self.restore_side(&attribution.right)?;
        let right = right.slice(s![.., ..;-1]);

        if left.dim() != right.dim() {
            return Err(ExplainError::AttributionShape {
                side: Side::Right,
                expected: left.dim(),
                got: right.dim(),
            });
        }

        Ok(stack(Axis(0), &[left.view(), right])?)
    }
}
