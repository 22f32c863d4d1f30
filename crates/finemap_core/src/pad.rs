//! Zero-padding along a single axis, and its inverse.
//!
//! [`pad_axis`] and [`crop_axis`] form a strict inverse pair: cropping a
//! padded array with the same [`Padding`] returns the original array
//! element for element.

use ndarray::{Array, ArrayView, Axis, Dimension, Slice};
use num_traits::Zero;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Number of entries inserted before and after an axis.
///
/// # Example
///
/// ```rust
/// use finemap_core::Padding;
///
/// let padding = Padding::from_total(7);
/// assert_eq!(padding, Padding::new(3, 4));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Padding {
    left: usize,
    right: usize,
}

impl Padding {
    /// Create a padding with explicit left and right counts.
    #[must_use]
    pub const fn new(left: usize, right: usize) -> Self {
        Self { left, right }
    }

    /// Split a total pad count into `left = total / 2` (floor) and
    /// `right = total - left`.
    ///
    /// An odd total therefore puts the extra unit on the right.
    #[must_use]
    pub const fn from_total(total: usize) -> Self {
        let left = total / 2;
        Self {
            left,
            right: total - left,
        }
    }

    /// Symmetric padding of `half_width` on each end.
    #[must_use]
    pub const fn symmetric(half_width: usize) -> Self {
        Self::from_total(2 * half_width)
    }

    /// Total entries added to the axis.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.left + self.right
    }

    /// Whether this padding adds nothing.
    #[must_use]
    pub const fn is_none(&self) -> bool {
        self.left == 0 && self.right == 0
    }
}

fn check_axis(ndim: usize, axis: Axis) -> Result<()> {
    if axis.index() >= ndim {
        return Err(CoreError::InvalidAxis {
            axis: axis.index(),
            ndim,
        });
    }
    Ok(())
}

/// Insert zeros before and after the existing data along `axis`.
///
/// # Panics
///
/// Panics if `axis` is out of range for the array, matching `ndarray`'s own
/// axis methods. Use [`crop_axis`] for the fallible inverse.
pub fn pad_axis<A, D>(array: &ArrayView<'_, A, D>, axis: Axis, padding: Padding) -> Array<A, D>
where
    A: Clone + Zero,
    D: Dimension,
{
    let len = array.len_of(axis);
    let mut dim = array.raw_dim();
    dim[axis.index()] = len + padding.total();

    let mut out = Array::<A, D>::zeros(dim);
    out.slice_axis_mut(axis, Slice::from(padding.left..padding.left + len))
        .assign(array);
    out
}

/// Remove `padding.left` entries from the start and `padding.right` entries
/// from the end of `axis`.
///
/// # Errors
///
/// Returns an error if `axis` is out of range or the padding is larger than
/// the axis.
pub fn crop_axis<A, D>(array: &ArrayView<'_, A, D>, axis: Axis, padding: Padding) -> Result<Array<A, D>>
where
    A: Clone,
    D: Dimension,
{
    check_axis(array.ndim(), axis)?;
    let len = array.len_of(axis);
    if padding.total() > len {
        return Err(CoreError::CropOutOfRange {
            left: padding.left,
            right: padding.right,
            len,
        });
    }

    Ok(array
        .slice_axis(axis, Slice::from(padding.left..len - padding.right))
        .to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array1, Array3};

    fn sample() -> Array3<f32> {
        Array3::from_shape_fn((2, 3, 5), |(s, t, l)| (s * 100 + t * 10 + l) as f32 + 1.0)
    }

    #[test]
    fn test_from_total_odd_pads_right_more() {
        let padding = Padding::from_total(7);
        assert_eq!(padding, Padding::new(3, 4));

        let x = Array1::<f32>::ones(5);
        let padded = pad_axis(&x.view(), Axis(0), padding);
        assert_eq!(padded.len(), 12);
        assert_eq!(padded.slice(ndarray::s![..3]).sum(), 0.0);
        assert_eq!(padded.slice(ndarray::s![3..8]).sum(), 5.0);
        assert_eq!(padded.slice(ndarray::s![8..]).sum(), 0.0);
    }

    #[test]
    fn test_symmetric() {
        assert_eq!(Padding::symmetric(5), Padding::new(5, 5));
        assert!(Padding::symmetric(0).is_none());
    }

    #[test]
    fn test_pad_then_crop_is_identity() {
        let x = sample();
        for axis in 0..3 {
            for (left, right) in [(0, 0), (0, 3), (2, 0), (1, 4), (5, 5)] {
                let padding = Padding::new(left, right);
                let padded = pad_axis(&x.view(), Axis(axis), padding);
                assert_eq!(padded.len_of(Axis(axis)), x.len_of(Axis(axis)) + left + right);
                let cropped = crop_axis(&padded.view(), Axis(axis), padding).unwrap();
                assert_eq!(cropped, x);
            }
        }
    }

    #[test]
    fn test_padding_is_zero_valued() {
        let x = sample();
        let padded = pad_axis(&x.view(), Axis(2), Padding::new(2, 1));
        assert_eq!(padded.dim(), (2, 3, 8));
        for s in 0..2 {
            for t in 0..3 {
                assert_eq!(padded[[s, t, 0]], 0.0);
                assert_eq!(padded[[s, t, 1]], 0.0);
                assert_eq!(padded[[s, t, 7]], 0.0);
                assert_eq!(padded[[s, t, 2]], x[[s, t, 0]]);
            }
        }
    }

    #[test]
    fn test_crop_errors() {
        let x = Array1::<f32>::zeros(3);
        assert!(matches!(
            crop_axis(&x.view(), Axis(0), Padding::new(2, 2)),
            Err(CoreError::CropOutOfRange { .. })
        ));
        assert!(matches!(
            crop_axis(&x.view(), Axis(1), Padding::default()),
            Err(CoreError::InvalidAxis { axis: 1, ndim: 1 })
        ));
    }
}
