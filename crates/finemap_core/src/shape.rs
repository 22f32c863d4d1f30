//! Interaction data shape metadata.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Number of sides (genomic regions) per interaction.
pub const SIDES: usize = 2;

/// One of the two genomic regions of an interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Side 0, the left region (chromosome A).
    Left,
    /// Side 1, the right region (chromosome B).
    Right,
}

impl Side {
    /// Both sides in index order.
    pub const ALL: [Side; SIDES] = [Side::Left, Side::Right];

    /// Index of this side along the side axis.
    #[must_use]
    pub const fn index(&self) -> usize {
        match self {
            Side::Left => 0,
            Side::Right => 1,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Left => write!(f, "left"),
            Side::Right => write!(f, "right"),
        }
    }
}

/// Shape metadata for an interaction data tensor.
///
/// Follows the convention `(N, S, T, L)` with `S` fixed at [`SIDES`]:
/// - `N`: Number of interactions
/// - `T`: Tracks per position
/// - `L`: Positions per side
///
/// # Example
///
/// ```rust
/// use finemap_core::SampleShape;
///
/// let shape = SampleShape::from_dims(&[10, 2, 4, 250]).unwrap();
/// assert_eq!(shape.interactions(), 10);
/// assert_eq!(shape.importance_dims(), (10, 2, 250));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SampleShape {
    interactions: usize,
    tracks: usize,
    positions: usize,
}

impl SampleShape {
    /// Create a new shape.
    #[must_use]
    pub const fn new(interactions: usize, tracks: usize, positions: usize) -> Self {
        Self {
            interactions,
            tracks,
            positions,
        }
    }

    /// Create a shape from the dimensions of a 4-D data tensor.
    ///
    /// # Errors
    ///
    /// Returns an error if `dims` is not 4-dimensional or the side axis is
    /// not of length [`SIDES`].
    pub fn from_dims(dims: &[usize]) -> Result<Self> {
        if dims.len() != 4 {
            return Err(CoreError::DimensionError {
                expected: 4,
                got: dims.len(),
            });
        }
        if dims[1] != SIDES {
            return Err(CoreError::InvalidShape {
                expected: format!("(N, {SIDES}, T, L)"),
                got: format!("{dims:?}"),
            });
        }
        Ok(Self::new(dims[0], dims[2], dims[3]))
    }

    /// Number of interactions.
    #[must_use]
    pub const fn interactions(&self) -> usize {
        self.interactions
    }

    /// Shape of the full gradient output: `(N, S, T, L)`.
    #[must_use]
    pub const fn gradient_dims(&self) -> (usize, usize, usize, usize) {
        (self.interactions, SIDES, self.tracks, self.positions)
    }

    /// Shape of the full importance output: `(N, S, L)`.
    #[must_use]
    pub const fn importance_dims(&self) -> (usize, usize, usize) {
        (self.interactions, SIDES, self.positions)
    }
}

impl std::fmt::Display for SampleShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "(N={}, S={}, T={}, L={})",
            self.interactions, SIDES, self.tracks, self.positions
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_from_dims() {
        let shape = SampleShape::from_dims(&[3, 2, 5, 100]).unwrap();
        assert_eq!(shape.gradient_dims(), (3, 2, 5, 100));
        assert_eq!(shape.importance_dims(), (3, 2, 100));
    }

    #[test]
    fn test_shape_rejects_bad_dims() {
        assert!(matches!(
            SampleShape::from_dims(&[3, 2, 5]),
            Err(CoreError::DimensionError { expected: 4, got: 3 })
        ));
        assert!(matches!(
            SampleShape::from_dims(&[3, 3, 5, 100]),
            Err(CoreError::InvalidShape { .. })
        ));
    }

    #[test]
    fn test_side_index() {
        assert_eq!(Side::ALL.map(|s| s.index()), [0, 1]);
        assert_eq!(Side::Right.to_string(), "right");
    }

    #[test]
    fn test_shape_display() {
        assert_eq!(SampleShape::new(1, 2, 3).to_string(), "(N=1, S=2, T=2, L=3)");
    }
}
