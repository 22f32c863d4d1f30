//! Fine-map resolution: from importance vectors to genomic bins.

use finemap_core::Side;
use finemap_data::{FineMapResult, InteractionRecord, Region};
use ndarray::{ArrayView1, ArrayView2, Axis};
use rand::Rng;

use crate::error::{ArgmaxError, ExplainError, Result};

/// Index of the maximum value, breaking ties uniformly at random.
///
/// NaN is never selected; `+inf` is a regular maximum. Positions whose value
/// equals the maximum are all candidates, and one of them is drawn from `rng`
/// with equal probability.
///
/// # Errors
///
/// Returns [`ArgmaxError::Empty`] for an empty vector and
/// [`ArgmaxError::NoFiniteValues`] when no value is finite.
///
/// # Example
///
/// ```rust
/// use finemap_core::Seed;
/// use finemap_explain::rand_argmax;
/// use ndarray::array;
///
/// let mut rng = Seed::new(1).to_rng();
/// let idx = rand_argmax(array![0.1f32, 0.9, 0.2].view(), &mut rng).unwrap();
/// assert_eq!(idx, 1);
/// ```
pub fn rand_argmax<R: Rng + ?Sized>(
    values: ArrayView1<'_, f32>,
    rng: &mut R,
) -> std::result::Result<usize, ArgmaxError> {
    if values.is_empty() {
        return Err(ArgmaxError::Empty);
    }

    if !values.iter().any(|v| v.is_finite()) {
        return Err(ArgmaxError::NoFiniteValues);
    }
    let max = values
        .iter()
        .copied()
        .filter(|v| !v.is_nan())
        .fold(f32::NEG_INFINITY, f32::max);

    let tied: Vec<usize> = values
        .iter()
        .enumerate()
        .filter(|&(_, &v)| v == max)
        .map(|(i, _)| i)
        .collect();

    Ok(tied[rng.gen_range(0..tied.len())])
}

/// Leftmost coordinate of a window of `positions` bins of width
/// `resolution`, centered on `[start, end)`.
///
/// Computed as `floor((start + end - positions * resolution) / 2)`; the
/// result may be negative. Returns `None` if the window does not fit in an
/// `i64`.
#[must_use]
pub fn window_start(start: i64, end: i64, positions: usize, resolution: i64) -> Option<i64> {
    let width = i64::try_from(positions).ok()?.checked_mul(resolution)?;
    Some(start.checked_add(end)?.checked_sub(width)?.div_euclid(2))
}

/// Maps importance vectors to fine-mapped bins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FineMapper {
    resolution: i64,
}

impl FineMapper {
    /// Create a mapper for bins of `resolution` base pairs.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `resolution` is zero or does not fit
    /// a signed coordinate.
    pub fn new(resolution: u64) -> Result<Self> {
        match i64::try_from(resolution) {
            Ok(r) if r > 0 => Ok(Self { resolution: r }),
            _ => Err(ExplainError::Config(format!(
                "resolution must be a positive bin width, got {resolution}"
            ))),
        }
    }

    /// Fine-map one side: the bin at `index` within the centered window.
    ///
    /// Returns `None` if any coordinate overflows.
    #[must_use]
    pub fn bin(&self, region: &Region, positions: usize, index: usize) -> Option<Region> {
        let leftmost = window_start(region.start, region.end, positions, self.resolution)?;
        let offset = i64::try_from(index).ok()?.checked_mul(self.resolution)?;
        let start = leftmost.checked_add(offset)?;
        let end = start.checked_add(self.resolution)?;
        Some(Region::new(region.chrom.clone(), start, end))
    }

    /// Fine-map both sides of an interaction from its `(2, L)` importance.
    ///
    /// # Errors
    ///
    /// Returns [`ExplainError::Resolve`] if either side's importance vector is
    /// empty or has no finite values, and [`ExplainError::CoordinateOverflow`]
    /// if the fine-mapped bin does not fit in `i64` coordinates.
    pub fn resolve<R: Rng + ?Sized>(
        &self,
        record: &InteractionRecord,
        importance: &ArrayView2<'_, f32>,
        rng: &mut R,
    ) -> Result<FineMapResult> {
        let positions = importance.len_of(Axis(1));
        let mut pick = |side: Side| -> Result<Region> {
            let values = importance.index_axis(Axis(0), side.index());
            let index = rand_argmax(values, &mut *rng)
                .map_err(|source| ExplainError::Resolve { side, source })?;
            self.bin(record.region(side), positions, index)
                .ok_or(ExplainError::CoordinateOverflow {
                    side,
                    positions,
                    resolution: self.resolution,
                })
        };

        let left = pick(Side::Left)?;
        let right = pick(Side::Right)?;
        Ok(FineMapResult { left, right })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use finemap_core::Seed;
    use ndarray::{array, Array1, Array2};

    #[test]
    fn test_unique_max() {
        let mut rng = Seed::new(0).to_rng();
        for _ in 0..100 {
            assert_eq!(rand_argmax(array![1.0f32, 5.0, -3.0, 4.9].view(), &mut rng), Ok(1));
        }
    }

    #[test]
    fn test_ties_are_uniform() {
        let values = array![0.0f32, 2.0, 1.0, 2.0, 2.0, -1.0];
        let mut rng = Seed::new(42).to_rng();
        let trials = 30_000;
        let mut counts = [0usize; 6];
        for _ in 0..trials {
            counts[rand_argmax(values.view(), &mut rng).unwrap()] += 1;
        }

        assert_eq!(counts[0] + counts[2] + counts[5], 0);
        let expected = trials as f64 / 3.0;
        for idx in [1, 3, 4] {
            let freq = counts[idx] as f64;
            // ~6 standard deviations for p = 1/3
            assert!((freq - expected).abs() < 500.0, "index {idx}: {freq} vs {expected}");
        }
    }

    #[test]
    fn test_all_tied_finite_is_valid() {
        let values = Array1::<f32>::from_elem(4, 0.25);
        let mut rng = Seed::new(3).to_rng();
        let mut seen = [false; 4];
        for _ in 0..200 {
            seen[rand_argmax(values.view(), &mut rng).unwrap()] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_nan_handling() {
        let mut rng = Seed::new(0).to_rng();
        let all_nan = Array1::<f32>::from_elem(5, f32::NAN);
        assert_eq!(rand_argmax(all_nan.view(), &mut rng), Err(ArgmaxError::NoFiniteValues));

        let inf = array![f32::INFINITY, f32::NEG_INFINITY, f32::NAN];
        assert_eq!(rand_argmax(inf.view(), &mut rng), Err(ArgmaxError::NoFiniteValues));

        let partial = array![f32::NAN, 1.0, 3.0, f32::NEG_INFINITY];
        assert_eq!(rand_argmax(partial.view(), &mut rng), Ok(2));

        let empty = Array1::<f32>::zeros(0);
        assert_eq!(rand_argmax(empty.view(), &mut rng), Err(ArgmaxError::Empty));
    }

    #[test]
    fn test_positive_infinity_is_a_maximum() {
        let mut rng = Seed::new(0).to_rng();
        let values = array![1.0f32, f32::INFINITY, 3.0];
        assert_eq!(rand_argmax(values.view(), &mut rng), Ok(1));

        let with_nan = array![f32::NAN, 1.0, f32::INFINITY, 3.0];
        assert_eq!(rand_argmax(with_nan.view(), &mut rng), Ok(2));

        let tied = array![f32::INFINITY, 0.0, f32::INFINITY];
        let mut counts = [0usize; 3];
        for _ in 0..2000 {
            counts[rand_argmax(tied.view(), &mut rng).unwrap()] += 1;
        }
        assert_eq!(counts[1], 0);
        assert!(counts[0] > 800 && counts[2] > 800, "{counts:?}");
    }

    #[test]
    fn test_window_start() {
        assert_eq!(window_start(1000, 1500, 5, 100), Some(1000));
        // floor division on odd and negative sums
        assert_eq!(window_start(1000, 1501, 5, 100), Some(1000));
        assert_eq!(window_start(0, 101, 5, 100), Some(-200));
        assert_eq!(window_start(0, 1, 1, 100), Some(-50));
        assert_eq!(window_start(-3, 0, 0, 100), Some(-2));
    }

    #[test]
    fn test_window_start_overflow() {
        assert_eq!(window_start(0, 100, 250, 100_000_000_000_000_000), None);
        assert_eq!(window_start(i64::MAX, 1, 0, 100), None);
        assert_eq!(window_start(i64::MIN, -1, 1, 100), None);
    }

    #[test]
    fn test_bin_coordinates() {
        let mapper = FineMapper::new(100).unwrap();
        let bin = mapper.bin(&Region::new("chr1", 1000, 1500), 5, 3);
        assert_eq!(bin, Some(Region::new("chr1", 1300, 1400)));
    }

    #[test]
    fn test_bin_overflow() {
        let mapper = FineMapper::new(100_000_000_000_000_000).unwrap();
        assert_eq!(mapper.bin(&Region::new("chr1", 0, 100), 250, 3), None);

        let mapper = FineMapper::new(i64::MAX as u64 / 2).unwrap();
        // Window fits, but the bin end does not
        let bin = mapper.bin(&Region::new("chr1", 0, 0), 1, 0);
        assert_eq!(bin.map(|r| r.start), Some(-(i64::MAX / 4) - 1));
        assert_eq!(mapper.bin(&Region::new("chr1", i64::MAX / 2, i64::MAX / 2), 1, 1), None);
    }

    #[test]
    fn test_resolve_overflow_is_an_error() {
        let mapper = FineMapper::new(100_000_000_000_000_000).unwrap();
        let record = InteractionRecord::new(Region::new("chr1", 0, 100), Region::new("chr2", 0, 100));
        let importance = Array2::<f32>::ones((2, 250));
        let mut rng = Seed::new(0).to_rng();

        let err = mapper.resolve(&record, &importance.view(), &mut rng).unwrap_err();
        assert!(matches!(
            err,
            ExplainError::CoordinateOverflow { side: Side::Left, positions: 250, .. }
        ));
    }

    #[test]
    fn test_resolve_interaction() {
        let mapper = FineMapper::new(100).unwrap();
        let record = InteractionRecord::new(
            Region::new("chr1", 1000, 1500),
            Region::new("chr2", 5000, 5500),
        );
        let importance = array![[0.0f32, 0.1, 0.2, 0.9, 0.3], [0.7, 0.1, 0.2, 0.0, 0.3]];
        let mut rng = Seed::new(9).to_rng();

        let result = mapper.resolve(&record, &importance.view(), &mut rng).unwrap();
        assert_eq!(result.left, Region::new("chr1", 1300, 1400));
        assert_eq!(result.right, Region::new("chr2", 5000, 5100));
    }

    #[test]
    fn test_resolve_reports_failing_side() {
        let mapper = FineMapper::new(50).unwrap();
        let record = InteractionRecord::new(Region::new("a", 0, 100), Region::new("b", 0, 100));
        let mut importance = Array2::<f32>::zeros((2, 2));
        importance.row_mut(1).fill(f32::NAN);
        let mut rng = Seed::new(0).to_rng();

        let err = mapper.resolve(&record, &importance.view(), &mut rng).unwrap_err();
        assert!(matches!(
            err,
            ExplainError::Resolve { side: Side::Right, source: ArgmaxError::NoFiniteValues }
        ));
    }

    #[test]
    fn test_mapper_rejects_zero_resolution() {
        assert!(matches!(FineMapper::new(0), Err(ExplainError::Config(_))));
        assert!(matches!(FineMapper::new(u64::MAX), Err(ExplainError::Config(_))));
    }
}
