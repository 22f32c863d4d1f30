//! Run configuration.

use std::ops::Range;

use finemap_core::Seed;
use serde::{Deserialize, Serialize};

use crate::error::{ExplainError, Result};

/// Half-open range `[start, end)` of interaction indices to process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexRange {
    /// First interaction processed.
    pub start: usize,
    /// One past the last interaction processed.
    pub end: usize,
}

impl IndexRange {
    /// Create a new range.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Validate against the number of interactions.
    ///
    /// # Errors
    ///
    /// Returns a configuration error unless `start < end <= n_interactions`.
    pub fn resolve(&self, n_interactions: usize) -> Result<Range<usize>> {
        if self.start >= self.end || self.end > n_interactions {
            return Err(ExplainError::Config(format!(
                "index range [{}, {}) is invalid for {} interactions",
                self.start, self.end, n_interactions
            )));
        }
        Ok(self.start..self.end)
    }
}

/// Configuration for a fine-mapping run.
///
/// # Example
///
/// ```rust
/// use finemap_explain::{FineMapConfig, IndexRange};
///
/// let config = FineMapConfig::default()
///     .with_half_pad(10)
///     .with_resolution(50)
///     .with_range(IndexRange::new(0, 100));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FineMapConfig {
    /// Zero positions added on each end of each side before attribution.
    pub half_pad: usize,
    /// Bin width in base pairs.
    pub resolution: u64,
    /// Internal resolution of the attribution algorithm.
    pub num_steps: usize,
    /// Interactions to process; all when `None`.
    pub range: Option<IndexRange>,
    /// Worker threads; rayon's default when `None`.
    pub threads: Option<usize>,
    /// Master seed for tie-breaking.
    pub seed: Seed,
}

impl Default for FineMapConfig {
    fn default() -> Self {
        Self {
            half_pad: 0,
            resolution: 100,
            num_steps: 50,
            range: None,
            threads: None,
            seed: Seed::default(),
        }
    }
}

impl FineMapConfig {
    /// Set the half pad width.
    #[must_use]
    pub fn with_half_pad(mut self, half_pad: usize) -> Self {
        self.half_pad = half_pad;
        self
    }

    /// Set the bin width.
    #[must_use]
    pub fn with_resolution(mut self, resolution: u64) -> Self {
        self.resolution = resolution;
        self
    }

    /// Set the attribution step count.
    #[must_use]
    pub fn with_num_steps(mut self, num_steps: usize) -> Self {
        self.num_steps = num_steps;
        self
    }

    /// Restrict the run to a range of interactions.
    #[must_use]
    pub fn with_range(mut self, range: IndexRange) -> Self {
        self.range = Some(range);
        self
    }

    /// Set the worker thread count.
    #[must_use]
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    /// Set the tie-breaking seed.
    #[must_use]
    pub fn with_seed(mut self, seed: Seed) -> Self {
        self.seed = seed;
        self
    }

    /// Check settings that do not depend on the input data.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for a zero resolution, zero attribution
    /// steps, zero threads or an empty range.
    pub fn validate(&self) -> Result<()> {
        if self.resolution == 0 || i64::try_from(self.resolution).is_err() {
            return Err(ExplainError::Config(format!(
                "resolution must be a positive bin width, got {}",
                self.resolution
            )));
        }
        if self.num_steps == 0 {
            return Err(ExplainError::Config("num_steps must be at least 1".to_string()));
        }
        if self.threads == Some(0) {
            return Err(ExplainError::Config("threads must be at least 1".to_string()));
        }
        if let Some(range) = self.range {
            if range.start >= range.end {
                return Err(ExplainError::Config(format!(
                    "index range [{}, {}) is empty",
                    range.start, range.end
                )));
            }
        }
        Ok(())
    }

    /// Interactions to process out of `n_interactions`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the range does not fit.
    pub fn index_range(&self, n_interactions: usize) -> Result<Range<usize>> {
        match self.range {
            Some(range) => range.resolve(n_interactions),
            None => Ok(0..n_interactions),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FineMapConfig::default();
        assert_eq!(config.half_pad, 0);
        assert_eq!(config.resolution, 100);
        assert_eq!(config.num_steps, 50);
        assert!(config.range.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_settings() {
        assert!(FineMapConfig::default().with_resolution(0).validate().is_err());
        assert!(FineMapConfig::default().with_num_steps(0).validate().is_err());
        assert!(FineMapConfig::default().with_threads(0).validate().is_err());
        assert!(FineMapConfig::default()
            .with_range(IndexRange::new(5, 5))
            .validate()
            .is_err());
    }

    #[test]
    fn test_index_range() {
        let config = FineMapConfig::default();
        assert_eq!(config.index_range(7).unwrap(), 0..7);

        let config = config.with_range(IndexRange::new(2, 5));
        assert_eq!(config.index_range(7).unwrap(), 2..5);
        assert!(config.index_range(4).is_err());
    }

    #[test]
    fn test_config_serialization() {
        let config = FineMapConfig::default()
            .with_half_pad(3)
            .with_range(IndexRange::new(1, 4))
            .with_seed(Seed::new(99));
        let json = serde_json::to_string(&config).unwrap();
        let restored: FineMapConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, restored);
    }
}
