//! # finemap_explain
//!
//! Turns per-interaction attribution into fine-mapped genomic bins.
//!
//! This crate provides:
//! - [`Explainer`], the seam to any attribution engine, and
//!   [`IntegratedGradients`] over a `burn` [`PairModel`]
//! - [`SamplePreparer`] to lay out a raw two-sided sample for the engine and
//!   map attribution back to raw coordinates
//! - [`aggregate_importance`] to reduce attribution to per-position importance
//! - [`FineMapper`] and [`rand_argmax`] to pick the most important bin with
//!   unbiased tie-breaking
//! - [`FineMapPipeline`] to run all of the above over many interactions in
//!   parallel with per-interaction failure isolation
//!
//! ## Example
//!
//! ```rust,ignore
//! use finemap_explain::{FineMapConfig, FineMapPipeline, IntegratedGradients, LinearPairModel};
//!
//! let model = LinearPairModel::load("model.npy")?;
//! let engine = IntegratedGradients::<DefaultBackend, _>::new(model, Default::default());
//! let pipeline = FineMapPipeline::new(engine, FineMapConfig::default())?;
//! let run = pipeline.run(&records, &data)?;
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

mod attribution;
mod config;
mod error;
mod importance;
mod pipeline;
mod progress;
mod resolve;
mod sample;

pub use attribution::{DefaultBackend, Explainer, IntegratedGradients, LinearPairModel, PairModel};
pub use config::{FineMapConfig, IndexRange};
pub use error::{ArgmaxError, ExplainError, Result};
pub use importance::aggregate_importance;
pub use pipeline::{
    resolve_importances, write_fine_mapping, CancelFlag, FineMapPipeline, FineMapRun,
    InteractionArtifacts, InteractionOutcome, RunSummary,
};
pub use progress::{progress_bar, LogProgress, Progress};
pub use resolve::{rand_argmax, window_start, FineMapper};
pub use sample::{SamplePair, SamplePreparer};
