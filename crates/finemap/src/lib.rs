//! # finemap
//!
//! Fine-mapping of genomic interactions from neural-network attribution.
//!
//! For each interaction between two genomic regions, finemap asks an
//! attribution engine which input positions drove the prediction, sums that
//! attribution over tracks, and reports the single highest-importance bin on
//! each side as a genomic coordinate:
//!
//! - **Core**: seeds, shapes, axis padding ([`core`])
//! - **Data**: interaction tables, NumPy tensors, output files ([`data`])
//! - **Explain**: sample preparation, attribution engines, importance,
//!   fine-map resolution and the parallel pipeline ([`explain`])
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use finemap::prelude::*;
//!
//! let records = read_interactions("interactions.tsv")?;
//! let data = read_data_npy("data.npy")?;
//!
//! let model = LinearPairModel::load("model.npy")?;
//! let engine = IntegratedGradients::<DefaultBackend, _>::new(model, Default::default());
//!
//! let config = FineMapConfig::default().with_half_pad(10).with_resolution(100);
//! let run = FineMapPipeline::new(engine, config)?.run(&records, &data)?;
//! run.save(&records, &OutputPaths::new("out", "."))?;
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

// Re-export all crates
pub use finemap_core as core;
pub use finemap_data as data;
pub use finemap_explain as explain;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use finemap::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use finemap_core::{Padding, SampleShape, Seed, Side};

    // Data
    pub use finemap_data::{
        read_data_npy, read_importances_npy, read_interactions, FineMapResult, InteractionRecord,
        OutputPaths, Region,
    };

    // Explain
    pub use finemap_explain::{
        aggregate_importance, rand_argmax, DefaultBackend, Explainer, FineMapConfig,
        FineMapPipeline, FineMapRun, FineMapper, IndexRange, IntegratedGradients,
        LinearPairModel, PairModel, SamplePair, SamplePreparer,
    };
}
