//! The per-interaction fine-mapping pipeline.
//!
//! Each interaction runs Prepare -> Explain -> Restore -> Aggregate ->
//! Resolve independently on a rayon pool. Results are keyed by interaction
//! index, so output order never depends on completion order. A failing
//! interaction is recorded as a failed [`InteractionOutcome`] and the run
//! continues.

use std::fs::File;
use std::io::BufWriter;
use std::ops::Range;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use finemap_core::{Seed, Side};
use finemap_data::{
    check_alignment, write_fine_map_table, write_importance_table, write_npy, DataError,
    FineMapResult, InteractionRecord, OutputPaths,
};
use ndarray::{s, Array2, Array3, Array4, ArrayView3, Axis};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::attribution::Explainer;
use crate::config::FineMapConfig;
use crate::error::{ExplainError, Result};
use crate::importance::aggregate_importance;
use crate::progress::{LogProgress, Progress};
use crate::resolve::FineMapper;
use crate::sample::{SamplePair, SamplePreparer};

/// Shared flag for cancelling a run.
///
/// Interactions that have not started when the flag is raised are recorded
/// as [`ExplainError::Cancelled`]; interactions already running finish.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Create a new, unraised flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the flag.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether the flag has been raised.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Result of fine-mapping one interaction.
#[derive(Debug)]
pub struct InteractionOutcome {
    /// Interaction index (row of the interaction table).
    pub index: usize,
    /// Fine-mapped bins, or why there are none.
    pub result: Result<FineMapResult>,
}

impl InteractionOutcome {
    /// The fine-mapped bins, if the interaction succeeded.
    #[must_use]
    pub fn fine_map(&self) -> Option<&FineMapResult> {
        self.result.as_ref().ok()
    }
}

/// Everything computed for one successful interaction.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionArtifacts {
    /// Attribution in raw sample coordinates, `(2, T, L)`.
    pub attribution: Array3<f32>,
    /// Per-position importance, `(2, L)`.
    pub importance: Array2<f32>,
    /// Fine-mapped bins.
    pub fine_map: FineMapResult,
}

/// Counts of a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Interactions in the processed range.
    pub processed: usize,
    /// Interactions fine-mapped successfully.
    pub succeeded: usize,
    /// Interactions that failed or were cancelled.
    pub failed: usize,
}

impl RunSummary {
    fn from_outcomes(outcomes: &[InteractionOutcome]) -> Self {
        let succeeded = outcomes.iter().filter(|o| o.result.is_ok()).count();
        Self {
            processed: outcomes.len(),
            succeeded,
            failed: outcomes.len() - succeeded,
        }
    }
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} processed, {} succeeded, {} failed",
            self.processed, self.succeeded, self.failed
        )
    }
}

/// Output of a fine-mapping run.
///
/// `gradients` and `importances` cover every interaction in the input.
/// Interactions outside the processed range stay zero; failed interactions
/// are filled with NaN.
#[derive(Debug)]
pub struct FineMapRun {
    range: Range<usize>,
    gradients: Array4<f32>,
    importances: Array3<f32>,
    outcomes: Vec<InteractionOutcome>,
}

impl FineMapRun {
    /// Interactions that were processed.
    #[must_use]
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    /// Attribution for all interactions, `(N, 2, T, L)`.
    #[must_use]
    pub fn gradients(&self) -> &Array4<f32> {
        &self.gradients
    }

    /// Importance for all interactions, `(N, 2, L)`.
    #[must_use]
    pub fn importances(&self) -> &Array3<f32> {
        &self.importances
    }

    /// One outcome per processed interaction, in index order.
    #[must_use]
    pub fn outcomes(&self) -> &[InteractionOutcome] {
        &self.outcomes
    }

    /// Success and failure counts.
    #[must_use]
    pub fn summary(&self) -> RunSummary {
        RunSummary::from_outcomes(&self.outcomes)
    }

    /// Write the gradient and importance tensors, both importance tables and
    /// the fine-mapping table.
    ///
    /// # Errors
    ///
    /// Returns an error if any file cannot be written.
    pub fn save(&self, records: &[InteractionRecord], paths: &OutputPaths) -> Result<()> {
        paths.ensure_dir()?;
        write_npy(paths.gradients(), &self.gradients)?;
        write_npy(paths.importances(), &self.importances)?;

        let width = self.importances.len_of(Axis(2));
        for side in Side::ALL {
            let rows = self.outcomes.iter().map(|o| {
                o.result
                    .is_ok()
                    .then(|| self.importances.slice(s![o.index, side.index(), ..]))
            });
            let file = File::create(paths.importance_table(side)).map_err(DataError::from)?;
            write_importance_table(BufWriter::new(file), rows, width)?;
        }

        write_fine_mapping(paths, records, &self.outcomes)?;
        tracing::info!("Saved outputs to {}", paths.dir().display());
        Ok(())
    }
}

/// Write the fine-mapping table for a set of outcomes.
///
/// # Errors
///
/// Returns an error if the file cannot be written or an outcome refers to a
/// missing record.
pub fn write_fine_mapping(
    paths: &OutputPaths,
    records: &[InteractionRecord],
    outcomes: &[InteractionOutcome],
) -> Result<()> {
    let rows = outcomes
        .iter()
        .map(|o| {
            records
                .get(o.index)
                .map(|record| (record, o.fine_map()))
                .ok_or_else(|| {
                    ExplainError::Config(format!("no interaction record for index {}", o.index))
                })
        })
        .collect::<Result<Vec<_>>>()?;

    paths.ensure_dir()?;
    let file = File::create(paths.fine_mapping()).map_err(DataError::from)?;
    write_fine_map_table(BufWriter::new(file), rows)?;
    Ok(())
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn build_pool(threads: Option<usize>) -> Result<rayon::ThreadPool> {
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| ExplainError::Config(format!("failed to build thread pool: {e}")))
}

/// Runs attribution and fine-mapping over a set of interactions.
///
/// # Example
///
/// ```rust,ignore
/// use finemap_explain::{FineMapConfig, FineMapPipeline};
///
/// let pipeline = FineMapPipeline::new(engine, FineMapConfig::default().with_half_pad(10))?;
/// let run = pipeline.run(&records, &data)?;
/// run.save(&records, &OutputPaths::new("out", "."))?;
/// ```
pub struct FineMapPipeline<E> {
    explainer: E,
    config: FineMapConfig,
    preparer: SamplePreparer,
    mapper: FineMapper,
    progress: Box<dyn Progress>,
    cancel: CancelFlag,
}

impl<E: Explainer> FineMapPipeline<E> {
    /// Create a pipeline around an attribution engine.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `config` is invalid.
    pub fn new(explainer: E, config: FineMapConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            preparer: SamplePreparer::new(config.half_pad),
            mapper: FineMapper::new(config.resolution)?,
            explainer,
            config,
            progress: Box::new(LogProgress::new()),
            cancel: CancelFlag::new(),
        })
    }

    /// Replace the progress reporter.
    #[must_use]
    pub fn with_progress<P: Progress + 'static>(mut self, progress: P) -> Self {
        self.progress = Box::new(progress);
        self
    }

    /// Flag that cancels this pipeline's runs.
    #[must_use]
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    fn explain_isolated(&self, prepared: &SamplePair) -> Result<SamplePair> {
        catch_unwind(AssertUnwindSafe(|| {
            self.explainer.explain(prepared, self.config.num_steps)
        }))
        .unwrap_or_else(|payload| {
            Err(ExplainError::Engine(format!(
                "{} panicked: {}",
                self.explainer.name(),
                panic_message(&*payload)
            )))
        })
    }

    /// Fine-map a single interaction from its raw `(2, T, L)` sample.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine fails, returns the wrong shape, or the
    /// resulting importance cannot be resolved.
    pub fn process_one(
        &self,
        index: usize,
        record: &InteractionRecord,
        sample: ArrayView3<'_, f32>,
    ) -> Result<InteractionArtifacts> {
        let prepared = self.preparer.prepare(&sample);
        let attribution = self.explain_isolated(&prepared)?;

        for side in Side::ALL {
            let expected = prepared.side(side).dim();
            let got = attribution.side(side).dim();
            if expected != got {
                return Err(ExplainError::AttributionShape { side, expected, got });
            }
        }

        let restored = self.preparer.restore(&attribution)?;
        let importance = aggregate_importance(&restored.view());

        let mut rng = self.config.seed.derive_index(index).to_rng();
        let fine_map = self.mapper.resolve(record, &importance.view(), &mut rng)?;
        tracing::debug!(
            "Interaction {}: {}:{} / {}:{}",
            index,
            fine_map.left.chrom,
            fine_map.left.start,
            fine_map.right.chrom,
            fine_map.right.start
        );

        Ok(InteractionArtifacts {
            attribution: restored,
            importance,
            fine_map,
        })
    }

    /// Fine-map every interaction in the configured range.
    ///
    /// # Errors
    ///
    /// Returns an error only for run-level problems: a record count that does
    /// not match the data tensor, an invalid range, or a thread pool that
    /// cannot be built. Per-interaction failures are reported in
    /// [`FineMapRun::outcomes`].
    pub fn run(&self, records: &[InteractionRecord], data: &Array4<f32>) -> Result<FineMapRun> {
        let shape = check_alignment(records, data)?;
        let range = self.config.index_range(shape.interactions())?;
        let total = range.len();
        tracing::info!(
            "Fine-mapping interactions {}..{} of {} with {} (pad={}, resolution={})",
            range.start,
            range.end,
            shape,
            self.explainer.name(),
            self.config.half_pad,
            self.config.resolution
        );

        let pool = build_pool(self.config.threads)?;
        let done = AtomicUsize::new(0);
        let results: Vec<(usize, Result<InteractionArtifacts>)> = pool.install(|| {
            range
                .clone()
                .into_par_iter()
                .map(|index| {
                    let result = if self.cancel.is_cancelled() {
                        Err(ExplainError::Cancelled)
                    } else {
                        self.process_one(index, &records[index], data.index_axis(Axis(0), index))
                    };
                    self.progress
                        .update(done.fetch_add(1, Ordering::Relaxed) + 1, total);
                    (index, result)
                })
                .collect()
        });

        let mut gradients = Array4::<f32>::zeros(shape.gradient_dims());
        let mut importances = Array3::<f32>::zeros(shape.importance_dims());
        let mut outcomes = Vec::with_capacity(total);

        for (index, result) in results {
            let result = match result {
                Ok(artifacts) => {
                    gradients
                        .index_axis_mut(Axis(0), index)
                        .assign(&artifacts.attribution);
                    importances
                        .index_axis_mut(Axis(0), index)
                        .assign(&artifacts.importance);
                    Ok(artifacts.fine_map)
                }
                Err(e) => {
                    tracing::warn!("Interaction {} failed: {}", index, e);
                    gradients.index_axis_mut(Axis(0), index).fill(f32::NAN);
                    importances.index_axis_mut(Axis(0), index).fill(f32::NAN);
                    Err(e)
                }
            };
            outcomes.push(InteractionOutcome { index, result });
        }

        let run = FineMapRun {
            range,
            gradients,
            importances,
            outcomes,
        };
        tracing::info!("Fine-mapping finished: {}", run.summary());
        Ok(run)
    }
}

/// Fine-map interactions from a saved `(N, 2, L)` importance matrix.
///
/// Uses the same per-interaction seeds as [`FineMapPipeline::run`], so the
/// same seed reproduces the same tie-breaks.
///
/// # Errors
///
/// Returns an error if the record count does not match the matrix or the
/// resolution is invalid.
pub fn resolve_importances(
    records: &[InteractionRecord],
    importances: &Array3<f32>,
    resolution: u64,
    seed: Seed,
) -> Result<Vec<InteractionOutcome>> {
    let n = importances.len_of(Axis(0));
    if records.len() != n {
        return Err(DataError::CountMismatch {
            records: records.len(),
            tensor: n,
        }
        .into());
    }
    let mapper = FineMapper::new(resolution)?;

    let outcomes: Vec<InteractionOutcome> = (0..n)
        .into_par_iter()
        .map(|index| {
            let mut rng = seed.derive_index(index).to_rng();
            let importance = importances.index_axis(Axis(0), index);
            InteractionOutcome {
                index,
                result: mapper.resolve(&records[index], &importance, &mut rng),
            }
        })
        .collect();
    Ok(outcomes)
}
