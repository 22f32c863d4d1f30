//! finemap CLI: fine-map genomic interactions from attribution scores.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use finemap_core::Seed;
use finemap_data::{read_data_npy, read_importances_npy, read_interactions, OutputPaths};
use finemap_explain::{
    progress_bar, resolve_importances, write_fine_mapping, DefaultBackend, FineMapConfig,
    FineMapPipeline, IndexRange, IntegratedGradients, LinearPairModel, Progress, RunSummary,
};

#[derive(Parser)]
#[command(name = "finemap")]
#[command(author, version)]
#[command(about = "Fine-map genomic interactions to single bins using attribution scores")]
#[command(long_about = "finemap: localize, within each pair of interacting regions, the bin most
responsible for a predicted interaction.

EXAMPLES:
  # Attribute, aggregate and fine-map every interaction
  finemap run -i interactions.tsv -d data.npy -m model.npy -o out

  # Only interactions 100..200, padding each side by 10 bins
  finemap run -i interactions.tsv -d data.npy -m model.npy --range 100 200 --pad-size 10

  # Re-resolve coordinates from saved importances with another seed
  finemap resolve -i interactions.tsv --importances out/importances.npy --seed 7")]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run attribution and fine-mapping
    Run {
        /// Tab-separated interaction table (chrA startA endA chrB startB endB)
        #[arg(short, long, value_name = "TSV")]
        interactions: PathBuf,

        /// Data tensor of shape (N, 2, tracks, positions)
        #[arg(short, long, value_name = "NPY")]
        data: PathBuf,

        /// Linear model weights of shape (2, positions + 2 * pad, tracks)
        #[arg(short, long, value_name = "NPY")]
        model: PathBuf,

        /// Directory in which to save files
        #[arg(short, long, default_value = ".", value_name = "DIR")]
        out_dir: PathBuf,

        /// Additional suffix to use in naming files
        #[arg(short, long, default_value = ".", value_name = "SUFFIX")]
        suffix: String,

        /// Interaction indices [LO, HI) to process; all when omitted
        #[arg(short = 'x', long, num_args = 2, value_names = ["LO", "HI"])]
        range: Option<Vec<usize>>,

        /// Zero bins added on each end of each side
        #[arg(short = 'w', long, default_value = "0", value_name = "N")]
        pad_size: usize,

        /// Bin width in base pairs
        #[arg(long, default_value = "100", value_name = "BP")]
        resolution: u64,

        /// Integrated Gradients steps
        #[arg(long, default_value = "50", value_name = "N")]
        num_steps: usize,

        /// Worker threads (defaults to the number of CPUs)
        #[arg(long, value_name = "N")]
        threads: Option<usize>,

        /// Random seed for tie-breaking
        #[arg(long, default_value = "0", value_name = "SEED")]
        seed: u64,

        /// Disable the stderr progress bar
        #[arg(long, default_value = "false")]
        no_progress: bool,
    },
    /// Fine-map from a saved importance matrix
    Resolve {
        /// Tab-separated interaction table (chrA startA endA chrB startB endB)
        #[arg(short, long, value_name = "TSV")]
        interactions: PathBuf,

        /// Importance matrix of shape (N, 2, positions)
        #[arg(long, value_name = "NPY")]
        importances: PathBuf,

        /// Directory in which to save files
        #[arg(short, long, default_value = ".", value_name = "DIR")]
        out_dir: PathBuf,

        /// Additional suffix to use in naming files
        #[arg(short, long, default_value = ".", value_name = "SUFFIX")]
        suffix: String,

        /// Bin width in base pairs
        #[arg(long, default_value = "100", value_name = "BP")]
        resolution: u64,

        /// Random seed for tie-breaking
        #[arg(long, default_value = "0", value_name = "SEED")]
        seed: u64,
    },
}

/// Redraws a progress bar in place.
///
/// Workers report out of order, so only an update newer than the last one
/// drawn is written.
struct BarProgress<W> {
    state: Mutex<(usize, W)>,
}

impl<W: Write + Send> BarProgress<W> {
    fn new(out: W) -> Self {
        Self {
            state: Mutex::new((0, out)),
        }
    }
}

impl<W: Write + Send> Progress for BarProgress<W> {
    fn update(&self, done: usize, total: usize) {
        if total == 0 {
            return;
        }
        let Ok(mut state) = self.state.lock() else {
            return;
        };
        let (drawn, out) = &mut *state;
        if done <= *drawn {
            return;
        }
        *drawn = done;
        let _ = write!(out, "{}", progress_bar(done as f64 / total as f64, 50));
        let _ = out.flush();
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = match cli.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::filter::LevelFilter::from_level(log_level))
        .init();

    match cli.command {
        Commands::Run {
            interactions,
            data,
            model,
            out_dir,
            suffix,
            range,
            pad_size,
            resolution,
            num_steps,
            threads,
            seed,
            no_progress,
        } => {
            let mut config = FineMapConfig::default()
                .with_half_pad(pad_size)
                .with_resolution(resolution)
                .with_num_steps(num_steps)
                .with_seed(Seed::new(seed));
            if let Some(range) = range {
                config = config.with_range(parse_range(&range)?);
            }
            if let Some(threads) = threads {
                config = config.with_threads(threads);
            }
            let paths = OutputPaths::new(out_dir, &suffix);
            handle_run(&interactions, &data, &model, &paths, config, !no_progress)
        }
        Commands::Resolve {
            interactions,
            importances,
            out_dir,
            suffix,
            resolution,
            seed,
        } => {
            let paths = OutputPaths::new(out_dir, &suffix);
            handle_resolve(&interactions, &importances, &paths, resolution, Seed::new(seed))
        }
    }
}

fn parse_range(values: &[usize]) -> Result<IndexRange> {
    match values {
        [start, end] => Ok(IndexRange::new(*start, *end)),
        _ => bail!("--range takes exactly two values, got {}", values.len()),
    }
}

fn handle_run(
    interactions: &Path,
    data: &Path,
    model: &Path,
    paths: &OutputPaths,
    config: FineMapConfig,
    show_progress: bool,
) -> Result<()> {
    config.validate().context("Invalid configuration")?;
    paths
        .ensure_dir()
        .with_context(|| format!("Failed to create output directory {}", paths.dir().display()))?;

    let records = read_interactions(interactions)
        .with_context(|| format!("Failed to read interactions from {}", interactions.display()))?;
    eprint!("Reading data...");
    let data = read_data_npy(data)
        .with_context(|| format!("Failed to read data tensor from {}", data.display()))?;
    eprintln!("done");

    let model = LinearPairModel::load(model)
        .with_context(|| format!("Failed to load model from {}", model.display()))?;
    let engine = IntegratedGradients::<DefaultBackend, _>::new(model, Default::default());

    let mut pipeline = FineMapPipeline::new(engine, config.clone())?;
    if show_progress {
        pipeline = pipeline.with_progress(BarProgress::new(std::io::stderr()));
    }
    let run = pipeline.run(&records, &data).context("Fine-mapping failed")?;

    eprint!("Saving...");
    run.save(&records, paths).context("Failed to save outputs")?;
    paths
        .write_run_config(&config)
        .context("Failed to save run configuration")?;
    eprintln!("done!");

    report(run.summary());
    Ok(())
}

fn handle_resolve(
    interactions: &Path,
    importances: &Path,
    paths: &OutputPaths,
    resolution: u64,
    seed: Seed,
) -> Result<()> {
    let records = read_interactions(interactions)
        .with_context(|| format!("Failed to read interactions from {}", interactions.display()))?;
    let importances = read_importances_npy(importances)
        .with_context(|| format!("Failed to read importances from {}", importances.display()))?;

    let outcomes = resolve_importances(&records, &importances, resolution, seed)?;
    for outcome in &outcomes {
        if let Err(e) = &outcome.result {
            tracing::warn!("Interaction {} not fine-mapped: {}", outcome.index, e);
        }
    }
    write_fine_mapping(paths, &records, &outcomes).context("Failed to save fine-mapping")?;

    let succeeded = outcomes.iter().filter(|o| o.result.is_ok()).count();
    report(RunSummary {
        processed: outcomes.len(),
        succeeded,
        failed: outcomes.len() - succeeded,
    });
    Ok(())
}

fn report(summary: RunSummary) {
    tracing::info!("{}", summary);
    if summary.failed > 0 {
        eprintln!(
            "{} of {} interactions could not be fine-mapped (marked NA in the output tables)",
            summary.failed, summary.processed
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drawn(progress: BarProgress<Vec<u8>>) -> String {
        let (_, out) = progress.state.into_inner().unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_bar_skips_stale_updates() {
        let progress = BarProgress::new(Vec::new());
        progress.update(1, 4);
        progress.update(4, 4);
        progress.update(3, 4);
        progress.update(2, 4);

        let out = drawn(progress);
        assert!(out.ends_with("100.0% |==================================================>|\n"));
        assert_eq!(out.matches('\r').count(), 2);
    }

    #[test]
    fn test_bar_from_many_threads_ends_complete() {
        let progress = BarProgress::new(Vec::new());
        let total = 64;
        std::thread::scope(|scope| {
            for done in 1..=total {
                let progress = &progress;
                scope.spawn(move || progress.update(done, total));
            }
        });

        let out = drawn(progress);
        assert!(out.ends_with("|\n"));
        assert_eq!(out.matches('\n').count(), 1);
    }

    #[test]
    fn test_parse_range() {
        assert_eq!(parse_range(&[2, 5]).unwrap(), IndexRange::new(2, 5));
        assert!(parse_range(&[1]).is_err());
    }
}
