//! Progress reporting for fine-mapping runs.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Receives progress as interactions complete.
///
/// Called from worker threads, possibly out of index order.
pub trait Progress: Send + Sync {
    /// `done` of `total` interactions have finished.
    fn update(&self, done: usize, total: usize);
}

/// Logs progress through `tracing` roughly every 10%.
#[derive(Debug, Default)]
pub struct LogProgress {
    last_decile: AtomicUsize,
}

impl LogProgress {
    /// Create a new progress logger.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Progress for LogProgress {
    fn update(&self, done: usize, total: usize) {
        if total == 0 {
            return;
        }
        let decile = done * 10 / total;
        if self.last_decile.fetch_max(decile, Ordering::Relaxed) < decile {
            tracing::info!("Processed {}/{} interactions ({}%)", done, total, decile * 10);
        }
    }
}

/// Render a text progress bar for `fraction` in `[0, 1]`.
///
/// The bar starts with a carriage return so it can be redrawn in place, and
/// ends with a newline once complete.
///
/// # Example
///
/// ```rust
/// use finemap_explain::progress_bar;
///
/// assert_eq!(progress_bar(0.5, 4), "\r 50.0% |==>  |");
/// ```
#[must_use]
pub fn progress_bar(fraction: f64, width: usize) -> String {
    let fraction = fraction.clamp(0.0, 1.0);
    let filled = (fraction * width as f64) as usize;
    let mut bar = format!("\r{:5.1}% |", fraction * 100.0);
    bar.push_str(&"=".repeat(filled));
    bar.push('>');
    bar.push_str(&" ".repeat(width - filled));
    bar.push('|');
    if fraction >= 1.0 {
        bar.push('\n');
    }
    bar
}
