//! Output file naming and delimited table writers.

use std::io::Write;
use std::path::{Path, PathBuf};

use finemap_core::Side;
use ndarray::ArrayView1;
use serde::Serialize;

use crate::error::Result;
use crate::record::{FineMapResult, InteractionRecord};

/// Marker written in place of values for a failed interaction.
pub const MISSING: &str = "NA";

/// Paths of every file produced by a run.
///
/// The suffix is normalized to start and end with `.`, so a suffix of `run1`
/// yields `gradients.run1.npy` and the default `.` yields `gradients.npy`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    dir: PathBuf,
    suffix: String,
}

impl OutputPaths {
    /// Create output paths for a directory and file suffix.
    pub fn new(dir: impl Into<PathBuf>, suffix: &str) -> Self {
        let mut suffix = suffix.to_string();
        if !suffix.starts_with('.') {
            suffix.insert(0, '.');
        }
        if !suffix.ends_with('.') {
            suffix.push('.');
        }
        Self {
            dir: dir.into(),
            suffix,
        }
    }

    /// Create the output directory if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn ensure_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        Ok(())
    }

    /// Output directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Normalized suffix, always starting and ending with `.`.
    #[must_use]
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    fn file(&self, stem: &str, ext: &str) -> PathBuf {
        self.dir.join(format!("{stem}{}{ext}", self.suffix))
    }

    /// Gradient tensor, `(N, 2, T, L)`.
    #[must_use]
    pub fn gradients(&self) -> PathBuf {
        self.file("gradients", "npy")
    }

    /// Importance matrix, `(N, 2, L)`.
    #[must_use]
    pub fn importances(&self) -> PathBuf {
        self.file("importances", "npy")
    }

    /// Importance table for one side.
    #[must_use]
    pub fn importance_table(&self, side: Side) -> PathBuf {
        self.file("importances", &format!("{side}.txt"))
    }

    /// Fine-mapped coordinate table.
    #[must_use]
    pub fn fine_mapping(&self) -> PathBuf {
        self.file("fine-mapping", "txt")
    }

    /// Resolved run configuration.
    #[must_use]
    pub fn run_config(&self) -> PathBuf {
        self.file("run-config", "json")
    }

    /// Write `config` as pretty-printed JSON to [`OutputPaths::run_config`].
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn write_run_config<T: Serialize>(&self, config: &T) -> Result<PathBuf> {
        let path = self.run_config();
        std::fs::write(&path, serde_json::to_string_pretty(config)?)?;
        Ok(path)
    }
}

/// Write one tab-separated row of importance values per interaction.
///
/// Values always carry a decimal point (`2.0`, not `2`). `None` rows are
/// written as `width` copies of [`MISSING`].
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_importance_table<'a, W, I>(mut out: W, rows: I, width: usize) -> Result<()>
where
    W: Write,
    I: IntoIterator<Item = Option<ArrayView1<'a, f32>>>,
{
    for row in rows {
        let line = match row {
            Some(values) => values
                .iter()
                .map(|v| format!("{v:?}"))
                .collect::<Vec<_>>()
                .join("\t"),
            None => vec![MISSING; width].join("\t"),
        };
        writeln!(out, "{line}")?;
    }
    out.flush()?;
    Ok(())
}

/// Write one `chrA startA endA chrB startB endB` row per interaction.
///
/// Interactions without a result keep their chromosome names and have
/// [`MISSING`] in place of each coordinate.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_fine_map_table<'a, W, I>(mut out: W, rows: I) -> Result<()>
where
    W: Write,
    I: IntoIterator<Item = (&'a InteractionRecord, Option<&'a FineMapResult>)>,
{
    for (record, result) in rows {
        match result {
            Some(r) => writeln!(
                out,
                "{}\t{}\t{}\t{}\t{}\t{}",
                r.left.chrom, r.left.start, r.left.end, r.right.chrom, r.right.start, r.right.end
            )?,
            None => writeln!(
                out,
                "{}\t{MISSING}\t{MISSING}\t{}\t{MISSING}\t{MISSING}",
                record.left.chrom, record.right.chrom
            )?,
        }
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Region;
    use ndarray::array;

    #[test]
    fn test_suffix_normalization() {
        assert_eq!(OutputPaths::new("out", ".").suffix(), ".");
        assert_eq!(OutputPaths::new("out", "run1").suffix(), ".run1.");
        assert_eq!(OutputPaths::new("out", ".run1").suffix(), ".run1.");
        assert_eq!(OutputPaths::new("out", "run1.").suffix(), ".run1.");
        assert_eq!(OutputPaths::new("out", "").suffix(), ".");
    }

    #[test]
    fn test_file_names() {
        let paths = OutputPaths::new("out", "x");
        assert_eq!(paths.gradients(), PathBuf::from("out/gradients.x.npy"));
        assert_eq!(paths.importances(), PathBuf::from("out/importances.x.npy"));
        assert_eq!(
            paths.importance_table(Side::Left),
            PathBuf::from("out/importances.x.left.txt")
        );
        assert_eq!(paths.fine_mapping(), PathBuf::from("out/fine-mapping.x.txt"));
        assert_eq!(paths.run_config(), PathBuf::from("out/run-config.x.json"));

        let plain = OutputPaths::new("out", ".");
        assert_eq!(plain.gradients(), PathBuf::from("out/gradients.npy"));
        assert_eq!(
            plain.importance_table(Side::Right),
            PathBuf::from("out/importances.right.txt")
        );
    }

    #[test]
    fn test_write_importance_table() {
        let a = array![1.5f32, -2.0, 0.25];
        let mut buf = Vec::new();
        write_importance_table(&mut buf, [Some(a.view()), None], 3).unwrap();

        assert_eq!(String::from_utf8(buf).unwrap(), "1.5\t-2.0\t0.25\nNA\tNA\tNA\n");
    }

    #[test]
    fn test_importance_table_whole_numbers_keep_decimal_point() {
        let a = array![2.0f32, 0.0, 100.0];
        let mut buf = Vec::new();
        write_importance_table(&mut buf, [Some(a.view())], 3).unwrap();

        assert_eq!(String::from_utf8(buf).unwrap(), "2.0\t0.0\t100.0\n");
    }

    #[test]
    fn test_write_fine_map_table() {
        let record = InteractionRecord::new(Region::new("chr1", 0, 500), Region::new("chr2", 0, 500));
        let result = FineMapResult {
            left: Region::new("chr1", 100, 150),
            right: Region::new("chr2", -50, 0),
        };
        let mut buf = Vec::new();
        write_fine_map_table(&mut buf, [(&record, Some(&result)), (&record, None)]).unwrap();

        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "chr1\t100\t150\tchr2\t-50\t0\nchr1\tNA\tNA\tchr2\tNA\tNA\n"
        );
    }

    #[test]
    fn test_write_run_config() {
        let dir = tempfile::tempdir().unwrap();
        let paths = OutputPaths::new(dir.path(), "cfg");
        let path = paths.write_run_config(&serde_json::json!({ "resolution": 100 })).unwrap();

        let text = std::fs::read_to_string(path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["resolution"], 100);
    }
}
