//! Interaction records and fine-mapped results.

use std::io::BufRead;
use std::path::Path;

use finemap_core::Side;
use serde::{Deserialize, Serialize};

use crate::error::{DataError, Result};

/// A genomic interval on one chromosome.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    /// Chromosome name.
    pub chrom: String,
    /// Start coordinate in base pairs.
    pub start: i64,
    /// End coordinate in base pairs.
    pub end: i64,
}

impl Region {
    /// Create a new region.
    pub fn new(chrom: impl Into<String>, start: i64, end: i64) -> Self {
        Self {
            chrom: chrom.into(),
            start,
            end,
        }
    }
}

/// One row of an interaction table: a pair of regions.
///
/// Row `i` of the table corresponds to entry `i` of the data tensor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InteractionRecord {
    /// Side 0 (chromosome A).
    pub left: Region,
    /// Side 1 (chromosome B).
    pub right: Region,
}

impl InteractionRecord {
    /// Create a record from its two regions.
    pub fn new(left: Region, right: Region) -> Self {
        Self { left, right }
    }

    /// The region on the given side.
    #[must_use]
    pub fn region(&self, side: Side) -> &Region {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }
}

/// Fine-mapped bins of one interaction, each `resolution` base pairs wide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FineMapResult {
    /// Fine-mapped bin on side 0.
    pub left: Region,
    /// Fine-mapped bin on side 1.
    pub right: Region,
}

impl FineMapResult {
    /// The bin on the given side.
    #[must_use]
    pub fn region(&self, side: Side) -> &Region {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }
}

fn parse_coord(field: &str, name: &str, line: usize) -> Result<i64> {
    field.trim().parse::<i64>().map_err(|e| DataError::Parse {
        line,
        message: format!("invalid {name} '{field}': {e}"),
    })
}

/// Parse interaction records from tab-separated text.
///
/// Only the first six columns are used: `chrA startA endA chrB startB endB`.
/// Blank lines are skipped.
///
/// # Errors
///
/// Returns [`DataError::Parse`] for rows with fewer than six columns or
/// non-integer coordinates.
pub fn parse_interactions<R: BufRead>(reader: R) -> Result<Vec<InteractionRecord>> {
    let mut records = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = idx + 1;
        if line.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 6 {
            return Err(DataError::Parse {
                line: line_no,
                message: format!("expected at least 6 tab-separated columns, got {}", fields.len()),
            });
        }

        records.push(InteractionRecord::new(
            Region::new(
                fields[0].trim(),
                parse_coord(fields[1], "startA", line_no)?,
                parse_coord(fields[2], "endA", line_no)?,
            ),
            Region::new(
                fields[3].trim(),
                parse_coord(fields[4], "startB", line_no)?,
                parse_coord(fields[5], "endB", line_no)?,
            ),
        ));
    }

    Ok(records)
}

/// Read interaction records from a tab-separated file.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or a row is malformed.
pub fn read_interactions<P: AsRef<Path>>(path: P) -> Result<Vec<InteractionRecord>> {
    let file = std::fs::File::open(path.as_ref())?;
    let records = parse_interactions(std::io::BufReader::new(file))?;
    tracing::debug!(
        "Read {} interactions from {}",
        records.len(),
        path.as_ref().display()
    );
    Ok(records)
}
