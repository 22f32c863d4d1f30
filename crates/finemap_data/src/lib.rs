//! # finemap_data
//!
//! Input and output handling for finemap.
//!
//! This crate provides:
//! - [`InteractionRecord`] and [`read_interactions`] for tab-separated
//!   interaction tables
//! - [`FineMapResult`], the fine-mapped coordinate pair of one interaction
//! - NumPy `.npy` readers and writers for data, gradient and importance tensors
//! - [`OutputPaths`] and the delimited table writers for run outputs
//!
//! ## Example
//!
//! ```rust,ignore
//! use finemap_data::{read_data_npy, read_interactions, check_alignment};
//!
//! let records = read_interactions("interactions.tsv")?;
//! let data = read_data_npy("data.npy")?;
//! let shape = check_alignment(&records, &data)?;
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod io;
mod output;
mod record;

pub use error::{DataError, Result};
pub use io::{check_alignment, read_data_npy, read_importances_npy, read_npy_f32, write_npy};
pub use output::{write_fine_map_table, write_importance_table, OutputPaths, MISSING};
pub use record::{parse_interactions, read_interactions, FineMapResult, InteractionRecord, Region};
