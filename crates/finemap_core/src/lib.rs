//! # finemap_core
//!
//! Core types and primitives shared by the finemap crates.
//!
//! This crate provides:
//! - [`Seed`] for deterministic, derivable random number generation
//! - [`SampleShape`] for the shape of an interaction data tensor
//! - [`Padding`], [`pad_axis`] and [`crop_axis`] for zero-padding an array
//!   along one axis and removing that padding again
//! - Error types and common utilities
//!
//! ## Shape Convention
//!
//! Interaction data follows the convention `(N, S, T, L)`:
//! - `N`: Number of interactions
//! - `S`: Sides, always 2 (side 0 = left region, side 1 = right region)
//! - `T`: Tracks (features per position)
//! - `L`: Positions (bins along the genome)
//!
//! ## Example
//!
//! ```rust
//! use finemap_core::{Padding, pad_axis, crop_axis};
//! use ndarray::{Array2, Axis};
//!
//! let x = Array2::<f32>::ones((3, 4));
//! let padding = Padding::from_total(7); // left = 3, right = 4
//! let padded = pad_axis(&x.view(), Axis(1), padding);
//! assert_eq!(padded.dim(), (3, 11));
//! assert_eq!(crop_axis(&padded.view(), Axis(1), padding).unwrap(), x);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod pad;
mod seed;
mod shape;

pub use error::{CoreError, Result};
pub use pad::{crop_axis, pad_axis, Padding};
pub use seed::Seed;
pub use shape::{SampleShape, Side, SIDES};
