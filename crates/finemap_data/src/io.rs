//! NumPy tensor I/O.

use std::path::Path;

use finemap_core::SampleShape;
use ndarray::{Array, Array3, Array4, Dimension};

use crate::error::{DataError, Result};
use crate::record::InteractionRecord;

/// Read a NumPy `.npy` file as an `f32` array of dimension `D`.
///
/// Files stored as float64 are converted to float32.
///
/// # Errors
///
/// Returns an error if the file is missing, has the wrong dimensionality, or
/// holds a non-float dtype.
pub fn read_npy_f32<D, P>(path: P) -> Result<Array<f32, D>>
where
    D: Dimension,
    P: AsRef<Path>,
{
    use ndarray_npy::ReadNpyExt;

    let file = std::fs::File::open(path.as_ref())?;
    let reader = std::io::BufReader::new(file);

    // Try reading as f32 first
    match Array::<f32, D>::read_npy(reader) {
        Ok(arr) => Ok(arr),
        Err(e) => {
            let file = std::fs::File::open(path.as_ref())?;
            let reader = std::io::BufReader::new(file);
            let arr_f64 = Array::<f64, D>::read_npy(reader).map_err(|_| {
                DataError::FormatError(format!(
                    "Failed to read npy file {}: {}",
                    path.as_ref().display(),
                    e
                ))
            })?;
            Ok(arr_f64.mapv(|x| x as f32))
        }
    }
}

/// Read the interaction data tensor of shape `(N, 2, T, L)`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the side axis is not 2.
pub fn read_data_npy<P: AsRef<Path>>(path: P) -> Result<Array4<f32>> {
    let data: Array4<f32> = read_npy_f32(path.as_ref())?;
    let shape = SampleShape::from_dims(data.shape())?;
    tracing::info!("Loaded data tensor {} from {}", shape, path.as_ref().display());
    Ok(data)
}

/// Read a saved importance matrix of shape `(N, 2, L)`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the side axis is not 2.
pub fn read_importances_npy<P: AsRef<Path>>(path: P) -> Result<Array3<f32>> {
    let importances: Array3<f32> = read_npy_f32(path.as_ref())?;
    if importances.shape()[1] != finemap_core::SIDES {
        return Err(DataError::InvalidShape(format!(
            "expected importances of shape (N, 2, L), got {:?}",
            importances.shape()
        )));
    }
    Ok(importances)
}

/// Write an `f32` array as a NumPy `.npy` file.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn write_npy<D, P>(path: P, array: &Array<f32, D>) -> Result<()>
where
    D: Dimension,
    P: AsRef<Path>,
{
    use ndarray_npy::WriteNpyExt;

    let file = std::fs::File::create(path.as_ref())?;
    array
        .write_npy(std::io::BufWriter::new(file))
        .map_err(|e| {
            DataError::FormatError(format!(
                "Failed to write npy file {}: {}",
                path.as_ref().display(),
                e
            ))
        })
}

/// Check that the interaction table lines up with the data tensor.
///
/// # Errors
///
/// Returns [`DataError::CountMismatch`] if the table and tensor hold a
/// different number of interactions.
pub fn check_alignment(records: &[InteractionRecord], data: &Array4<f32>) -> Result<SampleShape> {
    let shape = SampleShape::from_dims(data.shape())?;
    if records.len() != shape.interactions() {
        return Err(DataError::CountMismatch {
            records: records.len(),
            tensor: shape.interactions(),
        });
    }
    Ok(shape)
}
