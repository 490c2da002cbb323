//! Checks that candidate data is a 2-D float32/float64 array.

use ndarray::{Array2, ArrayD, Ix2};
use serde::{Deserialize, Serialize};

use crate::dtype::{DType, Element};
use crate::error::{Error, Result};

/// Serializable description of tensor data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTensor {
    pub dtype: String,
    pub shape: Vec<usize>,
    pub data: Vec<f64>,
}

/// Accept a dynamic-rank array only if it is 2-D.
pub fn validate_array<T: Element>(data: ArrayD<T>) -> Result<Array2<T>> {
    let ndim = data.ndim();
    data.into_dimensionality::<Ix2>().map_err(|_| {
        Error::invalid_data(format!("data must be 2 dimensional, got {ndim} dimensions"))
    })
}

/// Check that `shape` is 2-D and describes exactly `len` elements.
pub fn validate_shape(shape: &[usize], len: usize) -> Result<(usize, usize)> {
    let &[rows, cols] = shape else {
        return Err(Error::invalid_data(format!(
            "data must be 2 dimensional, got shape {shape:?}"
        )));
    };
    match rows.checked_mul(cols) {
        Some(n) if n == len => Ok((rows, cols)),
        _ => Err(Error::invalid_data(format!(
            "shape {shape:?} does not match {len} elements"
        ))),
    }
}

pub(crate) fn validate_raw<T: Element>(raw: RawTensor) -> Result<Array2<T>> {
    let dtype = DType::from_name(&raw.dtype).ok_or_else(|| {
        Error::invalid_data(format!(
            "data must be of type float32 or float64, got {}",
            raw.dtype
        ))
    })?;
    if dtype != T::DTYPE {
        return Err(Error::invalid_data(format!(
            "expected {} data, got {dtype}",
            T::DTYPE
        )));
    }
    let dim = validate_shape(&raw.shape, raw.data.len())?;
    let values = raw.data.into_iter().map(T::from_f64).collect();
    Array2::from_shape_vec(dim, values).map_err(|e| Error::invalid_data(e.to_string()))
}
