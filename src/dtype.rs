//! Element types accepted by tensors.

use std::fmt;
use std::ops::AddAssign;

use ndarray::LinalgScalar;
use rand::distributions::uniform::SampleUniform;

/// Runtime tag for a tensor's element type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType {
    Float32,
    Float64,
}

impl DType {
    /// Parse a dtype name as written in interchange data.
    pub fn from_name(name: &str) -> Option<DType> {
        match name {
            "float32" | "f32" => Some(DType::Float32),
            "float64" | "f64" => Some(DType::Float64),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DType::Float32 => "float32",
            DType::Float64 => "float64",
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for f32 {}
    impl Sealed for f64 {}
}

/// Scalar type a tensor can hold. Sealed: only `f32` and `f64`.
pub trait Element:
    LinalgScalar + AddAssign + SampleUniform + fmt::Debug + fmt::Display + sealed::Sealed
{
    const DTYPE: DType;

    fn from_f64(value: f64) -> Self;

    fn to_f64(self) -> f64;
}

impl Element for f32 {
    const DTYPE: DType = DType::Float32;

    fn from_f64(value: f64) -> Self {
        value as f32
    }

    fn to_f64(self) -> f64 {
        f64::from(self)
    }
}

impl Element for f64 {
    const DTYPE: DType = DType::Float64;

    fn from_f64(value: f64) -> Self {
        value
    }

    fn to_f64(self) -> f64 {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dtype_names() {
        assert_eq!(DType::from_name("float32"), Some(DType::Float32));
        assert_eq!(DType::from_name("f64"), Some(DType::Float64));
        assert_eq!(DType::from_name("int32"), None);
        assert_eq!(DType::Float64.to_string(), "float64");
        assert_eq!(<f32 as Element>::DTYPE, DType::Float32);
    }
}
