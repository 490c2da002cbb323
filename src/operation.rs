use std::fmt;

use ndarray::Array2;

use crate::dtype::Element;
use crate::error::{Error, Result};
use crate::tensor::Tensor;

/// Operator that produced a derived tensor.
///
/// `Add` is the element-wise sum of two equally shaped tensors. `Mul` is the
/// matrix product `lhs · rhs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Add,
    Mul,
}

impl Primitive {
    pub const ARITY: usize = 2;

    pub fn name(self) -> &'static str {
        match self {
            Primitive::Add => "Add",
            Primitive::Mul => "Mul",
        }
    }

    /// Compute the output data from `inputs`.
    pub fn forward<T: Element>(self, inputs: &[Tensor<T>]) -> Result<Array2<T>> {
        let (lhs, rhs) = self.binary_inputs(inputs)?;
        self.output_dim(lhs, rhs)?;
        Ok(match self {
            Primitive::Add => lhs.data() + rhs.data(),
            Primitive::Mul => lhs.data().dot(rhs.data()),
        })
    }

    /// Gradient contribution for each input given the gradient flowing into
    /// the output.
    ///
    /// The inputs are checked exactly as in [`Primitive::forward`], and
    /// `incoming_grad` must have the output's shape.
    pub fn backward<T: Element>(
        self,
        incoming_grad: &Array2<T>,
        inputs: &[Tensor<T>],
    ) -> Result<(Array2<T>, Array2<T>)> {
        let (lhs, rhs) = self.binary_inputs(inputs)?;
        let (rows, cols) = self.output_dim(lhs, rhs)?;
        if incoming_grad.dim() != (rows, cols) {
            return Err(Error::ShapeMismatch {
                op: self.name(),
                lhs: vec![rows, cols],
                rhs: incoming_grad.shape().to_vec(),
            });
        }

        Ok(match self {
            Primitive::Add => (incoming_grad.clone(), incoming_grad.clone()),
            Primitive::Mul => (
                incoming_grad.dot(&rhs.data().t()),
                lhs.data().t().dot(incoming_grad),
            ),
        })
    }

    fn binary_inputs<'a, T: Element>(
        self,
        inputs: &'a [Tensor<T>],
    ) -> Result<(&'a Tensor<T>, &'a Tensor<T>)> {
        match inputs {
            [lhs, rhs] => Ok((lhs, rhs)),
            _ => Err(Error::Arity {
                op: self.name(),
                expected: Self::ARITY,
                got: inputs.len(),
            }),
        }
    }

    fn output_dim<T: Element>(self, lhs: &Tensor<T>, rhs: &Tensor<T>) -> Result<(usize, usize)> {
        let (l_rows, l_cols) = lhs.dim();
        let (r_rows, r_cols) = rhs.dim();
        let compatible = match self {
            Primitive::Add => (l_rows, l_cols) == (r_rows, r_cols),
            Primitive::Mul => l_cols == r_rows,
        };
        if !compatible {
            return Err(Error::ShapeMismatch {
                op: self.name(),
                lhs: lhs.shape().to_vec(),
                rhs: rhs.shape().to_vec(),
            });
        }
        Ok(match self {
            Primitive::Add => (l_rows, l_cols),
            Primitive::Mul => (l_rows, r_cols),
        })
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.name())
    }
}
