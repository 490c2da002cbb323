use std::ops::Mul;

use crate::dtype::Element;
use crate::error::Result;
use crate::tensor::Tensor;

/// `a * b` is the matrix product, not an element-wise product.
impl<'a, T: Element> Mul<&'a Tensor<T>> for &'a Tensor<T> {
    type Output = Result<Tensor<T>>;

    fn mul(self, rhs: &'a Tensor<T>) -> Result<Tensor<T>> {
        self.matmul(rhs)
    }
}

#[cfg(test)]
mod tests {
    use crate::{Error, Primitive, Tensor};
    use ndarray::array;

    #[test]
    fn test_mul_operator_is_matmul() {
        let a = Tensor::new(array![[1.0, 2.0], [3.0, 4.0]], false);
        let b = Tensor::new(array![[5.0, 6.0], [7.0, 8.0]], false);
        let c = (&a * &b).unwrap();
        assert_eq!(c.data(), &array![[19.0, 22.0], [43.0, 50.0]]);
        assert_eq!(c.primitive(), Some(Primitive::Mul));
    }

    #[test]
    fn test_mul_operator_shape_mismatch() {
        let a = Tensor::new(ndarray::Array2::<f32>::zeros((2, 3)), false);
        let b = Tensor::new(ndarray::Array2::<f32>::zeros((2, 2)), false);
        assert!(matches!(&a * &b, Err(Error::ShapeMismatch { op: "Mul", .. })));
    }
}
