use std::ops::Add;

use crate::dtype::Element;
use crate::error::Result;
use crate::operation::Primitive;
use crate::tensor::Tensor;

impl<'a, T: Element> Add<&'a Tensor<T>> for &'a Tensor<T> {
    type Output = Result<Tensor<T>>;

    fn add(self, rhs: &'a Tensor<T>) -> Result<Tensor<T>> {
        self.apply(Primitive::Add, rhs)
    }
}

#[cfg(test)]
mod tests {
    use crate::{Error, Primitive, Tensor};
    use ndarray::array;

    #[test]
    fn test_add_operator() {
        let a = Tensor::new(array![[1.0, 2.0]], true);
        let b = Tensor::new(array![[3.0, 5.0]], false);
        let c = (&a + &b).unwrap();
        assert_eq!(c.data(), &array![[4.0, 7.0]]);
        assert_eq!(c.primitive(), Some(Primitive::Add));
    }

    #[test]
    fn test_add_operator_shape_mismatch() {
        let a = Tensor::new(array![[1.0, 2.0]], false);
        let b = Tensor::new(array![[1.0, 2.0, 3.0]], false);
        assert!(matches!(&a + &b, Err(Error::ShapeMismatch { .. })));
    }
}
