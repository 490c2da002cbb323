//! Finite-difference utilities for verifying backward rules.

use ndarray::Array2;

use crate::dtype::Element;
use crate::error::Result;
use crate::tensor::Tensor;

/// Central-difference gradient of `sum(func(x))` with respect to `input`.
///
/// `func` receives a fresh leaf for every perturbation. The result is
/// comparable to `input.grad()` after `func(input).backward()`, since a seed
/// of ones differentiates the sum of the output.
pub fn numerical_gradient<T, F>(func: F, input: &Array2<T>, eps: f64) -> Result<Array2<T>>
where
    T: Element,
    F: Fn(&Tensor<T>) -> Result<Tensor<T>>,
{
    let sum_at = |point: Array2<T>| -> Result<f64> {
        let output = func(&Tensor::new(point, false))?;
        Ok(output.data().iter().map(|v| v.to_f64()).sum())
    };

    let mut grad = Array2::zeros(input.raw_dim());
    for (idx, slot) in grad.indexed_iter_mut() {
        let value = input[idx].to_f64();

        let mut plus = input.clone();
        plus[idx] = T::from_f64(value + eps);
        let mut minus = input.clone();
        minus[idx] = T::from_f64(value - eps);

        *slot = T::from_f64((sum_at(plus)? - sum_at(minus)?) / (2.0 * eps));
    }
    Ok(grad)
}

/// True when every element satisfies `|a - n| <= atol + rtol * |n|`.
pub fn gradcheck<T: Element>(analytical: &Array2<T>, numerical: &Array2<T>, rtol: f64, atol: f64) -> bool {
    if analytical.dim() != numerical.dim() {
        return false;
    }
    analytical.iter().zip(numerical.iter()).all(|(&a, &n)| {
        let (a, n) = (a.to_f64(), n.to_f64());
        (a - n).abs() <= atol + rtol * n.abs()
    })
}
