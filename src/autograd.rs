use ndarray::Array2;

use crate::config::BackwardConfig;
use crate::dtype::Element;
use crate::engine::Engine;
use crate::error::Result;
use crate::tensor::Tensor;

impl<T: Element> Tensor<T> {
    /// Backpropagate a gradient of ones from this tensor.
    ///
    /// Gradients are added to the `grad` buffers of this tensor and of every
    /// ancestor that requires a gradient. Calling it twice accumulates twice.
    pub fn backward(&self) -> Result<()> {
        Engine::default().execute(self, None)
    }

    /// Backpropagate `grad`, which must have this tensor's shape.
    pub fn backward_with_grad(&self, grad: Array2<T>) -> Result<()> {
        Engine::default().execute(self, Some(grad))
    }

    pub fn backward_with_config(&self, grad: Option<Array2<T>>, config: &BackwardConfig) -> Result<()> {
        Engine::new(*config).execute(self, grad)
    }
}
