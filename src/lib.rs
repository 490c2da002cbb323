//! Reverse-mode automatic differentiation over 2-D tensors.
//!
//! Arithmetic on [`Tensor`]s records a computation graph. Calling
//! [`Tensor::backward`] on a result walks that graph in topological order and
//! accumulates gradients into every ancestor that requires one.
//!
//! ```
//! use ndarray::array;
//! use tensorgrad::Tensor;
//!
//! let x = Tensor::new(array![[2.0, 1.0], [2.0, 3.0]], true);
//! let w = Tensor::new(array![[3.0], [1.0]], true);
//! let b = Tensor::new(array![[4.0], [9.0]], true);
//!
//! // `*` is the matrix product.
//! let y = (&(&x * &w)? + &b)?;
//! assert_eq!(y.data(), &array![[11.0], [18.0]]);
//!
//! y.backward()?;
//! assert_eq!(*w.grad(), array![[4.0], [4.0]]);
//! assert_eq!(*x.grad(), array![[3.0, 1.0], [3.0, 1.0]]);
//! # Ok::<(), tensorgrad::Error>(())
//! ```
//!
//! Only two primitives exist: [`Primitive::Add`] (element-wise, shapes must
//! match exactly) and [`Primitive::Mul`] (matrix product).

mod add;
mod autograd;
mod config;
mod dtype;
mod engine;
mod error;
mod gradcheck;
mod graph_task;
mod mul;
mod operation;
mod ready_queue;
mod tensor;
mod validate;

pub use config::BackwardConfig;
pub use dtype::{DType, Element};
pub use engine::Engine;
pub use error::{Error, Result};
pub use gradcheck::{gradcheck, numerical_gradient};
pub use operation::Primitive;
pub use tensor::{NodeId, Tensor};
pub use validate::{validate_array, validate_shape, RawTensor};
