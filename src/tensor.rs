use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use ndarray::{Array2, ArrayD};
use rand::distributions::{Distribution, Uniform};
use rand::Rng;

use crate::dtype::{DType, Element};
use crate::error::Result;
use crate::operation::Primitive;
use crate::validate::{self, RawTensor};

static NODE_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

fn next_node_id() -> NodeId {
    NodeId(NODE_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
}

/// Creation number of a node. A node's parents always have smaller ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u64);

struct Origin<T: Element> {
    primitive: Primitive,
    parents: Vec<Tensor<T>>,
}

struct TensorNode<T: Element> {
    id: NodeId,
    data: Array2<T>,
    grad: RefCell<Array2<T>>,
    requires_grad: bool,
    origin: Option<Origin<T>>,
}

// Unlinks ancestors iteratively; the default drop recurses once per graph level.
impl<T: Element> Drop for TensorNode<T> {
    fn drop(&mut self) {
        let Some(origin) = self.origin.take() else {
            return;
        };
        let mut stack = origin.parents;
        while let Some(Tensor(node)) = stack.pop() {
            if let Ok(mut inner) = Rc::try_unwrap(node) {
                if let Some(origin) = inner.origin.take() {
                    stack.extend(origin.parents);
                }
            }
        }
    }
}

/// A 2-D array and its position in a computation graph.
///
/// Cloning is cheap and yields another handle to the same node.
pub struct Tensor<T: Element = f64>(Rc<TensorNode<T>>);

impl<T: Element> Clone for Tensor<T> {
    fn clone(&self) -> Self {
        Tensor(Rc::clone(&self.0))
    }
}

impl<T: Element> Tensor<T> {
    fn from_node(data: Array2<T>, requires_grad: bool, origin: Option<Origin<T>>) -> Self {
        let grad = RefCell::new(Array2::zeros(data.raw_dim()));
        Tensor(Rc::new(TensorNode {
            id: next_node_id(),
            data,
            grad,
            requires_grad,
            origin,
        }))
    }

    /// Create a leaf tensor.
    pub fn new(data: Array2<T>, requires_grad: bool) -> Self {
        Self::from_node(data, requires_grad, None)
    }

    /// Create a leaf tensor from a dynamic-rank array, which must be 2-D.
    pub fn from_dyn(data: ArrayD<T>, requires_grad: bool) -> Result<Self> {
        Ok(Self::new(validate::validate_array(data)?, requires_grad))
    }

    /// Create a leaf tensor from a row-major buffer.
    pub fn from_shape_vec(shape: &[usize], data: Vec<T>, requires_grad: bool) -> Result<Self> {
        let dim = validate::validate_shape(shape, data.len())?;
        let data = Array2::from_shape_vec(dim, data)
            .map_err(|e| crate::Error::invalid_data(e.to_string()))?;
        Ok(Self::new(data, requires_grad))
    }

    pub fn from_raw(raw: RawTensor, requires_grad: bool) -> Result<Self> {
        Ok(Self::new(validate::validate_raw(raw)?, requires_grad))
    }

    /// Leaf tensor with entries drawn uniformly from `[-1, 1)`.
    pub fn rand<R: Rng + ?Sized>(rows: usize, cols: usize, requires_grad: bool, rng: &mut R) -> Self {
        let dist = Uniform::new(T::from_f64(-1.0), T::from_f64(1.0));
        let data = Array2::from_shape_simple_fn((rows, cols), || dist.sample(rng));
        Self::new(data, requires_grad)
    }

    pub fn to_raw(&self) -> RawTensor {
        RawTensor {
            dtype: T::DTYPE.name().to_string(),
            shape: self.shape().to_vec(),
            data: self.data().iter().map(|v| v.to_f64()).collect(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.0.id
    }

    pub fn data(&self) -> &Array2<T> {
        &self.0.data
    }

    /// Gradient accumulated so far.
    ///
    /// While the borrow is held, a backward pass that reaches this node fails
    /// with [`Error::GradBorrowed`](crate::Error::GradBorrowed).
    pub fn grad(&self) -> Ref<'_, Array2<T>> {
        self.0.grad.borrow()
    }

    pub fn dim(&self) -> (usize, usize) {
        self.0.data.dim()
    }

    pub fn shape(&self) -> &[usize] {
        self.0.data.shape()
    }

    pub fn dtype(&self) -> DType {
        T::DTYPE
    }

    pub fn requires_grad(&self) -> bool {
        self.0.requires_grad
    }

    /// The operator that produced this tensor, `None` for leaves.
    pub fn primitive(&self) -> Option<Primitive> {
        self.0.origin.as_ref().map(|o| o.primitive)
    }

    /// Inputs of the producing operator, in order. Empty for leaves.
    pub fn parents(&self) -> &[Tensor<T>] {
        match &self.0.origin {
            Some(origin) => &origin.parents,
            None => &[],
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.0.origin.is_none()
    }

    pub(crate) fn try_grad_mut(&self) -> Option<RefMut<'_, Array2<T>>> {
        self.0.grad.try_borrow_mut().ok()
    }

    /// Run `primitive` on `[self, other]` and record the result in the graph.
    pub fn apply(&self, primitive: Primitive, other: &Tensor<T>) -> Result<Tensor<T>> {
        let parents = vec![self.clone(), other.clone()];
        let data = primitive.forward(&parents)?;
        let requires_grad = parents.iter().any(Self::requires_grad);
        Ok(Self::from_node(
            data,
            requires_grad,
            Some(Origin { primitive, parents }),
        ))
    }

    /// Element-wise sum. Shapes must match exactly.
    pub fn add(&self, other: &Tensor<T>) -> Result<Tensor<T>> {
        self.apply(Primitive::Add, other)
    }

    /// Matrix product `self · other`.
    pub fn matmul(&self, other: &Tensor<T>) -> Result<Tensor<T>> {
        self.apply(Primitive::Mul, other)
    }
}

impl<T: Element> fmt::Display for Tensor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tensor({}, requires_grad={}, primitive=", self.data(), self.requires_grad())?;
        match self.primitive() {
            Some(p) => write!(f, "{p})"),
            None => f.write_str("None)"),
        }
    }
}

impl<T: Element> fmt::Debug for Tensor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tensor")
            .field("id", &self.id())
            .field("shape", &self.shape())
            .field("requires_grad", &self.requires_grad())
            .field("primitive", &self.primitive())
            .finish()
    }
}
