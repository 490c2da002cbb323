//! Error types for graph construction and backward propagation.

use thiserror::Error;

use crate::tensor::NodeId;

/// Errors raised while building or differentiating a computation graph.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Data is not a 2-D float32/float64 array.
    #[error("invalid tensor data: {reason}")]
    InvalidData {
        /// Which rule the data broke.
        reason: String,
    },

    /// A primitive was invoked with the wrong number of inputs.
    #[error("{op} expects {expected} inputs, got {got}")]
    Arity {
        /// Primitive name.
        op: &'static str,
        /// Required input count.
        expected: usize,
        /// Supplied input count.
        got: usize,
    },

    /// Operand shapes are incompatible for the operation.
    #[error("shape mismatch in {op}: {lhs:?} vs {rhs:?}")]
    ShapeMismatch {
        /// Operation that rejected the shapes.
        op: &'static str,
        /// Left-hand (or expected) shape.
        lhs: Vec<usize>,
        /// Right-hand (or supplied) shape.
        rhs: Vec<usize>,
    },

    /// Topological processing stalled before every node was finalized.
    #[error("computation graph has a cycle: {unresolved} nodes never became ready")]
    GraphCycle {
        /// Nodes whose dependencies were never satisfied.
        unresolved: usize,
    },

    /// A gradient buffer the pass must update is still borrowed by the caller.
    #[error("gradient of {node:?} is borrowed elsewhere")]
    GradBorrowed {
        /// Node whose gradient could not be updated.
        node: NodeId,
    },
}

impl Error {
    pub(crate) fn invalid_data(reason: impl Into<String>) -> Self {
        Error::InvalidData {
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = Error::ShapeMismatch {
            op: "Add",
            lhs: vec![1, 2],
            rhs: vec![1, 3],
        };
        assert_eq!(err.to_string(), "shape mismatch in Add: [1, 2] vs [1, 3]");

        let err = Error::Arity {
            op: "Mul",
            expected: 2,
            got: 3,
        };
        assert_eq!(err.to_string(), "Mul expects 2 inputs, got 3");

        let err = Error::invalid_data("data must be 2 dimensional");
        assert_eq!(
            err.to_string(),
            "invalid tensor data: data must be 2 dimensional"
        );
    }
}
