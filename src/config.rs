use serde::{Deserialize, Serialize};

/// Options for a backward pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackwardConfig {
    /// Skip nodes that do not require gradients, together with their
    /// ancestors. Their `grad` buffers stay untouched.
    pub prune_no_grad: bool,
}

impl Default for BackwardConfig {
    fn default() -> Self {
        BackwardConfig {
            prune_no_grad: true,
        }
    }
}
