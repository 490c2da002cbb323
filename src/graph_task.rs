use std::collections::{HashMap, HashSet};

use ndarray::Array2;

use crate::config::BackwardConfig;
use crate::dtype::Element;
use crate::error::{Error, Result};
use crate::tensor::{NodeId, Tensor};

/// Bookkeeping for a single backward pass.
///
/// Gradients computed during the pass are buffered here and only written to
/// the nodes by [`GraphTask::exec_post_processing`], so a failed pass leaves
/// every node untouched.
pub(crate) struct GraphTask<T: Element> {
    config: BackwardConfig,
    /// Unprocessed consumer edges per reachable node.
    dependencies: HashMap<NodeId, usize>,
    /// Gradient summed so far for each node in this pass.
    input_buffers: HashMap<NodeId, Array2<T>>,
    /// Nodes with their final gradient for this pass, in processing order.
    finished: Vec<(Tensor<T>, Array2<T>)>,
    num_nodes: usize,
}

impl<T: Element> GraphTask<T> {
    pub(crate) fn new(config: BackwardConfig) -> Self {
        GraphTask {
            config,
            dependencies: HashMap::new(),
            input_buffers: HashMap::new(),
            finished: Vec::new(),
            num_nodes: 0,
        }
    }

    pub(crate) fn should_execute(&self, node: &Tensor<T>) -> bool {
        !self.config.prune_no_grad || node.requires_grad()
    }

    /// Walk every node reachable from `graph_root` and count how many
    /// consumer edges point at it.
    pub(crate) fn init_to_execute(&mut self, graph_root: &Tensor<T>) {
        let mut stack = vec![graph_root.clone()];
        let mut seen = HashSet::new();
        seen.insert(graph_root.id());

        while let Some(node) = stack.pop() {
            for parent in node.parents() {
                if !self.should_execute(parent) {
                    continue;
                }
                *self.dependencies.entry(parent.id()).or_insert(0) += 1;
                if seen.insert(parent.id()) {
                    stack.push(parent.clone());
                }
            }
        }
        self.num_nodes = seen.len();
    }

    pub(crate) fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    /// Add `grad` into the pass buffer of `node`.
    pub(crate) fn accumulate(&mut self, node: &Tensor<T>, grad: Array2<T>) {
        match self.input_buffers.get_mut(&node.id()) {
            Some(existing) => *existing += &grad,
            None => {
                self.input_buffers.insert(node.id(), grad);
            }
        }
    }

    /// Mark one consumer edge of `node` as processed. Returns true once the
    /// node has received every contribution.
    pub(crate) fn decrement_dependencies(&mut self, node: &Tensor<T>) -> bool {
        match self.dependencies.get_mut(&node.id()) {
            Some(count) => {
                *count = count.saturating_sub(1);
                *count == 0
            }
            None => false,
        }
    }

    pub(crate) fn take_input(&mut self, node: &Tensor<T>) -> Option<Array2<T>> {
        self.input_buffers.remove(&node.id())
    }

    pub(crate) fn mark_finished(&mut self, node: Tensor<T>, grad: Array2<T>) {
        self.finished.push((node, grad));
    }

    /// Commit the pass: every discovered node must have been finalized and
    /// every gradient buffer writable before any of them is touched.
    pub(crate) fn exec_post_processing(self) -> Result<()> {
        let not_ready = self.num_nodes.saturating_sub(self.finished.len());
        if not_ready != 0 {
            return Err(Error::GraphCycle {
                unresolved: not_ready,
            });
        }

        let mut guards = Vec::with_capacity(self.finished.len());
        for (node, _) in &self.finished {
            let guard = node
                .try_grad_mut()
                .ok_or(Error::GradBorrowed { node: node.id() })?;
            guards.push(guard);
        }
        for (mut guard, (_, grad)) in guards.into_iter().zip(&self.finished) {
            *guard += grad;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_dependencies_count_every_edge() {
        let x = Tensor::new(array![[1.0, 2.0]], true);
        let y = x.add(&x).unwrap();
        let z = y.add(&x).unwrap();

        let mut task = GraphTask::new(BackwardConfig::default());
        task.init_to_execute(&z);
        assert_eq!(task.num_nodes(), 3);
        assert_eq!(task.dependencies[&x.id()], 3);
        assert_eq!(task.dependencies[&y.id()], 1);
        assert!(!task.dependencies.contains_key(&z.id()));
    }

    #[test]
    fn test_prunes_constant_subgraph() {
        let a = Tensor::new(array![[1.0]], false);
        let b = Tensor::new(array![[2.0]], false);
        let c = a.add(&b).unwrap();
        let w = Tensor::new(array![[3.0]], true);
        let out = c.matmul(&w).unwrap();

        let mut task = GraphTask::new(BackwardConfig::default());
        task.init_to_execute(&out);
        assert_eq!(task.num_nodes(), 2);
        assert!(!task.dependencies.contains_key(&c.id()));

        let mut task = GraphTask::new(BackwardConfig {
            prune_no_grad: false,
        });
        task.init_to_execute(&out);
        assert_eq!(task.num_nodes(), 5);
    }

    #[test]
    fn test_unfinished_nodes_are_reported() {
        let a = Tensor::new(array![[1.0]], true);
        let b = Tensor::new(array![[2.0]], true);
        let c = a.add(&b).unwrap();

        let mut task = GraphTask::new(BackwardConfig::default());
        task.init_to_execute(&c);
        task.mark_finished(c.clone(), array![[1.0]]);
        let err = task.exec_post_processing().unwrap_err();
        assert_eq!(err, Error::GraphCycle { unresolved: 2 });
        assert_eq!(*c.grad(), array![[0.0]]);
    }

    #[test]
    fn test_borrowed_grad_blocks_whole_commit() {
        let a = Tensor::new(array![[1.0]], true);
        let b = Tensor::new(array![[2.0]], true);
        let c = a.add(&b).unwrap();

        let mut task = GraphTask::new(BackwardConfig::default());
        task.init_to_execute(&c);
        task.mark_finished(c.clone(), array![[1.0]]);
        task.mark_finished(b.clone(), array![[1.0]]);
        task.mark_finished(a.clone(), array![[1.0]]);

        let held = a.grad();
        let err = task.exec_post_processing().unwrap_err();
        assert_eq!(err, Error::GradBorrowed { node: a.id() });
        drop(held);
        assert_eq!(*b.grad(), array![[0.0]]);
        assert_eq!(*c.grad(), array![[0.0]]);
    }
}
