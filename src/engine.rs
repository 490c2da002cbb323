use ndarray::Array2;

use crate::config::BackwardConfig;
use crate::dtype::Element;
use crate::error::{Error, Result};
use crate::graph_task::GraphTask;
use crate::ready_queue::{NodeTask, ReadyQueue};
use crate::tensor::Tensor;

/// Runs backward passes.
///
/// Nodes are processed in topological order: a node is evaluated only after
/// every consumer reachable from the root has delivered its contribution, so
/// shared sub-expressions propagate their full gradient exactly once.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: BackwardConfig,
}

impl Engine {
    pub fn new(config: BackwardConfig) -> Self {
        Engine { config }
    }

    pub fn config(&self) -> &BackwardConfig {
        &self.config
    }

    /// Propagate `seed` (ones when `None`) from `root` to every ancestor that
    /// requires a gradient.
    pub fn execute<T: Element>(&self, root: &Tensor<T>, seed: Option<Array2<T>>) -> Result<()> {
        let seed = match seed {
            Some(grad) if grad.dim() != root.dim() => {
                return Err(Error::ShapeMismatch {
                    op: "backward",
                    lhs: root.shape().to_vec(),
                    rhs: grad.shape().to_vec(),
                });
            }
            Some(grad) => grad,
            None => Array2::ones(root.data().raw_dim()),
        };

        let mut graph_task = GraphTask::new(self.config);
        if !graph_task.should_execute(root) {
            log::debug!("skipping backward from {:?}: root does not require grad", root.id());
            return Ok(());
        }

        graph_task.init_to_execute(root);
        log::debug!(
            "backward from {:?} over {} nodes",
            root.id(),
            graph_task.num_nodes()
        );

        graph_task.accumulate(root, seed);
        let mut ready_queue = ReadyQueue::new();
        ready_queue.push(NodeTask::new(root.clone()));

        while let Some(task) = ready_queue.pop() {
            Self::evaluate_function(&mut graph_task, task.node, &mut ready_queue)?;
        }

        graph_task.exec_post_processing()?;
        log::debug!("backward from {:?} finished", root.id());
        Ok(())
    }

    fn evaluate_function<T: Element>(
        graph_task: &mut GraphTask<T>,
        node: Tensor<T>,
        ready_queue: &mut ReadyQueue<T>,
    ) -> Result<()> {
        let Some(grad) = graph_task.take_input(&node) else {
            return Ok(());
        };
        log::trace!(
            "evaluating {:?} ({:?}), {} ready",
            node.id(),
            node.primitive(),
            ready_queue.len()
        );

        if let Some(primitive) = node.primitive() {
            let (lhs_grad, rhs_grad) = primitive.backward(&grad, node.parents())?;
            for (parent, contribution) in node.parents().iter().zip([lhs_grad, rhs_grad]) {
                if !graph_task.should_execute(parent) {
                    continue;
                }
                graph_task.accumulate(parent, contribution);
                if graph_task.decrement_dependencies(parent) {
                    ready_queue.push(NodeTask::new(parent.clone()));
                }
            }
        }

        graph_task.mark_finished(node, grad);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_seed_defaults_to_ones() {
        let a = Tensor::new(array![[1.0, 2.0], [3.0, 4.0]], true);
        let b = Tensor::new(array![[0.0, 0.0], [0.0, 0.0]], true);
        let c = a.add(&b).unwrap();
        Engine::default().execute(&c, None).unwrap();
        assert_eq!(*c.grad(), Array2::<f64>::ones((2, 2)));
        assert_eq!(*a.grad(), Array2::<f64>::ones((2, 2)));
    }

    #[test]
    fn test_bad_seed_touches_nothing() {
        let a = Tensor::new(array![[1.0, 2.0]], true);
        let b = Tensor::new(array![[3.0, 4.0]], true);
        let c = a.add(&b).unwrap();
        let err = Engine::default()
            .execute(&c, Some(array![[1.0], [1.0]]))
            .unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { op: "backward", .. }));
        assert_eq!(*a.grad(), array![[0.0, 0.0]]);
        assert_eq!(*c.grad(), array![[0.0, 0.0]]);
    }

    #[test]
    fn test_leaf_root() {
        let a = Tensor::new(array![[1.0, 2.0]], true);
        Engine::default()
            .execute(&a, Some(array![[0.5, 0.25]]))
            .unwrap();
        assert_eq!(*a.grad(), array![[0.5, 0.25]]);
    }

    #[test]
    fn test_no_grad_root_is_noop() {
        let a = Tensor::new(array![[1.0]], false);
        let b = Tensor::new(array![[2.0]], false);
        let c = a.add(&b).unwrap();
        Engine::default().execute(&c, None).unwrap();
        assert_eq!(*c.grad(), array![[0.0]]);
        assert_eq!(*a.grad(), array![[0.0]]);

        Engine::new(BackwardConfig {
            prune_no_grad: false,
        })
        .execute(&c, None)
        .unwrap();
        assert_eq!(*a.grad(), array![[1.0]]);
    }
}
