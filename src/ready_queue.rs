// src/ready_queue.rs
use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::dtype::Element;
use crate::tensor::Tensor;

/// A node whose gradient is final for the current pass.
pub(crate) struct NodeTask<T: Element> {
    pub(crate) node: Tensor<T>,
}

impl<T: Element> NodeTask<T> {
    pub(crate) fn new(node: Tensor<T>) -> Self {
        NodeTask { node }
    }
}

impl<T: Element> PartialEq for NodeTask<T> {
    fn eq(&self, other: &Self) -> bool {
        self.node.id() == other.node.id()
    }
}

impl<T: Element> Eq for NodeTask<T> {}

impl<T: Element> PartialOrd for NodeTask<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Newest node first.
impl<T: Element> Ord for NodeTask<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.node.id().cmp(&other.node.id())
    }
}

pub(crate) struct ReadyQueue<T: Element> {
    heap: BinaryHeap<NodeTask<T>>,
}

impl<T: Element> ReadyQueue<T> {
    pub(crate) fn new() -> Self {
        ReadyQueue {
            heap: BinaryHeap::new(),
        }
    }

    pub(crate) fn push(&mut self, item: NodeTask<T>) {
        self.heap.push(item);
    }

    pub(crate) fn pop(&mut self) -> Option<NodeTask<T>> {
        self.heap.pop()
    }

    pub(crate) fn len(&self) -> usize {
        self.heap.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_pops_newest_first() {
        let a = Tensor::new(array![[1.0]], false);
        let b = Tensor::new(array![[2.0]], false);
        let c = a.add(&b).unwrap();

        let mut queue = ReadyQueue::new();
        queue.push(NodeTask::new(b.clone()));
        queue.push(NodeTask::new(c.clone()));
        queue.push(NodeTask::new(a.clone()));
        assert_eq!(queue.len(), 3);

        let order: Vec<_> = std::iter::from_fn(|| queue.pop().map(|t| t.node.id())).collect();
        assert_eq!(order, vec![c.id(), b.id(), a.id()]);
        assert_eq!(queue.len(), 0);
    }
}
