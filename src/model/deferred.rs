//! "Run after the current pass" queue

use std::collections::VecDeque;

use crate::error::DesignError;

pub type DeferredTask<C> = Box<dyn FnOnce(&mut C) -> Result<(), DesignError>>;

/// FIFO of tasks run once, in submission order, when the outermost edit ends
pub struct DeferredQueue<C> {
    tasks: VecDeque<(&'static str, DeferredTask<C>)>,
}

impl<C> Default for DeferredQueue<C> {
    fn default() -> Self {
        Self {
            tasks: VecDeque::new(),
        }
    }
}

impl<C> DeferredQueue<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(
        &mut self,
        label: &'static str,
        task: impl FnOnce(&mut C) -> Result<(), DesignError> + 'static,
    ) {
        self.tasks.push_back((label, Box::new(task)));
    }

    pub fn pop(&mut self) -> Option<(&'static str, DeferredTask<C>)> {
        self.tasks.pop_front()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.tasks.iter().any(|(l, _)| *l == label)
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl<C> std::fmt::Debug for DeferredQueue<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.tasks.iter().map(|(label, _)| label))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_once() {
        let mut queue: DeferredQueue<Vec<u32>> = DeferredQueue::new();
        queue.push("one", |log| {
            log.push(1);
            Ok(())
        });
        queue.push("two", |log| {
            log.push(2);
            Ok(())
        });
        assert!(queue.contains("two"));
        let mut log = Vec::new();
        while let Some((_, task)) = queue.pop() {
            task(&mut log).expect("task");
        }
        assert_eq!(log, vec![1, 2]);
        assert!(queue.is_empty());
    }
}
