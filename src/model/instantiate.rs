//! Live-instantiation boundary

use crate::error::DesignError;

use super::{CreationStrategy, NodeId};

/// Opaque handle to a live object created for preview
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceHandle(pub u64);

impl std::fmt::Display for InstanceHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "instance {}", self.0)
    }
}

/// Builds live objects from a node's creation strategy
pub trait Instantiator {
    fn instantiate(
        &mut self,
        node: NodeId,
        class: &str,
        creation: &CreationStrategy,
        args: &[String],
    ) -> Result<InstanceHandle, DesignError>;
}

/// Hands out sequential handles without building anything
#[derive(Debug, Clone, Default)]
pub struct PreviewInstantiator {
    next: u64,
}

impl PreviewInstantiator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Instantiator for PreviewInstantiator {
    fn instantiate(
        &mut self,
        _node: NodeId,
        _class: &str,
        _creation: &CreationStrategy,
        _args: &[String],
    ) -> Result<InstanceHandle, DesignError> {
        self.next += 1;
        Ok(InstanceHandle(self.next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_handles() {
        let mut instantiator = PreviewInstantiator::new();
        let first = instantiator
            .instantiate(NodeId(0), "JPanel", &CreationStrategy::This, &[])
            .expect("instance");
        let second = instantiator
            .instantiate(NodeId(1), "JPanel", &CreationStrategy::This, &[])
            .expect("instance");
        assert_eq!(first, InstanceHandle(1));
        assert_eq!(second, InstanceHandle(2));
    }
}
