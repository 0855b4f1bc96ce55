//! Object model: the arena of designer nodes and their strategies

mod association;
mod creation;
mod deferred;
mod events;
mod instantiate;

use std::collections::{BTreeMap, BTreeSet};

use crate::error::DesignError;
use crate::syntax::SyntaxId;
use crate::variable::HandleStrategy;

pub use association::{Association, AssociationTemplate, CHILD_PLACEHOLDER, PARENT_PLACEHOLDER};
pub use creation::{Bindings, CreationStrategy, ExposedAccessor, FactoryHost};
pub use deferred::{DeferredQueue, DeferredTask};
pub use events::{DesignEvent, EventBus, Verdict};
pub use instantiate::{InstanceHandle, Instantiator, PreviewInstantiator};

/// Stable id of a node in the object arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "@{}", self.0)
    }
}

/// Value in a node's property side table
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    Text(String),
    Instance(InstanceHandle),
}

/// One live object and its source-level representation
#[derive(Debug, Clone)]
pub struct Node {
    /// Qualified or simple component class
    pub class: String,
    pub creation: CreationStrategy,
    pub handle: HandleStrategy,
    pub association: Association,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Syntax nodes that refer to this object
    pub related: BTreeSet<SyntaxId>,
    pub properties: BTreeMap<String, PropertyValue>,
    /// Discovered without a resolvable parent
    pub placeholder: bool,
    removed: bool,
}

impl Node {
    pub fn new(class: impl Into<String>, creation: CreationStrategy, handle: HandleStrategy) -> Self {
        Self {
            class: class.into(),
            creation,
            handle,
            association: Association::Empty,
            parent: None,
            children: Vec::new(),
            related: BTreeSet::new(),
            properties: BTreeMap::new(),
            placeholder: false,
            removed: false,
        }
    }

    pub fn with_association(mut self, association: Association) -> Self {
        self.association = association;
        self
    }

    pub fn is_removed(&self) -> bool {
        self.removed
    }
}

/// Arena of nodes with index links between parents and children
#[derive(Debug, Clone, Default)]
pub struct NodeTree {
    nodes: Vec<Node>,
    root: Option<NodeId>,
}

impl NodeTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn set_root(&mut self, node: Node) -> NodeId {
        let id = self.alloc(node);
        self.root = Some(id);
        id
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Add a node under `parent`, before `before` if given, else last
    pub fn add(&mut self, mut node: Node, parent: NodeId, before: Option<NodeId>) -> NodeId {
        node.parent = Some(parent);
        let id = self.alloc(node);
        self.link(id, parent, before);
        id
    }

    /// Add a node with no parent yet; it stays outside every subtree until
    /// [`NodeTree::attach`] links it
    pub fn add_detached(&mut self, node: Node) -> NodeId {
        self.alloc(node)
    }

    /// Link a parentless node under `parent`
    pub fn attach(&mut self, id: NodeId, parent: NodeId, before: Option<NodeId>) {
        if self.contains(id) && self.nodes[id.index()].parent.is_none() {
            self.link(id, parent, before);
        }
    }

    fn link(&mut self, id: NodeId, parent: NodeId, before: Option<NodeId>) {
        let children = &mut self.nodes[parent.index()].children;
        let index = before
            .and_then(|b| children.iter().position(|c| *c == b))
            .unwrap_or(children.len());
        children.insert(index, id);
        self.nodes[id.index()].parent = Some(parent);
    }

    fn unlink(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.index()].parent.take() {
            self.nodes[parent.index()].children.retain(|c| *c != id);
        }
    }

    /// Re-link a node under a new parent
    pub fn reparent(&mut self, id: NodeId, parent: NodeId, before: Option<NodeId>) {
        self.unlink(id);
        self.link(id, parent, before);
    }

    /// Remove a node (children must have been removed first)
    pub fn remove(&mut self, id: NodeId) {
        self.unlink(id);
        let node = &mut self.nodes[id.index()];
        node.removed = true;
        node.related.clear();
        node.children.clear();
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index()).filter(|n| !n.removed)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index()).filter(|n| !n.removed)
    }

    /// Live node or `UnknownNode`
    pub fn node(&self, id: NodeId) -> Result<&Node, DesignError> {
        self.get(id).ok_or(DesignError::UnknownNode(id))
    }

    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, DesignError> {
        self.get_mut(id).ok_or(DesignError::UnknownNode(id))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Live nodes in id order
    pub fn ids(&self) -> Vec<NodeId> {
        (0..self.nodes.len() as u32)
            .map(NodeId)
            .filter(|id| self.contains(*id))
            .collect()
    }

    /// Preorder walk of a subtree, `id` included
    pub fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if !self.contains(next) {
                continue;
            }
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// True if `id` is `ancestor` or one of its descendants
    pub fn is_within(&self, id: NodeId, ancestor: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(n) = current {
            if n == ancestor {
                return true;
            }
            current = self.parent(n);
        }
        false
    }

    pub fn len(&self) -> usize {
        self.ids().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(class: &str) -> Node {
        Node::new(class, CreationStrategy::This, HandleStrategy::Empty)
    }

    #[test]
    fn test_add_and_order() {
        let mut tree = NodeTree::new();
        let root = tree.set_root(node("JPanel"));
        let a = tree.add(node("JButton"), root, None);
        let b = tree.add(node("JLabel"), root, None);
        let c = tree.add(node("JTextField"), root, Some(b));
        assert_eq!(tree.children(root), &[a, c, b]);
        assert_eq!(tree.parent(c), Some(root));
    }

    #[test]
    fn test_reparent_and_within() {
        let mut tree = NodeTree::new();
        let root = tree.set_root(node("JPanel"));
        let panel = tree.add(node("JPanel"), root, None);
        let button = tree.add(node("JButton"), root, None);
        tree.reparent(button, panel, None);
        assert_eq!(tree.children(root), &[panel]);
        assert!(tree.is_within(button, root));
        assert!(!tree.is_within(panel, button));
        assert_eq!(tree.subtree(root), vec![root, panel, button]);
    }

    #[test]
    fn test_detached_until_attached() {
        let mut tree = NodeTree::new();
        let root = tree.set_root(node("JPanel"));
        let pending = tree.add_detached(node("JButton"));
        assert_eq!(tree.subtree(root), vec![root]);
        tree.attach(pending, root, None);
        assert_eq!(tree.children(root), &[pending]);
        // already linked, second attach is ignored
        tree.attach(pending, root, None);
        assert_eq!(tree.children(root).len(), 1);
    }

    #[test]
    fn test_remove() {
        let mut tree = NodeTree::new();
        let root = tree.set_root(node("JPanel"));
        let button = tree.add(node("JButton"), root, None);
        tree.remove(button);
        assert!(tree.children(root).is_empty());
        assert!(matches!(tree.node(button), Err(DesignError::UnknownNode(_))));
        assert_eq!(tree.len(), 1);
    }
}
