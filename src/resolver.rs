//! Statement target resolution
//!
//! A fresh node goes to the start of the first instance flow root, after any
//! `super(..)`/`this(..)` call. A node under an existing parent goes after
//! the last statement of the parent's subtree, or before the first statement
//! of the anchor's subtree when an anchor is given.

use tracing::debug;

use crate::editor::StatementTarget;
use crate::error::DesignError;
use crate::model::NodeId;
use crate::session::Session;
use crate::syntax::{ExecutionFlow, SyntaxId, SyntaxKind, SyntaxTree};
use crate::variable::HandleStrategy;

/// True if a statement inserted at `target` is at or after index `index` of
/// `block`, directly or inside a nested statement
pub fn covers(tree: &SyntaxTree, target: StatementTarget, block: SyntaxId, index: usize) -> bool {
    let Some((container, at)) = target.location(tree) else {
        return false;
    };
    if container == block {
        return at >= index;
    }
    let mut current = container;
    while let Some(parent) = tree.parent(current) {
        if parent == block {
            return tree
                .index_in_parent(current)
                .map(|i| i >= index)
                .unwrap_or(false);
        }
        current = parent;
    }
    false
}

/// Drop statements nested inside another statement of the list
pub(crate) fn top_most(tree: &SyntaxTree, statements: &[SyntaxId]) -> Vec<SyntaxId> {
    statements
        .iter()
        .copied()
        .filter(|s| {
            !statements
                .iter()
                .any(|other| other != s && tree.is_within(*s, *other))
        })
        .collect()
}

impl Session {
    /// Accessor methods of lazily created nodes
    pub(crate) fn lazy_accessors(&self) -> Vec<SyntaxId> {
        self.nodes
            .ids()
            .into_iter()
            .filter_map(|id| match self.nodes.get(id).map(|n| &n.handle) {
                Some(HandleStrategy::Lazy { accessor, .. }) => Some(*accessor),
                _ => None,
            })
            .collect()
    }

    /// Flow statements related to the nodes of a subtree, in execution order,
    /// leaving out accessor bodies and the subtree of `skip`
    pub(crate) fn subtree_statements(
        &self,
        flow: &ExecutionFlow,
        node: NodeId,
        skip: Option<NodeId>,
    ) -> Vec<SyntaxId> {
        let tree = self.editor.tree();
        let accessors = self.lazy_accessors();
        let mut statements: Vec<SyntaxId> = self
            .nodes
            .subtree(node)
            .into_iter()
            .filter(|n| skip.map(|s| !self.nodes.is_within(*n, s)).unwrap_or(true))
            .flat_map(|n| self.related_statements(flow, n))
            .filter(|s| !accessors.iter().any(|a| tree.is_within(*s, *a)))
            .collect();
        statements.sort_by_key(|s| flow.position(*s));
        statements.dedup();
        statements
    }

    /// Start of the first instance flow root, after its constructor call
    pub(crate) fn fresh_target(&self, flow: &ExecutionFlow) -> Result<StatementTarget, DesignError> {
        let tree = self.editor.tree();
        let root = flow
            .roots()
            .iter()
            .copied()
            .find(|m| !tree.is_static(*m))
            .or_else(|| flow.roots().first().copied())
            .ok_or_else(|| DesignError::invalid_target("source has no execution flow root"))?;
        let body = tree
            .method_body(root)
            .ok_or_else(|| DesignError::invalid_target("flow root has no body"))?;
        Ok(match tree.children(body).first() {
            Some(first) if tree.is_constructor_call(*first) => StatementTarget::After(*first),
            _ => StatementTarget::BlockStart(body),
        })
    }

    /// Where statements of a node placed under `parent` (before `anchor`) go;
    /// statements of `moving` are not considered
    pub(crate) fn target_for(
        &self,
        flow: &ExecutionFlow,
        parent: NodeId,
        anchor: Option<NodeId>,
        moving: Option<NodeId>,
    ) -> Result<StatementTarget, DesignError> {
        let tree = self.editor.tree();
        if let Some(anchor) = anchor {
            if let Some(first) = self.subtree_statements(flow, anchor, moving).first() {
                let target = if tree.is_constructor_call(*first) {
                    StatementTarget::After(*first)
                } else {
                    StatementTarget::Before(*first)
                };
                debug!(%target, "target before anchor");
                return Ok(target);
            }
        }
        let target = match self.subtree_statements(flow, parent, moving).last() {
            Some(last) if matches!(tree.kind(*last), SyntaxKind::Return) => {
                StatementTarget::Before(*last)
            }
            Some(last) => StatementTarget::After(*last),
            None => self.fresh_target(flow)?,
        };
        debug!(%target, "target after parent");
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::Catalog;
    use crate::DesignerConfig;

    fn open(source: &str) -> Session {
        let catalog = Catalog::builtin().expect("catalog");
        Session::open(source, catalog, DesignerConfig::default()).expect("Should open")
    }

    #[test]
    fn test_fresh_target_skips_super_call() {
        let session = open("class A extends JPanel {\n\tpublic A() {\n\t\tsuper();\n\t}\n}");
        let flow = session.flow();
        let target = session.fresh_target(&flow).expect("target");
        let tree = session.tree();
        let body = tree.method_body(tree.methods()[0]).expect("body");
        assert_eq!(target, StatementTarget::After(tree.children(body)[0]));
    }

    #[test]
    fn test_fresh_target_prefers_instance_root() {
        let session = open(
            "class A extends JPanel {\n\tpublic static void main(String[] args) {\n\t}\n\tpublic A() {\n\t}\n}",
        );
        let flow = session.flow();
        let tree = session.tree();
        let ctor = tree.methods()[1];
        let body = tree.method_body(ctor).expect("body");
        assert_eq!(
            session.fresh_target(&flow).expect("target"),
            StatementTarget::BlockStart(body)
        );
    }

    #[test]
    fn test_append_and_anchor_targets() {
        let session = open(
            "class A extends JPanel {\n\tpublic A() {\n\t\tJButton button = new JButton();\n\t\tadd(button);\n\t\tJLabel label = new JLabel();\n\t\tadd(label);\n\t}\n}",
        );
        let flow = session.flow();
        let tree = session.tree();
        let body = tree.method_body(tree.methods()[0]).expect("body");
        let statements = tree.children(body).to_vec();
        let root = session.root();
        let button = session.find_by_name("button").expect("button");
        let label = session.find_by_name("label").expect("label");

        let append = session.target_for(&flow, root, None, None).expect("append");
        assert_eq!(append, StatementTarget::After(statements[3]));
        let before = session.target_for(&flow, root, Some(label), None).expect("anchor");
        assert_eq!(before, StatementTarget::Before(statements[2]));
        let without_label = session.target_for(&flow, root, None, Some(label)).expect("skip");
        assert_eq!(without_label, StatementTarget::After(statements[1]));
        assert!(session.nodes().is_within(button, root));
    }

    #[test]
    fn test_covers_nested_blocks() {
        let session = open(
            "class A extends JPanel {\n\tpublic A() {\n\t\tfoo();\n\t\tif (x) {\n\t\t\tbar();\n\t\t}\n\t}\n}",
        );
        let tree = session.tree();
        let body = tree.method_body(tree.methods()[0]).expect("body");
        let guard = tree.children(body)[1];
        let inner_block = tree.children(guard)[1];
        let bar = tree.children(inner_block)[0];
        assert!(covers(tree, StatementTarget::Before(bar), body, 1));
        assert!(!covers(tree, StatementTarget::Before(bar), body, 2));
        assert!(covers(tree, StatementTarget::BlockEnd(body), body, 2));
    }
}
