//! Statement insertion targets

use crate::syntax::{SyntaxId, SyntaxKind, SyntaxTree};

/// A point in a block where a statement can be inserted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementTarget {
    Before(SyntaxId),
    After(SyntaxId),
    BlockStart(SyntaxId),
    BlockEnd(SyntaxId),
}

impl StatementTarget {
    /// Block receiving the inserted statement
    pub fn block(&self, tree: &SyntaxTree) -> Option<SyntaxId> {
        match self {
            StatementTarget::Before(stmt) | StatementTarget::After(stmt) => {
                let parent = tree.parent(*stmt)?;
                matches!(tree.kind(parent), SyntaxKind::Block).then_some(parent)
            }
            StatementTarget::BlockStart(block) | StatementTarget::BlockEnd(block) => {
                matches!(tree.kind(*block), SyntaxKind::Block).then_some(*block)
            }
        }
    }

    /// Index in the target block that the inserted statement will occupy
    pub fn index(&self, tree: &SyntaxTree) -> Option<usize> {
        match self {
            StatementTarget::Before(stmt) => tree.index_in_parent(*stmt),
            StatementTarget::After(stmt) => tree.index_in_parent(*stmt).map(|i| i + 1),
            StatementTarget::BlockStart(_) => Some(0),
            StatementTarget::BlockEnd(block) => Some(tree.children(*block).len()),
        }
    }

    /// Block and insertion index
    pub fn location(&self, tree: &SyntaxTree) -> Option<(SyntaxId, usize)> {
        Some((self.block(tree)?, self.index(tree)?))
    }

    /// Statement the target is anchored on, if any
    pub fn anchor(&self) -> Option<SyntaxId> {
        match self {
            StatementTarget::Before(stmt) | StatementTarget::After(stmt) => Some(*stmt),
            _ => None,
        }
    }
}

impl std::fmt::Display for StatementTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatementTarget::Before(id) => write!(f, "before {}", id),
            StatementTarget::After(id) => write!(f, "after {}", id),
            StatementTarget::BlockStart(id) => write!(f, "start of {}", id),
            StatementTarget::BlockEnd(id) => write!(f, "end of {}", id),
        }
    }
}
