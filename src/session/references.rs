//! Which syntax refers to which node
//!
//! The related set of a node is recomputed from its strategies: the creation
//! expression, the declaration and assignment of its variable, every name
//! bound to that variable (for shared variables, only between this object's
//! assignment and the next one in execution order), accessor calls, exposed
//! getter calls and the parent call carrying it.

use std::collections::BTreeSet;

use crate::model::{CreationStrategy, ExposedAccessor, NodeId};
use crate::syntax::scope::{self, Binding};
use crate::syntax::{ExecutionFlow, SyntaxId, SyntaxKind};
use crate::variable::HandleStrategy;

use super::Session;

impl Session {
    /// Execution-order position of the statement enclosing `id`; fields and
    /// their initializers come before every statement
    pub(crate) fn flow_position(&self, flow: &ExecutionFlow, id: SyntaxId) -> Option<isize> {
        let tree = self.editor.tree();
        if let Some(member) = tree.enclosing_member(id) {
            if matches!(tree.kind(member), SyntaxKind::Field { .. }) {
                return Some(-1);
            }
        }
        let stmt = tree.enclosing_statement(id)?;
        flow.position(stmt).map(|p| p as isize)
    }

    /// Nodes whose handle stores into `binding`
    pub(crate) fn holders(&self, binding: Binding) -> Vec<NodeId> {
        self.nodes
            .ids()
            .into_iter()
            .filter(|id| {
                self.nodes
                    .get(*id)
                    .map(|n| n.handle.binding() == Some(binding))
                    .unwrap_or(false)
            })
            .collect()
    }

    /// Node a use of `binding` at `at` refers to
    pub(crate) fn node_for_binding(&self, flow: &ExecutionFlow, binding: Binding, at: SyntaxId) -> Option<NodeId> {
        let holders = self.holders(binding);
        if holders.len() <= 1 {
            return holders.first().copied();
        }
        let assigned_at = |id: &NodeId| {
            self.nodes
                .get(*id)
                .and_then(|n| n.handle.assignment())
                .and_then(|a| self.flow_position(flow, a))
        };
        let Some(position) = self.flow_position(flow, at) else {
            return holders.iter().min_by_key(|id| assigned_at(id)).copied();
        };
        holders
            .iter()
            .filter_map(|id| assigned_at(id).map(|p| (p, *id)))
            .filter(|(p, _)| *p <= position)
            .max_by_key(|(p, _)| *p)
            .map(|(_, id)| id)
    }

    pub(crate) fn creation_owner(&self, expr: SyntaxId) -> Option<NodeId> {
        self.nodes.ids().into_iter().find(|id| {
            self.nodes
                .get(*id)
                .map(|n| n.creation.expression() == Some(expr))
                .unwrap_or(false)
        })
    }

    pub(crate) fn exposed_child(&self, host: NodeId, accessor: &ExposedAccessor) -> Option<NodeId> {
        self.nodes.children(host).iter().copied().find(|id| {
            matches!(
                self.nodes.get(*id).map(|n| &n.creation),
                Some(CreationStrategy::Exposed { accessor: a, .. }) if a == accessor
            )
        })
    }

    fn lazy_accessor_owner(&self, name: &str) -> Option<NodeId> {
        let tree = self.editor.tree();
        self.nodes.ids().into_iter().find(|id| {
            matches!(
                self.nodes.get(*id).map(|n| &n.handle),
                Some(HandleStrategy::Lazy { accessor, .. })
                    if tree.is_live(*accessor) && tree.name_of(*accessor) == Some(name)
            )
        })
    }

    /// Node an expression evaluates to, if any
    pub(crate) fn node_for_expression(&self, flow: &ExecutionFlow, expr: SyntaxId) -> Option<NodeId> {
        let tree = self.editor.tree();
        let expr = tree.strip_wrappers(expr);
        match tree.kind(expr) {
            SyntaxKind::This => Some(self.root),
            SyntaxKind::New { .. } => self.creation_owner(expr),
            SyntaxKind::Name(name) => match scope::resolve(tree, expr) {
                Some(binding) => self.node_for_binding(flow, binding, expr),
                None => self.exposed_child(self.root, &ExposedAccessor::Field(name.clone())),
            },
            SyntaxKind::FieldAccess => {
                if let Some(binding) = scope::resolve(tree, expr) {
                    return self.node_for_binding(flow, binding, expr);
                }
                let target = *tree.children(expr).first()?;
                let host = self.node_for_expression(flow, target)?;
                let field = tree.name_of(expr)?.to_string();
                self.exposed_child(host, &ExposedAccessor::Field(field))
            }
            SyntaxKind::Invoke { .. } => {
                if let Some(owner) = self.creation_owner(expr) {
                    return Some(owner);
                }
                let invocation = tree.invocation(expr)?;
                if !invocation.args.is_empty() {
                    return None;
                }
                let host = match invocation.target {
                    None => self.root,
                    Some(t) if matches!(tree.kind(t), SyntaxKind::This) => self.root,
                    Some(t) => self.node_for_expression(flow, t)?,
                };
                if host == self.root {
                    if let Some(owner) = self.lazy_accessor_owner(invocation.name) {
                        return Some(owner);
                    }
                }
                self.exposed_child(host, &ExposedAccessor::Getter(invocation.name.to_string()))
            }
            _ => None,
        }
    }

    /// Uses of a node's variable that denote this node, in source order
    pub(crate) fn variable_references(&self, flow: &ExecutionFlow, node: NodeId) -> Vec<SyntaxId> {
        let Some(binding) = self.nodes.get(node).and_then(|n| n.handle.binding()) else {
            return Vec::new();
        };
        let tree = self.editor.tree();
        scope::references(tree, binding)
            .into_iter()
            .filter(|r| self.node_for_binding(flow, binding, *r) == Some(node))
            .collect()
    }

    /// Calls of a method of this class with no target or a `this` target
    pub(crate) fn local_calls(&self, method: &str) -> Vec<SyntaxId> {
        let tree = self.editor.tree();
        let Some(class) = tree.class() else {
            return Vec::new();
        };
        tree.descendants(class)
            .into_iter()
            .filter(|id| {
                tree.invocation(*id)
                    .map(|inv| {
                        inv.name == method
                            && inv.args.is_empty()
                            && inv
                                .target
                                .map(|t| matches!(tree.kind(t), SyntaxKind::This))
                                .unwrap_or(true)
                    })
                    .unwrap_or(false)
            })
            .collect()
    }

    /// Expressions that evaluate to an exposed child
    fn exposed_occurrences(&self, flow: &ExecutionFlow, node: NodeId) -> Vec<SyntaxId> {
        let tree = self.editor.tree();
        let Some(class) = tree.class() else {
            return Vec::new();
        };
        tree.descendants(class)
            .into_iter()
            .filter(|id| {
                matches!(tree.kind(*id), SyntaxKind::Invoke { .. } | SyntaxKind::FieldAccess | SyntaxKind::Name(_))
                    && self.creation_owner(*id).is_none()
                    && self.node_for_expression(flow, *id) == Some(node)
            })
            .collect()
    }

    /// Related set derived from the node's current strategies
    pub(crate) fn compute_related(&self, flow: &ExecutionFlow, node: NodeId) -> BTreeSet<SyntaxId> {
        let mut related = BTreeSet::new();
        let Some(entry) = self.nodes.get(node) else {
            return related;
        };
        let tree = self.editor.tree();

        match &entry.creation {
            CreationStrategy::Exposed { .. } => related.extend(self.exposed_occurrences(flow, node)),
            CreationStrategy::MethodParameter { parameter } => {
                related.insert(*parameter);
            }
            creation => related.extend(creation.expression()),
        }

        if let Some(binding) = entry.handle.binding() {
            related.insert(binding.declaration());
            related.extend(entry.handle.assignment());
            related.extend(self.variable_references(flow, node));
        }
        if let HandleStrategy::Lazy { accessor, .. } = &entry.handle {
            related.insert(*accessor);
            if let Some(name) = tree.name_of(*accessor) {
                related.extend(self.local_calls(name));
            }
        }
        related.extend(entry.association.invocation());
        related.retain(|id| tree.is_live(*id));
        related
    }

    pub(crate) fn sync_related(&mut self) {
        let flow = self.flow();
        let computed: Vec<(NodeId, BTreeSet<SyntaxId>)> = self
            .nodes
            .ids()
            .into_iter()
            .map(|id| (id, self.compute_related(&flow, id)))
            .collect();
        for (id, related) in computed {
            if let Some(node) = self.nodes.get_mut(id) {
                node.related = related;
            }
        }
    }

    /// Syntax ids related to a node, as of the last completed edit
    pub fn related(&self, node: NodeId) -> Option<&BTreeSet<SyntaxId>> {
        self.nodes.get(node).map(|n| &n.related)
    }

    /// Describe every node whose stored related set is stale
    pub fn check_references(&self) -> Vec<String> {
        let flow = self.flow();
        let tree = self.editor.tree();
        let mut problems = Vec::new();
        for id in self.nodes.ids() {
            let Some(node) = self.nodes.get(id) else {
                continue;
            };
            for stale in node.related.iter().filter(|s| !tree.is_live(**s)) {
                problems.push(format!("{} refers to removed syntax {}", id, stale));
            }
            let expected = self.compute_related(&flow, id);
            if expected != node.related {
                problems.push(format!(
                    "{} related {:?} but source shows {:?}",
                    id, node.related, expected
                ));
            }
        }
        problems
    }

    /// Block-level statements related to a node, in execution order
    pub(crate) fn related_statements(&self, flow: &ExecutionFlow, node: NodeId) -> Vec<SyntaxId> {
        let tree = self.editor.tree();
        let mut statements: Vec<SyntaxId> = self
            .compute_related(flow, node)
            .into_iter()
            .filter_map(|id| tree.enclosing_statement(id))
            .filter(|s| flow.contains(*s))
            .collect();
        statements.sort_by_key(|s| flow.position(*s));
        statements.dedup();
        statements
    }
}
