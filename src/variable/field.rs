//! Field handles: conversion back to a local, splitting a shared field

use tracing::debug;

use crate::editor::{Graft, StatementTarget};
use crate::error::DesignError;
use crate::model::{DesignEvent, NodeId};
use crate::naming::allocate;
use crate::resolver::covers;
use crate::syntax::scope::{self, Binding};
use crate::syntax::SyntaxKind;
use crate::Session;

use super::{swap_prefix, HandleStrategy};

impl Session {
    /// Turn the object's field into a local declared at its assignment
    ///
    /// Every use of the field must follow the assignment in the same block.
    pub fn convert_field_to_local(&mut self, node: NodeId) -> Result<(), DesignError> {
        self.edit(|s| s.convert_field_to_local_in(node))
    }

    fn convert_field_to_local_in(&mut self, node: NodeId) -> Result<(), DesignError> {
        let handle = self.nodes.node(node)?.handle.clone();
        let HandleStrategy::FieldUnique { field, assignment } = handle else {
            return Err(DesignError::unsupported("convert_field_to_local", handle.kind()));
        };
        let tree = self.editor.tree();
        let block = tree
            .parent(assignment)
            .filter(|b| matches!(tree.kind(*b), SyntaxKind::Block))
            .ok_or_else(|| DesignError::unsupported("convert_field_to_local", "assignment outside a block"))?;
        let index = tree.index_in_parent(assignment).unwrap_or(0);
        let references: Vec<_> = scope::references(tree, Binding::Field(field))
            .into_iter()
            .filter(|r| !tree.is_within(*r, assignment))
            .collect();
        let confined = references.iter().all(|r| {
            tree.enclosing_statement(*r)
                .map(|s| covers(tree, StatementTarget::Before(s), block, index + 1))
                .unwrap_or(false)
        });
        if !confined {
            return Err(DesignError::unsupported(
                "convert_field_to_local",
                "field used outside its assigning block",
            ));
        }

        let old = self.declared_name(field);
        let ty = tree.declared_type(field).map(|t| t.to_string()).unwrap_or_default();
        let value = *tree
            .children(assignment)
            .get(1)
            .ok_or_else(|| DesignError::stale(assignment))?;
        let mut names = scope::local_scope(tree, block, index);
        let shadowing = names.shadowed().contains(&old);
        names.release(&old);
        if shadowing {
            names.add_shadowed(old.clone());
        }
        let naming = &self.config.naming;
        let name = allocate(&swap_prefix(&old, &naming.field_prefix, &naming.local_prefix), &names);

        self.publish(DesignEvent::BeforeConvert { node, to: "local" })?;
        for reference in &references {
            if matches!(self.editor.tree().kind(*reference), SyntaxKind::FieldAccess) {
                self.editor.replace_expression(*reference, &name, &[])?;
            } else if name != old {
                self.editor.replace_name(*reference, &name)?;
            }
        }
        let prefix = format!("{} {} = ", ty, name);
        let code = format!("{}{};", prefix, self.editor.source_of(value));
        self.editor
            .replace_statement(assignment, &code, &[Graft::new(prefix.len(), value)])?;
        self.editor.remove_member(field)?;
        debug!(%node, from = %old, to = %name, "field converted to local");
        self.nodes.node_mut(node)?.handle = HandleStrategy::LocalUnique {
            declaration: assignment,
        };
        Ok(())
    }

    /// Give one object of a shared field a field of its own
    pub(crate) fn split_field_reuse(&mut self, node: NodeId) -> Result<(), DesignError> {
        let handle = self.nodes.node(node)?.handle.clone();
        let HandleStrategy::FieldReuse { field, assignment } = handle else {
            return Err(DesignError::unsupported("split_field_reuse", handle.kind()));
        };
        let flow = self.flow();
        let references = self.variable_references(&flow, node);
        let tree = self.editor.tree();
        let old = self.declared_name(field);
        let ty = tree.declared_type(field).map(|t| t.to_string()).unwrap_or_default();
        let name = allocate(&old, &scope::field_scope(tree));

        self.publish(DesignEvent::BeforeConvert { node, to: "field" })?;
        let handle = if assignment == field {
            let init = self
                .editor
                .tree()
                .initializer(field)
                .ok_or_else(|| DesignError::stale(field))?;
            let init_source = self.editor.source_of(init).to_string();
            self.editor.remove_initializer(field)?;
            let prefix = format!("{} = ", self.field_head(&ty, &name));
            let own = self.editor.add_field(
                &format!("{}{};", prefix, init_source),
                &[Graft::new(prefix.len(), init)],
            )?;
            self.rename_references(&references, &name)?;
            HandleStrategy::FieldInitializer { field: own }
        } else {
            let own = self
                .editor
                .add_field(&format!("{};", self.field_head(&ty, &name)), &[])?;
            self.rename_references(&references, &name)?;
            HandleStrategy::FieldUnique {
                field: own,
                assignment,
            }
        };
        debug!(%node, shared = %old, field = %name, "shared field split");
        self.nodes.node_mut(node)?.handle = handle;
        Ok(())
    }
}
