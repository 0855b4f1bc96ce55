//! Local variable handles: conversion to a field, inlining, splitting a
//! shared local

use tracing::debug;

use crate::editor::{Graft, StatementTarget};
use crate::error::DesignError;
use crate::model::{DesignEvent, NodeId};
use crate::naming::allocate;
use crate::syntax::scope::{self, Binding};
use crate::syntax::{SyntaxId, SyntaxKind};
use crate::Session;

use super::{swap_prefix, HandleStrategy};

impl Session {
    /// Turn the object's local variable (or inline creation) into a field
    pub fn convert_local_to_field(&mut self, node: NodeId) -> Result<(), DesignError> {
        self.edit(|s| s.convert_local_to_field_in(node))
    }

    /// Replace a single-use local by its initializer
    pub fn convert_local_to_inline(&mut self, node: NodeId) -> Result<(), DesignError> {
        self.edit(|s| s.convert_local_to_inline_in(node))
    }

    pub(crate) fn convert_local_to_field_in(&mut self, node: NodeId) -> Result<(), DesignError> {
        match self.nodes.node(node)?.handle.clone() {
            HandleStrategy::Empty => self.materialize_in(node, true, None),
            HandleStrategy::LocalUnique { declaration } => self.local_unique_to_field(node, declaration),
            HandleStrategy::LocalReuse { .. } => self.split_local_reuse(node),
            other => Err(DesignError::unsupported("convert_local_to_field", other.kind())),
        }
    }

    /// Rename every `Name` and `this.x` reference in the list
    pub(crate) fn rename_references(&mut self, references: &[SyntaxId], name: &str) -> Result<(), DesignError> {
        for reference in references {
            let tree = self.editor.tree();
            if !tree.is_live(*reference) {
                continue;
            }
            let target = match tree.kind(*reference) {
                SyntaxKind::FieldAccess => tree.name_ident(*reference),
                SyntaxKind::Name(_) => Some(*reference),
                _ => None,
            };
            if let Some(target) = target {
                self.editor.replace_name(target, name)?;
            }
        }
        Ok(())
    }

    fn declared_type_of(&self, declaration: SyntaxId) -> String {
        self.editor
            .tree()
            .declared_type(declaration)
            .map(|t| t.to_string())
            .unwrap_or_default()
    }

    fn local_unique_to_field(&mut self, node: NodeId, declaration: SyntaxId) -> Result<(), DesignError> {
        let tree = self.editor.tree();
        let init = tree
            .initializer(declaration)
            .ok_or_else(|| DesignError::unsupported("convert_local_to_field", "local without initializer"))?;
        let old = self.declared_name(declaration);
        let ty = self.declared_type_of(declaration);
        let references = scope::references(tree, Binding::Local(declaration));
        let naming = &self.config.naming;
        let base = swap_prefix(&old, &naming.local_prefix, &naming.field_prefix);
        let name = allocate(&base, &scope::field_scope_without(tree, &[declaration]));

        self.publish(DesignEvent::BeforeConvert { node, to: "field" })?;
        let prefix = format!("{} = ", name);
        let code = format!("{}{};", prefix, self.editor.source_of(init));
        self.editor
            .replace_statement(declaration, &code, &[Graft::new(prefix.len(), init)])?;
        self.rename_references(&references, &name)?;
        let field = self
            .editor
            .add_field(&format!("{};", self.field_head(&ty, &name)), &[])?;
        debug!(%node, from = %old, to = %name, "local converted to field");
        self.nodes.node_mut(node)?.handle = HandleStrategy::FieldUnique {
            field,
            assignment: declaration,
        };
        Ok(())
    }

    /// Give one object of a shared local its own field; the other objects
    /// keep the local
    pub(crate) fn split_local_reuse(&mut self, node: NodeId) -> Result<(), DesignError> {
        let HandleStrategy::LocalReuse {
            declaration,
            assignment,
        } = self.nodes.node(node)?.handle.clone()
        else {
            return Err(DesignError::unsupported(
                "split_local_reuse",
                self.nodes.node(node)?.handle.kind(),
            ));
        };
        let flow = self.flow();
        let references = self.variable_references(&flow, node);
        let old = self.declared_name(declaration);
        let ty = self.declared_type_of(declaration);
        let naming = &self.config.naming;
        let base = swap_prefix(&old, &naming.local_prefix, &naming.field_prefix);
        let name = allocate(&base, &scope::field_scope(self.editor.tree()));

        self.publish(DesignEvent::BeforeConvert { node, to: "field" })?;
        let assignment = if assignment == declaration {
            let init = self
                .editor
                .tree()
                .initializer(declaration)
                .ok_or_else(|| DesignError::stale(declaration))?;
            let init_source = self.editor.source_of(init).to_string();
            self.editor.remove_initializer(declaration)?;
            let prefix = format!("{} = ", name);
            self.editor.insert_statement(
                StatementTarget::After(declaration),
                &format!("{}{};", prefix, init_source),
                &[Graft::new(prefix.len(), init)],
            )?
        } else {
            assignment
        };
        self.rename_references(&references, &name)?;
        let field = self
            .editor
            .add_field(&format!("{};", self.field_head(&ty, &name)), &[])?;
        debug!(%node, shared = %old, field = %name, "shared local split");
        self.nodes.node_mut(node)?.handle = HandleStrategy::FieldUnique { field, assignment };
        Ok(())
    }

    fn convert_local_to_inline_in(&mut self, node: NodeId) -> Result<(), DesignError> {
        let handle = self.nodes.node(node)?.handle.clone();
        let HandleStrategy::LocalUnique { declaration } = handle else {
            return Err(DesignError::unsupported("convert_local_to_inline", handle.kind()));
        };
        let tree = self.editor.tree();
        let references = scope::references(tree, Binding::Local(declaration));
        let [reference] = references.as_slice() else {
            return Err(DesignError::unsupported(
                "convert_local_to_inline",
                format!("local used {} times", references.len()),
            ));
        };
        let reference = *reference;
        let init = tree
            .initializer(declaration)
            .ok_or_else(|| DesignError::unsupported("convert_local_to_inline", "local without initializer"))?;
        let init_source = self.editor.source_of(init).to_string();

        self.publish(DesignEvent::BeforeConvert { node, to: "inline" })?;
        self.editor.remove_statement(declaration)?;
        self.editor
            .replace_expression(reference, &init_source, &[Graft::new(0, init)])?;
        debug!(%node, "local inlined");
        self.nodes.node_mut(node)?.handle = HandleStrategy::Empty;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::descriptor::Catalog;
    use crate::{DesignerConfig, Session};

    const SOURCE: &str = "class Panel extends JPanel {\n\tpublic Panel() {\n\t\tJButton button = new JButton();\n\t\tadd(button);\n\t}\n}";

    fn open(source: &str, config: DesignerConfig) -> Session {
        let catalog = Catalog::builtin().expect("catalog");
        Session::open(source, catalog, config).expect("Should open")
    }

    #[test]
    fn test_local_to_field() {
        let mut session = open(SOURCE, DesignerConfig::default());
        let button = session.find_by_name("button").expect("button");
        session.convert_local_to_field(button).expect("convert");
        assert_eq!(
            session.text(),
            "class Panel extends JPanel {\n\tprivate JButton button;\n\n\tpublic Panel() {\n\t\tbutton = new JButton();\n\t\tadd(button);\n\t}\n}"
        );
        assert!(session.check_references().is_empty());
    }

    #[test]
    fn test_local_to_field_swaps_prefix() {
        let source = SOURCE.replace("button", "l_button");
        let config = DesignerConfig::default().with_prefixes("l_", "m_");
        let mut session = open(&source, config);
        let button = session.find_by_name("l_button").expect("button");
        session.convert_local_to_field(button).expect("convert");
        assert_eq!(session.name_of(button).as_deref(), Some("m_button"));
        assert!(session.text().contains("\t\tadd(m_button);"));
    }

    #[test]
    fn test_local_to_inline() {
        let mut session = open(SOURCE, DesignerConfig::default());
        let button = session.find_by_name("button").expect("button");
        session.convert_local_to_inline(button).expect("inline");
        assert_eq!(
            session.text(),
            "class Panel extends JPanel {\n\tpublic Panel() {\n\t\tadd(new JButton());\n\t}\n}"
        );
        assert_eq!(session.node(button).expect("node").handle.kind(), "empty");
    }

    #[test]
    fn test_inline_needs_single_use() {
        let source = "class Panel extends JPanel {\n\tpublic Panel() {\n\t\tJButton button = new JButton();\n\t\tadd(button);\n\t\tbutton.setText(\"x\");\n\t}\n}";
        let mut session = open(source, DesignerConfig::default());
        let button = session.find_by_name("button").expect("button");
        assert!(session.convert_local_to_inline(button).is_err());
        assert_eq!(session.text(), source);
    }
}
