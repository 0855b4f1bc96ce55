//! Materializing an inline creation into a named variable

use tracing::debug;

use crate::editor::{Graft, StatementTarget};
use crate::error::DesignError;
use crate::model::{DesignEvent, NodeId};
use crate::naming::{allocate, short_class};
use crate::syntax::scope;
use crate::syntax::{SyntaxId, SyntaxKind};
use crate::Session;

use super::HandleStrategy;

impl Session {
    /// Store an inline creation in a new local, or in a field with `as_field`
    pub fn materialize(&mut self, node: NodeId, as_field: bool) -> Result<(), DesignError> {
        self.edit(|s| s.materialize_in(node, as_field, None))
    }

    /// The creation as it sits in the source (casts and parentheses
    /// included) and the part kept as initializer (outer parentheses dropped)
    pub(crate) fn creation_site(&self, node: NodeId) -> Result<(SyntaxId, SyntaxId), DesignError> {
        let entry = self.nodes.node(node)?;
        let expression = entry
            .creation
            .expression()
            .ok_or_else(|| DesignError::unsupported("materialize", entry.creation.kind()))?;
        let tree = self.editor.tree();
        if !tree.is_live(expression) {
            return Err(DesignError::stale(expression));
        }
        let outer = tree.outer_wrapper(expression);
        let mut init = outer;
        while matches!(tree.kind(init), SyntaxKind::Paren) {
            match tree.children(init).first() {
                Some(inner) => init = *inner,
                None => break,
            }
        }
        Ok((outer, init))
    }

    /// Declared type for a variable holding `init`
    fn variable_type(&self, class: &str, init: SyntaxId) -> String {
        match self.editor.tree().kind(init) {
            SyntaxKind::Cast { ty } => ty.to_string(),
            _ => short_class(class).to_string(),
        }
    }

    /// `private Type name`, with the configured field modifier
    pub(crate) fn field_head(&self, ty: &str, name: &str) -> String {
        let modifier = &self.config.generation.field_modifier;
        if modifier.is_empty() {
            format!("{} {}", ty, name)
        } else {
            format!("{} {} {}", modifier, ty, name)
        }
    }

    /// Free local name at `block[index]`, from `requested` or the class default
    pub(crate) fn local_name_for(
        &self,
        class: &str,
        requested: Option<&str>,
        block: SyntaxId,
        index: usize,
        excluded: &[SyntaxId],
    ) -> String {
        let base = match requested {
            Some(name) => name.to_string(),
            None => format!(
                "{}{}",
                self.config.naming.local_prefix,
                self.catalog.default_name(class)
            ),
        };
        allocate(
            &base,
            &scope::local_scope_without(self.editor.tree(), block, index, excluded),
        )
    }

    /// Free field name, from `requested` or the class default
    pub(crate) fn field_name_for(&self, class: &str, requested: Option<&str>, excluded: &[SyntaxId]) -> String {
        let base = match requested {
            Some(name) => name.to_string(),
            None => format!(
                "{}{}",
                self.config.naming.field_prefix,
                self.catalog.default_name(class)
            ),
        };
        allocate(&base, &scope::field_scope_without(self.editor.tree(), excluded))
    }

    pub(crate) fn materialize_in(
        &mut self,
        node: NodeId,
        as_field: bool,
        requested: Option<&str>,
    ) -> Result<(), DesignError> {
        let entry = self.nodes.node(node)?;
        if entry.handle != HandleStrategy::Empty {
            return Err(DesignError::unsupported("materialize", entry.handle.kind()));
        }
        let class = entry.class.clone();
        let (outer, init) = self.creation_site(node)?;
        let tree = self.editor.tree();
        let stmt = tree
            .enclosing_statement(outer)
            .ok_or_else(|| DesignError::unsupported("materialize", "member initializer"))?;
        let block = tree.parent(stmt).ok_or_else(|| DesignError::stale(stmt))?;
        let index = tree.index_in_parent(stmt).unwrap_or(0);
        let standalone =
            tree.parent(outer) == Some(stmt) && matches!(tree.kind(stmt), SyntaxKind::ExprStmt);
        let ty = self.variable_type(&class, init);
        let as_field = as_field || self.catalog.prefers_field(&class);

        self.publish(DesignEvent::BeforeMaterialize { node })?;
        let handle = if as_field {
            let name = self.field_name_for(&class, requested, &[]);
            let field = self
                .editor
                .add_field(&format!("{};", self.field_head(&ty, &name)), &[])?;
            let assignment = self.store_creation(stmt, outer, init, standalone, &name, &format!("{} = ", name))?;
            HandleStrategy::FieldUnique { field, assignment }
        } else {
            let name = self.local_name_for(&class, requested, block, index, &[]);
            let declaration =
                self.store_creation(stmt, outer, init, standalone, &name, &format!("{} {} = ", ty, name))?;
            HandleStrategy::LocalUnique { declaration }
        };
        debug!(%node, handle = handle.kind(), "creation materialized");
        self.nodes.node_mut(node)?.handle = handle;
        Ok(())
    }

    /// Put `prefix init;` in place of a standalone creation statement, or
    /// before the statement using the creation, which then reads `name`
    fn store_creation(
        &mut self,
        stmt: SyntaxId,
        outer: SyntaxId,
        init: SyntaxId,
        standalone: bool,
        name: &str,
        prefix: &str,
    ) -> Result<SyntaxId, DesignError> {
        let code = format!("{}{};", prefix, self.editor.source_of(init));
        let graft = [Graft::new(prefix.len(), init)];
        if standalone {
            self.editor.replace_statement(stmt, &code, &graft)
        } else {
            self.editor.replace_expression(outer, name, &[])?;
            self.editor
                .insert_statement(StatementTarget::Before(stmt), &code, &graft)
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::descriptor::Catalog;
    use crate::{DesignerConfig, Session};

    fn open(source: &str) -> Session {
        let catalog = Catalog::builtin().expect("catalog");
        Session::open(source, catalog, DesignerConfig::default()).expect("Should open")
    }

    fn inline_button(session: &Session) -> crate::NodeId {
        session.children(session.root())[0]
    }

    #[test]
    fn test_materialize_inline_argument() {
        let mut session = open("class A extends JPanel {\n\tpublic A() {\n\t\tadd(new JButton());\n\t}\n}");
        let button = inline_button(&session);
        session.materialize(button, false).expect("materialize");
        assert_eq!(
            session.text(),
            "class A extends JPanel {\n\tpublic A() {\n\t\tJButton button = new JButton();\n\t\tadd(button);\n\t}\n}"
        );
        assert_eq!(session.node(button).expect("node").handle.kind(), "local");
        assert!(session.check_references().is_empty());
    }

    #[test]
    fn test_materialize_keeps_cast_and_drops_parentheses() {
        let mut session = open(
            "class A extends JPanel {\n\tpublic A() {\n\t\tadd(((JComponent) new JButton()));\n\t}\n}",
        );
        let button = inline_button(&session);
        session.materialize(button, false).expect("materialize");
        assert_eq!(
            session.text(),
            "class A extends JPanel {\n\tpublic A() {\n\t\tJComponent button = (JComponent) new JButton();\n\t\tadd(button);\n\t}\n}"
        );
    }

    #[test]
    fn test_materialize_as_field() {
        let mut session = open("class A extends JPanel {\n\tpublic A() {\n\t\tadd(new JButton());\n\t}\n}");
        let button = inline_button(&session);
        session.materialize(button, true).expect("materialize");
        assert_eq!(
            session.text(),
            "class A extends JPanel {\n\tprivate JButton button;\n\n\tpublic A() {\n\t\tbutton = new JButton();\n\t\tadd(button);\n\t}\n}"
        );
        assert_eq!(session.node(button).expect("node").handle.kind(), "field");
    }
}
