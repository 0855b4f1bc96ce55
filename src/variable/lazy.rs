//! Lazy creation: a field filled on first call of an accessor method

use tracing::debug;

use crate::editor::Graft;
use crate::error::DesignError;
use crate::model::{DesignEvent, NodeId};
use crate::naming::{allocate, capitalize, NameScope};
use crate::syntax::scope::{self, Binding};
use crate::syntax::{SyntaxId, SyntaxKind};
use crate::Session;

use super::HandleStrategy;

impl Session {
    /// Move the object's creation and configuration into `getX()`
    ///
    /// ```text
    /// private JButton getButton() {
    ///     if (button == null) {
    ///         button = new JButton();
    ///     }
    ///     return button;
    /// }
    /// ```
    pub fn convert_to_lazy(&mut self, node: NodeId) -> Result<(), DesignError> {
        self.edit(|s| s.convert_to_lazy_in(node))
    }

    /// Free accessor name for a field called `name`
    pub(crate) fn accessor_name(&self, name: &str, released: Option<&str>) -> String {
        let tree = self.editor.tree();
        let root_class = self.nodes.get(self.root()).map(|n| n.class.clone()).unwrap_or_default();
        let mut taken: Vec<String> = tree
            .methods()
            .into_iter()
            .filter_map(|m| tree.name_of(m).map(str::to_string))
            .chain(self.catalog.methods(&root_class).into_iter().map(|m| m.name.clone()))
            .collect();
        if let Some(released) = released {
            taken.retain(|t| t != released);
        }
        let base = format!("{}{}", self.config.generation.accessor_prefix, capitalize(name));
        allocate(&base, &NameScope::new().with_visible(taken))
    }

    /// `field.method(..);` statement using the field only as call target
    fn configures(&self, stmt: SyntaxId, field: SyntaxId) -> bool {
        let tree = self.editor.tree();
        if !matches!(tree.kind(stmt), SyntaxKind::ExprStmt) {
            return false;
        }
        let Some(target) = tree
            .children(stmt)
            .first()
            .and_then(|e| tree.invocation(*e))
            .and_then(|inv| inv.target)
        else {
            return false;
        };
        let uses = scope::references(tree, Binding::Field(field))
            .into_iter()
            .filter(|r| tree.is_within(*r, stmt))
            .count();
        uses == 1 && scope::resolve(tree, target) == Some(Binding::Field(field))
    }

    fn convert_to_lazy_in(&mut self, node: NodeId) -> Result<(), DesignError> {
        match self.nodes.node(node)?.handle.clone() {
            HandleStrategy::Empty => self.materialize_in(node, true, None)?,
            HandleStrategy::LocalUnique { .. } => self.convert_local_to_field_in(node)?,
            HandleStrategy::FieldUnique { .. } => {}
            other => return Err(DesignError::unsupported("convert_to_lazy", other.kind())),
        }
        let HandleStrategy::FieldUnique { field, assignment } = self.nodes.node(node)?.handle.clone() else {
            return Err(DesignError::unsupported("convert_to_lazy", "no field"));
        };
        let tree = self.editor.tree();
        let block = tree
            .parent(assignment)
            .filter(|b| matches!(tree.kind(*b), SyntaxKind::Block))
            .ok_or_else(|| DesignError::unsupported("convert_to_lazy", "assignment outside a block"))?;
        let index = tree.index_in_parent(assignment).unwrap_or(0);
        let own: Vec<SyntaxId> = std::iter::once(assignment)
            .chain(
                tree.children(block)[index + 1..]
                    .iter()
                    .copied()
                    .filter(|s| self.configures(*s, field)),
            )
            .collect();
        let remaining: Vec<SyntaxId> = scope::references(tree, Binding::Field(field))
            .into_iter()
            .filter(|r| !own.iter().any(|s| tree.is_within(*r, *s)))
            .collect();
        let name = self.declared_name(field);
        let ty = tree.declared_type(field).map(|t| t.to_string()).unwrap_or_default();
        let accessor_name = self.accessor_name(&name, None);
        let sources: Vec<String> = own
            .iter()
            .map(|s| self.editor.source_of(*s).to_string())
            .collect();
        let member_indent = tree
            .members()
            .last()
            .map(|m| self.editor.indent_of(*m))
            .unwrap_or_default();

        self.publish(DesignEvent::BeforeConvert { node, to: "lazy" })?;
        let call = format!("{}()", accessor_name);
        for reference in &remaining {
            self.editor.replace_expression(*reference, &call, &[])?;
        }
        for stmt in own.iter().rev() {
            self.editor.remove_statement(*stmt)?;
        }

        let unit = self.editor.indent_unit().to_string();
        let eol = self.editor.eol().to_string();
        let body_indent = format!("{}{}", member_indent, unit);
        let mut code = format!("{}() {{{}", self.field_head(&ty, &accessor_name), eol);
        code.push_str(&format!("{}if ({} == null) {{{}", body_indent, name, eol));
        let mut grafts = Vec::new();
        for (stmt, source) in own.iter().zip(&sources) {
            code.push_str(&body_indent);
            code.push_str(&unit);
            grafts.push(Graft::new(code.len(), *stmt));
            code.push_str(source);
            code.push_str(&eol);
        }
        code.push_str(&format!("{}}}{}", body_indent, eol));
        code.push_str(&format!("{}return {};{}", body_indent, name, eol));
        code.push_str(&format!("{}}}", member_indent));
        let accessor = self.editor.add_method(&code, &grafts)?;
        debug!(%node, accessor = %accessor_name, "converted to lazy creation");
        self.nodes.node_mut(node)?.handle = HandleStrategy::Lazy { field, accessor };
        Ok(())
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

    #[test]
    fn test_local_to_lazy() {
        let mut session = open(
            "class Panel extends JPanel {\n\tpublic Panel() {\n\t\tJButton button = new JButton();\n\t\tbutton.setText(\"OK\");\n\t\tadd(button);\n\t}\n}",
        );
        let button = session.find_by_name("button").expect("button");
        session.convert_to_lazy(button).expect("lazy");
        assert_eq!(
            session.text(),
            "class Panel extends JPanel {\n\tprivate JButton button;\n\n\tpublic Panel() {\n\t\tadd(getButton());\n\t}\n\n\tprivate JButton getButton() {\n\t\tif (button == null) {\n\t\t\tbutton = new JButton();\n\t\t\tbutton.setText(\"OK\");\n\t\t}\n\t\treturn button;\n\t}\n}"
        );
        assert_eq!(session.node(button).expect("node").handle.kind(), "lazy");
        assert!(session.check_references().is_empty());
    }

    #[test]
    fn test_accessor_name_avoids_declared_method() {
        let mut session = open(
            "class Panel extends JPanel {\n\tpublic Panel() {\n\t\tJButton button = new JButton();\n\t\tadd(button);\n\t}\n\n\tprivate String getButton() {\n\t\treturn null;\n\t}\n}",
        );
        let button = session.find_by_name("button").expect("button");
        session.convert_to_lazy(button).expect("lazy");
        let text = session.text();
        assert!(text.contains("\t\tadd(getButton_1());"));
        assert!(text.contains("\tprivate String getButton() {"));
        assert!(text.ends_with("\n\n\tprivate JButton getButton_1() {\n\t\tif (button == null) {\n\t\t\tbutton = new JButton();\n\t\t}\n\t\treturn button;\n\t}\n}"));
    }

    #[test]
    fn test_accessor_name_avoids_inherited_method() {
        let mut catalog = Catalog::builtin().expect("catalog");
        catalog.extend(
            Catalog::from_str(
                "[[component]]\nclass = \"com.example.BasePanel\"\nsuperclass = \"javax.swing.JPanel\"\n[[component.methods]]\nname = \"getButton\"\nreturns = \"javax.swing.JButton\"\n",
            )
            .expect("catalog"),
        );
        let mut session = Session::open(
            "class Panel extends BasePanel {\n\tpublic Panel() {\n\t\tJButton button = new JButton();\n\t\tadd(button);\n\t}\n}",
            catalog,
            DesignerConfig::default(),
        )
        .expect("Should open");
        let button = session.find_by_name("button").expect("button");
        session.convert_to_lazy(button).expect("lazy");
        assert!(session.text().contains("\t\tadd(getButton_1());"));
        assert!(session.text().contains("\tprivate JButton getButton_1() {"));
        assert!(session.check_references().is_empty());
    }

    #[test]
    fn test_lazy_source_is_rediscovered() {
        let mut session = open(
            "class Panel extends JPanel {\n\tpublic Panel() {\n\t\tJButton button = new JButton();\n\t\tadd(button);\n\t}\n}",
        );
        let button = session.find_by_name("button").expect("button");
        session.convert_to_lazy(button).expect("lazy");
        let reopened = open(session.text());
        assert_eq!(reopened.dump(), session.dump());
    }
}
