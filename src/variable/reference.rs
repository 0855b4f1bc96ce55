//! Reference expressions: how a statement inserted at some target names an
//! object, converting the handle when its current form cannot reach there

use tracing::debug;

use crate::editor::StatementTarget;
use crate::error::{codes, DesignError};
use crate::model::NodeId;
use crate::resolver::covers;
use crate::syntax::scope::{self, Binding, Point};
use crate::syntax::{ExecutionFlow, SyntaxId};
use crate::Session;

use super::HandleStrategy;

impl Session {
    /// Source expression denoting `node` in a statement inserted at `target`
    ///
    /// May rewrite the source first: an inline creation gets a variable, a
    /// local that is out of scope becomes a field, a shared variable is split.
    pub fn reference_expression(&mut self, node: NodeId, target: StatementTarget) -> Result<String, DesignError> {
        self.edit(|s| s.reference_at(node, target))
    }

    pub(crate) fn reference_at(&mut self, node: NodeId, target: StatementTarget) -> Result<String, DesignError> {
        let handle = self.nodes.node(node)?.handle.clone();
        let tree = self.editor.tree();
        let point = target
            .location(tree)
            .ok_or_else(|| DesignError::invalid_target(format!("{} is not inside a block", target)))?;

        match handle {
            HandleStrategy::Empty => {
                let (outer, _) = self.creation_site(node)?;
                let tree = self.editor.tree();
                let reachable = tree
                    .enclosing_statement(outer)
                    .and_then(|s| Some((tree.parent(s)?, tree.index_in_parent(s)?)))
                    .map(|(block, index)| covers(tree, target, block, index))
                    .unwrap_or(false);
                self.materialize_in(node, !reachable, None)?;
                self.reference_at(node, target)
            }
            HandleStrategy::LocalUnique { declaration } => {
                if scope::declaration_visible_at(tree, declaration, point) {
                    Ok(self.declared_name(declaration))
                } else {
                    debug!(%node, %target, "local out of reach, converting to field");
                    self.convert_local_to_field_in(node)?;
                    self.reference_at(node, target)
                }
            }
            HandleStrategy::LocalReuse {
                declaration,
                assignment,
            } => {
                if scope::declaration_visible_at(tree, declaration, point)
                    && self.assignment_reaches(Binding::Local(declaration), assignment, target)
                {
                    Ok(self.declared_name(declaration))
                } else {
                    self.split_local_reuse(node)?;
                    self.reference_at(node, target)
                }
            }
            HandleStrategy::FieldUnique { field, .. } | HandleStrategy::FieldInitializer { field } => {
                Ok(self.field_reference(field, point))
            }
            HandleStrategy::FieldReuse { field, assignment } => {
                if self.assignment_reaches(Binding::Field(field), assignment, target) {
                    Ok(self.field_reference(field, point))
                } else {
                    self.split_field_reuse(node)?;
                    self.reference_at(node, target)
                }
            }
            HandleStrategy::Lazy { field, accessor } => {
                if tree.is_within(point.0, accessor) {
                    Ok(self.field_reference(field, point))
                } else {
                    Ok(format!("{}()", self.declared_name(accessor)))
                }
            }
            HandleStrategy::ExposedProperty { host, getter } => {
                self.qualified(host, target, &format!("{}()", getter))
            }
            HandleStrategy::ExposedField { host, field } => self.qualified(host, target, &field),
            HandleStrategy::MethodParameter { parameter } => {
                let method = tree.parent(parameter);
                if method.is_some() && tree.enclosing_method(point.0) == method {
                    Ok(self.declared_name(parameter))
                } else {
                    Err(DesignError::binding(
                        codes::UNREACHABLE,
                        format!(
                            "parameter '{}' is not visible at {}",
                            self.declared_name(parameter),
                            target
                        ),
                    ))
                }
            }
            HandleStrategy::This => Ok("this".to_string()),
            HandleStrategy::Void => Err(DesignError::unsupported("reference_expression", "void")),
        }
    }

    pub(crate) fn declared_name(&self, declaration: SyntaxId) -> String {
        self.editor
            .tree()
            .name_of(declaration)
            .unwrap_or_default()
            .to_string()
    }

    /// `name` where the field is not shadowed at `point`, else `this.name`
    pub(crate) fn field_reference(&self, field: SyntaxId, point: Point) -> String {
        let name = self.declared_name(field);
        if scope::resolve_at(self.editor.tree(), point, &name) == Some(Binding::Field(field)) {
            name
        } else {
            format!("this.{}", name)
        }
    }

    /// `member` on the host, unqualified when the host is the designed class
    fn qualified(&mut self, host: NodeId, target: StatementTarget, member: &str) -> Result<String, DesignError> {
        if host == self.root() {
            return Ok(member.to_string());
        }
        let host = self.reference_at(host, target)?;
        if host == "this" {
            Ok(member.to_string())
        } else {
            Ok(format!("{}.{}", host, member))
        }
    }

    /// Ordering key of an insertion point: `2p` before statement `p`, `2p + 1`
    /// after it (after everything nested in it)
    fn target_key(&self, flow: &ExecutionFlow, target: StatementTarget) -> Option<isize> {
        let tree = self.editor.tree();
        let (statement, after) = match target {
            StatementTarget::Before(s) => (s, false),
            StatementTarget::After(s) => (s, true),
            StatementTarget::BlockStart(b) => (*tree.children(b).first()?, false),
            StatementTarget::BlockEnd(b) => (*tree.children(b).last()?, true),
        };
        if !after {
            return flow.position(statement).map(|p| 2 * p as isize);
        }
        tree.descendants(statement)
            .into_iter()
            .filter_map(|d| flow.position(d))
            .max()
            .map(|p| 2 * p as isize + 1)
    }

    /// True if code at `target` runs after `assignment` stores into the shared
    /// variable and before the next assignment does
    fn assignment_reaches(&self, binding: Binding, assignment: SyntaxId, target: StatementTarget) -> bool {
        let flow = self.flow();
        let Some(own) = self.flow_position(&flow, assignment) else {
            return false;
        };
        let Some(at) = self.target_key(&flow, target) else {
            return false;
        };
        let next = scope::assignments(self.editor.tree(), binding)
            .into_iter()
            .filter_map(|a| self.flow_position(&flow, a))
            .filter(|p| *p > own)
            .min();
        let reached = 2 * own + 1 <= at && next.map(|n| at <= 2 * n).unwrap_or(true);
        if !reached {
            debug!(%target, "shared variable holds another object there");
        }
        reached
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::descriptor::Catalog;
    use crate::editor::StatementTarget;
    use crate::{DesignerConfig, Session};

    fn open(source: &str) -> Session {
        let catalog = Catalog::builtin().expect("catalog");
        Session::open(source, catalog, DesignerConfig::default()).expect("Should open")
    }

    fn body(session: &Session, method: usize) -> crate::syntax::SyntaxId {
        let tree = session.tree();
        tree.method_body(tree.methods()[method]).expect("body")
    }

    #[test]
    fn test_local_reference_converts_out_of_scope() {
        let mut session = open(
            "class Panel extends JPanel {\n\tpublic Panel() {\n\t\tJButton button = new JButton();\n\t\tadd(button);\n\t\tinit();\n\t}\n\n\tprivate void init() {\n\t}\n}",
        );
        let button = session.find_by_name("button").expect("button");
        let inside = StatementTarget::BlockEnd(body(&session, 0));
        assert_eq!(session.reference_expression(button, inside).expect("ref"), "button");
        assert_eq!(session.node(button).expect("node").handle.kind(), "local");

        let init = StatementTarget::BlockStart(body(&session, 1));
        assert_eq!(session.reference_expression(button, init).expect("ref"), "button");
        assert_eq!(
            session.text(),
            "class Panel extends JPanel {\n\tprivate JButton button;\n\n\tpublic Panel() {\n\t\tbutton = new JButton();\n\t\tadd(button);\n\t\tinit();\n\t}\n\n\tprivate void init() {\n\t}\n}"
        );
        assert_eq!(session.node(button).expect("node").handle.kind(), "field");
    }

    #[test]
    fn test_reference_is_stable_once_reachable() {
        let mut session = open(
            "class Panel extends JPanel {\n\tpublic Panel() {\n\t\tJButton button = new JButton();\n\t\tadd(button);\n\t}\n}",
        );
        let button = session.find_by_name("button").expect("button");
        let end = StatementTarget::BlockEnd(body(&session, 0));
        let first = session.reference_expression(button, end).expect("ref");
        let text = session.text().to_string();
        let second = session.reference_expression(button, end).expect("ref");
        assert_eq!(first, second);
        assert_eq!(session.text(), text);
    }

    #[test]
    fn test_shadowed_field_is_qualified() {
        let mut session = open(
            "class Panel extends JPanel {\n\tprivate JButton button = new JButton();\n\n\tpublic Panel() {\n\t\tadd(button);\n\t\tJLabel button = new JLabel();\n\t\tadd(button);\n\t}\n}",
        );
        let field_button = session.children(session.root())[0];
        let end = StatementTarget::BlockEnd(body(&session, 0));
        assert_eq!(
            session.reference_expression(field_button, end).expect("ref"),
            "this.button"
        );
    }

    #[test]
    fn test_shared_local_is_split_outside_its_range() {
        let mut session = open(
            "class Panel extends JPanel {\n\tpublic Panel() {\n\t\tJButton button = new JButton();\n\t\tadd(button);\n\t\tbutton = new JButton();\n\t\tadd(button);\n\t}\n}",
        );
        let first = session.children(session.root())[0];
        assert_eq!(session.node(first).expect("node").handle.kind(), "local-reuse");
        let end = StatementTarget::BlockEnd(body(&session, 0));
        let name = session.reference_expression(first, end).expect("ref");
        assert_eq!(name, "button_1");
        assert_eq!(
            session.text(),
            "class Panel extends JPanel {\n\tprivate JButton button_1;\n\n\tpublic Panel() {\n\t\tJButton button;\n\t\tbutton_1 = new JButton();\n\t\tadd(button_1);\n\t\tbutton = new JButton();\n\t\tadd(button);\n\t}\n}"
        );
        assert_eq!(session.node(first).expect("node").handle.kind(), "field");
        assert!(session.check_references().is_empty());
    }
}
