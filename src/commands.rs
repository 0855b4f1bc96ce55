//! Structural edit commands: CREATE, MOVE (ADD when the parent changes) and
//! DELETE
//!
//! Each command checks capabilities before touching anything, announces
//! itself on the event bus (a veto aborts it), then edits source and model
//! inside one edit transaction.

use tracing::debug;

use crate::config::NewVariable;
use crate::descriptor::CONSTRUCTOR_ASSOCIATION;
use crate::editor::{Graft, StatementTarget};
use crate::error::DesignError;
use crate::model::{Association, AssociationTemplate, Bindings, CreationStrategy, DesignEvent, Node, NodeId};
use crate::naming::{allocate, short_class};
use crate::resolver::top_most;
use crate::session::Session;
use crate::syntax::scope::{self, Binding};
use crate::syntax::{SyntaxId, SyntaxKind};
use crate::variable::HandleStrategy;

impl Session {
    /// Create a `class` component under `parent`, before `anchor` or last
    pub fn create(&mut self, class: &str, parent: NodeId, anchor: Option<NodeId>) -> Result<NodeId, DesignError> {
        self.edit(|s| s.create_in(class, parent, anchor))
    }

    /// Move `node` before `anchor` (or last) under `parent`; with a new parent
    /// this is ADD
    pub fn move_node(&mut self, node: NodeId, parent: NodeId, anchor: Option<NodeId>) -> Result<(), DesignError> {
        self.edit(|s| s.move_in(node, parent, anchor))
    }

    /// Delete `node`, its children and every statement about them
    pub fn delete(&mut self, node: NodeId) -> Result<(), DesignError> {
        self.edit(|s| s.delete_in(node))
    }

    /// Attach the live expression `child` to `parent` through the parent's
    /// association template, referencing the parent as seen from `target`
    ///
    /// Returns the attaching invocation. Re-attaching at the same site is a
    /// no-op: a statement already matching the template's method, arity and
    /// child position is kept as is.
    pub fn attach(&mut self, child: SyntaxId, parent: NodeId, target: StatementTarget) -> Result<SyntaxId, DesignError> {
        self.edit(|s| s.attach_in(child, parent, target))
    }

    fn check_anchor(&self, parent: NodeId, anchor: Option<NodeId>) -> Result<(), DesignError> {
        match anchor {
            Some(anchor) if self.nodes.parent(anchor) != Some(parent) => Err(DesignError::invalid_target(
                format!("{} is not a child of {}", anchor, parent),
            )),
            _ => Ok(()),
        }
    }

    fn check_container(&self, parent: NodeId) -> Result<String, DesignError> {
        let class = self.nodes.node(parent)?.class.clone();
        if self.catalog.is_container(&class) {
            Ok(class)
        } else {
            Err(DesignError::NotContainer(short_class(&class).to_string()))
        }
    }

    fn create_in(&mut self, class: &str, parent: NodeId, anchor: Option<NodeId>) -> Result<NodeId, DesignError> {
        let class = self
            .catalog
            .component(class)
            .map(|d| d.class.clone())
            .ok_or_else(|| DesignError::UnknownComponent(class.to_string()))?;
        let parent_class = self.check_container(parent)?;
        self.check_anchor(parent, anchor)?;
        let template = self
            .catalog
            .association_template(&parent_class)
            .map(str::to_string);
        let parameters = self
            .catalog
            .constructors(&class)
            .first()
            .map(|c| c.params.clone())
            .unwrap_or_default();
        let parent_position = parameters.iter().position(|p| p.parent);
        if template.as_deref() == Some(CONSTRUCTOR_ASSOCIATION) && parent_position.is_none() {
            return Err(DesignError::unsupported(
                "create",
                format!("{} has no parent constructor", short_class(&class)),
            ));
        }

        self.publish(DesignEvent::BeforeCreate {
            class: class.clone(),
            parent,
        })?;
        // referencing the parent may rewrite its statements
        let target = self.target_for(&self.flow(), parent, anchor, None)?;
        self.reference_at(parent, target)?;
        let target = self.target_for(&self.flow(), parent, anchor, None)?;
        let parent_ref = self.reference_at(parent, target)?;
        debug!(%class, %parent, %target, "creating component");

        let args: Vec<String> = parameters
            .iter()
            .map(|p| {
                if p.parent {
                    parent_ref.clone()
                } else {
                    self.catalog.default_argument_source(p)
                }
            })
            .collect();
        let creation = CreationStrategy::constructor_source(&class, &Bindings::args(args));
        let stmt = self
            .editor
            .insert_statement(target, &format!("{};", creation), &[])?;
        let expression = self
            .editor
            .tree()
            .children(stmt)
            .first()
            .copied()
            .ok_or_else(|| DesignError::stale(stmt))?;
        let association = match template.as_deref() {
            Some(CONSTRUCTOR_ASSOCIATION) => Association::ConstructorParent {
                position: parent_position.unwrap_or(0),
            },
            Some(source) => {
                let source = source.to_string();
                let invocation = self.attach_in(expression, parent, StatementTarget::Before(stmt))?;
                Association::InvocationArgument {
                    invocation,
                    position: AssociationTemplate::parse(&source)?.child_index(),
                    template: source,
                }
            }
            None => Association::Implicit,
        };
        let node = Node::new(
            class.clone(),
            CreationStrategy::Constructor { expression },
            HandleStrategy::Empty,
        )
        .with_association(association);
        let id = self.nodes.add(node, parent, anchor);
        self.add_exposed(id);

        match self.config.generation.new_variable {
            NewVariable::Empty => {}
            NewVariable::Local => self.materialize_in(id, false, None)?,
            NewVariable::Field => self.materialize_in(id, true, None)?,
        }
        self.publish(DesignEvent::AfterCreate { node: id })?;
        self.publish(DesignEvent::AfterChildAdded { parent, child: id })?;
        self.schedule_refresh();
        debug!(node = %id, "component created");
        Ok(id)
    }

    /// Association of `node` is expressible under a parent of `parent_class`
    fn check_association(&self, node: &Node, parent_class: &str) -> Result<(), DesignError> {
        let template = self.catalog.association_template(parent_class);
        let compatible = match &node.association {
            Association::InvocationArgument { .. } => {
                matches!(template, Some(t) if t != CONSTRUCTOR_ASSOCIATION)
            }
            Association::ConstructorParent { .. } => template == Some(CONSTRUCTOR_ASSOCIATION),
            _ => false,
        };
        if compatible {
            Ok(())
        } else {
            Err(DesignError::unsupported("reparent", node.association.kind()))
        }
    }

    fn move_in(&mut self, node: NodeId, parent: NodeId, anchor: Option<NodeId>) -> Result<(), DesignError> {
        if node == self.root() {
            return Err(DesignError::unsupported("move", "root"));
        }
        let entry = self.nodes.node(node)?.clone();
        self.nodes.node(parent)?;
        if self.nodes.is_within(parent, node) {
            return Err(DesignError::CyclicMove);
        }
        if anchor == Some(node) {
            return Ok(());
        }
        self.check_anchor(parent, anchor)?;
        if !entry.creation.can_reorder() {
            return Err(DesignError::unsupported("move", entry.creation.kind()));
        }
        let reparenting = entry.parent != Some(parent);
        if reparenting {
            if !entry.creation.can_reparent() {
                return Err(DesignError::unsupported("reparent", entry.creation.kind()));
            }
            let parent_class = self.check_container(parent)?;
            self.check_association(&entry, &parent_class)?;
        } else {
            let siblings = self.nodes.children(parent);
            let next = siblings
                .iter()
                .position(|c| *c == node)
                .and_then(|i| siblings.get(i + 1))
                .copied();
            if next == anchor {
                return Ok(());
            }
        }

        self.publish(DesignEvent::BeforeMove { node, parent })?;
        if reparenting {
            let target = self.target_for(&self.flow(), parent, anchor, Some(node))?;
            self.reference_at(parent, target)?;
        }
        self.escalate_escaping_locals(node)?;

        let flow = self.flow();
        let moving = top_most(self.editor.tree(), &self.subtree_statements(&flow, node, None));
        let target = self.target_for(&flow, parent, anchor, Some(node))?;
        debug!(%node, %parent, %target, statements = moving.len(), "moving component");

        let field_uses = self.field_uses(&moving);
        self.rename_conflicting_locals(&moving, target)?;
        let mut at = target;
        for stmt in &moving {
            self.editor.move_statement(*stmt, at)?;
            at = StatementTarget::After(*stmt);
        }
        for (name, field) in field_uses {
            let tree = self.editor.tree();
            if tree.is_live(name) && scope::resolve(tree, name) != Some(Binding::Field(field)) {
                let qualified = format!("this.{}", self.declared_name(field));
                self.editor.replace_expression(name, &qualified, &[])?;
            }
        }

        self.nodes.reparent(node, parent, anchor);
        self.rewrite_association(node, parent)?;
        self.publish(DesignEvent::AfterMove { node })?;
        if reparenting {
            self.publish(DesignEvent::AfterChildAdded { parent, child: node })?;
        }
        self.schedule_refresh();
        Ok(())
    }

    /// Locals declared by the moving statements but used elsewhere become fields
    fn escalate_escaping_locals(&mut self, node: NodeId) -> Result<(), DesignError> {
        let flow = self.flow();
        let moving = top_most(self.editor.tree(), &self.subtree_statements(&flow, node, None));
        let tree = self.editor.tree();
        let inside = |id: SyntaxId| moving.iter().any(|s| tree.is_within(id, *s));
        let escaping: Vec<SyntaxId> = moving
            .iter()
            .flat_map(|s| tree.descendants(*s))
            .filter(|d| matches!(tree.kind(*d), SyntaxKind::LocalDecl { .. }))
            .filter(|d| {
                scope::references(tree, Binding::Local(*d))
                    .into_iter()
                    .any(|r| !inside(r))
            })
            .collect();
        for declaration in escaping {
            let owners = self.holders(Binding::Local(declaration));
            for owner in owners {
                debug!(node = %owner, "local used outside the moved statements");
                self.convert_local_to_field_in(owner)?;
            }
        }
        Ok(())
    }

    /// Names in the statements that currently denote fields
    fn field_uses(&self, statements: &[SyntaxId]) -> Vec<(SyntaxId, SyntaxId)> {
        let tree = self.editor.tree();
        statements
            .iter()
            .flat_map(|s| tree.descendants(*s))
            .filter(|d| matches!(tree.kind(*d), SyntaxKind::Name(_)))
            .filter_map(|d| match scope::resolve(tree, d) {
                Some(Binding::Field(field)) => Some((d, field)),
                _ => None,
            })
            .collect()
    }

    /// Rename locals declared by the moving statements that would clash with
    /// names at the target
    fn rename_conflicting_locals(&mut self, moving: &[SyntaxId], target: StatementTarget) -> Result<(), DesignError> {
        let tree = self.editor.tree();
        let (block, index) = target
            .location(tree)
            .ok_or_else(|| DesignError::invalid_target(format!("{} is not inside a block", target)))?;
        let mut names = scope::local_scope_without(tree, block, index, moving);
        let declarations: Vec<SyntaxId> = moving
            .iter()
            .flat_map(|s| tree.descendants(*s))
            .filter(|d| matches!(tree.kind(*d), SyntaxKind::LocalDecl { .. }))
            .collect();
        for declaration in declarations {
            let old = self.declared_name(declaration);
            let name = allocate(&old, &names);
            names.add_visible(name.clone());
            if name == old {
                continue;
            }
            let tree = self.editor.tree();
            let references = scope::references(tree, Binding::Local(declaration));
            let ident = tree
                .name_ident(declaration)
                .ok_or_else(|| DesignError::stale(declaration))?;
            if let Some(owner) = self.holders(Binding::Local(declaration)).first().copied() {
                self.publish(DesignEvent::BeforeRename {
                    node: owner,
                    old: old.clone(),
                    new: name.clone(),
                })?;
            }
            debug!(from = %old, to = %name, "renaming moved local");
            self.editor.replace_name(ident, &name)?;
            self.rename_references(&references, &name)?;
        }
        Ok(())
    }

    pub(crate) fn attach_in(
        &mut self,
        child: SyntaxId,
        parent: NodeId,
        target: StatementTarget,
    ) -> Result<SyntaxId, DesignError> {
        let parent_class = self.nodes.node(parent)?.class.clone();
        let source = self
            .catalog
            .association_template(&parent_class)
            .filter(|t| *t != CONSTRUCTOR_ASSOCIATION)
            .ok_or_else(|| DesignError::unsupported("attach", short_class(&parent_class).to_string()))?
            .to_string();
        let template = AssociationTemplate::parse(&source)?;
        let parent_ref = self.reference_at(parent, target)?;

        let tree = self.editor.tree();
        let stmt = tree
            .enclosing_statement(child)
            .ok_or_else(|| DesignError::stale(child))?;
        let top = tree.children(stmt).first().copied();
        let attaching = top.filter(|t| {
            tree.invocation(*t)
                .map(|inv| {
                    template.matches(inv.name, inv.args.len()) && inv.args.get(template.child_index()) == Some(&child)
                })
                .unwrap_or(false)
        });
        let standalone = top == Some(child) && matches!(tree.kind(stmt), SyntaxKind::ExprStmt);
        let child_source = self.editor.source_of(child).to_string();
        let (code, offset) = template.render(&parent_ref, &child_source);
        if let Some(invocation) = attaching {
            if self.editor.source_of(stmt) == code {
                return Ok(invocation);
            }
        } else if !standalone {
            return Err(DesignError::unsupported("attach", "association inside an expression"));
        }

        debug!(%child, %parent, "attaching child");
        self.editor
            .replace_statement(stmt, &code, &[Graft::new(offset, child)])?;
        let tree = self.editor.tree();
        tree.children(stmt)
            .first()
            .copied()
            .filter(|c| matches!(tree.kind(*c), SyntaxKind::Invoke { .. }))
            .ok_or_else(|| DesignError::stale(stmt))
    }

    /// Point the child's association at its (possibly new) parent
    fn rewrite_association(&mut self, node: NodeId, parent: NodeId) -> Result<(), DesignError> {
        let entry = self.nodes.node(node)?.clone();
        match entry.association {
            Association::InvocationArgument {
                invocation,
                position,
                ..
            } => {
                let tree = self.editor.tree();
                let stmt = tree
                    .enclosing_statement(invocation)
                    .ok_or_else(|| DesignError::stale(invocation))?;
                let child = *tree
                    .arguments(invocation)
                    .get(position)
                    .ok_or_else(|| DesignError::stale(invocation))?;
                let invocation = self.attach_in(child, parent, StatementTarget::Before(stmt))?;
                let parent_class = self.nodes.node(parent)?.class.clone();
                let template = self
                    .catalog
                    .association_template(&parent_class)
                    .map(str::to_string)
                    .unwrap_or_default();
                let position = AssociationTemplate::parse(&template)?.child_index();
                self.nodes.node_mut(node)?.association = Association::InvocationArgument {
                    invocation,
                    position,
                    template,
                };
            }
            Association::ConstructorParent { position } => {
                let expression = entry
                    .creation
                    .expression()
                    .ok_or_else(|| DesignError::unsupported("move", entry.creation.kind()))?;
                let tree = self.editor.tree();
                let stmt = tree
                    .enclosing_statement(expression)
                    .ok_or_else(|| DesignError::stale(expression))?;
                let argument = *tree
                    .arguments(expression)
                    .get(position)
                    .ok_or_else(|| DesignError::stale(expression))?;
                let parent_ref = self.reference_at(parent, StatementTarget::Before(stmt))?;
                if self.editor.source_of(argument) != parent_ref {
                    self.editor.replace_expression(argument, &parent_ref, &[])?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn delete_in(&mut self, node: NodeId) -> Result<(), DesignError> {
        if node == self.root() {
            return Err(DesignError::unsupported("delete", "root"));
        }
        let creation = &self.nodes.node(node)?.creation;
        if !creation.can_delete() {
            return Err(DesignError::unsupported("delete", creation.kind()));
        }
        self.publish(DesignEvent::BeforeDelete { node })?;
        self.delete_tree(node)?;
        self.schedule_refresh();
        Ok(())
    }

    fn delete_tree(&mut self, node: NodeId) -> Result<(), DesignError> {
        for child in self.nodes.children(node).to_vec() {
            let exposed = matches!(
                self.nodes.get(child).map(|n| &n.creation),
                Some(CreationStrategy::Exposed { .. })
            );
            if exposed {
                for grandchild in self.nodes.children(child).to_vec() {
                    self.delete_tree(grandchild)?;
                }
                self.nodes.remove(child);
            } else {
                self.delete_tree(child)?;
            }
        }

        let flow = self.flow();
        let entry = self.nodes.node(node)?.clone();
        let related = self.compute_related(&flow, node);
        let others: Vec<NodeId> = entry
            .handle
            .binding()
            .map(|b| self.holders(b).into_iter().filter(|h| *h != node).collect())
            .unwrap_or_default();
        let shared = !others.is_empty();
        let tree = self.editor.tree();
        let accessor = match &entry.handle {
            HandleStrategy::Lazy { accessor, .. } => Some(*accessor),
            _ => None,
        };
        let kept_declaration = match &entry.handle {
            HandleStrategy::LocalReuse { declaration, .. } if shared => Some(*declaration),
            _ => None,
        };
        let mut statements: Vec<SyntaxId> = related
            .iter()
            .filter_map(|id| tree.enclosing_statement(*id))
            .filter(|s| accessor.map(|a| !tree.is_within(*s, a)).unwrap_or(true))
            .filter(|s| Some(*s) != kept_declaration)
            .collect();
        statements.sort_by_key(|s| std::cmp::Reverse(tree.span(*s).start));
        statements.dedup();

        for stmt in statements {
            if !self.editor.tree().is_live(stmt) {
                continue;
            }
            if self.creates_other(stmt, node) {
                let uses: Vec<SyntaxId> = related
                    .iter()
                    .copied()
                    .filter(|id| {
                        let tree = self.editor.tree();
                        tree.is_live(*id) && tree.is_within(*id, stmt) && tree.kind(*id).is_expression()
                    })
                    .collect();
                for used in uses {
                    if self.editor.tree().is_live(used) {
                        self.editor.replace_expression(used, "null", &[])?;
                    }
                }
            } else {
                self.editor.remove_statement(stmt)?;
            }
        }

        match &entry.handle {
            HandleStrategy::LocalReuse {
                declaration,
                assignment,
            } if shared && declaration == assignment => {
                self.editor.remove_initializer(*declaration)?;
            }
            HandleStrategy::FieldReuse { field, assignment } if shared && field == assignment => {
                self.editor.remove_initializer(*field)?;
            }
            HandleStrategy::FieldUnique { field, .. }
            | HandleStrategy::FieldInitializer { field }
            | HandleStrategy::FieldReuse { field, .. }
                if !shared =>
            {
                self.editor.remove_member(*field)?;
            }
            HandleStrategy::Lazy { field, accessor } => {
                self.editor.remove_member(*accessor)?;
                if !shared {
                    self.editor.remove_member(*field)?;
                }
            }
            _ => {}
        }
        self.nodes.remove(node);
        if let (HandleStrategy::LocalReuse { declaration, .. }, true) = (&entry.handle, shared) {
            self.fold_reused_local(*declaration)?;
        }
        debug!(%node, "component deleted");
        self.publish(DesignEvent::AfterDelete { node })
    }

    /// A local left with a single holder becomes that holder's own
    /// declaration: `T x; .. x = value;` turns into `T x = value;`
    fn fold_reused_local(&mut self, declaration: SyntaxId) -> Result<(), DesignError> {
        let binding = Binding::Local(declaration);
        let holders = self.holders(binding);
        let [holder] = holders[..] else {
            return Ok(());
        };
        let HandleStrategy::LocalReuse { assignment, .. } = self.nodes.node(holder)?.handle.clone() else {
            return Ok(());
        };
        if assignment == declaration {
            self.nodes.node_mut(holder)?.handle = HandleStrategy::LocalUnique { declaration };
            return Ok(());
        }
        let tree = self.editor.tree();
        let foldable = matches!(tree.kind(assignment), SyntaxKind::Assign)
            && tree.initializer(declaration).is_none()
            && tree.parent(assignment).is_some()
            && tree.parent(assignment) == tree.parent(declaration)
            && scope::references(tree, binding).into_iter().all(|r| {
                tree.is_within(r, assignment) || tree.span(r).start > tree.span(assignment).end
            });
        if !foldable {
            return Ok(());
        }
        let value = *tree
            .children(assignment)
            .get(1)
            .ok_or_else(|| DesignError::stale(assignment))?;
        let ty = tree.declared_type(declaration).map(|t| t.to_string()).unwrap_or_default();
        let prefix = format!("{} {} = ", ty, self.declared_name(declaration));
        let code = format!("{}{};", prefix, self.editor.source_of(value));
        debug!(%holder, "folding assignment into declaration");
        self.editor
            .replace_statement(assignment, &code, &[Graft::new(prefix.len(), value)])?;
        self.editor.remove_statement(declaration)?;
        self.nodes.node_mut(holder)?.handle = HandleStrategy::LocalUnique {
            declaration: assignment,
        };
        Ok(())
    }

    /// The statement also creates a live node other than `node`
    fn creates_other(&self, stmt: SyntaxId, node: NodeId) -> bool {
        self.editor
            .tree()
            .descendants(stmt)
            .into_iter()
            .filter_map(|id| self.creation_owner(id))
            .any(|owner| owner != node)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::descriptor::Catalog;
    use crate::editor::StatementTarget;
    use crate::error::DesignError;
    use crate::{DesignerConfig, Session};

    const PANEL: &str = "class Panel extends JPanel {\n\tpublic Panel() {\n\t\tJButton button = new JButton();\n\t\tadd(button);\n\t}\n}";

    fn open(source: &str) -> Session {
        let catalog = Catalog::builtin().expect("catalog");
        Session::open(source, catalog, DesignerConfig::default()).expect("Should open")
    }

    #[test]
    fn test_create_appends_after_last_child() {
        let mut session = open(PANEL);
        let root = session.root();
        let label = session.create("JLabel", root, None).expect("create");
        assert_eq!(
            session.text(),
            "class Panel extends JPanel {\n\tpublic Panel() {\n\t\tJButton button = new JButton();\n\t\tadd(button);\n\t\tadd(new JLabel());\n\t}\n}"
        );
        assert_eq!(session.children(root).last(), Some(&label));
        assert!(session.check_references().is_empty());
    }

    #[test]
    fn test_create_before_anchor() {
        let mut session = open(PANEL);
        let root = session.root();
        let button = session.find_by_name("button").expect("button");
        let label = session.create("JLabel", root, Some(button)).expect("create");
        assert_eq!(
            session.text(),
            "class Panel extends JPanel {\n\tpublic Panel() {\n\t\tadd(new JLabel());\n\t\tJButton button = new JButton();\n\t\tadd(button);\n\t}\n}"
        );
        assert_eq!(session.children(root), &[label, button]);
    }

    #[test]
    fn test_create_rejects_non_container() {
        let mut session = open(PANEL);
        let button = session.find_by_name("button").expect("button");
        let err = session.create("JLabel", button, None).expect_err("not a container");
        assert!(matches!(err, DesignError::NotContainer(_)));
        let err = session.create("NoSuchWidget", session.root(), None).expect_err("unknown");
        assert!(matches!(err, DesignError::UnknownComponent(_)));
        assert_eq!(session.text(), PANEL);
    }

    #[test]
    fn test_create_with_constructor_parent() {
        let source = "class View extends Composite {\n\tpublic View(Composite parent) {\n\t\tsuper(parent, SWT.NONE);\n\t}\n}";
        let mut session = open(source);
        let root = session.root();
        session.create("Button", root, None).expect("create");
        assert_eq!(
            session.text(),
            "class View extends Composite {\n\tpublic View(Composite parent) {\n\t\tsuper(parent, SWT.NONE);\n\t\tnew Button(this, SWT.NONE);\n\t}\n}"
        );
    }

    #[test]
    fn test_attach_is_idempotent() {
        let mut session = open(PANEL);
        let root = session.root();
        let (stmt, invocation, child) = {
            let tree = session.tree();
            let body = tree.method_body(tree.methods()[0]).expect("body");
            let stmt = tree.children(body)[1];
            let invocation = tree.children(stmt)[0];
            (stmt, invocation, tree.arguments(invocation)[0])
        };
        let attached = session
            .attach(child, root, StatementTarget::Before(stmt))
            .expect("attach");
        assert_eq!(attached, invocation);
        assert_eq!(session.text(), PANEL);
    }

    #[test]
    fn test_delete_removes_statements() {
        let mut session = open(PANEL);
        let button = session.find_by_name("button").expect("button");
        session.delete(button).expect("delete");
        assert_eq!(
            session.text(),
            "class Panel extends JPanel {\n\tpublic Panel() {\n\t}\n}"
        );
        assert!(session.children(session.root()).is_empty());
    }

    #[test]
    fn test_delete_shared_local_folds_declaration() {
        let source = "class Panel extends JPanel {\n\tpublic Panel() {\n\t\tJButton button = new JButton();\n\t\tadd(button);\n\t\tbutton = new JButton();\n\t\tadd(button);\n\t}\n}";
        let mut session = open(source);
        let root = session.root();
        let first = session.children(root)[0];
        let second = session.children(root)[1];
        assert_eq!(session.node(first).expect("node").handle.kind(), "local-reuse");
        session.delete(first).expect("delete");
        assert_eq!(session.text(), PANEL);
        assert_eq!(session.node(second).expect("node").handle.kind(), "local");
        assert!(session.check_references().is_empty());
    }

    #[test]
    fn test_delete_later_holder_keeps_declaration() {
        let source = "class Panel extends JPanel {\n\tpublic Panel() {\n\t\tJButton button = new JButton();\n\t\tadd(button);\n\t\tbutton = new JButton();\n\t\tadd(button);\n\t}\n}";
        let mut session = open(source);
        let root = session.root();
        let first = session.children(root)[0];
        let second = session.children(root)[1];
        session.delete(second).expect("delete");
        assert_eq!(session.text(), PANEL);
        assert_eq!(session.node(first).expect("node").handle.kind(), "local");
    }

    #[test]
    fn test_delete_root_unsupported() {
        let mut session = open(PANEL);
        let root = session.root();
        assert!(matches!(
            session.delete(root),
            Err(DesignError::Unsupported { .. })
        ));
    }

    #[test]
    fn test_move_reorders_siblings() {
        let source = "class Panel extends JPanel {\n\tpublic Panel() {\n\t\tJButton button = new JButton();\n\t\tadd(button);\n\t\tJLabel label = new JLabel();\n\t\tadd(label);\n\t}\n}";
        let mut session = open(source);
        let root = session.root();
        let button = session.find_by_name("button").expect("button");
        let label = session.find_by_name("label").expect("label");
        session.move_node(label, root, Some(button)).expect("move");
        assert_eq!(
            session.text(),
            "class Panel extends JPanel {\n\tpublic Panel() {\n\t\tJLabel label = new JLabel();\n\t\tadd(label);\n\t\tJButton button = new JButton();\n\t\tadd(button);\n\t}\n}"
        );
        assert_eq!(session.children(root), &[label, button]);
        assert!(session.check_references().is_empty());
    }

    #[test]
    fn test_move_reparents_into_panel() {
        let source = "class Panel extends JPanel {\n\tpublic Panel() {\n\t\tJPanel panel = new JPanel();\n\t\tadd(panel);\n\t\tJButton button = new JButton();\n\t\tadd(button);\n\t}\n}";
        let mut session = open(source);
        let panel = session.find_by_name("panel").expect("panel");
        let button = session.find_by_name("button").expect("button");
        session.move_node(button, panel, None).expect("move");
        assert_eq!(
            session.text(),
            "class Panel extends JPanel {\n\tpublic Panel() {\n\t\tJPanel panel = new JPanel();\n\t\tadd(panel);\n\t\tJButton button = new JButton();\n\t\tpanel.add(button);\n\t}\n}"
        );
        assert_eq!(session.parent(button), Some(panel));
        assert!(session.check_references().is_empty());
    }

    #[test]
    fn test_move_into_own_subtree_fails() {
        let source = "class Panel extends JPanel {\n\tpublic Panel() {\n\t\tJPanel panel = new JPanel();\n\t\tadd(panel);\n\t\tJButton button = new JButton();\n\t\tpanel.add(button);\n\t}\n}";
        let mut session = open(source);
        let panel = session.find_by_name("panel").expect("panel");
        let button = session.find_by_name("button").expect("button");
        assert!(matches!(
            session.move_node(panel, button, None),
            Err(DesignError::CyclicMove)
        ));
        assert_eq!(session.text(), source);
    }
}
