//! Building the object model from parsed source
//!
//! Creations are found in two passes over the execution flow. The first
//! creates a node for every constructor call and static factory call of a
//! known component, with the handle implied by where the expression is
//! stored. The second resolves hosts and parents: instance factories and
//! void calls on a host, parent calls matching the host's association
//! template, and constructor-parent arguments. Nodes left without a parent
//! become placeholders under the root.

use tracing::debug;

use crate::descriptor::CONSTRUCTOR_ASSOCIATION;
use crate::error::{codes, DesignError, Diagnostic};
use crate::model::{
    Association, AssociationTemplate, CreationStrategy, ExposedAccessor, FactoryHost, Node, NodeId,
};
use crate::parser::BinaryOp;
use crate::syntax::scope::{self, Binding};
use crate::syntax::{ExecutionFlow, SyntaxId, SyntaxKind, SyntaxTree};
use crate::variable::HandleStrategy;

use super::Session;

/// Expressions owned by `root`, nested statements excluded, children first
fn owned_expressions(tree: &SyntaxTree, root: SyntaxId) -> Vec<SyntaxId> {
    fn collect(tree: &SyntaxTree, id: SyntaxId, out: &mut Vec<SyntaxId>) {
        for child in tree.children(id) {
            if !tree.kind(*child).is_statement() {
                collect(tree, *child, out);
            }
        }
        if tree.kind(id).is_expression() {
            out.push(id);
        }
    }
    let mut out = Vec::new();
    collect(tree, root, &mut out);
    out
}

fn is_null_check(tree: &SyntaxTree, condition: SyntaxId, field: SyntaxId) -> bool {
    if !matches!(tree.kind(condition), SyntaxKind::Binary(BinaryOp::Equal)) {
        return false;
    }
    let operands = tree.children(condition);
    operands
        .iter()
        .any(|o| matches!(tree.kind(*o), SyntaxKind::Literal(l) if l == "null"))
        && operands
            .iter()
            .any(|o| scope::resolve(tree, *o) == Some(Binding::Field(field)))
}

/// Accessor method when `assign` sits in `if (field == null) { .. } return field;`
pub(crate) fn lazy_accessor(tree: &SyntaxTree, assign: SyntaxId, field: SyntaxId) -> Option<SyntaxId> {
    let method = tree.enclosing_method(assign)?;
    if tree.is_constructor(method) || tree.is_static(method) || !tree.params(method).is_empty() {
        return None;
    }
    let body = tree.method_body(method)?;
    let [guard, ret] = tree.children(body) else {
        return None;
    };
    if !matches!(tree.kind(*guard), SyntaxKind::If) || !tree.is_within(assign, *guard) {
        return None;
    }
    let condition = *tree.children(*guard).first()?;
    if !is_null_check(tree, condition, field) || !matches!(tree.kind(*ret), SyntaxKind::Return) {
        return None;
    }
    let value = *tree.children(*ret).first()?;
    (scope::resolve(tree, value) == Some(Binding::Field(field))).then_some(method)
}

/// Handle implied by the place a creation expression is stored
pub(crate) fn handle_for(tree: &SyntaxTree, creation: SyntaxId) -> HandleStrategy {
    let outer = tree.outer_wrapper(creation);
    let Some(parent) = tree.parent(outer) else {
        return HandleStrategy::Empty;
    };
    if tree.children(parent).get(1) != Some(&outer) {
        return HandleStrategy::Empty;
    }
    match tree.kind(parent) {
        SyntaxKind::LocalDecl { .. } => {
            if scope::assignments(tree, Binding::Local(parent)).is_empty() {
                HandleStrategy::LocalUnique {
                    declaration: parent,
                }
            } else {
                HandleStrategy::LocalReuse {
                    declaration: parent,
                    assignment: parent,
                }
            }
        }
        SyntaxKind::Field { .. } => {
            if scope::assignments(tree, Binding::Field(parent)).is_empty() {
                HandleStrategy::FieldInitializer { field: parent }
            } else {
                HandleStrategy::FieldReuse {
                    field: parent,
                    assignment: parent,
                }
            }
        }
        SyntaxKind::Assign => {
            let Some(target) = tree.children(parent).first() else {
                return HandleStrategy::Empty;
            };
            match scope::resolve(tree, *target) {
                Some(Binding::Local(declaration)) => HandleStrategy::LocalReuse {
                    declaration,
                    assignment: parent,
                },
                Some(Binding::Field(field)) => {
                    if let Some(accessor) = lazy_accessor(tree, parent, field) {
                        HandleStrategy::Lazy { field, accessor }
                    } else if tree.initializer(field).is_none()
                        && scope::assignments(tree, Binding::Field(field)).len() == 1
                    {
                        HandleStrategy::FieldUnique {
                            field,
                            assignment: parent,
                        }
                    } else {
                        HandleStrategy::FieldReuse {
                            field,
                            assignment: parent,
                        }
                    }
                }
                _ => HandleStrategy::Empty,
            }
        }
        _ => HandleStrategy::Empty,
    }
}

impl Session {
    pub(crate) fn discover(&mut self) -> Result<(), DesignError> {
        let flow = self.flow();
        self.add_exposed(self.root);
        self.add_parameters(&flow);

        let tree = self.editor.tree();
        let mut sources: Vec<SyntaxId> = tree
            .fields()
            .into_iter()
            .filter_map(|f| tree.initializer(f))
            .collect();
        sources.extend(flow.statements().iter().copied());
        let expressions: Vec<SyntaxId> = sources
            .into_iter()
            .flat_map(|s| owned_expressions(tree, s))
            .collect();

        let mut created = Vec::new();
        for expr in &expressions {
            if let Some(id) = self.discover_creation(*expr) {
                created.push(id);
            }
        }
        for expr in &expressions {
            if let Some(id) = self.discover_host_creation(&flow, *expr) {
                created.push(id);
            }
            self.discover_association(&flow, *expr);
        }

        for id in created {
            if self.nodes.parent(id).is_some() {
                continue;
            }
            let expression = self.nodes.get(id).and_then(|n| n.creation.expression());
            let span = expression
                .map(|e| self.editor.tree().span(e))
                .unwrap_or(0..0);
            let source = expression
                .map(|e| self.editor.source_of(e).to_string())
                .unwrap_or_default();
            self.nodes.attach(id, self.root, None);
            let node = self.nodes.node_mut(id)?;
            node.association = Association::Implicit;
            node.placeholder = true;
            self.add_diagnostic(Diagnostic {
                code: codes::UNATTACHED_CREATION,
                message: format!("'{}' is not attached to any parent", source),
                span,
            });
        }
        debug!(nodes = self.nodes.len(), "discovery finished");
        Ok(())
    }

    fn catalog_class(&self, name: &str) -> Option<String> {
        self.catalog.component(name).map(|d| d.class.clone())
    }

    /// Children every instance of the host's class carries
    pub(crate) fn add_exposed(&mut self, host: NodeId) {
        let Some(class) = self.nodes.get(host).map(|n| n.class.clone()) else {
            return;
        };
        let exposed: Vec<(String, ExposedAccessor)> = self
            .catalog
            .exposed(&class)
            .into_iter()
            .filter_map(|e| {
                let accessor = match (&e.getter, &e.field) {
                    (Some(getter), _) => ExposedAccessor::Getter(getter.clone()),
                    (None, Some(field)) => ExposedAccessor::Field(field.clone()),
                    (None, None) => return None,
                };
                Some((e.class.clone(), accessor))
            })
            .collect();
        for (class, accessor) in exposed {
            let handle = match &accessor {
                ExposedAccessor::Getter(getter) => HandleStrategy::ExposedProperty {
                    host,
                    getter: getter.clone(),
                },
                ExposedAccessor::Field(field) => HandleStrategy::ExposedField {
                    host,
                    field: field.clone(),
                },
            };
            let node = Node::new(class, CreationStrategy::Exposed { host, accessor }, handle)
                .with_association(Association::Implicit);
            self.nodes.add(node, host, None);
        }
    }

    /// Component-typed parameters of the flow roots
    fn add_parameters(&mut self, flow: &ExecutionFlow) {
        let tree = self.editor.tree();
        let parameters: Vec<(SyntaxId, String)> = flow
            .roots()
            .iter()
            .flat_map(|m| tree.params(*m))
            .filter_map(|p| {
                let ty = tree.declared_type(p)?;
                if ty.dimensions > 0 {
                    return None;
                }
                self.catalog_class(&ty.name).map(|class| (p, class))
            })
            .collect();
        for (parameter, class) in parameters {
            let node = Node::new(
                class,
                CreationStrategy::MethodParameter { parameter },
                HandleStrategy::MethodParameter { parameter },
            )
            .with_association(Association::Implicit);
            self.nodes.add(node, self.root, None);
        }
    }

    /// Constructor calls and static factory calls of known components
    fn discover_creation(&mut self, expr: SyntaxId) -> Option<NodeId> {
        let tree = self.editor.tree();
        let (class, creation) = match tree.kind(expr) {
            SyntaxKind::New { ty } => (
                self.catalog_class(&ty.name)?,
                CreationStrategy::Constructor { expression: expr },
            ),
            SyntaxKind::Invoke { .. } => {
                let invocation = tree.invocation(expr)?;
                let target = invocation.target?;
                let SyntaxKind::Name(host) = tree.kind(target) else {
                    return None;
                };
                if scope::resolve(tree, target).is_some() {
                    return None;
                }
                let host_class = self.catalog_class(host)?;
                let factory = self.catalog.factories(&host_class).into_iter().find(|f| {
                    f.is_static && f.method == invocation.name && f.params.len() == invocation.args.len()
                })?;
                (
                    self.catalog_class(&factory.class)
                        .unwrap_or_else(|| factory.class.clone()),
                    CreationStrategy::Factory {
                        host: FactoryHost::Class(host_class),
                        method: invocation.name.to_string(),
                        expression: expr,
                    },
                )
            }
            _ => return None,
        };
        let handle = handle_for(tree, expr);
        let id = self.nodes.add_detached(Node::new(class, creation, handle));
        self.add_exposed(id);
        Some(id)
    }

    /// Host node a call is made on; unqualified calls go to the root
    fn invocation_host(&self, flow: &ExecutionFlow, expr: SyntaxId) -> Option<NodeId> {
        let tree = self.editor.tree();
        let invocation = tree.invocation(expr)?;
        match invocation.target {
            None => Some(self.root),
            Some(t) if matches!(tree.kind(t), SyntaxKind::This) => Some(self.root),
            Some(t) => self.node_for_expression(flow, t),
        }
    }

    /// Instance factory calls and void calls on a host node
    fn discover_host_creation(&mut self, flow: &ExecutionFlow, expr: SyntaxId) -> Option<NodeId> {
        let tree = self.editor.tree();
        let invocation = tree.invocation(expr)?;
        if self.creation_owner(expr).is_some() {
            return None;
        }
        let host = self.invocation_host(flow, expr)?;
        let host_class = self.nodes.get(host)?.class.clone();
        let method = invocation.name.to_string();
        let arity = invocation.args.len();

        let node = if let Some(factory) = self
            .catalog
            .factories(&host_class)
            .into_iter()
            .find(|f| !f.is_static && f.method == method && f.params.len() == arity)
        {
            let class = self
                .catalog_class(&factory.class)
                .unwrap_or_else(|| factory.class.clone());
            Node::new(
                class,
                CreationStrategy::Factory {
                    host: FactoryHost::Node(host),
                    method,
                    expression: expr,
                },
                handle_for(tree, expr),
            )
        } else if let Some(void) = self
            .catalog
            .void_methods(&host_class)
            .into_iter()
            .find(|v| v.method == method && arity == 0)
        {
            let class = self
                .catalog_class(&void.class)
                .unwrap_or_else(|| void.class.clone());
            Node::new(
                class,
                CreationStrategy::VoidInvocation {
                    host,
                    method,
                    expression: expr,
                },
                HandleStrategy::Void,
            )
        } else {
            return None;
        };
        let id = self
            .nodes
            .add(node.with_association(Association::InvocationVoid), host, None);
        self.add_exposed(id);
        Some(id)
    }

    /// Parent calls matching the host's template, and constructor-parent arguments
    fn discover_association(&mut self, flow: &ExecutionFlow, expr: SyntaxId) {
        let kind = self.editor.tree().kind(expr);
        let is_call = matches!(kind, SyntaxKind::Invoke { .. });
        let is_new = matches!(kind, SyntaxKind::New { .. });
        let found = if is_call {
            self.template_association(flow, expr)
        } else if is_new {
            self.constructor_association(flow, expr)
        } else {
            None
        };
        if let Some((child, parent, association)) = found {
            self.nodes.attach(child, parent, None);
            if let Some(node) = self.nodes.get_mut(child) {
                node.association = association;
            }
        }
    }

    fn template_association(
        &mut self,
        flow: &ExecutionFlow,
        expr: SyntaxId,
    ) -> Option<(NodeId, NodeId, Association)> {
        let host = self.invocation_host(flow, expr)?;
        let host_class = self.nodes.get(host)?.class.clone();
        if !self.catalog.is_container(&host_class) {
            return None;
        }
        let source = self.catalog.association_template(&host_class)?.to_string();
        if source == CONSTRUCTOR_ASSOCIATION {
            return None;
        }
        let template = match AssociationTemplate::parse(&source) {
            Ok(template) => template,
            Err(err) => {
                let message = err.to_string();
                if !self.diagnostics().iter().any(|d| d.message == message) {
                    let span = self.editor.tree().span(expr);
                    self.add_diagnostic(Diagnostic {
                        code: codes::BAD_TEMPLATE,
                        message,
                        span,
                    });
                }
                return None;
            }
        };
        let tree = self.editor.tree();
        let invocation = tree.invocation(expr)?;
        if !template.matches(invocation.name, invocation.args.len()) {
            return None;
        }
        let argument = *invocation.args.get(template.child_index())?;
        let child = self.node_for_expression(flow, argument)?;
        if child == host || child == self.root || self.nodes.parent(child).is_some() {
            return None;
        }
        Some((
            child,
            host,
            Association::InvocationArgument {
                invocation: expr,
                position: template.child_index(),
                template: template.source().to_string(),
            },
        ))
    }

    fn constructor_association(
        &self,
        flow: &ExecutionFlow,
        expr: SyntaxId,
    ) -> Option<(NodeId, NodeId, Association)> {
        let child = self.creation_owner(expr)?;
        if self.nodes.parent(child).is_some() {
            return None;
        }
        let class = &self.nodes.get(child)?.class;
        let args = self.editor.tree().arguments(expr);
        let position = self
            .catalog
            .constructors(class)
            .into_iter()
            .filter(|c| c.params.len() == args.len())
            .find_map(|c| c.params.iter().position(|p| p.parent))?;
        let parent = self.node_for_expression(flow, args[position])?;
        (parent != child).then_some((child, parent, Association::ConstructorParent { position }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn tree(source: &str) -> SyntaxTree {
        let unit = parse(source).expect("Should parse");
        SyntaxTree::from_unit(&unit, source.len())
    }

    fn creations(tree: &SyntaxTree) -> Vec<SyntaxId> {
        tree.descendants(tree.root())
            .into_iter()
            .filter(|id| matches!(tree.kind(*id), SyntaxKind::New { .. }))
            .collect()
    }

    #[test]
    fn test_handle_for_storage_sites() {
        let source = "class A {\n\tprivate JLabel label = new JLabel();\n\tprivate JButton button;\n\tA() {\n\t\tJPanel panel = new JPanel();\n\t\tbutton = new JButton();\n\t\tadd(new JTextField());\n\t}\n}";
        let tree = tree(source);
        let kinds: Vec<&str> = creations(&tree)
            .into_iter()
            .map(|c| handle_for(&tree, c).kind())
            .collect();
        assert_eq!(kinds, vec!["field-initializer", "local", "field", "empty"]);
    }

    #[test]
    fn test_lazy_pattern() {
        let source = "class A {\n\tprivate JButton button;\n\tprivate JButton getButton() {\n\t\tif (button == null) {\n\t\t\tbutton = new JButton();\n\t\t}\n\t\treturn button;\n\t}\n}";
        let tree = tree(source);
        let creation = creations(&tree)[0];
        assert!(matches!(handle_for(&tree, creation), HandleStrategy::Lazy { .. }));
    }

    #[test]
    fn test_reused_local() {
        let source = "class A {\n\tA() {\n\t\tJButton b = new JButton();\n\t\tadd(b);\n\t\tb = new JButton();\n\t\tadd(b);\n\t}\n}";
        let tree = tree(source);
        let kinds: Vec<&str> = creations(&tree)
            .into_iter()
            .map(|c| handle_for(&tree, c).kind())
            .collect();
        assert_eq!(kinds, vec!["local-reuse", "local-reuse"]);
    }

    #[test]
    fn test_owned_expressions_children_first() {
        let source = "class A {\n\tA() {\n\t\tadd(new JButton());\n\t}\n}";
        let tree = tree(source);
        let body = tree.method_body(tree.methods()[0]).expect("body");
        let stmt = tree.children(body)[0];
        let owned = owned_expressions(&tree, stmt);
        assert!(matches!(tree.kind(owned[0]), SyntaxKind::New { .. }));
        assert!(matches!(tree.kind(*owned.last().expect("call")), SyntaxKind::Invoke { .. }));
    }
}
