//! Arena of syntax nodes lowered from the parser AST
//!
//! Every node keeps its absolute byte span in the current source text and an
//! index link to its parent. Ids are stable: text edits shift spans in place,
//! removed subtrees are marked detached instead of being freed, and re-emitted
//! text can be grafted back onto the ids it came from.

use crate::parser::ast::*;

/// Stable id of a node in the syntax arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SyntaxId(u32);

impl SyntaxId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for SyntaxId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Node kinds. Names of declarations live in an `Ident` first child so that
/// renames touch exactly one span.
#[derive(Debug, Clone, PartialEq)]
pub enum SyntaxKind {
    Unit,
    Package(String),
    Import(String),
    /// children: name, members...
    Class {
        name: String,
        superclass: Option<String>,
    },
    /// children: name, initializer?
    Field {
        modifiers: Vec<Modifier>,
        ty: TypeRef,
    },
    /// children: name, params..., body
    Method {
        modifiers: Vec<Modifier>,
        return_type: ReturnType,
    },
    /// children: name
    Param { ty: TypeRef },
    Ident(String),
    Block,
    /// children: name, initializer?
    LocalDecl { ty: TypeRef },
    ExprStmt,
    /// children: target, value
    Assign,
    /// children: condition, then, else?
    If,
    Return,
    /// children: args...
    New { ty: TypeRef },
    /// children: target?, name, args...
    Invoke { has_target: bool },
    /// children: target, name
    FieldAccess,
    Name(String),
    This,
    Literal(String),
    Paren,
    Cast { ty: TypeRef },
    Binary(BinaryOp),
}

impl SyntaxKind {
    pub fn is_statement(&self) -> bool {
        matches!(
            self,
            SyntaxKind::Block
                | SyntaxKind::LocalDecl { .. }
                | SyntaxKind::ExprStmt
                | SyntaxKind::Assign
                | SyntaxKind::If
                | SyntaxKind::Return
        )
    }

    pub fn is_expression(&self) -> bool {
        matches!(
            self,
            SyntaxKind::New { .. }
                | SyntaxKind::Invoke { .. }
                | SyntaxKind::FieldAccess
                | SyntaxKind::Name(_)
                | SyntaxKind::This
                | SyntaxKind::Literal(_)
                | SyntaxKind::Paren
                | SyntaxKind::Cast { .. }
                | SyntaxKind::Binary(_)
        )
    }

    pub fn is_member(&self) -> bool {
        matches!(self, SyntaxKind::Field { .. } | SyntaxKind::Method { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxNode {
    pub kind: SyntaxKind,
    pub span: Span,
    pub parent: Option<SyntaxId>,
    pub children: Vec<SyntaxId>,
    /// Removed from the live tree; spans are no longer maintained
    pub detached: bool,
}

/// Parts of an invocation expression
#[derive(Debug, Clone, Copy)]
pub struct Invocation<'a> {
    pub target: Option<SyntaxId>,
    pub name: &'a str,
    pub name_id: SyntaxId,
    pub args: &'a [SyntaxId],
}

#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxTree {
    nodes: Vec<SyntaxNode>,
    root: SyntaxId,
}

impl SyntaxTree {
    /// Lower a parsed unit; `len` is the length of the source text
    pub fn from_unit(unit: &CompilationUnit, len: usize) -> Self {
        let mut tree = SyntaxTree {
            nodes: Vec::new(),
            root: SyntaxId(0),
        };
        let root = tree.alloc(SyntaxKind::Unit, 0..len, 0, None);
        tree.root = root;

        if let Some(package) = &unit.package {
            tree.alloc(
                SyntaxKind::Package(package.node.clone()),
                package.span.clone(),
                0,
                Some(root),
            );
        }
        for import in &unit.imports {
            tree.alloc(
                SyntaxKind::Import(import.node.clone()),
                import.span.clone(),
                0,
                Some(root),
            );
        }

        let class = &unit.class.node;
        let class_id = tree.alloc(
            SyntaxKind::Class {
                name: class.name.node.0.clone(),
                superclass: class.superclass.as_ref().map(|s| s.node.name.clone()),
            },
            unit.class.span.clone(),
            0,
            Some(root),
        );
        tree.lower_ident(&class.name, 0, class_id);
        for member in &class.members {
            tree.lower_member(member, 0, Some(class_id));
        }
        tree
    }

    fn alloc(
        &mut self,
        kind: SyntaxKind,
        span: Span,
        base: usize,
        parent: Option<SyntaxId>,
    ) -> SyntaxId {
        let id = SyntaxId(self.nodes.len() as u32);
        self.nodes.push(SyntaxNode {
            kind,
            span: (span.start + base)..(span.end + base),
            parent,
            children: Vec::new(),
            detached: false,
        });
        if let Some(p) = parent {
            self.nodes[p.index()].children.push(id);
        }
        id
    }

    fn lower_ident(&mut self, ident: &Spanned<Identifier>, base: usize, parent: SyntaxId) -> SyntaxId {
        self.alloc(
            SyntaxKind::Ident(ident.node.0.clone()),
            ident.span.clone(),
            base,
            Some(parent),
        )
    }

    pub(crate) fn lower_member(
        &mut self,
        member: &Spanned<Member>,
        base: usize,
        parent: Option<SyntaxId>,
    ) -> SyntaxId {
        match &member.node {
            Member::Field(field) => {
                let id = self.alloc(
                    SyntaxKind::Field {
                        modifiers: field.modifiers.clone(),
                        ty: field.ty.node.clone(),
                    },
                    member.span.clone(),
                    base,
                    parent,
                );
                self.lower_ident(&field.name, base, id);
                if let Some(init) = &field.initializer {
                    self.lower_expression(init, base, Some(id));
                }
                id
            }
            Member::Method(method) => {
                let id = self.alloc(
                    SyntaxKind::Method {
                        modifiers: method.modifiers.clone(),
                        return_type: method.return_type.clone(),
                    },
                    member.span.clone(),
                    base,
                    parent,
                );
                self.lower_ident(&method.name, base, id);
                for param in &method.params {
                    let param_id = self.alloc(
                        SyntaxKind::Param {
                            ty: param.node.ty.node.clone(),
                        },
                        param.span.clone(),
                        base,
                        Some(id),
                    );
                    self.lower_ident(&param.node.name, base, param_id);
                }
                let body = self.alloc(SyntaxKind::Block, method.body.span.clone(), base, Some(id));
                for stmt in &method.body.node.statements {
                    self.lower_statement(stmt, base, Some(body));
                }
                id
            }
        }
    }

    pub(crate) fn lower_statement(
        &mut self,
        stmt: &Spanned<Stmt>,
        base: usize,
        parent: Option<SyntaxId>,
    ) -> SyntaxId {
        let span = stmt.span.clone();
        match &stmt.node {
            Stmt::Block(block) => {
                let id = self.alloc(SyntaxKind::Block, span, base, parent);
                for s in &block.statements {
                    self.lower_statement(s, base, Some(id));
                }
                id
            }
            Stmt::LocalDecl {
                ty,
                name,
                initializer,
            } => {
                let id = self.alloc(SyntaxKind::LocalDecl { ty: ty.node.clone() }, span, base, parent);
                self.lower_ident(name, base, id);
                if let Some(init) = initializer {
                    self.lower_expression(init, base, Some(id));
                }
                id
            }
            Stmt::Expr(expr) => {
                let id = self.alloc(SyntaxKind::ExprStmt, span, base, parent);
                self.lower_expression(expr, base, Some(id));
                id
            }
            Stmt::Assign { target, value } => {
                let id = self.alloc(SyntaxKind::Assign, span, base, parent);
                self.lower_expression(target, base, Some(id));
                self.lower_expression(value, base, Some(id));
                id
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let id = self.alloc(SyntaxKind::If, span, base, parent);
                self.lower_expression(condition, base, Some(id));
                self.lower_statement(then_branch, base, Some(id));
                if let Some(otherwise) = else_branch {
                    self.lower_statement(otherwise, base, Some(id));
                }
                id
            }
            Stmt::Return(value) => {
                let id = self.alloc(SyntaxKind::Return, span, base, parent);
                if let Some(value) = value {
                    self.lower_expression(value, base, Some(id));
                }
                id
            }
        }
    }

    pub(crate) fn lower_expression(
        &mut self,
        expr: &Spanned<Expr>,
        base: usize,
        parent: Option<SyntaxId>,
    ) -> SyntaxId {
        let span = expr.span.clone();
        match &expr.node {
            Expr::New { ty, args } => {
                let id = self.alloc(SyntaxKind::New { ty: ty.node.clone() }, span, base, parent);
                for arg in args {
                    self.lower_expression(arg, base, Some(id));
                }
                id
            }
            Expr::Invoke { target, name, args } => {
                let id = self.alloc(
                    SyntaxKind::Invoke {
                        has_target: target.is_some(),
                    },
                    span,
                    base,
                    parent,
                );
                if let Some(target) = target {
                    self.lower_expression(target, base, Some(id));
                }
                self.lower_ident(name, base, id);
                for arg in args {
                    self.lower_expression(arg, base, Some(id));
                }
                id
            }
            Expr::FieldAccess { target, name } => {
                let id = self.alloc(SyntaxKind::FieldAccess, span, base, parent);
                self.lower_expression(target, base, Some(id));
                self.lower_ident(name, base, id);
                id
            }
            Expr::Name(name) => self.alloc(SyntaxKind::Name(name.0.clone()), span, base, parent),
            Expr::This => self.alloc(SyntaxKind::This, span, base, parent),
            Expr::Literal(text) => self.alloc(SyntaxKind::Literal(text.clone()), span, base, parent),
            Expr::Paren(inner) => {
                let id = self.alloc(SyntaxKind::Paren, span, base, parent);
                self.lower_expression(inner, base, Some(id));
                id
            }
            Expr::Cast { ty, expr: inner } => {
                let id = self.alloc(SyntaxKind::Cast { ty: ty.node.clone() }, span, base, parent);
                self.lower_expression(inner, base, Some(id));
                id
            }
            Expr::Binary { op, lhs, rhs } => {
                let id = self.alloc(SyntaxKind::Binary(*op), span, base, parent);
                self.lower_expression(lhs, base, Some(id));
                self.lower_expression(rhs, base, Some(id));
                id
            }
        }
    }

    // ---- queries ----

    pub fn root(&self) -> SyntaxId {
        self.root
    }

    pub fn get(&self, id: SyntaxId) -> Option<&SyntaxNode> {
        self.nodes.get(id.index())
    }

    pub fn node(&self, id: SyntaxId) -> &SyntaxNode {
        &self.nodes[id.index()]
    }

    pub fn kind(&self, id: SyntaxId) -> &SyntaxKind {
        &self.node(id).kind
    }

    pub fn span(&self, id: SyntaxId) -> Span {
        self.node(id).span.clone()
    }

    pub fn parent(&self, id: SyntaxId) -> Option<SyntaxId> {
        self.node(id).parent
    }

    pub fn children(&self, id: SyntaxId) -> &[SyntaxId] {
        &self.node(id).children
    }

    /// True if the id exists and is part of the current source
    pub fn is_live(&self, id: SyntaxId) -> bool {
        self.get(id).map(|n| !n.detached).unwrap_or(false)
    }

    pub fn index_in_parent(&self, id: SyntaxId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|c| *c == id)
    }

    pub fn class(&self) -> Option<SyntaxId> {
        self.children(self.root)
            .iter()
            .copied()
            .find(|c| matches!(self.kind(*c), SyntaxKind::Class { .. }))
    }

    pub fn class_name(&self) -> Option<&str> {
        match self.kind(self.class()?) {
            SyntaxKind::Class { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn superclass(&self) -> Option<&str> {
        match self.kind(self.class()?) {
            SyntaxKind::Class { superclass, .. } => superclass.as_deref(),
            _ => None,
        }
    }

    pub fn members(&self) -> Vec<SyntaxId> {
        match self.class() {
            Some(class) => self
                .children(class)
                .iter()
                .copied()
                .filter(|c| self.kind(*c).is_member())
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn fields(&self) -> Vec<SyntaxId> {
        self.members()
            .into_iter()
            .filter(|m| matches!(self.kind(*m), SyntaxKind::Field { .. }))
            .collect()
    }

    pub fn methods(&self) -> Vec<SyntaxId> {
        self.members()
            .into_iter()
            .filter(|m| matches!(self.kind(*m), SyntaxKind::Method { .. }))
            .collect()
    }

    pub fn field_named(&self, name: &str) -> Option<SyntaxId> {
        self.fields()
            .into_iter()
            .find(|f| self.name_of(*f) == Some(name))
    }

    pub fn method_named(&self, name: &str) -> Option<SyntaxId> {
        self.methods()
            .into_iter()
            .find(|m| self.name_of(*m) == Some(name))
    }

    /// The `Ident` child carrying the name of a declaration or invocation
    pub fn name_ident(&self, id: SyntaxId) -> Option<SyntaxId> {
        match self.kind(id) {
            SyntaxKind::Class { .. }
            | SyntaxKind::Field { .. }
            | SyntaxKind::Method { .. }
            | SyntaxKind::Param { .. }
            | SyntaxKind::LocalDecl { .. } => self.children(id).first().copied(),
            SyntaxKind::Invoke { has_target } => {
                self.children(id).get(usize::from(*has_target)).copied()
            }
            SyntaxKind::FieldAccess => self.children(id).get(1).copied(),
            _ => None,
        }
    }

    /// Name of a declaration, invocation, field access, simple name or ident
    pub fn name_of(&self, id: SyntaxId) -> Option<&str> {
        match self.kind(id) {
            SyntaxKind::Name(name) | SyntaxKind::Ident(name) => Some(name),
            _ => {
                let ident = self.name_ident(id)?;
                match self.kind(ident) {
                    SyntaxKind::Ident(name) => Some(name),
                    _ => None,
                }
            }
        }
    }

    /// Declared type of a field, local or parameter
    pub fn declared_type(&self, id: SyntaxId) -> Option<&TypeRef> {
        match self.kind(id) {
            SyntaxKind::Field { ty, .. }
            | SyntaxKind::LocalDecl { ty }
            | SyntaxKind::Param { ty } => Some(ty),
            _ => None,
        }
    }

    /// Initializer of a field or local declaration
    pub fn initializer(&self, id: SyntaxId) -> Option<SyntaxId> {
        match self.kind(id) {
            SyntaxKind::Field { .. } | SyntaxKind::LocalDecl { .. } => {
                self.children(id).get(1).copied()
            }
            _ => None,
        }
    }

    pub fn method_body(&self, method: SyntaxId) -> Option<SyntaxId> {
        match self.kind(method) {
            SyntaxKind::Method { .. } => self.children(method).last().copied(),
            _ => None,
        }
    }

    pub fn params(&self, method: SyntaxId) -> Vec<SyntaxId> {
        self.children(method)
            .iter()
            .copied()
            .filter(|c| matches!(self.kind(*c), SyntaxKind::Param { .. }))
            .collect()
    }

    pub fn modifiers(&self, member: SyntaxId) -> &[Modifier] {
        match self.kind(member) {
            SyntaxKind::Field { modifiers, .. } | SyntaxKind::Method { modifiers, .. } => modifiers,
            _ => &[],
        }
    }

    pub fn is_static(&self, member: SyntaxId) -> bool {
        self.modifiers(member).contains(&Modifier::Static)
    }

    pub fn is_constructor(&self, method: SyntaxId) -> bool {
        matches!(
            self.kind(method),
            SyntaxKind::Method {
                return_type: ReturnType::Constructor,
                ..
            }
        )
    }

    pub fn invocation(&self, id: SyntaxId) -> Option<Invocation<'_>> {
        let SyntaxKind::Invoke { has_target } = self.kind(id) else {
            return None;
        };
        let children = self.children(id);
        let name_index = usize::from(*has_target);
        let name_id = *children.get(name_index)?;
        let name = match self.kind(name_id) {
            SyntaxKind::Ident(name) => name.as_str(),
            _ => return None,
        };
        Some(Invocation {
            target: if *has_target { children.first().copied() } else { None },
            name,
            name_id,
            args: &children[name_index + 1..],
        })
    }

    /// Arguments of an invocation or constructor call
    pub fn arguments(&self, id: SyntaxId) -> &[SyntaxId] {
        match self.kind(id) {
            SyntaxKind::New { .. } => self.children(id),
            SyntaxKind::Invoke { .. } => self.invocation(id).map(|i| i.args).unwrap_or(&[]),
            _ => &[],
        }
    }

    /// `super(..)` or `this(..)` call statement
    pub fn is_constructor_call(&self, stmt: SyntaxId) -> bool {
        if !matches!(self.kind(stmt), SyntaxKind::ExprStmt) {
            return false;
        }
        self.children(stmt)
            .first()
            .and_then(|e| self.invocation(*e))
            .map(|inv| inv.target.is_none() && (inv.name == "super" || inv.name == "this"))
            .unwrap_or(false)
    }

    pub fn ancestors(&self, id: SyntaxId) -> impl Iterator<Item = SyntaxId> + '_ {
        std::iter::successors(self.parent(id), move |p| self.parent(*p))
    }

    /// True if `id` is `ancestor` or nested inside it
    pub fn is_within(&self, id: SyntaxId, ancestor: SyntaxId) -> bool {
        id == ancestor || self.ancestors(id).any(|a| a == ancestor)
    }

    /// Nearest statement (self included) that sits directly in a block
    pub fn enclosing_statement(&self, id: SyntaxId) -> Option<SyntaxId> {
        std::iter::once(id).chain(self.ancestors(id)).find(|n| {
            self.kind(*n).is_statement()
                && self
                    .parent(*n)
                    .map(|p| matches!(self.kind(p), SyntaxKind::Block))
                    .unwrap_or(false)
        })
    }

    pub fn enclosing_method(&self, id: SyntaxId) -> Option<SyntaxId> {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .find(|n| matches!(self.kind(*n), SyntaxKind::Method { .. }))
    }

    pub fn enclosing_member(&self, id: SyntaxId) -> Option<SyntaxId> {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .find(|n| self.kind(*n).is_member())
    }

    /// Preorder traversal of a subtree, `id` included
    pub fn descendants(&self, id: SyntaxId) -> Vec<SyntaxId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            out.push(next);
            for child in self.children(next).iter().rev() {
                stack.push(*child);
            }
        }
        out
    }

    /// Descend through parentheses and casts
    pub fn strip_wrappers(&self, mut id: SyntaxId) -> SyntaxId {
        while matches!(self.kind(id), SyntaxKind::Paren | SyntaxKind::Cast { .. }) {
            match self.children(id).first() {
                Some(inner) => id = *inner,
                None => break,
            }
        }
        id
    }

    /// Climb through enclosing parentheses and casts
    pub fn outer_wrapper(&self, mut id: SyntaxId) -> SyntaxId {
        while let Some(parent) = self.parent(id) {
            if matches!(self.kind(parent), SyntaxKind::Paren | SyntaxKind::Cast { .. }) {
                id = parent;
            } else {
                break;
            }
        }
        id
    }

    /// Outermost node in a subtree with exactly this span
    pub fn find_span(&self, root: SyntaxId, span: &Span) -> Option<SyntaxId> {
        self.descendants(root)
            .into_iter()
            .find(|n| self.node(*n).span == *span)
    }

    // ---- mutation, driven by the source editor ----

    /// Update spans after the text range `start..end` was replaced by `new_len` bytes
    pub(crate) fn apply_edit(&mut self, start: usize, end: usize, new_len: usize) {
        let delta = new_len as isize - (end - start) as isize;
        let shift = |pos: usize| (pos as isize + delta) as usize;
        for node in self.nodes.iter_mut().filter(|n| !n.detached) {
            let span = &mut node.span;
            if start == end {
                if span.start >= start {
                    *span = shift(span.start)..shift(span.end);
                } else if span.end > start {
                    span.end = shift(span.end);
                }
            } else if span.start >= end {
                *span = shift(span.start)..shift(span.end);
            } else if span.start <= start && span.end >= end {
                span.end = shift(span.end);
            }
        }
    }

    /// Remove a subtree from the live tree
    pub(crate) fn detach(&mut self, id: SyntaxId) {
        if let Some(parent) = self.parent(id) {
            self.nodes[parent.index()].children.retain(|c| *c != id);
        }
        self.nodes[id.index()].parent = None;
        for n in self.descendants(id) {
            self.nodes[n.index()].detached = true;
        }
    }

    pub(crate) fn attach_child(&mut self, parent: SyntaxId, index: usize, child: SyntaxId) {
        let children = &mut self.nodes[parent.index()].children;
        let index = index.min(children.len());
        children.insert(index, child);
        self.nodes[child.index()].parent = Some(parent);
    }

    /// Replace the live node `site` with the detached subtree `node`
    ///
    /// Both must cover identical text; the subtree's spans are moved onto the
    /// site's position and the site is detached.
    pub(crate) fn graft(&mut self, site: SyntaxId, node: SyntaxId) -> bool {
        let site_span = self.span(site);
        let node_span = self.span(node);
        if site_span.len() != node_span.len() || site == node {
            return false;
        }
        let delta = site_span.start as isize - node_span.start as isize;
        for n in self.descendants(node) {
            let entry = &mut self.nodes[n.index()];
            entry.span = ((entry.span.start as isize + delta) as usize)
                ..((entry.span.end as isize + delta) as usize);
            entry.detached = false;
        }
        let parent = self.parent(site);
        let index = self.index_in_parent(site);
        self.detach(site);
        match (parent, index) {
            (Some(parent), Some(index)) => self.attach_child(parent, index, node),
            _ => self.nodes[node.index()].parent = None,
        }
        true
    }

    /// Move the content of the freshly lowered `new` into the slot of `old`
    /// so that `old` keeps its identity
    pub(crate) fn transplant(&mut self, old: SyntaxId, new: SyntaxId) {
        let replacement = self.nodes[new.index()].clone();
        for child in &replacement.children {
            self.nodes[child.index()].parent = Some(old);
        }
        let slot = &mut self.nodes[old.index()];
        slot.kind = replacement.kind;
        slot.span = replacement.span;
        slot.children = replacement.children;
        slot.detached = false;
        let retired = &mut self.nodes[new.index()];
        retired.children.clear();
        retired.parent = None;
        retired.detached = true;
    }

    /// Update the stored name of an `Ident` or `Name` node
    pub(crate) fn rename_node(&mut self, id: SyntaxId, name: &str) {
        match &mut self.nodes[id.index()].kind {
            SyntaxKind::Ident(n) | SyntaxKind::Name(n) => *n = name.to_string(),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    const SOURCE: &str = "class Panel extends JPanel {\n\tprivate JButton button;\n\tpublic Panel() {\n\t\tbutton = new JButton();\n\t\tadd(button);\n\t}\n}\n";

    fn tree() -> SyntaxTree {
        let unit = parse(SOURCE).expect("Should parse");
        SyntaxTree::from_unit(&unit, SOURCE.len())
    }

    #[test]
    fn test_lowered_structure() {
        let tree = tree();
        assert_eq!(tree.class_name(), Some("Panel"));
        assert_eq!(tree.superclass(), Some("JPanel"));
        assert_eq!(tree.fields().len(), 1);
        assert_eq!(tree.methods().len(), 1);
        let field = tree.fields()[0];
        assert_eq!(tree.name_of(field), Some("button"));
        assert_eq!(tree.initializer(field), None);
    }

    #[test]
    fn test_spans_are_absolute() {
        let tree = tree();
        let ctor = tree.methods()[0];
        let body = tree.method_body(ctor).expect("body");
        let first = tree.children(body)[0];
        assert_eq!(&SOURCE[tree.span(first)], "button = new JButton();");
        assert_eq!(tree.enclosing_statement(first), Some(first));
        assert_eq!(tree.enclosing_method(first), Some(ctor));
    }

    #[test]
    fn test_invocation_parts() {
        let tree = tree();
        let body = tree.method_body(tree.methods()[0]).expect("body");
        let stmt = tree.children(body)[1];
        let call = tree.children(stmt)[0];
        let inv = tree.invocation(call).expect("invocation");
        assert_eq!(inv.name, "add");
        assert!(inv.target.is_none());
        assert_eq!(inv.args.len(), 1);
        assert_eq!(tree.name_of(inv.args[0]), Some("button"));
    }

    #[test]
    fn test_apply_edit_shifts_and_extends() {
        let mut tree = tree();
        let body = tree.method_body(tree.methods()[0]).expect("body");
        let first = tree.children(body)[0];
        let second = tree.children(body)[1];
        let before = tree.span(second);
        let body_before = tree.span(body);
        // insert three bytes at the end of the first statement
        let at = tree.span(first).end;
        tree.apply_edit(at, at, 3);
        assert_eq!(tree.span(first).end, at);
        assert_eq!(tree.span(second), (before.start + 3)..(before.end + 3));
        assert_eq!(tree.span(body).end, body_before.end + 3);
    }

    #[test]
    fn test_detach_removes_from_parent() {
        let mut tree = tree();
        let body = tree.method_body(tree.methods()[0]).expect("body");
        let first = tree.children(body)[0];
        tree.detach(first);
        assert_eq!(tree.children(body).len(), 1);
        assert!(!tree.is_live(first));
    }
}
