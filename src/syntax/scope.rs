//! Lexical binding resolution and name-scope construction

use std::collections::BTreeSet;

use crate::naming::NameScope;

use super::tree::{SyntaxId, SyntaxKind, SyntaxTree};

/// Declaration a simple name is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Binding {
    /// `LocalDecl` statement
    Local(SyntaxId),
    /// `Param` node
    Param(SyntaxId),
    /// `Field` member
    Field(SyntaxId),
}

impl Binding {
    pub fn declaration(&self) -> SyntaxId {
        match self {
            Binding::Local(id) | Binding::Param(id) | Binding::Field(id) => *id,
        }
    }
}

/// A point between statements: `container` children before `index` are in scope
pub type Point = (SyntaxId, usize);

/// Scope point of an existing node
pub fn point_of(tree: &SyntaxTree, id: SyntaxId) -> Option<Point> {
    Some((tree.parent(id)?, tree.index_in_parent(id)?))
}

/// Walk outwards from a point, calling `visit` for every declaration in scope
/// (innermost first). Stops early when `visit` returns `true`.
fn walk_declarations(
    tree: &SyntaxTree,
    point: Point,
    mut visit: impl FnMut(Binding, &str) -> bool,
) -> bool {
    let (mut container, mut index) = point;
    loop {
        match tree.kind(container) {
            SyntaxKind::Block => {
                let earlier = &tree.children(container)[..index.min(tree.children(container).len())];
                for stmt in earlier.iter().rev() {
                    if matches!(tree.kind(*stmt), SyntaxKind::LocalDecl { .. }) {
                        if let Some(name) = tree.name_of(*stmt) {
                            if visit(Binding::Local(*stmt), name) {
                                return true;
                            }
                        }
                    }
                }
            }
            SyntaxKind::Method { .. } => {
                for param in tree.params(container) {
                    if let Some(name) = tree.name_of(param) {
                        if visit(Binding::Param(param), name) {
                            return true;
                        }
                    }
                }
            }
            SyntaxKind::Class { .. } => {
                for field in tree.fields() {
                    if let Some(name) = tree.name_of(field) {
                        if visit(Binding::Field(field), name) {
                            return true;
                        }
                    }
                }
            }
            _ => {}
        }
        let Some(parent) = tree.parent(container) else {
            return false;
        };
        index = tree.index_in_parent(container).unwrap_or(0);
        container = parent;
    }
}

/// Binding of `name` at a scope point
pub fn resolve_at(tree: &SyntaxTree, point: Point, name: &str) -> Option<Binding> {
    let mut found = None;
    walk_declarations(tree, point, |binding, declared| {
        if declared == name {
            found = Some(binding);
            true
        } else {
            false
        }
    });
    found
}

/// Binding of a `Name` node, or of the `this.x` field access
pub fn resolve(tree: &SyntaxTree, id: SyntaxId) -> Option<Binding> {
    match tree.kind(id) {
        SyntaxKind::Name(name) => resolve_at(tree, point_of(tree, id)?, name),
        SyntaxKind::FieldAccess => {
            let target = *tree.children(id).first()?;
            if matches!(tree.kind(target), SyntaxKind::This) {
                tree.field_named(tree.name_of(id)?).map(Binding::Field)
            } else {
                None
            }
        }
        _ => None,
    }
}

/// All names bound at a scope point
pub fn visible_names(tree: &SyntaxTree, point: Point) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    walk_declarations(tree, point, |_, name| {
        names.insert(name.to_string());
        false
    });
    names
}

fn local_names_in(
    tree: &SyntaxTree,
    root: SyntaxId,
    out: &mut BTreeSet<String>,
    skip: &dyn Fn(SyntaxId) -> bool,
) {
    for id in tree.descendants(root) {
        if matches!(tree.kind(id), SyntaxKind::LocalDecl { .. } | SyntaxKind::Param { .. }) && !skip(id) {
            if let Some(name) = tree.name_of(id) {
                out.insert(name.to_string());
            }
        }
    }
}

/// Scope for a new local declared in `block` at `index`
///
/// Visible: fields, parameters and earlier locals of the enclosing blocks.
/// Shadowed: locals declared later in the block, including nested blocks.
pub fn local_scope(tree: &SyntaxTree, block: SyntaxId, index: usize) -> NameScope {
    local_scope_without(tree, block, index, &[])
}

/// Like [`local_scope`], ignoring declarations inside the `excluded` statements
/// (statements about to be moved away)
pub fn local_scope_without(
    tree: &SyntaxTree,
    block: SyntaxId,
    index: usize,
    excluded: &[SyntaxId],
) -> NameScope {
    let is_excluded = |id: SyntaxId| excluded.iter().any(|e| tree.is_within(id, *e));
    let mut shadowed = BTreeSet::new();
    for stmt in tree.children(block).iter().skip(index) {
        if !is_excluded(*stmt) {
            local_names_in(tree, *stmt, &mut shadowed, &is_excluded);
        }
    }
    let mut visible = BTreeSet::new();
    walk_declarations(tree, (block, index), |binding, name| {
        if !is_excluded(binding.declaration()) {
            visible.insert(name.to_string());
        }
        false
    });
    NameScope::new().with_visible(visible).with_shadowed(shadowed)
}

/// Scope for a new field: every field is visible, every local or parameter
/// anywhere in the class would shadow it
pub fn field_scope(tree: &SyntaxTree) -> NameScope {
    field_scope_without(tree, &[])
}

/// Like [`field_scope`], ignoring the `excluded` declarations
pub fn field_scope_without(tree: &SyntaxTree, excluded: &[SyntaxId]) -> NameScope {
    let is_excluded = |id: SyntaxId| excluded.contains(&id);
    let visible: Vec<String> = tree
        .fields()
        .into_iter()
        .filter(|f| !is_excluded(*f))
        .filter_map(|f| tree.name_of(f).map(str::to_string))
        .collect();
    let mut shadowed = BTreeSet::new();
    for method in tree.methods() {
        local_names_in(tree, method, &mut shadowed, &is_excluded);
    }
    NameScope::new().with_visible(visible).with_shadowed(shadowed)
}

/// Region of the class where references to a binding can appear
fn binding_region(tree: &SyntaxTree, binding: Binding) -> Option<SyntaxId> {
    match binding {
        Binding::Local(decl) => tree.parent(decl),
        Binding::Param(param) => tree.parent(param),
        Binding::Field(_) => tree.class(),
    }
}

/// Every `Name` (or `this.x` access) that resolves to `binding`, in source order
pub fn references(tree: &SyntaxTree, binding: Binding) -> Vec<SyntaxId> {
    let Some(region) = binding_region(tree, binding) else {
        return Vec::new();
    };
    let Some(name) = tree.name_of(binding.declaration()) else {
        return Vec::new();
    };
    tree.descendants(region)
        .into_iter()
        .filter(|id| match tree.kind(*id) {
            SyntaxKind::Name(n) => n == name,
            SyntaxKind::FieldAccess => tree.name_of(*id) == Some(name),
            _ => false,
        })
        .filter(|id| resolve(tree, *id) == Some(binding))
        .collect()
}

/// `Assign` statements storing into `binding`, in source order
pub fn assignments(tree: &SyntaxTree, binding: Binding) -> Vec<SyntaxId> {
    let Some(region) = binding_region(tree, binding) else {
        return Vec::new();
    };
    tree.descendants(region)
        .into_iter()
        .filter(|id| matches!(tree.kind(*id), SyntaxKind::Assign))
        .filter(|id| {
            tree.children(*id)
                .first()
                .map(|target| resolve(tree, *target) == Some(binding))
                .unwrap_or(false)
        })
        .collect()
}

/// True if a declaration at `decl` (a statement in some block) is in scope at `point`
pub fn declaration_visible_at(tree: &SyntaxTree, decl: SyntaxId, point: Point) -> bool {
    let Some(name) = tree.name_of(decl) else {
        return false;
    };
    resolve_at(tree, point, name) == Some(Binding::Local(decl))
}
