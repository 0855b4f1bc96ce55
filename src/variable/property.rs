//! The "Variable" pseudo-property: reading and renaming an object's variable

use tracing::debug;

use crate::config::TextMode;
use crate::error::DesignError;
use crate::model::{DesignEvent, NodeId};
use crate::naming::{allocate, is_default_name, is_keyword, name_for_text, sanitize, TextNaming};
use crate::syntax::scope::{self, Binding};
use crate::Session;

use super::HandleStrategy;

/// Name of an object's variable, editable like any other property
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariableProperty {
    node: NodeId,
}

impl VariableProperty {
    pub fn new(node: NodeId) -> Self {
        Self { node }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Current name; `None` for inline objects and handles without a name
    pub fn value(&self, session: &Session) -> Option<String> {
        session.name_of(self.node)
    }

    pub fn is_modifiable(&self, session: &Session) -> bool {
        session
            .nodes()
            .get(self.node)
            .map(|n| {
                !matches!(
                    n.handle,
                    HandleStrategy::ExposedField { .. }
                        | HandleStrategy::ExposedProperty { .. }
                        | HandleStrategy::This
                        | HandleStrategy::Void
                )
            })
            .unwrap_or(false)
    }

    /// Rename; returns the name actually used after sanitizing and making it unique
    pub fn set_value(&self, session: &mut Session, name: &str) -> Result<String, DesignError> {
        session.set_name(self.node, name)
    }
}

impl Session {
    pub fn variable(&self, node: NodeId) -> VariableProperty {
        VariableProperty::new(node)
    }

    /// Rename the object's variable and every reference to it
    ///
    /// An inline object gets a local first; a shared variable is split so
    /// only this object's uses are renamed.
    pub fn set_name(&mut self, node: NodeId, name: &str) -> Result<String, DesignError> {
        self.edit(|s| s.set_name_in(node, name))
    }

    /// Rename from a text property value, following `naming.text_mode`
    pub fn rename_for_text(&mut self, node: NodeId, text: &str) -> Result<Option<String>, DesignError> {
        let naming = &self.config.naming;
        if naming.text_mode == TextMode::Never {
            return Ok(None);
        }
        let entry = self.nodes.node(node)?;
        if !entry.handle.has_name() {
            return Ok(None);
        }
        let class = entry.class.clone();
        let default = self.catalog.default_name(&class);
        if naming.text_mode == TextMode::Default {
            let current = self.name_of(node).unwrap_or_default();
            let bare = current
                .strip_prefix(naming.local_prefix.as_str())
                .filter(|_| !naming.local_prefix.is_empty())
                .or_else(|| {
                    current
                        .strip_prefix(naming.field_prefix.as_str())
                        .filter(|_| !naming.field_prefix.is_empty())
                })
                .unwrap_or(&current);
            if !is_default_name(bare, &default) {
                return Ok(None);
            }
        }
        let acronym = self.catalog.acronym(&class);
        let derived = TextNaming {
            class: &class,
            default_name: &default,
            acronym: &acronym,
        };
        let Some(base) = name_for_text(text, &derived, naming) else {
            return Ok(None);
        };
        let prefix = if self.nodes.node(node)?.handle.is_field() {
            &naming.field_prefix
        } else {
            &naming.local_prefix
        };
        let name = format!("{}{}", prefix, base);
        self.set_name(node, &name).map(Some)
    }

    pub(crate) fn set_name_in(&mut self, node: NodeId, requested: &str) -> Result<String, DesignError> {
        let entry = self.nodes.node(node)?;
        let handle = entry.handle.clone();
        let class = entry.class.clone();
        let base = sanitize(requested)
            .filter(|n| !is_keyword(n))
            .unwrap_or_else(|| self.catalog.default_name(&class));

        match handle {
            HandleStrategy::Empty => {
                self.materialize_in(node, false, Some(&base))?;
                return Ok(self.name_of(node).unwrap_or_default());
            }
            HandleStrategy::LocalReuse { .. } => {
                self.split_local_reuse(node)?;
                return self.set_name_in(node, requested);
            }
            HandleStrategy::FieldReuse { .. } => {
                self.split_field_reuse(node)?;
                return self.set_name_in(node, requested);
            }
            HandleStrategy::ExposedField { .. }
            | HandleStrategy::ExposedProperty { .. }
            | HandleStrategy::This
            | HandleStrategy::Void => {
                return Err(DesignError::unsupported("set_name", handle.kind()));
            }
            _ => {}
        }
        let binding = handle
            .binding()
            .ok_or_else(|| DesignError::unsupported("set_name", handle.kind()))?;
        let declaration = binding.declaration();
        let old = self.declared_name(declaration);
        let tree = self.editor.tree();
        let mut names = match binding {
            Binding::Local(decl) => {
                let block = tree.parent(decl).ok_or_else(|| DesignError::stale(decl))?;
                scope::local_scope(tree, block, tree.index_in_parent(decl).unwrap_or(0))
            }
            Binding::Param(param) => {
                let body = tree
                    .parent(param)
                    .and_then(|m| tree.method_body(m))
                    .ok_or_else(|| DesignError::stale(param))?;
                scope::local_scope(tree, body, 0)
            }
            Binding::Field(_) => scope::field_scope(tree),
        };
        names.release(&old);
        let name = allocate(&base, &names);
        if name == old {
            return Ok(name);
        }
        let references = scope::references(tree, binding);
        let ident = tree
            .name_ident(declaration)
            .ok_or_else(|| DesignError::stale(declaration))?;

        self.publish(DesignEvent::BeforeRename {
            node,
            old: old.clone(),
            new: name.clone(),
        })?;
        self.editor.replace_name(ident, &name)?;
        self.rename_references(&references, &name)?;
        if let HandleStrategy::Lazy { accessor, .. } = handle {
            self.rename_accessor(accessor, &name)?;
        }
        debug!(%node, from = %old, to = %name, "variable renamed");
        Ok(name)
    }

    fn rename_accessor(&mut self, accessor: crate::syntax::SyntaxId, field_name: &str) -> Result<(), DesignError> {
        let old = self.declared_name(accessor);
        let name = self.accessor_name(field_name, Some(&old));
        if name == old {
            return Ok(());
        }
        let calls = self.local_calls(&old);
        let ident = self
            .editor
            .tree()
            .name_ident(accessor)
            .ok_or_else(|| DesignError::stale(accessor))?;
        self.editor.replace_name(ident, &name)?;
        for call in calls {
            self.editor.replace_invocation_name(call, &name)?;
        }
        Ok(())
    }
}
