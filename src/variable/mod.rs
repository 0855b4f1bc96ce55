//! Handle strategies ("variable support"): how an object's identity is named,
//! declared and referenced in the source
//!
//! The strategy enum is pure data; the operations that rewrite source live in
//! the submodules as `Session` methods, one file per family of states.

mod empty;
mod field;
mod lazy;
mod local;
mod property;
mod reference;

use crate::model::NodeId;
use crate::syntax::{Binding, SyntaxId, SyntaxTree};

pub use property::VariableProperty;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandleStrategy {
    /// Inline expression, no name
    Empty,
    /// `Type name = expr;`
    LocalUnique { declaration: SyntaxId },
    /// One local declaration assigned at several sites; `assignment` is the
    /// `Assign` statement for this object, or the declaration itself
    LocalReuse {
        declaration: SyntaxId,
        assignment: SyntaxId,
    },
    /// `private Type name;` plus one assignment statement
    FieldUnique { field: SyntaxId, assignment: SyntaxId },
    /// `private Type name = expr;`
    FieldInitializer { field: SyntaxId },
    /// Field assigned at several sites; `assignment` is the field itself when
    /// this object is its initializer
    FieldReuse { field: SyntaxId, assignment: SyntaxId },
    /// Field created on demand by an accessor method
    Lazy { field: SyntaxId, accessor: SyntaxId },
    /// `host.field`
    ExposedField { host: NodeId, field: String },
    /// `host.getProperty()`
    ExposedProperty { host: NodeId, getter: String },
    MethodParameter { parameter: SyntaxId },
    This,
    /// No reference possible
    Void,
}

impl HandleStrategy {
    pub fn kind(&self) -> &'static str {
        match self {
            HandleStrategy::Empty => "empty",
            HandleStrategy::LocalUnique { .. } => "local",
            HandleStrategy::LocalReuse { .. } => "local-reuse",
            HandleStrategy::FieldUnique { .. } => "field",
            HandleStrategy::FieldInitializer { .. } => "field-initializer",
            HandleStrategy::FieldReuse { .. } => "field-reuse",
            HandleStrategy::Lazy { .. } => "lazy",
            HandleStrategy::ExposedField { .. } => "exposed-field",
            HandleStrategy::ExposedProperty { .. } => "exposed-property",
            HandleStrategy::MethodParameter { .. } => "parameter",
            HandleStrategy::This => "this",
            HandleStrategy::Void => "void",
        }
    }

    /// Declaration the handle's name is bound to
    pub fn binding(&self) -> Option<Binding> {
        match self {
            HandleStrategy::LocalUnique { declaration }
            | HandleStrategy::LocalReuse { declaration, .. } => Some(Binding::Local(*declaration)),
            HandleStrategy::FieldUnique { field, .. }
            | HandleStrategy::FieldInitializer { field }
            | HandleStrategy::FieldReuse { field, .. }
            | HandleStrategy::Lazy { field, .. } => Some(Binding::Field(*field)),
            HandleStrategy::MethodParameter { parameter } => Some(Binding::Param(*parameter)),
            _ => None,
        }
    }

    /// Statement (or member) that stores this object into the variable
    pub fn assignment(&self) -> Option<SyntaxId> {
        match self {
            HandleStrategy::LocalUnique { declaration } => Some(*declaration),
            HandleStrategy::LocalReuse { assignment, .. }
            | HandleStrategy::FieldUnique { assignment, .. }
            | HandleStrategy::FieldReuse { assignment, .. } => Some(*assignment),
            HandleStrategy::FieldInitializer { field } => Some(*field),
            _ => None,
        }
    }

    /// The variable is shared with other objects
    pub fn is_reused(&self) -> bool {
        matches!(
            self,
            HandleStrategy::LocalReuse { .. } | HandleStrategy::FieldReuse { .. }
        )
    }

    pub fn is_local(&self) -> bool {
        matches!(
            self,
            HandleStrategy::LocalUnique { .. } | HandleStrategy::LocalReuse { .. }
        )
    }

    pub fn is_field(&self) -> bool {
        matches!(
            self,
            HandleStrategy::FieldUnique { .. }
                | HandleStrategy::FieldInitializer { .. }
                | HandleStrategy::FieldReuse { .. }
                | HandleStrategy::Lazy { .. }
        )
    }

    pub fn has_name(&self) -> bool {
        self.binding().is_some()
    }

    pub fn can_convert_to_field(&self) -> bool {
        matches!(
            self,
            HandleStrategy::Empty | HandleStrategy::LocalUnique { .. } | HandleStrategy::LocalReuse { .. }
        )
    }

    pub fn can_convert_to_local(&self) -> bool {
        matches!(self, HandleStrategy::FieldUnique { .. })
    }

    pub fn can_convert_to_lazy(&self) -> bool {
        matches!(
            self,
            HandleStrategy::Empty | HandleStrategy::LocalUnique { .. } | HandleStrategy::FieldUnique { .. }
        )
    }

    /// Current variable name, if the handle has one
    pub fn name<'t>(&self, tree: &'t SyntaxTree) -> Option<&'t str> {
        let declaration = self.binding()?.declaration();
        tree.is_live(declaration).then(|| tree.name_of(declaration)).flatten()
    }
}

/// Name with `from` prefix swapped for `to`
pub(crate) fn swap_prefix(name: &str, from: &str, to: &str) -> String {
    let bare = if from.is_empty() {
        name
    } else {
        name.strip_prefix(from).unwrap_or(name)
    };
    if bare.starts_with(to) {
        bare.to_string()
    } else {
        format!("{}{}", to, bare)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capabilities() {
        assert!(HandleStrategy::Empty.can_convert_to_field());
        assert!(!HandleStrategy::Empty.has_name());
        assert!(!HandleStrategy::This.can_convert_to_field());
        assert!(!HandleStrategy::Void.can_convert_to_local());
    }

    #[test]
    fn test_swap_prefix() {
        assert_eq!(swap_prefix("button", "", "m_"), "m_button");
        assert_eq!(swap_prefix("l_button", "l_", "m_"), "m_button");
        assert_eq!(swap_prefix("button", "", ""), "button");
    }
}
