//! Creation strategies: how an object comes into existence in source form

use crate::naming::short_class;
use crate::syntax::SyntaxId;

use super::NodeId;

/// Receiver of a factory call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FactoryHost {
    /// `Box.createVerticalBox()`
    Class(String),
    /// `menu.add("Item")`
    Node(NodeId),
}

/// How an exposed child is reached from its host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExposedAccessor {
    Getter(String),
    Field(String),
}

/// Source fragments a construction expression is assembled from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bindings {
    pub args: Vec<String>,
    /// Reference to the host (factory, exposed or void receiver)
    pub host: Option<String>,
    /// Name of the bound parameter
    pub name: Option<String>,
}

impl Bindings {
    pub fn args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreationStrategy {
    /// `new Type(args)`; `expression` is the `New` node
    Constructor { expression: SyntaxId },
    /// `Host.method(args)` or `host.method(args)`
    Factory {
        host: FactoryHost,
        method: String,
        expression: SyntaxId,
    },
    /// Child that exists as part of its host
    Exposed {
        host: NodeId,
        accessor: ExposedAccessor,
    },
    /// Bound to a parameter of a flow root
    MethodParameter { parameter: SyntaxId },
    /// The class being designed
    This,
    /// `host.method()` whose only effect is an implicit child
    VoidInvocation {
        host: NodeId,
        method: String,
        expression: SyntaxId,
    },
}

impl CreationStrategy {
    pub fn kind(&self) -> &'static str {
        match self {
            CreationStrategy::Constructor { .. } => "constructor",
            CreationStrategy::Factory { .. } => "factory",
            CreationStrategy::Exposed { .. } => "exposed",
            CreationStrategy::MethodParameter { .. } => "parameter",
            CreationStrategy::This => "this",
            CreationStrategy::VoidInvocation { .. } => "void",
        }
    }

    /// Creation expression in the source, if the strategy has one
    pub fn expression(&self) -> Option<SyntaxId> {
        match self {
            CreationStrategy::Constructor { expression }
            | CreationStrategy::Factory { expression, .. }
            | CreationStrategy::VoidInvocation { expression, .. } => Some(*expression),
            _ => None,
        }
    }

    pub fn can_reorder(&self) -> bool {
        matches!(
            self,
            CreationStrategy::Constructor { .. }
                | CreationStrategy::Factory { .. }
                | CreationStrategy::VoidInvocation { .. }
        )
    }

    pub fn can_reparent(&self) -> bool {
        match self {
            CreationStrategy::Constructor { .. } => true,
            CreationStrategy::Factory { host, .. } => matches!(host, FactoryHost::Class(_)),
            _ => false,
        }
    }

    pub fn can_delete(&self) -> bool {
        self.can_reorder()
    }

    /// Host node the object depends on
    pub fn host(&self) -> Option<NodeId> {
        match self {
            CreationStrategy::Factory {
                host: FactoryHost::Node(host),
                ..
            }
            | CreationStrategy::Exposed { host, .. }
            | CreationStrategy::VoidInvocation { host, .. } => Some(*host),
            _ => None,
        }
    }

    /// `new Type(args)` for a class not yet in the source
    pub fn constructor_source(class: &str, bindings: &Bindings) -> String {
        format!("new {}({})", short_class(class), bindings.args.join(", "))
    }

    /// Source text that produces the object
    pub fn construction_source(&self, class: &str, bindings: &Bindings) -> String {
        let args = bindings.args.join(", ");
        let qualified = |member: String| match &bindings.host {
            Some(host) if host != "this" => format!("{}.{}", host, member),
            _ => member,
        };
        match self {
            CreationStrategy::Constructor { .. } => Self::constructor_source(class, bindings),
            CreationStrategy::Factory { host, method, .. } => match host {
                FactoryHost::Class(host) => format!("{}.{}({})", short_class(host), method, args),
                FactoryHost::Node(_) => qualified(format!("{}({})", method, args)),
            },
            CreationStrategy::Exposed { accessor, .. } => match accessor {
                ExposedAccessor::Getter(getter) => qualified(format!("{}()", getter)),
                ExposedAccessor::Field(field) => qualified(field.clone()),
            },
            CreationStrategy::MethodParameter { .. } => bindings.name.clone().unwrap_or_default(),
            CreationStrategy::This => "this".to_string(),
            CreationStrategy::VoidInvocation { method, .. } => qualified(format!("{}({})", method, args)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expression() -> SyntaxId {
        crate::parser::parse("class A { }")
            .map(|unit| crate::syntax::SyntaxTree::from_unit(&unit, 11).root())
            .expect("Should parse")
    }

    #[test]
    fn test_construction_sources() {
        let expression = expression();
        let ctor = CreationStrategy::Constructor { expression };
        assert_eq!(
            ctor.construction_source("org.eclipse.swt.widgets.Button", &Bindings::args(["shell", "SWT.NONE"])),
            "new Button(shell, SWT.NONE)"
        );

        let factory = CreationStrategy::Factory {
            host: FactoryHost::Class("javax.swing.Box".to_string()),
            method: "createVerticalBox".to_string(),
            expression,
        };
        assert_eq!(
            factory.construction_source("Box", &Bindings::default()),
            "Box.createVerticalBox()"
        );

        let exposed = CreationStrategy::Exposed {
            host: NodeId(0),
            accessor: ExposedAccessor::Getter("getContentPane".to_string()),
        };
        assert_eq!(
            exposed.construction_source("JPanel", &Bindings::default().with_host("this")),
            "getContentPane()"
        );
        assert_eq!(
            exposed.construction_source("JPanel", &Bindings::default().with_host("frame")),
            "frame.getContentPane()"
        );
    }

    #[test]
    fn test_capabilities() {
        let expression = expression();
        let ctor = CreationStrategy::Constructor { expression };
        assert!(ctor.can_reorder() && ctor.can_reparent());

        let item = CreationStrategy::Factory {
            host: FactoryHost::Node(NodeId(1)),
            method: "add".to_string(),
            expression,
        };
        assert!(item.can_reorder());
        assert!(!item.can_reparent());

        let void = CreationStrategy::VoidInvocation {
            host: NodeId(1),
            method: "addSeparator".to_string(),
            expression,
        };
        assert!(void.can_reorder() && !void.can_reparent());
        assert!(!CreationStrategy::This.can_reorder());
    }
}
