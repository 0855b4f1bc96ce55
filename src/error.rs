//! Error types for parsing and structural editing

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

use crate::config::ConfigError;
use crate::descriptor::CatalogError;
use crate::model::NodeId;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Parse error at {span:?}: {message}")]
    Syntax {
        span: Span,
        message: String,
        expected: Vec<String>,
    },
}

impl ParseError {
    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        let mut buf = Vec::new();
        match self {
            ParseError::Syntax {
                span,
                message,
                expected,
            } => {
                let expected_str = if expected.is_empty() {
                    String::new()
                } else {
                    format!("\nExpected: {}", expected.join(", "))
                };

                let written = Report::build(ReportKind::Error, filename, span.start)
                    .with_message(message)
                    .with_label(
                        Label::new((filename, span.clone()))
                            .with_message(format!("{}{}", message, expected_str))
                            .with_color(Color::Red),
                    )
                    .finish()
                    .write((filename, Source::from(source)), &mut buf);
                if written.is_err() {
                    return self.to_string();
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    pub fn span(&self) -> &Span {
        match self {
            ParseError::Syntax { span, .. } => span,
        }
    }
}

impl<'a> From<chumsky::error::Rich<'a, crate::parser::lexer::Token>> for ParseError {
    fn from(err: chumsky::error::Rich<'a, crate::parser::lexer::Token>) -> Self {
        use chumsky::error::RichReason;

        let message = match err.reason() {
            RichReason::ExpectedFound { found, .. } => match found {
                Some(tok) => format!("Unexpected {}", tok.describe()),
                None => "Unexpected end of input".to_string(),
            },
            RichReason::Custom(msg) => msg.to_string(),
        };

        let expected: Vec<String> = err
            .expected()
            .filter_map(|e| match e {
                chumsky::error::RichPattern::Token(tok) => Some(tok.describe()),
                chumsky::error::RichPattern::Label(label) => Some(label.to_string()),
                chumsky::error::RichPattern::EndOfInput => Some("end of input".to_string()),
                chumsky::error::RichPattern::Identifier(s) => Some(format!("identifier '{}'", s)),
                chumsky::error::RichPattern::Any => Some("any token".to_string()),
                chumsky::error::RichPattern::SomethingElse => None,
            })
            .collect();

        ParseError::Syntax {
            span: err.span().into_range(),
            message,
            expected,
        }
    }
}

/// Diagnostic codes for binding failures
pub mod codes {
    /// A creation expression could not be attached to any parent
    pub const UNATTACHED_CREATION: &str = "E-BIND-001";
    /// A syntax reference no longer resolves to live source
    pub const STALE_REFERENCE: &str = "E-BIND-002";
    /// An association or construction template is malformed
    pub const BAD_TEMPLATE: &str = "E-BIND-003";
    /// A handle cannot be referenced from the requested location
    pub const UNREACHABLE: &str = "E-BIND-004";
}

/// Non-fatal finding recorded while binding source to the object model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub code: &'static str,
    pub message: String,
    pub span: Span,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {} at {:?}", self.code, self.message, self.span)
    }
}

/// Errors raised by structural edits and session operations
#[derive(Debug, Error)]
pub enum DesignError {
    /// Source text (or generated code) failed to parse
    #[error("parse errors: {}", format_parse_errors(.0))]
    Parse(Vec<ParseError>),

    /// Operation not supported by the node's current strategy
    #[error("unsupported operation '{operation}' for {state}")]
    Unsupported {
        operation: &'static str,
        state: String,
    },

    /// Syntax could not be bound to a known construct
    #[error("binding failure [{code}]: {message}")]
    Binding { code: &'static str, message: String },

    /// A listener rejected the edit
    #[error("{event} vetoed: {reason}")]
    Vetoed { event: &'static str, reason: String },

    #[error("unknown node {0:?}")]
    UnknownNode(NodeId),

    #[error("unknown component '{0}'")]
    UnknownComponent(String),

    #[error("invalid target: {0}")]
    InvalidTarget(String),

    #[error("component '{0}' cannot contain children")]
    NotContainer(String),

    #[error("cannot move a node into its own subtree")]
    CyclicMove,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl DesignError {
    /// Create a capability violation error
    pub fn unsupported(operation: &'static str, state: impl Into<String>) -> Self {
        Self::Unsupported {
            operation,
            state: state.into(),
        }
    }

    /// Create a binding failure with a diagnostic code
    pub fn binding(code: &'static str, message: impl Into<String>) -> Self {
        Self::Binding {
            code,
            message: message.into(),
        }
    }

    /// Create an invalid target error
    pub fn invalid_target(reason: impl Into<String>) -> Self {
        Self::InvalidTarget(reason.into())
    }

    /// Stale syntax reference
    pub fn stale(what: impl std::fmt::Display) -> Self {
        Self::binding(codes::STALE_REFERENCE, format!("{} is no longer in the source", what))
    }

    /// Diagnostic code, for binding failures
    pub fn code(&self) -> Option<&'static str> {
        match self {
            Self::Binding { code, .. } => Some(code),
            _ => None,
        }
    }
}

impl From<Vec<ParseError>> for DesignError {
    fn from(errors: Vec<ParseError>) -> Self {
        DesignError::Parse(errors)
    }
}

fn format_parse_errors(errors: &[ParseError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_display() {
        let err = DesignError::unsupported("set_name", "this");
        assert_eq!(err.to_string(), "unsupported operation 'set_name' for this");
    }

    #[test]
    fn test_binding_code() {
        let err = DesignError::binding(codes::UNATTACHED_CREATION, "new JButton()");
        assert_eq!(err.code(), Some("E-BIND-001"));
        assert!(err.to_string().contains("E-BIND-001"));
    }

    #[test]
    fn test_parse_error_format_mentions_file() {
        let err = ParseError::Syntax {
            span: 6..7,
            message: "Unexpected ';'".to_string(),
            expected: vec!["identifier".to_string()],
        };
        let report = err.format("class ;", "Panel.java");
        assert!(report.contains("Panel.java"));
        assert!(report.contains("Unexpected"));
    }
}
