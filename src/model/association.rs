//! Associations: how a child is wired into its parent in source form

use crate::error::{codes, DesignError};
use crate::syntax::SyntaxId;

pub const PARENT_PLACEHOLDER: &str = "%parent%";
pub const CHILD_PLACEHOLDER: &str = "%child%";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Association {
    /// Child passed to a parent call built from a template
    InvocationArgument {
        invocation: SyntaxId,
        position: usize,
        template: String,
    },
    /// Parent passed to the child's constructor at `position`
    ConstructorParent { position: usize },
    /// The child's creating call on the parent is the attachment
    InvocationVoid,
    /// Structural only
    Implicit,
    /// Root
    Empty,
}

impl Association {
    pub fn kind(&self) -> &'static str {
        match self {
            Association::InvocationArgument { .. } => "invocation",
            Association::ConstructorParent { .. } => "constructor",
            Association::InvocationVoid => "void",
            Association::Implicit => "implicit",
            Association::Empty => "empty",
        }
    }

    /// Parent call carrying the child, if any
    pub fn invocation(&self) -> Option<SyntaxId> {
        match self {
            Association::InvocationArgument { invocation, .. } => Some(*invocation),
            _ => None,
        }
    }
}

/// Parsed `%parent%.method(args)` association template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssociationTemplate {
    source: String,
    method: String,
    child_index: usize,
    arity: usize,
}

impl AssociationTemplate {
    pub fn parse(template: &str) -> Result<Self, DesignError> {
        let bad = |why: &str| {
            DesignError::binding(codes::BAD_TEMPLATE, format!("template '{}' {}", template, why))
        };
        let source = template.trim().trim_end_matches(';').to_string();
        let rest = source
            .strip_prefix(PARENT_PLACEHOLDER)
            .and_then(|r| r.strip_prefix('.'))
            .ok_or_else(|| bad("must start with %parent%."))?;
        let open = rest.find('(').ok_or_else(|| bad("has no argument list"))?;
        let method = rest[..open].trim();
        if method.is_empty() || !method.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(bad("has an invalid method name"));
        }
        let args = rest[open + 1..]
            .strip_suffix(')')
            .ok_or_else(|| bad("has an unterminated argument list"))?;
        let args = split_arguments(args);
        let child_index = args
            .iter()
            .position(|a| a.trim() == CHILD_PLACEHOLDER)
            .ok_or_else(|| bad("does not pass %child%"))?;
        Ok(Self {
            method: method.to_string(),
            child_index,
            arity: args.len(),
            source,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn child_index(&self) -> usize {
        self.child_index
    }

    pub fn matches(&self, method: &str, arity: usize) -> bool {
        self.method == method && self.arity == arity
    }

    /// Statement attaching `child` to `parent`, and the offset of the child in it
    pub fn render(&self, parent: &str, child: &str) -> (String, usize) {
        let at = self.source.find(CHILD_PLACEHOLDER).unwrap_or(self.source.len());
        let head = self.source[..at].replace(PARENT_PLACEHOLDER, parent);
        let tail = self.source[at..]
            .replacen(CHILD_PLACEHOLDER, child, 1)
            .replace(PARENT_PLACEHOLDER, parent);
        let head = head.strip_prefix("this.").unwrap_or(&head).to_string();
        let offset = head.len();
        (format!("{}{};", head, tail), offset)
    }
}

/// Split a comma-separated argument list at top level
fn split_arguments(args: &str) -> Vec<String> {
    if args.trim().is_empty() {
        return Vec::new();
    }
    let mut out = Vec::new();
    let mut depth = 0usize;
    let mut current = String::new();
    for c in args.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                out.push(std::mem::take(&mut current));
                continue;
            }
            _ => {}
        }
        current.push(c);
    }
    out.push(current);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_template() {
        let template = AssociationTemplate::parse("%parent%.add(%child%, BorderLayout.CENTER)")
            .expect("Should parse");
        assert_eq!(template.method(), "add");
        assert_eq!(template.child_index(), 0);
        assert!(template.matches("add", 2));
        assert!(!template.matches("add", 1));
    }

    #[test]
    fn test_render_strips_this() {
        let template = AssociationTemplate::parse("%parent%.add(%child%)").expect("Should parse");
        assert_eq!(
            template.render("this", "new JButton()"),
            ("add(new JButton());".to_string(), 4)
        );
        assert_eq!(
            template.render("panel", "button"),
            ("panel.add(button);".to_string(), 10)
        );
    }

    #[test]
    fn test_bad_templates() {
        for bad in ["add(%child%)", "%parent%.add(x)", "%parent%.(%child%)", "%parent%.add(%child%"] {
            let err = AssociationTemplate::parse(bad).expect_err("Should reject");
            assert_eq!(err.code(), Some(codes::BAD_TEMPLATE));
        }
    }
}
