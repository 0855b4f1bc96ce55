//! Syntax arena, lexical scopes and execution flow

pub mod flow;
pub mod scope;
mod tree;

pub use flow::ExecutionFlow;
pub use scope::Binding;
pub use tree::{Invocation, SyntaxId, SyntaxKind, SyntaxNode, SyntaxTree};
