//! Parser for the designer's Java-like source subset

pub mod ast;
mod grammar;
pub mod lexer;

pub use ast::*;
pub use grammar::{parse, parse_expression, parse_member, parse_statement};
