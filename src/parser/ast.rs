//! Abstract Syntax Tree types for the Java-like source subset

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// AST node with source location
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}

/// Valid identifier (letters, digits, `_` and `$`, not starting with a digit)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier(pub String);

impl Identifier {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Declaration modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    Public,
    Protected,
    Private,
    Static,
    Final,
}

impl Modifier {
    pub fn keyword(&self) -> &'static str {
        match self {
            Modifier::Public => "public",
            Modifier::Protected => "protected",
            Modifier::Private => "private",
            Modifier::Static => "static",
            Modifier::Final => "final",
        }
    }
}

/// Type reference: a possibly qualified name with array dimensions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRef {
    pub name: String,
    pub dimensions: usize,
}

impl TypeRef {
    pub fn simple(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dimensions: 0,
        }
    }
}

impl std::fmt::Display for TypeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)?;
        for _ in 0..self.dimensions {
            write!(f, "[]")?;
        }
        Ok(())
    }
}

/// Root AST node - one source file
#[derive(Debug, Clone, PartialEq)]
pub struct CompilationUnit {
    pub package: Option<Spanned<String>>,
    pub imports: Vec<Spanned<String>>,
    pub class: Spanned<ClassDecl>,
}

/// The single class declared by a unit
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    pub modifiers: Vec<Modifier>,
    pub name: Spanned<Identifier>,
    pub superclass: Option<Spanned<TypeRef>>,
    pub members: Vec<Spanned<Member>>,
}

/// Class body declaration
#[derive(Debug, Clone, PartialEq)]
pub enum Member {
    Field(FieldDecl),
    Method(MethodDecl),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    pub modifiers: Vec<Modifier>,
    pub ty: Spanned<TypeRef>,
    pub name: Spanned<Identifier>,
    pub initializer: Option<Spanned<Expr>>,
}

/// Return type of a method; constructors have none
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnType {
    Constructor,
    Void,
    Type(TypeRef),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodDecl {
    pub modifiers: Vec<Modifier>,
    pub return_type: ReturnType,
    pub name: Spanned<Identifier>,
    pub params: Vec<Spanned<Param>>,
    pub body: Spanned<Block>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub ty: Spanned<TypeRef>,
    pub name: Spanned<Identifier>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub statements: Vec<Spanned<Stmt>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// Nested block: `{ ... }`
    Block(Block),
    /// Local declaration: `Type name = value;`
    LocalDecl {
        ty: Spanned<TypeRef>,
        name: Spanned<Identifier>,
        initializer: Option<Spanned<Expr>>,
    },
    /// Expression statement: `call();`
    Expr(Spanned<Expr>),
    /// Assignment statement: `target = value;`
    Assign {
        target: Spanned<Expr>,
        value: Spanned<Expr>,
    },
    /// `if (condition) then [else otherwise]`
    If {
        condition: Spanned<Expr>,
        then_branch: Box<Spanned<Stmt>>,
        else_branch: Option<Box<Spanned<Stmt>>>,
    },
    /// `return [value];`
    Return(Option<Spanned<Expr>>),
}

/// Binary operators understood by the designer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Equal,
    NotEqual,
    Add,
    Multiply,
}

impl BinaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::Add => "+",
            BinaryOp::Multiply => "*",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// `new Type(args)`
    New {
        ty: Spanned<TypeRef>,
        args: Vec<Spanned<Expr>>,
    },
    /// `[target.]name(args)`; `super(..)` and `this(..)` use the keyword as name
    Invoke {
        target: Option<Box<Spanned<Expr>>>,
        name: Spanned<Identifier>,
        args: Vec<Spanned<Expr>>,
    },
    /// `target.name`
    FieldAccess {
        target: Box<Spanned<Expr>>,
        name: Spanned<Identifier>,
    },
    Name(Identifier),
    This,
    /// Literal kept as source text
    Literal(String),
    Paren(Box<Spanned<Expr>>),
    Cast {
        ty: Spanned<TypeRef>,
        expr: Box<Spanned<Expr>>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Spanned<Expr>>,
        rhs: Box<Spanned<Expr>>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_ref_display() {
        assert_eq!(TypeRef::simple("JButton").to_string(), "JButton");
        let array = TypeRef {
            name: "String".to_string(),
            dimensions: 1,
        };
        assert_eq!(array.to_string(), "String[]");
    }

    #[test]
    fn test_modifier_keywords() {
        assert_eq!(Modifier::Private.keyword(), "private");
        assert_eq!(Modifier::Static.keyword(), "static");
    }
}
