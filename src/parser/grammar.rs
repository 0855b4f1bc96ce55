//! Parser implementation using chumsky

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use crate::parser::ast::*;
use crate::parser::lexer::Token;

/// Lex `$input`, run `$parser` to the end of input and convert errors
macro_rules! parse_with {
    ($input:expr, $parser:expr) => {{
        let input: &str = $input;
        let len = input.len();

        // Create a logos lexer and convert to token stream
        let token_iter = crate::parser::lexer::lex(input).map(|(tok, span)| (tok, span.into()));

        // Turn the token iterator into a stream that chumsky can use
        let token_stream = Stream::from_iter(token_iter)
            // Split (Token, SimpleSpan) into token and span parts
            .map((len..len).into(), |(t, s): (_, _)| (t, s));

        $parser
            .then_ignore(end())
            .parse(token_stream)
            .into_result()
            .map_err(|errs| {
                errs.into_iter()
                    .map(|e| e.into())
                    .collect::<Vec<crate::ParseError>>()
            })
    }};
}

/// Parse a complete source file
pub fn parse(input: &str) -> Result<CompilationUnit, Vec<crate::ParseError>> {
    parse_with!(input, unit_parser())
}

/// Parse a single statement, as inserted by the editor
pub fn parse_statement(input: &str) -> Result<Spanned<Stmt>, Vec<crate::ParseError>> {
    parse_with!(input, statement_parser())
}

/// Parse a single expression
pub fn parse_expression(input: &str) -> Result<Spanned<Expr>, Vec<crate::ParseError>> {
    parse_with!(input, expression_parser())
}

/// Parse a single class member (field, constructor or method)
pub fn parse_member(input: &str) -> Result<Spanned<Member>, Vec<crate::ParseError>> {
    parse_with!(input, member_parser())
}

/// Helper to extract span range from chumsky's MapExtra
fn span_range(e: &impl chumsky::span::Span<Offset = usize>) -> std::ops::Range<usize> {
    e.start()..e.end()
}

fn identifier<'a, I>() -> impl Parser<'a, I, Spanned<Identifier>, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    select! {
        Token::Ident(s) => Identifier::new(s),
    }
    .map_with(|id, e| Spanned::new(id, span_range(&e.span())))
}

fn type_ref<'a, I>() -> impl Parser<'a, I, Spanned<TypeRef>, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    let segment = select! { Token::Ident(s) => s };

    segment
        .separated_by(just(Token::Dot))
        .at_least(1)
        .collect::<Vec<_>>()
        .then(
            just(Token::BracketOpen)
                .then(just(Token::BracketClose))
                .repeated()
                .collect::<Vec<_>>(),
        )
        .map_with(|(segments, dims), e| {
            Spanned::new(
                TypeRef {
                    name: segments.join("."),
                    dimensions: dims.len(),
                },
                span_range(&e.span()),
            )
        })
}

fn modifiers<'a, I>() -> impl Parser<'a, I, Vec<Modifier>, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    choice((
        just(Token::Public).to(Modifier::Public),
        just(Token::Protected).to(Modifier::Protected),
        just(Token::Private).to(Modifier::Private),
        just(Token::Static).to(Modifier::Static),
        just(Token::Final).to(Modifier::Final),
    ))
    .repeated()
    .collect::<Vec<_>>()
}

/// Left-fold a chain of binary operands into nested `Expr::Binary`
fn fold_binary((first, rest): (Spanned<Expr>, Vec<(BinaryOp, Spanned<Expr>)>)) -> Spanned<Expr> {
    rest.into_iter().fold(first, |lhs, (op, rhs)| {
        let span = lhs.span.start..rhs.span.end;
        Spanned::new(
            Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
            span,
        )
    })
}

fn expression_parser<'a, I>() -> impl Parser<'a, I, Spanned<Expr>, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    recursive(|expr| {
        let args = expr
            .clone()
            .separated_by(just(Token::Comma))
            .collect::<Vec<_>>()
            .delimited_by(just(Token::ParenOpen), just(Token::ParenClose));

        let literal = select! {
            Token::String(s) => s,
            Token::Char(s) => s,
            Token::Number(n) => n,
            Token::True => "true".to_string(),
            Token::False => "false".to_string(),
            Token::Null => "null".to_string(),
        }
        .or(just(Token::Minus)
            .ignore_then(select! { Token::Number(n) => n })
            .map(|n| format!("-{}", n)))
        .map_with(|lit, e| Spanned::new(Expr::Literal(lit), span_range(&e.span())));

        // Constructor invocation: new Type(args)
        let new_expr = just(Token::New)
            .ignore_then(type_ref())
            .then(args.clone())
            .map_with(|(ty, args), e| Spanned::new(Expr::New { ty, args }, span_range(&e.span())));

        // Unqualified call, including super(..) and this(..)
        let call_name = choice((
            identifier(),
            just(Token::Super)
                .map_with(|_, e| Spanned::new(Identifier::new("super"), span_range(&e.span()))),
            just(Token::This)
                .map_with(|_, e| Spanned::new(Identifier::new("this"), span_range(&e.span()))),
        ));
        let call = call_name
            .then(args.clone())
            .map_with(|(name, args), e| {
                Spanned::new(
                    Expr::Invoke {
                        target: None,
                        name,
                        args,
                    },
                    span_range(&e.span()),
                )
            });

        let this = just(Token::This).map_with(|_, e| Spanned::new(Expr::This, span_range(&e.span())));

        let name = identifier().map(|id| Spanned::new(Expr::Name(id.node), id.span));

        let paren = expr
            .clone()
            .delimited_by(just(Token::ParenOpen), just(Token::ParenClose))
            .map_with(|inner, e| Spanned::new(Expr::Paren(Box::new(inner)), span_range(&e.span())));

        let atom = choice((literal, new_expr, call, this, name, paren));

        // Member selection: .name or .name(args)
        let member = just(Token::Dot)
            .ignore_then(identifier())
            .then(args.clone().or_not())
            .map_with(|(name, args), e| (name, args, span_range(&e.span())));

        let postfix = atom
            .then(member.repeated().collect::<Vec<_>>())
            .map(|(first, rest)| {
                rest.into_iter().fold(first, |target, (name, args, span)| {
                    let full = target.span.start..span.end;
                    match args {
                        Some(args) => Spanned::new(
                            Expr::Invoke {
                                target: Some(Box::new(target)),
                                name,
                                args,
                            },
                            full,
                        ),
                        None => Spanned::new(
                            Expr::FieldAccess {
                                target: Box::new(target),
                                name,
                            },
                            full,
                        ),
                    }
                })
            });

        // Cast: (Type) operand - tried before a parenthesized expression
        let cast = type_ref()
            .delimited_by(just(Token::ParenOpen), just(Token::ParenClose))
            .then(postfix.clone())
            .map_with(|(ty, inner), e| {
                Spanned::new(
                    Expr::Cast {
                        ty,
                        expr: Box::new(inner),
                    },
                    span_range(&e.span()),
                )
            });

        let unary = cast.or(postfix);

        let product = unary
            .clone()
            .then(
                just(Token::Star)
                    .to(BinaryOp::Multiply)
                    .then(unary)
                    .repeated()
                    .collect::<Vec<_>>(),
            )
            .map(fold_binary);

        let sum = product
            .clone()
            .then(
                just(Token::Plus)
                    .to(BinaryOp::Add)
                    .then(product)
                    .repeated()
                    .collect::<Vec<_>>(),
            )
            .map(fold_binary);

        let equality_op = choice((
            just(Token::EqualsEquals).to(BinaryOp::Equal),
            just(Token::NotEquals).to(BinaryOp::NotEqual),
        ));

        sum.clone()
            .then(equality_op.then(sum).repeated().collect::<Vec<_>>())
            .map(fold_binary)
            .boxed()
    })
}

fn statement_parser<'a, I>() -> impl Parser<'a, I, Spanned<Stmt>, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    let expr = expression_parser();

    recursive(|stmt| {
        let block = stmt
            .clone()
            .repeated()
            .collect::<Vec<_>>()
            .delimited_by(just(Token::BraceOpen), just(Token::BraceClose))
            .map(|statements| Stmt::Block(Block { statements }));

        let if_stmt = just(Token::If)
            .ignore_then(
                expr.clone()
                    .delimited_by(just(Token::ParenOpen), just(Token::ParenClose)),
            )
            .then(stmt.clone())
            .then(just(Token::Else).ignore_then(stmt.clone()).or_not())
            .map(|((condition, then_branch), else_branch)| Stmt::If {
                condition,
                then_branch: Box::new(then_branch),
                else_branch: else_branch.map(Box::new),
            });

        let return_stmt = just(Token::Return)
            .ignore_then(expr.clone().or_not())
            .then_ignore(just(Token::Semicolon))
            .map(Stmt::Return);

        // Local declaration: [final] Type name [= value];
        let local_decl = just(Token::Final)
            .or_not()
            .ignore_then(type_ref())
            .then(identifier())
            .then(just(Token::Equals).ignore_then(expr.clone()).or_not())
            .then_ignore(just(Token::Semicolon))
            .map(|((ty, name), initializer)| Stmt::LocalDecl {
                ty,
                name,
                initializer,
            });

        let assign = expr
            .clone()
            .then_ignore(just(Token::Equals))
            .then(expr.clone())
            .then_ignore(just(Token::Semicolon))
            .map(|(target, value)| Stmt::Assign { target, value });

        let expr_stmt = expr
            .clone()
            .then_ignore(just(Token::Semicolon))
            .map(Stmt::Expr);

        // Order matters: declarations before assignments before bare expressions,
        // since all three can start with an identifier.
        choice((block, if_stmt, return_stmt, local_decl, assign, expr_stmt))
            .map_with(|s, e| Spanned::new(s, span_range(&e.span())))
            .boxed()
    })
}

fn block_parser<'a, I>() -> impl Parser<'a, I, Spanned<Block>, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    statement_parser()
        .repeated()
        .collect::<Vec<_>>()
        .delimited_by(just(Token::BraceOpen), just(Token::BraceClose))
        .map_with(|statements, e| Spanned::new(Block { statements }, span_range(&e.span())))
}

/// Helper enum for the part of a member following its modifiers
#[derive(Debug, Clone)]
enum MemberBody {
    Method {
        return_type: ReturnType,
        name: Spanned<Identifier>,
        params: Vec<Spanned<Param>>,
        body: Spanned<Block>,
    },
    Field {
        ty: Spanned<TypeRef>,
        name: Spanned<Identifier>,
        initializer: Option<Spanned<Expr>>,
    },
}

fn member_parser<'a, I>() -> impl Parser<'a, I, Spanned<Member>, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    let param = type_ref()
        .then(identifier())
        .map_with(|(ty, name), e| Spanned::new(Param { ty, name }, span_range(&e.span())));

    let params = param
        .separated_by(just(Token::Comma))
        .collect::<Vec<_>>()
        .delimited_by(just(Token::ParenOpen), just(Token::ParenClose));

    let constructor = identifier()
        .then(params.clone())
        .then(block_parser())
        .map(|((name, params), body)| MemberBody::Method {
            return_type: ReturnType::Constructor,
            name,
            params,
            body,
        });

    let return_type = choice((
        just(Token::Void).to(ReturnType::Void),
        type_ref().map(|t| ReturnType::Type(t.node)),
    ));

    let method = return_type
        .then(identifier())
        .then(params)
        .then(block_parser())
        .map(|(((return_type, name), params), body)| MemberBody::Method {
            return_type,
            name,
            params,
            body,
        });

    let field = type_ref()
        .then(identifier())
        .then(just(Token::Equals).ignore_then(expression_parser()).or_not())
        .then_ignore(just(Token::Semicolon))
        .map(|((ty, name), initializer)| MemberBody::Field {
            ty,
            name,
            initializer,
        });

    modifiers()
        .then(choice((constructor, method, field)))
        .map_with(|(modifiers, body), e| {
            let member = match body {
                MemberBody::Method {
                    return_type,
                    name,
                    params,
                    body,
                } => Member::Method(MethodDecl {
                    modifiers,
                    return_type,
                    name,
                    params,
                    body,
                }),
                MemberBody::Field {
                    ty,
                    name,
                    initializer,
                } => Member::Field(FieldDecl {
                    modifiers,
                    ty,
                    name,
                    initializer,
                }),
            };
            Spanned::new(member, span_range(&e.span()))
        })
        .boxed()
}

fn unit_parser<'a, I>() -> impl Parser<'a, I, CompilationUnit, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    let segment = choice((
        select! { Token::Ident(s) => s },
        just(Token::Star).to("*".to_string()),
    ));

    let qualified = select! { Token::Ident(s) => s }
        .then(just(Token::Dot).ignore_then(segment).repeated().collect::<Vec<_>>())
        .map_with(|(first, rest), e| {
            let name = std::iter::once(first)
                .chain(rest)
                .collect::<Vec<_>>()
                .join(".");
            Spanned::new(name, span_range(&e.span()))
        });

    let package = just(Token::Package)
        .ignore_then(qualified.clone())
        .then_ignore(just(Token::Semicolon));

    let import = just(Token::Import)
        .ignore_then(just(Token::Static).or_not())
        .ignore_then(qualified)
        .then_ignore(just(Token::Semicolon));

    let class = modifiers()
        .then_ignore(just(Token::Class))
        .then(identifier())
        .then(just(Token::Extends).ignore_then(type_ref()).or_not())
        .then(
            member_parser()
                .repeated()
                .collect::<Vec<_>>()
                .delimited_by(just(Token::BraceOpen), just(Token::BraceClose)),
        )
        .map_with(|(((modifiers, name), superclass), members), e| {
            Spanned::new(
                ClassDecl {
                    modifiers,
                    name,
                    superclass,
                    members,
                },
                span_range(&e.span()),
            )
        });

    package
        .or_not()
        .then(import.repeated().collect::<Vec<_>>())
        .then(class)
        .map(|((package, imports), class)| CompilationUnit {
            package,
            imports,
            class,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn members(unit: &CompilationUnit) -> &[Spanned<Member>] {
        &unit.class.node.members
    }

    #[test]
    fn test_parse_minimal_class() {
        let unit = parse("public class Panel extends JPanel { }").expect("Should parse");
        assert_eq!(unit.class.node.name.node.as_str(), "Panel");
        assert_eq!(
            unit.class.node.superclass.as_ref().map(|s| s.node.name.as_str()),
            Some("JPanel")
        );
        assert!(members(&unit).is_empty());
    }

    #[test]
    fn test_parse_package_and_imports() {
        let unit = parse(
            "package demo.ui;\nimport javax.swing.*;\nimport java.awt.BorderLayout;\nclass A { }",
        )
        .expect("Should parse");
        assert_eq!(unit.package.as_ref().map(|p| p.node.as_str()), Some("demo.ui"));
        let imports: Vec<_> = unit.imports.iter().map(|i| i.node.as_str()).collect();
        assert_eq!(imports, vec!["javax.swing.*", "java.awt.BorderLayout"]);
    }

    #[test]
    fn test_parse_members() {
        let unit = parse(
            r#"class A extends JPanel {
                private JButton button;
                private JLabel label = new JLabel("x");
                public A() { super(); }
                private JButton getButton() { return button; }
                public static void main(String[] args) { }
            }"#,
        )
        .expect("Should parse");
        let members = members(&unit);
        assert_eq!(members.len(), 5);
        match &members[1].node {
            Member::Field(f) => {
                assert_eq!(f.name.node.as_str(), "label");
                assert!(f.initializer.is_some());
            }
            _ => panic!("Expected field"),
        }
        match &members[2].node {
            Member::Method(m) => assert_eq!(m.return_type, ReturnType::Constructor),
            _ => panic!("Expected constructor"),
        }
        match &members[4].node {
            Member::Method(m) => {
                assert!(m.modifiers.contains(&Modifier::Static));
                assert_eq!(m.params[0].node.ty.node.dimensions, 1);
            }
            _ => panic!("Expected method"),
        }
    }

    #[test]
    fn test_parse_statement_kinds() {
        let decl = parse_statement("JButton button = new JButton(\"OK\");").expect("Should parse");
        assert!(matches!(decl.node, Stmt::LocalDecl { .. }));

        let call = parse_statement("button.setText(\"x\");").expect("Should parse");
        assert!(matches!(call.node, Stmt::Expr(_)));

        let assign = parse_statement("button = new JButton();").expect("Should parse");
        assert!(matches!(assign.node, Stmt::Assign { .. }));

        let cond = parse_statement("if (button == null) { button = new JButton(); }")
            .expect("Should parse");
        assert!(matches!(cond.node, Stmt::If { .. }));
    }

    #[test]
    fn test_parse_invocation_chain() {
        let expr = parse_expression("getContentPane().add(new JButton())").expect("Should parse");
        match expr.node {
            Expr::Invoke { target, name, args } => {
                assert_eq!(name.node.as_str(), "add");
                assert_eq!(args.len(), 1);
                assert!(matches!(
                    target.map(|t| t.node),
                    Some(Expr::Invoke { .. })
                ));
            }
            _ => panic!("Expected invocation"),
        }
    }

    #[test]
    fn test_parse_cast_and_paren() {
        let cast = parse_expression("(JButton) factory.create()").expect("Should parse");
        assert!(matches!(cast.node, Expr::Cast { .. }));

        let paren = parse_expression("(button)").expect("Should parse");
        assert!(matches!(paren.node, Expr::Paren(_)));
    }

    #[test]
    fn test_parse_spans_cover_source() {
        let source = "add(new JButton());";
        let stmt = parse_statement(source).expect("Should parse");
        assert_eq!(stmt.span, 0..source.len());
        match stmt.node {
            Stmt::Expr(expr) => match expr.node {
                Expr::Invoke { args, .. } => assert_eq!(&source[args[0].span.clone()], "new JButton()"),
                _ => panic!("Expected invocation"),
            },
            _ => panic!("Expected expression statement"),
        }
    }

    #[test]
    fn test_parse_error_reports_position() {
        let errors = parse("class A { void f() { button.; } }").unwrap_err();
        assert!(!errors.is_empty());
    }
}
