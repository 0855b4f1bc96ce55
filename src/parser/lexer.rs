//! Lexer for the designer's Java-like source subset using logos

use logos::Logos;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r]+")]
pub enum Token {
    // Unit keywords
    #[token("package")]
    Package,
    #[token("import")]
    Import,
    #[token("class")]
    Class,
    #[token("extends")]
    Extends,

    // Modifiers
    #[token("public")]
    Public,
    #[token("protected")]
    Protected,
    #[token("private")]
    Private,
    #[token("static")]
    Static,
    #[token("final")]
    Final,

    // Statement and expression keywords
    #[token("void")]
    Void,
    #[token("new")]
    New,
    #[token("this")]
    This,
    #[token("super")]
    Super,
    #[token("return")]
    Return,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("null")]
    Null,
    #[token("true")]
    True,
    #[token("false")]
    False,

    // Operators (longer patterns first)
    #[token("==")]
    EqualsEquals,
    #[token("!=")]
    NotEquals,
    #[token("=")]
    Equals,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,

    // Delimiters
    #[token("{")]
    BraceOpen,
    #[token("}")]
    BraceClose,
    #[token("(")]
    ParenOpen,
    #[token(")")]
    ParenClose,
    #[token("[")]
    BracketOpen,
    #[token("]")]
    BracketClose,
    #[token(";")]
    Semicolon,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,

    // Literals - identifiers must come after keywords
    #[regex(r"[a-zA-Z_$][a-zA-Z0-9_$]*", |lex| lex.slice().to_string(), priority = 1)]
    Ident(String),

    #[regex(r#""([^"\\]|\\.)*""#, |lex| lex.slice().to_string())]
    String(String),

    #[regex(r"'([^'\\]|\\.)'", |lex| lex.slice().to_string())]
    Char(String),

    #[regex(r"[0-9]+(\.[0-9]+)?[fFdDlL]?", |lex| lex.slice().to_string())]
    Number(String),

    // Annotations carry no meaning for the designer
    #[regex(r"@[a-zA-Z_][a-zA-Z0-9_.]*", logos::skip)]
    Annotation,

    // Comments (skip)
    #[regex(r"//[^\n]*", logos::skip)]
    LineComment,

    #[regex(r"/\*([^*]|\*+[^*/])*\*+/", logos::skip)]
    BlockComment,
}

impl Token {
    /// Source text of keyword and punctuation tokens, used in diagnostics
    pub fn describe(&self) -> String {
        match self {
            Token::Ident(s) => format!("identifier '{}'", s),
            Token::String(s) => format!("string {}", s),
            Token::Char(s) => format!("char {}", s),
            Token::Number(n) => format!("number {}", n),
            Token::Package => "keyword 'package'".to_string(),
            Token::Import => "keyword 'import'".to_string(),
            Token::Class => "keyword 'class'".to_string(),
            Token::Extends => "keyword 'extends'".to_string(),
            Token::Public => "keyword 'public'".to_string(),
            Token::Protected => "keyword 'protected'".to_string(),
            Token::Private => "keyword 'private'".to_string(),
            Token::Static => "keyword 'static'".to_string(),
            Token::Final => "keyword 'final'".to_string(),
            Token::Void => "keyword 'void'".to_string(),
            Token::New => "keyword 'new'".to_string(),
            Token::This => "keyword 'this'".to_string(),
            Token::Super => "keyword 'super'".to_string(),
            Token::Return => "keyword 'return'".to_string(),
            Token::If => "keyword 'if'".to_string(),
            Token::Else => "keyword 'else'".to_string(),
            Token::Null => "'null'".to_string(),
            Token::True => "'true'".to_string(),
            Token::False => "'false'".to_string(),
            Token::EqualsEquals => "'=='".to_string(),
            Token::NotEquals => "'!='".to_string(),
            Token::Equals => "'='".to_string(),
            Token::Plus => "'+'".to_string(),
            Token::Minus => "'-'".to_string(),
            Token::Star => "'*'".to_string(),
            Token::BraceOpen => "'{'".to_string(),
            Token::BraceClose => "'}'".to_string(),
            Token::ParenOpen => "'('".to_string(),
            Token::ParenClose => "')'".to_string(),
            Token::BracketOpen => "'['".to_string(),
            Token::BracketClose => "']'".to_string(),
            Token::Semicolon => "';'".to_string(),
            Token::Comma => "','".to_string(),
            Token::Dot => "'.'".to_string(),
            other => format!("{:?}", other),
        }
    }
}

/// Lex input string into tokens with spans
pub fn lex(input: &str) -> impl Iterator<Item = (Token, Span)> + '_ {
    Token::lexer(input)
        .spanned()
        .filter_map(|(tok, span)| tok.ok().map(|t| (t, span)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_header() {
        let tokens: Vec<_> = lex("public class Panel extends JPanel {")
            .map(|(t, _)| t)
            .collect();
        assert_eq!(
            tokens,
            vec![
                Token::Public,
                Token::Class,
                Token::Ident("Panel".to_string()),
                Token::Extends,
                Token::Ident("JPanel".to_string()),
                Token::BraceOpen
            ]
        );
    }

    #[test]
    fn test_operators() {
        let tokens: Vec<_> = lex("== != = + -").map(|(t, _)| t).collect();
        assert_eq!(
            tokens,
            vec![
                Token::EqualsEquals,
                Token::NotEquals,
                Token::Equals,
                Token::Plus,
                Token::Minus
            ]
        );
    }

    #[test]
    fn test_literals_keep_source_text() {
        let tokens: Vec<_> = lex(r#""OK" 'c' 12 3.5f"#).map(|(t, _)| t).collect();
        assert_eq!(
            tokens,
            vec![
                Token::String("\"OK\"".to_string()),
                Token::Char("'c'".to_string()),
                Token::Number("12".to_string()),
                Token::Number("3.5f".to_string())
            ]
        );
    }

    #[test]
    fn test_comments_and_annotations_skipped() {
        let tokens: Vec<_> = lex("/** doc */ @Override // line\nvoid")
            .map(|(t, _)| t)
            .collect();
        assert_eq!(tokens, vec![Token::Void]);
    }

    #[test]
    fn test_spans() {
        let spans: Vec<_> = lex("a.b();").map(|(_, s)| s).collect();
        assert_eq!(spans, vec![0..1, 1..2, 2..3, 3..4, 4..5, 5..6]);
    }
}
