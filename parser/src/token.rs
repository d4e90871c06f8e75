//! Token types produced by the scanner.
use crate::span::Span;

/// Which character class a SYMBOL token was built from.
///
/// The grammar branches on this: keyword-shaped symbols name unary and
/// keyword messages, operator-shaped symbols start binary sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolShape {
    /// Letters, digits and `_`, not starting with a digit, e.g. `foo`, `at_put`.
    Keyword,
    /// Operator punctuation only, e.g. `+`, `<=`, `&&`.
    Operator,
}

/// The kind of a lexical token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Base-10 integer literal, e.g. `42`.
    Integer(i64),
    /// String literal (contents without surrounding quotes), e.g. `"hello"`.
    String(String),
    /// A selector name together with its shape.
    Symbol(String, SymbolShape),

    /// One of `(`, `[`, `{`.
    BracketOpen(char),
    /// One of `)`, `]`, `}`.
    BracketClose(char),
    /// An opening bracket immediately followed by `;`, e.g. `(;`.
    ObjectOpen,
    /// `;` immediately followed by a closing bracket, e.g. `;)`.
    ObjectClose,

    /// `:`
    Colon,
    /// `;`
    Semicolon,
    /// `,`
    Comma,
    /// A single space, tab, newline or carriage return.
    Whitespace(char),

    /// End of input.
    Eof,
}

impl TokenKind {
    pub const INTEGER: &'static str = "integer";
    pub const STRING: &'static str = "string";
    pub const SYMBOL: &'static str = "symbol";
    pub const KEYWORD_SYMBOL: &'static str = "keyword symbol";
    pub const OPERATOR_SYMBOL: &'static str = "operator symbol";
    pub const BRACKET_OPEN: &'static str = "opening bracket";
    pub const BRACKET_CLOSE: &'static str = "closing bracket";
    pub const OBJECT_OPEN: &'static str = "object open `(;`";
    pub const OBJECT_CLOSE: &'static str = "object close `;)`";
    pub const COLON: &'static str = "`:`";
    pub const SEMICOLON: &'static str = "`;`";
    pub const COMMA: &'static str = "`,`";
    pub const WHITESPACE: &'static str = "whitespace";
    pub const EOF: &'static str = "end of input";

    /// Human-readable name for error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Integer(_) => Self::INTEGER,
            Self::String(_) => Self::STRING,
            Self::Symbol(_, SymbolShape::Keyword) => Self::KEYWORD_SYMBOL,
            Self::Symbol(_, SymbolShape::Operator) => Self::OPERATOR_SYMBOL,
            Self::BracketOpen(_) => Self::BRACKET_OPEN,
            Self::BracketClose(_) => Self::BRACKET_CLOSE,
            Self::ObjectOpen => Self::OBJECT_OPEN,
            Self::ObjectClose => Self::OBJECT_CLOSE,
            Self::Colon => Self::COLON,
            Self::Semicolon => Self::SEMICOLON,
            Self::Comma => Self::COMMA,
            Self::Whitespace(_) => Self::WHITESPACE,
            Self::Eof => Self::EOF,
        }
    }

    pub fn is_whitespace(&self) -> bool {
        matches!(self, Self::Whitespace(_))
    }

    pub fn is_operator(&self) -> bool {
        matches!(self, Self::Symbol(_, SymbolShape::Operator))
    }

    /// Returns `true` if an expression may begin with this token.
    pub fn starts_expression(&self) -> bool {
        matches!(
            self,
            Self::Integer(_)
                | Self::String(_)
                | Self::Symbol(..)
                | Self::BracketOpen(_)
                | Self::ObjectOpen
        )
    }
}

/// A token with its source span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    /// The source text of this token.
    pub lexeme: String,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span, lexeme: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            lexeme: lexeme.into(),
        }
    }

    pub fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }

    /// Name plus lexeme where the name alone is ambiguous, e.g.
    /// `` keyword symbol `foo` ``.
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Integer(_)
            | TokenKind::String(_)
            | TokenKind::Symbol(..)
            | TokenKind::BracketOpen(_)
            | TokenKind::BracketClose(_) => {
                format!("{} `{}`", self.kind.name(), self.lexeme)
            }
            _ => self.kind.name().to_string(),
        }
    }
}
