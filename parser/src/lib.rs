//! # Parser
//!
//! A scanner and recursive-descent parser for message-send syntax.
//!
//! ## Architecture
//!
//! ```text
//!  &str source
//!      │
//!      ▼
//!  ┌────────┐    Vec<Token>     ┌────────┐    CodeBox (AST)
//!  │ Lexer  │ ────────────────▶ │ Parser │ ────────────────▶
//!  └────────┘  (ends with EOF)  └────────┘
//! ```
//!
//! ```rust
//! use parser::{parse_program, scan};
//!
//! let tokens = scan("x :at(1) + 2,").unwrap();
//! let program = parse_program(tokens).unwrap();
//! assert_eq!(
//!     program.body[0].to_string(),
//!     "(send (send (send self x) at 1) + 2)"
//! );
//! ```
//!
//! ## Grammar
//!
//! ```text
//! program        := (expression ',')* EOF
//! expression     := WS* primary WS* keyword-send* operator-send*
//! primary        := '(' expression ')' | symbol message-args | literal
//! literal        := INTEGER | STRING | object-literal
//! keyword-send   := ':' symbol message-args
//! operator-send  := operator-symbol WS* [expression]
//! message-args   := [':'] '(' expression (',' expression)* ')' | ε
//! object-literal := OBJECT_OPEN slot-def* [';' (expression ',')*] OBJECT_CLOSE
//! slot-def       := symbol '(' INTEGER ')' ['=' literal] ','
//! ```

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod span;
pub mod token;

pub use ast::{
    CodeBox, CompleteSymbol, Expr, ExprKind, LiteralBox, ObjectBox, SlotDef,
    SlotKind, UnfinishedSymbol,
};
pub use lexer::{Lexer, TokenizerError, scan};
pub use parser::{
    MAX_NESTING, Parser, ParserError, parse_expression, parse_program,
};
pub use span::{Pos, Span};
pub use token::{SymbolShape, Token, TokenKind};
