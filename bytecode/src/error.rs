use thiserror::Error;

use crate::op::Tag;

/// Failure while emitting a code object.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// The literal pool is addressed by a one-byte operand.
    #[error("too many literals in one code object (limit {limit})")]
    LiteralPoolOverflow { limit: usize },

    /// Symbols are stored one byte per character.
    #[error("symbol `{0}` contains non-ASCII characters")]
    NonAsciiSymbol(String),

    /// A selector was serialized before its arity was known.
    #[error("selector `{0}` has no arity")]
    UnfinishedSymbol(String),
}

/// Failure while reading a serialized literal block.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("unexpected end of input at byte {offset}")]
    UnexpectedEof { offset: usize },

    #[error("unknown literal tag 0x{tag:02x} at byte {offset}")]
    UnknownTag { tag: u8, offset: usize },

    #[error("expected {expected:?} block, found {found:?} at byte {offset}")]
    UnexpectedTag {
        expected: Tag,
        found: Tag,
        offset: usize,
    },

    #[error("unknown opcode 0x{op:02x} at instruction offset {offset}")]
    UnknownOpcode { op: u8, offset: usize },

    #[error("instruction stream has odd length {len}")]
    TruncatedInstruction { len: usize },

    #[error("invalid UTF-8 in string at byte {offset}")]
    InvalidUtf8 { offset: usize },

    #[error("{count} trailing bytes after literal")]
    TrailingBytes { count: usize },

    #[error("literal blocks nested too deeply at byte {offset}")]
    TooDeep { offset: usize },
}
