use bytecode::CompileError;
use parser::{ParserError, TokenizerError};
use thiserror::Error;

/// Any failure of the scan → parse → emit pipeline. All are fatal to the
/// compilation; no partial output is produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("tokenizer error: {0}")]
    Tokenizer(#[from] TokenizerError),

    #[error("parse error: {0}")]
    Parser(#[from] ParserError),

    #[error("compile error: {0}")]
    Compile(#[from] CompileError),
}
