//! # slotc
//!
//! Compiler driver: source text in, serialized `CODE` block out.
//!
//! ```text
//!  source ──scan──▶ tokens ──parse──▶ CodeBox ──emit──▶ bytes
//! ```
//!
//! ```rust
//! use slotc::{CompileOptions, compile_source};
//! use bytecode::{Literal, decode};
//!
//! let bytes = compile_source("1 + 2,", &CompileOptions::default()).unwrap();
//! assert!(matches!(decode(&bytes), Ok(Literal::Code(_))));
//! ```

pub mod emit;
mod error;

pub use bytecode::StackAccounting;
pub use emit::{Compile, Encode};
pub use error::Error;

use parser::ast::CodeBox;

/// Knobs for a single compilation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompileOptions {
    pub stack_accounting: StackAccounting,
}

/// Scan and parse a program.
pub fn parse_source(source: &str) -> Result<CodeBox, Error> {
    let tokens = parser::scan(source)?;
    Ok(parser::parse_program(tokens)?)
}

/// Render a parsed program as a `CODE` block.
pub fn render(
    program: &CodeBox,
    options: &CompileOptions,
) -> Result<Vec<u8>, Error> {
    let bytes = program.encode(options.stack_accounting)?;
    log::debug!("emitted {} bytes", bytes.len());
    Ok(bytes)
}

/// Run the whole pipeline.
pub fn compile_source(
    source: &str,
    options: &CompileOptions,
) -> Result<Vec<u8>, Error> {
    let program = parse_source(source)?;
    render(&program, options)
}
