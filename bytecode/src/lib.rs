//! Binary code-object format: opcodes, literal tags, the emission
//! context that builds code objects, and a decoder that reads them back.
//!
//! A code object serializes as
//!
//! ```text
//! CODE  stack_usage:u64
//!       OBJECT_ARRAY count:u64 literal*
//!       BYTE_ARRAY   len:u64   (opcode:u8 operand:u8)*
//! ```

mod builder;
mod decoder;
mod error;
mod instruction;
mod literal;
mod op;

pub use builder::{CodeBuilder, StackAccounting};
pub use decoder::{
    CodeObject, Literal, LiteralDecoder, MAX_DEPTH, Slot, decode,
};
pub use error::{CompileError, DecodeError};
pub use instruction::Instruction;
pub use literal::LiteralWriter;
pub use op::{Op, Tag};
