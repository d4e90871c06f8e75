use core::fmt;

use crate::error::DecodeError;
use crate::instruction::Instruction;
use crate::op::Tag;

/// A decoded literal block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    Integer(i64),
    String(String),
    Symbol { name: String, arity: u64 },
    None,
    Object {
        slots: Vec<Slot>,
        code: Option<CodeObject>,
    },
    Array(Vec<Literal>),
    Bytes(Vec<u8>),
    Code(CodeObject),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    pub name: String,
    pub arity: u64,
    pub kind: u8,
    pub value: Literal,
}

/// A decoded code object: literal pool plus instruction stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeObject {
    pub stack_usage: u64,
    pub literals: Vec<Literal>,
    pub instructions: Vec<Instruction>,
}

/// Deepest nesting of literal blocks the decoder will follow.
pub const MAX_DEPTH: usize = 320;

/// Decode exactly one literal block spanning all of `bytes`.
pub fn decode(bytes: &[u8]) -> Result<Literal, DecodeError> {
    let mut decoder = LiteralDecoder::new(bytes);
    let literal = decoder.literal()?;
    match bytes.len() - decoder.offset() {
        0 => Ok(literal),
        count => Err(DecodeError::TrailingBytes { count }),
    }
}

/// Reads literal blocks from a byte slice.
///
/// Unlike the instruction stream, literal blocks come from outside the
/// process, so every read is bounds-checked.
pub struct LiteralDecoder<'a> {
    bytes: &'a [u8],
    pos: usize,
    depth: usize,
}

impl<'a> LiteralDecoder<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            pos: 0,
            depth: 0,
        }
    }

    /// Current byte offset in the stream.
    pub fn offset(&self) -> usize {
        self.pos
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    // ── read helpers ───────────────────────────────────────────────

    fn take(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        let bytes: &'a [u8] = self.bytes;
        let eof = DecodeError::UnexpectedEof {
            offset: bytes.len(),
        };
        let end = self.pos.checked_add(n).ok_or(eof.clone())?;
        let slice = bytes.get(self.pos..end).ok_or(eof)?;
        self.pos = end;
        Ok(slice)
    }

    fn read_u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take(1)?[0])
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn read_u64(&mut self) -> Result<u64, DecodeError> {
        Ok(u64::from_be_bytes(self.read_array()?))
    }

    fn read_i64(&mut self) -> Result<i64, DecodeError> {
        Ok(i64::from_be_bytes(self.read_array()?))
    }

    /// A `u64` length followed by that many bytes.
    fn read_sized(&mut self) -> Result<&'a [u8], DecodeError> {
        let len = self.read_u64()?;
        let len = usize::try_from(len).map_err(|_| DecodeError::UnexpectedEof {
            offset: self.bytes.len(),
        })?;
        self.take(len)
    }

    fn read_tag(&mut self) -> Result<Tag, DecodeError> {
        let offset = self.pos;
        let byte = self.read_u8()?;
        Tag::try_from(byte).map_err(|tag| DecodeError::UnknownTag { tag, offset })
    }

    fn expect_tag(&mut self, expected: Tag) -> Result<(), DecodeError> {
        let offset = self.pos;
        match self.read_tag()? {
            found if found == expected => Ok(()),
            found => Err(DecodeError::UnexpectedTag {
                expected,
                found,
                offset,
            }),
        }
    }

    // ── blocks ─────────────────────────────────────────────────────

    /// Decode the next literal block.
    ///
    /// Every nested block passes through here, so the depth check bounds
    /// objects, arrays and code pools alike.
    pub fn literal(&mut self) -> Result<Literal, DecodeError> {
        if self.depth >= MAX_DEPTH {
            return Err(DecodeError::TooDeep { offset: self.pos });
        }
        self.depth += 1;
        let result = self.read_tag().and_then(|tag| self.payload(tag));
        self.depth -= 1;
        result
    }

    fn payload(&mut self, tag: Tag) -> Result<Literal, DecodeError> {
        Ok(match tag {
            Tag::SmallInteger => Literal::Integer(self.read_i64()?),
            Tag::String => {
                let offset = self.pos;
                let bytes = self.read_sized()?;
                let s = core::str::from_utf8(bytes)
                    .map_err(|_| DecodeError::InvalidUtf8 { offset })?;
                Literal::String(s.to_string())
            }
            Tag::Symbol => {
                let (name, arity) = self.symbol_payload()?;
                Literal::Symbol { name, arity }
            }
            Tag::None => Literal::None,
            Tag::Object => self.object_payload()?,
            Tag::ObjectArray => Literal::Array(self.array_payload()?),
            Tag::ByteArray => Literal::Bytes(self.read_sized()?.to_vec()),
            Tag::Code => Literal::Code(self.code_payload()?),
        })
    }

    fn symbol_payload(&mut self) -> Result<(String, u64), DecodeError> {
        let arity = self.read_u64()?;
        let name = self.read_sized()?.iter().map(|&b| b as char).collect();
        Ok((name, arity))
    }

    fn object_payload(&mut self) -> Result<Literal, DecodeError> {
        let count = self.read_u64()?;
        let mut slots = Vec::new();
        for _ in 0..count {
            self.expect_tag(Tag::Symbol)?;
            let (name, arity) = self.symbol_payload()?;
            let kind = self.read_u8()?;
            let value = self.literal()?;
            slots.push(Slot {
                name,
                arity,
                kind,
                value,
            });
        }
        let offset = self.pos;
        let code = match self.read_tag()? {
            Tag::None => None,
            Tag::Code => Some(self.code_payload()?),
            found => {
                return Err(DecodeError::UnexpectedTag {
                    expected: Tag::Code,
                    found,
                    offset,
                });
            }
        };
        Ok(Literal::Object { slots, code })
    }

    fn array_payload(&mut self) -> Result<Vec<Literal>, DecodeError> {
        let count = self.read_u64()?;
        let mut elements = Vec::new();
        for _ in 0..count {
            elements.push(self.literal()?);
        }
        Ok(elements)
    }

    fn code_payload(&mut self) -> Result<CodeObject, DecodeError> {
        let stack_usage = self.read_u64()?;
        self.expect_tag(Tag::ObjectArray)?;
        let literals = self.array_payload()?;
        self.expect_tag(Tag::ByteArray)?;
        let stream = self.read_sized()?;
        if stream.len() % Instruction::SIZE != 0 {
            return Err(DecodeError::TruncatedInstruction { len: stream.len() });
        }
        let instructions = stream
            .chunks_exact(Instruction::SIZE)
            .enumerate()
            .map(|(i, pair)| {
                Instruction::decode(pair[0], pair[1]).map_err(|op| {
                    DecodeError::UnknownOpcode {
                        op,
                        offset: i * Instruction::SIZE,
                    }
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(CodeObject {
            stack_usage,
            literals,
            instructions,
        })
    }
}

// ── disassembly ────────────────────────────────────────────────────

fn indent(f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
    write!(f, "{:width$}", "", width = depth * 2)
}

fn write_code(
    f: &mut fmt::Formatter<'_>,
    code: &CodeObject,
    depth: usize,
) -> fmt::Result {
    writeln!(
        f,
        "code stack={} literals={} instructions={}",
        code.stack_usage,
        code.literals.len(),
        code.instructions.len()
    )?;
    for (i, literal) in code.literals.iter().enumerate() {
        indent(f, depth + 1)?;
        write!(f, "#{i:<3} ")?;
        write_literal(f, literal, depth + 1)?;
    }
    for (i, instruction) in code.instructions.iter().enumerate() {
        indent(f, depth + 1)?;
        writeln!(f, "{:04}  {}", i * Instruction::SIZE, instruction)?;
    }
    Ok(())
}

/// Writes one literal, ending with a newline. Compound literals continue
/// on following lines at `depth + 1`.
fn write_literal(
    f: &mut fmt::Formatter<'_>,
    literal: &Literal,
    depth: usize,
) -> fmt::Result {
    match literal {
        Literal::Integer(n) => writeln!(f, "{n}"),
        Literal::String(s) => writeln!(f, "{s:?}"),
        Literal::Symbol { name, arity } => writeln!(f, "#{name}/{arity}"),
        Literal::None => writeln!(f, "none"),
        Literal::Bytes(bytes) => writeln!(f, "bytes[{}]", bytes.len()),
        Literal::Array(elements) => {
            writeln!(f, "array[{}]", elements.len())?;
            for element in elements {
                indent(f, depth + 1)?;
                write_literal(f, element, depth + 1)?;
            }
            Ok(())
        }
        Literal::Object { slots, code } => {
            writeln!(f, "object slots={}", slots.len())?;
            for slot in slots {
                indent(f, depth + 1)?;
                write!(f, "#{}/{} [{}] = ", slot.name, slot.arity, slot.kind)?;
                write_literal(f, &slot.value, depth + 1)?;
            }
            if let Some(code) = code {
                indent(f, depth + 1)?;
                write_code(f, code, depth + 1)?;
            }
            Ok(())
        }
        Literal::Code(code) => write_code(f, code, depth),
    }
}

impl fmt::Display for CodeObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_code(f, self, 0)
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_literal(f, self, 0)
    }
}
