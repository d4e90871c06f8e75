use crate::error::CompileError;
use crate::op::Tag;

/// Builds serialized literal blocks.
///
/// All counts and lengths are big-endian `u64`, integers big-endian `i64`.
/// Methods append one complete block (or, for [`object`](Self::object) and
/// [`slot_kind`](Self::slot_kind), one part of an object block) and return
/// `&mut Self` so blocks can be chained.
#[derive(Debug, Default)]
pub struct LiteralWriter {
    buf: Vec<u8>,
}

impl LiteralWriter {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    // ── emit helpers ───────────────────────────────────────────────

    fn emit_tag(&mut self, tag: Tag) {
        self.buf.push(tag as u8);
    }

    fn emit_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    fn emit_len(&mut self, len: usize) {
        self.emit_u64(len as u64);
    }

    // ── blocks ─────────────────────────────────────────────────────

    pub fn integer(&mut self, value: i64) -> &mut Self {
        self.emit_tag(Tag::SmallInteger);
        self.buf.extend_from_slice(&value.to_be_bytes());
        self
    }

    /// The stored length is the UTF-8 byte length.
    pub fn string(&mut self, value: &str) -> &mut Self {
        self.emit_tag(Tag::String);
        self.emit_len(value.len());
        self.buf.extend_from_slice(value.as_bytes());
        self
    }

    pub fn symbol(
        &mut self,
        name: &str,
        arity: u64,
    ) -> Result<&mut Self, CompileError> {
        if !name.is_ascii() {
            return Err(CompileError::NonAsciiSymbol(name.to_string()));
        }
        self.emit_tag(Tag::Symbol);
        self.emit_u64(arity);
        self.emit_len(name.len());
        self.buf.extend_from_slice(name.as_bytes());
        Ok(self)
    }

    pub fn none(&mut self) -> &mut Self {
        self.emit_tag(Tag::None);
        self
    }

    /// Object header. The caller follows it with `slot_count` slots
    /// (symbol, [`slot_kind`](Self::slot_kind), value) and then a code or
    /// none block.
    pub fn object(&mut self, slot_count: usize) -> &mut Self {
        self.emit_tag(Tag::Object);
        self.emit_len(slot_count);
        self
    }

    pub fn slot_kind(&mut self, kind: u8) -> &mut Self {
        self.buf.push(kind);
        self
    }

    /// Append an already serialized block.
    pub fn raw(&mut self, block: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(block);
        self
    }

    pub fn object_array(&mut self, elements: &[Vec<u8>]) -> &mut Self {
        self.emit_tag(Tag::ObjectArray);
        self.emit_len(elements.len());
        for element in elements {
            self.buf.extend_from_slice(element);
        }
        self
    }

    pub fn byte_array(&mut self, bytes: &[u8]) -> &mut Self {
        self.emit_tag(Tag::ByteArray);
        self.emit_len(bytes.len());
        self.buf.extend_from_slice(bytes);
        self
    }

    pub fn code(
        &mut self,
        stack_usage: u64,
        literals: &[Vec<u8>],
        instructions: &[u8],
    ) -> &mut Self {
        self.emit_tag(Tag::Code);
        self.emit_u64(stack_usage);
        self.object_array(literals);
        self.byte_array(instructions)
    }
}
