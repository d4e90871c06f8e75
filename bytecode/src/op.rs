/// Bytecode opcodes.
///
/// Every instruction is exactly two bytes: the opcode followed by a single
/// `u8` operand. Opcodes that take no operand are encoded with operand `0`.
/// The numbering is shared with the virtual machine and must stay stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Op {
    /// Push a literal pool entry onto the stack.
    /// Operand: `idx:u8`
    PushLiteral = 0x00,

    /// Push the implicit receiver.
    PushMyself,

    /// Send a message. The receiver and `arity` arguments are on the stack,
    /// the selector symbol (which carries the arity) is in the literal pool.
    /// Operand: `selector_idx:u8`
    Send,

    /// Return the top of stack from the enclosing method.
    ReturnExplicit,

    /// Discard the top of stack.
    Pull,
}

impl Op {
    pub const COUNT: usize = Op::Pull as usize + 1;

    const ALL: [Op; Op::COUNT] = [
        Op::PushLiteral,
        Op::PushMyself,
        Op::Send,
        Op::ReturnExplicit,
        Op::Pull,
    ];

    /// Whether the operand byte carries meaning for this opcode.
    pub const fn has_operand(self) -> bool {
        matches!(self, Op::PushLiteral | Op::Send)
    }
}

impl TryFrom<u8> for Op {
    type Error = u8;

    fn try_from(byte: u8) -> Result<Self, u8> {
        Self::ALL.get(byte as usize).copied().ok_or(byte)
    }
}

/// Leading byte of every serialized literal block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Tag {
    /// `i64` big-endian.
    SmallInteger = 0x00,
    /// `u64` byte length, then UTF-8 bytes.
    String,
    /// `u64` arity, `u64` character count, one byte per character.
    Symbol,
    /// No payload.
    None,
    /// `u64` slot count, slots, then a `Code` or `None` block.
    Object,
    /// `u64` element count, then that many literal blocks.
    ObjectArray,
    /// `u64` byte count, then raw bytes.
    ByteArray,
    /// `u64` stack usage, an `ObjectArray` literal pool, then a
    /// `ByteArray` instruction stream.
    Code,
}

impl Tag {
    pub const COUNT: usize = Tag::Code as usize + 1;

    const ALL: [Tag; Tag::COUNT] = [
        Tag::SmallInteger,
        Tag::String,
        Tag::Symbol,
        Tag::None,
        Tag::Object,
        Tag::ObjectArray,
        Tag::ByteArray,
        Tag::Code,
    ];
}

impl TryFrom<u8> for Tag {
    type Error = u8;

    fn try_from(byte: u8) -> Result<Self, u8> {
        Self::ALL.get(byte as usize).copied().ok_or(byte)
    }
}
