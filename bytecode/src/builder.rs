use crate::error::CompileError;
use crate::instruction::Instruction;
use crate::literal::LiteralWriter;

/// How a code object's stack usage is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StackAccounting {
    /// Maximum simultaneous stack depth, from a push/pop walk over the
    /// emitted instructions.
    #[default]
    MaxDepth,
    /// Number of push instructions, ignoring pops.
    PushCount,
}

/// Emission context for one code object.
///
/// Accumulates an insertion-ordered literal pool (no deduplication) and a
/// stream of two-byte instructions, tracking stack usage as it goes.
/// Nested code objects get their own builder.
#[derive(Debug)]
pub struct CodeBuilder {
    literals: Vec<Vec<u8>>,
    code: Vec<u8>,
    accounting: StackAccounting,
    depth: u64,
    max_depth: u64,
    pushes: u64,
}

impl CodeBuilder {
    /// Literal pool indices must fit the one-byte operand.
    pub const MAX_LITERALS: usize = u8::MAX as usize + 1;

    pub fn new(accounting: StackAccounting) -> Self {
        Self {
            literals: Vec::new(),
            code: Vec::new(),
            accounting,
            depth: 0,
            max_depth: 0,
            pushes: 0,
        }
    }

    pub fn accounting(&self) -> StackAccounting {
        self.accounting
    }

    pub fn literal_count(&self) -> usize {
        self.literals.len()
    }

    pub fn instructions(&self) -> &[u8] {
        &self.code
    }

    pub fn stack_usage(&self) -> u64 {
        match self.accounting {
            StackAccounting::MaxDepth => self.max_depth,
            StackAccounting::PushCount => self.pushes,
        }
    }

    /// Register a serialized literal and return its pool index.
    pub fn add_literal(&mut self, bytes: Vec<u8>) -> Result<u8, CompileError> {
        let idx = u8::try_from(self.literals.len()).map_err(|_| {
            CompileError::LiteralPoolOverflow {
                limit: Self::MAX_LITERALS,
            }
        })?;
        log::trace!("literal #{idx}: {} bytes", bytes.len());
        self.literals.push(bytes);
        Ok(idx)
    }

    // ── emit helpers ───────────────────────────────────────────────

    fn emit(&mut self, instruction: Instruction) {
        log::trace!("{:04} {}", self.code.len(), instruction);
        self.code.extend_from_slice(&instruction.encode());
    }

    fn push(&mut self) {
        self.pushes += 1;
        self.depth += 1;
        self.max_depth = self.max_depth.max(self.depth);
    }

    fn pop(&mut self, n: u64) {
        self.depth = self.depth.saturating_sub(n);
    }

    /// `PushLiteral <idx>`
    pub fn push_literal(&mut self, idx: u8) {
        self.emit(Instruction::PushLiteral { idx });
        self.push();
    }

    /// Register `bytes` in the pool and push it.
    pub fn load_literal(&mut self, bytes: Vec<u8>) -> Result<u8, CompileError> {
        let idx = self.add_literal(bytes)?;
        self.push_literal(idx);
        Ok(idx)
    }

    /// `PushMyself`
    pub fn push_myself(&mut self) {
        self.emit(Instruction::PushMyself);
        self.push();
    }

    /// `Send <selector_idx>`. Consumes the receiver and `arity` arguments,
    /// leaves the result.
    pub fn send(&mut self, selector_idx: u8, arity: u64) {
        self.emit(Instruction::Send { selector_idx });
        self.pop(arity.saturating_add(1));
        self.push_result();
    }

    /// `ReturnExplicit`. The returned value stays accounted for.
    pub fn return_explicit(&mut self) {
        self.emit(Instruction::ReturnExplicit);
    }

    /// `Pull`
    pub fn pull(&mut self) {
        self.emit(Instruction::Pull);
        self.pop(1);
    }

    /// A value left by an instruction that is not itself a push.
    fn push_result(&mut self) {
        self.depth += 1;
        self.max_depth = self.max_depth.max(self.depth);
    }

    /// Serialize as a `Code` literal block.
    pub fn render(&self) -> Vec<u8> {
        log::debug!(
            "render code: {} literals, {} instructions, stack {}",
            self.literals.len(),
            self.code.len() / Instruction::SIZE,
            self.stack_usage()
        );
        let mut w = LiteralWriter::new();
        w.code(self.stack_usage(), &self.literals, &self.code);
        w.into_bytes()
    }
}

impl Default for CodeBuilder {
    fn default() -> Self {
        Self::new(StackAccounting::default())
    }
}
