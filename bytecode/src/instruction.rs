use core::fmt;

use crate::op::Op;

/// A decoded `(opcode, operand)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    PushLiteral { idx: u8 },
    PushMyself,
    Send { selector_idx: u8 },
    ReturnExplicit,
    Pull,
}

impl Instruction {
    /// Width of every encoded instruction.
    pub const SIZE: usize = 2;

    pub fn op(self) -> Op {
        match self {
            Self::PushLiteral { .. } => Op::PushLiteral,
            Self::PushMyself => Op::PushMyself,
            Self::Send { .. } => Op::Send,
            Self::ReturnExplicit => Op::ReturnExplicit,
            Self::Pull => Op::Pull,
        }
    }

    /// The operand byte; `0` for opcodes without one.
    pub fn operand(self) -> u8 {
        match self {
            Self::PushLiteral { idx } => idx,
            Self::Send { selector_idx } => selector_idx,
            _ => 0,
        }
    }

    pub fn encode(self) -> [u8; Self::SIZE] {
        [self.op() as u8, self.operand()]
    }

    /// Decode one instruction. The operand of operand-less opcodes is
    /// ignored. Fails with the offending byte for an unknown opcode.
    pub fn decode(op: u8, operand: u8) -> Result<Self, u8> {
        Ok(match Op::try_from(op)? {
            Op::PushLiteral => Self::PushLiteral { idx: operand },
            Op::PushMyself => Self::PushMyself,
            Op::Send => Self::Send {
                selector_idx: operand,
            },
            Op::ReturnExplicit => Self::ReturnExplicit,
            Op::Pull => Self::Pull,
        })
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PushLiteral { idx } => write!(f, "PushLiteral #{idx}"),
            Self::PushMyself => write!(f, "PushMyself"),
            Self::Send { selector_idx } => write!(f, "Send #{selector_idx}"),
            Self::ReturnExplicit => write!(f, "ReturnExplicit"),
            Self::Pull => write!(f, "Pull"),
        }
    }
}
