//! Decoding of the 32-bit instruction words.
//!
//! Every instruction carries a 4-bit condition in bits 28..31. The family is
//! picked apart as follows, first match wins:
//!
//! - An all-zero word is the halt sentinel.
//! - Bits 4..27 equal to the branch-exchange magic select BX, regardless of
//!   the type bits below.
//! - Bits 26..27 select the family: `00` is multiply when bits 4..7 hold the
//!   multiply magic, data processing otherwise; `01` is single data
//!   transfer; `10` is branch when bit 25 is set, block data transfer
//!   otherwise.
//! - Any other pattern decodes to a pipeline bubble.

use hind_util::Bit;

const MULT_MAGIC: u32 = 0x9;
const BX_MAGIC: u32 = 0x12_fff1;

/// A decoded instruction, one variant per family, with the fields already
/// picked out of the raw word.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Instruction {
    /// Data processing.
    Proc(DataProc),
    /// Multiply and multiply-accumulate.
    Mult(Mult),
    /// Single data transfer.
    Sdt(SingleTransfer),
    /// Block data transfer.
    Bdt(BlockTransfer),
    /// Branch, optionally with link.
    Branch(Branch),
    /// Branch and exchange.
    Bx(BranchExchange),
    /// The zero-word halt sentinel.
    Halt,
    /// A pipeline bubble. Retires no work.
    Empty,
}

impl Instruction {
    pub fn decode(word: u32) -> Self {
        if word == 0 {
            return Instruction::Halt;
        }

        if word.bit_range(4, 27) == BX_MAGIC {
            return Instruction::Bx(BranchExchange {
                cond: Cond::from_field(word.bit_range(28, 31)),
                rn: word.bit_range(0, 3),
            });
        }

        let cond = Cond::from_field(word.bit_range(28, 31));

        match word.bit_range(26, 27) {
            0 if word.bit_range(4, 7) == MULT_MAGIC => Instruction::Mult(Mult {
                cond,
                accumulate: word.bit(21),
                set_cond: word.bit(20),
                rd: word.bit_range(16, 19),
                rn: word.bit_range(12, 15),
                rs: word.bit_range(8, 11),
                rm: word.bit_range(0, 3),
            }),
            0 => Instruction::Proc(DataProc {
                cond,
                imm: word.bit(25),
                opcode: word.bit_range(21, 24),
                set_cond: word.bit(20),
                rn: word.bit_range(16, 19),
                rd: word.bit_range(12, 15),
                op2: word.bit_range(0, 11),
            }),
            1 => Instruction::Sdt(SingleTransfer {
                cond,
                reg_offset: word.bit(25),
                pre: word.bit(24),
                up: word.bit(23),
                load: word.bit(20),
                rn: word.bit_range(16, 19),
                rd: word.bit_range(12, 15),
                offset: word.bit_range(0, 11),
            }),
            2 if word.bit(25) => Instruction::Branch(Branch {
                cond,
                link: word.bit(24),
                offset: word.bit_range(0, 23),
            }),
            2 => Instruction::Bdt(BlockTransfer {
                cond,
                mode: BlockMode::from_field(word.bit_range(23, 24)),
                writeback: word.bit(21),
                load: word.bit(20),
                rn: word.bit_range(16, 19),
                reg_mask: word.bit_range(0, 15),
            }),
            _ => Instruction::Empty,
        }
    }

    /// The condition to evaluate before executing. `None` for the slots that
    /// bypass execution entirely.
    pub fn cond(&self) -> Option<Cond> {
        match self {
            Instruction::Proc(op) => Some(op.cond),
            Instruction::Mult(op) => Some(op.cond),
            Instruction::Sdt(op) => Some(op.cond),
            Instruction::Bdt(op) => Some(op.cond),
            Instruction::Branch(op) => Some(op.cond),
            Instruction::Bx(op) => Some(op.cond),
            Instruction::Halt | Instruction::Empty => None,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct DataProc {
    pub cond: Cond,
    /// Operand 2 is a rotated 8-bit immediate rather than a shifted register.
    pub imm: bool,
    pub opcode: u32,
    pub set_cond: bool,
    pub rn: u32,
    pub rd: u32,
    /// The raw 12-bit operand field, decoded by the barrel shifter.
    pub op2: u32,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Mult {
    pub cond: Cond,
    pub accumulate: bool,
    pub set_cond: bool,
    pub rd: u32,
    pub rn: u32,
    pub rs: u32,
    pub rm: u32,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct SingleTransfer {
    pub cond: Cond,
    /// The offset field is a shifted register rather than a 12-bit literal.
    pub reg_offset: bool,
    pub pre: bool,
    pub up: bool,
    pub load: bool,
    pub rn: u32,
    pub rd: u32,
    pub offset: u32,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct BlockTransfer {
    pub cond: Cond,
    pub mode: BlockMode,
    pub writeback: bool,
    pub load: bool,
    pub rn: u32,
    pub reg_mask: u32,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Branch {
    pub cond: Cond,
    pub link: bool,
    /// 24-bit word offset, sign-extended and scaled at execution.
    pub offset: u32,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct BranchExchange {
    pub cond: Cond,
    pub rn: u32,
}

/// Block-transfer addressing mode, from the P and U bits.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BlockMode {
    /// Decrement the base by the block size, then walk upward bump-then-access.
    PostDec = 0,
    /// Access at the base, bump by 4 after each access.
    PostInc = 1,
    /// Decrement the base by the block size, then walk upward access-then-bump.
    PreDec = 2,
    /// Bump by 4 before each access.
    PreInc = 3,
}

impl BlockMode {
    fn from_field(val: u32) -> Self {
        match val {
            0 => BlockMode::PostDec,
            1 => BlockMode::PostInc,
            2 => BlockMode::PreDec,
            _ => BlockMode::PreInc,
        }
    }
}

/// The condition code prefixed to every instruction.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Cond {
    Eq,
    Ne,
    Cs,
    Cc,
    Mi,
    Pl,
    Vs,
    Vc,
    Hi,
    Ls,
    Ge,
    Lt,
    Gt,
    Le,
    Al,
    /// The reserved `1111` encoding. Never passes.
    Nv,
}

impl Cond {
    pub fn from_field(val: u32) -> Self {
        match val {
            0x0 => Cond::Eq,
            0x1 => Cond::Ne,
            0x2 => Cond::Cs,
            0x3 => Cond::Cc,
            0x4 => Cond::Mi,
            0x5 => Cond::Pl,
            0x6 => Cond::Vs,
            0x7 => Cond::Vc,
            0x8 => Cond::Hi,
            0x9 => Cond::Ls,
            0xa => Cond::Ge,
            0xb => Cond::Lt,
            0xc => Cond::Gt,
            0xd => Cond::Le,
            0xe => Cond::Al,
            _ => Cond::Nv,
        }
    }

    /// Evaluate the predicate against the current flags.
    pub fn passes(self, n: bool, z: bool, c: bool, v: bool) -> bool {
        match self {
            Cond::Eq => z,
            Cond::Ne => !z,
            Cond::Cs => c,
            Cond::Cc => !c,
            Cond::Mi => n,
            Cond::Pl => !n,
            Cond::Vs => v,
            Cond::Vc => !v,
            Cond::Hi => c && !z,
            Cond::Ls => !c || z,
            Cond::Ge => n == v,
            Cond::Lt => n != v,
            Cond::Gt => !z && n == v,
            Cond::Le => z || n != v,
            Cond::Al => true,
            Cond::Nv => false,
        }
    }
}
