//! Emulation of the ARM-style core: register file, condition flags, the
//! three-stage fetch/decode/execute pipeline and the per-family execute
//! unit.

pub mod instruction;

use hind_util::{reg_list, Bit, BitSet};

use crate::bus::Bus;

use instruction::{
    BlockMode, BlockTransfer, Branch, BranchExchange, Cond, DataProc, Instruction, Mult,
    SingleTransfer,
};

/// Stack pointer.
pub const SP: u32 = 13;
/// Link register.
pub const LR: u32 = 14;
/// Program counter.
pub const PC: u32 = 15;
/// Program status register. The N/Z/C/V flags live in its top four bits.
pub const CPSR: u32 = 16;

pub const REG_COUNT: usize = 17;

const OP_AND: u32 = 0x0;
const OP_EOR: u32 = 0x1;
const OP_SUB: u32 = 0x2;
const OP_RSB: u32 = 0x3;
const OP_ADD: u32 = 0x4;
const OP_TST: u32 = 0x8;
const OP_TEQ: u32 = 0x9;
const OP_CMP: u32 = 0xa;
const OP_ORR: u32 = 0xc;
const OP_MOV: u32 = 0xd;

const SHIFT_LSL: u32 = 0;
const SHIFT_LSR: u32 = 1;
const SHIFT_ASR: u32 = 2;
const SHIFT_ROR: u32 = 3;

pub struct Cpu {
    /// # Register file
    ///
    /// - 0..12 - General purpose.
    /// - 13 - Stack pointer.
    /// - 14 - Link register.
    /// - 15 - Program counter. Two words ahead of the executing
    ///   instruction, so an instruction at address A observes A + 8.
    /// - 16 - Status register. Reading it and reading the flags must agree,
    ///   so the flag accessors operate directly on this word.
    pub registers: [u32; REG_COUNT],
    /// The instruction executed this cycle. Decoded from the word fetched
    /// two cycles ago, so it describes the instruction at `PC - 8`.
    decoded: Instruction,
    /// The word fetched last cycle, from `PC - 4`.
    fetched: u32,
    /// Cleared by a pipeline flush. While false, the decode stage emits a
    /// bubble instead of decoding a stale fetch.
    has_fetched: bool,
    /// Carry scratch. The barrel shifter and the arithmetic ops accumulate
    /// carry-out candidates here; a flag-setting instruction collapses it
    /// into C at the end of its execution. Any set bit means carry.
    c_temp: u32,
    pub bus: Bus,
}

impl Cpu {
    pub fn new() -> Self {
        Self {
            registers: [0; REG_COUNT],
            decoded: Instruction::Empty,
            fetched: 0,
            has_fetched: false,
            c_temp: 0,
            bus: Bus::new(),
        }
    }

    fn reg(&self, idx: u32) -> u32 {
        self.registers[idx as usize]
    }

    fn set_reg(&mut self, idx: u32, val: u32) {
        self.registers[idx as usize] = val;
    }

    pub fn n(&self) -> bool {
        self.reg(CPSR).bit(31)
    }

    pub fn z(&self) -> bool {
        self.reg(CPSR).bit(30)
    }

    pub fn c(&self) -> bool {
        self.reg(CPSR).bit(29)
    }

    pub fn v(&self) -> bool {
        self.reg(CPSR).bit(28)
    }

    fn set_n(&mut self, val: bool) {
        self.registers[CPSR as usize] = self.reg(CPSR).set_bit(31, val);
    }

    fn set_z(&mut self, val: bool) {
        self.registers[CPSR as usize] = self.reg(CPSR).set_bit(30, val);
    }

    fn set_c(&mut self, val: bool) {
        self.registers[CPSR as usize] = self.reg(CPSR).set_bit(29, val);
    }

    fn eval_cond(&self, cond: Cond) -> bool {
        cond.passes(self.n(), self.z(), self.c(), self.v())
    }

    /// Run cycles until the halt sentinel reaches the decode slot.
    pub fn run(&mut self) {
        while self.decoded != Instruction::Halt {
            self.step();
        }
    }

    /// One machine cycle: execute the decoded slot, decode the fetched word,
    /// fetch the word at PC, advance PC by one word.
    pub fn step(&mut self) {
        self.execute();

        if self.has_fetched {
            self.decoded = Instruction::decode(self.fetched);
        } else {
            self.decoded = Instruction::Empty;
            self.has_fetched = true;
        }

        let pc = self.reg(PC);
        self.fetched = self.bus.ram_mut().read(pc);
        self.set_reg(PC, pc.wrapping_add(4));
    }

    /// Empty the decode slot and invalidate the fetch slot. The two words
    /// behind a taken branch retire nothing.
    fn flush(&mut self) {
        self.has_fetched = false;
        self.decoded = Instruction::Empty;
    }

    fn execute(&mut self) {
        let inst = self.decoded;
        let cond = match inst.cond() {
            Some(cond) => cond,
            None => return,
        };
        if !self.eval_cond(cond) {
            return;
        }
        match inst {
            Instruction::Proc(op) => self.exec_proc(op),
            Instruction::Mult(op) => self.exec_mult(op),
            Instruction::Sdt(op) => self.exec_sdt(op),
            Instruction::Bdt(op) => self.exec_bdt(op),
            Instruction::Branch(op) => self.exec_branch(op),
            Instruction::Bx(op) => self.exec_bx(op),
            Instruction::Halt | Instruction::Empty => (),
        }
    }

    fn exec_proc(&mut self, op: DataProc) {
        self.c_temp = 0;

        let op2 = if op.imm {
            // An 8-bit immediate rotated right by twice the 4-bit rotate
            // field. The rotate feeds the carry scratch like any other
            // rotation.
            let rotate = op.op2.bit_range(8, 11) * 2;
            self.rotate_right(op.op2.bit_range(0, 7), rotate)
        } else {
            self.shifter_operand(op.op2, true)
        };

        let rn = self.reg(op.rn);
        let mut result = 0;

        match op.opcode {
            OP_AND => {
                result = rn & op2;
                self.set_reg(op.rd, result);
            }
            OP_EOR => {
                result = rn ^ op2;
                self.set_reg(op.rd, result);
            }
            OP_SUB => {
                result = rn.wrapping_sub(op2);
                self.c_temp = u32::from((result < rn) == (op2 > 0));
                self.set_reg(op.rd, result);
            }
            OP_RSB => {
                result = op2.wrapping_sub(rn);
                self.c_temp = u32::from((result < rn) == (op2 > 0));
                self.set_reg(op.rd, result);
            }
            OP_ADD => {
                let wide = u64::from(rn) + u64::from(op2);
                result = wide as u32;
                self.c_temp |= (wide >> 32) as u32;
                self.set_reg(op.rd, result);
            }
            OP_TST => result = rn & op2,
            OP_TEQ => result = rn ^ op2,
            OP_CMP => {
                result = rn.wrapping_sub(op2);
                self.c_temp = u32::from((result < rn) == (op2 > 0));
            }
            OP_ORR => {
                result = rn | op2;
                self.set_reg(op.rd, result);
            }
            OP_MOV => {
                result = op2;
                self.set_reg(op.rd, result);
                if op.rd == PC {
                    self.flush();
                }
            }
            _ => (),
        }

        if op.set_cond {
            self.set_z(result == 0);
            self.set_n((result as i32) < 0);
            self.set_c(self.c_temp > 0);
        }
    }

    fn exec_mult(&mut self, op: Mult) {
        let product = self.reg(op.rm).wrapping_mul(self.reg(op.rs));
        let result = if op.accumulate {
            product.wrapping_add(self.reg(op.rn))
        } else {
            product
        };
        self.set_reg(op.rd, result);

        if op.set_cond {
            self.set_n(result.bit(31));
            // Z is set on a zero result but never cleared otherwise.
            if result == 0 {
                self.set_z(true);
            }
        }
    }

    fn exec_sdt(&mut self, op: SingleTransfer) {
        if !op.load && op.rd == PC {
            warn!("PC used as the source register of a store");
            return;
        }

        let offset = if op.reg_offset {
            let rm = op.offset.bit_range(0, 3);
            if !op.pre && op.rn == rm {
                warn!("offset register equals base register in post-indexing");
                return;
            }
            if rm == PC {
                warn!("PC used as the offset register");
                return;
            }
            self.shifter_operand(op.offset, false)
        } else {
            op.offset
        };
        let offset = if op.up { offset } else { offset.wrapping_neg() };

        let mut addr = self.reg(op.rn);
        if op.pre {
            addr = addr.wrapping_add(offset);
        }

        if op.load {
            let val = match self.bus.load(addr) {
                Some(val) => val,
                None => return,
            };
            self.set_reg(op.rd, val);
        } else {
            let val = self.reg(op.rd);
            if self.bus.store(addr, val).is_none() {
                return;
            }
        }

        if !op.pre {
            self.set_reg(op.rn, self.reg(op.rn).wrapping_add(offset));
        }
    }

    fn exec_bdt(&mut self, op: BlockTransfer) {
        let addr = self.reg(op.rn);
        let regs = reg_list(op.reg_mask);

        let region = match self.bus.region_index(addr) {
            Some(region) => region,
            None => {
                warn!("Out of bounds memory access at address {addr:#010x}");
                return;
            }
        };

        let end = if op.load {
            self.load_blocks(region, &regs, addr, op.mode)
        } else {
            self.store_blocks(region, &regs, addr, op.mode)
        };

        if op.writeback {
            self.set_reg(op.rn, end);
        }
    }

    /// Load a register block. Returns the address the base register takes on
    /// writeback: past the block for incrementing modes, the decremented
    /// base for decrementing ones.
    fn load_blocks(&mut self, region: usize, regs: &[usize], mut addr: u32, mode: BlockMode) -> u32 {
        match mode {
            BlockMode::PreInc => {
                for &reg in regs {
                    addr = addr.wrapping_add(4);
                    self.load_block_reg(region, reg, addr);
                }
            }
            BlockMode::PostInc => {
                for &reg in regs {
                    self.load_block_reg(region, reg, addr);
                    addr = addr.wrapping_add(4);
                }
            }
            BlockMode::PreDec => {
                addr = addr.wrapping_sub(4 * regs.len() as u32);
                let mut walk = addr;
                for &reg in regs {
                    self.load_block_reg(region, reg, walk);
                    walk = walk.wrapping_add(4);
                }
            }
            BlockMode::PostDec => {
                addr = addr.wrapping_sub(4 * regs.len() as u32);
                let mut walk = addr;
                for &reg in regs {
                    walk = walk.wrapping_add(4);
                    self.load_block_reg(region, reg, walk);
                }
            }
        }
        addr
    }

    fn load_block_reg(&mut self, region: usize, reg: usize, addr: u32) {
        self.registers[reg] = self.bus.region_read(region, addr);
        if reg as u32 == PC {
            self.flush();
        }
    }

    fn store_blocks(&mut self, region: usize, regs: &[usize], mut addr: u32, mode: BlockMode) -> u32 {
        match mode {
            BlockMode::PreInc => {
                for &reg in regs {
                    addr = addr.wrapping_add(4);
                    self.store_block_reg(region, reg, addr);
                }
            }
            BlockMode::PostInc => {
                for &reg in regs {
                    self.store_block_reg(region, reg, addr);
                    addr = addr.wrapping_add(4);
                }
            }
            BlockMode::PreDec => {
                addr = addr.wrapping_sub(4 * regs.len() as u32);
                let mut walk = addr;
                for &reg in regs {
                    self.store_block_reg(region, reg, walk);
                    walk = walk.wrapping_add(4);
                }
            }
            BlockMode::PostDec => {
                addr = addr.wrapping_sub(4 * regs.len() as u32);
                let mut walk = addr;
                for &reg in regs {
                    walk = walk.wrapping_add(4);
                    self.store_block_reg(region, reg, walk);
                }
            }
        }
        addr
    }

    fn store_block_reg(&mut self, region: usize, reg: usize, addr: u32) {
        let val = self.registers[reg];
        self.bus.region_write(region, addr, val);
    }

    fn exec_branch(&mut self, op: Branch) {
        // Sign-extend the 24-bit word offset and scale it to bytes.
        let offset = ((op.offset << 8) as i32 >> 6) as u32;

        if op.link {
            // PC is two words ahead, so the instruction after the branch
            // sits at PC - 4.
            self.set_reg(LR, self.reg(PC).wrapping_sub(4));
        }

        self.set_reg(PC, self.reg(PC).wrapping_add(offset));
        self.flush();
    }

    fn exec_bx(&mut self, op: BranchExchange) {
        if op.rn == PC {
            warn!("PC used as the target register of a branch-exchange");
            return;
        }
        self.set_reg(PC, self.reg(op.rn) & 0xffff_fffe);
        self.flush();
    }

    /// Evaluate a shifted-register operand: a register shifted by an
    /// immediate 5-bit amount or by the low byte of another register, with
    /// one of the four shift types in bits 5..6.
    ///
    /// Carry-out candidates are gathered locally and committed to the carry
    /// scratch only when `set_c_temp` is on; the rotate helper's own
    /// accumulation is unconditional either way.
    fn shifter_operand(&mut self, operand: u32, set_c_temp: bool) -> u32 {
        let rm = operand.bit_range(0, 3);
        let shift = if operand.bit(4) {
            self.reg(operand.bit_range(8, 11)) & 0xff
        } else {
            operand.bit_range(7, 11)
        };

        let mut val = self.reg(rm);
        let mut c_temp = self.c_temp;

        match operand.bit_range(5, 6) {
            SHIFT_LSL => {
                c_temp |= val.bit_range(32usize.saturating_sub(shift as usize), 31);
                val = val.wrapping_shl(shift);
            }
            SHIFT_LSR => {
                if shift > 0 {
                    c_temp |= val.bit_range(0, shift as usize - 1);
                    val = val.wrapping_shr(shift);
                }
            }
            SHIFT_ASR => {
                let neg = (val as i32) < 0;
                c_temp |= val.bit_range(32usize.saturating_sub(shift as usize), 31);
                val = val.wrapping_shr(shift);
                if neg && val > 0 {
                    val = val.wrapping_neg();
                }
            }
            SHIFT_ROR => {
                if shift > 0 {
                    c_temp |= val.bit_range(0, shift as usize);
                }
                val = self.rotate_right(val, shift);
            }
            _ => (),
        }

        if set_c_temp {
            self.c_temp = c_temp;
        }
        val
    }

    /// Rotate right, accumulating the rotated-out bits into the carry
    /// scratch.
    fn rotate_right(&mut self, val: u32, amount: u32) -> u32 {
        if amount > 0 {
            self.c_temp |= val.bit_range(0, amount as usize - 1);
        }
        val.rotate_right(amount)
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}
