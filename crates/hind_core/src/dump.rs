//! Post-halt state reporting: the register file and every non-zero word of
//! RAM, written to any sink so tests can capture it.

use crate::bus::Region;
use crate::cpu::Cpu;

use std::io::{self, Write};

/// Print the register file. The decimal column is signed. Registers 13 and
/// 14 are not listed.
pub fn dump_registers(cpu: &Cpu, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "Registers:")?;
    for (idx, &val) in cpu.registers.iter().enumerate() {
        match idx {
            0..=12 => writeln!(out, "${idx:<3}: {:>10} ({val:#010x})", val as i32)?,
            15 => writeln!(out, "PC  : {:>10} ({val:#010x})", val as i32)?,
            16 => writeln!(out, "CPSR: {:>10} ({val:#010x})", val as i32)?,
            _ => (),
        }
    }
    Ok(())
}

/// Print every non-zero word of a region, byte-swapped so the output reads
/// in storage order.
pub fn dump_memory(region: &Region, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "Non-zero memory:")?;
    for offset in (0..=region.size() - 4).step_by(4) {
        let val = region.read_raw(offset);
        if val != 0 {
            writeln!(out, "{offset:#010x}: {:#010x}", val.swap_bytes())?;
        }
    }
    Ok(())
}
