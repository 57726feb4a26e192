use super::{AccessHook, Region};

use std::time::{SystemTime, UNIX_EPOCH};

pub const BASE: u32 = 0x2000_3000;
pub const SIZE: usize = 22;

/// Offset of the low counter word. A read here samples the clock.
pub const COUNTER_LO: u32 = 0x4;
/// Offset of the high counter word, patched alongside the low one.
pub const COUNTER_HI: u32 = 0x8;

/// The free-running timer. The scratch buffer holds the wall clock at
/// boot; a read of the counter lazily publishes the elapsed time.
pub fn new() -> Region {
    let mut region = Region::new(BASE, SIZE, Some(AccessHook::Timer));
    region.set_scratch(clock_micros());
    region
}

pub(super) fn on_access(region: &mut Region, rel_addr: u32, is_write: bool) {
    if rel_addr == COUNTER_LO && !is_write {
        let elapsed = clock_micros().wrapping_sub(region.scratch());
        region.write_raw(COUNTER_LO, elapsed as u32);
        region.write_raw(COUNTER_HI, (elapsed >> 32) as u32);
        println!("Time requested");
    }
}

fn clock_micros() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_micros() as u64)
}
