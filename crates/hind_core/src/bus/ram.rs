use super::Region;

pub const BASE: u32 = 0x0;
pub const SIZE: usize = 1 << 16;

/// Main memory. Byte addressable, no hook, holds the program image from
/// offset 0.
pub fn new() -> Region {
    Region::new(BASE, SIZE, None)
}
