use super::{AccessHook, Region};

pub const BASE: u32 = 0x2020_0000;
pub const SIZE: usize = 64;

/// The GPIO block. The three function-select words identify themselves by
/// holding their own bus address.
pub fn new() -> Region {
    let mut region = Region::new(BASE, SIZE, Some(AccessHook::Gpio));
    region.write_raw(0x0, 0x2020_0000);
    region.write_raw(0x4, 0x2020_0004);
    region.write_raw(0x8, 0x2020_0008);
    region
}

// The pin set/clear registers report on reads as well as writes.
pub(super) fn on_access(_region: &mut Region, rel_addr: u32, _is_write: bool) {
    match rel_addr {
        0x0 => println!("One GPIO pin from 0 to 9 has been accessed"),
        0x4 => println!("One GPIO pin from 10 to 19 has been accessed"),
        0x8 => println!("One GPIO pin from 20 to 29 has been accessed"),
        0x1c => println!("PIN ON"),
        0x28 => println!("PIN OFF"),
        _ => (),
    }
}
