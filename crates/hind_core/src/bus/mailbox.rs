use super::{AccessHook, Region};

pub const BASE: u32 = 0x2000_b880;
pub const SIZE: usize = 36;

/// The mailbox. Only the register dispatch exists; the channels behind it
/// are not emulated.
pub fn new() -> Region {
    Region::new(BASE, SIZE, Some(AccessHook::Mailbox))
}

pub(super) fn on_access(_region: &mut Region, rel_addr: u32, is_write: bool) {
    match rel_addr {
        0x0 => trace!("mailbox read register accessed, write: {is_write}"),
        0x10 => trace!("mailbox poll register accessed, write: {is_write}"),
        0x14 => trace!("mailbox sender register accessed, write: {is_write}"),
        0x18 => trace!("mailbox status register accessed, write: {is_write}"),
        0x1c => trace!("mailbox configuration register accessed, write: {is_write}"),
        0x20 => trace!("mailbox write register accessed, write: {is_write}"),
        _ => (),
    }
}
