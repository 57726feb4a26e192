//! The memory map: a table of byte-addressed regions, each optionally
//! backed by a device hook that runs before every access.

pub mod gpio;
pub mod mailbox;
pub mod ram;
pub mod timer;

/// A contiguous memory-mapped span. RAM is a plain region; the devices
/// attach an [`AccessHook`] that observes every dispatched access before
/// the read or write itself takes effect. That ordering is contractual:
/// the timer patches the bytes that the triggering read then returns.
pub struct Region {
    base: u32,
    data: Box<[u8]>,
    hook: Option<AccessHook>,
    /// Device-private storage. The timer keeps its boot-time clock
    /// snapshot here.
    scratch: u64,
}

impl Region {
    pub fn new(base: u32, size: usize, hook: Option<AccessHook>) -> Self {
        Self {
            base,
            data: vec![0; size].into_boxed_slice(),
            hook,
            scratch: 0,
        }
    }

    pub fn base(&self) -> u32 {
        self.base
    }

    pub fn size(&self) -> u32 {
        self.data.len() as u32
    }

    /// Read the little-endian word at an absolute address. The caller is
    /// expected to have dispatched through [`Bus::region_index`]; a stray
    /// out-of-range offset reads as zero.
    pub fn read(&mut self, addr: u32) -> u32 {
        let rel = addr.wrapping_sub(self.base);
        if let Some(hook) = self.hook {
            hook.on_access(self, rel, false);
        }
        self.read_raw(rel)
    }

    /// Write the little-endian word at an absolute address. Fails with a
    /// diagnostic, without mutating, when the word does not fit the region.
    pub fn write(&mut self, addr: u32, val: u32) -> bool {
        let rel = addr.wrapping_sub(self.base);
        if u64::from(rel) + 3 > u64::from(self.size()) - 4 {
            warn!("invalid address {addr:#010x}, this is probably an error in the address decoder");
            return false;
        }
        if let Some(hook) = self.hook {
            hook.on_access(self, rel, true);
        }
        self.write_raw(rel, val);
        true
    }

    /// Hook-free read at a relative offset. Used by the hooks themselves
    /// and by the dump path.
    pub fn read_raw(&self, rel: u32) -> u32 {
        let rel = rel as usize;
        self.data
            .get(rel..rel + 4)
            .and_then(|bytes| bytes.try_into().ok())
            .map_or(0, u32::from_le_bytes)
    }

    /// Hook-free write at a relative offset.
    pub fn write_raw(&mut self, rel: u32, val: u32) {
        let rel = rel as usize;
        if let Some(bytes) = self.data.get_mut(rel..rel + 4) {
            bytes.copy_from_slice(&val.to_le_bytes());
        }
    }

    pub fn scratch(&self) -> u64 {
        self.scratch
    }

    pub fn set_scratch(&mut self, val: u64) {
        self.scratch = val;
    }

    /// Overwrite the start of the region. Used to seed device registers and
    /// to place the program image in RAM.
    pub fn fill_from(&mut self, bytes: &[u8]) {
        self.data[..bytes.len()].copy_from_slice(bytes);
    }
}

/// Per-device access behavior, dispatched before the effecting read or
/// write. A plain enum rather than a trait object so a region can hand
/// itself to its own hook mutably.
#[derive(Clone, Copy)]
pub enum AccessHook {
    Timer,
    Mailbox,
    Gpio,
}

impl AccessHook {
    fn on_access(self, region: &mut Region, rel_addr: u32, is_write: bool) {
        match self {
            AccessHook::Timer => timer::on_access(region, rel_addr, is_write),
            AccessHook::Mailbox => mailbox::on_access(region, rel_addr, is_write),
            AccessHook::Gpio => gpio::on_access(region, rel_addr, is_write),
        }
    }
}

/// The device table. Dispatch goes by address range; the order only
/// records installation order, with RAM always first.
pub struct Bus {
    regions: Vec<Region>,
}

impl Bus {
    pub fn new() -> Self {
        Self {
            regions: vec![ram::new(), timer::new(), mailbox::new(), gpio::new()],
        }
    }

    /// Pick the region whose span contains `addr`. The upper bound leaves
    /// room for the word the access is about to touch.
    pub fn region_index(&self, addr: u32) -> Option<usize> {
        self.regions
            .iter()
            .position(|region| addr >= region.base() && addr <= region.base() + region.size() - 4)
    }

    pub fn region_read(&mut self, index: usize, addr: u32) -> u32 {
        self.regions[index].read(addr)
    }

    pub fn region_write(&mut self, index: usize, addr: u32, val: u32) {
        self.regions[index].write(addr, val);
    }

    /// Load the word at `addr`, dispatching to the owning region. An
    /// unmapped address diagnoses and yields `None`; the caller skips the
    /// instruction's memory effect.
    pub fn load(&mut self, addr: u32) -> Option<u32> {
        match self.region_index(addr) {
            Some(index) => Some(self.regions[index].read(addr)),
            None => {
                warn!("Out of bounds memory access at address {addr:#010x}");
                None
            }
        }
    }

    /// Store the word at `addr`. `None` on an unmapped address.
    pub fn store(&mut self, addr: u32, val: u32) -> Option<()> {
        match self.region_index(addr) {
            Some(index) => {
                self.regions[index].write(addr, val);
                Some(())
            }
            None => {
                warn!("Out of bounds memory access at address {addr:#010x}");
                None
            }
        }
    }

    pub fn ram(&self) -> &Region {
        &self.regions[0]
    }

    pub fn ram_mut(&mut self) -> &mut Region {
        &mut self.regions[0]
    }

    /// Copy a program image to the bottom of RAM.
    pub fn load_image(&mut self, image: &crate::image::Image) {
        self.ram_mut().fill_from(&image.data);
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}
