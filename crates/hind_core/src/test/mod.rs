mod bus;
mod cpu;
mod instruction;

use crate::cpu::Cpu;
use crate::image::Image;

/// Place `words` at the bottom of RAM and run until the zero word reaches
/// the decode slot.
fn run_words(words: &[u32]) -> Cpu {
    let mut cpu = Cpu::new();
    cpu.bus.load_image(&Image::from_words(words));
    cpu.run();
    cpu
}
