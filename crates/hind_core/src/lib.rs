#[macro_use]
extern crate log;

#[cfg(test)]
mod test;

pub mod bus;
pub mod cpu;
pub mod dump;
pub mod image;

pub use bus::Bus;
pub use cpu::Cpu;
pub use image::Image;
