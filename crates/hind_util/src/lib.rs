mod bit;

pub use bit::{reg_list, Bit, BitSet};
