use crate::bus::ram;

use thiserror::Error;

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

#[derive(Error, Debug)]
pub enum ImageError {
    #[error("failed to load image: {0}")]
    IoError(#[from] io::Error),

    #[error("the number of bytes in the binary ({0}) is not divisible by 4")]
    BadLength(usize),

    #[error("the binary ({0} bytes) does not fit in memory")]
    TooLarge(usize),
}

/// A flat binary image: little-endian words, loaded at the bottom of RAM
/// and entered at address 0.
pub struct Image {
    pub data: Box<[u8]>,
}

impl Image {
    /// Load and validate from file.
    pub fn load(path: &Path) -> Result<Self, ImageError> {
        let mut file = File::open(path)?;
        let mut data = Vec::<u8>::default();

        file.read_to_end(&mut data)?;

        Self::from_bytes(data)
    }

    pub fn from_bytes(data: Vec<u8>) -> Result<Self, ImageError> {
        if data.len() % 4 != 0 {
            return Err(ImageError::BadLength(data.len()));
        }
        if data.len() > ram::SIZE {
            return Err(ImageError::TooLarge(data.len()));
        }
        Ok(Self {
            data: data.into_boxed_slice(),
        })
    }

    /// Build an image straight from instruction words.
    pub fn from_words(words: &[u32]) -> Self {
        let data = words.iter().flat_map(|word| word.to_le_bytes()).collect();
        Self { data }
    }
}
