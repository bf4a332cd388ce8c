// cartridge errors
use super::System;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("access of {length} bytes at 0x{offset:X} is out of bounds (ROM is {size} bytes)")]
    OutOfBounds {
        offset: usize,
        length: usize,
        size: usize,
    },
    #[error("format error: {0}")]
    Format(String),
    #[error("invalid format: {0}")]
    InvalidFormat(String),
    #[error("no cartridge layout for {0}")]
    Unsupported(System),
}

pub type Result<T> = std::result::Result<T, Error>;
