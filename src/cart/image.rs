// rom image: owned buffer + byte access
use std::cell::OnceCell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use md5::{Digest, Md5};

use super::error::{Error, Result};

/// An owned, mutable ROM dump.
///
/// Reads and writes without an explicit offset go through an implicit cursor,
/// the same way a seekable stream behaves. The MD5 digest is computed on first
/// request and dropped by every mutation, so a cached value always matches the
/// current buffer.
#[derive(Debug, Clone, Default)]
pub struct RomImage {
    buffer: Vec<u8>,
    cursor: usize,
    source_path: Option<PathBuf>,
    digest: OnceCell<[u8; 16]>,
}

impl RomImage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_bytes(data: &[u8]) -> Self {
        Self {
            buffer: data.to_vec(),
            ..Self::default()
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let buffer = fs::read(path)?;
        let source_path = std::path::absolute(path)?;
        log::debug!("loaded {} bytes from {}", buffer.len(), source_path.display());

        Ok(Self {
            buffer,
            source_path: Some(source_path),
            ..Self::default()
        })
    }

    pub fn size(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Moves the implicit cursor. Positions past the end are allowed; a later
    /// write there grows the buffer.
    pub fn seek(&mut self, pos: usize) {
        self.cursor = pos;
    }

    /// Reads up to `length` bytes at `offset`, or at the cursor when `offset`
    /// is `None`. Short reads happen at the end of the buffer and an offset past
    /// the end yields nothing. The cursor ends up after the bytes returned.
    pub fn read(&mut self, length: usize, offset: Option<usize>) -> Vec<u8> {
        let start = offset.unwrap_or(self.cursor);
        if start >= self.buffer.len() {
            self.cursor = start;
            return Vec::new();
        }

        let end = start.saturating_add(length).min(self.buffer.len());
        self.cursor = end;
        self.buffer[start..end].to_vec()
    }

    /// Borrows exactly `length` bytes at `offset`.
    pub fn slice(&self, offset: usize, length: usize) -> Result<&[u8]> {
        offset
            .checked_add(length)
            .filter(|&end| end <= self.buffer.len())
            .map(|end| &self.buffer[offset..end])
            .ok_or(Error::OutOfBounds {
                offset,
                length,
                size: self.buffer.len(),
            })
    }

    /// Writes `data` at `offset` (or the cursor), zero-filling any gap and
    /// growing the buffer as needed. Fails without touching the buffer when
    /// the write would end past the largest addressable size.
    pub fn write(&mut self, data: &[u8], offset: Option<usize>) -> Result<()> {
        let start = offset.unwrap_or(self.cursor);
        let end = start
            .checked_add(data.len())
            .filter(|&end| end <= isize::MAX as usize)
            .ok_or(Error::OutOfBounds {
                offset: start,
                length: data.len(),
                size: self.buffer.len(),
            })?;
        if end > self.buffer.len() {
            self.buffer.resize(end, 0);
        }
        self.buffer[start..end].copy_from_slice(data);
        self.cursor = end;
        self.digest.take();
        Ok(())
    }

    /// Swaps in a new buffer and rewinds the cursor. The source path is kept.
    pub fn replace(&mut self, data: Vec<u8>) {
        self.buffer = data;
        self.cursor = 0;
        self.digest.take();
    }

    /// Saves the whole buffer to `path`, falling back to the file the image
    /// was loaded from.
    pub fn save(&self, path: Option<&Path>) -> Result<()> {
        let target = path.or(self.source_path.as_deref()).ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "no destination path for ROM image")
        })?;

        fs::write(target, &self.buffer)?;
        log::debug!("saved {} bytes to {}", self.buffer.len(), target.display());
        Ok(())
    }

    /// MD5 over the entire buffer, independent of the cursor.
    pub fn digest(&self) -> [u8; 16] {
        *self.digest.get_or_init(|| Md5::digest(&self.buffer).into())
    }

    pub fn digest_hex(&self) -> String {
        hex::encode(self.digest())
    }
}
