//! Byte-addressable execution memory
//!
//! Memory reads as zero until written. The interpreter expands memory over
//! every region an instruction touches, so `size()` is the high-water mark of
//! accessed bytes; it never shrinks during an execution. Every access is
//! checked against the configured limit so that offset arithmetic cannot wrap.

use crate::error::{VmError, VmResult};
use minivm_primitives::Word;

/// Default addressable limit (16 MiB)
pub const DEFAULT_MEMORY_LIMIT: usize = 16 * 1024 * 1024;

/// Execution memory
#[derive(Clone, Debug)]
pub struct Memory {
    data: Vec<u8>,
    limit: usize,
}

impl Memory {
    /// Empty memory with [`DEFAULT_MEMORY_LIMIT`]
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_MEMORY_LIMIT)
    }

    /// Empty memory that rejects accesses ending past `limit`
    pub fn with_limit(limit: usize) -> Self {
        Self {
            data: Vec::new(),
            limit,
        }
    }

    /// High-water mark in bytes
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Addressable limit in bytes
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Validate `[offset, offset + len)` and return its end.
    /// Empty regions are always valid.
    pub fn check_region(&self, offset: usize, len: usize) -> VmResult<usize> {
        if len == 0 {
            return Ok(0);
        }
        let end = offset.checked_add(len).ok_or(VmError::MemoryBoundsExceeded)?;
        if end > self.limit {
            return Err(VmError::MemoryBoundsExceeded);
        }
        Ok(end)
    }

    /// Size memory would have after writing `[offset, offset + len)`,
    /// or `None` if the write stays within the current size
    pub fn growth(&self, offset: usize, len: usize) -> VmResult<Option<usize>> {
        let end = self.check_region(offset, len)?;
        Ok((end > self.data.len()).then_some(end))
    }

    /// Zero-fill up to the end of `[offset, offset + len)`
    pub fn expand(&mut self, offset: usize, len: usize) -> VmResult<()> {
        if let Some(end) = self.growth(offset, len)? {
            self.data.resize(end, 0);
        }
        Ok(())
    }

    /// Copy out `len` bytes, zero-filled past the high-water mark
    pub fn read(&self, offset: usize, len: usize) -> VmResult<Vec<u8>> {
        let end = self.check_region(offset, len)?;
        let mut out = vec![0u8; len];
        if len > 0 && offset < self.data.len() {
            let available = end.min(self.data.len());
            out[..available - offset].copy_from_slice(&self.data[offset..available]);
        }
        Ok(out)
    }

    /// Read a 32-byte word
    pub fn read_word(&self, offset: usize) -> VmResult<Word> {
        let bytes = self.read(offset, Word::LEN)?;
        Word::from_slice(&bytes).map_err(|_| VmError::MemoryBoundsExceeded)
    }

    /// Copy `bytes` in at `offset`, growing as needed
    pub fn write(&mut self, offset: usize, bytes: &[u8]) -> VmResult<()> {
        if bytes.is_empty() {
            return Ok(());
        }
        let end = self.check_region(offset, bytes.len())?;
        if end > self.data.len() {
            self.data.resize(end, 0);
        }
        self.data[offset..end].copy_from_slice(bytes);
        Ok(())
    }

    /// Write a 32-byte word
    pub fn write_word(&mut self, offset: usize, value: &Word) -> VmResult<()> {
        self.write(offset, value.as_bytes())
    }

    /// Write a single byte
    pub fn write_byte(&mut self, offset: usize, value: u8) -> VmResult<()> {
        self.write(offset, &[value])
    }

    /// Written bytes
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}
