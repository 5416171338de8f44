//! Mock module image for testing
//!
//! Provides a configurable implementation of the `ReadMemory` trait that
//! reads from an in-memory buffer instead of the engine's mapped executable.
//! The CLI also uses it to scan module dumps loaded from disk.

use crate::error::{Error, Result};
use crate::process::ReadMemory;

/// Buffer-backed module image
#[derive(Debug, Clone)]
pub struct MockMemoryReader {
    data: Vec<u8>,
    base: u64,
}

impl MockMemoryReader {
    /// Create a new mock reader with the given data at base address 0x1000
    pub fn new(data: Vec<u8>) -> Self {
        Self { data, base: 0x1000 }
    }

    /// Create a new mock reader with custom base address
    pub fn with_base(data: Vec<u8>, base: u64) -> Self {
        Self { data, base }
    }

    /// Get the size of the underlying buffer
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl ReadMemory for MockMemoryReader {
    fn read_bytes(&self, address: u64, size: usize) -> Result<Vec<u8>> {
        if address < self.base {
            return Err(Error::MemoryReadFailed {
                address,
                message: format!("Address below base (base=0x{:X})", self.base),
            });
        }
        let offset = (address - self.base) as usize;
        if offset + size > self.data.len() {
            return Err(Error::MemoryReadFailed {
                address,
                message: format!(
                    "Out of bounds: offset={}, size={}, len={}",
                    offset,
                    size,
                    self.data.len()
                ),
            });
        }
        Ok(self.data[offset..offset + size].to_vec())
    }

    fn base_address(&self) -> u64 {
        self.base
    }

    fn image_size(&self) -> usize {
        self.data.len()
    }
}

/// Builder for creating test module images
///
/// Provides a fluent API for laying out code bytes at known offsets.
#[derive(Debug, Clone, Default)]
pub struct MockMemoryBuilder {
    data: Vec<u8>,
    base: u64,
}

impl MockMemoryBuilder {
    /// Create a new builder with default base address (0x1000)
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            base: 0x1000,
        }
    }

    /// Set the base address for the mock reader
    pub fn base(mut self, base: u64) -> Self {
        self.base = base;
        self
    }

    /// Pre-allocate buffer up to the specified size, filled with `int3` padding
    pub fn with_size(mut self, size: usize) -> Self {
        self.data.resize(size, 0xCC);
        self
    }

    /// Write a signed 32-bit integer at the specified offset from base
    pub fn write_i32(mut self, offset: usize, value: i32) -> Self {
        self.ensure_size(offset + 4);
        self.data[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
        self
    }

    /// Write raw bytes at the specified offset from base
    pub fn write_bytes(mut self, offset: usize, bytes: &[u8]) -> Self {
        self.ensure_size(offset + bytes.len());
        self.data[offset..offset + bytes.len()].copy_from_slice(bytes);
        self
    }

    /// Build the MockMemoryReader
    pub fn build(self) -> MockMemoryReader {
        MockMemoryReader {
            data: self.data,
            base: self.base,
        }
    }

    fn ensure_size(&mut self, required: usize) {
        if self.data.len() < required {
            self.data.resize(required, 0xCC);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_reader_with_base() {
        let data = vec![0x01, 0x02, 0x03, 0x04];
        let reader = MockMemoryReader::with_base(data, 0x140000000);

        let bytes = reader.read_bytes(0x140000000, 4).unwrap();
        assert_eq!(bytes, vec![0x01, 0x02, 0x03, 0x04]);
        assert_eq!(reader.image_size(), 4);
    }

    #[test]
    fn test_mock_reader_out_of_bounds() {
        let reader = MockMemoryReader::new(vec![0x01, 0x02]);
        assert!(reader.read_i32(0x1000).is_err());
    }

    #[test]
    fn test_mock_reader_below_base() {
        let reader = MockMemoryReader::with_base(vec![0x01, 0x02, 0x03, 0x04], 0x2000);
        assert!(reader.read_bytes(0x1000, 4).is_err());
    }

    #[test]
    fn test_builder_basic() {
        let reader = MockMemoryBuilder::new()
            .write_i32(0, 0x12345678)
            .write_bytes(4, &[0x48, 0x8B])
            .build();

        assert_eq!(reader.read_i32(0x1000).unwrap(), 0x12345678);
        assert_eq!(reader.read_bytes(0x1004, 2).unwrap(), vec![0x48, 0x8B]);
        assert_eq!(reader.image_size(), 6);
    }

    #[test]
    fn test_builder_padding_is_int3() {
        let reader = MockMemoryBuilder::new()
            .with_size(8)
            .write_bytes(2, &[0x90])
            .build();

        assert_eq!(
            reader.read_bytes(0x1000, 4).unwrap(),
            vec![0xCC, 0xCC, 0x90, 0xCC]
        );
    }
}
