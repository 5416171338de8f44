#![cfg_attr(not(target_os = "windows"), allow(dead_code, unused_variables))]

use crate::error::{Error, Result};

/// Trait for reading the engine's loaded module image
///
/// This trait enables mocking for tests and abstracts over different memory sources.
pub trait ReadMemory {
    /// Read raw bytes from memory at the given address
    fn read_bytes(&self, address: u64, size: usize) -> Result<Vec<u8>>;

    /// Get the base address of the module image
    fn base_address(&self) -> u64;

    /// Get the size of the module image in bytes
    fn image_size(&self) -> usize;

    /// Read a signed 32-bit integer from memory
    fn read_i32(&self, address: u64) -> Result<i32> {
        let bytes = self.read_bytes(address, 4)?;
        Ok(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Check whether `[address, address + size)` lies inside the image
    fn contains(&self, address: u64, size: usize) -> bool {
        let base = self.base_address();
        let end = base.saturating_add(self.image_size() as u64);
        address >= base && address.saturating_add(size as u64) <= end
    }
}

/// The module image mapped into the current process.
///
/// The plugin runs inside the engine, so reads are plain copies out of our own
/// address space, bounded by the module's mapped size.
#[derive(Debug, Clone, Copy)]
pub struct LoadedModule {
    base: u64,
    size: usize,
}

impl LoadedModule {
    /// Describe an already-mapped module.
    ///
    /// # Safety
    ///
    /// `[base, base + size)` must be readable memory that stays mapped for the
    /// lifetime of the returned value.
    pub unsafe fn from_raw_parts(base: u64, size: usize) -> Self {
        Self { base, size }
    }

    /// The main executable module of the current process.
    #[cfg(target_os = "windows")]
    pub fn current() -> Result<Self> {
        use windows::Win32::System::LibraryLoader::GetModuleHandleW;
        use windows::Win32::System::ProcessStatus::{GetModuleInformation, MODULEINFO};
        use windows::Win32::System::Threading::GetCurrentProcess;
        use windows::core::PCWSTR;

        // SAFETY: a null module name returns the handle of the executable that
        // created the process, which stays loaded until the process exits.
        let module = unsafe { GetModuleHandleW(PCWSTR::null()) }.map_err(|e| {
            Error::MemoryReadFailed {
                address: 0,
                message: format!("GetModuleHandleW failed: {}", e),
            }
        })?;

        let mut info = MODULEINFO::default();
        // SAFETY: `info` is a properly sized, writable MODULEINFO and the
        // pseudo-handle from GetCurrentProcess is always valid.
        unsafe {
            GetModuleInformation(
                GetCurrentProcess(),
                module,
                &mut info,
                std::mem::size_of::<MODULEINFO>() as u32,
            )
        }
        .map_err(|e| Error::MemoryReadFailed {
            address: module.0 as u64,
            message: format!("GetModuleInformation failed: {}", e),
        })?;

        Ok(Self {
            base: info.lpBaseOfDll as u64,
            size: info.SizeOfImage as usize,
        })
    }

    #[cfg(not(target_os = "windows"))]
    pub fn current() -> Result<Self> {
        Err(Error::MemoryReadFailed {
            address: 0,
            message: "Windows only: module lookup not supported on this platform".to_string(),
        })
    }
}

impl ReadMemory for LoadedModule {
    fn read_bytes(&self, address: u64, size: usize) -> Result<Vec<u8>> {
        if !self.contains(address, size) {
            return Err(Error::MemoryReadFailed {
                address,
                message: format!(
                    "Outside module image (base=0x{:X}, size=0x{:X})",
                    self.base, self.size
                ),
            });
        }

        // SAFETY: the range was bounds-checked against the mapped image, which
        // the constructor guarantees is readable for our lifetime.
        let bytes = unsafe { std::slice::from_raw_parts(address as *const u8, size) };
        Ok(bytes.to_vec())
    }

    fn base_address(&self) -> u64 {
        self.base
    }

    fn image_size(&self) -> usize {
        self.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::mock::MockMemoryReader;

    #[test]
    fn test_read_i32() {
        let data = vec![0x78, 0x56, 0x34, 0x12]; // Little-endian 0x12345678
        let reader = MockMemoryReader::new(data);

        let value = reader.read_i32(0x1000).unwrap();
        assert_eq!(value, 0x12345678);
    }

    #[test]
    fn test_read_i32_negative() {
        let data = vec![0xFF, 0xFF, 0xFF, 0xFF];
        let reader = MockMemoryReader::new(data);

        assert_eq!(reader.read_i32(0x1000).unwrap(), -1);
    }

    #[test]
    fn test_contains() {
        let reader = MockMemoryReader::new(vec![0; 16]);
        assert!(reader.contains(0x1000, 16));
        assert!(reader.contains(0x100C, 4));
        assert!(!reader.contains(0x100D, 4));
        assert!(!reader.contains(0xFFF, 1));
    }

    #[test]
    fn test_loaded_module_reads_own_memory() {
        let data: Box<[u8]> = vec![0x11, 0x22, 0x33, 0x44, 0x55].into_boxed_slice();
        let base = data.as_ptr() as u64;
        // SAFETY: `data` outlives `module` within this test.
        let module = unsafe { LoadedModule::from_raw_parts(base, data.len()) };

        assert_eq!(module.read_bytes(base + 1, 3).unwrap(), vec![0x22, 0x33, 0x44]);
        assert!(module.read_bytes(base + 3, 4).is_err());
        assert_eq!(module.image_size(), 5);
    }
}
