//! Linear memory (§3): a single fixed-capacity byte buffer.
//!
//! Unlike a full Wasm engine's growable page vector, this core assumes
//! exactly one 64 KiB memory and never grows it — `memory.grow` is a
//! non-goal. All loads/stores are bounds-checked against that fixed capacity.

use crate::error::{CoreError, TrapKind};

pub const MEMORY_CAPACITY: usize = 65536;

#[derive(Debug, Clone)]
pub struct LinearMemory {
    bytes: Vec<u8>,
}

impl LinearMemory {
    pub fn new() -> Self {
        LinearMemory {
            bytes: vec![0u8; MEMORY_CAPACITY],
        }
    }

    /// Public API surface, not currently called by this crate's own CLI.
    #[allow(dead_code)]
    pub fn capacity(&self) -> usize {
        MEMORY_CAPACITY
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    fn checked_start(&self, addr: u32, offset: u32, width: usize) -> Result<usize, CoreError> {
        let start = (addr as u64) + (offset as u64);
        let end = start + width as u64;
        if end > MEMORY_CAPACITY as u64 {
            return Err(CoreError::Trap(TrapKind::MemoryOutOfBounds));
        }
        Ok(start as usize)
    }

    /// `i32.load`: four bytes, little-endian.
    pub fn load_i32(&self, addr: u32, offset: u32) -> Result<i32, CoreError> {
        let start = self.checked_start(addr, offset, 4)?;
        let mut buf = [0u8; 4];
        buf.copy_from_slice(&self.bytes[start..start + 4]);
        Ok(i32::from_le_bytes(buf))
    }

    /// `i32.store`: four bytes, little-endian.
    pub fn store_i32(&mut self, addr: u32, offset: u32, value: i32) -> Result<(), CoreError> {
        let start = self.checked_start(addr, offset, 4)?;
        self.bytes[start..start + 4].copy_from_slice(&value.to_le_bytes());
        Ok(())
    }

    /// Write a data-segment payload at a flat offset. Used only at module
    /// load time; not part of the executed instruction set.
    pub fn write_bytes(&mut self, offset: u32, data: &[u8]) -> Result<(), CoreError> {
        let start = self.checked_start(offset, 0, data.len())?;
        self.bytes[start..start + data.len()].copy_from_slice(data);
        Ok(())
    }

    /// Read a byte range, e.g. for a `fd_write` iovec. Offset folded into `addr`.
    pub fn read_bytes(&self, addr: u32, len: u32) -> Result<&[u8], CoreError> {
        let start = self.checked_start(addr, 0, len as usize)?;
        Ok(&self.bytes[start..start + len as usize])
    }

    pub fn read_u32(&self, addr: u32) -> Result<u32, CoreError> {
        Ok(self.load_i32(addr, 0)? as u32)
    }
}

impl Default for LinearMemory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_then_load_roundtrip() {
        let mut mem = LinearMemory::new();
        mem.store_i32(0, 0, 120).unwrap();
        assert_eq!(mem.load_i32(0, 0).unwrap(), 120);
        assert_eq!(mem.as_slice()[0], 0x78);
        assert_eq!(&mem.as_slice()[1..4], &[0, 0, 0]);
    }

    #[test]
    fn negative_values_roundtrip() {
        let mut mem = LinearMemory::new();
        mem.store_i32(1000, 0, -12345).unwrap();
        assert_eq!(mem.load_i32(1000, 0).unwrap(), -12345);
    }

    #[test]
    fn offset_is_added_to_address() {
        let mut mem = LinearMemory::new();
        mem.store_i32(100, 4, 42).unwrap();
        assert_eq!(mem.load_i32(104, 0).unwrap(), 42);
    }

    #[test]
    fn out_of_bounds_load_traps() {
        let mem = LinearMemory::new();
        let err = mem.load_i32((MEMORY_CAPACITY - 2) as u32, 0).unwrap_err();
        assert!(matches!(err, CoreError::Trap(TrapKind::MemoryOutOfBounds)));
    }

    #[test]
    fn out_of_bounds_store_traps() {
        let mut mem = LinearMemory::new();
        let err = mem
            .store_i32((MEMORY_CAPACITY - 3) as u32, 0, 1)
            .unwrap_err();
        assert!(matches!(err, CoreError::Trap(TrapKind::MemoryOutOfBounds)));
    }

    #[test]
    fn write_bytes_for_data_segments() {
        let mut mem = LinearMemory::new();
        mem.write_bytes(10, b"hi").unwrap();
        assert_eq!(mem.read_bytes(10, 2).unwrap(), b"hi");
    }
}
