//! Bump-Allocating Builder
//!
//! Semua value baru dibangun langsung di dalam satu region.
//! Cursor hanya bergerak maju: byte yang sudah diklaim tidak pernah dipakai ulang.
//!
//! ```text
//! ┌──────────┬─────┬──────────┬───────────────────────┐
//! │ alloc #1 │ pad │ alloc #2 │ available ...         │
//! └──────────┴─────┴──────────┴───────────────────────┘
//!                              ^ cursor
//! ```

use crate::config::{Config, DEFAULT_SENTINEL};
use crate::core::Memory;
use crate::error::{Error, Result};
use crate::protocol::Object;

/// Forward-only allocator over one region
///
/// Single-use dan single-threaded: jangan share satu builder antar call.
pub struct Builder {
    buf: Memory,
    avail: Memory,
    sentinel: u8,
}

impl Builder {
    /// Builder over `mem` using the default sentinel
    pub fn new(mem: Memory) -> Self {
        Self {
            avail: mem.clone(),
            buf: mem,
            sentinel: DEFAULT_SENTINEL,
        }
    }

    /// Builder over `mem` using the configured sentinel
    pub fn with_config(mem: Memory, config: &Config) -> Self {
        let mut builder = Self::new(mem);
        builder.sentinel = config.sentinel;
        builder
    }

    /// Claims `size` bytes at the next multiple of `align`
    ///
    /// Alignment is computed on the absolute buffer offset. The claimed bytes are filled with
    /// the sentinel.
    pub fn allocate(&mut self, size: usize, align: usize) -> Result<Memory> {
        if align == 0 {
            return Err(Error::InvalidAlignment);
        }

        let padding = (align - self.avail.base() % align) % align;
        let requested = padding + size;
        if requested > self.avail.len() {
            return Err(Error::OutOfSpace {
                requested,
                available: self.avail.len(),
            });
        }

        let alloc = self.avail.slice(padding, size)?;
        self.avail = self.avail.slice_from(requested)?;
        alloc.bytes_mut().fill(self.sentinel);

        tracing::trace!(base = alloc.base(), size, align, "allocated");
        Ok(alloc)
    }

    /// Allocates `T::SIZE` unaligned bytes and binds `T` without initialising it
    pub fn create_raw<T: Object>(&mut self) -> Result<T> {
        let mem = self.allocate(T::SIZE, 1)?;
        T::from_memory(mem)
    }

    /// Everything built so far: region start through the cursor
    pub fn get(&self) -> Result<Memory> {
        self.buf.slice(0, self.position())
    }

    /// Bytes claimed so far, including padding
    #[inline(always)]
    pub fn position(&self) -> usize {
        self.avail.base() - self.buf.base()
    }

    /// Bytes left in the region
    #[inline(always)]
    pub fn available(&self) -> usize {
        self.avail.len()
    }

    /// The region handed to the builder
    #[inline(always)]
    pub fn memory(&self) -> &Memory {
        &self.buf
    }

    /// Sentinel byte used to fill allocations
    #[inline(always)]
    pub fn sentinel(&self) -> u8 {
        self.sentinel
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocations_never_overlap_and_are_aligned() {
        let mut builder = Builder::new(Memory::zeroed(256));
        let requests = [(3, 1), (4, 4), (1, 1), (8, 8), (2, 2), (5, 4), (12, 4), (1, 8)];

        let mut previous_end = 0;
        for (size, align) in requests {
            let alloc = builder.allocate(size, align).unwrap();
            assert_eq!(alloc.base() % align, 0);
            assert!(alloc.base() >= previous_end);
            assert_eq!(alloc.len(), size);
            previous_end = alloc.end();
        }
        assert_eq!(builder.position(), previous_end);
    }

    #[test]
    fn test_sentinel_fill() {
        let mut builder = Builder::new(Memory::zeroed(16));
        let alloc = builder.allocate(4, 1).unwrap();
        assert_eq!(&*alloc.bytes(), &[0xCC; 4]);

        let config = Config::default().with_sentinel(0xAB);
        let mut builder = Builder::with_config(Memory::zeroed(16), &config);
        let alloc = builder.allocate(2, 1).unwrap();
        assert_eq!(&*alloc.bytes(), &[0xAB; 2]);
    }

    #[test]
    fn test_padding_is_not_filled() {
        let mut builder = Builder::new(Memory::zeroed(16));
        builder.allocate(1, 1).unwrap();
        builder.allocate(4, 4).unwrap();
        let out = builder.get().unwrap();
        assert_eq!(&*out.bytes(), &[0xCC, 0, 0, 0, 0xCC, 0xCC, 0xCC, 0xCC]);
    }

    #[test]
    fn test_exhaustion() {
        let mut builder = Builder::new(Memory::zeroed(8));
        builder.allocate(6, 1).unwrap();
        let err = builder.allocate(4, 1).unwrap_err();
        assert!(matches!(
            err,
            Error::OutOfSpace {
                requested: 4,
                available: 2
            }
        ));
        assert!(matches!(builder.allocate(1, 0), Err(Error::InvalidAlignment)));
    }

    #[test]
    fn test_get_covers_start_to_cursor() {
        let mut builder = Builder::new(Memory::zeroed(32));
        builder.allocate(3, 1).unwrap();
        builder.allocate(2, 2).unwrap();
        let out = builder.get().unwrap();
        assert_eq!(out.base(), 0);
        assert_eq!(out.len(), 6);
        assert_eq!(builder.available(), 26);
    }
}
