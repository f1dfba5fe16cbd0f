//! Memory View: bounds-checked window over a shared byte buffer
//!
//! Prinsip desain:
//! - Zero-Copy: slicing hanya menggeser `[begin, end)`, tidak pernah menyalin byte
//! - Aliasing: banyak view boleh menunjuk ke buffer yang sama (single-threaded, `Rc`)
//! - Backing: heap (`Box<[u8]>`) atau file yang di-mmap (persisten, kernel-managed paging)
//!
//! Layout:
//! ```text
//! buffer: ┌──────────────────────────────────────────────┐
//!         │ .... │ begin ........ end │ ................. │
//!         └──────────────────────────────────────────────┘
//!                 ^ view.base()        ^ view.end()
//! ```

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::fs::OpenOptions;
use std::io;
use std::ops::{Deref, DerefMut};
use std::path::Path;
use std::rc::Rc;

use memmap2::{MmapMut, MmapOptions};

use crate::error::{Error, Result};

/// Storage behind a region
enum Backing {
    Heap(Box<[u8]>),
    Mapped(MmapMut),
}

impl Deref for Backing {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            Backing::Heap(bytes) => bytes,
            Backing::Mapped(mmap) => mmap,
        }
    }
}

impl DerefMut for Backing {
    fn deref_mut(&mut self) -> &mut [u8] {
        match self {
            Backing::Heap(bytes) => bytes,
            Backing::Mapped(mmap) => mmap,
        }
    }
}

/// A `[begin, end)` window over a shared byte buffer
///
/// Cloning a view is cheap and never copies bytes. Two views are the same memory iff they share
/// the buffer object, regardless of their ranges.
#[derive(Clone)]
pub struct Memory {
    buf: Rc<RefCell<Backing>>,
    begin: usize,
    end: usize,
}

impl Memory {
    /// Wraps an owned byte buffer; the view covers all of it
    pub fn new(bytes: Vec<u8>) -> Self {
        let end = bytes.len();
        Self {
            buf: Rc::new(RefCell::new(Backing::Heap(bytes.into_boxed_slice()))),
            begin: 0,
            end,
        }
    }

    /// Fresh zero-filled region
    pub fn zeroed(len: usize) -> Self {
        Self::new(vec![0u8; len])
    }

    /// Membuat atau membuka region yang di-back oleh file
    ///
    /// File di-resize ke `len` bytes. Isi yang sudah ada dipertahankan.
    pub fn map_file<P: AsRef<Path>>(path: P, len: usize) -> io::Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        file.set_len(len as u64)?;

        // SAFETY: file dibuka read/write dan tidak di-share dengan proses lain oleh crate ini
        let mmap = unsafe { MmapOptions::new().len(len).map_mut(&file)? };

        Ok(Self {
            buf: Rc::new(RefCell::new(Backing::Mapped(mmap))),
            begin: 0,
            end: len,
        })
    }

    /// Flushes a memory-mapped backing to disk; no-op for heap buffers
    pub fn flush(&self) -> io::Result<()> {
        match &*self.buf.borrow() {
            Backing::Mapped(mmap) => mmap.flush(),
            Backing::Heap(_) => Ok(()),
        }
    }

    /// Narrows the view to `[base + offset, base + offset + len)`
    #[inline]
    pub fn slice(&self, offset: usize, len: usize) -> Result<Memory> {
        let limit = self.len();
        match offset.checked_add(len) {
            Some(stop) if stop <= limit => Ok(Memory {
                buf: Rc::clone(&self.buf),
                begin: self.begin + offset,
                end: self.begin + stop,
            }),
            _ => Err(Error::OutOfBounds {
                offset: offset as isize,
                len,
                limit,
            }),
        }
    }

    /// Narrows the view to `[base + offset, end)`
    #[inline]
    pub fn slice_from(&self, offset: usize) -> Result<Memory> {
        let len = self.len().checked_sub(offset).ok_or(Error::OutOfBounds {
            offset: offset as isize,
            len: 0,
            limit: self.len(),
        })?;
        self.slice(offset, len)
    }

    /// View starting `delta` bytes from this view's base and running to the end of the buffer
    ///
    /// Used for pointer dereference: the target may lie before or after the current window but
    /// must stay inside the underlying buffer.
    pub fn relocate(&self, delta: isize) -> Result<Memory> {
        let buffer_len = self.buffer_len();
        let target = self.begin as isize + delta;
        if target < 0 || target as usize > buffer_len {
            return Err(Error::OutOfBounds {
                offset: delta,
                len: 0,
                limit: buffer_len,
            });
        }
        Ok(Memory {
            buf: Rc::clone(&self.buf),
            begin: target as usize,
            end: buffer_len,
        })
    }

    /// Number of bytes in the view
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.end - self.begin
    }

    /// True if the view covers no bytes
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.begin == self.end
    }

    /// Absolute start offset within the underlying buffer
    #[inline(always)]
    pub fn base(&self) -> usize {
        self.begin
    }

    /// Absolute end offset within the underlying buffer
    #[inline(always)]
    pub fn end(&self) -> usize {
        self.end
    }

    /// Moves the start of the view, keeping its end
    pub fn set_base(&mut self, base: usize) -> Result<()> {
        if base > self.end {
            return Err(Error::OutOfBounds {
                offset: base as isize - self.begin as isize,
                len: 0,
                limit: self.len(),
            });
        }
        self.begin = base;
        Ok(())
    }

    /// Total size of the underlying buffer
    #[inline]
    pub fn buffer_len(&self) -> usize {
        self.buf.borrow().len()
    }

    /// Same buffer object (not range-equal)
    #[inline(always)]
    pub fn is_same_memory(&self, other: &Memory) -> bool {
        Rc::ptr_eq(&self.buf, &other.buf)
    }

    /// Extends this view's end to `other`'s end
    ///
    /// Stitches a header allocation to the block allocated right after it. Only extends, never
    /// rewinds.
    pub fn merge(&mut self, other: &Memory) -> Result<()> {
        if !self.is_same_memory(other) {
            return Err(Error::ForeignMemory);
        }
        if other.end < self.end {
            return Err(Error::OutOfBounds {
                offset: other.end as isize - self.begin as isize,
                len: 0,
                limit: self.len(),
            });
        }
        self.end = other.end;
        Ok(())
    }

    /// Read access to the view's bytes (zero-copy)
    #[inline]
    pub fn bytes(&self) -> Ref<'_, [u8]> {
        let (begin, end) = (self.begin, self.end);
        Ref::map(self.buf.borrow(), |buf| &buf[begin..end])
    }

    /// Write access to the view's bytes
    #[inline]
    pub fn bytes_mut(&self) -> RefMut<'_, [u8]> {
        let (begin, end) = (self.begin, self.end);
        RefMut::map(self.buf.borrow_mut(), |buf| &mut buf[begin..end])
    }

    /// Copies `data` into the view at `offset`
    pub fn write(&self, offset: usize, data: &[u8]) -> Result<()> {
        let target = self.slice(offset, data.len())?;
        target.bytes_mut().copy_from_slice(data);
        Ok(())
    }

    /// Copies the view's bytes out
    pub fn to_vec(&self) -> Vec<u8> {
        self.bytes().to_vec()
    }
}

impl fmt::Debug for Memory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memory")
            .field("begin", &self.begin)
            .field("end", &self.end)
            .field("buffer_len", &self.buffer_len())
            .finish()
    }
}
