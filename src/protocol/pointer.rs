//! Relative pointers
//!
//! Layout:
//! ```text
//! ┌───────────────┐
//! │ offset: i16   │  target.base = pointer.base + offset
//! └───────────────┘
//! ```
//!
//! Satu-satunya mekanisme indirection. Offset relatif ke base pointer itu sendiri, jadi satu
//! extent bisa dipindah utuh tanpa mengubah pointer di dalamnya.
//!
//! Extent mengikuti pointer secara rekursif. Bytes dari peer bisa membentuk siklus, jadi
//! kedalaman rantai dibatasi [`MAX_POINTER_DEPTH`] per thread.

use std::cell::Cell;
use std::fmt;
use std::marker::PhantomData;
use std::ops::Range;

use crate::core::{Builder, Memory};
use crate::error::{Error, Result};
use crate::protocol::object::{span, Assign, Capabilities, Decode, Inline, Object};
use crate::protocol::scalar::Scalar;

/// Size of every pointer on the wire
pub const POINTER_SIZE: usize = 2;

/// Maximum number of nested pointers followed while computing an extent
pub const MAX_POINTER_DEPTH: usize = 256;

thread_local! {
    static EXTENT_DEPTH: Cell<usize> = Cell::new(0);
}

/// Satu hop rantai pointer; depth turun lagi saat guard di-drop
struct DepthGuard;

impl DepthGuard {
    fn enter() -> Result<Self> {
        EXTENT_DEPTH.with(|depth| {
            let next = depth.get() + 1;
            if next > MAX_POINTER_DEPTH {
                return Err(Error::PointerDepth(MAX_POINTER_DEPTH));
            }
            depth.set(next);
            Ok(DepthGuard)
        })
    }
}

impl Drop for DepthGuard {
    fn drop(&mut self) {
        EXTENT_DEPTH.with(|depth| depth.set(depth.get() - 1));
    }
}

/// Untyped pointer: offset manipulation only
#[derive(Clone)]
pub struct RawPointer {
    mem: Memory,
}

impl RawPointer {
    /// Binds a raw pointer to the first two bytes of `mem`
    pub fn from_memory(mem: Memory) -> Result<Self> {
        Ok(Self {
            mem: mem.slice(0, POINTER_SIZE)?,
        })
    }

    /// Allocates an uninitialised pointer
    pub fn create(builder: &mut Builder) -> Result<Self> {
        Self::from_memory(builder.allocate(POINTER_SIZE, 1)?)
    }

    /// Allocates a pointer holding `offset`
    pub fn create_with_offset(builder: &mut Builder, offset: i16) -> Result<Self> {
        let pointer = Self::create(builder)?;
        pointer.set_offset(offset);
        Ok(pointer)
    }

    /// Stored offset
    #[inline(always)]
    pub fn offset(&self) -> i16 {
        Scalar::<i16>::bind(self.mem.clone()).get()
    }

    /// Overwrites the stored offset
    #[inline(always)]
    pub fn set_offset(&self, offset: i16) {
        Scalar::<i16>::bind(self.mem.clone()).set(offset);
    }

    /// Points at the start of `target`, which must share this pointer's buffer
    pub fn point_to(&self, target: &Memory) -> Result<()> {
        if !self.mem.is_same_memory(target) {
            return Err(Error::ForeignMemory);
        }
        let delta = target.base() as isize - self.mem.base() as isize;
        let offset = i16::try_from(delta).map_err(|_| Error::OffsetOverflow(delta))?;
        self.set_offset(offset);
        Ok(())
    }

    /// View of the target, running to the end of the buffer
    pub fn deref_memory(&self) -> Result<Memory> {
        self.mem.relocate(self.offset() as isize)
    }

    /// Offset zero: the pointer refers to itself, treated as null
    #[inline(always)]
    pub fn is_null(&self) -> bool {
        self.offset() == 0
    }

    /// The pointer's own bytes
    #[inline(always)]
    pub fn memory(&self) -> &Memory {
        &self.mem
    }
}

/// Pointer to a `T`
///
/// Fixed once pointed: assignment through the pointee is not offered, only re-pointing.
pub struct Pointer<T> {
    raw: RawPointer,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Object> Pointer<T> {
    /// Allocates an uninitialised pointer
    pub fn create(builder: &mut Builder) -> Result<Self> {
        Ok(Self::wrap(RawPointer::create(builder)?))
    }

    /// Allocates a pointer and points it at `target`
    pub fn create_with_object(builder: &mut Builder, target: &T) -> Result<Self> {
        let pointer = Self::create(builder)?;
        pointer.point_to(target)?;
        Ok(pointer)
    }

    /// Points at `target`
    pub fn point_to(&self, target: &T) -> Result<()> {
        self.raw.point_to(target.memory())
    }

    /// The pointee
    pub fn deref(&self) -> Result<T> {
        T::from_memory(self.raw.deref_memory()?)
    }

    /// Decoded value of the pointee
    pub fn value(&self) -> Result<T::Value>
    where
        T: Decode,
    {
        self.deref()?.decode()
    }

    /// Untyped view of this pointer
    #[inline(always)]
    pub fn raw(&self) -> &RawPointer {
        &self.raw
    }

    /// Stored offset
    #[inline(always)]
    pub fn offset(&self) -> i16 {
        self.raw.offset()
    }

    /// Offset zero
    #[inline(always)]
    pub fn is_null(&self) -> bool {
        self.raw.is_null()
    }

    fn wrap(raw: RawPointer) -> Self {
        Self {
            raw,
            _marker: PhantomData,
        }
    }
}

impl<T> Clone for Pointer<T> {
    fn clone(&self) -> Self {
        Self {
            raw: self.raw.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: Object> Object for Pointer<T> {
    const SIZE: usize = POINTER_SIZE;
    const ALIGN: usize = POINTER_SIZE;
    const CAPS: Capabilities = Capabilities::POINTER;
    const NAME: &'static str = "Pointer";

    type Slot = Inline<Self>;

    #[inline(always)]
    fn bind(mem: Memory) -> Self {
        Self::wrap(RawPointer { mem })
    }

    #[inline(always)]
    fn memory(&self) -> &Memory {
        &self.raw.mem
    }

    fn extent(&self) -> Result<Range<usize>> {
        let base = self.raw.mem.base();
        let own = base..base + POINTER_SIZE;
        if self.is_null() {
            return Ok(own);
        }
        let _hop = DepthGuard::enter()?;
        Ok(span(own, self.deref()?.extent()?))
    }
}

impl<T: Object> Assign<&T> for Pointer<T> {
    fn assign(&self, target: &T) -> Result<()> {
        self.point_to(target)
    }
}

/// Re-points at the other pointer's target
impl<T: Object> Assign<&Pointer<T>> for Pointer<T> {
    fn assign(&self, other: &Pointer<T>) -> Result<()> {
        self.point_to(&other.deref()?)
    }
}

impl<T: Object> Assign<Pointer<T>> for Pointer<T> {
    fn assign(&self, other: Pointer<T>) -> Result<()> {
        self.assign(&other)
    }
}

impl<T: Object + Decode> Decode for Pointer<T> {
    type Value = T::Value;

    fn decode(&self) -> Result<T::Value> {
        self.value()
    }
}

impl<T> fmt::Debug for Pointer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pointer({:+})", self.raw.offset())
    }
}

impl fmt::Debug for RawPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RawPointer({:+})", self.offset())
    }
}
