//! Stored objects dan aturan promosi reference → pointer
//!
//! Setiap tipe yang bisa di-encode membawa descriptor statis lewat trait [`Object`]:
//! ukuran tetap, alignment, dan capability flags. Tidak ada introspeksi runtime.
//!
//! Promosi:
//! - Value type (scalar, array, struct biasa) disimpan inline di slot-nya → [`Inline`]
//! - Reference type (string, vector, struct/union yang ditandai reference) disimpan di tempat
//!   lain; slot hanya berisi pointer 2 byte → [`Indirect`]
//!
//! Array, vector, member struct dan member union selalu menyimpan `T::Slot`.

use std::fmt;
use std::ops::Range;

use crate::core::{Builder, Memory};
use crate::error::{Error, Result};
use crate::protocol::Pointer;

/// Capability flags of a type descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Logical value is reached by dereferencing a pointer
    pub is_ref: bool,
    /// The type is itself a pointer
    pub is_ptr: bool,
}

impl Capabilities {
    /// Plain value type, stored inline
    pub const VALUE: Self = Self {
        is_ref: false,
        is_ptr: false,
    };
    /// Reference type, promoted to a pointer in every slot
    pub const REFERENCE: Self = Self {
        is_ref: true,
        is_ptr: false,
    };
    /// Pointer type, stored inline (never promoted again)
    pub const POINTER: Self = Self {
        is_ref: false,
        is_ptr: true,
    };

    /// True when slots of this type hold a pointer instead of the value
    #[inline(always)]
    pub const fn promotes_to_pointer(&self) -> bool {
        self.is_ref && !self.is_ptr
    }
}

/// A type descriptor bound to a region of memory
///
/// Implementations are transient views: they own no bytes, reading and writing goes straight to
/// the underlying buffer.
pub trait Object: Sized + Clone {
    /// Fixed size in bytes
    const SIZE: usize;
    /// Alignment used when the builder allocates this type
    const ALIGN: usize;
    /// Capability flags
    const CAPS: Capabilities;
    /// Type name for diagnostics
    const NAME: &'static str;

    /// What a member or element slot of this type stores
    type Slot: Slot<Target = Self>;

    /// Binds the descriptor to `mem` without checking its length
    ///
    /// Callers must guarantee `mem.len() >= Self::SIZE`; use [`Object::from_memory`] otherwise.
    #[doc(hidden)]
    fn bind(mem: Memory) -> Self;

    /// The region this object lives in
    fn memory(&self) -> &Memory;

    /// Binds the descriptor to `mem`, checking that `SIZE` bytes are available
    fn from_memory(mem: Memory) -> Result<Self> {
        if mem.len() < Self::SIZE {
            return Err(Error::OutOfBounds {
                offset: 0,
                len: Self::SIZE,
                limit: mem.len(),
            });
        }
        Ok(Self::bind(mem))
    }

    /// Absolute byte range covering this value and everything it points to
    fn extent(&self) -> Result<Range<usize>> {
        let base = self.memory().base();
        Ok(base..base + Self::SIZE)
    }
}

/// Storage for a `Target` inside an array element or compound member
pub trait Slot: Sized {
    /// Logical type held by the slot
    type Target: Object;
    /// Bytes the slot occupies
    const SIZE: usize;
    /// Alignment of the slot
    const ALIGN: usize;

    /// Binds the slot to exactly `SIZE` bytes
    #[doc(hidden)]
    fn bind(mem: Memory) -> Self;

    /// Reads the logical value (dereferencing when promoted)
    fn load(&self) -> Result<Self::Target>;

    /// Absolute byte range of the slot and everything it reaches
    fn extent(&self) -> Result<Range<usize>>;
}

/// Slot holding the value itself
pub struct Inline<T>(T);

impl<T> Inline<T> {
    /// The inline value
    #[inline(always)]
    pub fn value(&self) -> &T {
        &self.0
    }
}

impl<T: Object> Slot for Inline<T> {
    type Target = T;
    const SIZE: usize = T::SIZE;
    const ALIGN: usize = T::ALIGN;

    #[inline(always)]
    fn bind(mem: Memory) -> Self {
        Inline(T::bind(mem))
    }

    #[inline(always)]
    fn load(&self) -> Result<T> {
        Ok(self.0.clone())
    }

    fn extent(&self) -> Result<Range<usize>> {
        self.0.extent()
    }
}

/// Slot holding a pointer to a reference-type value stored elsewhere
pub struct Indirect<T>(Pointer<T>);

impl<T> Indirect<T> {
    /// The pointer stored in the slot
    #[inline(always)]
    pub fn pointer(&self) -> &Pointer<T> {
        &self.0
    }
}

impl<T: Object> Slot for Indirect<T> {
    type Target = T;
    const SIZE: usize = <Pointer<T> as Object>::SIZE;
    const ALIGN: usize = <Pointer<T> as Object>::ALIGN;

    #[inline(always)]
    fn bind(mem: Memory) -> Self {
        Indirect(Pointer::bind(mem))
    }

    #[inline(always)]
    fn load(&self) -> Result<T> {
        self.0.deref()
    }

    fn extent(&self) -> Result<Range<usize>> {
        self.0.extent()
    }
}

/// In-place value assignment
pub trait Assign<V> {
    /// Writes `value` into this object's bytes
    fn assign(&self, value: V) -> Result<()>;
}

/// Values that can be stored into a slot of type `S`
///
/// Inline slots accept anything the target can [`Assign`] from. Indirect slots accept a
/// reference-type object (owned or borrowed) and point to it.
pub trait IntoSlot<S> {
    /// Stores `self` into `slot`
    fn store(self, slot: &S) -> Result<()>;
}

impl<T, V> IntoSlot<Inline<T>> for V
where
    T: Object + Assign<V>,
{
    #[inline(always)]
    fn store(self, slot: &Inline<T>) -> Result<()> {
        slot.0.assign(self)
    }
}

impl<'a, T: Object> IntoSlot<Indirect<T>> for &'a T {
    #[inline(always)]
    fn store(self, slot: &Indirect<T>) -> Result<()> {
        slot.0.point_to(self)
    }
}

impl<T: Object> IntoSlot<Indirect<T>> for T {
    #[inline(always)]
    fn store(self, slot: &Indirect<T>) -> Result<()> {
        slot.0.point_to(&self)
    }
}

/// Conversion of a stored object into its logical Rust value
pub trait Decode {
    /// Decoded representation
    type Value;

    /// Reads the value out of the buffer
    fn decode(&self) -> Result<Self::Value>;
}

/// Smallest range covering both `a` and `b`
#[inline]
pub fn span(a: Range<usize>, b: Range<usize>) -> Range<usize> {
    a.start.min(b.start)..a.end.max(b.end)
}

/// Deep-copies `value` and everything it points to into `builder`'s region
///
/// The whole extent moves by a single delta, so relative pointers inside it stay valid.
pub fn copy_into<T: Object>(builder: &mut Builder, value: &T) -> Result<T> {
    let extent = value.extent()?;
    let root = value.memory().base();
    let source = value
        .memory()
        .relocate(extent.start as isize - root as isize)?
        .slice(0, extent.end - extent.start)?;

    // Copy dulu ke Vec: source dan target bisa berada di buffer yang sama
    let bytes = source.to_vec();
    let target = builder.allocate(bytes.len(), 1)?;
    target.write(0, &bytes)?;

    T::from_memory(target.slice_from(root - extent.start)?)
}

/// Writes `Err(..)` or the decoded value of a member for `Debug` output
#[doc(hidden)]
pub fn debug_result<T: fmt::Debug>(result: &Result<T>) -> &dyn fmt::Debug {
    match result {
        Ok(value) => value,
        Err(err) => err,
    }
}
