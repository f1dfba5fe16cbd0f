//! Scalar codecs: integers, floats, booleans
//!
//! Semua scalar fixed-size dan little-endian:
//! - Integer: two's-complement
//! - Float: IEEE-754
//! - Bool: 1 byte, 0 = false, non-zero = true

use std::fmt;
use std::marker::PhantomData;

use crate::core::Memory;
use crate::error::Result;
use crate::protocol::object::{Assign, Capabilities, Decode, Inline, Object};

/// A fixed-width value with an explicit little-endian codec
pub trait Primitive: Copy + PartialEq + fmt::Debug {
    /// Encoded width in bytes
    const SIZE: usize;
    /// Wire type name
    const NAME: &'static str;

    /// Decodes from exactly `SIZE` bytes
    fn read_le(bytes: &[u8]) -> Self;

    /// Encodes into exactly `SIZE` bytes
    fn write_le(self, bytes: &mut [u8]);
}

macro_rules! impl_primitive {
    ($($t:ty => $name:literal),* $(,)?) => {
        $(
            impl Primitive for $t {
                const SIZE: usize = std::mem::size_of::<$t>();
                const NAME: &'static str = $name;

                #[inline(always)]
                fn read_le(bytes: &[u8]) -> Self {
                    let mut raw = [0u8; std::mem::size_of::<$t>()];
                    raw.copy_from_slice(bytes);
                    <$t>::from_le_bytes(raw)
                }

                #[inline(always)]
                fn write_le(self, bytes: &mut [u8]) {
                    bytes.copy_from_slice(&self.to_le_bytes());
                }
            }
        )*
    };
}

impl_primitive!(
    i8 => "I8",
    i16 => "I16",
    i32 => "I32",
    i64 => "I64",
    u8 => "U8",
    u16 => "U16",
    u32 => "U32",
    u64 => "U64",
    f32 => "F32",
    f64 => "F64",
);

impl Primitive for bool {
    const SIZE: usize = 1;
    const NAME: &'static str = "Bool";

    #[inline(always)]
    fn read_le(bytes: &[u8]) -> Self {
        bytes[0] != 0
    }

    #[inline(always)]
    fn write_le(self, bytes: &mut [u8]) {
        bytes[0] = self as u8;
    }
}

/// Stored scalar of primitive type `P`
pub struct Scalar<P> {
    mem: Memory,
    _marker: PhantomData<P>,
}

/// Signed 8-bit integer
pub type I8 = Scalar<i8>;
/// Signed 16-bit integer
pub type I16 = Scalar<i16>;
/// Signed 32-bit integer
pub type I32 = Scalar<i32>;
/// Signed 64-bit integer
pub type I64 = Scalar<i64>;
/// Unsigned 8-bit integer
pub type U8 = Scalar<u8>;
/// Unsigned 16-bit integer
pub type U16 = Scalar<u16>;
/// Unsigned 32-bit integer
pub type U32 = Scalar<u32>;
/// Unsigned 64-bit integer
pub type U64 = Scalar<u64>;
/// 32-bit float
pub type F32 = Scalar<f32>;
/// 64-bit float
pub type F64 = Scalar<f64>;
/// Boolean
pub type Bool = Scalar<bool>;

impl<P: Primitive> Scalar<P> {
    /// Standalone scalar over its own zeroed buffer
    pub fn new(value: P) -> Self {
        let scalar = Self::bind(Memory::zeroed(P::SIZE));
        scalar.set(value);
        scalar
    }

    /// Decodes the value at the start of `mem`
    #[inline]
    pub fn read(mem: &Memory) -> Result<P> {
        Ok(P::read_le(&mem.slice(0, P::SIZE)?.bytes()))
    }

    /// Encodes `value` at the start of `mem`
    #[inline]
    pub fn write(mem: &Memory, value: P) -> Result<()> {
        value.write_le(&mut mem.slice(0, P::SIZE)?.bytes_mut());
        Ok(())
    }

    /// Current value
    #[inline(always)]
    pub fn get(&self) -> P {
        P::read_le(&self.mem.bytes()[..P::SIZE])
    }

    /// Overwrites the value in place
    #[inline(always)]
    pub fn set(&self, value: P) {
        value.write_le(&mut self.mem.bytes_mut()[..P::SIZE]);
    }
}

impl<P> Clone for Scalar<P> {
    fn clone(&self) -> Self {
        Self {
            mem: self.mem.clone(),
            _marker: PhantomData,
        }
    }
}

impl<P: Primitive> Object for Scalar<P> {
    const SIZE: usize = P::SIZE;
    const ALIGN: usize = P::SIZE;
    const CAPS: Capabilities = Capabilities::VALUE;
    const NAME: &'static str = P::NAME;

    type Slot = Inline<Self>;

    #[inline(always)]
    fn bind(mem: Memory) -> Self {
        Self {
            mem,
            _marker: PhantomData,
        }
    }

    #[inline(always)]
    fn memory(&self) -> &Memory {
        &self.mem
    }
}

impl<P: Primitive> Assign<P> for Scalar<P> {
    #[inline(always)]
    fn assign(&self, value: P) -> Result<()> {
        self.set(value);
        Ok(())
    }
}

impl<P: Primitive> Assign<&Scalar<P>> for Scalar<P> {
    #[inline(always)]
    fn assign(&self, value: &Scalar<P>) -> Result<()> {
        self.set(value.get());
        Ok(())
    }
}

impl<P: Primitive> Assign<Scalar<P>> for Scalar<P> {
    #[inline(always)]
    fn assign(&self, value: Scalar<P>) -> Result<()> {
        self.assign(&value)
    }
}

impl<P: Primitive> Decode for Scalar<P> {
    type Value = P;

    #[inline(always)]
    fn decode(&self) -> Result<P> {
        Ok(self.get())
    }
}

impl<P: Primitive> fmt::Debug for Scalar<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:?})", P::NAME, self.get())
    }
}
