//! Argument marshalling
//!
//! Setiap argumen call diproses dulu sebelum param struct dibangun:
//! - Scalar & enum: dipakai langsung
//! - Teks (`&str`, `String`): di-copy sebagai `lidl::String`
//! - Bytes (`&[u8]`, `Vec<u8>`): di-copy sebagai `Vector<U8>`
//! - Object lidl: deep copy ke region builder, sehingga buffer keluar self-contained
//!   (object di-pass by value; clone object hanya clone handle ke buffer)
//!
//! Bentuk lain (mis. sequence of sequence) tidak punya impl dan ditolak saat compile.

use crate::core::Builder;
use crate::error::Result;
use crate::protocol::{copy_into, Object, String, Vector, U8};

/// Native value that can be turned into something storable in `builder`'s region
///
/// ```
/// use lidl::{Builder, Decode, Marshal, Memory};
///
/// let mut builder = Builder::new(Memory::zeroed(64));
/// let bytes = vec![1u8, 2, 3].marshal(&mut builder).unwrap();
/// assert_eq!(bytes.decode().unwrap(), vec![1, 2, 3]);
/// ```
///
/// Sequence of sequence tidak punya wire form:
///
/// ```compile_fail
/// use lidl::{Builder, Marshal, Memory};
///
/// let mut builder = Builder::new(Memory::zeroed(64));
/// let nested: Vec<Vec<u8>> = vec![vec![1, 2], vec![3]];
/// nested.marshal(&mut builder).unwrap();
/// ```
pub trait Marshal {
    /// What ends up in the parameter struct
    type Wire;

    /// Copies or converts `self` into `builder`'s region
    fn marshal(self, builder: &mut Builder) -> Result<Self::Wire>;
}

macro_rules! marshal_identity {
    ($($t:ty),* $(,)?) => {
        $(
            impl Marshal for $t {
                type Wire = Self;

                #[inline(always)]
                fn marshal(self, _builder: &mut Builder) -> Result<Self> {
                    Ok(self)
                }
            }
        )*
    };
}

marshal_identity!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64, bool);

impl Marshal for &str {
    type Wire = String;

    fn marshal(self, builder: &mut Builder) -> Result<String> {
        String::create(builder, self)
    }
}

impl Marshal for std::string::String {
    type Wire = String;

    fn marshal(self, builder: &mut Builder) -> Result<String> {
        String::create(builder, &self)
    }
}

impl Marshal for &[u8] {
    type Wire = Vector<U8>;

    fn marshal(self, builder: &mut Builder) -> Result<Vector<U8>> {
        Vector::create(builder, self.iter().copied())
    }
}

impl Marshal for Vec<u8> {
    type Wire = Vector<U8>;

    fn marshal(self, builder: &mut Builder) -> Result<Vector<U8>> {
        self.as_slice().marshal(builder)
    }
}

impl<T: Object> Marshal for T {
    type Wire = T;

    fn marshal(self, builder: &mut Builder) -> Result<T> {
        copy_into(builder, &self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Memory;
    use crate::protocol::{Decode, I32};

    #[test]
    fn test_text_becomes_string() {
        let mut builder = Builder::new(Memory::zeroed(32));
        let wire = "hi".marshal(&mut builder).unwrap();
        assert_eq!(wire.value().unwrap(), "hi");
        assert!(wire.memory().is_same_memory(builder.memory()));
    }

    #[test]
    fn test_bytes_become_vector() {
        let mut builder = Builder::new(Memory::zeroed(32));
        let wire = vec![1u8, 2, 3].marshal(&mut builder).unwrap();
        assert_eq!(wire.decode().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_object_is_deep_copied() {
        let mut elsewhere = Builder::new(Memory::zeroed(16));
        let text = String::create(&mut elsewhere, "moved").unwrap();

        let mut builder = Builder::new(Memory::zeroed(32));
        let wire = text.clone().marshal(&mut builder).unwrap();
        assert!(wire.memory().is_same_memory(builder.memory()));
        assert_eq!(wire.value().unwrap(), "moved");

        let int = I32::new(5).marshal(&mut builder).unwrap();
        assert_eq!(int.get(), 5);
    }
}
