//! Protocol Layer: Zero-Copy Schema-Driven Encoding
//!
//! Prinsip desain:
//! - Flat Binary: value dibaca/ditulis langsung di buffer, tanpa representasi perantara
//! - Static descriptors: size, alignment dan capability flags diketahui saat compile
//! - Relative pointers: offset 2 byte, extent bisa dipindah utuh
//! - Little-endian untuk semua integer di wire

mod array;
mod compound;
mod enumeration;
mod object;
mod pointer;
mod scalar;
mod string;
mod vector;

pub use array::Array;
pub use compound::Tagged;
pub use enumeration::{Enum, EnumValue};
pub use object::{copy_into, span, Assign, Capabilities, Decode, Indirect, Inline, IntoSlot, Object, Slot};
pub use pointer::{Pointer, RawPointer, MAX_POINTER_DEPTH, POINTER_SIZE};
pub use scalar::{Bool, Primitive, Scalar, F32, F64, I16, I32, I64, I8, U16, U32, U64, U8};
pub use string::String;
pub use vector::Vector;

#[doc(hidden)]
pub use compound::{load_member, member_extent, member_slot, store_member};
#[doc(hidden)]
pub use object::debug_result;
