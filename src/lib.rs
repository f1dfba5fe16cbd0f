//! lidl - Zero-Copy Schema-Driven Binary Encoding
//!
//! Arsitektur:
//! - Zero-Copy: value dibaca/ditulis langsung di buffer (heap atau mmap)
//! - Bump allocation: satu message = satu region, cursor hanya maju
//! - Relative pointers: reference type disimpan lewat offset 2 byte
//! - Tail-rooted messages: object terluar dibangun terakhir
//! - Call marshalling: call union → transport → return union
//!
//! ```text
//! core      Memory, Builder
//! protocol  Scalar, Enum, Pointer, Array, Vector, String, struct/union macros
//! service   Procedure, Client, Dispatch, lidl_service!
//! network   UdpTransport, UdpServer
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod network;
pub mod protocol;
pub mod service;

pub use crate::config::Config;
pub use crate::core::{Builder, Memory};
pub use crate::error::{Error, Result};
pub use crate::network::{UdpServer, UdpTransport};
pub use crate::protocol::{
    copy_into, Array, Assign, Bool, Capabilities, Decode, Enum, EnumValue, Indirect, Inline,
    IntoSlot, Object, Pointer, Primitive, RawPointer, Scalar, Slot, String, Tagged, Vector, F32,
    F64, I16, I32, I64, I8, MAX_POINTER_DEPTH, U16, U32, U64, U8,
};
pub use crate::service::{
    respond, root, serve, Client, Dispatch, Marshal, Procedure, Service, Transport,
};
