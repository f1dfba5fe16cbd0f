//! Service Layer: procedure-call marshalling di atas encoding lidl
//!
//! Request dan response masing-masing satu buffer:
//! ```text
//! request:  ┌──────────────────────────────┬───────────────┐
//!           │ param struct + data argumen  │ call union    │  <- root di tail
//!           └──────────────────────────────┴───────────────┘
//! response: ┌──────────────────────────────┬───────────────┐
//!           │ {ret0} + data hasil          │ return union  │  <- root di tail
//!           └──────────────────────────────┴───────────────┘
//! ```
//!
//! Root selalu dibangun terakhir: pointer hanya bermakna setelah target-nya ada, jadi object
//! terluar menempati alamat tertinggi.

mod client;
mod dispatch;
mod marshal;
mod stub;

pub use client::{Client, Transport};
pub use dispatch::{respond, serve, Dispatch};
pub use marshal::Marshal;

use crate::core::{Builder, Memory};
use crate::error::{Error, Result};
use crate::protocol::{EnumValue, Object, Tagged};

/// A set of procedures sharing one call union and one return union
pub trait Service {
    /// Service name
    const NAME: &'static str;
    /// Procedure names in declaration order
    const PROCEDURES: &'static [&'static str];

    /// Procedure identifier carried by both unions
    type Tag: EnumValue;
    /// Request envelope
    type Call: Tagged<Tag = Self::Tag>;
    /// Response envelope
    type Return: Tagged<Tag = Self::Tag>;
}

/// One procedure of a [`Service`]
///
/// Implementations are generated by [`lidl_service!`](crate::lidl_service). Tag checks happen
/// in [`Client::invoke`] and [`serve`] before the raw union getters are used.
pub trait Procedure {
    /// Owning service
    type Service: Service;
    /// Procedure name
    const NAME: &'static str;
    /// Union tag selecting this procedure
    const TAG: <Self::Service as Service>::Tag;

    /// Parameter struct
    type Params: Object;
    /// Native return value
    type Output;

    /// Builds the call union around `params`
    fn wrap_call(
        builder: &mut Builder,
        params: Self::Params,
    ) -> Result<<Self::Service as Service>::Call>;

    /// Parameter struct of a call union
    fn unwrap_call(call: &<Self::Service as Service>::Call) -> Result<Self::Params>;

    /// Builds `{ret0: output}` and the return union around it
    fn wrap_return(
        builder: &mut Builder,
        output: Self::Output,
    ) -> Result<<Self::Service as Service>::Return>;

    /// Decoded `ret0` of a return union
    fn unwrap_return(ret: &<Self::Service as Service>::Return) -> Result<Self::Output>;
}

/// Binds the tail-located root object of a message
///
/// Root menempati `T::SIZE` byte terakhir dari `mem`.
pub fn root<T: Object>(mut mem: Memory) -> Result<T> {
    let len = mem.len();
    if len < T::SIZE {
        return Err(Error::OutOfBounds {
            offset: 0,
            len: T::SIZE,
            limit: len,
        });
    }
    let base = mem.end() - T::SIZE;
    mem.set_base(base)?;
    T::from_memory(mem)
}
