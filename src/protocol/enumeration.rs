//! Enum codecs
//!
//! Enum = integer dengan nama-nama konstanta. Encode/decode didelegasikan ke integer codec.
//! Nilai di luar daftar nama tetap valid: hasil decode hanya tidak punya nama.

use std::fmt;
use std::marker::PhantomData;

use crate::core::Memory;
use crate::error::Result;
use crate::protocol::object::{Assign, Capabilities, Decode, Inline, Object};
use crate::protocol::scalar::{Primitive, Scalar};

/// Integer-backed named constant set, as generated by [`lidl_enum!`](crate::lidl_enum)
pub trait EnumValue: Copy + PartialEq + fmt::Debug + 'static {
    /// Underlying integer
    type Repr: Primitive;
    /// Enum type name
    const NAME: &'static str;
    /// Named constants in declaration order
    const VARIANTS: &'static [(&'static str, Self)];

    /// Wraps a raw integer (any value, named or not)
    fn from_repr(repr: Self::Repr) -> Self;

    /// The raw integer
    fn to_repr(self) -> Self::Repr;

    /// Constant name, if the value has one
    fn name(self) -> Option<&'static str> {
        Self::VARIANTS
            .iter()
            .find(|(_, value)| *value == self)
            .map(|(name, _)| *name)
    }
}

/// Stored enum value
pub struct Enum<E> {
    mem: Memory,
    _marker: PhantomData<E>,
}

impl<E: EnumValue> Enum<E> {
    /// Current value
    #[inline(always)]
    pub fn get(&self) -> E {
        E::from_repr(Scalar::<E::Repr>::bind(self.mem.clone()).get())
    }

    /// Overwrites the value in place
    #[inline(always)]
    pub fn set(&self, value: E) {
        Scalar::<E::Repr>::bind(self.mem.clone()).set(value.to_repr());
    }
}

impl<E> Clone for Enum<E> {
    fn clone(&self) -> Self {
        Self {
            mem: self.mem.clone(),
            _marker: PhantomData,
        }
    }
}

impl<E: EnumValue> Object for Enum<E> {
    const SIZE: usize = <E::Repr as Primitive>::SIZE;
    const ALIGN: usize = <E::Repr as Primitive>::SIZE;
    const CAPS: Capabilities = Capabilities::VALUE;
    const NAME: &'static str = E::NAME;

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

impl<E: EnumValue> Assign<E> for Enum<E> {
    fn assign(&self, value: E) -> Result<()> {
        self.set(value);
        Ok(())
    }
}

impl<E: EnumValue> Assign<&Enum<E>> for Enum<E> {
    fn assign(&self, value: &Enum<E>) -> Result<()> {
        self.set(value.get());
        Ok(())
    }
}

impl<E: EnumValue> Assign<Enum<E>> for Enum<E> {
    fn assign(&self, value: Enum<E>) -> Result<()> {
        self.assign(&value)
    }
}

impl<E: EnumValue> Decode for Enum<E> {
    type Value = E;

    fn decode(&self) -> Result<E> {
        Ok(self.get())
    }
}

impl<E: EnumValue> fmt::Debug for Enum<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.get(), f)
    }
}

/// Declares an integer-backed enum value type
///
/// ```
/// lidl::lidl_enum! {
///     pub enum Color: u8 {
///         RED = 0,
///         GREEN = 1,
///     }
/// }
///
/// assert_eq!(Color::GREEN.0, 1);
/// assert_eq!(Color(7).name(), None);
/// ```
#[macro_export]
macro_rules! lidl_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident : $repr:ty {
            $( $(#[$vmeta:meta])* $variant:ident = $value:expr ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash)]
        $vis struct $name(pub $repr);

        #[allow(dead_code)]
        impl $name {
            $(
                $(#[$vmeta])*
                pub const $variant: Self = Self($value);
            )*

            /// Constant name, if the value has one
            pub fn name(self) -> ::core::option::Option<&'static str> {
                <Self as $crate::EnumValue>::name(self)
            }
        }

        impl $crate::EnumValue for $name {
            type Repr = $repr;
            const NAME: &'static str = stringify!($name);
            const VARIANTS: &'static [(&'static str, Self)] = &[
                $( (stringify!($variant), Self($value)) ),*
            ];

            #[inline(always)]
            fn from_repr(repr: $repr) -> Self {
                Self(repr)
            }

            #[inline(always)]
            fn to_repr(self) -> $repr {
                self.0
            }
        }

        impl $crate::Marshal for $name {
            type Wire = Self;

            #[inline(always)]
            fn marshal(self, _builder: &mut $crate::Builder) -> $crate::Result<Self> {
                Ok(self)
            }
        }

        impl ::core::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                match <Self as $crate::EnumValue>::name(*self) {
                    Some(name) => write!(f, "{}::{}", stringify!($name), name),
                    None => write!(f, "{}({:?})", stringify!($name), self.0),
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    crate::lidl_enum! {
        enum SomeEnum: i32 {
            X = 1,
            Y = 2,
            Z = 3,
        }
    }

    #[test]
    fn test_named_constants() {
        assert_eq!(SomeEnum::Y.0, 2);
        assert_eq!(SomeEnum::Z.name(), Some("Z"));
        assert_eq!(format!("{:?}", SomeEnum::X), "SomeEnum::X");
    }

    #[test]
    fn test_unknown_value_decodes_without_name() {
        let mem = Memory::new(vec![42, 0, 0, 0]);
        let stored = Enum::<SomeEnum>::from_memory(mem).unwrap();
        let value = stored.get();
        assert_eq!(value, SomeEnum(42));
        assert_eq!(value.name(), None);
        assert_ne!(value, SomeEnum::X);
        assert_eq!(format!("{value:?}"), "SomeEnum(42)");
    }

    #[test]
    fn test_delegates_to_repr_codec() {
        let mem = Memory::zeroed(4);
        let stored = Enum::<SomeEnum>::from_memory(mem.clone()).unwrap();
        stored.set(SomeEnum::Z);
        assert_eq!(mem.to_vec(), vec![3, 0, 0, 0]);
        assert_eq!(Scalar::<i32>::read(&mem).unwrap(), 3);
    }
}
