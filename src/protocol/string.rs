//! Length-prefixed UTF-8 strings
//!
//! ```text
//! ┌─────────────┬──────────────────────┐
//! │ length: u16 │ bytes[0 .. length]   │   tanpa NUL terminator
//! └─────────────┴──────────────────────┘
//! ```

use std::fmt;
use std::ops::Range;

use crate::core::{Builder, Memory};
use crate::error::{Error, Result};
use crate::protocol::object::{Capabilities, Decode, Indirect, Object};
use crate::protocol::scalar::Scalar;

const HEADER_SIZE: usize = 2;

/// Stored string (reference type)
#[derive(Clone)]
pub struct String {
    mem: Memory,
}

impl String {
    /// Allocates header plus bytes and writes `value`
    pub fn create(builder: &mut Builder, value: &str) -> Result<Self> {
        let len = value.len();
        let header = u16::try_from(len).map_err(|_| Error::TooLong(len))?;

        let mem = builder.allocate(HEADER_SIZE + len, Self::ALIGN)?;
        Scalar::<u16>::write(&mem, header)?;
        mem.write(HEADER_SIZE, value.as_bytes())?;
        Ok(Self { mem })
    }

    /// Byte length from the header
    #[inline(always)]
    pub fn len(&self) -> usize {
        Scalar::<u16>::bind(self.mem.clone()).get() as usize
    }

    /// True for the empty string
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Raw bytes, copied out
    pub fn bytes(&self) -> Result<Vec<u8>> {
        Ok(self.mem.slice(HEADER_SIZE, self.len())?.to_vec())
    }

    /// Decoded text
    pub fn value(&self) -> Result<std::string::String> {
        let data = self.mem.slice(HEADER_SIZE, self.len())?;
        let bytes = data.bytes();
        Ok(std::str::from_utf8(&bytes)?.to_owned())
    }
}

impl Object for String {
    const SIZE: usize = HEADER_SIZE;
    const ALIGN: usize = HEADER_SIZE;
    const CAPS: Capabilities = Capabilities::REFERENCE;
    const NAME: &'static str = "String";

    type Slot = Indirect<Self>;

    #[inline(always)]
    fn bind(mem: Memory) -> Self {
        Self { mem }
    }

    #[inline(always)]
    fn memory(&self) -> &Memory {
        &self.mem
    }

    fn extent(&self) -> Result<Range<usize>> {
        let data = self.mem.slice(0, HEADER_SIZE + self.len())?;
        Ok(data.base()..data.end())
    }
}

impl Decode for String {
    type Value = std::string::String;

    fn decode(&self) -> Result<std::string::String> {
        self.value()
    }
}

impl fmt::Debug for String {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value() {
            Ok(value) => fmt::Debug::fmt(&value, f),
            Err(err) => write!(f, "String(<{err}>)"),
        }
    }
}
