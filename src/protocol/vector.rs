//! Variable-length vectors
//!
//! ```text
//! ┌────────────┬─────┬─────────┬─────────┬─────┐
//! │ count: u16 │ pad │ slot[0] │ slot[1] │ ... │
//! └────────────┴─────┴─────────┴─────────┴─────┘
//!  ^ base             ^ base + round_up(2, element align)
//! ```
//!
//! Vector selalu reference type: di dalam struct/array/vector lain, slot-nya berupa pointer.

use std::fmt;
use std::marker::PhantomData;
use std::ops::Range;

use crate::core::{Builder, Memory};
use crate::error::{Error, Result};
use crate::protocol::object::{
    debug_result, span, Capabilities, Decode, Indirect, IntoSlot, Object, Slot,
};
use crate::protocol::scalar::Scalar;

const HEADER_SIZE: usize = 2;

#[inline(always)]
const fn round_up(value: usize, align: usize) -> usize {
    (value + align - 1) / align * align
}

/// Length-prefixed sequence of `T`
pub struct Vector<T> {
    mem: Memory,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Object> Vector<T> {
    /// Offset of the first element relative to the vector's base
    pub const DATA_OFFSET: usize = round_up(HEADER_SIZE, <T::Slot as Slot>::ALIGN);

    /// Allocates header and element block, then stores every item
    ///
    /// Header diallokasi dulu, lalu blok elemen dengan alignment elemen. Keduanya di-merge jadi
    /// satu view: karena builder bump-only, blok tepat berada di `DATA_OFFSET`.
    pub fn create<I, V>(builder: &mut Builder, items: I) -> Result<Self>
    where
        I: IntoIterator<Item = V>,
        I::IntoIter: ExactSizeIterator,
        V: IntoSlot<T::Slot>,
    {
        let items = items.into_iter();
        let count = items.len();
        let header = u16::try_from(count).map_err(|_| Error::TooLong(count))?;

        let mut mem = builder.allocate(HEADER_SIZE, Self::ALIGN)?;
        Scalar::<u16>::write(&mem, header)?;
        let block = builder.allocate(count * <T::Slot as Slot>::SIZE, <T::Slot as Slot>::ALIGN)?;
        mem.merge(&block)?;

        let vector = Self::bind(mem);
        for (index, item) in items.enumerate() {
            item.store(&vector.slot(index)?)?;
        }

        tracing::trace!(base = vector.mem.base(), count, elem = T::NAME, "vector created");
        Ok(vector)
    }

    /// Element count from the header
    #[inline(always)]
    pub fn len(&self) -> usize {
        Scalar::<u16>::bind(self.mem.clone()).get() as usize
    }

    /// True when the header count is zero
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Raw slot `index`
    pub fn slot(&self, index: usize) -> Result<T::Slot> {
        let len = self.len();
        if index >= len {
            return Err(Error::IndexOutOfRange { index, len });
        }
        let size = <T::Slot as Slot>::SIZE;
        Ok(<T::Slot as Slot>::bind(
            self.mem.slice(Self::DATA_OFFSET + index * size, size)?,
        ))
    }

    /// Element `index` (dereferenced when promoted)
    pub fn get(&self, index: usize) -> Result<T> {
        self.slot(index)?.load()
    }

    /// Stores `value` into element `index`
    pub fn set<V: IntoSlot<T::Slot>>(&self, index: usize, value: V) -> Result<()> {
        value.store(&self.slot(index)?)
    }

    /// Elements in order
    pub fn iter(&self) -> impl Iterator<Item = Result<T>> + '_ {
        (0..self.len()).map(move |index| self.get(index))
    }
}

impl<T> Clone for Vector<T> {
    fn clone(&self) -> Self {
        Self {
            mem: self.mem.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: Object> Object for Vector<T> {
    const SIZE: usize = HEADER_SIZE;
    // Header harus bisa ditempatkan sehingga data offset ter-align
    const ALIGN: usize = if <T::Slot as Slot>::ALIGN > HEADER_SIZE {
        <T::Slot as Slot>::ALIGN
    } else {
        HEADER_SIZE
    };
    const CAPS: Capabilities = Capabilities::REFERENCE;
    const NAME: &'static str = "Vector";

    type Slot = Indirect<Self>;

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

    fn extent(&self) -> Result<Range<usize>> {
        let base = self.mem.base();
        let len = self.len();
        let data_end = Self::DATA_OFFSET + len * <T::Slot as Slot>::SIZE;
        if data_end > self.mem.len() {
            return Err(Error::OutOfBounds {
                offset: 0,
                len: data_end,
                limit: self.mem.len(),
            });
        }

        let mut extent = base..base + data_end;
        for index in 0..len {
            extent = span(extent, self.slot(index)?.extent()?);
        }
        Ok(extent)
    }
}

impl<T: Object + Decode> Decode for Vector<T> {
    type Value = Vec<T::Value>;

    fn decode(&self) -> Result<Vec<T::Value>> {
        self.iter().map(|item| item?.decode()).collect()
    }
}

impl<T: Object + fmt::Debug> fmt::Debug for Vector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let items: Vec<Result<T>> = self.iter().collect();
        f.debug_list()
            .entries(items.iter().map(debug_result))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{Pointer, String, F64, I32, U8};

    #[test]
    fn test_header_and_data_layout() {
        let mut builder = Builder::new(Memory::zeroed(64));
        builder.allocate(1, 1).unwrap();
        let vector = Vector::<I32>::create(&mut builder, [5i32, -1, 7]).unwrap();

        assert_eq!(vector.memory().base(), 4);
        assert_eq!(vector.len(), 3);
        assert_eq!(Vector::<I32>::DATA_OFFSET, 4);
        let bytes = vector.memory().to_vec();
        assert_eq!(&bytes[..2], &[3, 0]);
        assert_eq!(&bytes[2..4], &[0, 0]);
        assert_eq!(&bytes[4..8], &[5, 0, 0, 0]);
        assert_eq!(vector.decode().unwrap(), vec![5, -1, 7]);
    }

    #[test]
    fn test_byte_vector_is_packed() {
        let mut builder = Builder::new(Memory::zeroed(16));
        let vector = Vector::<U8>::create(&mut builder, [1u8, 2, 3]).unwrap();
        assert_eq!(Vector::<U8>::DATA_OFFSET, 2);
        assert_eq!(Vector::<U8>::ALIGN, 2);
        assert_eq!(vector.memory().to_vec(), vec![3, 0, 1, 2, 3]);
        assert_eq!(vector.extent().unwrap(), 0..5);
    }

    #[test]
    fn test_wide_elements() {
        let mut builder = Builder::new(Memory::zeroed(64));
        builder.allocate(3, 1).unwrap();
        let vector = Vector::<F64>::create(&mut builder, [0.5f64, 1.5]).unwrap();
        assert_eq!(Vector::<F64>::ALIGN, 8);
        assert_eq!(vector.memory().base() % 8, 0);
        assert_eq!(vector.decode().unwrap(), vec![0.5, 1.5]);
    }

    #[test]
    fn test_empty() {
        let mut builder = Builder::new(Memory::zeroed(8));
        let vector = Vector::<I32>::create(&mut builder, Vec::<i32>::new()).unwrap();
        assert!(vector.is_empty());
        assert!(vector.get(0).is_err());
        assert_eq!(vector.decode().unwrap(), Vec::<i32>::new());
    }

    #[test]
    fn test_reference_elements() {
        let mut builder = Builder::new(Memory::zeroed(128));
        let words: Vec<String> = ["zero", "copy"]
            .iter()
            .map(|word| String::create(&mut builder, word).unwrap())
            .collect();
        let vector = Vector::<String>::create(&mut builder, words.iter()).unwrap();
        assert_eq!(vector.decode().unwrap(), vec!["zero", "copy"]);

        // Vector dari vector: elemen berupa pointer
        let outer = Vector::<Vector<String>>::create(&mut builder, [&vector]).unwrap();
        assert_eq!(outer.get(0).unwrap().len(), 2);
        assert_eq!(outer.extent().unwrap().start, words[0].memory().base());
    }

    #[test]
    fn test_dereferenced_vector() {
        let mut builder = Builder::new(Memory::zeroed(64));
        let vector = Vector::<U8>::create(&mut builder, [9u8, 8]).unwrap();
        let pointer = Pointer::create_with_object(&mut builder, &vector).unwrap();
        assert_eq!(pointer.value().unwrap(), vec![9, 8]);
    }

    #[test]
    fn test_too_long() {
        let mut builder = Builder::new(Memory::zeroed(8));
        let err = Vector::<U8>::create(&mut builder, vec![0u8; 70_000]).unwrap_err();
        assert!(matches!(err, Error::TooLong(70_000)));
    }
}
