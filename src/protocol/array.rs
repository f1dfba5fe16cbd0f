//! Fixed-length arrays
//!
//! ```text
//! ┌─────────┬─────────┬─────┬───────────┐
//! │ slot[0] │ slot[1] │ ... │ slot[N-1] │   SIZE = N * slot size
//! └─────────┴─────────┴─────┴───────────┘
//! ```
//!
//! Element reference type → slot berisi pointer 2 byte.

use std::fmt;
use std::marker::PhantomData;
use std::ops::Range;

use crate::core::{Builder, Memory};
use crate::error::{Error, Result};
use crate::protocol::object::{
    debug_result, span, Assign, Capabilities, Decode, Inline, IntoSlot, Object, Slot,
};

/// `N` contiguous slots of `T`
pub struct Array<T, const N: usize> {
    mem: Memory,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Object, const N: usize> Array<T, N> {
    /// Allocates the array and stores every item
    ///
    /// Fails with [`Error::ShapeMismatch`] unless exactly `N` items are supplied. Iterator
    /// tidak dibaca melewati item ke `N + 1`, jadi `actual` paling besar `N + 1`.
    pub fn create<I, V>(builder: &mut Builder, items: I) -> Result<Self>
    where
        I: IntoIterator<Item = V>,
        V: IntoSlot<T::Slot>,
    {
        let array = Self::bind(builder.allocate(Self::SIZE, Self::ALIGN)?);
        let mut count = 0;
        for item in items {
            if count == N {
                return Err(Error::ShapeMismatch {
                    expected: N,
                    actual: N + 1,
                });
            }
            item.store(&array.slot(count)?)?;
            count += 1;
        }
        if count != N {
            return Err(Error::ShapeMismatch {
                expected: N,
                actual: count,
            });
        }
        Ok(array)
    }

    /// Number of elements (always `N`)
    #[inline(always)]
    pub const fn len(&self) -> usize {
        N
    }

    /// True for zero-length arrays
    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    /// Raw slot `index`
    #[inline]
    pub fn slot(&self, index: usize) -> Result<T::Slot> {
        if index >= N {
            return Err(Error::IndexOutOfRange { index, len: N });
        }
        let size = <T::Slot as Slot>::SIZE;
        Ok(<T::Slot as Slot>::bind(self.mem.slice(index * size, size)?))
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
        (0..N).map(move |index| self.get(index))
    }
}

impl<T, const N: usize> Clone for Array<T, N> {
    fn clone(&self) -> Self {
        Self {
            mem: self.mem.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: Object, const N: usize> Object for Array<T, N> {
    const SIZE: usize = <T::Slot as Slot>::SIZE * N;
    const ALIGN: usize = <T::Slot as Slot>::ALIGN;
    const CAPS: Capabilities = Capabilities::VALUE;
    const NAME: &'static str = "Array";

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

    fn extent(&self) -> Result<Range<usize>> {
        let base = self.mem.base();
        let mut extent = base..base + Self::SIZE;
        for index in 0..N {
            extent = span(extent, self.slot(index)?.extent()?);
        }
        Ok(extent)
    }
}

/// Element-wise assignment from a native array
impl<T: Object, V, const N: usize> Assign<[V; N]> for Array<T, N>
where
    V: IntoSlot<T::Slot>,
{
    fn assign(&self, values: [V; N]) -> Result<()> {
        for (index, value) in values.into_iter().enumerate() {
            self.set(index, value)?;
        }
        Ok(())
    }
}

/// Element-wise assignment from another stored array
///
/// Reference elements are re-pointed at the other array's targets.
impl<T: Object, const N: usize> Assign<&Array<T, N>> for Array<T, N>
where
    T: IntoSlot<T::Slot>,
{
    fn assign(&self, other: &Array<T, N>) -> Result<()> {
        for index in 0..N {
            self.set(index, other.get(index)?)?;
        }
        Ok(())
    }
}

impl<T: Object, const N: usize> Assign<Array<T, N>> for Array<T, N>
where
    T: IntoSlot<T::Slot>,
{
    fn assign(&self, other: Array<T, N>) -> Result<()> {
        self.assign(&other)
    }
}

impl<T: Object + Decode, const N: usize> Decode for Array<T, N> {
    type Value = Vec<T::Value>;

    fn decode(&self) -> Result<Vec<T::Value>> {
        self.iter().map(|item| item?.decode()).collect()
    }
}

impl<T: Object + fmt::Debug, const N: usize> fmt::Debug for Array<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let items: Vec<Result<T>> = self.iter().collect();
        f.debug_list()
            .entries(items.iter().map(debug_result))
            .finish()
    }
}
