//! The "Binary Segment": a zero-copy, bounds-checked view over a byte range.
//!
//! Every navigable location in a font is, underneath, a `Segment` plus a
//! local offset into it. `Segment` never allocates and never panics on bad
//! input; out-of-range reads become a [`ReadError::OutOfBounds`].

use std::ops::{Range, RangeBounds};

use font_types::{FixedSize, Scalar};

use crate::error::ReadError;

/// A borrowed, bounds-checked view over a contiguous byte range of a `Font`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Segment<'a> {
    bytes: &'a [u8],
}

impl<'a> Segment<'a> {
    pub const EMPTY: Segment<'static> = Segment { bytes: &[] };

    pub const fn new(bytes: &'a [u8]) -> Self {
        Segment { bytes }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// A sub-segment covering `range`, or `None` if it runs past the end.
    pub fn slice(&self, range: impl RangeBounds<usize>) -> Option<Segment<'a>> {
        let start = match range.start_bound() {
            std::ops::Bound::Included(&n) => n,
            std::ops::Bound::Excluded(&n) => n.checked_add(1)?,
            std::ops::Bound::Unbounded => 0,
        };
        let end = match range.end_bound() {
            std::ops::Bound::Included(&n) => n.checked_add(1)?,
            std::ops::Bound::Excluded(&n) => n,
            std::ops::Bound::Unbounded => self.bytes.len(),
        };
        self.bytes.get(start..end).map(Segment::new)
    }

    /// `self[pos..]`, or `None` if `pos` is past the end.
    pub fn tail(&self, pos: usize) -> Option<Segment<'a>> {
        self.bytes.get(pos..).map(Segment::new)
    }

    /// Reads a scalar at `offset` without advancing any cursor.
    pub fn read<T: Scalar + FixedSize>(&self, offset: usize) -> Result<T, ReadError> {
        let end = offset.checked_add(T::RAW_BYTE_LEN).ok_or(ReadError::OutOfBounds)?;
        let raw = self.bytes.get(offset..end).ok_or(ReadError::OutOfBounds)?;
        let mut buf = T::Raw::default();
        buf.as_mut().copy_from_slice(raw);
        Ok(T::from_raw(buf))
    }

    pub fn read_u8(&self, offset: usize) -> Result<u8, ReadError> {
        self.read(offset)
    }

    pub fn read_u16(&self, offset: usize) -> Result<u16, ReadError> {
        self.read(offset)
    }

    pub fn read_i16(&self, offset: usize) -> Result<i16, ReadError> {
        self.read(offset)
    }

    pub fn read_u32(&self, offset: usize) -> Result<u32, ReadError> {
        self.read(offset)
    }

    /// Reads `count` values of `T` starting at `offset`, as a plain slice
    /// view rather than a copy, when `T`'s raw layout allows it.
    pub fn read_array<T: Scalar + FixedSize>(
        &self,
        offset: usize,
        count: usize,
    ) -> Result<ScalarArray<'a, T>, ReadError> {
        let total = count
            .checked_mul(T::RAW_BYTE_LEN)
            .ok_or(ReadError::OutOfBounds)?;
        let seg = self.slice(offset..offset.checked_add(total).ok_or(ReadError::OutOfBounds)?)
            .ok_or(ReadError::OutOfBounds)?;
        Ok(ScalarArray { seg, len: count, _t: std::marker::PhantomData })
    }

    /// The absolute byte range `self` spans relative to its owning `Font`.
    ///
    /// Computed from pointer arithmetic against `base`; used only for error
    /// reporting, never for bounds decisions.
    pub fn offset_within(&self, base: &[u8]) -> usize {
        let base_ptr = base.as_ptr() as usize;
        let self_ptr = self.bytes.as_ptr() as usize;
        self_ptr.saturating_sub(base_ptr)
    }
}

/// A lazily-decoded, contiguous run of fixed-size big-endian scalars.
#[derive(Clone, Copy, Debug)]
pub struct ScalarArray<'a, T> {
    seg: Segment<'a>,
    len: usize,
    _t: std::marker::PhantomData<T>,
}

impl<'a, T: Scalar + FixedSize> ScalarArray<'a, T> {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn get(&self, index: usize) -> Option<T> {
        if index >= self.len {
            return None;
        }
        self.seg.read(index * T::RAW_BYTE_LEN).ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        (0..self.len).filter_map(move |i| self.get(i))
    }
}

pub(crate) fn checked_range(start: usize, len: usize) -> Option<Range<usize>> {
    start.checked_add(len).map(|end| start..end)
}
