//! Offset width markers.
//!
//! OpenType stores most inter-table links as an offset, in bytes, from some
//! base location. The offset width (16, 24 or 32 bits) varies by field; the
//! table navigator uses these marker types to know how many bytes to read
//! before resolving the link.

use crate::scalar::{Scalar, Uint24};

/// An offset of statically-known width, read as `W` and widened to `u32`.
pub trait OffsetWidth: Scalar {
    fn widen(self) -> u32;
}

impl OffsetWidth for u16 {
    fn widen(self) -> u32 {
        self as u32
    }
}

impl OffsetWidth for Uint24 {
    fn widen(self) -> u32 {
        self.to_u32()
    }
}

impl OffsetWidth for u32 {
    fn widen(self) -> u32 {
        self
    }
}

/// `true` for a null offset (the OpenType convention for "field absent").
pub fn is_null(raw: u32) -> bool {
    raw == 0
}
