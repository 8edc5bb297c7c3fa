//! Scalar types shared between the OpenType table navigator and the shaping
//! pipeline built on top of it: tags, glyph ids, and the big-endian/offset
//! primitives used to describe on-disk layout without owning any bytes.

mod glyph;
mod offset;
mod scalar;
mod tag;

pub use glyph::GlyphId;
pub use offset::{is_null, OffsetWidth};
pub use scalar::{FixedSize, Scalar, Uint24};
pub use tag::{InvalidTag, Tag};
