//! Glyph identifiers.

use std::fmt;

/// A 16-bit glyph index into a font's glyph table.
///
/// Kept as a distinct type rather than a bare `u16` so that call sites that
/// mean "glyph" and call sites that mean "codepoint" can't be confused by
/// the type checker.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GlyphId(u16);

impl GlyphId {
    /// The identifier that renderers use for "no such glyph".
    pub const NOTDEF: GlyphId = GlyphId(0);

    pub const fn new(raw: u16) -> Self {
        GlyphId(raw)
    }

    pub const fn to_u16(self) -> u16 {
        self.0
    }

    pub const fn to_u32(self) -> u32 {
        self.0 as u32
    }
}

impl fmt::Display for GlyphId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gid{}", self.0)
    }
}

impl From<u16> for GlyphId {
    fn from(value: u16) -> Self {
        GlyphId(value)
    }
}
