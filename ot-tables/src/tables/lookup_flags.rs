//! The per-lookup flag bitset (`lookupFlag` in the OpenType spec).

/// Flags that control how a lookup walks the glyph buffer: which glyph
/// classes it skips over, and (for GPOS cursive attachment) which direction
/// the final glyph is pinned to the baseline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LookupFlags(u16);

impl LookupFlags {
    const RIGHT_TO_LEFT: u16 = 0x0001;
    const IGNORE_BASE_GLYPHS: u16 = 0x0002;
    const IGNORE_LIGATURES: u16 = 0x0004;
    const IGNORE_MARKS: u16 = 0x0008;
    const USE_MARK_FILTERING_SET: u16 = 0x0010;

    pub fn from_bits(bits: u16) -> Self {
        LookupFlags(bits)
    }

    pub fn to_bits(self) -> u16 {
        self.0
    }

    pub fn right_to_left(self) -> bool {
        self.0 & Self::RIGHT_TO_LEFT != 0
    }

    pub fn ignore_base_glyphs(self) -> bool {
        self.0 & Self::IGNORE_BASE_GLYPHS != 0
    }

    pub fn ignore_ligatures(self) -> bool {
        self.0 & Self::IGNORE_LIGATURES != 0
    }

    pub fn ignore_marks(self) -> bool {
        self.0 & Self::IGNORE_MARKS != 0
    }

    pub fn uses_mark_filtering_set(self) -> bool {
        self.0 & Self::USE_MARK_FILTERING_SET != 0
    }

    /// The mark-attachment class id carried in the upper byte, if any glyph
    /// class other than zero is selected.
    pub fn mark_attachment_class(self) -> Option<u8> {
        let class = (self.0 >> 8) as u8;
        (class != 0).then_some(class)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_low_bits_and_mark_class() {
        let bits = 0x0300 | LookupFlags::RIGHT_TO_LEFT | LookupFlags::IGNORE_MARKS;
        let flags = LookupFlags::from_bits(bits);
        assert_eq!(flags.mark_attachment_class(), Some(3));
        assert!(flags.ignore_marks());
        assert!(flags.right_to_left());
    }
}
