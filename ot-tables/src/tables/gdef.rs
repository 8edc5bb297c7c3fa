//! GDEF: glyph class, attachment and mark-filtering definitions shared by
//! GSUB/GPOS lookup flags.

use font_types::{GlyphId, Tag};

use crate::data::Segment;
use crate::error::ReadError;
use crate::read::TableRead;
use crate::tables::classdef::ClassDef;
use crate::tables::coverage::Coverage;

pub const TAG: Tag = Tag::new(b"GDEF");

/// The four glyph classes GDEF's `GlyphClassDef` distinguishes. Unclassified
/// glyphs report `Base` so that unmarked-up fonts still shape sensibly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GlyphClass {
    Base,
    Ligature,
    Mark,
    Component,
}

impl GlyphClass {
    fn from_raw(value: u16) -> Self {
        match value {
            2 => GlyphClass::Ligature,
            3 => GlyphClass::Mark,
            4 => GlyphClass::Component,
            _ => GlyphClass::Base,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Gdef<'a> {
    glyph_class_def: Option<ClassDef<'a>>,
    mark_attach_class_def: Option<ClassDef<'a>>,
    mark_glyph_sets: Option<MarkGlyphSets<'a>>,
}

impl<'a> TableRead<'a> for Gdef<'a> {
    fn read(data: Segment<'a>) -> Result<Self, ReadError> {
        let major = data.read_u16(0)?;
        let minor = data.read_u16(2)?;
        let glyph_class_offset = data.read_u16(4)? as usize;
        // offset 6: attachListOffset, offset 8: ligCaretListOffset (both unused here)
        let mark_attach_offset = data.read_u16(10)? as usize;
        let glyph_class_def = (glyph_class_offset != 0)
            .then(|| data.tail(glyph_class_offset).and_then(|s| ClassDef::read(s).ok()))
            .flatten();
        let mark_attach_class_def = (mark_attach_offset != 0)
            .then(|| data.tail(mark_attach_offset).and_then(|s| ClassDef::read(s).ok()))
            .flatten();
        let mark_glyph_sets = if major >= 1 && minor >= 2 {
            let offset = data.read_u16(12).unwrap_or(0) as usize;
            (offset != 0)
                .then(|| data.tail(offset).and_then(|s| MarkGlyphSets::read(s).ok()))
                .flatten()
        } else {
            None
        };
        Ok(Gdef { glyph_class_def, mark_attach_class_def, mark_glyph_sets })
    }
}

impl<'a> Gdef<'a> {
    pub fn glyph_class(&self, glyph: GlyphId) -> GlyphClass {
        self.glyph_class_def
            .map(|cd| GlyphClass::from_raw(cd.get(glyph)))
            .unwrap_or(GlyphClass::Base)
    }

    pub fn mark_attachment_class(&self, glyph: GlyphId) -> u16 {
        self.mark_attach_class_def.map(|cd| cd.get(glyph)).unwrap_or(0)
    }

    pub fn mark_glyph_set(&self, set_index: u16) -> Option<Coverage<'a>> {
        self.mark_glyph_sets.and_then(|sets| sets.get(set_index))
    }
}

#[derive(Clone, Copy, Debug)]
struct MarkGlyphSets<'a> {
    data: Segment<'a>,
    count: usize,
}

impl<'a> TableRead<'a> for MarkGlyphSets<'a> {
    fn read(data: Segment<'a>) -> Result<Self, ReadError> {
        let _format = data.read_u16(0)?;
        let count = data.read_u16(2)? as usize;
        Ok(MarkGlyphSets { data, count })
    }
}

impl<'a> MarkGlyphSets<'a> {
    fn get(&self, index: u16) -> Option<Coverage<'a>> {
        let index = index as usize;
        if index >= self.count {
            return None;
        }
        let offset = self.data.read_u32(4 + index * 4).ok()? as usize;
        Coverage::read(self.data.tail(offset)?).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glyph_class_defaults_to_base() {
        // major/minor 1.0, all offsets null.
        let bytes = [
            1u16.to_be_bytes(),
            0u16.to_be_bytes(),
            0u16.to_be_bytes(),
            0u16.to_be_bytes(),
            0u16.to_be_bytes(),
            0u16.to_be_bytes(),
        ]
        .concat();
        let gdef = Gdef::read(Segment::new(&bytes)).unwrap();
        assert_eq!(gdef.glyph_class(GlyphId::new(5)), GlyphClass::Base);
        assert_eq!(gdef.mark_attachment_class(GlyphId::new(5)), 0);
    }
}
