//! ClassDef tables: assigns an integer class id to each glyph.

use font_types::GlyphId;

use crate::data::Segment;
use crate::error::ReadError;
use crate::read::TableRead;

#[derive(Clone, Copy, Debug)]
pub enum ClassDef<'a> {
    Format1 {
        start_glyph: u16,
        classes: Segment<'a>,
        count: usize,
    },
    Format2 {
        ranges: Segment<'a>,
        count: usize,
    },
}

const CLASS_RANGE_RECORD_LEN: usize = 6; // start, end, class: u16 x3

impl<'a> TableRead<'a> for ClassDef<'a> {
    fn read(data: Segment<'a>) -> Result<Self, ReadError> {
        let format = data.read_u16(0)?;
        match format {
            1 => {
                let start_glyph = data.read_u16(2)?;
                let count = data.read_u16(4)? as usize;
                Ok(ClassDef::Format1 { start_glyph, classes: data, count })
            }
            2 => {
                let count = data.read_u16(2)? as usize;
                Ok(ClassDef::Format2 { ranges: data, count })
            }
            other => Err(ReadError::InvalidFormat(other)),
        }
    }
}

impl<'a> ClassDef<'a> {
    /// The class id for `glyph`. Defaults to 0 for any glyph the table does
    /// not mention, per the OpenType spec.
    pub fn get(&self, glyph: GlyphId) -> u16 {
        match self {
            ClassDef::Format1 { start_glyph, classes, count } => {
                let gid = glyph.to_u16();
                if gid < *start_glyph {
                    return 0;
                }
                let index = (gid - start_glyph) as usize;
                if index >= *count {
                    return 0;
                }
                classes.read_u16(6 + index * 2).unwrap_or(0)
            }
            ClassDef::Format2 { ranges, count } => {
                for i in 0..*count {
                    let base = 4 + i * CLASS_RANGE_RECORD_LEN;
                    let start = ranges.read_u16(base).unwrap_or(u16::MAX);
                    let end = ranges.read_u16(base + 2).unwrap_or(0);
                    let gid = glyph.to_u16();
                    if gid >= start && gid <= end {
                        return ranges.read_u16(base + 4).unwrap_or(0);
                    }
                }
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format1_default_is_zero() {
        let mut bytes = vec![];
        bytes.extend(1u16.to_be_bytes());
        bytes.extend(10u16.to_be_bytes()); // start glyph
        bytes.extend(2u16.to_be_bytes()); // count
        bytes.extend(1u16.to_be_bytes());
        bytes.extend(2u16.to_be_bytes());
        let cd = ClassDef::read(Segment::new(&bytes)).unwrap();
        assert_eq!(cd.get(GlyphId::new(10)), 1);
        assert_eq!(cd.get(GlyphId::new(11)), 2);
        assert_eq!(cd.get(GlyphId::new(999)), 0);
    }

    #[test]
    fn format2_range_lookup() {
        let mut bytes = vec![];
        bytes.extend(2u16.to_be_bytes());
        bytes.extend(1u16.to_be_bytes()); // 1 range
        bytes.extend(50u16.to_be_bytes());
        bytes.extend(60u16.to_be_bytes());
        bytes.extend(3u16.to_be_bytes());
        let cd = ClassDef::read(Segment::new(&bytes)).unwrap();
        assert_eq!(cd.get(GlyphId::new(55)), 3);
        assert_eq!(cd.get(GlyphId::new(61)), 0);
    }
}
