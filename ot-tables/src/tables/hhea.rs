//! `hhea`: horizontal header; shaping only needs `numberOfHMetrics` to know
//! how `hmtx`'s trailing-advance compaction applies.

use font_types::Tag;

use crate::data::Segment;
use crate::error::ReadError;
use crate::read::TableRead;

pub const TAG: Tag = Tag::new(b"hhea");

#[derive(Clone, Copy, Debug)]
pub struct Hhea {
    pub ascender: i16,
    pub descender: i16,
    pub line_gap: i16,
    pub number_of_h_metrics: u16,
}

impl<'a> TableRead<'a> for Hhea {
    fn read(data: Segment<'a>) -> Result<Self, ReadError> {
        Ok(Hhea {
            ascender: data.read_i16(4)?,
            descender: data.read_i16(6)?,
            line_gap: data.read_i16(8)?,
            number_of_h_metrics: data.read_u16(34)?,
        })
    }
}
