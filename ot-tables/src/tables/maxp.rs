//! `maxp`: carries the font's glyph count, used to validate glyph ids
//! referenced from GSUB/GPOS before they're trusted.

use font_types::Tag;

use crate::data::Segment;
use crate::error::ReadError;
use crate::read::TableRead;

pub const TAG: Tag = Tag::new(b"maxp");

#[derive(Clone, Copy, Debug)]
pub struct Maxp {
    pub num_glyphs: u16,
}

impl<'a> TableRead<'a> for Maxp {
    fn read(data: Segment<'a>) -> Result<Self, ReadError> {
        Ok(Maxp { num_glyphs: data.read_u16(4)? })
    }
}
