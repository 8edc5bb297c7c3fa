//! `head`: the table that carries `unitsPerEm`, the one field shaping needs
//! from it to scale metrics consistently.

use font_types::Tag;

use crate::data::Segment;
use crate::error::ReadError;
use crate::read::TableRead;

pub const TAG: Tag = Tag::new(b"head");

#[derive(Clone, Copy, Debug)]
pub struct Head {
    pub units_per_em: u16,
    pub index_to_loc_format: i16,
}

impl<'a> TableRead<'a> for Head {
    fn read(data: Segment<'a>) -> Result<Self, ReadError> {
        Ok(Head {
            units_per_em: data.read_u16(18)?,
            index_to_loc_format: data.read_i16(50)?,
        })
    }
}
