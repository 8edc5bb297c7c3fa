//! `hmtx`: per-glyph horizontal advance width and left side bearing.
//!
//! The table compacts trailing monospace-width glyphs: only the first
//! `number_of_h_metrics` glyphs carry an explicit advance, every glyph past
//! that reuses the last one and carries only its own left side bearing.

use font_types::{GlyphId, Tag};

use crate::data::Segment;
use crate::error::ReadError;
use crate::read::TableReadWithArgs;

pub const TAG: Tag = Tag::new(b"hmtx");

#[derive(Clone, Copy, Debug)]
pub struct Hmtx<'a> {
    data: Segment<'a>,
    number_of_h_metrics: usize,
}

impl<'a> TableReadWithArgs<'a> for Hmtx<'a> {
    type Args = u16;

    fn read_with_args(data: Segment<'a>, number_of_h_metrics: &u16) -> Result<Self, ReadError> {
        Ok(Hmtx { data, number_of_h_metrics: *number_of_h_metrics as usize })
    }
}

impl<'a> Hmtx<'a> {
    pub fn advance_width(&self, glyph: GlyphId) -> u16 {
        let gid = glyph.to_u32() as usize;
        if self.number_of_h_metrics == 0 {
            return 0;
        }
        let index = gid.min(self.number_of_h_metrics - 1);
        self.data.read_u16(index * 4).unwrap_or(0)
    }

    pub fn left_side_bearing(&self, glyph: GlyphId) -> i16 {
        let gid = glyph.to_u32() as usize;
        if gid < self.number_of_h_metrics {
            self.data.read_i16(gid * 4 + 2).unwrap_or(0)
        } else {
            let extra_index = gid - self.number_of_h_metrics;
            let base = self.number_of_h_metrics * 4 + extra_index * 2;
            self.data.read_i16(base).unwrap_or(0)
        }
    }
}
