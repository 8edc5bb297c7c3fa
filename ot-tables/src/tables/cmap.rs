//! `cmap`: Unicode codepoint to glyph id mapping.
//!
//! Only the two subtable formats every shaping-capable font in practice
//! carries are implemented: format 4 (BMP, segmented) and format 12
//! (full Unicode, segmented with explicit start-glyph-id). A font that
//! carries neither yields a `Cmap` with no usable subtable, which maps
//! every codepoint to `.notdef`; callers see that as zero results, not a
//! parse error, matching the usual missing-optional-table handling.

use font_types::{GlyphId, Tag};

use crate::data::Segment;
use crate::error::ReadError;
use crate::read::TableRead;

pub const TAG: Tag = Tag::new(b"cmap");

#[derive(Clone, Copy, Debug)]
pub struct Cmap<'a> {
    data: Segment<'a>,
    num_tables: usize,
}

impl<'a> TableRead<'a> for Cmap<'a> {
    fn read(data: Segment<'a>) -> Result<Self, ReadError> {
        let _version = data.read_u16(0)?;
        let num_tables = data.read_u16(2)? as usize;
        Ok(Cmap { data, num_tables })
    }
}

impl<'a> Cmap<'a> {
    /// Picks the best available subtable: prefers the Unicode full-repertoire
    /// platform 3/10 or 0/4+ encoding (format 12) and falls back to any BMP
    /// subtable (format 4).
    pub fn best_subtable(&self) -> Option<CmapSubtable<'a>> {
        let mut best: Option<(u8, CmapSubtable<'a>)> = None;
        for i in 0..self.num_tables {
            let base = 4 + i * 8;
            let platform_id = self.data.read_u16(base).ok()?;
            let encoding_id = self.data.read_u16(base + 2).ok()?;
            let offset = self.data.read_u32(base + 4).ok()? as usize;
            let Some(seg) = self.data.tail(offset) else { continue };
            let Ok(subtable) = CmapSubtable::read(seg) else { continue };
            let rank = match (platform_id, encoding_id) {
                (3, 10) | (0, 4) | (0, 6) => 3,
                (3, 1) | (0, 3) => 2,
                (0, _) | (3, 0) => 1,
                _ => 0,
            };
            if best.as_ref().map_or(true, |(r, _)| rank > *r) {
                best = Some((rank, subtable));
            }
        }
        best.map(|(_, s)| s)
    }
}

#[derive(Clone, Copy, Debug)]
pub enum CmapSubtable<'a> {
    Format4 {
        seg_count: usize,
        ends: Segment<'a>,
        starts: Segment<'a>,
        id_deltas: Segment<'a>,
        id_range_offsets: Segment<'a>,
    },
    Format12 {
        groups: Segment<'a>,
        num_groups: usize,
    },
}

impl<'a> TableRead<'a> for CmapSubtable<'a> {
    fn read(data: Segment<'a>) -> Result<Self, ReadError> {
        match data.read_u16(0)? {
            4 => {
                let seg_count = data.read_u16(6)? as usize / 2;
                let ends = data.slice(14..14 + seg_count * 2).ok_or(ReadError::OutOfBounds)?;
                let starts_offset = 14 + seg_count * 2 + 2;
                let starts = data
                    .slice(starts_offset..starts_offset + seg_count * 2)
                    .ok_or(ReadError::OutOfBounds)?;
                let deltas_offset = starts_offset + seg_count * 2;
                let id_deltas = data
                    .slice(deltas_offset..deltas_offset + seg_count * 2)
                    .ok_or(ReadError::OutOfBounds)?;
                let ranges_offset = deltas_offset + seg_count * 2;
                let id_range_offsets = data.tail(ranges_offset).ok_or(ReadError::OutOfBounds)?;
                Ok(CmapSubtable::Format4 { seg_count, ends, starts, id_deltas, id_range_offsets })
            }
            12 => {
                let num_groups = data.read_u32(12)? as usize;
                let groups = data.tail(16).ok_or(ReadError::OutOfBounds)?;
                Ok(CmapSubtable::Format12 { groups, num_groups })
            }
            other => Err(ReadError::InvalidFormat(other)),
        }
    }
}

impl<'a> CmapSubtable<'a> {
    pub fn lookup(&self, codepoint: u32) -> Option<GlyphId> {
        match self {
            CmapSubtable::Format4 { seg_count, ends, starts, id_deltas, id_range_offsets } => {
                if codepoint > 0xFFFF {
                    return None;
                }
                let codepoint = codepoint as u16;
                for seg in 0..*seg_count {
                    let end = ends.read_u16(seg * 2).ok()?;
                    if codepoint > end {
                        continue;
                    }
                    let start = starts.read_u16(seg * 2).ok()?;
                    if codepoint < start {
                        return None;
                    }
                    let delta = id_deltas.read_i16(seg * 2).ok()?;
                    let range_offset = id_range_offsets.read_u16(seg * 2).ok()?;
                    if range_offset == 0 {
                        return Some(GlyphId::new(codepoint.wrapping_add(delta as u16)));
                    }
                    let glyph_index_offset =
                        seg * 2 + range_offset as usize + (codepoint - start) as usize * 2;
                    let raw_glyph = id_range_offsets.read_u16(glyph_index_offset).ok()?;
                    if raw_glyph == 0 {
                        return None;
                    }
                    return Some(GlyphId::new(raw_glyph.wrapping_add(delta as u16)));
                }
                None
            }
            CmapSubtable::Format12 { groups, num_groups } => {
                for i in 0..*num_groups {
                    let base = i * 12;
                    let start_char = groups.read_u32(base).ok()?;
                    let end_char = groups.read_u32(base + 4).ok()?;
                    if codepoint < start_char || codepoint > end_char {
                        continue;
                    }
                    let start_glyph = groups.read_u32(base + 8).ok()?;
                    return Some(GlyphId::new(
                        (start_glyph + (codepoint - start_char)) as u16,
                    ));
                }
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format12_single_group_lookup() {
        let mut bytes = vec![];
        bytes.extend(12u16.to_be_bytes()); // format
        bytes.extend(0u16.to_be_bytes()); // reserved
        bytes.extend(0u32.to_be_bytes()); // length
        bytes.extend(0u32.to_be_bytes()); // language
        bytes.extend(1u32.to_be_bytes()); // numGroups
        bytes.extend(0x41u32.to_be_bytes()); // startCharCode 'A'
        bytes.extend(0x5Au32.to_be_bytes()); // endCharCode 'Z'
        bytes.extend(10u32.to_be_bytes()); // startGlyphID
        let sub = CmapSubtable::read(Segment::new(&bytes)).unwrap();
        assert_eq!(sub.lookup(0x42), Some(GlyphId::new(11)));
        assert_eq!(sub.lookup(0x60), None);
    }
}
