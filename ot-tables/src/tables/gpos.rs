//! GPOS: the glyph positioning table.

use std::cell::OnceCell;

use font_types::{GlyphId, Tag};

use crate::data::Segment;
use crate::error::ReadError;
use crate::read::TableRead;
use crate::tables::classdef::ClassDef;
use crate::tables::context::{ChainedSequenceContext, SequenceContext};
use crate::tables::coverage::Coverage;
use crate::tables::layout_common::{FeatureList, LookupList, RawLookup, ScriptList};
use crate::tables::lookup_flags::LookupFlags;

pub const TAG: Tag = Tag::new(b"GPOS");

#[derive(Clone, Copy, Debug)]
pub struct Gpos<'a> {
    pub script_list: ScriptList<'a>,
    pub feature_list: FeatureList<'a>,
    lookup_list: LookupList<'a>,
}

impl<'a> TableRead<'a> for Gpos<'a> {
    fn read(data: Segment<'a>) -> Result<Self, ReadError> {
        let script_list_offset = data.read_u16(4)? as usize;
        let feature_list_offset = data.read_u16(6)? as usize;
        let lookup_list_offset = data.read_u16(8)? as usize;
        Ok(Gpos {
            script_list: ScriptList::read(data.tail(script_list_offset).ok_or(ReadError::OutOfBounds)?)?,
            feature_list: FeatureList::read(data.tail(feature_list_offset).ok_or(ReadError::OutOfBounds)?)?,
            lookup_list: LookupList::read(data.tail(lookup_list_offset).ok_or(ReadError::OutOfBounds)?)?,
        })
    }
}

impl<'a> Gpos<'a> {
    pub fn lookup_count(&self) -> usize {
        self.lookup_list.len()
    }

    pub fn lookup(&self, index: u16) -> Option<GposLookup<'a>> {
        self.lookup_list.raw_lookup(index).map(GposLookup::new)
    }
}

/// A `ValueRecord`: any subset of the eight positioning adjustments, gated
/// by a format bitmask stored alongside it. Device/variation tables are not
/// interpreted; only the plain deltas are read.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ValueRecord {
    pub x_placement: i16,
    pub y_placement: i16,
    pub x_advance: i16,
    pub y_advance: i16,
}

/// Reads a `ValueRecord` described by `format` starting at `offset`;
/// returns the record and the number of bytes it occupied.
fn read_value_record(data: Segment<'_>, offset: usize, format: u16) -> (ValueRecord, usize) {
    let mut record = ValueRecord::default();
    let mut pos = offset;
    if format & 0x0001 != 0 {
        record.x_placement = data.read_i16(pos).unwrap_or(0);
        pos += 2;
    }
    if format & 0x0002 != 0 {
        record.y_placement = data.read_i16(pos).unwrap_or(0);
        pos += 2;
    }
    if format & 0x0004 != 0 {
        record.x_advance = data.read_i16(pos).unwrap_or(0);
        pos += 2;
    }
    if format & 0x0008 != 0 {
        record.y_advance = data.read_i16(pos).unwrap_or(0);
        pos += 2;
    }
    // Device/variation-index offsets (format bits 0x0010..0x0080) are
    // skipped over; hinting/variation application is out of scope.
    for bit in [0x0010u16, 0x0020, 0x0040, 0x0080] {
        if format & bit != 0 {
            pos += 2;
        }
    }
    (record, pos - offset)
}

/// An anchor point: a fixed (x, y) relative to the glyph origin. Formats 2
/// (contour-point hinting) and 3 (device tables) fall back to the plain
/// coordinates, since outline interpretation is out of scope.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Anchor {
    pub x: i16,
    pub y: i16,
}

fn read_anchor(data: Segment<'_>) -> Option<Anchor> {
    let _format = data.read_u16(0).ok()?;
    Some(Anchor {
        x: data.read_i16(2).ok()?,
        y: data.read_i16(4).ok()?,
    })
}

#[derive(Clone, Debug)]
pub enum GposSubtable<'a> {
    Single {
        coverage: Coverage<'a>,
        kind: SinglePosKind,
    },
    Pair {
        coverage: Coverage<'a>,
        kind: PairPosKind<'a>,
    },
    Cursive {
        coverage: Coverage<'a>,
        entry_exit: Vec<(Option<Anchor>, Option<Anchor>)>,
    },
    MarkToBase {
        mark_coverage: Coverage<'a>,
        base_coverage: Coverage<'a>,
        mark_class_count: u16,
        marks: Vec<(u16, Anchor)>,
        bases: Vec<Vec<Option<Anchor>>>,
    },
    MarkToLigature {
        mark_coverage: Coverage<'a>,
        ligature_coverage: Coverage<'a>,
        mark_class_count: u16,
        marks: Vec<(u16, Anchor)>,
        ligatures: Vec<Vec<Vec<Option<Anchor>>>>,
    },
    MarkToMark {
        mark1_coverage: Coverage<'a>,
        mark2_coverage: Coverage<'a>,
        mark_class_count: u16,
        marks: Vec<(u16, Anchor)>,
        mark2s: Vec<Vec<Option<Anchor>>>,
    },
    Context(SequenceContext<'a>),
    ChainContext(ChainedSequenceContext<'a>),
}

#[derive(Clone, Debug)]
pub enum SinglePosKind {
    /// Format 1: one shared `ValueRecord` for every covered glyph.
    Shared(ValueRecord),
    /// Format 2: one `ValueRecord` per covered glyph, in coverage order.
    PerGlyph(Vec<ValueRecord>),
}

#[derive(Clone, Debug)]
pub enum PairPosKind<'a> {
    /// Format 1: an explicit list of (second glyph, record1, record2) per
    /// first glyph, keyed by coverage index.
    Specific(Vec<Vec<(GlyphId, ValueRecord, ValueRecord)>>),
    /// Format 2: records keyed by glyph class pair.
    ByClass {
        class_def1: ClassDef<'a>,
        class_def2: ClassDef<'a>,
        class1_count: u16,
        class2_count: u16,
        records: Vec<(ValueRecord, ValueRecord)>,
    },
}

fn decode_subtable(lookup_type: u16, data: Segment<'_>) -> Result<GposSubtable<'_>, ReadError> {
    match lookup_type {
        1 => {
            let format = data.read_u16(0)?;
            let cov_offset = data.read_u16(2)? as usize;
            let coverage = Coverage::read(data.tail(cov_offset).ok_or(ReadError::OutOfBounds)?)?;
            let value_format = data.read_u16(4)?;
            let kind = match format {
                1 => SinglePosKind::Shared(read_value_record(data, 6, value_format).0),
                2 => {
                    let count = data.read_u16(6)? as usize;
                    let (_, rec_len) = read_value_record(data, 8, value_format);
                    let rec_len = rec_len.max(1);
                    let records = (0..count)
                        .map(|i| read_value_record(data, 8 + i * rec_len, value_format).0)
                        .collect();
                    SinglePosKind::PerGlyph(records)
                }
                other => return Err(ReadError::InvalidFormat(other)),
            };
            Ok(GposSubtable::Single { coverage, kind })
        }
        2 => {
            let format = data.read_u16(0)?;
            let cov_offset = data.read_u16(2)? as usize;
            let coverage = Coverage::read(data.tail(cov_offset).ok_or(ReadError::OutOfBounds)?)?;
            let value_format1 = data.read_u16(4)?;
            let value_format2 = data.read_u16(6)?;
            match format {
                1 => {
                    let count = data.read_u16(8)? as usize;
                    let sets = (0..count)
                        .map(|i| {
                            let off = data.read_u16(10 + i * 2).unwrap_or(0) as usize;
                            read_pair_set(data, off, value_format1, value_format2)
                        })
                        .collect();
                    Ok(GposSubtable::Pair { coverage, kind: PairPosKind::Specific(sets) })
                }
                2 => {
                    let class_def1 = ClassDef::read(
                        data.tail(data.read_u16(8)? as usize).ok_or(ReadError::OutOfBounds)?,
                    )?;
                    let class_def2 = ClassDef::read(
                        data.tail(data.read_u16(10)? as usize).ok_or(ReadError::OutOfBounds)?,
                    )?;
                    let class1_count = data.read_u16(12)?;
                    let class2_count = data.read_u16(14)?;
                    let (_, len1) = read_value_record(data, 16, value_format1);
                    let (_, len2) = read_value_record(data, 16 + len1, value_format2);
                    let stride = (len1 + len2).max(1);
                    let mut records = Vec::with_capacity(class1_count as usize * class2_count as usize);
                    for c1 in 0..class1_count as usize {
                        for c2 in 0..class2_count as usize {
                            let base = 16 + (c1 * class2_count as usize + c2) * stride;
                            let (r1, l1) = read_value_record(data, base, value_format1);
                            let (r2, _) = read_value_record(data, base + l1, value_format2);
                            records.push((r1, r2));
                        }
                    }
                    Ok(GposSubtable::Pair {
                        coverage,
                        kind: PairPosKind::ByClass {
                            class_def1,
                            class_def2,
                            class1_count,
                            class2_count,
                            records,
                        },
                    })
                }
                other => Err(ReadError::InvalidFormat(other)),
            }
        }
        3 => {
            let cov_offset = data.read_u16(2)? as usize;
            let coverage = Coverage::read(data.tail(cov_offset).ok_or(ReadError::OutOfBounds)?)?;
            let count = data.read_u16(4)? as usize;
            let entry_exit = (0..count)
                .map(|i| {
                    let base = 6 + i * 4;
                    let entry_off = data.read_u16(base).unwrap_or(0) as usize;
                    let exit_off = data.read_u16(base + 2).unwrap_or(0) as usize;
                    let entry = (entry_off != 0).then(|| data.tail(entry_off).and_then(read_anchor)).flatten();
                    let exit = (exit_off != 0).then(|| data.tail(exit_off).and_then(read_anchor)).flatten();
                    (entry, exit)
                })
                .collect();
            Ok(GposSubtable::Cursive { coverage, entry_exit })
        }
        4 => {
            let mark_coverage = Coverage::read(
                data.tail(data.read_u16(2)? as usize).ok_or(ReadError::OutOfBounds)?,
            )?;
            let base_coverage = Coverage::read(
                data.tail(data.read_u16(4)? as usize).ok_or(ReadError::OutOfBounds)?,
            )?;
            let mark_class_count = data.read_u16(6)?;
            let marks = read_mark_array(data, data.read_u16(8)? as usize);
            let bases = read_base_array(data, data.read_u16(10)? as usize, mark_class_count);
            Ok(GposSubtable::MarkToBase { mark_coverage, base_coverage, mark_class_count, marks, bases })
        }
        5 => {
            let mark_coverage = Coverage::read(
                data.tail(data.read_u16(2)? as usize).ok_or(ReadError::OutOfBounds)?,
            )?;
            let ligature_coverage = Coverage::read(
                data.tail(data.read_u16(4)? as usize).ok_or(ReadError::OutOfBounds)?,
            )?;
            let mark_class_count = data.read_u16(6)?;
            let marks = read_mark_array(data, data.read_u16(8)? as usize);
            let ligatures = read_ligature_array(data, data.read_u16(10)? as usize, mark_class_count);
            Ok(GposSubtable::MarkToLigature {
                mark_coverage,
                ligature_coverage,
                mark_class_count,
                marks,
                ligatures,
            })
        }
        6 => {
            let mark1_coverage = Coverage::read(
                data.tail(data.read_u16(2)? as usize).ok_or(ReadError::OutOfBounds)?,
            )?;
            let mark2_coverage = Coverage::read(
                data.tail(data.read_u16(4)? as usize).ok_or(ReadError::OutOfBounds)?,
            )?;
            let mark_class_count = data.read_u16(6)?;
            let marks = read_mark_array(data, data.read_u16(8)? as usize);
            let mark2s = read_base_array(data, data.read_u16(10)? as usize, mark_class_count);
            Ok(GposSubtable::MarkToMark { mark1_coverage, mark2_coverage, mark_class_count, marks, mark2s })
        }
        7 => Ok(GposSubtable::Context(SequenceContext::read(data)?)),
        8 => Ok(GposSubtable::ChainContext(ChainedSequenceContext::read(data)?)),
        other => Err(ReadError::MalformedData(match other {
            9 => "extension subtables must be resolved before decode_subtable is called",
            _ => "unknown GPOS lookup type",
        })),
    }
}

fn read_pair_set(
    data: Segment<'_>,
    offset: usize,
    format1: u16,
    format2: u16,
) -> Vec<(GlyphId, ValueRecord, ValueRecord)> {
    let Some(seg) = data.tail(offset) else { return Vec::new() };
    let Ok(count) = seg.read_u16(0) else { return Vec::new() };
    let (_, len1) = read_value_record(seg, 4, format1);
    let mut out = Vec::with_capacity(count as usize);
    let mut pos = 2;
    for _ in 0..count {
        let Ok(second_glyph) = seg.read_u16(pos) else { break };
        let (r1, l1) = read_value_record(seg, pos + 2, format1);
        let (r2, l2) = read_value_record(seg, pos + 2 + l1, format2);
        out.push((GlyphId::new(second_glyph), r1, r2));
        pos += 2 + l1 + l2;
        let _ = len1;
    }
    out
}

fn read_mark_array(data: Segment<'_>, offset: usize) -> Vec<(u16, Anchor)> {
    let Some(seg) = data.tail(offset) else { return Vec::new() };
    let Ok(count) = seg.read_u16(0) else { return Vec::new() };
    (0..count as usize)
        .filter_map(|i| {
            let base = 2 + i * 4;
            let class = seg.read_u16(base).ok()?;
            let anchor_off = seg.read_u16(base + 2).ok()? as usize;
            let anchor = seg.tail(anchor_off).and_then(read_anchor)?;
            Some((class, anchor))
        })
        .collect()
}

fn read_base_array(data: Segment<'_>, offset: usize, mark_class_count: u16) -> Vec<Vec<Option<Anchor>>> {
    let Some(seg) = data.tail(offset) else { return Vec::new() };
    let Ok(count) = seg.read_u16(0) else { return Vec::new() };
    (0..count as usize)
        .map(|i| {
            (0..mark_class_count as usize)
                .map(|c| {
                    let base = 2 + (i * mark_class_count as usize + c) * 2;
                    let off = seg.read_u16(base).unwrap_or(0) as usize;
                    (off != 0).then(|| seg.tail(off).and_then(read_anchor)).flatten()
                })
                .collect()
        })
        .collect()
}

fn read_ligature_array(
    data: Segment<'_>,
    offset: usize,
    mark_class_count: u16,
) -> Vec<Vec<Vec<Option<Anchor>>>> {
    let Some(seg) = data.tail(offset) else { return Vec::new() };
    let Ok(count) = seg.read_u16(0) else { return Vec::new() };
    (0..count as usize)
        .map(|i| {
            let attach_off = seg.read_u16(2 + i * 2).unwrap_or(0) as usize;
            let Some(attach) = seg.tail(attach_off) else { return Vec::new() };
            let Ok(component_count) = attach.read_u16(0) else { return Vec::new() };
            (0..component_count as usize)
                .map(|comp| {
                    (0..mark_class_count as usize)
                        .map(|c| {
                            let base = 2 + (comp * mark_class_count as usize + c) * 2;
                            let off = attach.read_u16(base).unwrap_or(0) as usize;
                            (off != 0).then(|| attach.tail(off).and_then(read_anchor)).flatten()
                        })
                        .collect()
                })
                .collect()
        })
        .collect()
}

fn resolve_extension<'a>(lookup_type: u16, data: Segment<'a>) -> Result<(u16, Segment<'a>), ReadError> {
    if lookup_type != 9 {
        return Ok((lookup_type, data));
    }
    let extension_type = data.read_u16(2)?;
    let offset = data.read_u32(4)? as usize;
    Ok((extension_type, data.tail(offset).ok_or(ReadError::OutOfBounds)?))
}

pub struct GposLookup<'a> {
    raw: RawLookup<'a>,
    cache: OnceCell<Vec<Result<GposSubtable<'a>, ReadError>>>,
}

impl<'a> GposLookup<'a> {
    fn new(raw: RawLookup<'a>) -> Self {
        GposLookup { raw, cache: OnceCell::new() }
    }

    pub fn lookup_type(&self) -> u16 {
        self.raw.lookup_type()
    }

    pub fn flags(&self) -> LookupFlags {
        self.raw.flags()
    }

    pub fn mark_filtering_set(&self) -> Option<u16> {
        self.raw.mark_filtering_set()
    }

    pub fn subtable_count(&self) -> usize {
        self.raw.subtable_count()
    }

    fn decode_all(&self) -> &[Result<GposSubtable<'a>, ReadError>] {
        self.cache.get_or_init(|| {
            (0..self.raw.subtable_count())
                .map(|i| {
                    let data = self.raw.subtable_data(i).ok_or(ReadError::OutOfBounds)?;
                    let (real_type, real_data) = resolve_extension(self.raw.lookup_type(), data)?;
                    decode_subtable(real_type, real_data)
                })
                .collect()
        })
    }

    pub fn subtable(&self, index: usize) -> Option<&GposSubtable<'a>> {
        self.decode_all().get(index).and_then(|r| r.as_ref().ok())
    }

    /// The decode errors for subtables that failed to parse, so a caller
    /// that walks every subtable can surface them instead of letting
    /// `subtable()`'s `None` swallow the reason.
    pub fn decode_errors(&self) -> impl Iterator<Item = &ReadError> + '_ {
        self.decode_all().iter().filter_map(|r| r.as_ref().err())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_pos_format1_shared_record() {
        let mut bytes = vec![];
        bytes.extend(1u16.to_be_bytes()); // format
        bytes.extend(6u16.to_be_bytes()); // coverage offset
        bytes.extend(0x0004u16.to_be_bytes()); // xAdvance only
        bytes.extend(50i16.to_be_bytes());
        bytes.extend(1u16.to_be_bytes()); // coverage format
        bytes.extend(1u16.to_be_bytes());
        bytes.extend(7u16.to_be_bytes());
        let sub = decode_subtable(1, Segment::new(&bytes)).unwrap();
        match sub {
            GposSubtable::Single { coverage, kind: SinglePosKind::Shared(rec) } => {
                assert!(coverage.contains(GlyphId::new(7)));
                assert_eq!(rec.x_advance, 50);
            }
            _ => panic!("wrong variant"),
        }
    }
}
