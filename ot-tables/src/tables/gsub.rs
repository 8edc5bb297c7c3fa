//! GSUB: the glyph substitution table.

use std::cell::OnceCell;

use font_types::{GlyphId, Tag};

use crate::data::Segment;
use crate::error::ReadError;
use crate::read::TableRead;
use crate::tables::context::{ChainedSequenceContext, SequenceContext};
use crate::tables::coverage::Coverage;
use crate::tables::layout_common::{FeatureList, LookupList, RawLookup, ScriptList};
use crate::tables::lookup_flags::LookupFlags;

pub const TAG: Tag = Tag::new(b"GSUB");

#[derive(Clone, Copy, Debug)]
pub struct Gsub<'a> {
    pub script_list: ScriptList<'a>,
    pub feature_list: FeatureList<'a>,
    lookup_list: LookupList<'a>,
}

impl<'a> TableRead<'a> for Gsub<'a> {
    fn read(data: Segment<'a>) -> Result<Self, ReadError> {
        let script_list_offset = data.read_u16(4)? as usize;
        let feature_list_offset = data.read_u16(6)? as usize;
        let lookup_list_offset = data.read_u16(8)? as usize;
        Ok(Gsub {
            script_list: ScriptList::read(data.tail(script_list_offset).ok_or(ReadError::OutOfBounds)?)?,
            feature_list: FeatureList::read(data.tail(feature_list_offset).ok_or(ReadError::OutOfBounds)?)?,
            lookup_list: LookupList::read(data.tail(lookup_list_offset).ok_or(ReadError::OutOfBounds)?)?,
        })
    }
}

impl<'a> Gsub<'a> {
    pub fn lookup_count(&self) -> usize {
        self.lookup_list.len()
    }

    /// Produces a fresh, lazily-decoding handle for lookup `index`. Hold
    /// onto it while applying the same lookup across a buffer so its
    /// subtable decode is memoized rather than repeated.
    pub fn lookup(&self, index: u16) -> Option<GsubLookup<'a>> {
        self.lookup_list.raw_lookup(index).map(GsubLookup::new)
    }
}

#[derive(Clone, Debug)]
pub enum GsubSubtable<'a> {
    Single { coverage: Coverage<'a>, deltas: SingleSubstKind<'a> },
    Multiple { coverage: Coverage<'a>, sequences: Vec<Vec<GlyphId>> },
    Alternate { coverage: Coverage<'a>, alternates: Vec<Vec<GlyphId>> },
    Ligature { coverage: Coverage<'a>, ligature_sets: Vec<Vec<Ligature>> },
    Context(SequenceContext<'a>),
    ChainContext(ChainedSequenceContext<'a>),
    ReverseChainSingle {
        coverage: Coverage<'a>,
        backtrack: Vec<Coverage<'a>>,
        lookahead: Vec<Coverage<'a>>,
        substitutes: Vec<GlyphId>,
    },
}

#[derive(Clone, Debug)]
pub enum SingleSubstKind<'a> {
    /// Format 1: every covered glyph shifts by the same signed delta.
    Delta(i16),
    /// Format 2: an explicit substitute per covered glyph.
    List(Segment<'a>, usize),
}

impl<'a> SingleSubstKind<'a> {
    pub fn apply(&self, coverage_index: u16) -> Option<GlyphId> {
        match self {
            SingleSubstKind::Delta(_) => None, // caller adds delta to the input glyph id
            SingleSubstKind::List(data, count) => {
                if coverage_index as usize >= *count {
                    return None;
                }
                data.read_u16(2 + coverage_index as usize * 2).ok().map(GlyphId::new)
            }
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Ligature {
    pub glyph: GlyphId,
    pub component_count: usize,
}

fn read_ligature_set(data: Segment<'_>, offset: usize) -> Vec<Ligature> {
    let Some(seg) = data.tail(offset) else { return Vec::new() };
    let Ok(count) = seg.read_u16(0) else { return Vec::new() };
    (0..count as usize)
        .filter_map(|i| {
            let lig_offset = seg.read_u16(2 + i * 2).ok()? as usize;
            let lig = seg.tail(lig_offset)?;
            let glyph = GlyphId::new(lig.read_u16(0).ok()?);
            let component_count = lig.read_u16(2).ok()? as usize;
            Some(Ligature { glyph, component_count })
        })
        .collect()
}

/// The components (after the first, which is implied by coverage) of the
/// ligature at `(set_index, lig_index)`, read on demand since a ligature's
/// component list is rarely needed outside of the match itself.
pub fn ligature_components(
    data: Segment<'_>,
    ligature_sets: &[u16],
    set_index: usize,
    lig_index: usize,
) -> Vec<GlyphId> {
    let Some(&set_offset) = ligature_sets.get(set_index) else { return Vec::new() };
    let Some(set) = data.tail(set_offset as usize) else { return Vec::new() };
    let Ok(count) = set.read_u16(0) else { return Vec::new() };
    if lig_index >= count as usize {
        return Vec::new();
    }
    let Ok(lig_offset) = set.read_u16(2 + lig_index * 2) else { return Vec::new() };
    let Some(lig) = set.tail(lig_offset as usize) else { return Vec::new() };
    let Ok(component_count) = lig.read_u16(2) else { return Vec::new() };
    (0..component_count.saturating_sub(1) as usize)
        .filter_map(|i| lig.read_u16(4 + i * 2).ok().map(GlyphId::new))
        .collect()
}

fn decode_subtable(lookup_type: u16, data: Segment<'_>) -> Result<GsubSubtable<'_>, ReadError> {
    match lookup_type {
        1 => {
            let format = data.read_u16(0)?;
            let cov_offset = data.read_u16(2)? as usize;
            let coverage = Coverage::read(data.tail(cov_offset).ok_or(ReadError::OutOfBounds)?)?;
            let deltas = match format {
                1 => SingleSubstKind::Delta(data.read_i16(4)?),
                2 => {
                    let count = data.read_u16(4)? as usize;
                    SingleSubstKind::List(data.slice(4..).ok_or(ReadError::OutOfBounds)?, count)
                }
                other => return Err(ReadError::InvalidFormat(other)),
            };
            Ok(GsubSubtable::Single { coverage, deltas })
        }
        2 => {
            let cov_offset = data.read_u16(2)? as usize;
            let coverage = Coverage::read(data.tail(cov_offset).ok_or(ReadError::OutOfBounds)?)?;
            let count = data.read_u16(4)? as usize;
            let sequences = (0..count)
                .map(|i| {
                    let off = data.read_u16(6 + i * 2).unwrap_or(0) as usize;
                    let Some(seq) = data.tail(off) else { return Vec::new() };
                    let Ok(n) = seq.read_u16(0) else { return Vec::new() };
                    (0..n as usize)
                        .filter_map(|j| seq.read_u16(2 + j * 2).ok().map(GlyphId::new))
                        .collect()
                })
                .collect();
            Ok(GsubSubtable::Multiple { coverage, sequences })
        }
        3 => {
            let cov_offset = data.read_u16(2)? as usize;
            let coverage = Coverage::read(data.tail(cov_offset).ok_or(ReadError::OutOfBounds)?)?;
            let count = data.read_u16(4)? as usize;
            let alternates = (0..count)
                .map(|i| {
                    let off = data.read_u16(6 + i * 2).unwrap_or(0) as usize;
                    let Some(set) = data.tail(off) else { return Vec::new() };
                    let Ok(n) = set.read_u16(0) else { return Vec::new() };
                    (0..n as usize)
                        .filter_map(|j| set.read_u16(2 + j * 2).ok().map(GlyphId::new))
                        .collect()
                })
                .collect();
            Ok(GsubSubtable::Alternate { coverage, alternates })
        }
        4 => {
            let cov_offset = data.read_u16(2)? as usize;
            let coverage = Coverage::read(data.tail(cov_offset).ok_or(ReadError::OutOfBounds)?)?;
            let count = data.read_u16(4)? as usize;
            let ligature_sets = (0..count)
                .map(|i| {
                    let off = data.read_u16(6 + i * 2).unwrap_or(0) as usize;
                    read_ligature_set(data, off)
                })
                .collect();
            Ok(GsubSubtable::Ligature { coverage, ligature_sets })
        }
        5 => Ok(GsubSubtable::Context(SequenceContext::read(data)?)),
        6 => Ok(GsubSubtable::ChainContext(ChainedSequenceContext::read(data)?)),
        8 => {
            let cov_offset = data.read_u16(2)? as usize;
            let coverage = Coverage::read(data.tail(cov_offset).ok_or(ReadError::OutOfBounds)?)?;
            let backtrack_count = data.read_u16(4)? as usize;
            let backtrack = (0..backtrack_count)
                .filter_map(|i| {
                    let off = data.read_u16(6 + i * 2).ok()? as usize;
                    Coverage::read(data.tail(off)?).ok()
                })
                .collect();
            let la_pos = 6 + backtrack_count * 2;
            let lookahead_count = data.read_u16(la_pos)? as usize;
            let lookahead = (0..lookahead_count)
                .filter_map(|i| {
                    let off = data.read_u16(la_pos + 2 + i * 2).ok()? as usize;
                    Coverage::read(data.tail(off)?).ok()
                })
                .collect();
            let subst_pos = la_pos + 2 + lookahead_count * 2;
            let glyph_count = data.read_u16(subst_pos)? as usize;
            let substitutes = (0..glyph_count)
                .filter_map(|i| data.read_u16(subst_pos + 2 + i * 2).ok().map(GlyphId::new))
                .collect();
            Ok(GsubSubtable::ReverseChainSingle { coverage, backtrack, lookahead, substitutes })
        }
        other => Err(ReadError::MalformedData(
            match other {
                7 => "extension subtables must be resolved before decode_subtable is called",
                _ => "unknown GSUB lookup type",
            },
        )),
    }
}

/// Resolves extension (type 7) indirection, returning the real type and the
/// segment its subtable lives in.
fn resolve_extension<'a>(lookup_type: u16, data: Segment<'a>) -> Result<(u16, Segment<'a>), ReadError> {
    if lookup_type != 7 {
        return Ok((lookup_type, data));
    }
    let extension_type = data.read_u16(2)?;
    let offset = data.read_u32(4)? as usize;
    Ok((extension_type, data.tail(offset).ok_or(ReadError::OutOfBounds)?))
}

/// A lazily-decoding handle to one GSUB lookup. Subtable decode results are
/// memoized in-place the first time each index is requested.
pub struct GsubLookup<'a> {
    raw: RawLookup<'a>,
    cache: OnceCell<Vec<Result<GsubSubtable<'a>, ReadError>>>,
}

impl<'a> GsubLookup<'a> {
    fn new(raw: RawLookup<'a>) -> Self {
        GsubLookup { raw, cache: OnceCell::new() }
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

    /// Decodes (once) and returns all subtables. A per-subtable decode
    /// error does not poison its siblings: a corrupt subtable is
    /// treated as identity while the rest of the lookup still applies.
    fn decode_all(&self) -> &[Result<GsubSubtable<'a>, ReadError>] {
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

    /// The subtable at `index`, or `None` if it failed to decode (treated
    /// by the caller as an identity transform).
    pub fn subtable(&self, index: usize) -> Option<&GsubSubtable<'a>> {
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

    fn single_format1_bytes(delta: i16, cov_glyph: u16) -> Vec<u8> {
        let mut bytes = vec![];
        bytes.extend(1u16.to_be_bytes()); // format
        bytes.extend(6u16.to_be_bytes()); // coverage offset
        bytes.extend(delta.to_be_bytes());
        bytes.extend(1u16.to_be_bytes()); // coverage format
        bytes.extend(1u16.to_be_bytes()); // coverage count
        bytes.extend(cov_glyph.to_be_bytes());
        bytes
    }

    #[test]
    fn single_subst_format1_delta() {
        let bytes = single_format1_bytes(5, 10);
        let sub = decode_subtable(1, Segment::new(&bytes)).unwrap();
        match sub {
            GsubSubtable::Single { coverage, deltas } => {
                assert!(coverage.contains(GlyphId::new(10)));
                assert!(matches!(deltas, SingleSubstKind::Delta(5)));
            }
            _ => panic!("wrong variant"),
        }
    }
}
