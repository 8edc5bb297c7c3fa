//! Context and chained-context lookups (GSUB types 5/6, GPOS types 7/8).
//!
//! Both come in three formats; chained context additionally carries
//! backtrack and lookahead sequences. Each matched position in the input
//! carries a list of [`SequenceLookupRecord`]s: nested lookups to run,
//! addressed by position-in-match and lookup-list index.

use font_types::GlyphId;

use crate::data::Segment;
use crate::error::ReadError;
use crate::read::TableRead;
use crate::tables::classdef::ClassDef;
use crate::tables::coverage::Coverage;

/// `(sequenceIndex, lookupListIndex)`: apply `lookupListIndex` at the
/// matched position `sequenceIndex` positions into the input sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SequenceLookupRecord {
    pub sequence_index: u16,
    pub lookup_list_index: u16,
}

fn read_lookup_records(data: Segment<'_>, offset: usize, count: usize) -> Vec<SequenceLookupRecord> {
    (0..count)
        .filter_map(|i| {
            let base = offset + i * 4;
            Some(SequenceLookupRecord {
                sequence_index: data.read_u16(base).ok()?,
                lookup_list_index: data.read_u16(base + 2).ok()?,
            })
        })
        .collect()
}

fn read_u16_array(data: Segment<'_>, offset: usize, count: usize) -> Vec<u16> {
    (0..count).filter_map(|i| data.read_u16(offset + i * 2).ok()).collect()
}

/// A single context rule: the glyphs (or classes) that must follow the
/// first matched position, plus the nested lookups to apply.
#[derive(Clone, Debug)]
pub struct SequenceRule {
    /// Input sequence *after* the first glyph/class (which is implied by
    /// the coverage/class index the rule was found under).
    pub input: Vec<u16>,
    pub lookups: Vec<SequenceLookupRecord>,
}

fn read_sequence_rule(data: Segment<'_>) -> Option<SequenceRule> {
    let glyph_count = data.read_u16(0).ok()? as usize;
    let lookup_count = data.read_u16(2).ok()? as usize;
    let input = read_u16_array(data, 4, glyph_count.saturating_sub(1));
    let lookups = read_lookup_records(data, 4 + (glyph_count.saturating_sub(1)) * 2, lookup_count);
    Some(SequenceRule { input, lookups })
}

fn read_rule_set(data: Segment<'_>, offset: usize) -> Vec<SequenceRule> {
    let Some(seg) = data.tail(offset) else { return Vec::new() };
    let Ok(count) = seg.read_u16(0) else { return Vec::new() };
    (0..count as usize)
        .filter_map(|i| {
            let rule_offset = seg.read_u16(2 + i * 2).ok()? as usize;
            read_sequence_rule(seg.tail(rule_offset)?)
        })
        .collect()
}

/// A context (non-chained) sequence lookup, any of the three OpenType
/// formats.
#[derive(Clone, Debug)]
pub enum SequenceContext<'a> {
    Format1 {
        coverage: Coverage<'a>,
        rule_sets: Vec<Vec<SequenceRule>>,
    },
    Format2 {
        coverage: Coverage<'a>,
        class_def: ClassDef<'a>,
        class_rule_sets: Vec<Vec<SequenceRule>>,
    },
    Format3 {
        input: Vec<Coverage<'a>>,
        lookups: Vec<SequenceLookupRecord>,
    },
}

impl<'a> TableRead<'a> for SequenceContext<'a> {
    fn read(data: Segment<'a>) -> Result<Self, ReadError> {
        match data.read_u16(0)? {
            1 => {
                let cov_offset = data.read_u16(2)? as usize;
                let coverage = Coverage::read(data.tail(cov_offset).ok_or(ReadError::OutOfBounds)?)?;
                let count = data.read_u16(4)? as usize;
                let rule_sets = (0..count)
                    .map(|i| {
                        let off = data.read_u16(6 + i * 2).unwrap_or(0) as usize;
                        if off == 0 { Vec::new() } else { read_rule_set(data, off) }
                    })
                    .collect();
                Ok(SequenceContext::Format1 { coverage, rule_sets })
            }
            2 => {
                let cov_offset = data.read_u16(2)? as usize;
                let coverage = Coverage::read(data.tail(cov_offset).ok_or(ReadError::OutOfBounds)?)?;
                let class_def_offset = data.read_u16(4)? as usize;
                let class_def = ClassDef::read(data.tail(class_def_offset).ok_or(ReadError::OutOfBounds)?)?;
                let count = data.read_u16(6)? as usize;
                let class_rule_sets = (0..count)
                    .map(|i| {
                        let off = data.read_u16(8 + i * 2).unwrap_or(0) as usize;
                        if off == 0 { Vec::new() } else { read_rule_set(data, off) }
                    })
                    .collect();
                Ok(SequenceContext::Format2 { coverage, class_def, class_rule_sets })
            }
            3 => {
                let glyph_count = data.read_u16(2)? as usize;
                let lookup_count = data.read_u16(4)? as usize;
                let input = (0..glyph_count)
                    .filter_map(|i| {
                        let off = data.read_u16(6 + i * 2).ok()? as usize;
                        Coverage::read(data.tail(off)?).ok()
                    })
                    .collect();
                let lookups = read_lookup_records(data, 6 + glyph_count * 2, lookup_count);
                Ok(SequenceContext::Format3 { input, lookups })
            }
            other => Err(ReadError::InvalidFormat(other)),
        }
    }
}

/// A chained-context sequence lookup: backtrack, input and lookahead.
#[derive(Clone, Debug)]
pub enum ChainedSequenceContext<'a> {
    Format1 {
        coverage: Coverage<'a>,
        rule_sets: Vec<Vec<ChainedSequenceRule>>,
    },
    Format2 {
        coverage: Coverage<'a>,
        backtrack_class_def: ClassDef<'a>,
        input_class_def: ClassDef<'a>,
        lookahead_class_def: ClassDef<'a>,
        class_rule_sets: Vec<Vec<ChainedSequenceRule>>,
    },
    Format3 {
        backtrack: Vec<Coverage<'a>>,
        input: Vec<Coverage<'a>>,
        lookahead: Vec<Coverage<'a>>,
        lookups: Vec<SequenceLookupRecord>,
    },
}

#[derive(Clone, Debug)]
pub struct ChainedSequenceRule {
    pub backtrack: Vec<u16>,
    pub input: Vec<u16>,
    pub lookahead: Vec<u16>,
    pub lookups: Vec<SequenceLookupRecord>,
}

fn read_chained_rule(data: Segment<'_>) -> Option<ChainedSequenceRule> {
    let mut pos = 0;
    let backtrack_count = data.read_u16(pos).ok()? as usize;
    pos += 2;
    let backtrack = read_u16_array(data, pos, backtrack_count);
    pos += backtrack_count * 2;
    let input_glyph_count = data.read_u16(pos).ok()? as usize;
    pos += 2;
    let input = read_u16_array(data, pos, input_glyph_count.saturating_sub(1));
    pos += input_glyph_count.saturating_sub(1) * 2;
    let lookahead_count = data.read_u16(pos).ok()? as usize;
    pos += 2;
    let lookahead = read_u16_array(data, pos, lookahead_count);
    pos += lookahead_count * 2;
    let lookup_count = data.read_u16(pos).ok()? as usize;
    pos += 2;
    let lookups = read_lookup_records(data, pos, lookup_count);
    Some(ChainedSequenceRule { backtrack, input, lookahead, lookups })
}

fn read_chained_rule_set(data: Segment<'_>, offset: usize) -> Vec<ChainedSequenceRule> {
    let Some(seg) = data.tail(offset) else { return Vec::new() };
    let Ok(count) = seg.read_u16(0) else { return Vec::new() };
    (0..count as usize)
        .filter_map(|i| {
            let rule_offset = seg.read_u16(2 + i * 2).ok()? as usize;
            read_chained_rule(seg.tail(rule_offset)?)
        })
        .collect()
}

impl<'a> TableRead<'a> for ChainedSequenceContext<'a> {
    fn read(data: Segment<'a>) -> Result<Self, ReadError> {
        match data.read_u16(0)? {
            1 => {
                let cov_offset = data.read_u16(2)? as usize;
                let coverage = Coverage::read(data.tail(cov_offset).ok_or(ReadError::OutOfBounds)?)?;
                let count = data.read_u16(4)? as usize;
                let rule_sets = (0..count)
                    .map(|i| {
                        let off = data.read_u16(6 + i * 2).unwrap_or(0) as usize;
                        if off == 0 { Vec::new() } else { read_chained_rule_set(data, off) }
                    })
                    .collect();
                Ok(ChainedSequenceContext::Format1 { coverage, rule_sets })
            }
            2 => {
                let cov_offset = data.read_u16(2)? as usize;
                let coverage = Coverage::read(data.tail(cov_offset).ok_or(ReadError::OutOfBounds)?)?;
                let backtrack_class_def = ClassDef::read(
                    data.tail(data.read_u16(4)? as usize).ok_or(ReadError::OutOfBounds)?,
                )?;
                let input_class_def = ClassDef::read(
                    data.tail(data.read_u16(6)? as usize).ok_or(ReadError::OutOfBounds)?,
                )?;
                let lookahead_class_def = ClassDef::read(
                    data.tail(data.read_u16(8)? as usize).ok_or(ReadError::OutOfBounds)?,
                )?;
                let count = data.read_u16(10)? as usize;
                let class_rule_sets = (0..count)
                    .map(|i| {
                        let off = data.read_u16(12 + i * 2).unwrap_or(0) as usize;
                        if off == 0 { Vec::new() } else { read_chained_rule_set(data, off) }
                    })
                    .collect();
                Ok(ChainedSequenceContext::Format2 {
                    coverage,
                    backtrack_class_def,
                    input_class_def,
                    lookahead_class_def,
                    class_rule_sets,
                })
            }
            3 => {
                let mut pos = 2;
                let backtrack_count = data.read_u16(pos)? as usize;
                pos += 2;
                let backtrack = (0..backtrack_count)
                    .filter_map(|i| {
                        let off = data.read_u16(pos + i * 2).ok()? as usize;
                        Coverage::read(data.tail(off)?).ok()
                    })
                    .collect();
                pos += backtrack_count * 2;
                let input_count = data.read_u16(pos)? as usize;
                pos += 2;
                let input = (0..input_count)
                    .filter_map(|i| {
                        let off = data.read_u16(pos + i * 2).ok()? as usize;
                        Coverage::read(data.tail(off)?).ok()
                    })
                    .collect();
                pos += input_count * 2;
                let lookahead_count = data.read_u16(pos)? as usize;
                pos += 2;
                let lookahead = (0..lookahead_count)
                    .filter_map(|i| {
                        let off = data.read_u16(pos + i * 2).ok()? as usize;
                        Coverage::read(data.tail(off)?).ok()
                    })
                    .collect();
                pos += lookahead_count * 2;
                let lookup_count = data.read_u16(pos)? as usize;
                pos += 2;
                let lookups = read_lookup_records(data, pos, lookup_count);
                Ok(ChainedSequenceContext::Format3 { backtrack, input, lookahead, lookups })
            }
            other => Err(ReadError::InvalidFormat(other)),
        }
    }
}

/// Shared matching core: given how to read a glyph at a buffer position and
/// how to test a single position/class requirement, decide whether a rule
/// matches starting at `pos`. The skip
/// policy (lookup flags, mark filtering) is applied by the caller when it
/// builds `glyph_at`.
pub fn match_glyph_sequence(
    expected: &[u16],
    mut glyph_at: impl FnMut(usize) -> Option<GlyphId>,
    start: usize,
    test: impl Fn(u16, GlyphId) -> bool,
) -> bool {
    for (i, &want) in expected.iter().enumerate() {
        match glyph_at(start + i) {
            Some(g) if test(want, g) => continue,
            _ => return false,
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_sequence_matches_trivially() {
        // Format 3 with empty backtrack/input/lookahead trivially matches
        // at every position.
        assert!(match_glyph_sequence(&[], |_| None, 0, |_, _| true));
    }
}
