//! Coverage tables: "which glyphs does this lookup affect".

use font_types::GlyphId;

use crate::data::Segment;
use crate::error::ReadError;
use crate::read::TableRead;

/// A Coverage table, format 1 (sorted glyph list) or format 2 (sorted
/// non-overlapping glyph-id ranges, each tagged with the coverage index of
/// its first glyph).
#[derive(Clone, Copy, Debug)]
pub enum Coverage<'a> {
    Format1 { glyphs: Segment<'a>, count: usize },
    Format2 { ranges: Segment<'a>, count: usize },
}

const RANGE_RECORD_LEN: usize = 6; // start, end: u16, u16; startCoverageIndex: u16

impl<'a> TableRead<'a> for Coverage<'a> {
    fn read(data: Segment<'a>) -> Result<Self, ReadError> {
        let format = data.read_u16(0)?;
        let count = data.read_u16(2)? as usize;
        match format {
            1 => Ok(Coverage::Format1 { glyphs: data, count }),
            2 => Ok(Coverage::Format2 { ranges: data, count }),
            other => Err(ReadError::InvalidFormat(other)),
        }
    }
}

impl<'a> Coverage<'a> {
    /// The number of glyphs covered.
    pub fn count(&self) -> usize {
        match self {
            Coverage::Format1 { count, .. } => *count,
            Coverage::Format2 { count, .. } => *count,
        }
    }

    /// The coverage index for `glyph`, if it is covered. Always in
    /// `[0, self.count())` when `Some`.
    pub fn get(&self, glyph: GlyphId) -> Option<u16> {
        match self {
            Coverage::Format1 { glyphs, count } => {
                let gid = glyph.to_u16();
                binary_search(*count, |i| {
                    glyphs.read_u16(4 + i * 2).unwrap_or(u16::MAX)
                }, gid)
                    .map(|i| i as u16)
            }
            Coverage::Format2 { ranges, count } => {
                let gid = glyph.to_u16();
                let idx = binary_search_range(*count, |i| {
                    let base = 4 + i * RANGE_RECORD_LEN;
                    let start = ranges.read_u16(base).unwrap_or(u16::MAX);
                    let end = ranges.read_u16(base + 2).unwrap_or(u16::MAX);
                    (start, end)
                }, gid)?;
                let base = 4 + idx * RANGE_RECORD_LEN;
                let start = ranges.read_u16(base).ok()?;
                let start_index = ranges.read_u16(base + 4).ok()?;
                Some(start_index + (gid - start))
            }
        }
    }

    pub fn contains(&self, glyph: GlyphId) -> bool {
        self.get(glyph).is_some()
    }
}

fn binary_search(count: usize, at: impl Fn(usize) -> u16, target: u16) -> Option<usize> {
    let mut lo = 0usize;
    let mut hi = count;
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        match at(mid).cmp(&target) {
            std::cmp::Ordering::Less => lo = mid + 1,
            std::cmp::Ordering::Greater => hi = mid,
            std::cmp::Ordering::Equal => return Some(mid),
        }
    }
    None
}

fn binary_search_range(count: usize, at: impl Fn(usize) -> (u16, u16), target: u16) -> Option<usize> {
    let mut lo = 0usize;
    let mut hi = count;
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        let (start, end) = at(mid);
        if target < start {
            hi = mid;
        } else if target > end {
            lo = mid + 1;
        } else {
            return Some(mid);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn be_u16(v: u16) -> [u8; 2] {
        v.to_be_bytes()
    }

    #[test]
    fn format1_lookup() {
        let mut bytes = vec![];
        bytes.extend(be_u16(1)); // format
        bytes.extend(be_u16(3)); // count
        bytes.extend(be_u16(5));
        bytes.extend(be_u16(10));
        bytes.extend(be_u16(20));
        let seg = Segment::new(&bytes);
        let cov = Coverage::read(seg).unwrap();
        assert_eq!(cov.count(), 3);
        assert_eq!(cov.get(GlyphId::new(10)), Some(1));
        assert_eq!(cov.get(GlyphId::new(11)), None);
    }

    #[test]
    fn format2_lookup() {
        let mut bytes = vec![];
        bytes.extend(be_u16(2));
        bytes.extend(be_u16(1));
        bytes.extend(be_u16(100)); // start
        bytes.extend(be_u16(110)); // end
        bytes.extend(be_u16(0)); // start coverage index
        let seg = Segment::new(&bytes);
        let cov = Coverage::read(seg).unwrap();
        assert_eq!(cov.get(GlyphId::new(105)), Some(5));
        assert_eq!(cov.get(GlyphId::new(99)), None);
    }
}
