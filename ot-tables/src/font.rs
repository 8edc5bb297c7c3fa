//! `Font`: parses the SFNT table directory and exposes typed, lazily
//! decoded views over the tables shaping cares about.
//!
//! Per-table decode errors never fail the whole font: they are collected
//! as [`FontError`]s scoped to the offending table, and a table that
//! fails to decode simply behaves as absent. Only a malformed table
//! directory itself (bad sfnt tag, truncated header) is fatal.

use font_types::Tag;

use crate::data::Segment;
use crate::error::{FontError, ReadError, Severity};
use crate::read::{TableRead, TableReadWithArgs};
use crate::tables::{cmap, gdef, gpos, gsub, head, hhea, hmtx, maxp, name};

const SFNT_VERSION_TRUETYPE: u32 = 0x0001_0000;
const SFNT_VERSION_OTTO: u32 = 0x4F54_544F; // 'OTTO'
const SFNT_VERSION_TRUE: u32 = 0x7472_7565; // 'true'

#[derive(Clone, Copy, Debug)]
struct TableRecord {
    tag: Tag,
    offset: usize,
    length: usize,
}

/// A parsed font file: the table directory plus any diagnostics collected
/// while validating it.
pub struct Font<'a> {
    data: &'a [u8],
    records: Vec<TableRecord>,
    errors: Vec<FontError>,
}

impl<'a> Font<'a> {
    pub fn parse(data: &'a [u8]) -> Result<Self, ReadError> {
        let seg = Segment::new(data);
        let sfnt_version = seg.read_u32(0)?;
        if !matches!(sfnt_version, SFNT_VERSION_TRUETYPE | SFNT_VERSION_OTTO | SFNT_VERSION_TRUE) {
            return Err(ReadError::InvalidSfntTag(sfnt_version));
        }
        let num_tables = seg.read_u16(4)? as usize;
        let mut records = Vec::with_capacity(num_tables);
        let mut errors = Vec::new();
        for i in 0..num_tables {
            let base = 12 + i * 16;
            let tag = Tag::from_u32(seg.read_u32(base)?);
            let Ok(offset) = seg.read_u32(base + 8) else {
                errors.push(FontError::new(tag, Severity::Warning, "table record truncated").at(base));
                continue;
            };
            let Ok(length) = seg.read_u32(base + 12) else {
                errors.push(FontError::new(tag, Severity::Warning, "table record truncated").at(base));
                continue;
            };
            if data.get(offset as usize..).is_none() {
                errors.push(
                    FontError::new(tag, Severity::Warning, "table offset out of bounds").at(offset as usize),
                );
                continue;
            }
            records.push(TableRecord { tag, offset: offset as usize, length: length as usize });
        }
        Ok(Font { data, records, errors })
    }

    pub fn errors(&self) -> &[FontError] {
        &self.errors
    }

    /// Records a diagnostic for a lookup subtable that failed to decode
    /// inside an otherwise successfully-decoded table. The table itself is
    /// still usable; only the one subtable is treated as identity.
    pub fn record_subtable_error(&mut self, tag: Tag, err: &ReadError) {
        self.errors.push(FontError::new(tag, Severity::Warning, err.to_string()));
    }

    fn record(&self, tag: Tag) -> Option<&TableRecord> {
        self.records.iter().find(|r| r.tag == tag)
    }

    /// The raw bytes of table `tag`, if present, clamped to its declared
    /// length when that doesn't run past the end of the file.
    pub fn table_data(&self, tag: Tag) -> Option<Segment<'a>> {
        let record = self.record(tag)?;
        let seg = Segment::new(self.data).tail(record.offset)?;
        Some(seg.slice(0..record.length).unwrap_or(seg))
    }

    pub fn has_table(&self, tag: Tag) -> bool {
        self.record(tag).is_some()
    }

    fn decode<T: TableRead<'a>>(&mut self, tag: Tag) -> Option<T> {
        let data = self.table_data(tag)?;
        match T::read(data) {
            Ok(value) => Some(value),
            Err(err) => {
                self.errors.push(FontError::new(tag, Severity::Info, err.to_string()));
                None
            }
        }
    }

    pub fn head(&mut self) -> Option<head::Head> {
        self.decode(head::TAG)
    }

    pub fn hhea(&mut self) -> Option<hhea::Hhea> {
        self.decode(hhea::TAG)
    }

    pub fn maxp(&mut self) -> Option<maxp::Maxp> {
        self.decode(maxp::TAG)
    }

    pub fn hmtx(&mut self) -> Option<hmtx::Hmtx<'a>> {
        let number_of_h_metrics = self.hhea()?.number_of_h_metrics;
        let data = self.table_data(hmtx::TAG)?;
        match hmtx::Hmtx::read_with_args(data, &number_of_h_metrics) {
            Ok(value) => Some(value),
            Err(err) => {
                self.errors.push(FontError::new(hmtx::TAG, Severity::Info, err.to_string()));
                None
            }
        }
    }

    pub fn cmap(&mut self) -> Option<cmap::Cmap<'a>> {
        self.decode(cmap::TAG)
    }

    pub fn gsub(&mut self) -> Option<gsub::Gsub<'a>> {
        self.decode(gsub::TAG)
    }

    pub fn gpos(&mut self) -> Option<gpos::Gpos<'a>> {
        self.decode(gpos::TAG)
    }

    pub fn gdef(&mut self) -> Option<gdef::Gdef<'a>> {
        self.decode(gdef::TAG)
    }

    pub fn name(&mut self) -> Option<name::Name<'a>> {
        self.decode(name::TAG)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_sfnt() -> Vec<u8> {
        let mut bytes = vec![];
        bytes.extend(SFNT_VERSION_TRUETYPE.to_be_bytes());
        bytes.extend(1u16.to_be_bytes()); // numTables
        bytes.extend(0u16.to_be_bytes()); // searchRange
        bytes.extend(0u16.to_be_bytes()); // entrySelector
        bytes.extend(0u16.to_be_bytes()); // rangeShift
        bytes.extend(*b"head");
        bytes.extend(0u32.to_be_bytes()); // checksum
        bytes.extend(28u32.to_be_bytes()); // offset
        bytes.extend(54u32.to_be_bytes()); // length
        bytes.resize(28 + 54, 0);
        bytes[28 + 18..28 + 20].copy_from_slice(&1000u16.to_be_bytes());
        bytes
    }

    #[test]
    fn parses_table_directory_and_decodes_head() {
        let bytes = minimal_sfnt();
        let mut font = Font::parse(&bytes).unwrap();
        assert!(font.has_table(head::TAG));
        assert_eq!(font.head().unwrap().units_per_em, 1000);
        assert!(font.errors().is_empty());
    }

    #[test]
    fn rejects_unknown_sfnt_version() {
        let bytes = vec![0u8; 12];
        assert!(matches!(Font::parse(&bytes), Err(ReadError::InvalidSfntTag(0))));
    }
}
