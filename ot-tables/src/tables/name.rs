//! `name`: human-readable strings (family name, etc). Shaping itself never
//! consults it, but it's part of the font facade's table directory and
//! useful for diagnostics, so it's read the same lazy way as everything
//! else rather than being special-cased out.

use font_types::Tag;

use crate::data::Segment;
use crate::error::ReadError;
use crate::read::TableRead;

pub const TAG: Tag = Tag::new(b"name");

#[derive(Clone, Copy, Debug)]
pub struct Name<'a> {
    data: Segment<'a>,
    count: usize,
    storage_offset: usize,
}

impl<'a> TableRead<'a> for Name<'a> {
    fn read(data: Segment<'a>) -> Result<Self, ReadError> {
        let count = data.read_u16(2)? as usize;
        let storage_offset = data.read_u16(4)? as usize;
        Ok(Name { data, count, storage_offset })
    }
}

#[derive(Clone, Copy, Debug)]
pub struct NameRecord {
    pub platform_id: u16,
    pub encoding_id: u16,
    pub language_id: u16,
    pub name_id: u16,
}

impl<'a> Name<'a> {
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn record(&self, index: usize) -> Option<NameRecord> {
        if index >= self.count {
            return None;
        }
        let base = 6 + index * 12;
        Some(NameRecord {
            platform_id: self.data.read_u16(base).ok()?,
            encoding_id: self.data.read_u16(base + 2).ok()?,
            language_id: self.data.read_u16(base + 4).ok()?,
            name_id: self.data.read_u16(base + 6).ok()?,
        })
    }

    /// The raw (un-decoded) bytes backing record `index`; platform 3
    /// records are UTF-16BE, platform 1 records are usually Mac Roman.
    /// Decoding is left to the caller since it's encoding-dependent and
    /// shaping never needs it.
    pub fn record_bytes(&self, index: usize) -> Option<Segment<'a>> {
        if index >= self.count {
            return None;
        }
        let base = 6 + index * 12;
        let length = self.data.read_u16(base + 8).ok()? as usize;
        let offset = self.data.read_u16(base + 10).ok()? as usize;
        let start = self.storage_offset + offset;
        self.data.slice(start..start + length)
    }
}
