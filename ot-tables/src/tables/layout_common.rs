//! The script/language/feature/lookup graph shared by GSUB and GPOS.

use font_types::Tag;

use crate::data::Segment;
use crate::error::ReadError;
use crate::read::TableRead;
use crate::tables::lookup_flags::LookupFlags;

/// `ScriptList`: a tag-keyed map from script tag to [`Script`].
#[derive(Clone, Copy, Debug)]
pub struct ScriptList<'a> {
    data: Segment<'a>,
    count: usize,
}

impl<'a> TableRead<'a> for ScriptList<'a> {
    fn read(data: Segment<'a>) -> Result<Self, ReadError> {
        let count = data.read_u16(0)? as usize;
        Ok(ScriptList { data, count })
    }
}

impl<'a> ScriptList<'a> {
    const RECORD_LEN: usize = 6; // tag: Tag, offset: u16

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn tag_at(&self, index: usize) -> Option<Tag> {
        let base = 2 + index * Self::RECORD_LEN;
        self.data.read_u32(base).ok().map(Tag::from_u32)
    }

    pub fn get(&self, tag: Tag) -> Option<Script<'a>> {
        for i in 0..self.count {
            if self.tag_at(i)? == tag {
                let base = 2 + i * Self::RECORD_LEN;
                let offset = self.data.read_u16(base + 4).ok()? as usize;
                let seg = self.data.tail(offset)?;
                return Script::read(seg).ok();
            }
        }
        None
    }
}

/// A `Script` record: an optional default `LangSys`, plus any number of
/// explicitly-tagged ones.
#[derive(Clone, Copy, Debug)]
pub struct Script<'a> {
    data: Segment<'a>,
    lang_sys_count: usize,
}

impl<'a> TableRead<'a> for Script<'a> {
    fn read(data: Segment<'a>) -> Result<Self, ReadError> {
        let lang_sys_count = data.read_u16(2)? as usize;
        Ok(Script { data, lang_sys_count })
    }
}

impl<'a> Script<'a> {
    const RECORD_LEN: usize = 6;

    pub fn default_lang_sys(&self) -> Option<LangSys<'a>> {
        let offset = self.data.read_u16(0).ok()?;
        if offset == 0 {
            return None;
        }
        LangSys::read(self.data.tail(offset as usize)?).ok()
    }

    pub fn lang_sys_count(&self) -> usize {
        self.lang_sys_count
    }

    pub fn lang_sys_tag_at(&self, index: usize) -> Option<Tag> {
        let base = 4 + index * Self::RECORD_LEN;
        self.data.read_u32(base).ok().map(Tag::from_u32)
    }

    pub fn lang_sys(&self, tag: Tag) -> Option<LangSys<'a>> {
        for i in 0..self.lang_sys_count {
            if self.lang_sys_tag_at(i)? == tag {
                let base = 4 + i * Self::RECORD_LEN;
                let offset = self.data.read_u16(base + 4).ok()? as usize;
                return LangSys::read(self.data.tail(offset)?).ok();
            }
        }
        None
    }
}

/// A `LangSys`: an optional required feature, plus the ordered feature
/// indices this language activates by default.
#[derive(Clone, Copy, Debug)]
pub struct LangSys<'a> {
    data: Segment<'a>,
    feature_index_count: usize,
}

impl<'a> TableRead<'a> for LangSys<'a> {
    fn read(data: Segment<'a>) -> Result<Self, ReadError> {
        let feature_index_count = data.read_u16(4)? as usize;
        Ok(LangSys { data, feature_index_count })
    }
}

impl<'a> LangSys<'a> {
    /// Index into the FeatureList for the one feature this language
    /// requires, if any. `0xFFFF` means "no required feature".
    pub fn required_feature_index(&self) -> Option<u16> {
        match self.data.read_u16(2).ok()? {
            0xFFFF => None,
            index => Some(index),
        }
    }

    pub fn feature_indices(&self) -> impl Iterator<Item = u16> + '_ {
        (0..self.feature_index_count).filter_map(move |i| self.data.read_u16(6 + i * 2).ok())
    }
}

/// `FeatureList`: an indexable list of `(Tag, Feature)` pairs.
#[derive(Clone, Copy, Debug)]
pub struct FeatureList<'a> {
    data: Segment<'a>,
    count: usize,
}

impl<'a> TableRead<'a> for FeatureList<'a> {
    fn read(data: Segment<'a>) -> Result<Self, ReadError> {
        let count = data.read_u16(0)? as usize;
        Ok(FeatureList { data, count })
    }
}

impl<'a> FeatureList<'a> {
    const RECORD_LEN: usize = 6;

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn get(&self, index: u16) -> Option<(Tag, Feature<'a>)> {
        let index = index as usize;
        if index >= self.count {
            return None;
        }
        let base = 2 + index * Self::RECORD_LEN;
        let tag = Tag::from_u32(self.data.read_u32(base).ok()?);
        let offset = self.data.read_u16(base + 4).ok()? as usize;
        let feature = Feature::read(self.data.tail(offset)?).ok()?;
        Some((tag, feature))
    }

    pub fn iter(&self) -> impl Iterator<Item = (u16, Tag, Feature<'a>)> + '_ {
        (0..self.count as u16).filter_map(move |i| {
            let (tag, feature) = self.get(i)?;
            Some((i, tag, feature))
        })
    }
}

/// A `Feature`: an ordered list of lookup indices into the table's
/// `LookupList`.
#[derive(Clone, Copy, Debug)]
pub struct Feature<'a> {
    data: Segment<'a>,
    lookup_count: usize,
}

impl<'a> TableRead<'a> for Feature<'a> {
    fn read(data: Segment<'a>) -> Result<Self, ReadError> {
        let lookup_count = data.read_u16(2)? as usize;
        Ok(Feature { data, lookup_count })
    }
}

impl<'a> Feature<'a> {
    pub fn lookup_indices(&self) -> impl Iterator<Item = u16> + '_ {
        (0..self.lookup_count).filter_map(move |i| self.data.read_u16(4 + i * 2).ok())
    }

    pub fn lookup_count(&self) -> usize {
        self.lookup_count
    }
}

/// `LookupList`: an indexable list of raw lookup headers.
///
/// Decoding the lookup's subtables is left to the caller (see
/// `gsub::Gsub::lookup`/`gpos::Gpos::lookup`), since the subtable record
/// shape is format-specific.
#[derive(Clone, Copy, Debug)]
pub struct LookupList<'a> {
    data: Segment<'a>,
    count: usize,
}

impl<'a> TableRead<'a> for LookupList<'a> {
    fn read(data: Segment<'a>) -> Result<Self, ReadError> {
        let count = data.read_u16(0)? as usize;
        Ok(LookupList { data, count })
    }
}

impl<'a> LookupList<'a> {
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn raw_lookup(&self, index: u16) -> Option<RawLookup<'a>> {
        let index = index as usize;
        if index >= self.count {
            return None;
        }
        let offset = self.data.read_u16(2 + index * 2).ok()? as usize;
        RawLookup::read(self.data.tail(offset)?).ok()
    }
}

/// A lookup header: type, flags, and the offsets (not yet decoded) of its
/// subtables.
#[derive(Clone, Copy, Debug)]
pub struct RawLookup<'a> {
    data: Segment<'a>,
    lookup_type: u16,
    flags: LookupFlags,
    subtable_count: usize,
}

impl<'a> TableRead<'a> for RawLookup<'a> {
    fn read(data: Segment<'a>) -> Result<Self, ReadError> {
        let lookup_type = data.read_u16(0)?;
        let flags = LookupFlags::from_bits(data.read_u16(2)?);
        let subtable_count = data.read_u16(4)? as usize;
        Ok(RawLookup { data, lookup_type, flags, subtable_count })
    }
}

impl<'a> RawLookup<'a> {
    pub fn lookup_type(&self) -> u16 {
        self.lookup_type
    }

    pub fn flags(&self) -> LookupFlags {
        self.flags
    }

    pub fn subtable_count(&self) -> usize {
        self.subtable_count
    }

    pub fn subtable_data(&self, index: usize) -> Option<Segment<'a>> {
        if index >= self.subtable_count {
            return None;
        }
        let offset = self.data.read_u16(6 + index * 2).ok()? as usize;
        self.data.tail(offset)
    }

    /// The mark-filtering-set field, present only when
    /// `flags.uses_mark_filtering_set()`; it trails the subtable offset
    /// array.
    pub fn mark_filtering_set(&self) -> Option<u16> {
        if !self.flags.uses_mark_filtering_set() {
            return None;
        }
        self.data.read_u16(6 + self.subtable_count * 2).ok()
    }
}
