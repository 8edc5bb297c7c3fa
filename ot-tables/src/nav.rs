//! Uniform, untyped traversal over font table bytes.
//!
//! Typed views (a `Gsub`, a `Cmap`, ...) exist for callers who already know
//! what they want. The navigator primitives in this module exist for
//! callers who don't: a debugger or explorer walking an arbitrary font can
//! recurse through `NavMap`/`NavList`/`NavLink` without knowing the
//! concrete record types ahead of time. Nothing in the shaping pipeline
//! itself uses this path.

use font_types::Tag;

use crate::data::Segment;
use crate::error::ReadError;

/// A location within a font: a byte segment plus the offset, within that
/// segment, this node's fields are read relative to.
#[derive(Clone, Copy, Debug)]
pub struct NavLocation<'a> {
    segment: Segment<'a>,
    local_offset: usize,
}

impl<'a> NavLocation<'a> {
    pub fn new(segment: Segment<'a>, local_offset: usize) -> Self {
        NavLocation { segment, local_offset }
    }

    /// Bytes remaining in the segment from this location onward.
    pub fn size(&self) -> usize {
        self.segment.len().saturating_sub(self.local_offset)
    }

    pub fn u16(&self, field_offset: usize) -> Result<u16, ReadError> {
        self.segment.read_u16(self.local_offset + field_offset)
    }

    pub fn u32(&self, field_offset: usize) -> Result<u32, ReadError> {
        self.segment.read_u32(self.local_offset + field_offset)
    }

    pub fn segment(&self) -> Segment<'a> {
        self.segment
    }

    pub fn local_offset(&self) -> usize {
        self.local_offset
    }
}

/// An edge in the navigation graph: an offset field that, once resolved,
/// becomes a new [`Navigator`] rooted at the target.
#[derive(Clone, Copy, Debug)]
pub struct NavLink<'a> {
    target: NavLocation<'a>,
}

impl<'a> NavLink<'a> {
    pub fn navigate(&self) -> Navigator<'a> {
        Navigator { at: self.target }
    }
}

/// A node in the navigation graph, positioned at some [`NavLocation`].
#[derive(Clone, Copy, Debug)]
pub struct Navigator<'a> {
    at: NavLocation<'a>,
}

impl<'a> Navigator<'a> {
    pub fn at(location: NavLocation<'a>) -> Self {
        Navigator { at: location }
    }

    pub fn location(&self) -> NavLocation<'a> {
        self.at
    }

    /// Interpret this node as a map, given the caller's description of its
    /// entries. This is descent-only: the navigator never materializes
    /// parent pointers, so callers walk down from a `Font`'s tables, never
    /// back up.
    pub fn map(&self, entries: Vec<(NavKey, NavLink<'a>)>) -> NavMap<'a> {
        NavMap { entries }
    }

    pub fn list(&self, links: Vec<NavLink<'a>>) -> NavList<'a> {
        NavList { links }
    }

    pub fn link_at(&self, field_offset: usize, width: OffsetWidth) -> Result<Option<NavLink<'a>>, ReadError> {
        let raw = match width {
            OffsetWidth::Offset16 => self.at.u16(field_offset)? as u32,
            OffsetWidth::Offset32 => self.at.u32(field_offset)?,
        };
        if font_types::is_null(raw) {
            return Ok(None);
        }
        let base = self.at.local_offset + raw as usize;
        Ok(Some(NavLink {
            target: NavLocation::new(self.at.segment, base),
        }))
    }
}

#[derive(Clone, Copy, Debug)]
pub enum OffsetWidth {
    Offset16,
    Offset32,
}

/// Either a plain string-keyed map, or a "tag-record map": the OpenType
/// idiom of a sorted array of `{tag, offset}` records (ScriptList,
/// FeatureList and friends all look like this).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NavKey {
    Tag(Tag),
    Index(usize),
    Name(&'static str),
}

pub struct NavMap<'a> {
    entries: Vec<(NavKey, NavLink<'a>)>,
}

impl<'a> NavMap<'a> {
    pub fn get(&self, key: NavKey) -> Option<&NavLink<'a>> {
        self.entries.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(NavKey, NavLink<'a>)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `true` when every key is a [`NavKey::Tag`] — i.e. this is a
    /// tag-record map rather than a plain map.
    pub fn is_tag_record_map(&self) -> bool {
        !self.entries.is_empty() && self.entries.iter().all(|(k, _)| matches!(k, NavKey::Tag(_)))
    }
}

pub struct NavList<'a> {
    links: Vec<NavLink<'a>>,
}

impl<'a> NavList<'a> {
    pub fn get(&self, index: usize) -> Option<&NavLink<'a>> {
        self.links.get(index)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NavLink<'a>> {
        self.links.iter()
    }
}
