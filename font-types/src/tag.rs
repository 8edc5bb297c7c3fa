//! Four-byte OpenType tags.

use std::fmt;
use std::str::FromStr;

/// A four-byte, big-endian packed identifier used throughout OpenType for
/// table, script, language and feature names (e.g. `GSUB`, `latn`, `liga`).
///
/// Tags order totally by their numeric (big-endian) value, which matches
/// the ordering OpenType itself relies on for binary-searching tag-keyed
/// records.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag(u32);

impl Tag {
    /// The sentinel tag used for "no script/language selected".
    pub const DEFAULT_SCRIPT: Tag = Tag::new(b"DFLT");

    /// Build a tag from four bytes, padding a short slice with spaces.
    ///
    /// # Panics
    ///
    /// Panics if `bytes` is empty, longer than four bytes, or contains a
    /// byte outside the printable ASCII range.
    pub const fn new(bytes: &[u8]) -> Tag {
        match Tag::try_new(bytes) {
            Ok(tag) => tag,
            Err(_) => panic!("invalid tag"),
        }
    }

    /// Fallible constructor; see [`Tag::new`] for the validation rules.
    pub const fn try_new(bytes: &[u8]) -> Result<Tag, InvalidTag> {
        if bytes.is_empty() || bytes.len() > 4 {
            return Err(InvalidTag::BadLength(bytes.len()));
        }
        let mut out = [b' '; 4];
        let mut i = 0;
        while i < bytes.len() {
            let b = bytes[i];
            if b < 0x20 || b > 0x7e {
                return Err(InvalidTag::BadByte(b));
            }
            out[i] = b;
            i += 1;
        }
        Ok(Tag(u32::from_be_bytes(out)))
    }

    /// Construct directly from a raw big-endian `u32`, without validation.
    ///
    /// Used when decoding untrusted font bytes, where an out-of-range tag
    /// should surface as a mismatch rather than a panic.
    pub const fn from_u32(raw: u32) -> Tag {
        Tag(raw)
    }

    pub const fn to_u32(self) -> u32 {
        self.0
    }

    pub const fn to_be_bytes(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InvalidTag {
    BadLength(usize),
    BadByte(u8),
}

impl fmt::Display for InvalidTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidTag::BadLength(n) => write!(f, "tag must be 1-4 bytes, got {n}"),
            InvalidTag::BadByte(b) => write!(f, "tag byte 0x{b:02x} is not printable ascii"),
        }
    }
}

impl std::error::Error for InvalidTag {}

impl FromStr for Tag {
    type Err = InvalidTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tag::try_new(s.as_bytes())
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag({self})")
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self.to_be_bytes();
        let mut printable = [b'.'; 4];
        for (dst, src) in printable.iter_mut().zip(bytes) {
            if src.is_ascii_graphic() || src == b' ' {
                *dst = src;
            }
        }
        f.write_str(std::str::from_utf8(&printable).unwrap())
    }
}

impl Default for Tag {
    fn default() -> Self {
        Tag::DEFAULT_SCRIPT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_is_numeric() {
        assert!(Tag::new(b"GSUB") < Tag::new(b"GSUc"));
    }

    #[test]
    fn short_tags_pad_with_space() {
        assert_eq!(Tag::new(b"cv").to_be_bytes(), *b"cv  ");
    }

    #[test]
    fn rejects_control_bytes() {
        assert!(Tag::try_new(&[0x07]).is_err());
    }

    #[test]
    fn round_trips_display() {
        assert_eq!(Tag::new(b"latn").to_string(), "latn");
    }
}
