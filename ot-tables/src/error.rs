//! The two error channels described by the navigator: a structural
//! `ReadError` returned by every decode, and a `FontError` log that the
//! `Font` accumulates while validating its table directory up front.

use std::fmt;

use font_types::Tag;

/// Why a read failed. This is the value a decode returns directly; nothing
/// here implies the font as a whole is unusable, only that the specific
/// field, record or subtable being read could not be produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReadError {
    /// A read would have run past the end of the segment it was reading.
    OutOfBounds,
    /// A format/version discriminant did not match any known variant.
    InvalidFormat(u16),
    /// The four-byte scaler tag at the start of the file was not recognized.
    InvalidSfntTag(u32),
    /// A table this navigation depends on is absent.
    TableMissing(Tag),
    /// A count or length field is internally inconsistent (e.g. implies an
    /// array extends past the table that contains it).
    MalformedData(&'static str),
    /// An offset field was zero ("null") where a value was required.
    NullOffset,
}

impl fmt::Display for ReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadError::OutOfBounds => write!(f, "read out of bounds"),
            ReadError::InvalidFormat(n) => write!(f, "unrecognized format {n}"),
            ReadError::InvalidSfntTag(t) => write!(f, "unrecognized sfnt scaler tag 0x{t:08x}"),
            ReadError::TableMissing(tag) => write!(f, "table '{tag}' is missing"),
            ReadError::MalformedData(msg) => write!(f, "malformed data: {msg}"),
            ReadError::NullOffset => write!(f, "unexpected null offset"),
        }
    }
}

impl std::error::Error for ReadError {}

/// Severity bucket for errors collected while validating a `Font`'s table
/// directory. `Fatal` means the font could not be parsed at all; `Warning`
/// and `Info` are recorded against an otherwise-usable font.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Fatal,
    Warning,
    Info,
}

/// A single diagnostic, scoped to the table (and, where known, the offset
/// within it) that produced it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FontError {
    pub table: Tag,
    pub offset: Option<usize>,
    pub severity: Severity,
    pub reason: String,
}

impl FontError {
    pub fn new(table: Tag, severity: Severity, reason: impl Into<String>) -> Self {
        FontError {
            table,
            offset: None,
            severity,
            reason: reason.into(),
        }
    }

    pub fn at(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }
}

impl fmt::Display for FontError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.offset {
            Some(off) => write!(
                f,
                "[{:?}] {} @{off}: {}",
                self.severity, self.table, self.reason
            ),
            None => write!(f, "[{:?}] {}: {}", self.severity, self.table, self.reason),
        }
    }
}
