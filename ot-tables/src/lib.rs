//! Lazy, zero-copy navigation over SFNT/OpenType layout tables.
//!
//! This crate never allocates to parse a font: every table view borrows
//! directly from the caller's byte buffer, and decoding a record is a
//! bounds-checked slice read, not a copy. The one exception is the
//! subtable-decode caches on [`tables::gsub::GsubLookup`] and
//! [`tables::gpos::GposLookup`], which build small owned structures (lists
//! of glyphs, rule sequences) the first time a lookup's subtables are
//! inspected, memoized for the lifetime of that handle.

pub mod data;
pub mod error;
pub mod font;
pub mod nav;
pub mod read;
pub mod tables;

pub use data::{ScalarArray, Segment};
pub use error::{FontError, ReadError, Severity};
pub use font::Font;
pub use read::{TableRead, TableReadWithArgs};
