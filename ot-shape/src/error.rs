//! Errors the shaping driver itself can raise. Font-level decode problems
//! stay in [`ot_tables::FontError`] and are inspected via `Font::errors()`;
//! these variants are for failures that only make sense at the shaping
//! layer.

use std::fmt;

/// An error surfaced by an output sink, propagated unwrapped to the caller.
#[derive(Debug)]
pub struct SinkError(pub Box<dyn std::error::Error + Send + Sync>);

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "output sink error: {}", self.0)
    }
}

impl std::error::Error for SinkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.0.as_ref())
    }
}

#[derive(Debug)]
pub enum ShapeError {
    /// No GSUB/GPOS table at all and no shaper could run even the Core
    /// fallback path — only possible if the font lacks `cmap` too.
    NoUsableFont,
    Sink(SinkError),
}

impl fmt::Display for ShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeError::NoUsableFont => write!(f, "font has no usable cmap or layout tables"),
            ShapeError::Sink(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ShapeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ShapeError::Sink(e) => Some(e),
            ShapeError::NoUsableFont => None,
        }
    }
}
