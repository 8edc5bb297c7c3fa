//! The shaping pipeline: turns a codepoint run plus a font into positioned
//! glyphs. Builds on `ot-tables` for the binary layer and adds feature
//! planning, mask assignment, normalization, and the complex-script
//! plug-ins (`shapers::core`, `shapers::hebrew`, `shapers::arabic`).

pub mod buffer;
pub mod driver;
pub mod error;
pub mod normalize;
pub mod plan;
pub mod shapers;

#[cfg(feature = "fixtures")]
pub mod fixture;

pub use buffer::{Buffer, Direction, GlyphInfo, GlyphPosition};
pub use driver::{shape, OutputSink, ShapeRequest, VecSink};
pub use error::ShapeError;
pub use normalize::NormalizationMode;
