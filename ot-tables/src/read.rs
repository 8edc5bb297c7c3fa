//! The self-describing-table trait that every typed table view implements.

use crate::data::Segment;
use crate::error::ReadError;

/// A type that can be validated and constructed from a [`Segment`] alone.
pub trait TableRead<'a>: Sized {
    fn read(data: Segment<'a>) -> Result<Self, ReadError>;
}

/// A type that additionally needs external context (e.g. a glyph count) to
/// know how to interpret its bytes.
pub trait TableReadWithArgs<'a>: Sized {
    type Args;

    fn read_with_args(data: Segment<'a>, args: &Self::Args) -> Result<Self, ReadError>;
}

impl<'a, T: TableRead<'a>> TableReadWithArgs<'a> for T {
    type Args = ();

    fn read_with_args(data: Segment<'a>, _args: &()) -> Result<Self, ReadError> {
        T::read(data)
    }
}
