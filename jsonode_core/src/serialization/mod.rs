//! The serializer: converters, their read and write stacks, and the entry points.
//!
//! Every type is handled by a [`JsonConverter`] taken from its descriptor. Converters may
//! suspend when input runs out or output should be flushed, keeping their progress in the
//! current frame of the [`ReadStack`] or [`WriteStack`]; the same call resumes them later.

mod async_io;
mod converter;
pub mod converters;
mod operation;
mod read_stack;
mod serializer;
mod write_stack;

pub use async_io::{from_async_reader, to_async_writer};
pub use converter::{BoxedValue, ConverterClass, JsonConverter};
pub(crate) use converter::{advance_to_value, downcast_value, read_nested, unbox_value};
pub use converters::{CustomConverter, ValueConverter};
pub use operation::{ReadOperation, WriteOperation};
pub use read_stack::{ReadFrame, ReadStack};
pub use serializer::*;
pub use write_stack::{EnumeratorState, WriteFrame, WriteStack};
