//! Built-in converters. Each module also implements [`JsonType`](crate::JsonType) for the
//! types its converters handle.

mod custom;
mod datetime;
mod dictionary;
mod list;
mod node;
mod nullable;
mod number;
mod object;
mod primitives;

pub use custom::{CustomConverter, ValueConverter};
pub(crate) use object::ObjectConverter;
