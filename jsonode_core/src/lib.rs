//! A mutable JSON document model and a resumable, descriptor-driven serializer.
//!
//! - [`JsonNode`] and its variants [`JsonObject`], [`JsonArray`] and [`JsonValue`] form an
//!   editable tree with parent links and JSON paths.
//! - [`JsonElement`] is the immutable parse result nodes are materialized from.
//! - [`to_string`], [`from_str`] and friends convert Rust values through [`JsonConverter`]s
//!   chosen by the type's [`JsonType`] implementation and the [`SerializerOptions`].
//!
//! ```
//! use jsonode_core::{JsonType, SerializerOptions, from_str, to_string};
//!
//! #[derive(Debug, Default, PartialEq, JsonType)]
//! struct Point {
//! 	x: i32,
//! 	y: i32,
//! }
//!
//! # fn main() -> anyhow::Result<()> {
//! let options = SerializerOptions::default();
//! let point: Point = from_str(r#"{"x":1,"y":2}"#, &options)?;
//! assert_eq!(point, Point { x: 1, y: 2 });
//! assert_eq!(to_string(&point, &options)?, r#"{"x":1,"y":2}"#);
//! # Ok(())
//! # }
//! ```

extern crate self as jsonode_core;

mod error;
pub use error::{ErrorKind, JsonError, error_kind};

pub mod element;
pub use element::{JsonElement, ValueKind};

pub mod metadata;
pub use metadata::{JsonType, ObjectShapeBuilder, ParameterShape, PropertyShape, TypeKey, TypeShape};

pub mod node;
pub use node::{FromNodeValue, IntoNode, JsonArray, JsonNode, JsonObject, JsonValue, ValuePayload};

pub mod options;
pub use options::{
	CamelCase, CommentHandling, DocumentOptions, NamingPolicy, NodeOptions, NumberHandling, NumberHandlingSet,
	SerializerOptions, SnakeCaseLower,
};

pub mod reader;
pub use reader::{JsonReader, ReaderState, TokenType};

pub mod serialization;
pub use serialization::{
	CustomConverter, JsonConverter, ValueConverter, from_async_reader, from_node, from_reader, from_slice, from_str,
	to_async_writer, to_node, to_string, to_vec, to_writer,
};

mod text_formats;

pub mod writer;
pub use writer::{JsonWriter, WriterOptions};

pub use jsonode_derive::JsonType;
