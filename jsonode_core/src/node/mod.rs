//! The mutable JSON document model.
//!
//! A tree of [`JsonNode`]s: [`JsonObject`], [`JsonArray`] and [`JsonValue`]. Parsed documents
//! are wrapped lazily; a container turns its parsed element into child nodes the first time it
//! is accessed. Parent links are weak, children are owned by their container.
//!
//! ```
//! use jsonode_core::JsonNode;
//! # fn main() -> anyhow::Result<()> {
//! let root = JsonNode::parse_str(r#"{"Child":[1,2,3]}"#)?.unwrap();
//! let item = root.get("Child")?.unwrap().at(2)?.unwrap();
//! assert_eq!(item.get_value::<i32>()?, 3);
//! assert_eq!(item.path(), "$.Child[2]");
//! # Ok(())
//! # }
//! ```

mod array;
mod convert;
mod json_node;
mod object;
pub(crate) mod path;
mod property_map;
mod value;

pub use array::JsonArray;
pub use convert::FromNodeValue;
pub use json_node::{IntoNode, JsonNode};
pub use object::JsonObject;
pub use value::{JsonValue, ValuePayload};
