//! Immutable, shared parse results.
//!
//! A [`JsonElement`] is what [`JsonNode::parse`](crate::JsonNode::parse) keeps until a node is
//! first touched, and what extension data and raw values are stored as.

mod json_element;
mod parse;
mod value_kind;

pub use json_element::JsonElement;
pub use value_kind::ValueKind;
