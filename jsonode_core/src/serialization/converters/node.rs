//! The document model as a serialization target.
//!
//! Nodes are read from fully buffered values, so these converters never suspend.

use crate::{
	element::JsonElement,
	metadata::{JsonType, TypeKey, TypeShape},
	node::{JsonArray, JsonNode, JsonObject, JsonValue},
	options::SerializerOptions,
	reader::JsonReader,
	serialization::{BoxedValue, ConverterClass, JsonConverter, ReadStack, WriteStack, downcast_value},
	writer::JsonWriter,
};
use anyhow::Result;
use std::{any::Any, marker::PhantomData, sync::Arc};

/// DOM types and how they are built from a parsed node.
pub(crate) trait NodeLike: Sized + Send + Sync + 'static {
	const EXPECTED: &'static str;

	fn from_node(node: JsonNode) -> Option<Self>;
	fn node(&self) -> &JsonNode;
}

impl NodeLike for JsonNode {
	const EXPECTED: &'static str = "a JSON value";

	fn from_node(node: JsonNode) -> Option<Self> {
		Some(node)
	}

	fn node(&self) -> &JsonNode {
		self
	}
}

impl NodeLike for JsonObject {
	const EXPECTED: &'static str = "a JSON object";

	fn from_node(node: JsonNode) -> Option<Self> {
		node.as_object().ok()
	}

	fn node(&self) -> &JsonNode {
		self.as_node()
	}
}

impl NodeLike for JsonArray {
	const EXPECTED: &'static str = "a JSON array";

	fn from_node(node: JsonNode) -> Option<Self> {
		node.as_array().ok()
	}

	fn node(&self) -> &JsonNode {
		self.as_node()
	}
}

impl NodeLike for JsonValue {
	const EXPECTED: &'static str = "a JSON string, number or boolean";

	fn from_node(node: JsonNode) -> Option<Self> {
		node.as_value().ok()
	}

	fn node(&self) -> &JsonNode {
		self.as_node()
	}
}

pub(crate) struct NodeConverter<N>(PhantomData<fn() -> N>);

impl<N: NodeLike> JsonConverter for NodeConverter<N> {
	fn type_key(&self) -> TypeKey {
		TypeKey::of::<N>()
	}

	fn class(&self) -> ConverterClass {
		ConverterClass::Value
	}

	fn requires_read_ahead(&self) -> bool {
		true
	}

	fn try_read(&self, reader: &mut JsonReader, options: &SerializerOptions, _: &mut ReadStack) -> Result<Option<BoxedValue>> {
		let position = reader.token_position();
		let element = JsonElement::read_from(reader)?;
		// null never gets here, the caller rejects it
		let node = JsonNode::from_element(element, options.node_options())
			.and_then(N::from_node)
			.ok_or_else(|| -> anyhow::Error {
				crate::error::JsonError::format(format!("expected {}", N::EXPECTED))
					.at_position(position)
					.into()
			})?;
		Ok(Some(Box::new(node)))
	}

	fn try_write(&self, writer: &mut JsonWriter, value: &dyn Any, _: &SerializerOptions, state: &mut WriteStack) -> Result<bool> {
		downcast_value::<N>(value, &self.type_key())?
			.node()
			.write_with(writer, state.number_handling())?;
		Ok(true)
	}
}

macro_rules! impl_json_type {
	($($t:ty),+) => {
		$(
			impl JsonType for $t {
				fn type_shape() -> TypeShape {
					TypeShape::Converter(Arc::new(NodeConverter::<$t>(PhantomData)))
				}
			}
		)+
	};
}

impl_json_type!(JsonNode, JsonObject, JsonArray, JsonValue);

/// Immutable elements, including `null`.
pub(crate) struct ElementConverter;

impl JsonConverter for ElementConverter {
	fn type_key(&self) -> TypeKey {
		TypeKey::of::<JsonElement>()
	}

	fn handle_null(&self) -> bool {
		true
	}

	fn is_null_value(&self, value: &dyn Any) -> bool {
		value.downcast_ref::<JsonElement>().is_some_and(JsonElement::is_null)
	}

	fn requires_read_ahead(&self) -> bool {
		true
	}

	fn try_read(&self, reader: &mut JsonReader, _: &SerializerOptions, _: &mut ReadStack) -> Result<Option<BoxedValue>> {
		Ok(Some(Box::new(JsonElement::read_from(reader)?)))
	}

	fn try_write(&self, writer: &mut JsonWriter, value: &dyn Any, _: &SerializerOptions, _: &mut WriteStack) -> Result<bool> {
		downcast_value::<JsonElement>(value, &self.type_key())?.write_to(writer)?;
		Ok(true)
	}
}

impl JsonType for JsonElement {
	fn type_shape() -> TypeShape {
		TypeShape::Converter(Arc::new(ElementConverter))
	}

	fn missing_value() -> Option<Self> {
		Some(JsonElement::null())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{
		error::{ErrorKind, error_kind},
		options::{NumberHandling, SerializerOptions},
		serialization::{from_str, to_string},
	};
	use pretty_assertions::assert_eq;
	use std::collections::BTreeMap;

	#[test]
	fn test_nodes_inside_typed_values() -> Result<()> {
		let options = SerializerOptions::default();
		let map = from_str::<BTreeMap<String, JsonNode>>(r#"{"a":{"b":[1,true]},"c":"d"}"#, &options)?;
		assert!(map["a"].get("b")?.unwrap().at(1)?.unwrap().get_value::<bool>()?);
		assert_eq!(to_string(&map, &options)?, r#"{"a":{"b":[1,true]},"c":"d"}"#);
		Ok(())
	}

	#[test]
	fn test_kind_mismatch() {
		let options = SerializerOptions::default();
		let err = from_str::<Vec<JsonArray>>("[[],{}]", &options).unwrap_err();
		assert_eq!(error_kind(&err), Some(ErrorKind::Format));
		assert!(err.to_string().ends_with("path: $[1]"), "{err}");
		assert!(from_str::<JsonObject>("null", &options).is_err());
		assert!(from_str::<Option<JsonObject>>("null", &options).unwrap().is_none());
	}

	#[test]
	fn test_case_insensitive_nodes() -> Result<()> {
		let mut options = SerializerOptions::default();
		options.set_property_name_case_insensitive(true)?;
		let object = from_str::<JsonObject>(r#"{"Name":1}"#, &options)?;
		assert!(object.contains_key("NAME")?);
		Ok(())
	}

	#[test]
	fn test_number_handling_applies_to_created_values() -> Result<()> {
		let mut options = SerializerOptions::default();
		options.set_number_handling(NumberHandling::WriteAsString.into())?;
		let array = JsonArray::from_items([1, 2])?;
		assert_eq!(to_string(&array, &options)?, r#"["1","2"]"#);
		Ok(())
	}

	#[test]
	fn test_elements() -> Result<()> {
		let options = SerializerOptions::default();
		let items = from_str::<Vec<JsonElement>>(r#"[null,{"a":1}]"#, &options)?;
		assert!(items[0].is_null());
		assert_eq!(items[1].to_json_string(), r#"{"a":1}"#);
		assert_eq!(to_string(&items, &options)?, r#"[null,{"a":1}]"#);
		Ok(())
	}
}
