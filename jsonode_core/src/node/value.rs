use super::{FromNodeValue, JsonNode, json_node::NodeBody};
use crate::{
	element::{JsonElement, ValueKind},
	error::JsonError,
	options::{NodeOptions, NumberHandling, NumberHandlingSet, named_literal},
	text_formats::{format_date_time, format_offset_date_time},
	writer::JsonWriter,
};
use anyhow::Result;
use std::any::type_name;
use time::{OffsetDateTime, PrimitiveDateTime};
use uuid::Uuid;

/// What a [`JsonValue`] holds. Never another node.
#[derive(Clone, Debug, PartialEq)]
pub enum ValuePayload {
	Bool(bool),
	/// An integer as JSON number text.
	Number(String),
	/// A floating point number, possibly NaN or an infinity. Never converts to an integer.
	Float(f64),
	String(String),
	DateTime(PrimitiveDateTime),
	DateTimeOffset(OffsetDateTime),
	Guid(Uuid),
	/// A parsed scalar.
	Element(JsonElement),
}

impl ValuePayload {
	#[must_use]
	pub fn value_kind(&self) -> ValueKind {
		match self {
			ValuePayload::Bool(true) => ValueKind::True,
			ValuePayload::Bool(false) => ValueKind::False,
			ValuePayload::Number(_) | ValuePayload::Float(_) => ValueKind::Number,
			ValuePayload::String(_)
			| ValuePayload::DateTime(_)
			| ValuePayload::DateTimeOffset(_)
			| ValuePayload::Guid(_) => ValueKind::String,
			ValuePayload::Element(element) => element.value_kind(),
		}
	}

	/// The unquoted text of string-like payloads.
	pub(crate) fn display_text(&self) -> Option<String> {
		match self {
			ValuePayload::String(text) => Some(text.clone()),
			ValuePayload::DateTime(value) => format_date_time(value).ok(),
			ValuePayload::DateTimeOffset(value) => format_offset_date_time(value).ok(),
			ValuePayload::Guid(value) => Some(value.to_string()),
			ValuePayload::Element(element) => element.as_str().ok().map(str::to_string),
			_ => None,
		}
	}
}

impl From<bool> for ValuePayload {
	fn from(value: bool) -> Self {
		ValuePayload::Bool(value)
	}
}

macro_rules! impl_from_integer {
	($($t:ty),+) => {
		$(
			impl From<$t> for ValuePayload {
				fn from(value: $t) -> Self {
					ValuePayload::Number(value.to_string())
				}
			}
		)+
	};
}

impl_from_integer!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

macro_rules! impl_from_float {
	($($t:ty),+) => {
		$(
			impl From<$t> for ValuePayload {
				fn from(value: $t) -> Self {
					// widen through the shortest decimal form so 0.1f32 stays 0.1
					ValuePayload::Float(value.to_string().parse().unwrap_or(f64::from(value)))
				}
			}
		)+
	};
}

impl_from_float!(f32, f64);

impl From<String> for ValuePayload {
	fn from(value: String) -> Self {
		ValuePayload::String(value)
	}
}

impl From<&str> for ValuePayload {
	fn from(value: &str) -> Self {
		ValuePayload::String(value.to_string())
	}
}

impl From<PrimitiveDateTime> for ValuePayload {
	fn from(value: PrimitiveDateTime) -> Self {
		ValuePayload::DateTime(value)
	}
}

impl From<OffsetDateTime> for ValuePayload {
	fn from(value: OffsetDateTime) -> Self {
		ValuePayload::DateTimeOffset(value)
	}
}

impl From<Uuid> for ValuePayload {
	fn from(value: Uuid) -> Self {
		ValuePayload::Guid(value)
	}
}

pub(crate) fn write_payload(
	writer: &mut JsonWriter,
	payload: &ValuePayload,
	number_handling: NumberHandlingSet,
) -> Result<()> {
	match payload {
		ValuePayload::Bool(value) => writer.write_bool(*value),
		ValuePayload::Number(text) if number_handling.contains(NumberHandling::WriteAsString) => writer.write_string(text),
		ValuePayload::Number(text) => writer.write_number_text(text),
		ValuePayload::Float(value) if value.is_finite() => {
			let text = value.to_string();
			if number_handling.contains(NumberHandling::WriteAsString) {
				writer.write_string(&text)
			} else {
				writer.write_number_text(&text)
			}
		}
		ValuePayload::Float(value) => {
			if number_handling.contains(NumberHandling::AllowNamedFloatingPointLiterals)
				|| number_handling.contains(NumberHandling::WriteAsString)
			{
				writer.write_string(named_literal(*value))
			} else {
				Err(JsonError::argument(format!(
					"{value} is not a valid JSON number, enable named floating point literals to write it"
				))
				.into())
			}
		}
		ValuePayload::String(text) => writer.write_string(text),
		ValuePayload::DateTime(value) => writer.write_string(&format_date_time(value)?),
		ValuePayload::DateTimeOffset(value) => writer.write_string(&format_offset_date_time(value)?),
		ValuePayload::Guid(value) => writer.write_string(&value.to_string()),
		ValuePayload::Element(element) => match element.number_text() {
			Ok(text) if number_handling.contains(NumberHandling::WriteAsString) => writer.write_string(text),
			_ => element.write_to(writer),
		},
	}
}

/// A value node holding a single scalar.
#[derive(Clone, Debug)]
pub struct JsonValue(pub(crate) JsonNode);

impl JsonValue {
	/// A value from a primitive, e.g. `JsonValue::create(42)`.
	pub fn create(value: impl Into<ValuePayload>) -> JsonValue {
		Self::from_payload(value.into(), None)
	}

	pub fn create_with_options(value: impl Into<ValuePayload>, options: NodeOptions) -> JsonValue {
		Self::from_payload(value.into(), Some(options))
	}

	/// A value backed by a parsed scalar. `null` gives `None`; objects and arrays are rejected.
	pub fn from_element(element: JsonElement) -> Result<Option<JsonValue>> {
		match element.value_kind() {
			ValueKind::Null => Ok(None),
			ValueKind::Object | ValueKind::Array | ValueKind::Undefined => Err(JsonError::invalid_operation(
				format!("a JsonValue cannot hold an element of kind {}", element.value_kind()),
			)
			.into()),
			_ => Ok(Some(Self::from_payload(ValuePayload::Element(element), None))),
		}
	}

	pub(crate) fn from_payload(payload: ValuePayload, options: Option<NodeOptions>) -> JsonValue {
		JsonValue(JsonNode::from_body(NodeBody::Value(payload), options))
	}

	#[must_use]
	pub fn payload(&self) -> &ValuePayload {
		match &self.0.0.body {
			NodeBody::Value(payload) => payload,
			_ => unreachable!("a JsonValue always wraps a value node"),
		}
	}

	#[must_use]
	pub fn as_node(&self) -> &JsonNode {
		&self.0
	}

	#[must_use]
	pub fn into_node(self) -> JsonNode {
		self.0
	}

	/// Convert the payload to `T`. Fails with `InvalidOperation` if there is no mapping.
	pub fn get_value<T: FromNodeValue>(&self) -> Result<T> {
		T::from_payload(self.payload()).ok_or_else(|| {
			JsonError::invalid_operation(format!(
				"a value of kind {} cannot be converted to {}",
				self.payload().value_kind(),
				type_name::<T>()
			))
			.into()
		})
	}

	#[must_use]
	pub fn try_get_value<T: FromNodeValue>(&self) -> Option<T> {
		T::from_payload(self.payload())
	}
}

impl From<JsonValue> for JsonNode {
	fn from(value: JsonValue) -> Self {
		value.0
	}
}

impl TryFrom<JsonNode> for JsonValue {
	type Error = anyhow::Error;

	fn try_from(node: JsonNode) -> Result<Self> {
		node.as_value()
	}
}
