use super::ValueKind;
use crate::{error::JsonError, json_bail, writer::JsonWriter};
use anyhow::Result;
use std::{fmt, str::FromStr, sync::Arc};

#[derive(Debug, PartialEq)]
pub(super) enum ElementData {
	Null,
	Bool(bool),
	/// Number text exactly as it appeared in the input.
	Number(String),
	String(String),
	Array(Vec<JsonElement>),
	Object(Vec<(String, JsonElement)>),
}

/// An immutable JSON value. Cloning shares the underlying data.
///
/// Object members keep their input order, including duplicate keys; deciding what to do with
/// duplicates is left to the consumer.
#[derive(Clone, PartialEq)]
pub struct JsonElement(Arc<ElementData>);

impl JsonElement {
	pub(super) fn from_data(data: ElementData) -> Self {
		Self(Arc::new(data))
	}

	pub(super) fn data(&self) -> &ElementData {
		&self.0
	}

	#[must_use]
	pub fn null() -> Self {
		Self::from_data(ElementData::Null)
	}

	#[must_use]
	pub fn from_bool(value: bool) -> Self {
		Self::from_data(ElementData::Bool(value))
	}

	#[must_use]
	pub fn from_string(value: impl Into<String>) -> Self {
		Self::from_data(ElementData::String(value.into()))
	}

	/// An element for a number given as text; the text must be a valid JSON number.
	pub fn from_number_text(text: impl Into<String>) -> Result<Self> {
		let text = text.into();
		if !crate::reader::scan::is_json_number(&text) {
			json_bail!(Argument, "'{text}' is not a valid JSON number");
		}
		Ok(Self::from_data(ElementData::Number(text)))
	}

	#[must_use]
	pub fn from_items(items: Vec<JsonElement>) -> Self {
		Self::from_data(ElementData::Array(items))
	}

	#[must_use]
	pub fn from_entries(entries: Vec<(String, JsonElement)>) -> Self {
		Self::from_data(ElementData::Object(entries))
	}

	/// True if both handles share the same data.
	#[must_use]
	pub fn ptr_eq(&self, other: &JsonElement) -> bool {
		Arc::ptr_eq(&self.0, &other.0)
	}

	#[must_use]
	pub fn value_kind(&self) -> ValueKind {
		match self.data() {
			ElementData::Null => ValueKind::Null,
			ElementData::Bool(true) => ValueKind::True,
			ElementData::Bool(false) => ValueKind::False,
			ElementData::Number(_) => ValueKind::Number,
			ElementData::String(_) => ValueKind::String,
			ElementData::Array(_) => ValueKind::Array,
			ElementData::Object(_) => ValueKind::Object,
		}
	}

	fn wrong_kind(&self, expected: &str) -> anyhow::Error {
		JsonError::invalid_operation(format!(
			"the element is of kind {}, expected {expected}",
			self.value_kind()
		))
		.into()
	}

	pub fn as_str(&self) -> Result<&str> {
		match self.data() {
			ElementData::String(text) => Ok(text),
			_ => Err(self.wrong_kind("string")),
		}
	}

	pub fn as_bool(&self) -> Result<bool> {
		match self.data() {
			ElementData::Bool(value) => Ok(*value),
			_ => Err(self.wrong_kind("true or false")),
		}
	}

	/// The original text of a number.
	pub fn number_text(&self) -> Result<&str> {
		match self.data() {
			ElementData::Number(text) => Ok(text),
			_ => Err(self.wrong_kind("number")),
		}
	}

	/// Parse a number with the target type's own parser; `None` if it does not fit.
	#[must_use]
	pub fn try_get_number<T: FromStr>(&self) -> Option<T> {
		self.number_text().ok()?.parse().ok()
	}

	pub fn array_items(&self) -> Result<&[JsonElement]> {
		match self.data() {
			ElementData::Array(items) => Ok(items),
			_ => Err(self.wrong_kind("array")),
		}
	}

	pub fn object_entries(&self) -> Result<&[(String, JsonElement)]> {
		match self.data() {
			ElementData::Object(entries) => Ok(entries),
			_ => Err(self.wrong_kind("object")),
		}
	}

	/// The last member named `name`, if this is an object containing it.
	#[must_use]
	pub fn get_property(&self, name: &str) -> Option<&JsonElement> {
		match self.data() {
			ElementData::Object(entries) => entries.iter().rev().find(|(key, _)| key == name).map(|(_, v)| v),
			_ => None,
		}
	}

	#[must_use]
	pub fn is_null(&self) -> bool {
		matches!(self.data(), ElementData::Null)
	}

	pub fn write_to(&self, writer: &mut JsonWriter) -> Result<()> {
		match self.data() {
			ElementData::Null => writer.write_null(),
			ElementData::Bool(value) => writer.write_bool(*value),
			ElementData::Number(text) => writer.write_number_text(text),
			ElementData::String(text) => writer.write_string(text),
			ElementData::Array(items) => {
				writer.write_start_array()?;
				for item in items {
					item.write_to(writer)?;
				}
				writer.write_end_array()
			}
			ElementData::Object(entries) => {
				writer.write_start_object()?;
				for (key, value) in entries {
					writer.write_property_name(key)?;
					value.write_to(writer)?;
				}
				writer.write_end_object()
			}
		}
	}

	/// Compact JSON text.
	#[must_use]
	pub fn to_json_string(&self) -> String {
		let mut writer = JsonWriter::default();
		match self.write_to(&mut writer) {
			Ok(()) => writer.into_string(),
			// only reachable when nesting exceeds the writer's depth limit
			Err(err) => format!("<{err}>"),
		}
	}
}

impl fmt::Display for JsonElement {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.to_json_string())
	}
}

impl fmt::Debug for JsonElement {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "JsonElement({})", self.to_json_string())
	}
}

impl From<bool> for JsonElement {
	fn from(value: bool) -> Self {
		Self::from_bool(value)
	}
}

impl From<&str> for JsonElement {
	fn from(value: &str) -> Self {
		Self::from_string(value)
	}
}

impl From<String> for JsonElement {
	fn from(value: String) -> Self {
		Self::from_string(value)
	}
}

macro_rules! impl_from_integer {
	($($t:ty),+) => {
		$(
			impl From<$t> for JsonElement {
				fn from(value: $t) -> Self {
					Self::from_data(ElementData::Number(value.to_string()))
				}
			}
		)+
	};
}

impl_from_integer!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::{ErrorKind, error_kind};

	#[test]
	fn test_accessors() -> Result<()> {
		let element = JsonElement::from_entries(vec![
			("a".into(), JsonElement::from(1)),
			("b".into(), JsonElement::from_items(vec![JsonElement::from(true), JsonElement::null()])),
			("a".into(), JsonElement::from("x")),
		]);
		assert_eq!(element.value_kind(), ValueKind::Object);
		assert_eq!(element.get_property("a").map(JsonElement::as_str).transpose()?, Some("x"));
		assert_eq!(element.object_entries()?.len(), 3);
		let items = element.get_property("b").unwrap().array_items()?;
		assert!(items[0].as_bool()?);
		assert!(items[1].is_null());
		assert_eq!(element.to_json_string(), r#"{"a":1,"b":[true,null],"a":"x"}"#);

		let err = element.as_str().unwrap_err();
		assert_eq!(error_kind(&err), Some(ErrorKind::InvalidOperation));
		Ok(())
	}

	#[test]
	fn test_numbers() -> Result<()> {
		let element = JsonElement::from_number_text("300")?;
		assert_eq!(element.try_get_number::<u16>(), Some(300));
		assert_eq!(element.try_get_number::<u8>(), None);
		assert_eq!(element.try_get_number::<f32>(), Some(300.0));
		assert!(JsonElement::from_number_text("01").is_err());
		assert!(JsonElement::from_number_text("NaN").is_err());
		Ok(())
	}

	#[test]
	fn test_clone_shares() {
		let a = JsonElement::from("text");
		let b = a.clone();
		assert!(a.ptr_eq(&b));
		assert!(!a.ptr_eq(&JsonElement::from("text")));
		assert_eq!(a, JsonElement::from("text"));
	}
}
