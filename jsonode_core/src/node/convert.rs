//! Conversions out of [`JsonValue`](super::JsonValue) payloads.
//!
//! Numbers convert to any numeric type whose own parser accepts the number text, so `300`
//! reads as `u16` but not as `u8`. Floating point payloads only convert to float types.
//! Strings convert to strings, and to dates, times and UUIDs when the text has the matching
//! form. Nothing else converts.

use super::ValuePayload;
use crate::{
	element::{JsonElement, ValueKind},
	text_formats::{format_date_time, format_offset_date_time, parse_date_time, parse_offset_date_time, parse_uuid},
};
use time::{OffsetDateTime, PrimitiveDateTime};
use uuid::Uuid;

/// Types a value payload can be converted to.
pub trait FromNodeValue: Sized {
	fn from_payload(payload: &ValuePayload) -> Option<Self>;
}

fn number_text(payload: &ValuePayload) -> Option<&str> {
	match payload {
		ValuePayload::Number(text) => Some(text),
		ValuePayload::Element(element) => element.number_text().ok(),
		_ => None,
	}
}

fn string_text(payload: &ValuePayload) -> Option<&str> {
	match payload {
		ValuePayload::String(text) => Some(text),
		ValuePayload::Element(element) => element.as_str().ok(),
		_ => None,
	}
}

impl FromNodeValue for bool {
	fn from_payload(payload: &ValuePayload) -> Option<Self> {
		match payload {
			ValuePayload::Bool(value) => Some(*value),
			ValuePayload::Element(element) => element.as_bool().ok(),
			_ => None,
		}
	}
}

macro_rules! impl_integer {
	($($t:ty),+) => {
		$(
			impl FromNodeValue for $t {
				fn from_payload(payload: &ValuePayload) -> Option<Self> {
					number_text(payload)?.parse().ok()
				}
			}
		)+
	};
}

impl_integer!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

macro_rules! impl_float {
	($($t:ty),+) => {
		$(
			impl FromNodeValue for $t {
				fn from_payload(payload: &ValuePayload) -> Option<Self> {
					if let ValuePayload::Float(value) = payload {
						let converted = *value as $t;
						return (converted.is_finite() || !value.is_finite()).then_some(converted);
					}
					number_text(payload)?.parse().ok().filter(|value: &$t| value.is_finite())
				}
			}
		)+
	};
}

impl_float!(f32, f64);

impl FromNodeValue for String {
	fn from_payload(payload: &ValuePayload) -> Option<Self> {
		string_text(payload).map(str::to_string)
	}
}

impl FromNodeValue for PrimitiveDateTime {
	fn from_payload(payload: &ValuePayload) -> Option<Self> {
		match payload {
			ValuePayload::DateTime(value) => Some(*value),
			_ => parse_date_time(string_text(payload)?).ok(),
		}
	}
}

impl FromNodeValue for OffsetDateTime {
	fn from_payload(payload: &ValuePayload) -> Option<Self> {
		match payload {
			ValuePayload::DateTimeOffset(value) => Some(*value),
			_ => parse_offset_date_time(string_text(payload)?).ok(),
		}
	}
}

impl FromNodeValue for Uuid {
	fn from_payload(payload: &ValuePayload) -> Option<Self> {
		match payload {
			ValuePayload::Guid(value) => Some(*value),
			_ => parse_uuid(string_text(payload)?).ok(),
		}
	}
}

/// Any payload except a non-finite number, as an immutable element.
impl FromNodeValue for JsonElement {
	fn from_payload(payload: &ValuePayload) -> Option<Self> {
		match payload {
			ValuePayload::Bool(value) => Some(JsonElement::from_bool(*value)),
			ValuePayload::Number(text) => JsonElement::from_number_text(text.clone()).ok(),
			ValuePayload::Float(value) if value.is_finite() => JsonElement::from_number_text(value.to_string()).ok(),
			ValuePayload::Float(_) => None,
			ValuePayload::String(text) => Some(JsonElement::from_string(text.clone())),
			ValuePayload::DateTime(value) => format_date_time(value).ok().map(JsonElement::from_string),
			ValuePayload::DateTimeOffset(value) => format_offset_date_time(value).ok().map(JsonElement::from_string),
			ValuePayload::Guid(value) => Some(JsonElement::from_string(value.to_string())),
			ValuePayload::Element(element) if element.value_kind() == ValueKind::Null => None,
			ValuePayload::Element(element) => Some(element.clone()),
		}
	}
}
