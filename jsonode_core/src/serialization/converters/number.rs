//! Integer and floating point converters.

use crate::{
	metadata::{JsonType, TypeKey, TypeShape},
	options::{NumberHandling, SerializerOptions, named_literal, parse_named_literal},
	reader::{JsonReader, TokenType, scan::is_json_number},
	serialization::{BoxedValue, JsonConverter, ReadStack, WriteStack, downcast_value},
	writer::JsonWriter,
};
use anyhow::Result;
use std::{any::Any, fmt::Display, marker::PhantomData, str::FromStr, sync::Arc};

pub(crate) trait Number: FromStr + Display + Copy + Send + Sync + 'static {
	const FLOAT: bool;

	fn is_finite(self) -> bool {
		true
	}

	fn to_f64(self) -> f64;

	fn from_f64(_value: f64) -> Option<Self> {
		None
	}
}

macro_rules! impl_integer {
	($($t:ty),+) => {
		$(
			impl Number for $t {
				const FLOAT: bool = false;

				fn to_f64(self) -> f64 {
					self as f64
				}
			}

			impl JsonType for $t {
				fn type_shape() -> TypeShape {
					TypeShape::Converter(Arc::new(NumberConverter::<$t>::new()))
				}
			}
		)+
	};
}

impl_integer!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

macro_rules! impl_float {
	($($t:ty),+) => {
		$(
			impl Number for $t {
				const FLOAT: bool = true;

				fn is_finite(self) -> bool {
					<$t>::is_finite(self)
				}

				fn to_f64(self) -> f64 {
					self as f64
				}

				fn from_f64(value: f64) -> Option<Self> {
					Some(value as $t)
				}
			}

			impl JsonType for $t {
				fn type_shape() -> TypeShape {
					TypeShape::Converter(Arc::new(NumberConverter::<$t>::new()))
				}
			}
		)+
	};
}

impl_float!(f32, f64);

pub(crate) struct NumberConverter<T>(PhantomData<fn() -> T>);

impl<T: Number> NumberConverter<T> {
	pub(crate) fn new() -> Self {
		Self(PhantomData)
	}

	fn parse(&self, reader: &JsonReader, text: &str) -> Result<T> {
		text
			.parse::<T>()
			.ok()
			.filter(|value| value.is_finite())
			.ok_or_else(|| reader.format_error(&format!("the JSON value '{text}' cannot be converted to {}", self.type_key().name())))
	}
}

impl<T: Number> JsonConverter for NumberConverter<T> {
	fn type_key(&self) -> TypeKey {
		TypeKey::of::<T>()
	}

	fn requires_read_ahead(&self) -> bool {
		true
	}

	fn try_read(&self, reader: &mut JsonReader, _: &SerializerOptions, state: &mut ReadStack) -> Result<Option<BoxedValue>> {
		let handling = state.number_handling();
		let value = match reader.token_type() {
			TokenType::Number => self.parse(reader, reader.number_text()?)?,
			TokenType::String => {
				let text = reader.get_string()?;
				if handling.contains(NumberHandling::AllowReadingFromString) && is_json_number(&text) {
					self.parse(reader, &text)?
				} else if let Some(value) = parse_named_literal(&text)
					.filter(|_| T::FLOAT && handling.contains(NumberHandling::AllowNamedFloatingPointLiterals))
					.and_then(T::from_f64)
				{
					value
				} else {
					return Err(reader.format_error(&format!(
						"the JSON string '{text}' cannot be read as {}",
						self.type_key().name()
					)));
				}
			}
			other => {
				return Err(reader.format_error(&format!(
					"a token of type {} cannot be converted to {}",
					other.as_str(),
					self.type_key().name()
				)));
			}
		};
		Ok(Some(Box::new(value)))
	}

	fn try_write(&self, writer: &mut JsonWriter, value: &dyn Any, _: &SerializerOptions, state: &mut WriteStack) -> Result<bool> {
		let value = *downcast_value::<T>(value, &self.type_key())?;
		let handling = state.number_handling();
		if !value.is_finite() {
			if handling.contains(NumberHandling::AllowNamedFloatingPointLiterals)
				|| handling.contains(NumberHandling::WriteAsString)
			{
				writer.write_string(named_literal(value.to_f64()))?;
			} else {
				return Err(crate::error::JsonError::argument(format!(
					"{value} is not a valid JSON number, enable named floating point literals to write it"
				))
				.into());
			}
		} else if handling.contains(NumberHandling::WriteAsString) {
			writer.write_number_as_string(value)?;
		} else {
			writer.write_number(value)?;
		}
		Ok(true)
	}
}
