use crate::{
	error::JsonError,
	metadata::TypeKey,
	options::SerializerOptions,
	reader::JsonReader,
	serialization::{BoxedValue, JsonConverter, ReadStack, WriteStack, downcast_value},
	writer::JsonWriter,
};
use anyhow::Result;
use std::{any::Any, marker::PhantomData};

/// A converter for whole values of `T`, registered with
/// [`SerializerOptions::add_converter`] through [`CustomConverter`].
///
/// `read` is called with the reader on the first token of a completely buffered value and must
/// leave it on the last token of that value.
pub trait ValueConverter<T>: Send + Sync + 'static {
	fn read(&self, reader: &mut JsonReader, options: &SerializerOptions) -> Result<T>;
	fn write(&self, writer: &mut JsonWriter, value: &T, options: &SerializerOptions) -> Result<()>;

	/// Whether `read` is called for `null`.
	fn handle_null(&self) -> bool {
		false
	}
}

/// Adapts a [`ValueConverter`] to the resumable converter interface.
///
/// ```
/// use anyhow::Result;
/// use jsonode_core::{CustomConverter, JsonReader, JsonWriter, SerializerOptions, ValueConverter, from_str};
///
/// struct Celsius;
///
/// impl ValueConverter<f64> for Celsius {
/// 	fn read(&self, reader: &mut JsonReader, _: &SerializerOptions) -> Result<f64> {
/// 		let text = reader.get_string()?;
/// 		Ok(text.trim_end_matches("°C").parse()?)
/// 	}
///
/// 	fn write(&self, writer: &mut JsonWriter, value: &f64, _: &SerializerOptions) -> Result<()> {
/// 		writer.write_string(&format!("{value}°C"))
/// 	}
/// }
///
/// let mut options = SerializerOptions::default();
/// options.add_converter(CustomConverter::new(Celsius)).unwrap();
/// assert_eq!(from_str::<Vec<f64>>(r#"["21.5°C"]"#, &options).unwrap(), vec![21.5]);
/// ```
pub struct CustomConverter<T, C> {
	converter: C,
	marker: PhantomData<fn() -> T>,
}

impl<T, C> CustomConverter<T, C> {
	pub fn new(converter: C) -> Self {
		Self {
			converter,
			marker: PhantomData,
		}
	}
}

impl<T: Any + Send, C: ValueConverter<T>> JsonConverter for CustomConverter<T, C> {
	fn type_key(&self) -> TypeKey {
		TypeKey::of::<T>()
	}

	fn handle_null(&self) -> bool {
		self.converter.handle_null()
	}

	fn requires_read_ahead(&self) -> bool {
		true
	}

	fn try_read(&self, reader: &mut JsonReader, options: &SerializerOptions, _: &mut ReadStack) -> Result<Option<BoxedValue>> {
		let depth = reader.current_depth();
		let value = self.converter.read(reader, options)?;
		if reader.current_depth() != depth || !reader.token_type().ends_value() {
			return Err(JsonError::invalid_operation(format!(
				"the converter for {} did not read exactly one value",
				self.type_key().name()
			))
			.into());
		}
		Ok(Some(Box::new(value)))
	}

	fn try_write(&self, writer: &mut JsonWriter, value: &dyn Any, options: &SerializerOptions, _: &mut WriteStack) -> Result<bool> {
		self.converter.write(writer, downcast_value::<T>(value, &self.type_key())?, options)?;
		Ok(true)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{
		error::{ErrorKind, error_kind},
		reader::TokenType,
		serialization::{from_str, to_string},
	};
	use pretty_assertions::assert_eq;

	/// Reads `[x, y]` arrays into strings like "x:y".
	struct PairConverter;

	impl ValueConverter<String> for PairConverter {
		fn read(&self, reader: &mut JsonReader, _: &SerializerOptions) -> Result<String> {
			let mut parts = Vec::new();
			while reader.read()? && reader.token_type() != TokenType::EndArray {
				parts.push(reader.number_text()?.to_string());
			}
			Ok(parts.join(":"))
		}

		fn write(&self, writer: &mut JsonWriter, value: &String, _: &SerializerOptions) -> Result<()> {
			writer.write_start_array()?;
			for part in value.split(':') {
				writer.write_number_text(part)?;
			}
			writer.write_end_array()
		}
	}

	struct Lazy;

	impl ValueConverter<u8> for Lazy {
		fn read(&self, _: &mut JsonReader, _: &SerializerOptions) -> Result<u8> {
			Ok(0)
		}

		fn write(&self, _: &mut JsonWriter, _: &u8, _: &SerializerOptions) -> Result<()> {
			Ok(())
		}
	}

	#[test]
	fn test_overrides_built_in_conversion() -> Result<()> {
		let mut options = SerializerOptions::default();
		options.add_converter(CustomConverter::new(PairConverter))?;
		let value = from_str::<Vec<String>>("[[1,2],[3,4]]", &options)?;
		assert_eq!(value, vec!["1:2", "3:4"]);
		assert_eq!(to_string(&value, &options)?, "[[1,2],[3,4]]");
		Ok(())
	}

	#[test]
	fn test_converter_must_consume_the_value() -> Result<()> {
		let mut options = SerializerOptions::default();
		options.add_converter(CustomConverter::new(Lazy))?;
		assert_eq!(from_str::<u8>("7", &options)?, 0);
		let err = from_str::<Vec<u8>>("[[7]]", &options).unwrap_err();
		assert_eq!(error_kind(&err), Some(ErrorKind::InvalidOperation));
		Ok(())
	}
}
