use crate::{
	metadata::{JsonType, TypeKey, TypeShape},
	options::SerializerOptions,
	reader::JsonReader,
	serialization::{BoxedValue, JsonConverter, ReadStack, WriteStack, downcast_value},
	writer::JsonWriter,
};
use anyhow::Result;
use std::{any::Any, sync::Arc};

pub(crate) struct BoolConverter;

impl JsonConverter for BoolConverter {
	fn type_key(&self) -> TypeKey {
		TypeKey::of::<bool>()
	}

	fn requires_read_ahead(&self) -> bool {
		true
	}

	fn try_read(&self, reader: &mut JsonReader, _: &SerializerOptions, _: &mut ReadStack) -> Result<Option<BoxedValue>> {
		Ok(Some(Box::new(reader.get_bool()?)))
	}

	fn try_write(&self, writer: &mut JsonWriter, value: &dyn Any, _: &SerializerOptions, _: &mut WriteStack) -> Result<bool> {
		writer.write_bool(*downcast_value::<bool>(value, &self.type_key())?)?;
		Ok(true)
	}
}

impl JsonType for bool {
	fn type_shape() -> TypeShape {
		TypeShape::Converter(Arc::new(BoolConverter))
	}
}

pub(crate) struct StringConverter;

impl JsonConverter for StringConverter {
	fn type_key(&self) -> TypeKey {
		TypeKey::of::<String>()
	}

	fn requires_read_ahead(&self) -> bool {
		true
	}

	fn try_read(&self, reader: &mut JsonReader, _: &SerializerOptions, _: &mut ReadStack) -> Result<Option<BoxedValue>> {
		Ok(Some(Box::new(reader.get_string()?)))
	}

	fn try_write(&self, writer: &mut JsonWriter, value: &dyn Any, _: &SerializerOptions, _: &mut WriteStack) -> Result<bool> {
		writer.write_string(downcast_value::<String>(value, &self.type_key())?)?;
		Ok(true)
	}
}

impl JsonType for String {
	fn type_shape() -> TypeShape {
		TypeShape::Converter(Arc::new(StringConverter))
	}
}

/// A single character, as a one-character string.
pub(crate) struct CharConverter;

impl JsonConverter for CharConverter {
	fn type_key(&self) -> TypeKey {
		TypeKey::of::<char>()
	}

	fn requires_read_ahead(&self) -> bool {
		true
	}

	fn try_read(&self, reader: &mut JsonReader, _: &SerializerOptions, _: &mut ReadStack) -> Result<Option<BoxedValue>> {
		let text = reader.get_string()?;
		let mut chars = text.chars();
		match (chars.next(), chars.next()) {
			(Some(c), None) => Ok(Some(Box::new(c))),
			_ => Err(reader.format_error("expected a string of exactly one character")),
		}
	}

	fn try_write(&self, writer: &mut JsonWriter, value: &dyn Any, _: &SerializerOptions, _: &mut WriteStack) -> Result<bool> {
		let c = downcast_value::<char>(value, &self.type_key())?;
		writer.write_string(c.encode_utf8(&mut [0; 4]))?;
		Ok(true)
	}
}

impl JsonType for char {
	fn type_shape() -> TypeShape {
		TypeShape::Converter(Arc::new(CharConverter))
	}
}

#[cfg(test)]
mod tests {
	use crate::{
		error::{ErrorKind, error_kind},
		options::SerializerOptions,
		serialization::{from_str, to_string},
	};
	use anyhow::Result;

	#[test]
	fn test_bool_and_string() -> Result<()> {
		let options = SerializerOptions::default();
		assert!(from_str::<bool>("true", &options)?);
		assert_eq!(to_string(&false, &options)?, "false");
		assert_eq!(from_str::<String>(r#""ab\n""#, &options)?, "ab\n");
		assert_eq!(to_string(&"tab\t".to_string(), &options)?, r#""tab\t""#);
		Ok(())
	}

	#[test]
	fn test_mismatched_tokens() {
		let options = SerializerOptions::default();
		for err in [
			from_str::<bool>("1", &options).unwrap_err(),
			from_str::<String>("[]", &options).unwrap_err(),
			from_str::<char>(r#""ab""#, &options).unwrap_err(),
		] {
			assert_eq!(error_kind(&err), Some(ErrorKind::Format));
		}
	}

	#[test]
	fn test_char() -> Result<()> {
		let options = SerializerOptions::default();
		assert_eq!(from_str::<char>(r#""é""#, &options)?, 'é');
		assert_eq!(to_string(&'"', &options)?, r#""\"""#);
		Ok(())
	}
}
