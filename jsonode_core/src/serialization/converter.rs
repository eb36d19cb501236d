use super::{ReadStack, WriteStack};
use crate::{
	error::JsonError,
	metadata::{TypeDescriptor, TypeKey},
	options::SerializerOptions,
	reader::{JsonReader, TokenType},
	writer::JsonWriter,
};
use anyhow::Result;
use std::any::Any;

/// A value of any convertible type, as it travels between converters.
pub type BoxedValue = Box<dyn Any + Send>;

/// Broad strategy of a converter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConverterClass {
	/// A single JSON value, read and written in one go.
	Value,
	/// A JSON array built from or written as a sequence of elements.
	Enumerable,
	/// A JSON object with arbitrary string keys.
	Dictionary,
	/// A JSON object with declared properties.
	Object,
}

/// Reads and writes values of one type.
///
/// Both directions may suspend. `try_read` returns `Ok(None)` when the reader ran out of input
/// before the value was complete, and `try_write` returns `Ok(false)` when the writer has
/// more output pending than the flush threshold allows. The caller then supplies more input or
/// flushes the output, and calls again with the same stack. Everything a converter needs to
/// continue is kept in its stack frame.
///
/// Converters of class [`ConverterClass::Value`] usually never suspend and report
/// `requires_read_ahead`, so that they only see complete values.
pub trait JsonConverter: Send + Sync {
	/// The type this converter produces and consumes.
	fn type_key(&self) -> TypeKey;

	fn can_convert(&self, type_key: &TypeKey) -> bool {
		*type_key == self.type_key()
	}

	fn class(&self) -> ConverterClass {
		ConverterClass::Value
	}

	/// Whether `null` is passed to the converter. Otherwise reading `null` is a format error.
	fn handle_null(&self) -> bool {
		false
	}

	/// True if `value` is written as `null`.
	fn is_null_value(&self, _value: &dyn Any) -> bool {
		false
	}

	/// True if the whole value must be buffered before `try_read` is called.
	fn requires_read_ahead(&self) -> bool {
		false
	}

	/// Element type of collections, value type of dictionaries.
	fn element_type(&self) -> Option<TypeKey> {
		None
	}

	/// Read a value. On the first call the reader is positioned on the first token of the value.
	fn try_read(&self, reader: &mut JsonReader, options: &SerializerOptions, state: &mut ReadStack)
	-> Result<Option<BoxedValue>>;

	/// Write `value`. Returns `false` to suspend.
	fn try_write(
		&self,
		writer: &mut JsonWriter,
		value: &dyn Any,
		options: &SerializerOptions,
		state: &mut WriteStack,
	) -> Result<bool>;
}

/// Borrow `value` as `T`.
pub(crate) fn downcast_value<'a, T: Any>(value: &'a dyn Any, type_key: &TypeKey) -> Result<&'a T> {
	value.downcast_ref::<T>().ok_or_else(|| {
		JsonError::invalid_operation(format!("the converter for {} received a value of another type", type_key.name()))
			.into()
	})
}

/// Unbox a converter result as `T`.
pub(crate) fn unbox_value<T: Any>(value: BoxedValue, type_key: &TypeKey) -> Result<T> {
	value.downcast::<T>().map(|value| *value).map_err(|_| {
		JsonError::invalid_operation(format!("the converter for {} produced a value of another type", type_key.name()))
			.into()
	})
}

/// Read a nested value with the converter of `descriptor`, rejecting `null` unless the
/// converter handles it. The caller has pushed the frame of the value.
pub(crate) fn read_nested(
	descriptor: &TypeDescriptor,
	reader: &mut JsonReader,
	options: &SerializerOptions,
	state: &mut ReadStack,
) -> Result<Option<BoxedValue>> {
	let converter = descriptor.converter();
	if !state.current().has_state() && reader.token_type() == TokenType::Null && !converter.handle_null() {
		return Err(JsonError::format(format!(
			"the JSON value null cannot be converted to {}",
			descriptor.type_key().name()
		))
		.into());
	}
	converter.try_read(reader, options, state)
}

/// Advance to the first token of the next value, buffering the whole value if `converter`
/// cannot suspend. Returns `false` if more input is needed.
pub(crate) fn advance_to_value(reader: &mut JsonReader, converter: &dyn JsonConverter) -> Result<bool> {
	reader.read_with_read_ahead(converter.requires_read_ahead())
}
