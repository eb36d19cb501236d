use crate::{
	metadata::{JsonType, TypeDescriptor, TypeKey, TypeShape},
	options::SerializerOptions,
	reader::{JsonReader, TokenType},
	serialization::{
		BoxedValue, ConverterClass, JsonConverter, ReadStack, WriteStack, downcast_value, read_nested, unbox_value,
	},
	writer::JsonWriter,
};
use anyhow::Result;
use std::{any::Any, marker::PhantomData, sync::Arc};

/// Marks a frame whose inner value has been started.
struct InnerStarted;

/// `Option<T>`: `null` is `None`, anything else is read with the converter of `T`.
pub(crate) struct OptionConverter<T> {
	inner: Arc<TypeDescriptor>,
	marker: PhantomData<fn() -> T>,
}

impl<T: JsonType> OptionConverter<T> {
	fn create(options: &SerializerOptions) -> Result<Arc<dyn JsonConverter>> {
		Ok(Arc::new(Self {
			inner: options.descriptor::<T>()?,
			marker: PhantomData,
		}))
	}
}

impl<T: JsonType> JsonConverter for OptionConverter<T> {
	fn type_key(&self) -> TypeKey {
		TypeKey::of::<Option<T>>()
	}

	fn class(&self) -> ConverterClass {
		self.inner.class()
	}

	fn handle_null(&self) -> bool {
		true
	}

	fn is_null_value(&self, value: &dyn Any) -> bool {
		value.downcast_ref::<Option<T>>().is_some_and(Option::is_none)
	}

	fn requires_read_ahead(&self) -> bool {
		self.inner.converter().requires_read_ahead()
	}

	fn element_type(&self) -> Option<TypeKey> {
		Some(self.inner.type_key())
	}

	fn try_read(&self, reader: &mut JsonReader, options: &SerializerOptions, state: &mut ReadStack) -> Result<Option<BoxedValue>> {
		let resuming = state.current_mut().take_state::<InnerStarted>().is_some();
		if !resuming && reader.token_type() == TokenType::Null {
			return Ok(Some(Box::new(None::<T>)));
		}
		state.push();
		match read_nested(&self.inner, reader, options, state)? {
			Some(value) => {
				state.pop(true);
				Ok(Some(Box::new(Some(unbox_value::<T>(value, &self.inner.type_key())?))))
			}
			None => {
				state.pop(false);
				state.current_mut().set_state(InnerStarted);
				Ok(None)
			}
		}
	}

	fn try_write(&self, writer: &mut JsonWriter, value: &dyn Any, options: &SerializerOptions, state: &mut WriteStack) -> Result<bool> {
		let Some(value) = downcast_value::<Option<T>>(value, &self.type_key())? else {
			writer.write_null()?;
			return Ok(true);
		};
		state.push();
		let done = self.inner.converter().try_write(writer, value, options, state)?;
		state.pop(done);
		Ok(done)
	}
}

impl<T: JsonType> JsonType for Option<T> {
	fn type_shape() -> TypeShape {
		TypeShape::Factory(OptionConverter::<T>::create)
	}

	fn missing_value() -> Option<Self> {
		Some(None)
	}
}

/// `Box<T>`, converted like `T`.
pub(crate) struct BoxConverter<T> {
	inner: Arc<TypeDescriptor>,
	marker: PhantomData<fn() -> T>,
}

impl<T: JsonType> BoxConverter<T> {
	fn create(options: &SerializerOptions) -> Result<Arc<dyn JsonConverter>> {
		Ok(Arc::new(Self {
			inner: options.descriptor::<T>()?,
			marker: PhantomData,
		}))
	}
}

impl<T: JsonType> JsonConverter for BoxConverter<T> {
	fn type_key(&self) -> TypeKey {
		TypeKey::of::<Box<T>>()
	}

	fn class(&self) -> ConverterClass {
		self.inner.class()
	}

	fn handle_null(&self) -> bool {
		self.inner.converter().handle_null()
	}

	fn requires_read_ahead(&self) -> bool {
		self.inner.converter().requires_read_ahead()
	}

	fn try_read(&self, reader: &mut JsonReader, options: &SerializerOptions, state: &mut ReadStack) -> Result<Option<BoxedValue>> {
		state.push();
		match self.inner.converter().try_read(reader, options, state)? {
			Some(value) => {
				state.pop(true);
				Ok(Some(Box::new(Box::new(unbox_value::<T>(value, &self.inner.type_key())?))))
			}
			None => {
				state.pop(false);
				Ok(None)
			}
		}
	}

	fn try_write(&self, writer: &mut JsonWriter, value: &dyn Any, options: &SerializerOptions, state: &mut WriteStack) -> Result<bool> {
		let value: &T = downcast_value::<Box<T>>(value, &self.type_key())?;
		state.push();
		let done = self.inner.converter().try_write(writer, value, options, state)?;
		state.pop(done);
		Ok(done)
	}
}

impl<T: JsonType> JsonType for Box<T> {
	fn type_shape() -> TypeShape {
		TypeShape::Factory(BoxConverter::<T>::create)
	}
}
