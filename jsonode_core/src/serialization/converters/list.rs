//! Sequences, read and written element by element.

use crate::{
	metadata::{JsonType, TypeDescriptor, TypeKey, TypeShape},
	options::SerializerOptions,
	reader::{JsonReader, TokenType},
	serialization::{
		BoxedValue, ConverterClass, EnumeratorState, JsonConverter, ReadStack, WriteStack, advance_to_value,
		downcast_value, read_nested, unbox_value,
	},
	writer::JsonWriter,
};
use anyhow::Result;
use std::{any::Any, collections::VecDeque, marker::PhantomData, sync::Arc};

pub(crate) trait ListLike: JsonType + Default {
	type Item: JsonType;

	fn push_item(&mut self, item: Self::Item);
	fn item_at(&self, index: usize) -> Option<&Self::Item>;
	fn item_count(&self) -> usize;
}

impl<T: JsonType> ListLike for Vec<T> {
	type Item = T;

	fn push_item(&mut self, item: T) {
		self.push(item);
	}

	fn item_at(&self, index: usize) -> Option<&T> {
		self.get(index)
	}

	fn item_count(&self) -> usize {
		self.len()
	}
}

impl<T: JsonType> ListLike for VecDeque<T> {
	type Item = T;

	fn push_item(&mut self, item: T) {
		self.push_back(item);
	}

	fn item_at(&self, index: usize) -> Option<&T> {
		self.get(index)
	}

	fn item_count(&self) -> usize {
		self.len()
	}
}

struct ListProgress<L> {
	list: L,
	/// The reader is on the first token of the next item.
	have_item: bool,
}

pub(crate) struct ListConverter<L> {
	element: Arc<TypeDescriptor>,
	marker: PhantomData<fn() -> L>,
}

impl<L: ListLike> ListConverter<L> {
	fn create(options: &SerializerOptions) -> Result<Arc<dyn JsonConverter>> {
		Ok(Arc::new(Self {
			element: options.descriptor::<L::Item>()?,
			marker: PhantomData,
		}))
	}
}

impl<L: ListLike> JsonConverter for ListConverter<L> {
	fn type_key(&self) -> TypeKey {
		TypeKey::of::<L>()
	}

	fn class(&self) -> ConverterClass {
		ConverterClass::Enumerable
	}

	fn element_type(&self) -> Option<TypeKey> {
		Some(self.element.type_key())
	}

	fn try_read(&self, reader: &mut JsonReader, options: &SerializerOptions, state: &mut ReadStack) -> Result<Option<BoxedValue>> {
		let mut progress = match state.current_mut().take_state::<ListProgress<L>>() {
			Some(progress) => progress,
			None if reader.token_type() == TokenType::StartArray => ListProgress {
				list: L::default(),
				have_item: false,
			},
			None => {
				return Err(reader.format_error(&format!(
					"expected an array for {}, found a token of type {}",
					self.type_key().name(),
					reader.token_type().as_str()
				)));
			}
		};
		let element = self.element.converter();
		loop {
			if !progress.have_item {
				if !advance_to_value(reader, element)? {
					state.current_mut().set_state(progress);
					return Ok(None);
				}
				if reader.token_type() == TokenType::EndArray {
					return Ok(Some(Box::new(progress.list)));
				}
				progress.have_item = true;
			}
			state.push_index(progress.list.item_count());
			match read_nested(&self.element, reader, options, state)? {
				Some(item) => {
					state.pop(true);
					progress.list.push_item(unbox_value(item, &self.element.type_key())?);
					progress.have_item = false;
				}
				None => {
					state.pop(false);
					state.current_mut().set_state(progress);
					return Ok(None);
				}
			}
		}
	}

	fn try_write(&self, writer: &mut JsonWriter, value: &dyn Any, options: &SerializerOptions, state: &mut WriteStack) -> Result<bool> {
		let list = downcast_value::<L>(value, &self.type_key())?;
		let frame = state.current_mut();
		if !frame.started {
			writer.write_start_array()?;
			frame.started = true;
		}
		let mut index = match frame.enumerator {
			EnumeratorState::Index(index) => index,
			_ => 0,
		};
		let element = self.element.converter();
		while let Some(item) = list.item_at(index) {
			state.push_index(index);
			if !element.try_write(writer, item, options, state)? {
				state.pop(false);
				state.current_mut().enumerator = EnumeratorState::Index(index);
				return Ok(false);
			}
			state.pop(true);
			index += 1;
			if state.should_flush(writer) {
				state.current_mut().enumerator = EnumeratorState::Index(index);
				return Ok(false);
			}
		}
		writer.write_end_array()?;
		state.current_mut().enumerator = EnumeratorState::Done;
		Ok(true)
	}
}

impl<T: JsonType> JsonType for Vec<T> {
	fn type_shape() -> TypeShape {
		TypeShape::Factory(ListConverter::<Vec<T>>::create)
	}
}

impl<T: JsonType> JsonType for VecDeque<T> {
	fn type_shape() -> TypeShape {
		TypeShape::Factory(ListConverter::<VecDeque<T>>::create)
	}
}
