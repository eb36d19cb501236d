use crate::{
	metadata::{JsonType, TypeKey, TypeShape},
	options::SerializerOptions,
	reader::JsonReader,
	serialization::{BoxedValue, JsonConverter, ReadStack, WriteStack, downcast_value},
	text_formats::{format_date_time, format_offset_date_time, parse_date_time, parse_offset_date_time, parse_uuid},
	writer::JsonWriter,
};
use anyhow::Result;
use std::{any::Any, marker::PhantomData, sync::Arc};
use time::{OffsetDateTime, PrimitiveDateTime};
use uuid::Uuid;

/// Values written as JSON strings in a fixed text format.
pub(crate) trait TextValue: Sized + Send + Sync + 'static {
	fn parse_text(text: &str) -> Result<Self>;
	fn format_text(&self) -> Result<String>;
}

impl TextValue for PrimitiveDateTime {
	fn parse_text(text: &str) -> Result<Self> {
		parse_date_time(text)
	}

	fn format_text(&self) -> Result<String> {
		format_date_time(self)
	}
}

impl TextValue for OffsetDateTime {
	fn parse_text(text: &str) -> Result<Self> {
		parse_offset_date_time(text)
	}

	fn format_text(&self) -> Result<String> {
		format_offset_date_time(self)
	}
}

impl TextValue for Uuid {
	fn parse_text(text: &str) -> Result<Self> {
		parse_uuid(text)
	}

	fn format_text(&self) -> Result<String> {
		Ok(self.to_string())
	}
}

pub(crate) struct TextConverter<T>(PhantomData<fn() -> T>);

impl<T: TextValue> JsonConverter for TextConverter<T> {
	fn type_key(&self) -> TypeKey {
		TypeKey::of::<T>()
	}

	fn requires_read_ahead(&self) -> bool {
		true
	}

	fn try_read(&self, reader: &mut JsonReader, _: &SerializerOptions, _: &mut ReadStack) -> Result<Option<BoxedValue>> {
		let text = reader.get_string()?;
		Ok(Some(Box::new(T::parse_text(&text)?)))
	}

	fn try_write(&self, writer: &mut JsonWriter, value: &dyn Any, _: &SerializerOptions, _: &mut WriteStack) -> Result<bool> {
		writer.write_string(&downcast_value::<T>(value, &self.type_key())?.format_text()?)?;
		Ok(true)
	}
}

macro_rules! impl_json_type {
	($($t:ty),+) => {
		$(
			impl JsonType for $t {
				fn type_shape() -> TypeShape {
					TypeShape::Converter(Arc::new(TextConverter::<$t>(PhantomData)))
				}
			}
		)+
	};
}

impl_json_type!(PrimitiveDateTime, OffsetDateTime, Uuid);
