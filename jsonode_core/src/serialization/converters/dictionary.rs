//! String keyed maps, written as JSON objects.

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
use indexmap::IndexMap;
use std::{
	any::Any,
	collections::{BTreeMap, HashMap},
	hash::BuildHasher,
	marker::PhantomData,
	sync::Arc,
};

pub(crate) trait DictionaryLike: JsonType + Default {
	type Value: JsonType;

	fn insert_entry(&mut self, key: String, value: Self::Value);
	fn keys_snapshot(&self) -> Vec<String>;
	fn value_of(&self, key: &str) -> Option<&Self::Value>;
}

impl<V: JsonType> DictionaryLike for BTreeMap<String, V> {
	type Value = V;

	fn insert_entry(&mut self, key: String, value: V) {
		self.insert(key, value);
	}

	fn keys_snapshot(&self) -> Vec<String> {
		self.keys().cloned().collect()
	}

	fn value_of(&self, key: &str) -> Option<&V> {
		self.get(key)
	}
}

impl<V: JsonType, S: BuildHasher + Default + Send + 'static> DictionaryLike for HashMap<String, V, S> {
	type Value = V;

	fn insert_entry(&mut self, key: String, value: V) {
		self.insert(key, value);
	}

	fn keys_snapshot(&self) -> Vec<String> {
		self.keys().cloned().collect()
	}

	fn value_of(&self, key: &str) -> Option<&V> {
		self.get(key)
	}
}

impl<V: JsonType> DictionaryLike for IndexMap<String, V> {
	type Value = V;

	fn insert_entry(&mut self, key: String, value: V) {
		self.insert(key, value);
	}

	fn keys_snapshot(&self) -> Vec<String> {
		self.keys().cloned().collect()
	}

	fn value_of(&self, key: &str) -> Option<&V> {
		self.get(key)
	}
}

struct DictionaryProgress<D> {
	map: D,
	key: Option<String>,
	/// The reader is on the first token of the value of `key`.
	have_value: bool,
}

pub(crate) struct DictionaryConverter<D> {
	value: Arc<TypeDescriptor>,
	marker: PhantomData<fn() -> D>,
}

impl<D: DictionaryLike> DictionaryConverter<D> {
	fn create(options: &SerializerOptions) -> Result<Arc<dyn JsonConverter>> {
		Ok(Arc::new(Self {
			value: options.descriptor::<D::Value>()?,
			marker: PhantomData,
		}))
	}
}

impl<D: DictionaryLike> JsonConverter for DictionaryConverter<D> {
	fn type_key(&self) -> TypeKey {
		TypeKey::of::<D>()
	}

	fn class(&self) -> ConverterClass {
		ConverterClass::Dictionary
	}

	fn element_type(&self) -> Option<TypeKey> {
		Some(self.value.type_key())
	}

	fn try_read(&self, reader: &mut JsonReader, options: &SerializerOptions, state: &mut ReadStack) -> Result<Option<BoxedValue>> {
		let mut progress = match state.current_mut().take_state::<DictionaryProgress<D>>() {
			Some(progress) => progress,
			None if reader.token_type() == TokenType::StartObject => DictionaryProgress {
				map: D::default(),
				key: None,
				have_value: false,
			},
			None => {
				return Err(reader.format_error(&format!(
					"expected an object for {}, found a token of type {}",
					self.type_key().name(),
					reader.token_type().as_str()
				)));
			}
		};
		let converter = self.value.converter();
		loop {
			let Some(key) = progress.key.take() else {
				if !reader.read()? {
					state.current_mut().set_state(progress);
					return Ok(None);
				}
				match reader.token_type() {
					TokenType::EndObject => return Ok(Some(Box::new(progress.map))),
					TokenType::PropertyName => progress.key = Some(reader.get_string()?),
					other => return Err(reader.format_error(&format!("unexpected token of type {}", other.as_str()))),
				}
				continue;
			};
			if !progress.have_value {
				if !advance_to_value(reader, converter)? {
					progress.key = Some(key);
					state.current_mut().set_state(progress);
					return Ok(None);
				}
				progress.have_value = true;
			}
			state.push_property(&key, None);
			match read_nested(&self.value, reader, options, state)? {
				Some(value) => {
					state.pop(true);
					progress.map.insert_entry(key, unbox_value(value, &self.value.type_key())?);
					progress.have_value = false;
				}
				None => {
					state.pop(false);
					progress.key = Some(key);
					state.current_mut().set_state(progress);
					return Ok(None);
				}
			}
		}
	}

	fn try_write(&self, writer: &mut JsonWriter, value: &dyn Any, options: &SerializerOptions, state: &mut WriteStack) -> Result<bool> {
		let map = downcast_value::<D>(value, &self.type_key())?;
		let frame = state.current_mut();
		if !frame.started {
			writer.write_start_object()?;
			frame.started = true;
		}
		let (keys, mut next) = match std::mem::take(&mut frame.enumerator) {
			EnumeratorState::Keys { keys, next } => (keys, next),
			_ => (map.keys_snapshot(), 0),
		};
		let converter = self.value.converter();
		while let Some(key) = keys.get(next) {
			let Some(value) = map.value_of(key) else {
				next += 1;
				continue;
			};
			if !state.current().property_name_written {
				match options.dictionary_key_policy() {
					Some(policy) => writer.write_property_name(&policy.convert_name(key))?,
					None => writer.write_property_name(key)?,
				}
				state.current_mut().property_name_written = true;
			}
			state.push_property(key, None);
			if !converter.try_write(writer, value, options, state)? {
				state.pop(false);
				state.current_mut().enumerator = EnumeratorState::Keys { keys, next };
				return Ok(false);
			}
			state.pop(true);
			state.current_mut().property_name_written = false;
			next += 1;
			if state.should_flush(writer) {
				state.current_mut().enumerator = EnumeratorState::Keys { keys, next };
				return Ok(false);
			}
		}
		writer.write_end_object()?;
		state.current_mut().enumerator = EnumeratorState::Done;
		Ok(true)
	}
}

impl<V: JsonType> JsonType for BTreeMap<String, V> {
	fn type_shape() -> TypeShape {
		TypeShape::Factory(DictionaryConverter::<BTreeMap<String, V>>::create)
	}
}

impl<V: JsonType, S: BuildHasher + Default + Send + 'static> JsonType for HashMap<String, V, S> {
	fn type_shape() -> TypeShape {
		TypeShape::Factory(DictionaryConverter::<HashMap<String, V, S>>::create)
	}
}

impl<V: JsonType> JsonType for IndexMap<String, V> {
	fn type_shape() -> TypeShape {
		TypeShape::Factory(DictionaryConverter::<IndexMap<String, V>>::create)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{
		options::SnakeCaseLower,
		serialization::{from_str, to_string},
	};
	use pretty_assertions::assert_eq;

	#[test]
	fn test_round_trip_keeps_order() -> Result<()> {
		let options = SerializerOptions::default();
		let json = r#"{"b":[1],"a":[],"c":[2,3]}"#;
		let map = from_str::<IndexMap<String, Vec<u8>>>(json, &options)?;
		assert_eq!(map.keys().collect::<Vec<_>>(), vec!["b", "a", "c"]);
		assert_eq!(to_string(&map, &options)?, json);
		Ok(())
	}

	#[test]
	fn test_last_duplicate_wins() -> Result<()> {
		let options = SerializerOptions::default();
		let map = from_str::<BTreeMap<String, i32>>(r#"{"x":1,"y":2,"x":3}"#, &options)?;
		assert_eq!(map, BTreeMap::from([("x".to_string(), 3), ("y".to_string(), 2)]));
		Ok(())
	}

	#[test]
	fn test_key_policy_applies_on_write_only() -> Result<()> {
		let mut options = SerializerOptions::default();
		options.set_dictionary_key_policy(SnakeCaseLower)?;
		let map = BTreeMap::from([("FirstKey".to_string(), true)]);
		assert_eq!(to_string(&map, &options)?, r#"{"first_key":true}"#);
		let read = from_str::<HashMap<String, bool>>(r#"{"FirstKey":true}"#, &options)?;
		assert!(read["FirstKey"]);
		Ok(())
	}

	#[test]
	fn test_error_path() {
		let options = SerializerOptions::default();
		let err = from_str::<BTreeMap<String, Vec<u8>>>(r#"{"a b":[1,-1]}"#, &options).unwrap_err();
		assert!(err.to_string().ends_with("path: $['a b'][1]"), "{err}");
	}
}
