//! Objects with declared properties.
//!
//! Reading runs through three phases per member: read the name, position the reader on the
//! value, then read the value with the property's converter. Each phase can suspend. Types with
//! a parameterized constructor collect constructor arguments and the values of other
//! properties first, and are created once the closing brace has been read.

use crate::{
	element::JsonElement,
	error::JsonError,
	metadata::{ConstructorArgs, ExtensionKind, ObjectMetadata, TypeKey},
	node::{JsonNode, JsonObject},
	options::SerializerOptions,
	reader::{JsonReader, TokenType},
	serialization::{
		BoxedValue, ConverterClass, EnumeratorState, JsonConverter, ReadStack, WriteStack, advance_to_value,
		read_nested,
	},
	writer::JsonWriter,
};
use anyhow::Result;
use log::trace;
use std::{
	any::Any,
	collections::{BTreeMap, HashMap},
	sync::Arc,
};

enum Target {
	Property(usize),
	Extension(String),
	Skip,
}

enum Phase {
	ReadName,
	ReadValue(Target),
	HaveValue(usize),
}

struct ObjectProgress {
	/// The instance, for types with a default constructor.
	instance: Option<BoxedValue>,
	arguments: Vec<Option<BoxedValue>>,
	/// Values of settable properties, applied after the constructor ran.
	pending: Vec<(usize, BoxedValue)>,
	extension: Vec<(String, JsonElement)>,
	phase: Phase,
}

pub(crate) struct ObjectConverter {
	metadata: Arc<ObjectMetadata>,
}

impl ObjectConverter {
	pub(crate) fn new(metadata: Arc<ObjectMetadata>) -> Self {
		Self { metadata }
	}

	fn start(&self, reader: &JsonReader) -> Result<ObjectProgress> {
		let name = self.metadata.type_key().name();
		if reader.token_type() != TokenType::StartObject {
			return Err(reader.format_error(&format!(
				"expected an object for {name}, found a token of type {}",
				reader.token_type().as_str()
			)));
		}
		let instance = if self.metadata.uses_constructor() {
			None
		} else {
			let create = self
				.metadata
				.create
				.as_ref()
				.ok_or_else(|| JsonError::not_supported(format!("{name} has no constructor to create instances with")))?;
			let mut instance = create();
			if let Some(callback) = &self.metadata.callbacks.on_deserializing {
				callback(instance.as_mut());
			}
			Some(instance)
		};
		Ok(ObjectProgress {
			instance,
			arguments: self.metadata.parameters().iter().map(|_| None).collect(),
			pending: Vec::new(),
			extension: Vec::new(),
			phase: Phase::ReadName,
		})
	}

	fn target_of(&self, name: String) -> Target {
		match self.metadata.find(&name) {
			Some(index) => {
				let property = &self.metadata.properties()[index];
				if property.parameter().is_some() || property.accessor().can_set() {
					Target::Property(index)
				} else {
					Target::Skip
				}
			}
			None if self.metadata.extension().is_some() => Target::Extension(name),
			None => Target::Skip,
		}
	}

	fn assign(&self, progress: &mut ObjectProgress, index: usize, value: BoxedValue) -> Result<()> {
		let property = &self.metadata.properties()[index];
		match (&mut progress.instance, property.parameter()) {
			(Some(instance), _) => property.accessor().set(instance.as_mut(), value),
			(None, Some(parameter)) => {
				progress.arguments[parameter] = Some(value);
				Ok(())
			}
			(None, None) => {
				progress.pending.push((index, value));
				Ok(())
			}
		}
	}

	fn add_extension(&self, instance: &mut dyn Any, name: String, element: JsonElement, options: &SerializerOptions) -> Result<()> {
		let Some(extension) = self.metadata.extension() else {
			return Ok(());
		};
		let target = extension.accessor.get_mut(instance)?;
		let mismatch = || JsonError::invalid_operation(format!("unexpected type of extension data '{}'", extension.name()));
		match extension.kind() {
			ExtensionKind::BTreeMap => {
				target
					.downcast_mut::<BTreeMap<String, JsonElement>>()
					.ok_or_else(mismatch)?
					.insert(name, element);
			}
			ExtensionKind::HashMap => {
				target
					.downcast_mut::<HashMap<String, JsonElement>>()
					.ok_or_else(mismatch)?
					.insert(name, element);
			}
			ExtensionKind::Object => {
				let object = target.downcast_mut::<JsonObject>().ok_or_else(mismatch)?;
				object.set(&name, JsonNode::from_element(element, options.node_options()))?;
			}
		}
		Ok(())
	}

	fn finish(&self, mut progress: ObjectProgress, options: &SerializerOptions) -> Result<BoxedValue> {
		let mut instance = match progress.instance.take() {
			Some(instance) => instance,
			None => {
				let parameters = self.metadata.parameters();
				let mut arguments = std::mem::take(&mut progress.arguments);
				for (argument, parameter) in arguments.iter_mut().zip(parameters) {
					if argument.is_none() {
						*argument = (parameter.missing)();
					}
					if argument.is_none() {
						return Err(JsonError::format(format!(
							"missing value for constructor parameter '{}' of {}",
							parameter.name(),
							self.metadata.type_key().name()
						))
						.into());
					}
				}
				let names = parameters.iter().map(|parameter| parameter.name()).collect();
				let invoke = self
					.metadata
					.constructor
					.as_ref()
					.map(|constructor| constructor.invoke.clone())
					.ok_or_else(|| JsonError::not_supported("missing constructor"))?;
				let mut instance = invoke(&mut ConstructorArgs::new(names, arguments))?;
				if let Some(callback) = &self.metadata.callbacks.on_deserializing {
					callback(instance.as_mut());
				}
				for (index, value) in progress.pending.drain(..) {
					self.metadata.properties()[index].accessor().set(instance.as_mut(), value)?;
				}
				instance
			}
		};
		for (name, element) in progress.extension.drain(..) {
			self.add_extension(instance.as_mut(), name, element, options)?;
		}
		if let Some(callback) = &self.metadata.callbacks.on_deserialized {
			callback(instance.as_mut());
		}
		Ok(instance)
	}

	fn write_extension(&self, writer: &mut JsonWriter, value: &dyn Any, state: &WriteStack) -> Result<()> {
		let Some(extension) = self.metadata.extension() else {
			return Ok(());
		};
		if !extension.accessor.can_get() {
			return Ok(());
		}
		let data = extension.accessor.get(value)?;
		if let Some(map) = data.downcast_ref::<BTreeMap<String, JsonElement>>() {
			for (name, element) in map {
				writer.write_property_name(name)?;
				element.write_to(writer)?;
			}
		} else if let Some(map) = data.downcast_ref::<HashMap<String, JsonElement>>() {
			for (name, element) in map {
				writer.write_property_name(name)?;
				element.write_to(writer)?;
			}
		} else if let Some(object) = data.downcast_ref::<JsonObject>() {
			for (name, node) in object.entries()? {
				writer.write_property_name(&name)?;
				match node {
					Some(node) => node.write_with(writer, state.number_handling())?,
					None => writer.write_null()?,
				}
			}
		}
		Ok(())
	}
}

impl JsonConverter for ObjectConverter {
	fn type_key(&self) -> TypeKey {
		self.metadata.type_key()
	}

	fn class(&self) -> ConverterClass {
		ConverterClass::Object
	}

	fn try_read(&self, reader: &mut JsonReader, options: &SerializerOptions, state: &mut ReadStack) -> Result<Option<BoxedValue>> {
		let mut progress = match state.current_mut().take_state::<ObjectProgress>() {
			Some(progress) => {
				trace!("resuming an object of {}", self.metadata.type_key().name());
				progress
			}
			None => self.start(reader)?,
		};
		let suspend = |state: &mut ReadStack, progress: ObjectProgress| -> Result<Option<BoxedValue>> {
			state.current_mut().set_state(progress);
			Ok(None)
		};
		loop {
			match std::mem::replace(&mut progress.phase, Phase::ReadName) {
				Phase::ReadName => {
					if !reader.read()? {
						return suspend(state, progress);
					}
					match reader.token_type() {
						TokenType::EndObject => return self.finish(progress, options).map(Some),
						TokenType::PropertyName => progress.phase = Phase::ReadValue(self.target_of(reader.get_string()?)),
						other => return Err(reader.format_error(&format!("unexpected token of type {}", other.as_str()))),
					}
				}
				Phase::ReadValue(Target::Skip) => {
					if !reader.try_skip()? {
						progress.phase = Phase::ReadValue(Target::Skip);
						return suspend(state, progress);
					}
				}
				Phase::ReadValue(Target::Extension(name)) => {
					if !reader.read_with_read_ahead(true)? {
						progress.phase = Phase::ReadValue(Target::Extension(name));
						return suspend(state, progress);
					}
					let element = JsonElement::read_from(reader)?;
					match &mut progress.instance {
						Some(instance) => self.add_extension(instance.as_mut(), name, element, options)?,
						None => progress.extension.push((name, element)),
					}
				}
				Phase::ReadValue(Target::Property(index)) => {
					let descriptor = self.metadata.properties()[index].descriptor(options)?;
					if !advance_to_value(reader, descriptor.converter())? {
						progress.phase = Phase::ReadValue(Target::Property(index));
						return suspend(state, progress);
					}
					if options.ignore_null_values() && reader.token_type() == TokenType::Null {
						continue;
					}
					progress.phase = Phase::HaveValue(index);
				}
				Phase::HaveValue(index) => {
					let property = &self.metadata.properties()[index];
					let descriptor = property.descriptor(options)?;
					state.push_property(property.json_name(), property.number_handling());
					match read_nested(&descriptor, reader, options, state)? {
						Some(value) => {
							state.pop(true);
							self.assign(&mut progress, index, value)?;
						}
						None => {
							state.pop(false);
							progress.phase = Phase::HaveValue(index);
							return suspend(state, progress);
						}
					}
				}
			}
		}
	}

	fn try_write(&self, writer: &mut JsonWriter, value: &dyn Any, options: &SerializerOptions, state: &mut WriteStack) -> Result<bool> {
		let frame = state.current_mut();
		if !frame.started {
			if let Some(callback) = &self.metadata.callbacks.on_serializing {
				callback(value);
			}
			writer.write_start_object()?;
			frame.started = true;
		}
		let mut index = match frame.enumerator {
			EnumeratorState::Index(index) => index,
			_ => 0,
		};
		let properties = self.metadata.properties();
		while let Some(property) = properties.get(index) {
			let accessor = property.accessor();
			if !accessor.can_get() || (options.ignore_read_only_properties() && !accessor.can_set()) {
				index += 1;
				continue;
			}
			let member = accessor.get(value)?;
			let descriptor = property.descriptor(options)?;
			let converter = descriptor.converter();
			if options.ignore_null_values() && converter.is_null_value(member) {
				index += 1;
				continue;
			}
			if !state.current().property_name_written {
				writer.write_property_name(property.json_name())?;
				state.current_mut().property_name_written = true;
			}
			state.push_property(property.json_name(), property.number_handling());
			if !converter.try_write(writer, member, options, state)? {
				state.pop(false);
				state.current_mut().enumerator = EnumeratorState::Index(index);
				return Ok(false);
			}
			state.pop(true);
			state.current_mut().property_name_written = false;
			index += 1;
			if state.should_flush(writer) {
				state.current_mut().enumerator = EnumeratorState::Index(index);
				return Ok(false);
			}
		}
		self.write_extension(writer, value, state)?;
		writer.write_end_object()?;
		state.current_mut().enumerator = EnumeratorState::Done;
		if let Some(callback) = &self.metadata.callbacks.on_serialized {
			callback(value);
		}
		Ok(true)
	}
}

#[cfg(test)]
mod tests {
	use crate::{
		element::JsonElement,
		error::{ErrorKind, error_kind},
		metadata::{JsonType, ObjectShapeBuilder, ParameterShape, PropertyShape, TypeShape},
		node::JsonObject,
		options::{CamelCase, NumberHandling, SerializerOptions},
		serialization::{from_str, to_string},
	};
	use anyhow::Result;
	use pretty_assertions::assert_eq;
	use std::collections::BTreeMap;

	#[derive(Debug, Default, PartialEq)]
	struct Order {
		order_id: u32,
		customer_name: Option<String>,
		lines: Vec<Line>,
		total: f64,
		note: String,
		extra: BTreeMap<String, JsonElement>,
	}

	impl JsonType for Order {
		fn type_shape() -> TypeShape {
			ObjectShapeBuilder::<Order>::new()
				.default_constructor(Order::default)
				.property(PropertyShape::field(
					"order_id",
					|o: &Order| &o.order_id,
					|o: &mut Order| &mut o.order_id,
					|o: &mut Order, v| o.order_id = v,
				))
				.property(PropertyShape::field(
					"customer_name",
					|o: &Order| &o.customer_name,
					|o: &mut Order| &mut o.customer_name,
					|o: &mut Order, v| o.customer_name = v,
				))
				.property(
					PropertyShape::field(
						"total",
						|o: &Order| &o.total,
						|o: &mut Order| &mut o.total,
						|o: &mut Order, v| o.total = v,
					)
					.number_handling(NumberHandling::AllowReadingFromString | NumberHandling::WriteAsString)
					.order(1),
				)
				.property(PropertyShape::field(
					"lines",
					|o: &Order| &o.lines,
					|o: &mut Order| &mut o.lines,
					|o: &mut Order, v| o.lines = v,
				))
				.property(
					PropertyShape::field(
						"note",
						|o: &Order| &o.note,
						|o: &mut Order| &mut o.note,
						|o: &mut Order, v| o.note = v,
					)
					.ignore(),
				)
				.property(
					PropertyShape::field(
						"extra",
						|o: &Order| &o.extra,
						|o: &mut Order| &mut o.extra,
						|o: &mut Order, v| o.extra = v,
					)
					.extension_data(),
				)
				.build()
		}
	}

	/// A type created through its constructor, with a read-only property.
	#[derive(Debug, PartialEq)]
	struct Line {
		sku: String,
		quantity: Option<u16>,
		label: String,
	}

	impl JsonType for Line {
		fn type_shape() -> TypeShape {
			ObjectShapeBuilder::<Line>::new()
				.constructor(
					vec![ParameterShape::new::<String>("sku"), ParameterShape::new::<Option<u16>>("quantity")],
					|args| {
						let sku: String = args.take(0)?;
						let quantity: Option<u16> = args.take(1)?;
						Ok(Line {
							label: format!("{sku} x{}", quantity.unwrap_or(1)),
							sku,
							quantity,
						})
					},
				)
				.property(PropertyShape::read_only("sku", |l: &Line| &l.sku).rename("SKU"))
				.property(PropertyShape::read_only("quantity", |l: &Line| &l.quantity))
				.property(PropertyShape::read_only("label", |l: &Line| &l.label))
				.build()
		}
	}

	fn camel_case() -> Result<SerializerOptions> {
		let mut options = SerializerOptions::default();
		options.set_property_naming_policy(CamelCase)?;
		Ok(options)
	}

	#[test]
	fn test_read_object() -> Result<()> {
		let options = camel_case()?;
		let json = r#"{"orderId":7,"lines":[{"SKU":"a-1","quantity":2},{"SKU":"b-2","label":"ignored"}],
			"total":"12.5","note":"dropped","unknown":{"x":[1]},"orderId":8}"#;
		let order = from_str::<Order>(json, &options)?;
		assert_eq!(order.order_id, 8);
		assert_eq!(order.customer_name, None);
		assert_eq!(order.total, 12.5);
		assert_eq!(order.note, "");
		assert_eq!(
			order.lines,
			vec![
				Line {
					sku: "a-1".into(),
					quantity: Some(2),
					label: "a-1 x2".into()
				},
				Line {
					sku: "b-2".into(),
					quantity: None,
					label: "b-2 x1".into()
				},
			]
		);
		assert_eq!(order.extra.keys().collect::<Vec<_>>(), vec!["note", "unknown"]);
		assert_eq!(order.extra["unknown"].to_json_string(), r#"{"x":[1]}"#);
		Ok(())
	}

	#[test]
	fn test_write_object() -> Result<()> {
		let options = camel_case()?;
		let order = Order {
			order_id: 1,
			customer_name: Some("Ada".into()),
			lines: vec![Line {
				sku: "z".into(),
				quantity: Some(3),
				label: "z x3".into(),
			}],
			total: 4.5,
			note: "not written".into(),
			extra: BTreeMap::from([("tag".to_string(), JsonElement::from(true))]),
		};
		assert_eq!(
			to_string(&order, &options)?,
			r#"{"orderId":1,"customerName":"Ada","lines":[{"SKU":"z","quantity":3,"label":"z x3"}],"total":"4.5","tag":true}"#
		);
		Ok(())
	}

	#[test]
	fn test_ignore_options() -> Result<()> {
		let mut options = camel_case()?;
		options.set_ignore_null_values(true)?;
		options.set_ignore_read_only_properties(true)?;
		let order = Order::default();
		assert_eq!(to_string(&order, &options)?, r#"{"orderId":0,"lines":[],"total":"0"}"#);

		let order = from_str::<Order>(r#"{"orderId":null,"customerName":null}"#, &options)?;
		assert_eq!(order, Order::default());
		let line = from_str::<Line>(r#"{"SKU":"q","quantity":null}"#, &options)?;
		assert_eq!(line.quantity, None);
		assert_eq!(line.label, "q x1");
		Ok(())
	}

	#[test]
	fn test_missing_constructor_argument() {
		let options = SerializerOptions::default();
		let err = from_str::<Line>(r#"{"quantity":1}"#, &options).unwrap_err();
		assert_eq!(error_kind(&err), Some(ErrorKind::Format));
		assert!(err.to_string().contains("'sku'"), "{err}");
	}

	#[test]
	fn test_case_insensitive_properties() -> Result<()> {
		let mut options = camel_case()?;
		options.set_property_name_case_insensitive(true)?;
		let order = from_str::<Order>(r#"{"ORDERID":3,"Lines":[{"sku":"k"}]}"#, &options)?;
		assert_eq!(order.order_id, 3);
		assert_eq!(order.lines[0].sku, "k");
		assert!(order.extra.is_empty());
		Ok(())
	}

	#[test]
	fn test_error_path_through_properties() {
		let options = camel_case().unwrap();
		let err = from_str::<Order>(r#"{"lines":[{"SKU":"a"},{"SKU":5}]}"#, &options).unwrap_err();
		assert_eq!(error_kind(&err), Some(ErrorKind::Format));
		assert!(err.to_string().ends_with("path: $.lines[1].SKU"), "{err}");
	}

	#[derive(Default)]
	struct Bag {
		id: u8,
		rest: JsonObject,
	}

	impl JsonType for Bag {
		fn type_shape() -> TypeShape {
			ObjectShapeBuilder::<Bag>::new()
				.default_constructor(Bag::default)
				.property(PropertyShape::field(
					"id",
					|b: &Bag| &b.id,
					|b: &mut Bag| &mut b.id,
					|b: &mut Bag, v| b.id = v,
				))
				.property(
					PropertyShape::field(
						"rest",
						|b: &Bag| &b.rest,
						|b: &mut Bag| &mut b.rest,
						|b: &mut Bag, v| b.rest = v,
					)
					.extension_data(),
				)
				.on_deserialized(|b| {
					let _ = b.rest.remove("drop");
				})
				.build()
		}
	}

	#[test]
	fn test_object_extension_data() -> Result<()> {
		let options = SerializerOptions::default();
		let bag = from_str::<Bag>(r#"{"a":[1,{"b":null}],"id":4,"drop":0,"a":"last"}"#, &options)?;
		assert_eq!(bag.id, 4);
		assert_eq!(bag.rest.keys()?, vec!["a"]);
		assert_eq!(to_string(&bag, &options)?, r#"{"id":4,"a":"last"}"#);
		Ok(())
	}

	#[derive(Debug)]
	struct NoConstructor {
		value: u8,
	}

	impl JsonType for NoConstructor {
		fn type_shape() -> TypeShape {
			ObjectShapeBuilder::<NoConstructor>::new()
				.property(PropertyShape::read_only("value", |n: &NoConstructor| &n.value))
				.build()
		}
	}

	#[test]
	fn test_write_only_types() -> Result<()> {
		let options = SerializerOptions::default();
		assert_eq!(to_string(&NoConstructor { value: 9 }, &options)?, r#"{"value":9}"#);
		let err = from_str::<NoConstructor>(r#"{"value":9}"#, &options).unwrap_err();
		assert_eq!(error_kind(&err), Some(ErrorKind::NotSupported));
		Ok(())
	}
}
