use super::{
	BindingParameter, BindingProperty, JsonType, ObjectShape, PropertyAccessor, TypeKey, TypeShape, bind_parameters,
	shape::{Callbacks, CreateFn, InvokeFn},
};
use crate::{
	element::JsonElement,
	error::JsonError,
	node::JsonObject,
	options::{NumberHandlingSet, SerializerOptions},
	serialization::{BoxedValue, ConverterClass, JsonConverter, converters::ObjectConverter},
};
use anyhow::Result;
use itertools::Itertools;
use std::{
	collections::{BTreeMap, HashMap},
	sync::{Arc, OnceLock},
};

/// Everything the serializer knows about one type under one set of options.
pub struct TypeDescriptor {
	type_key: TypeKey,
	converter: Arc<dyn JsonConverter>,
	object: Option<Arc<ObjectMetadata>>,
}

impl TypeDescriptor {
	/// Registered converters are consulted first, then the type's own shape.
	pub(crate) fn build<T: JsonType>(options: &SerializerOptions) -> Result<Self> {
		let type_key = TypeKey::of::<T>();
		if let Some(converter) = options.converters().iter().find(|converter| converter.can_convert(&type_key)) {
			return Ok(Self {
				type_key,
				converter: converter.clone(),
				object: None,
			});
		}
		match T::type_shape() {
			TypeShape::Converter(converter) => Ok(Self {
				type_key,
				converter,
				object: None,
			}),
			TypeShape::Factory(factory) => Ok(Self {
				type_key,
				converter: factory(options)?,
				object: None,
			}),
			TypeShape::Object(shape) => {
				let metadata = Arc::new(ObjectMetadata::build(shape, options)?);
				Ok(Self {
					type_key,
					converter: Arc::new(ObjectConverter::new(metadata.clone())),
					object: Some(metadata),
				})
			}
			TypeShape::Unsupported => {
				Err(JsonError::not_supported(format!("the type {} is not supported", type_key.name())).into())
			}
		}
	}

	#[must_use]
	pub fn type_key(&self) -> TypeKey {
		self.type_key
	}

	#[must_use]
	pub fn converter(&self) -> &dyn JsonConverter {
		self.converter.as_ref()
	}

	#[must_use]
	pub fn class(&self) -> ConverterClass {
		self.converter.class()
	}

	/// Property metadata, for object types without a registered converter.
	#[must_use]
	pub fn object(&self) -> Option<&ObjectMetadata> {
		self.object.as_deref()
	}
}

/// A property after naming, ordering and binding.
pub struct PropertyMetadata {
	name: &'static str,
	json_name: String,
	order: i32,
	number_handling: Option<NumberHandlingSet>,
	accessor: Arc<dyn PropertyAccessor>,
	parameter: Option<usize>,
	descriptor: OnceLock<Arc<TypeDescriptor>>,
}

impl PropertyMetadata {
	/// The declared name.
	#[must_use]
	pub fn name(&self) -> &'static str {
		self.name
	}

	/// The name used in JSON.
	#[must_use]
	pub fn json_name(&self) -> &str {
		&self.json_name
	}

	#[must_use]
	pub fn order(&self) -> i32 {
		self.order
	}

	#[must_use]
	pub fn number_handling(&self) -> Option<NumberHandlingSet> {
		self.number_handling
	}

	#[must_use]
	pub fn accessor(&self) -> &dyn PropertyAccessor {
		self.accessor.as_ref()
	}

	/// Index of the constructor parameter bound to this property.
	#[must_use]
	pub fn parameter(&self) -> Option<usize> {
		self.parameter
	}

	/// Descriptor of the property type, resolved on first use.
	pub fn descriptor(&self, options: &SerializerOptions) -> Result<Arc<TypeDescriptor>> {
		if let Some(descriptor) = self.descriptor.get() {
			return Ok(descriptor.clone());
		}
		let descriptor = self.accessor.descriptor(options)?;
		Ok(self.descriptor.get_or_init(|| descriptor).clone())
	}
}

/// Container types accepted for extension data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExtensionKind {
	BTreeMap,
	HashMap,
	Object,
}

impl ExtensionKind {
	fn of(type_key: TypeKey) -> Option<Self> {
		if type_key == TypeKey::of::<BTreeMap<String, JsonElement>>() {
			Some(ExtensionKind::BTreeMap)
		} else if type_key == TypeKey::of::<HashMap<String, JsonElement>>() {
			Some(ExtensionKind::HashMap)
		} else if type_key == TypeKey::of::<JsonObject>() {
			Some(ExtensionKind::Object)
		} else {
			None
		}
	}
}

pub struct ExtensionData {
	pub(crate) name: &'static str,
	pub(crate) kind: ExtensionKind,
	pub(crate) accessor: Arc<dyn PropertyAccessor>,
}

impl ExtensionData {
	#[must_use]
	pub fn name(&self) -> &'static str {
		self.name
	}

	#[must_use]
	pub fn kind(&self) -> ExtensionKind {
		self.kind
	}
}

pub struct ParameterMetadata {
	pub(crate) name: &'static str,
	pub(crate) property: Option<usize>,
	pub(crate) missing: fn() -> Option<BoxedValue>,
}

impl ParameterMetadata {
	#[must_use]
	pub fn name(&self) -> &'static str {
		self.name
	}

	/// Index of the bound property, `None` if the parameter is unbound.
	#[must_use]
	pub fn property(&self) -> Option<usize> {
		self.property
	}
}

pub(crate) struct ConstructorMetadata {
	pub parameters: Vec<ParameterMetadata>,
	pub invoke: InvokeFn,
}

/// Resolved metadata of an object type.
pub struct ObjectMetadata {
	type_key: TypeKey,
	properties: Vec<PropertyMetadata>,
	lookup: HashMap<String, usize>,
	case_insensitive: bool,
	extension: Option<ExtensionData>,
	pub(crate) create: Option<CreateFn>,
	pub(crate) constructor: Option<ConstructorMetadata>,
	pub(crate) callbacks: Callbacks,
}

fn normalize(name: &str, case_insensitive: bool) -> String {
	if case_insensitive { name.to_lowercase() } else { name.to_string() }
}

impl ObjectMetadata {
	pub(crate) fn build(shape: ObjectShape, options: &SerializerOptions) -> Result<Self> {
		let owner = shape.type_key.name();
		let configuration_error = |message: String| -> anyhow::Error { JsonError::configuration(message).into() };

		let mut properties = Vec::new();
		let mut extension = None;
		for property in shape.properties {
			if property.ignored {
				continue;
			}
			if property.extension_data {
				if extension.is_some() {
					return Err(configuration_error(format!(
						"{owner} declares more than one extension data property"
					)));
				}
				let kind = ExtensionKind::of(property.accessor.property_type()).ok_or_else(|| {
					configuration_error(format!(
						"the extension data property '{}' of {owner} must be a map of strings to JSON elements or a JSON object",
						property.name
					))
				})?;
				extension = Some(ExtensionData {
					name: property.name,
					kind,
					accessor: property.accessor,
				});
				continue;
			}
			let json_name = match (property.json_name, options.property_naming_policy()) {
				(Some(json_name), _) => json_name,
				(None, Some(policy)) => policy.convert_name(property.name),
				(None, None) => property.name.to_string(),
			};
			properties.push(PropertyMetadata {
				name: property.name,
				json_name,
				order: property.order,
				number_handling: property.number_handling,
				accessor: property.accessor,
				parameter: None,
				descriptor: OnceLock::new(),
			});
		}
		properties.sort_by_key(PropertyMetadata::order);

		let case_insensitive = options.property_name_case_insensitive();
		let mut lookup = HashMap::with_capacity(properties.len());
		for (index, property) in properties.iter().enumerate() {
			if lookup.insert(normalize(&property.json_name, case_insensitive), index).is_some() {
				return Err(configuration_error(format!(
					"the JSON property name '{}' of {owner} collides with another property",
					property.json_name
				)));
			}
		}

		let constructor = match shape.constructor {
			Some(constructor) => {
				let mut candidates = properties
					.iter()
					.map(|property| BindingProperty {
						name: property.name,
						property_type: property.accessor.property_type(),
						extension_data: false,
					})
					.collect_vec();
				if let Some(extension) = &extension {
					candidates.push(BindingProperty {
						name: extension.name,
						property_type: extension.accessor.property_type(),
						extension_data: true,
					});
				}
				let parameters = constructor
					.parameters
					.iter()
					.map(|parameter| BindingParameter {
						name: parameter.name,
						parameter_type: parameter.parameter_type,
					})
					.collect_vec();
				let bound = bind_parameters(owner, &parameters, &candidates)?;

				let parameters = constructor
					.parameters
					.iter()
					.zip(bound)
					.enumerate()
					.map(|(index, (parameter, property))| {
						if let Some(property) = property {
							properties[property].parameter = Some(index);
						}
						ParameterMetadata {
							name: parameter.name,
							property,
							missing: parameter.missing,
						}
					})
					.collect();
				Some(ConstructorMetadata {
					parameters,
					invoke: constructor.invoke,
				})
			}
			None => None,
		};

		Ok(Self {
			type_key: shape.type_key,
			properties,
			lookup,
			case_insensitive,
			extension,
			create: shape.create,
			constructor,
			callbacks: shape.callbacks,
		})
	}

	#[must_use]
	pub fn type_key(&self) -> TypeKey {
		self.type_key
	}

	/// Properties in write order.
	#[must_use]
	pub fn properties(&self) -> &[PropertyMetadata] {
		&self.properties
	}

	/// Index of the property with the JSON name `name`.
	#[must_use]
	pub fn find(&self, name: &str) -> Option<usize> {
		if self.case_insensitive {
			self.lookup.get(&name.to_lowercase()).copied()
		} else {
			self.lookup.get(name).copied()
		}
	}

	#[must_use]
	pub fn extension(&self) -> Option<&ExtensionData> {
		self.extension.as_ref()
	}

	/// Constructor parameters; empty for types created by a default constructor.
	#[must_use]
	pub fn parameters(&self) -> &[ParameterMetadata] {
		self.constructor.as_ref().map_or(&[], |constructor| &constructor.parameters)
	}

	/// True if instances are created through a parameterized constructor.
	#[must_use]
	pub fn uses_constructor(&self) -> bool {
		self.constructor.is_some()
	}

	/// True if instances can be created at all.
	#[must_use]
	pub fn can_create(&self) -> bool {
		self.constructor.is_some() || self.create.is_some()
	}
}
