//! Declarations of object types, before any options are applied.

use super::{JsonType, PropertyAccessor, TypeKey, property::TypedAccessor};
use crate::{error::JsonError, options::NumberHandlingSet, serialization::BoxedValue};
use anyhow::Result;
use std::{any::Any, marker::PhantomData, sync::Arc};

pub(crate) type CreateFn = Arc<dyn Fn() -> BoxedValue + Send + Sync>;
pub(crate) type InvokeFn = Arc<dyn Fn(&mut ConstructorArgs) -> Result<BoxedValue> + Send + Sync>;
pub(crate) type Callback = Arc<dyn Fn(&dyn Any) + Send + Sync>;
pub(crate) type CallbackMut = Arc<dyn Fn(&mut dyn Any) + Send + Sync>;

/// A declared property.
pub struct PropertyShape {
	pub(crate) name: &'static str,
	pub(crate) json_name: Option<String>,
	pub(crate) ignored: bool,
	pub(crate) order: i32,
	pub(crate) extension_data: bool,
	pub(crate) number_handling: Option<NumberHandlingSet>,
	pub(crate) accessor: Arc<dyn PropertyAccessor>,
}

impl PropertyShape {
	fn with_accessor(name: &'static str, accessor: impl PropertyAccessor + 'static) -> Self {
		Self {
			name,
			json_name: None,
			ignored: false,
			order: 0,
			extension_data: false,
			number_handling: None,
			accessor: Arc::new(accessor),
		}
	}

	/// A field that can be read, set and borrowed mutably.
	pub fn field<T: JsonType, P: JsonType>(
		name: &'static str,
		getter: fn(&T) -> &P,
		getter_mut: fn(&mut T) -> &mut P,
		setter: fn(&mut T, P),
	) -> Self {
		Self::with_accessor(
			name,
			TypedAccessor {
				getter: Some(getter),
				getter_mut: Some(getter_mut),
				setter: Some(setter),
				marker: PhantomData,
			},
		)
	}

	/// A property without a setter. It is written, but skipped when reading unless a
	/// constructor parameter binds to it.
	pub fn read_only<T: JsonType, P: JsonType>(name: &'static str, getter: fn(&T) -> &P) -> Self {
		Self::with_accessor(
			name,
			TypedAccessor {
				getter: Some(getter),
				getter_mut: None,
				setter: None,
				marker: PhantomData,
			},
		)
	}

	/// A property that is only read from JSON.
	pub fn write_only<T: JsonType, P: JsonType>(name: &'static str, setter: fn(&mut T, P)) -> Self {
		Self::with_accessor(
			name,
			TypedAccessor::<T, P> {
				getter: None,
				getter_mut: None,
				setter: Some(setter),
				marker: PhantomData,
			},
		)
	}

	/// Use `json_name` in JSON, regardless of the naming policy.
	pub fn rename(mut self, json_name: impl Into<String>) -> Self {
		self.json_name = Some(json_name.into());
		self
	}

	pub fn ignore(mut self) -> Self {
		self.ignored = true;
		self
	}

	/// Properties are written in ascending order; equal orders keep the declaration order.
	pub fn order(mut self, order: i32) -> Self {
		self.order = order;
		self
	}

	/// Collect unmatched members here. The property must be a `BTreeMap` or `HashMap` of
	/// `String` to [`JsonElement`](crate::JsonElement), or a [`JsonObject`](crate::JsonObject).
	pub fn extension_data(mut self) -> Self {
		self.extension_data = true;
		self
	}

	pub fn number_handling(mut self, number_handling: NumberHandlingSet) -> Self {
		self.number_handling = Some(number_handling);
		self
	}

	#[must_use]
	pub fn name(&self) -> &'static str {
		self.name
	}
}

/// A declared constructor parameter.
#[derive(Clone)]
pub struct ParameterShape {
	pub(crate) name: &'static str,
	pub(crate) parameter_type: TypeKey,
	pub(crate) missing: fn() -> Option<BoxedValue>,
}

impl ParameterShape {
	/// A parameter of type `P`. If the input lacks it, [`JsonType::missing_value`] of `P` is used.
	#[must_use]
	pub fn new<P: JsonType>(name: &'static str) -> Self {
		Self {
			name,
			parameter_type: TypeKey::of::<P>(),
			missing: || P::missing_value().map(|value| Box::new(value) as BoxedValue),
		}
	}

	#[must_use]
	pub fn name(&self) -> &'static str {
		self.name
	}
}

/// Arguments collected for a constructor call, in parameter order.
pub struct ConstructorArgs {
	names: Vec<&'static str>,
	values: Vec<Option<BoxedValue>>,
}

impl ConstructorArgs {
	pub(crate) fn new(names: Vec<&'static str>, values: Vec<Option<BoxedValue>>) -> Self {
		Self { names, values }
	}

	/// Take argument `index` as `P`.
	pub fn take<P: Any>(&mut self, index: usize) -> Result<P> {
		let name = self.names.get(index).copied().unwrap_or("?");
		let value = self
			.values
			.get_mut(index)
			.and_then(Option::take)
			.ok_or_else(|| JsonError::format(format!("missing value for constructor parameter '{name}'")))?;
		value.downcast::<P>().map(|value| *value).map_err(|_| {
			JsonError::invalid_operation(format!(
				"constructor parameter '{name}' expected a value of type {}",
				std::any::type_name::<P>()
			))
			.into()
		})
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.values.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}
}

pub(crate) struct ConstructorShape {
	pub parameters: Vec<ParameterShape>,
	pub invoke: InvokeFn,
}

#[derive(Clone, Default)]
pub(crate) struct Callbacks {
	pub on_serializing: Option<Callback>,
	pub on_serialized: Option<Callback>,
	pub on_deserializing: Option<CallbackMut>,
	pub on_deserialized: Option<CallbackMut>,
}

/// The declared shape of an object type.
pub struct ObjectShape {
	pub(crate) type_key: TypeKey,
	pub(crate) create: Option<CreateFn>,
	pub(crate) constructor: Option<ConstructorShape>,
	pub(crate) properties: Vec<PropertyShape>,
	pub(crate) callbacks: Callbacks,
}

impl ObjectShape {
	#[must_use]
	pub fn type_key(&self) -> TypeKey {
		self.type_key
	}

	#[must_use]
	pub fn properties(&self) -> &[PropertyShape] {
		&self.properties
	}
}

/// Typed builder of an [`ObjectShape`].
///
/// ```
/// use jsonode_core::{JsonType, ObjectShapeBuilder, PropertyShape, TypeShape};
///
/// #[derive(Default)]
/// struct Point {
/// 	x: i32,
/// 	y: i32,
/// }
///
/// impl JsonType for Point {
/// 	fn type_shape() -> TypeShape {
/// 		ObjectShapeBuilder::<Point>::new()
/// 			.default_constructor(Point::default)
/// 			.property(PropertyShape::field("x", |p: &Point| &p.x, |p| &mut p.x, |p, v| p.x = v))
/// 			.property(PropertyShape::field("y", |p: &Point| &p.y, |p| &mut p.y, |p, v| p.y = v))
/// 			.build()
/// 	}
/// }
/// ```
pub struct ObjectShapeBuilder<T> {
	shape: ObjectShape,
	marker: PhantomData<fn() -> T>,
}

impl<T: JsonType> Default for ObjectShapeBuilder<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T: JsonType> ObjectShapeBuilder<T> {
	#[must_use]
	pub fn new() -> Self {
		Self {
			shape: ObjectShape {
				type_key: TypeKey::of::<T>(),
				create: None,
				constructor: None,
				properties: Vec::new(),
				callbacks: Callbacks::default(),
			},
			marker: PhantomData,
		}
	}

	/// Create instances with `create` and fill them through property setters.
	pub fn default_constructor(mut self, create: fn() -> T) -> Self {
		self.shape.create = Some(Arc::new(move || Box::new(create()) as BoxedValue));
		self
	}

	/// Create instances by calling `invoke` with arguments bound to `parameters`.
	/// Takes precedence over a default constructor.
	pub fn constructor(mut self, parameters: Vec<ParameterShape>, invoke: fn(&mut ConstructorArgs) -> Result<T>) -> Self {
		self.shape.constructor = Some(ConstructorShape {
			parameters,
			invoke: Arc::new(move |args: &mut ConstructorArgs| Ok(Box::new(invoke(args)?) as BoxedValue)),
		});
		self
	}

	pub fn property(mut self, property: PropertyShape) -> Self {
		self.shape.properties.push(property);
		self
	}

	pub fn on_serializing(mut self, callback: fn(&T)) -> Self {
		self.shape.callbacks.on_serializing = Some(typed_callback(callback));
		self
	}

	pub fn on_serialized(mut self, callback: fn(&T)) -> Self {
		self.shape.callbacks.on_serialized = Some(typed_callback(callback));
		self
	}

	pub fn on_deserializing(mut self, callback: fn(&mut T)) -> Self {
		self.shape.callbacks.on_deserializing = Some(typed_callback_mut(callback));
		self
	}

	pub fn on_deserialized(mut self, callback: fn(&mut T)) -> Self {
		self.shape.callbacks.on_deserialized = Some(typed_callback_mut(callback));
		self
	}

	#[must_use]
	pub fn build(self) -> super::TypeShape {
		super::TypeShape::Object(self.shape)
	}
}

fn typed_callback<T: Any>(callback: fn(&T)) -> Callback {
	Arc::new(move |value: &dyn Any| {
		if let Some(value) = value.downcast_ref::<T>() {
			callback(value);
		}
	})
}

fn typed_callback_mut<T: Any>(callback: fn(&mut T)) -> CallbackMut {
	Arc::new(move |value: &mut dyn Any| {
		if let Some(value) = value.downcast_mut::<T>() {
			callback(value);
		}
	})
}
