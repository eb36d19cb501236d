use super::ObjectShape;
use crate::{options::SerializerOptions, serialization::JsonConverter};
use anyhow::Result;
use std::{
	any::{Any, TypeId},
	fmt,
	hash::{Hash, Hasher},
	sync::Arc,
};

/// Identity of a Rust type, with its name for messages.
#[derive(Clone, Copy)]
pub struct TypeKey {
	id: TypeId,
	name: &'static str,
}

impl TypeKey {
	#[must_use]
	pub fn of<T: Any + ?Sized>() -> Self {
		Self {
			id: TypeId::of::<T>(),
			name: std::any::type_name::<T>(),
		}
	}

	#[must_use]
	pub fn id(&self) -> TypeId {
		self.id
	}

	#[must_use]
	pub fn name(&self) -> &'static str {
		self.name
	}
}

impl PartialEq for TypeKey {
	fn eq(&self, other: &Self) -> bool {
		self.id == other.id
	}
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.id.hash(state);
	}
}

impl fmt::Debug for TypeKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name)
	}
}

/// Builds a converter once the options are known, typically one that wraps the converters of
/// other types.
pub type ConverterFactory = fn(&SerializerOptions) -> Result<Arc<dyn JsonConverter>>;

/// How values of a type are converted.
pub enum TypeShape {
	/// A converter handles the type as a whole.
	Converter(Arc<dyn JsonConverter>),
	Factory(ConverterFactory),
	/// A JSON object with declared properties.
	Object(ObjectShape),
	Unsupported,
}

/// A type the serializer can handle.
///
/// Implemented for primitives, strings, dates and times, UUIDs, `Option`, sequences, string
/// keyed maps and the DOM types. User types implement it with `#[derive(JsonType)]` or by hand
/// with an [`ObjectShapeBuilder`](super::ObjectShapeBuilder).
pub trait JsonType: Any + Send + Sized {
	fn type_shape() -> TypeShape;

	/// The value of a constructor argument that is missing from the input.
	fn missing_value() -> Option<Self> {
		None
	}
}
