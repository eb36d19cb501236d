use super::{JsonType, TypeDescriptor, TypeKey};
use crate::{error::JsonError, options::SerializerOptions, serialization::BoxedValue};
use anyhow::Result;
use std::{any::Any, marker::PhantomData, sync::Arc};

/// Type-erased access to one property of an object.
pub trait PropertyAccessor: Send + Sync {
	fn property_type(&self) -> TypeKey;
	fn can_get(&self) -> bool;
	fn can_set(&self) -> bool;
	fn get<'a>(&self, owner: &'a dyn Any) -> Result<&'a dyn Any>;
	fn get_mut<'a>(&self, owner: &'a mut dyn Any) -> Result<&'a mut dyn Any>;
	fn set(&self, owner: &mut dyn Any, value: BoxedValue) -> Result<()>;
	/// Descriptor of the property type.
	fn descriptor(&self, options: &SerializerOptions) -> Result<Arc<TypeDescriptor>>;
}

/// Accessor of a property of type `P` on an owner of type `T`, built from plain functions.
pub(crate) struct TypedAccessor<T, P> {
	pub getter: Option<fn(&T) -> &P>,
	pub getter_mut: Option<fn(&mut T) -> &mut P>,
	pub setter: Option<fn(&mut T, P)>,
	pub marker: PhantomData<fn() -> (T, P)>,
}

fn owner_mismatch<T>() -> anyhow::Error {
	JsonError::invalid_operation(format!("property accessor expected an owner of type {}", std::any::type_name::<T>()))
		.into()
}

fn missing(what: &str, name: &str) -> anyhow::Error {
	JsonError::invalid_operation(format!("the property of type {name} has no {what}")).into()
}

impl<T: JsonType, P: JsonType> PropertyAccessor for TypedAccessor<T, P> {
	fn property_type(&self) -> TypeKey {
		TypeKey::of::<P>()
	}

	fn can_get(&self) -> bool {
		self.getter.is_some()
	}

	fn can_set(&self) -> bool {
		self.setter.is_some()
	}

	fn get<'a>(&self, owner: &'a dyn Any) -> Result<&'a dyn Any> {
		let owner = owner.downcast_ref::<T>().ok_or_else(owner_mismatch::<T>)?;
		let getter = self.getter.ok_or_else(|| missing("getter", std::any::type_name::<P>()))?;
		Ok(getter(owner))
	}

	fn get_mut<'a>(&self, owner: &'a mut dyn Any) -> Result<&'a mut dyn Any> {
		let owner = owner.downcast_mut::<T>().ok_or_else(owner_mismatch::<T>)?;
		let getter = self.getter_mut.ok_or_else(|| missing("mutable getter", std::any::type_name::<P>()))?;
		Ok(getter(owner))
	}

	fn set(&self, owner: &mut dyn Any, value: BoxedValue) -> Result<()> {
		let owner = owner.downcast_mut::<T>().ok_or_else(owner_mismatch::<T>)?;
		let setter = self.setter.ok_or_else(|| missing("setter", std::any::type_name::<P>()))?;
		let value = value.downcast::<P>().map_err(|_| {
			JsonError::invalid_operation(format!("expected a value of type {}", std::any::type_name::<P>()))
		})?;
		setter(owner, *value);
		Ok(())
	}

	fn descriptor(&self, options: &SerializerOptions) -> Result<Arc<TypeDescriptor>> {
		options.descriptor::<P>()
	}
}
