use super::{JsonType, TypeDescriptor};
use crate::options::SerializerOptions;
use anyhow::Result;
use dashmap::DashMap;
use log::{debug, trace};
use std::{
	any::TypeId,
	sync::{
		Arc,
		atomic::{AtomicBool, Ordering},
	},
};

/// Concurrent get-or-add cache of type descriptors, owned by one set of options.
///
/// Descriptors are built outside the map's locks, so building may recurse into the cache for
/// property types. When two threads race to add the same type, the first insert wins and both
/// get the same descriptor.
#[derive(Default)]
pub struct DescriptorCache {
	descriptors: DashMap<TypeId, Arc<TypeDescriptor>>,
	locked: AtomicBool,
}

impl DescriptorCache {
	pub fn get_or_add<T: JsonType>(&self, options: &SerializerOptions) -> Result<Arc<TypeDescriptor>> {
		if !self.locked.swap(true, Ordering::AcqRel) {
			debug!("serializer options locked");
		}
		let id = TypeId::of::<T>();
		if let Some(descriptor) = self.descriptors.get(&id) {
			return Ok(descriptor.clone());
		}
		let descriptor = Arc::new(TypeDescriptor::build::<T>(options)?);
		trace!("built the descriptor of {}", descriptor.type_key().name());
		Ok(self.descriptors.entry(id).or_insert(descriptor).clone())
	}

	#[must_use]
	pub fn is_locked(&self) -> bool {
		self.locked.load(Ordering::Acquire)
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.descriptors.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.descriptors.is_empty()
	}
}
