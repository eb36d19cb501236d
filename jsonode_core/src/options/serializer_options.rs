use super::{CommentHandling, DEFAULT_MAX_DEPTH, DocumentOptions, NamingPolicy, NodeOptions, NumberHandlingSet};
use crate::{
	error::JsonError,
	metadata::{DescriptorCache, JsonType, TypeDescriptor},
	serialization::JsonConverter,
	writer::WriterOptions,
};
use anyhow::Result;
use std::{fmt, sync::Arc};

pub const DEFAULT_BUFFER_SIZE: usize = 16 * 1024;

/// Serializer configuration.
///
/// Options own the cache of type descriptors. As soon as the first descriptor has been built
/// the options are locked and every setter fails with a `Configuration` error. A clone is an
/// unlocked copy with an empty cache.
pub struct SerializerOptions {
	property_naming_policy: Option<Arc<dyn NamingPolicy>>,
	dictionary_key_policy: Option<Arc<dyn NamingPolicy>>,
	property_name_case_insensitive: bool,
	number_handling: NumberHandlingSet,
	ignore_null_values: bool,
	ignore_read_only_properties: bool,
	write_indented: bool,
	max_depth: usize,
	default_buffer_size: usize,
	read_comment_handling: CommentHandling,
	allow_trailing_commas: bool,
	converters: Vec<Arc<dyn JsonConverter>>,
	cache: DescriptorCache,
}

impl Default for SerializerOptions {
	fn default() -> Self {
		Self {
			property_naming_policy: None,
			dictionary_key_policy: None,
			property_name_case_insensitive: false,
			number_handling: NumberHandlingSet::empty(),
			ignore_null_values: false,
			ignore_read_only_properties: false,
			write_indented: false,
			max_depth: DEFAULT_MAX_DEPTH,
			default_buffer_size: DEFAULT_BUFFER_SIZE,
			read_comment_handling: CommentHandling::Disallow,
			allow_trailing_commas: false,
			converters: Vec::new(),
			cache: DescriptorCache::default(),
		}
	}
}

impl Clone for SerializerOptions {
	fn clone(&self) -> Self {
		Self {
			property_naming_policy: self.property_naming_policy.clone(),
			dictionary_key_policy: self.dictionary_key_policy.clone(),
			property_name_case_insensitive: self.property_name_case_insensitive,
			number_handling: self.number_handling,
			ignore_null_values: self.ignore_null_values,
			ignore_read_only_properties: self.ignore_read_only_properties,
			write_indented: self.write_indented,
			max_depth: self.max_depth,
			default_buffer_size: self.default_buffer_size,
			read_comment_handling: self.read_comment_handling,
			allow_trailing_commas: self.allow_trailing_commas,
			converters: self.converters.clone(),
			cache: DescriptorCache::default(),
		}
	}
}

impl fmt::Debug for SerializerOptions {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SerializerOptions")
			.field("property_naming_policy", &self.property_naming_policy)
			.field("dictionary_key_policy", &self.dictionary_key_policy)
			.field("property_name_case_insensitive", &self.property_name_case_insensitive)
			.field("number_handling", &self.number_handling)
			.field("ignore_null_values", &self.ignore_null_values)
			.field("ignore_read_only_properties", &self.ignore_read_only_properties)
			.field("write_indented", &self.write_indented)
			.field("max_depth", &self.max_depth)
			.field("default_buffer_size", &self.default_buffer_size)
			.field("converters", &self.converters.len())
			.field("locked", &self.is_locked())
			.finish_non_exhaustive()
	}
}

macro_rules! setter {
	($(#[$meta:meta])* $name:ident, $field:ident: $t:ty) => {
		$(#[$meta])*
		pub fn $name(&mut self, value: $t) -> Result<()> {
			self.ensure_unlocked()?;
			self.$field = value;
			Ok(())
		}
	};
}

impl SerializerOptions {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// True once a descriptor has been built from these options.
	#[must_use]
	pub fn is_locked(&self) -> bool {
		self.cache.is_locked()
	}

	fn ensure_unlocked(&self) -> Result<()> {
		if self.is_locked() {
			return Err(JsonError::configuration(
				"serializer options cannot be changed once they have been used, clone them instead",
			)
			.into());
		}
		Ok(())
	}

	pub fn set_property_naming_policy(&mut self, policy: impl NamingPolicy + 'static) -> Result<()> {
		self.ensure_unlocked()?;
		self.property_naming_policy = Some(Arc::new(policy));
		Ok(())
	}

	pub fn set_dictionary_key_policy(&mut self, policy: impl NamingPolicy + 'static) -> Result<()> {
		self.ensure_unlocked()?;
		self.dictionary_key_policy = Some(Arc::new(policy));
		Ok(())
	}

	setter!(
		/// Match JSON member names to properties ignoring case.
		set_property_name_case_insensitive,
		property_name_case_insensitive: bool
	);
	setter!(set_number_handling, number_handling: NumberHandlingSet);
	setter!(
		/// Skip `None` properties when writing and `null` members when reading.
		set_ignore_null_values,
		ignore_null_values: bool
	);
	setter!(
		/// Skip properties without a setter when writing.
		set_ignore_read_only_properties,
		ignore_read_only_properties: bool
	);
	setter!(set_write_indented, write_indented: bool);
	setter!(set_max_depth, max_depth: usize);
	setter!(
		/// Output is flushed whenever more than 90% of this size is pending.
		set_default_buffer_size,
		default_buffer_size: usize
	);
	setter!(set_read_comment_handling, read_comment_handling: CommentHandling);
	setter!(set_allow_trailing_commas, allow_trailing_commas: bool);

	/// Register a converter. Converters are consulted in registration order, before the
	/// built-in conversion of a type.
	pub fn add_converter(&mut self, converter: impl JsonConverter + 'static) -> Result<()> {
		self.ensure_unlocked()?;
		self.converters.push(Arc::new(converter));
		Ok(())
	}

	#[must_use]
	pub fn property_naming_policy(&self) -> Option<&dyn NamingPolicy> {
		self.property_naming_policy.as_deref()
	}

	#[must_use]
	pub fn dictionary_key_policy(&self) -> Option<&dyn NamingPolicy> {
		self.dictionary_key_policy.as_deref()
	}

	#[must_use]
	pub fn property_name_case_insensitive(&self) -> bool {
		self.property_name_case_insensitive
	}

	#[must_use]
	pub fn number_handling(&self) -> NumberHandlingSet {
		self.number_handling
	}

	#[must_use]
	pub fn ignore_null_values(&self) -> bool {
		self.ignore_null_values
	}

	#[must_use]
	pub fn ignore_read_only_properties(&self) -> bool {
		self.ignore_read_only_properties
	}

	#[must_use]
	pub fn write_indented(&self) -> bool {
		self.write_indented
	}

	#[must_use]
	pub fn max_depth(&self) -> usize {
		self.max_depth
	}

	#[must_use]
	pub fn default_buffer_size(&self) -> usize {
		self.default_buffer_size
	}

	/// Pending output above this many bytes makes a write operation suspend.
	#[must_use]
	pub fn flush_threshold(&self) -> usize {
		self.default_buffer_size / 10 * 9
	}

	#[must_use]
	pub fn converters(&self) -> &[Arc<dyn JsonConverter>] {
		&self.converters
	}

	#[must_use]
	pub fn document_options(&self) -> DocumentOptions {
		DocumentOptions {
			comment_handling: self.read_comment_handling,
			allow_trailing_commas: self.allow_trailing_commas,
			max_depth: self.max_depth,
		}
	}

	#[must_use]
	pub fn writer_options(&self) -> WriterOptions {
		WriterOptions {
			indented: self.write_indented,
			max_depth: self.max_depth,
		}
	}

	/// Options for nodes created while reading.
	#[must_use]
	pub fn node_options(&self) -> Option<NodeOptions> {
		self.property_name_case_insensitive.then(NodeOptions::case_insensitive)
	}

	/// The descriptor of `T`, built on first use. Locks the options.
	pub fn descriptor<T: JsonType>(&self) -> Result<Arc<TypeDescriptor>> {
		self.cache.get_or_add::<T>(self)
	}

	/// Number of cached descriptors.
	#[must_use]
	pub fn cached_descriptors(&self) -> usize {
		self.cache.len()
	}
}
