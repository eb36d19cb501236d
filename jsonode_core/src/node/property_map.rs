use super::JsonNode;
use crate::json_bail;
use anyhow::Result;
use indexmap::IndexMap;
use parking_lot::Mutex;
use std::borrow::Cow;

/// Insertion-ordered children of a materialized object.
///
/// Entries are keyed by the normalized name (lower case when comparing case-insensitively)
/// and keep the original spelling alongside the child. The index of the most recent lookup
/// is cached and dropped on every mutation.
#[derive(Debug)]
pub(crate) struct PropertyMap {
	case_insensitive: bool,
	entries: IndexMap<String, (String, Option<JsonNode>)>,
	last_index: Mutex<Option<usize>>,
}

impl PropertyMap {
	pub fn new(case_insensitive: bool) -> Self {
		Self {
			case_insensitive,
			entries: IndexMap::new(),
			last_index: Mutex::new(None),
		}
	}

	pub fn is_case_insensitive(&self) -> bool {
		self.case_insensitive
	}

	fn normalize<'a>(&self, key: &'a str) -> Cow<'a, str> {
		if self.case_insensitive {
			Cow::Owned(key.to_lowercase())
		} else {
			Cow::Borrowed(key)
		}
	}

	fn invalidate(&mut self) {
		*self.last_index.get_mut() = None;
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn get(&self, key: &str) -> Option<&Option<JsonNode>> {
		let normalized = self.normalize(key);
		let mut last_index = self.last_index.lock();
		if let Some(index) = *last_index
			&& let Some((cached_key, (_, value))) = self.entries.get_index(index)
			&& *cached_key == *normalized
		{
			return Some(value);
		}
		let (index, _, (_, value)) = self.entries.get_full(normalized.as_ref())?;
		*last_index = Some(index);
		Some(value)
	}

	pub fn contains_key(&self, key: &str) -> bool {
		self.entries.contains_key(self.normalize(key).as_ref())
	}

	/// Add a new entry; fails if the key is already present.
	pub fn insert_new(&mut self, key: String, value: Option<JsonNode>) -> Result<()> {
		let normalized = self.normalize(&key).into_owned();
		if self.entries.contains_key(&normalized) {
			json_bail!(Argument, "an item with the key '{key}' has already been added");
		}
		self.invalidate();
		self.entries.insert(normalized, (key, value));
		Ok(())
	}

	/// Replace the value of an existing entry (keeping its spelling) or append a new one.
	/// Returns the replaced value.
	pub fn set(&mut self, key: String, value: Option<JsonNode>) -> Option<Option<JsonNode>> {
		self.invalidate();
		let normalized = self.normalize(&key).into_owned();
		match self.entries.get_mut(&normalized) {
			Some((_, slot)) => Some(std::mem::replace(slot, value)),
			None => {
				self.entries.insert(normalized, (key, value));
				None
			}
		}
	}

	/// Remove an entry, keeping the order of the others.
	pub fn remove(&mut self, key: &str) -> Option<(String, Option<JsonNode>)> {
		self.invalidate();
		let normalized = self.normalize(key);
		self.entries.shift_remove(normalized.as_ref())
	}

	pub fn drain(&mut self) -> Vec<(String, Option<JsonNode>)> {
		self.invalidate();
		self.entries.drain(..).map(|(_, entry)| entry).collect()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &Option<JsonNode>)> {
		self.entries.values().map(|(key, value)| (key.as_str(), value))
	}

	/// The key under which `child` is stored.
	pub fn key_of(&self, child: &JsonNode) -> Option<&str> {
		self.iter()
			.find(|(_, value)| value.as_ref().is_some_and(|node| node.ptr_eq(child)))
			.map(|(key, _)| key)
	}
}
