use super::{IntoNode, JsonNode, json_node::NodeBody, property_map::PropertyMap};
use crate::{
	element::JsonElement,
	error::JsonError,
	options::{NodeOptions, NumberHandlingSet},
	writer::JsonWriter,
};
use anyhow::Result;
use log::trace;
use parking_lot::RwLock;

/// Storage of an object node. Moves from `Snapshot` or `Pending` to `Materialized` once and
/// never back.
pub(crate) enum ObjectStore {
	/// Created empty; the map is built on first access so it picks up inherited options.
	Pending,
	/// Backed by a parsed element.
	Snapshot(JsonElement),
	Materialized(PropertyMap),
}

/// An object node: insertion-ordered members keyed by unique strings.
#[derive(Clone, Debug)]
pub struct JsonObject(pub(crate) JsonNode);

impl Default for JsonObject {
	fn default() -> Self {
		Self::new()
	}
}

impl JsonObject {
	#[must_use]
	pub fn new() -> Self {
		Self::with_store(ObjectStore::Pending, None)
	}

	#[must_use]
	pub fn with_options(options: NodeOptions) -> Self {
		Self::with_store(ObjectStore::Pending, Some(options))
	}

	pub(crate) fn from_snapshot(element: JsonElement, options: Option<NodeOptions>) -> Self {
		Self::with_store(ObjectStore::Snapshot(element), options)
	}

	fn with_store(store: ObjectStore, options: Option<NodeOptions>) -> Self {
		Self(JsonNode::from_body(NodeBody::Object(RwLock::new(store)), options))
	}

	/// Build an object from key/value pairs; fails on duplicate keys.
	pub fn from_entries<K: Into<String>, V: IntoNode>(entries: impl IntoIterator<Item = (K, V)>) -> Result<Self> {
		let object = Self::new();
		for (key, value) in entries {
			object.add(key, value)?;
		}
		Ok(object)
	}

	#[must_use]
	pub fn as_node(&self) -> &JsonNode {
		&self.0
	}

	#[must_use]
	pub fn into_node(self) -> JsonNode {
		self.0
	}

	fn store(&self) -> &RwLock<ObjectStore> {
		match &self.0.0.body {
			NodeBody::Object(store) => store,
			_ => unreachable!("a JsonObject always wraps an object node"),
		}
	}

	fn ensure_materialized(&self) -> Result<()> {
		if matches!(*self.store().read(), ObjectStore::Materialized(_)) {
			return Ok(());
		}
		let mut store = self.store().write();
		let case_insensitive = self.0.options().unwrap_or_default().property_name_case_insensitive;
		let map = match &*store {
			ObjectStore::Materialized(_) => return Ok(()),
			ObjectStore::Pending => PropertyMap::new(case_insensitive),
			ObjectStore::Snapshot(element) => {
				let mut map = PropertyMap::new(case_insensitive);
				for (key, value) in element.object_entries()? {
					let child = JsonNode::from_element(value.clone(), None);
					if let Some(child) = &child {
						child.set_parent_unchecked(&self.0);
					}
					map.insert_new(key.clone(), child)?;
				}
				trace!("materialized an object with {} members", map.len());
				map
			}
		};
		*store = ObjectStore::Materialized(map);
		Ok(())
	}

	fn with_map<R>(&self, f: impl FnOnce(&PropertyMap) -> R) -> Result<R> {
		self.ensure_materialized()?;
		match &*self.store().read() {
			ObjectStore::Materialized(map) => Ok(f(map)),
			_ => Err(JsonError::invalid_operation("the object is not materialized").into()),
		}
	}

	fn with_map_mut<R>(&self, f: impl FnOnce(&mut PropertyMap) -> R) -> Result<R> {
		self.ensure_materialized()?;
		match &mut *self.store().write() {
			ObjectStore::Materialized(map) => Ok(f(map)),
			_ => Err(JsonError::invalid_operation("the object is not materialized").into()),
		}
	}

	/// True if keys are compared case-insensitively. Materializes the object.
	pub fn is_case_insensitive(&self) -> Result<bool> {
		self.with_map(PropertyMap::is_case_insensitive)
	}

	pub fn len(&self) -> Result<usize> {
		self.with_map(PropertyMap::len)
	}

	pub fn is_empty(&self) -> Result<bool> {
		Ok(self.len()? == 0)
	}

	pub fn contains_key(&self, key: &str) -> Result<bool> {
		self.with_map(|map| map.contains_key(key))
	}

	/// The member named `key`; `None` if it is missing or `null`.
	pub fn get(&self, key: &str) -> Result<Option<JsonNode>> {
		self.with_map(|map| map.get(key).cloned().flatten())
	}

	/// Add a new member; fails with an `Argument` error if `key` exists.
	pub fn add(&self, key: impl Into<String>, value: impl IntoNode) -> Result<()> {
		let key = key.into();
		let node = value.into_node();
		if self.contains_key(&key)? {
			return Err(JsonError::argument(format!("an item with the key '{key}' has already been added")).into());
		}
		if let Some(node) = &node {
			node.attach_to(&self.0)?;
		}
		let result = self.with_map_mut(|map| map.insert_new(key, node.clone())).and_then(|r| r);
		if result.is_err()
			&& let Some(node) = &node
		{
			node.detach();
		}
		result
	}

	/// Set a member, replacing (and detaching) the previous value.
	pub fn set(&self, key: &str, value: impl IntoNode) -> Result<()> {
		let node = value.into_node();
		self.ensure_materialized()?;
		if let Some(node) = &node {
			node.attach_to(&self.0)?;
		}
		if let Some(Some(old)) = self.with_map_mut(|map| map.set(key.to_string(), node))? {
			old.detach();
		}
		Ok(())
	}

	/// Remove a member. Returns `false` if there was none.
	pub fn remove(&self, key: &str) -> Result<bool> {
		let removed = self.with_map_mut(|map| map.remove(key))?;
		Ok(match removed {
			Some((_, value)) => {
				if let Some(node) = value {
					node.detach();
				}
				true
			}
			None => false,
		})
	}

	pub fn clear(&self) -> Result<()> {
		for (_, value) in self.with_map_mut(PropertyMap::drain)? {
			if let Some(node) = value {
				node.detach();
			}
		}
		Ok(())
	}

	pub fn keys(&self) -> Result<Vec<String>> {
		self.with_map(|map| map.iter().map(|(key, _)| key.to_string()).collect())
	}

	pub fn entries(&self) -> Result<Vec<(String, Option<JsonNode>)>> {
		self.with_map(|map| map.iter().map(|(key, value)| (key.to_string(), value.clone())).collect())
	}

	pub(crate) fn key_of(&self, child: &JsonNode) -> Option<String> {
		match &*self.store().read() {
			ObjectStore::Materialized(map) => map.key_of(child).map(str::to_string),
			_ => None,
		}
	}

	pub fn deep_clone(&self) -> Result<JsonObject> {
		let copy = Self::with_store(ObjectStore::Pending, self.0.options());
		if let ObjectStore::Snapshot(element) = &*self.store().read() {
			*copy.store().write() = ObjectStore::Snapshot(element.clone());
			return Ok(copy);
		}
		for (key, value) in self.entries()? {
			copy.add(key, value.map(|node| node.deep_clone()).transpose()?)?;
		}
		Ok(copy)
	}

	pub(crate) fn write_with(&self, writer: &mut JsonWriter, number_handling: NumberHandlingSet) -> Result<()> {
		match &*self.store().read() {
			ObjectStore::Snapshot(element) => element.write_to(writer),
			ObjectStore::Pending => {
				writer.write_start_object()?;
				writer.write_end_object()
			}
			ObjectStore::Materialized(map) => {
				writer.write_start_object()?;
				for (key, value) in map.iter() {
					writer.write_property_name(key)?;
					match value {
						Some(node) => node.write_with(writer, number_handling)?,
						None => writer.write_null()?,
					}
				}
				writer.write_end_object()
			}
		}
	}
}

impl From<JsonObject> for JsonNode {
	fn from(object: JsonObject) -> Self {
		object.0
	}
}

impl TryFrom<JsonNode> for JsonObject {
	type Error = anyhow::Error;

	fn try_from(node: JsonNode) -> Result<Self> {
		node.as_object()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{
		error::{ErrorKind, error_kind},
		node::JsonArray,
	};
	use pretty_assertions::assert_eq;

	#[test]
	fn test_build() -> Result<()> {
		let object = JsonObject::from_entries([("name", Some(JsonNode::from(JsonArray::new())))])?;
		object.add("count", 3)?;
		object.add("missing", None::<JsonNode>)?;
		object.set("name", "jsonode")?;
		assert_eq!(object.keys()?, vec!["name", "count", "missing"]);
		assert_eq!(object.as_node().to_json_string()?, r#"{"name":"jsonode","count":3,"missing":null}"#);
		assert!(object.contains_key("missing")?);
		assert!(object.get("missing")?.is_none());
		Ok(())
	}

	#[test]
	fn test_duplicate_add() -> Result<()> {
		let object = JsonObject::new();
		object.add("a", 1)?;
		let child = JsonNode::from(JsonArray::new());
		let err = object.add("a", child.clone()).unwrap_err();
		assert_eq!(error_kind(&err), Some(ErrorKind::Argument));
		// the rejected node stays free
		assert!(child.parent().is_none());
		Ok(())
	}

	#[test]
	fn test_remove_and_clear_detach() -> Result<()> {
		let object = JsonObject::new();
		let a = JsonNode::from(JsonObject::new());
		let b = JsonNode::from(JsonArray::new());
		object.add("a", a.clone())?;
		object.add("b", b.clone())?;
		assert!(object.remove("a")?);
		assert!(!object.remove("a")?);
		assert!(a.parent().is_none());
		assert!(b.parent().is_some());
		object.clear()?;
		assert!(b.parent().is_none());
		assert!(object.is_empty()?);
		Ok(())
	}

	#[test]
	fn test_set_replaces_and_detaches() -> Result<()> {
		let object = JsonObject::new();
		let first = JsonNode::from(JsonArray::new());
		object.set("x", first.clone())?;
		object.set("x", true)?;
		assert!(first.parent().is_none());
		assert_eq!(object.len()?, 1);
		Ok(())
	}

	#[test]
	fn test_inherits_case_insensitivity_when_first_used() -> Result<()> {
		let parent = JsonObject::with_options(NodeOptions::case_insensitive());
		let child = JsonObject::new();
		parent.add("child", child.clone())?;
		child.add("Key", 1)?;
		assert!(child.is_case_insensitive()?);
		assert!(child.contains_key("KEY")?);
		assert!(!JsonObject::new().is_case_insensitive()?);
		Ok(())
	}

	#[test]
	fn test_remove_keeps_order() -> Result<()> {
		let object = JsonObject::from_entries([("a", 1), ("b", 2), ("c", 3)])?;
		object.remove("b")?;
		object.add("b", 4)?;
		assert_eq!(object.as_node().to_json_string()?, r#"{"a":1,"c":3,"b":4}"#);
		Ok(())
	}
}
