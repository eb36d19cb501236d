use super::{IntoNode, JsonNode, json_node::NodeBody};
use crate::{
	element::JsonElement,
	error::JsonError,
	options::{NodeOptions, NumberHandlingSet},
	writer::JsonWriter,
};
use anyhow::Result;
use log::trace;
use parking_lot::RwLock;

/// Storage of an array node. Moves from `Snapshot` to `Materialized` once and never back.
pub(crate) enum ArrayStore {
	Snapshot(JsonElement),
	Materialized(Vec<Option<JsonNode>>),
}

/// An array node: an ordered list of children, `None` standing for `null`.
#[derive(Clone, Debug)]
pub struct JsonArray(pub(crate) JsonNode);

impl Default for JsonArray {
	fn default() -> Self {
		Self::new()
	}
}

fn out_of_range(index: usize, len: usize) -> anyhow::Error {
	JsonError::out_of_range(format!("index {index} is out of range for an array of length {len}")).into()
}

impl JsonArray {
	#[must_use]
	pub fn new() -> Self {
		Self::with_store(ArrayStore::Materialized(Vec::new()), None)
	}

	#[must_use]
	pub fn with_options(options: NodeOptions) -> Self {
		Self::with_store(ArrayStore::Materialized(Vec::new()), Some(options))
	}

	pub(crate) fn from_snapshot(element: JsonElement, options: Option<NodeOptions>) -> Self {
		Self::with_store(ArrayStore::Snapshot(element), options)
	}

	fn with_store(store: ArrayStore, options: Option<NodeOptions>) -> Self {
		Self(JsonNode::from_body(NodeBody::Array(RwLock::new(store)), options))
	}

	pub fn from_items<V: IntoNode>(items: impl IntoIterator<Item = V>) -> Result<Self> {
		let array = Self::new();
		for item in items {
			array.add(item)?;
		}
		Ok(array)
	}

	#[must_use]
	pub fn as_node(&self) -> &JsonNode {
		&self.0
	}

	#[must_use]
	pub fn into_node(self) -> JsonNode {
		self.0
	}

	fn store(&self) -> &RwLock<ArrayStore> {
		match &self.0.0.body {
			NodeBody::Array(store) => store,
			_ => unreachable!("a JsonArray always wraps an array node"),
		}
	}

	fn ensure_materialized(&self) -> Result<()> {
		if matches!(*self.store().read(), ArrayStore::Materialized(_)) {
			return Ok(());
		}
		let mut store = self.store().write();
		let items = match &*store {
			ArrayStore::Materialized(_) => return Ok(()),
			ArrayStore::Snapshot(element) => element
				.array_items()?
				.iter()
				.map(|item| {
					let child = JsonNode::from_element(item.clone(), None);
					if let Some(child) = &child {
						child.set_parent_unchecked(&self.0);
					}
					child
				})
				.collect::<Vec<_>>(),
		};
		trace!("materialized an array with {} items", items.len());
		*store = ArrayStore::Materialized(items);
		Ok(())
	}

	fn with_items<R>(&self, f: impl FnOnce(&Vec<Option<JsonNode>>) -> R) -> Result<R> {
		self.ensure_materialized()?;
		match &*self.store().read() {
			ArrayStore::Materialized(items) => Ok(f(items)),
			ArrayStore::Snapshot(_) => Err(JsonError::invalid_operation("the array is not materialized").into()),
		}
	}

	fn with_items_mut<R>(&self, f: impl FnOnce(&mut Vec<Option<JsonNode>>) -> R) -> Result<R> {
		self.ensure_materialized()?;
		match &mut *self.store().write() {
			ArrayStore::Materialized(items) => Ok(f(items)),
			ArrayStore::Snapshot(_) => Err(JsonError::invalid_operation("the array is not materialized").into()),
		}
	}

	pub fn len(&self) -> Result<usize> {
		self.with_items(Vec::len)
	}

	pub fn is_empty(&self) -> Result<bool> {
		Ok(self.len()? == 0)
	}

	/// The element at `index`; fails with `OutOfRange` if there is none.
	pub fn get(&self, index: usize) -> Result<Option<JsonNode>> {
		self.with_items(|items| items.get(index).cloned().ok_or_else(|| out_of_range(index, items.len())))?
	}

	/// Replace the element at `index`, detaching the previous one.
	pub fn set(&self, index: usize, value: impl IntoNode) -> Result<()> {
		let len = self.len()?;
		if index >= len {
			return Err(out_of_range(index, len));
		}
		let node = value.into_node();
		if let Some(node) = &node {
			node.attach_to(&self.0)?;
		}
		let old = self.with_items_mut(|items| std::mem::replace(&mut items[index], node))?;
		if let Some(old) = old {
			old.detach();
		}
		Ok(())
	}

	pub fn add(&self, value: impl IntoNode) -> Result<()> {
		let node = value.into_node();
		self.ensure_materialized()?;
		if let Some(node) = &node {
			node.attach_to(&self.0)?;
		}
		self.with_items_mut(|items| items.push(node))
	}

	/// Insert at `index`, shifting later elements; `index` may equal the length.
	pub fn insert(&self, index: usize, value: impl IntoNode) -> Result<()> {
		let len = self.len()?;
		if index > len {
			return Err(out_of_range(index, len));
		}
		let node = value.into_node();
		if let Some(node) = &node {
			node.attach_to(&self.0)?;
		}
		self.with_items_mut(|items| items.insert(index, node))
	}

	/// Remove the element at `index` and return it, detached.
	pub fn remove_at(&self, index: usize) -> Result<Option<JsonNode>> {
		let removed = self.with_items_mut(|items| {
			if index < items.len() {
				Ok(items.remove(index))
			} else {
				Err(out_of_range(index, items.len()))
			}
		})??;
		if let Some(node) = &removed {
			node.detach();
		}
		Ok(removed)
	}

	/// Remove `node` if it is an element of this array.
	pub fn remove(&self, node: &JsonNode) -> Result<bool> {
		match self.index_of(node)? {
			Some(index) => {
				self.remove_at(index)?;
				Ok(true)
			}
			None => Ok(false),
		}
	}

	pub fn index_of(&self, node: &JsonNode) -> Result<Option<usize>> {
		self.with_items(|items| items.iter().position(|item| item.as_ref().is_some_and(|item| item.ptr_eq(node))))
	}

	pub fn clear(&self) -> Result<()> {
		for node in self.with_items_mut(std::mem::take)?.into_iter().flatten() {
			node.detach();
		}
		Ok(())
	}

	pub fn items(&self) -> Result<Vec<Option<JsonNode>>> {
		self.with_items(Clone::clone)
	}

	pub(crate) fn position_of(&self, child: &JsonNode) -> Option<usize> {
		match &*self.store().read() {
			ArrayStore::Materialized(items) => items
				.iter()
				.position(|item| item.as_ref().is_some_and(|item| item.ptr_eq(child))),
			ArrayStore::Snapshot(_) => None,
		}
	}

	pub fn deep_clone(&self) -> Result<JsonArray> {
		if let ArrayStore::Snapshot(element) = &*self.store().read() {
			return Ok(Self::from_snapshot(element.clone(), self.0.options()));
		}
		let copy = Self::with_store(ArrayStore::Materialized(Vec::new()), self.0.options());
		for item in self.items()? {
			copy.add(item.map(|node| node.deep_clone()).transpose()?)?;
		}
		Ok(copy)
	}

	pub(crate) fn write_with(&self, writer: &mut JsonWriter, number_handling: NumberHandlingSet) -> Result<()> {
		match &*self.store().read() {
			ArrayStore::Snapshot(element) => element.write_to(writer),
			ArrayStore::Materialized(items) => {
				writer.write_start_array()?;
				for item in items {
					match item {
						Some(node) => node.write_with(writer, number_handling)?,
						None => writer.write_null()?,
					}
				}
				writer.write_end_array()
			}
		}
	}
}

impl From<JsonArray> for JsonNode {
	fn from(array: JsonArray) -> Self {
		array.0
	}
}

impl TryFrom<JsonNode> for JsonArray {
	type Error = anyhow::Error;

	fn try_from(node: JsonNode) -> Result<Self> {
		node.as_array()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{
		error::{ErrorKind, error_kind},
		node::JsonObject,
	};
	use pretty_assertions::assert_eq;

	fn json(array: &JsonArray) -> Result<String> {
		array.as_node().to_json_string()
	}

	#[test]
	fn test_build_and_shift() -> Result<()> {
		let array = JsonArray::from_items([1, 2, 3])?;
		array.insert(0, "first")?;
		array.insert(4, None::<JsonNode>)?;
		assert_eq!(json(&array)?, r#"["first",1,2,3,null]"#);
		let removed = array.remove_at(1)?.unwrap();
		assert!(removed.parent().is_none());
		assert_eq!(removed.get_value::<i32>()?, 1);
		assert_eq!(json(&array)?, r#"["first",2,3,null]"#);
		assert_eq!(array.get(1)?.unwrap().path(), "$[1]");
		Ok(())
	}

	#[test]
	fn test_out_of_range() -> Result<()> {
		let array = JsonArray::from_items([true])?;
		for err in [
			array.get(1).unwrap_err(),
			array.set(1, 0).unwrap_err(),
			array.insert(2, 0).unwrap_err(),
			array.remove_at(1).unwrap_err(),
		] {
			assert_eq!(error_kind(&err), Some(ErrorKind::OutOfRange));
		}
		assert_eq!(json(&array)?, "[true]");
		Ok(())
	}

	#[test]
	fn test_remove_by_node() -> Result<()> {
		let array = JsonArray::new();
		let object = JsonNode::from(JsonObject::new());
		array.add(1)?;
		array.add(object.clone())?;
		assert_eq!(array.index_of(&object)?, Some(1));
		assert!(array.remove(&object)?);
		assert!(!array.remove(&object)?);
		assert!(object.parent().is_none());
		Ok(())
	}

	#[test]
	fn test_rejected_node_leaves_array_unchanged() -> Result<()> {
		let array = JsonArray::new();
		let err = array.add(array.as_node().clone()).unwrap_err();
		assert_eq!(error_kind(&err), Some(ErrorKind::InvalidOperation));
		assert!(array.is_empty()?);

		let other = JsonArray::new();
		let child = JsonNode::from(JsonArray::new());
		other.add(child.clone())?;
		assert!(array.insert(0, child).is_err());
		assert!(array.is_empty()?);
		Ok(())
	}

	#[test]
	fn test_clear_detaches() -> Result<()> {
		let array = JsonArray::new();
		let child = JsonNode::from(JsonObject::new());
		array.add(child.clone())?;
		array.clear()?;
		assert!(child.parent().is_none());
		assert_eq!(json(&array)?, "[]");
		Ok(())
	}
}
