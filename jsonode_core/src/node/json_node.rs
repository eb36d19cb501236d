use super::{
	FromNodeValue, JsonArray, JsonObject, JsonValue, ValuePayload,
	array::ArrayStore,
	object::ObjectStore,
	path::{self, Segment},
	value::write_payload,
};
use crate::{
	element::{JsonElement, ValueKind},
	error::JsonError,
	options::{DocumentOptions, NodeOptions, NumberHandlingSet},
	writer::{JsonWriter, WriterOptions},
};
use anyhow::Result;
use jsonode_derive::context;
use parking_lot::{Mutex, RwLock};
use std::{
	fmt,
	io::Read,
	sync::{Arc, Weak},
};

/// Nesting limit when writing a document tree. Trees built in code are not bound by the
/// parser's depth limit.
pub(crate) const NODE_WRITE_MAX_DEPTH: usize = 1000;

pub(crate) struct NodeCell {
	parent: Mutex<Weak<NodeCell>>,
	options: Option<NodeOptions>,
	pub(crate) body: NodeBody,
}

pub(crate) enum NodeBody {
	Object(RwLock<ObjectStore>),
	Array(RwLock<ArrayStore>),
	Value(ValuePayload),
}

/// A node of the mutable JSON document model: an object, an array or a value.
///
/// `JsonNode` is a shared handle; cloning it does not copy the tree, use
/// [`deep_clone`](Self::deep_clone) for that. A node has at most one parent and a tree never
/// contains cycles: both are checked whenever a node is attached.
///
/// JSON `null` is not a node. Where a child may be `null` the API uses `Option<JsonNode>`.
#[derive(Clone)]
pub struct JsonNode(pub(crate) Arc<NodeCell>);

impl JsonNode {
	pub(crate) fn from_body(body: NodeBody, options: Option<NodeOptions>) -> Self {
		Self(Arc::new(NodeCell {
			parent: Mutex::new(Weak::new()),
			options,
			body,
		}))
	}

	/// Wrap a parsed element. Containers keep the element until they are first accessed.
	#[must_use]
	pub fn from_element(element: JsonElement, options: Option<NodeOptions>) -> Option<JsonNode> {
		match element.value_kind() {
			ValueKind::Null | ValueKind::Undefined => None,
			ValueKind::Object => Some(JsonObject::from_snapshot(element, options).into()),
			ValueKind::Array => Some(JsonArray::from_snapshot(element, options).into()),
			_ => Some(JsonValue::from_payload(ValuePayload::Element(element), options).into()),
		}
	}

	/// Parse JSON text with default options. The literal `null` yields `None`.
	pub fn parse_str(json: &str) -> Result<Option<JsonNode>> {
		Self::parse(json, None, DocumentOptions::default())
	}

	pub fn parse(
		json: &str,
		node_options: Option<NodeOptions>,
		document_options: DocumentOptions,
	) -> Result<Option<JsonNode>> {
		Self::parse_slice(json.as_bytes(), node_options, document_options)
	}

	pub fn parse_slice(
		json: &[u8],
		node_options: Option<NodeOptions>,
		document_options: DocumentOptions,
	) -> Result<Option<JsonNode>> {
		let element = JsonElement::parse_slice(json, document_options)?;
		Ok(Self::from_element(element, node_options))
	}

	/// Parse a whole stream.
	#[context("while parsing a JSON document from a stream")]
	pub fn parse_reader(
		mut reader: impl Read,
		node_options: Option<NodeOptions>,
		document_options: DocumentOptions,
	) -> Result<Option<JsonNode>> {
		let mut buffer = Vec::new();
		reader.read_to_end(&mut buffer)?;
		Self::parse_slice(&buffer, node_options, document_options)
	}

	/// True if both handles refer to the same node.
	#[must_use]
	pub fn ptr_eq(&self, other: &JsonNode) -> bool {
		Arc::ptr_eq(&self.0, &other.0)
	}

	#[must_use]
	pub fn parent(&self) -> Option<JsonNode> {
		self.0.parent.lock().upgrade().map(JsonNode)
	}

	#[must_use]
	pub fn root(&self) -> JsonNode {
		let mut current = self.clone();
		while let Some(parent) = current.parent() {
			current = parent;
		}
		current
	}

	/// The options of this node or of its nearest ancestor that has options.
	#[must_use]
	pub fn options(&self) -> Option<NodeOptions> {
		if self.0.options.is_some() {
			return self.0.options;
		}
		let mut current = self.parent();
		while let Some(node) = current {
			if node.0.options.is_some() {
				return node.0.options;
			}
			current = node.parent();
		}
		None
	}

	/// Make `parent` the parent of this node. Nothing changes if this fails.
	pub(crate) fn attach_to(&self, parent: &JsonNode) -> Result<()> {
		if self.parent().is_some() {
			return Err(JsonError::invalid_operation("the node already has a parent").into());
		}
		let mut current = Some(parent.clone());
		while let Some(node) = current {
			if node.ptr_eq(self) {
				return Err(JsonError::invalid_operation("adding the node would create a cycle").into());
			}
			current = node.parent();
		}
		*self.0.parent.lock() = Arc::downgrade(&parent.0);
		Ok(())
	}

	/// Set the parent of a freshly created node.
	pub(crate) fn set_parent_unchecked(&self, parent: &JsonNode) {
		*self.0.parent.lock() = Arc::downgrade(&parent.0);
	}

	pub(crate) fn detach(&self) {
		*self.0.parent.lock() = Weak::new();
	}

	#[must_use]
	pub fn value_kind(&self) -> ValueKind {
		match &self.0.body {
			NodeBody::Object(_) => ValueKind::Object,
			NodeBody::Array(_) => ValueKind::Array,
			NodeBody::Value(payload) => payload.value_kind(),
		}
	}

	#[must_use]
	pub fn is_object(&self) -> bool {
		matches!(self.0.body, NodeBody::Object(_))
	}

	#[must_use]
	pub fn is_array(&self) -> bool {
		matches!(self.0.body, NodeBody::Array(_))
	}

	#[must_use]
	pub fn is_value(&self) -> bool {
		matches!(self.0.body, NodeBody::Value(_))
	}

	fn wrong_variant(&self, expected: &str) -> anyhow::Error {
		JsonError::invalid_operation(format!(
			"the node is of kind {}, expected {expected}",
			self.value_kind()
		))
		.into()
	}

	pub fn as_object(&self) -> Result<JsonObject> {
		if self.is_object() {
			Ok(JsonObject(self.clone()))
		} else {
			Err(self.wrong_variant("an object"))
		}
	}

	pub fn as_array(&self) -> Result<JsonArray> {
		if self.is_array() {
			Ok(JsonArray(self.clone()))
		} else {
			Err(self.wrong_variant("an array"))
		}
	}

	pub fn as_value(&self) -> Result<JsonValue> {
		if self.is_value() {
			Ok(JsonValue(self.clone()))
		} else {
			Err(self.wrong_variant("a value"))
		}
	}

	/// Object member lookup. A missing member is `Ok(None)`, like a `null` member.
	pub fn get(&self, key: &str) -> Result<Option<JsonNode>> {
		self.as_object()?.get(key)
	}

	pub fn set(&self, key: &str, value: impl IntoNode) -> Result<()> {
		self.as_object()?.set(key, value)
	}

	/// Array element lookup; fails with `OutOfRange` for an invalid index.
	pub fn at(&self, index: usize) -> Result<Option<JsonNode>> {
		self.as_array()?.get(index)
	}

	pub fn set_at(&self, index: usize, value: impl IntoNode) -> Result<()> {
		self.as_array()?.set(index, value)
	}

	pub fn get_value<T: FromNodeValue>(&self) -> Result<T> {
		self.as_value()?.get_value()
	}

	/// How this node's parent reaches it.
	fn segment(&self, parent: &JsonNode) -> Option<Segment> {
		match &parent.0.body {
			NodeBody::Object(_) => JsonObject(parent.clone()).key_of(self).map(Segment::Property),
			NodeBody::Array(_) => JsonArray(parent.clone()).position_of(self).map(Segment::Index),
			NodeBody::Value(_) => None,
		}
	}

	/// The path from the root to this node, e.g. `$.Child[2]`.
	#[must_use]
	pub fn path(&self) -> String {
		let mut segments = Vec::new();
		let mut current = self.clone();
		while let Some(parent) = current.parent() {
			if let Some(segment) = current.segment(&parent) {
				segments.push(segment);
			}
			current = parent;
		}
		path::build(segments.iter().rev())
	}

	/// Replace this node in its parent by `value`.
	pub fn replace_with(&self, value: impl IntoNode) -> Result<()> {
		let Some(parent) = self.parent() else {
			return Err(JsonError::invalid_operation("the node has no parent").into());
		};
		match self.segment(&parent) {
			Some(Segment::Property(key)) => JsonObject(parent).set(&key, value),
			Some(Segment::Index(index)) => JsonArray(parent).set(index, value),
			None => Err(JsonError::invalid_operation("the node was not found in its parent").into()),
		}
	}

	/// A copy of the whole subtree without a parent. Parsed snapshots are shared, they never change.
	pub fn deep_clone(&self) -> Result<JsonNode> {
		match &self.0.body {
			NodeBody::Object(_) => Ok(JsonObject(self.clone()).deep_clone()?.into()),
			NodeBody::Array(_) => Ok(JsonArray(self.clone()).deep_clone()?.into()),
			NodeBody::Value(payload) => Ok(JsonValue::from_payload(payload.clone(), self.0.options).into()),
		}
	}

	/// Structural equality. Object member order is ignored, values compare by their JSON text.
	pub fn deep_equals(&self, other: &JsonNode) -> Result<bool> {
		if self.ptr_eq(other) {
			return Ok(true);
		}
		match (&self.0.body, &other.0.body) {
			(NodeBody::Object(_), NodeBody::Object(_)) => {
				let (a, b) = (JsonObject(self.clone()), JsonObject(other.clone()));
				if a.len()? != b.len()? {
					return Ok(false);
				}
				for (key, value) in a.entries()? {
					if !b.contains_key(&key)? || !option_deep_equals(value.as_ref(), b.get(&key)?.as_ref())? {
						return Ok(false);
					}
				}
				Ok(true)
			}
			(NodeBody::Array(_), NodeBody::Array(_)) => {
				let (a, b) = (JsonArray(self.clone()).items()?, JsonArray(other.clone()).items()?);
				if a.len() != b.len() {
					return Ok(false);
				}
				for (x, y) in a.iter().zip(b.iter()) {
					if !option_deep_equals(x.as_ref(), y.as_ref())? {
						return Ok(false);
					}
				}
				Ok(true)
			}
			(NodeBody::Value(_), NodeBody::Value(_)) => Ok(self.to_json_string()? == other.to_json_string()?),
			_ => Ok(false),
		}
	}

	pub fn write_to(&self, writer: &mut JsonWriter) -> Result<()> {
		self.write_with(writer, NumberHandlingSet::empty())
	}

	pub(crate) fn write_with(&self, writer: &mut JsonWriter, number_handling: NumberHandlingSet) -> Result<()> {
		match &self.0.body {
			NodeBody::Object(_) => JsonObject(self.clone()).write_with(writer, number_handling),
			NodeBody::Array(_) => JsonArray(self.clone()).write_with(writer, number_handling),
			NodeBody::Value(payload) => write_payload(writer, payload, number_handling),
		}
	}

	fn write_string(&self, indented: bool) -> Result<String> {
		let mut writer = JsonWriter::new(WriterOptions {
			indented,
			max_depth: NODE_WRITE_MAX_DEPTH,
		});
		self.write_to(&mut writer)?;
		Ok(writer.into_string())
	}

	/// Compact JSON text.
	pub fn to_json_string(&self) -> Result<String> {
		self.write_string(false)
	}

	/// Indented JSON text.
	pub fn to_json_string_indented(&self) -> Result<String> {
		self.write_string(true)
	}
}

/// Compare two possibly-null children.
pub(crate) fn option_deep_equals(a: Option<&JsonNode>, b: Option<&JsonNode>) -> Result<bool> {
	match (a, b) {
		(None, None) => Ok(true),
		(Some(a), Some(b)) => a.deep_equals(b),
		_ => Ok(false),
	}
}

/// Strings print their text, everything else prints indented JSON.
impl fmt::Display for JsonNode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if let NodeBody::Value(payload) = &self.0.body
			&& let Some(text) = payload.display_text()
		{
			return f.write_str(&text);
		}
		let text = self.to_json_string_indented().map_err(|_| fmt::Error)?;
		f.write_str(&text)
	}
}

impl fmt::Debug for JsonNode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.to_json_string() {
			Ok(text) => write!(f, "JsonNode({text})"),
			Err(err) => write!(f, "JsonNode(<{err}>)"),
		}
	}
}

/// Anything that can become a child of an object or array: nodes and primitive values.
/// `None` becomes JSON `null`.
pub trait IntoNode {
	fn into_node(self) -> Option<JsonNode>;
}

impl IntoNode for JsonNode {
	fn into_node(self) -> Option<JsonNode> {
		Some(self)
	}
}

impl<T: IntoNode> IntoNode for Option<T> {
	fn into_node(self) -> Option<JsonNode> {
		self.and_then(IntoNode::into_node)
	}
}

macro_rules! impl_into_node_for_handle {
	($($t:ty),+) => {
		$(
			impl IntoNode for $t {
				fn into_node(self) -> Option<JsonNode> {
					Some(self.into())
				}
			}
		)+
	};
}

impl_into_node_for_handle!(JsonObject, JsonArray, JsonValue);

macro_rules! impl_into_node_for_primitive {
	($($t:ty),+) => {
		$(
			impl IntoNode for $t {
				fn into_node(self) -> Option<JsonNode> {
					Some(JsonValue::create(self).into())
				}
			}
		)+
	};
}

impl_into_node_for_primitive!(
	bool,
	i8,
	i16,
	i32,
	i64,
	i128,
	isize,
	u8,
	u16,
	u32,
	u64,
	u128,
	usize,
	f32,
	f64,
	String,
	&str,
	time::PrimitiveDateTime,
	time::OffsetDateTime,
	uuid::Uuid
);

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::{ErrorKind, error_kind};
	use pretty_assertions::assert_eq;

	fn parse(json: &str) -> Result<JsonNode> {
		JsonNode::parse_str(json)?.ok_or_else(|| anyhow::anyhow!("null"))
	}

	#[test]
	fn test_parse_null() -> Result<()> {
		assert!(JsonNode::parse_str("null")?.is_none());
		assert!(JsonNode::parse_str(" [null] ")?.is_some());
		Ok(())
	}

	#[test]
	fn test_round_trip() -> Result<()> {
		for json in [
			r#"{"b":1,"a":[true,false,null,"x",-1.5e-3],"c":{}}"#,
			r#"[[],{},[{"z":0}]]"#,
			r#""text""#,
			"42",
		] {
			assert_eq!(parse(json)?.to_json_string()?, json);
		}
		Ok(())
	}

	#[test]
	fn test_round_trip_after_materialization() -> Result<()> {
		let json = r#"{"b":1,"a":[true,null,{"x":"y"}]}"#;
		let node = parse(json)?;
		assert_eq!(node.get("a")?.unwrap().at(2)?.unwrap().get("x")?.unwrap().get_value::<String>()?, "y");
		assert_eq!(node.to_json_string()?, json);
		Ok(())
	}

	#[test]
	fn test_edit_after_parse() -> Result<()> {
		let node = parse(r#"{"A":1,"Arr":[1]}"#)?;
		node.set("A", 9)?;
		node.get("Arr")?.unwrap().set_at(0, 2)?;
		assert_eq!(node.to_json_string()?, r#"{"A":9,"Arr":[2]}"#);
		Ok(())
	}

	#[test]
	fn test_path() -> Result<()> {
		let root = parse(r#"{"Child":[1,2,3],"[Child":{"a b":true}}"#)?;
		let item = root.get("Child")?.unwrap().at(2)?.unwrap();
		assert_eq!(item.path(), "$.Child[2]");
		let quoted = root.get("[Child")?.unwrap();
		assert_eq!(quoted.path(), "$['[Child']");
		assert_eq!(quoted.get("a b")?.unwrap().path(), "$['[Child']['a b']");
		assert_eq!(root.path(), "$");
		assert!(item.root().ptr_eq(&root));
		Ok(())
	}

	#[test]
	fn test_variant_mismatch() -> Result<()> {
		let node = parse("[1]")?;
		let err = node.get("a").unwrap_err();
		assert_eq!(error_kind(&err), Some(ErrorKind::InvalidOperation));
		let err = node.as_value().unwrap_err();
		assert_eq!(error_kind(&err), Some(ErrorKind::InvalidOperation));
		let object = parse("{}")?;
		let err = object.at(0).unwrap_err();
		assert_eq!(error_kind(&err), Some(ErrorKind::InvalidOperation));
		Ok(())
	}

	#[test]
	fn test_missing_and_out_of_range() -> Result<()> {
		let node = parse(r#"{"a":[1]}"#)?;
		assert!(node.get("missing")?.is_none());
		let err = node.get("a")?.unwrap().at(1).unwrap_err();
		assert_eq!(error_kind(&err), Some(ErrorKind::OutOfRange));
		Ok(())
	}

	#[test]
	fn test_case_insensitive_parse() -> Result<()> {
		let node = JsonNode::parse(
			r#"{"MyProperty":42,"Inner":{"Deep":1}}"#,
			Some(NodeOptions::case_insensitive()),
			DocumentOptions::default(),
		)?
		.unwrap();
		assert_eq!(node.get("myproperty")?.unwrap().get_value::<i32>()?, 42);
		assert_eq!(node.get("MYPROPERTY")?.unwrap().get_value::<i32>()?, 42);
		// inherited by descendants
		assert_eq!(node.get("inner")?.unwrap().get("DEEP")?.unwrap().get_value::<u8>()?, 1);

		let node = parse(r#"{"MyProperty":42}"#)?;
		assert!(node.get("myproperty")?.is_none());
		Ok(())
	}

	#[test]
	fn test_case_insensitive_duplicates() -> Result<()> {
		let node = JsonNode::parse(
			r#"{"a":1,"A":2}"#,
			Some(NodeOptions::case_insensitive()),
			DocumentOptions::default(),
		)?
		.unwrap();
		// fine until materialized
		assert_eq!(node.to_json_string()?, r#"{"a":1,"A":2}"#);
		let err = node.get("a").unwrap_err();
		assert_eq!(error_kind(&err), Some(ErrorKind::Argument));
		Ok(())
	}

	#[test]
	fn test_deep_clone_is_independent() -> Result<()> {
		let original = parse(r#"{"a":{"b":[1,2]},"c":"d"}"#)?;
		original.get("a")?.unwrap().get("b")?.unwrap().set_at(0, 5)?;
		let copy = original.deep_clone()?;
		assert_eq!(copy.to_json_string()?, original.to_json_string()?);
		assert!(copy.parent().is_none());

		copy.get("a")?.unwrap().get("b")?.unwrap().set_at(1, 7)?;
		copy.set("c", "changed")?;
		assert_eq!(original.to_json_string()?, r#"{"a":{"b":[5,2]},"c":"d"}"#);
		assert_eq!(copy.to_json_string()?, r#"{"a":{"b":[5,7]},"c":"changed"}"#);
		Ok(())
	}

	#[test]
	fn test_deep_clone_keeps_inherited_options() -> Result<()> {
		let root = JsonNode::parse(
			r#"{"Inner":{"Key":1},"List":[{"Key":2}]}"#,
			Some(NodeOptions::case_insensitive()),
			DocumentOptions::default(),
		)?
		.unwrap();
		let inner = root.get("inner")?.unwrap();
		assert!(inner.get("KEY")?.is_some());
		let copy = inner.deep_clone()?;
		assert!(copy.parent().is_none());
		assert_eq!(copy.options(), Some(NodeOptions::case_insensitive()));
		assert_eq!(copy.get("KEY")?.unwrap().get_value::<i32>()?, 1);

		let list = root.get("LIST")?.unwrap().deep_clone()?;
		assert_eq!(list.at(0)?.unwrap().get("key")?.unwrap().get_value::<i32>()?, 2);
		Ok(())
	}

	#[test]
	fn test_write_deep_tree() -> Result<()> {
		let root = JsonArray::new();
		let mut current = root.clone();
		for _ in 0..99 {
			let child = JsonArray::new();
			current.add(child.as_node().clone())?;
			current = child;
		}
		let json = root.as_node().to_json_string()?;
		assert_eq!(json, format!("{}{}", "[".repeat(100), "]".repeat(100)));
		assert_eq!(root.as_node().deep_clone()?.to_json_string()?, json);
		assert!(root.as_node().to_string().starts_with("[\n  ["));
		Ok(())
	}

	#[test]
	fn test_deep_clone_of_child_has_no_parent() -> Result<()> {
		let root = parse(r#"{"a":[1]}"#)?;
		let child = root.get("a")?.unwrap();
		let copy = child.deep_clone()?;
		assert!(copy.parent().is_none());
		root.set("b", copy)?;
		assert_eq!(root.to_json_string()?, r#"{"a":[1],"b":[1]}"#);
		Ok(())
	}

	#[test]
	fn test_cycles_are_rejected() -> Result<()> {
		let root = parse(r#"{"child":{"grandchild":{}}}"#)?;
		let before = root.to_json_string()?;
		let err = root.set("self", root.clone()).unwrap_err();
		assert_eq!(error_kind(&err), Some(ErrorKind::InvalidOperation));

		// the root below its own grandchild
		let child = root.get("child")?.unwrap();
		let grandchild = child.get("grandchild")?.unwrap();
		let err = grandchild.set("loop", root.clone()).unwrap_err();
		assert_eq!(error_kind(&err), Some(ErrorKind::InvalidOperation));
		assert_eq!(root.to_json_string()?, before);
		assert!(root.parent().is_none());
		Ok(())
	}

	#[test]
	fn test_reparenting_is_rejected() -> Result<()> {
		let a = parse(r#"{"x":[1]}"#)?;
		let b = parse(r#"{}"#)?;
		let x = a.get("x")?.unwrap();
		let err = b.set("y", x.clone()).unwrap_err();
		assert_eq!(error_kind(&err), Some(ErrorKind::InvalidOperation));
		assert_eq!(b.to_json_string()?, "{}");
		assert!(x.parent().unwrap().ptr_eq(&a));

		// after removal it can move
		a.as_object()?.remove("x")?;
		assert!(x.parent().is_none());
		b.set("y", x)?;
		assert_eq!(b.to_json_string()?, r#"{"y":[1]}"#);
		Ok(())
	}

	#[test]
	fn test_replace_with() -> Result<()> {
		let root = parse(r#"{"a":[1,2],"b":3}"#)?;
		let old = root.get("a")?.unwrap().at(1)?.unwrap();
		old.replace_with("two")?;
		assert!(old.parent().is_none());
		root.get("b")?.unwrap().replace_with(None::<JsonNode>)?;
		assert_eq!(root.to_json_string()?, r#"{"a":[1,"two"],"b":null}"#);
		assert!(root.replace_with(1).is_err());
		Ok(())
	}

	#[test]
	fn test_deep_equals() -> Result<()> {
		let a = parse(r#"{"x":1,"y":[true,null]}"#)?;
		let b = parse(r#"{"y":[true,null],"x":1}"#)?;
		let c = parse(r#"{"y":[true,null],"x":2}"#)?;
		assert!(a.deep_equals(&b)?);
		assert!(!a.deep_equals(&c)?);
		assert!(!a.deep_equals(&parse("[]")?)?);
		Ok(())
	}

	#[test]
	fn test_display() -> Result<()> {
		assert_eq!(parse(r#""plain text""#)?.to_string(), "plain text");
		assert_eq!(parse("12")?.to_string(), "12");
		assert_eq!(parse(r#"{"a":[1]}"#)?.to_string(), "{\n  \"a\": [\n    1\n  ]\n}");
		Ok(())
	}

	#[test]
	fn test_parse_reader() -> Result<()> {
		let node = JsonNode::parse_reader(&b"[1,2]"[..], None, DocumentOptions::default())?.unwrap();
		assert_eq!(node.as_array()?.len()?, 2);
		Ok(())
	}
}
