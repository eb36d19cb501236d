//! Entry points for whole values.

use super::{ReadOperation, WriteOperation};
use crate::{metadata::JsonType, node::JsonNode, options::SerializerOptions};
use anyhow::Result;
use jsonode_derive::context;
use std::io::{Read, Write};

/// Serialize `value` to a JSON string.
pub fn to_string<T: JsonType>(value: &T, options: &SerializerOptions) -> Result<String> {
	let bytes = to_vec(value, options)?;
	// the writer only produces UTF-8
	Ok(String::from_utf8(bytes)?)
}

pub fn to_vec<T: JsonType>(value: &T, options: &SerializerOptions) -> Result<Vec<u8>> {
	let mut output = Vec::new();
	to_writer(&mut output, value, options)?;
	Ok(output)
}

/// Serialize `value` into `sink`, flushing whenever the pending output exceeds the flush
/// threshold of `options`.
pub fn to_writer<T: JsonType>(mut sink: impl Write, value: &T, options: &SerializerOptions) -> Result<()> {
	let mut operation = WriteOperation::new(value, options)?;
	loop {
		let done = operation.step()?;
		sink.write_all(&operation.take_pending())?;
		if done {
			break;
		}
	}
	sink.flush()?;
	Ok(())
}

pub fn from_str<T: JsonType>(json: &str, options: &SerializerOptions) -> Result<T> {
	from_slice(json.as_bytes(), options)
}

pub fn from_slice<T: JsonType>(json: &[u8], options: &SerializerOptions) -> Result<T> {
	let mut operation = ReadOperation::<T>::new(options)?;
	operation.feed(json)?;
	operation.finish()
}

/// Deserialize from `source`, reading chunks of the default buffer size. The chunk size
/// doubles whenever a chunk left more unconsumed input than it held.
#[context("while deserializing {} from a stream", std::any::type_name::<T>())]
pub fn from_reader<T: JsonType>(mut source: impl Read, options: &SerializerOptions) -> Result<T> {
	let mut operation = ReadOperation::<T>::new(options)?;
	let mut chunk = vec![0; options.default_buffer_size().max(1)];
	loop {
		let count = source.read(&mut chunk)?;
		if count == 0 {
			break;
		}
		operation.feed(&chunk[..count])?;
		if operation.buffered() >= chunk.len() {
			let size = chunk.len() * 2;
			chunk.resize(size, 0);
		}
	}
	operation.finish()
}

/// Serialize `value` into a DOM tree. `None` stands for `null`.
pub fn to_node<T: JsonType>(value: &T, options: &SerializerOptions) -> Result<Option<JsonNode>> {
	let bytes = to_vec(value, options)?;
	JsonNode::parse_slice(&bytes, options.node_options(), options.document_options())
}

/// Deserialize from a DOM tree, `None` being `null`.
pub fn from_node<T: JsonType>(node: Option<&JsonNode>, options: &SerializerOptions) -> Result<T> {
	match node {
		Some(node) => from_str(&node.to_json_string()?, options),
		None => from_str("null", options),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{
		error::{ErrorKind, error_kind},
		node::JsonObject,
		options::CommentHandling,
	};
	use pretty_assertions::assert_eq;
	use std::collections::BTreeMap;

	/// Hands out at most `limit` bytes per read.
	struct Trickle<'a> {
		data: &'a [u8],
		limit: usize,
	}

	impl Read for Trickle<'_> {
		fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
			let count = self.limit.min(buf.len()).min(self.data.len());
			buf[..count].copy_from_slice(&self.data[..count]);
			self.data = &self.data[count..];
			Ok(count)
		}
	}

	#[test]
	fn test_from_reader() -> Result<()> {
		let mut options = SerializerOptions::default();
		options.set_default_buffer_size(4)?;
		let json = r#"{"long key name":["a string longer than the chunk", "b"]}"#;
		let value: BTreeMap<String, Vec<String>> = from_reader(
			Trickle {
				data: json.as_bytes(),
				limit: 3,
			},
			&options,
		)?;
		assert_eq!(value["long key name"][0], "a string longer than the chunk");

		let err = from_reader::<Vec<u8>>(&b"[1,x]"[..], &options).unwrap_err();
		assert!(err.to_string().starts_with("while deserializing "), "{err}");
		assert_eq!(error_kind(&err), Some(ErrorKind::Format));
		Ok(())
	}

	#[test]
	fn test_to_writer_and_indented() -> Result<()> {
		let mut options = SerializerOptions::default();
		options.set_write_indented(true)?;
		let mut output = Vec::new();
		to_writer(&mut output, &BTreeMap::from([("a".to_string(), vec![1u8, 2])]), &options)?;
		assert_eq!(String::from_utf8(output)?, "{\n  \"a\": [\n    1,\n    2\n  ]\n}");
		Ok(())
	}

	#[test]
	fn test_nodes() -> Result<()> {
		let options = SerializerOptions::default();
		let node = to_node(&vec![Some(1.5f64), None], &options)?.unwrap();
		assert_eq!(node.to_json_string()?, "[1.5,null]");
		assert!(to_node(&None::<u8>, &options)?.is_none());

		let object = JsonObject::from_entries([("x", 1), ("y", 2)])?;
		let map: BTreeMap<String, i8> = from_node(Some(object.as_node()), &options)?;
		assert_eq!(map.len(), 2);
		assert_eq!(from_node::<Option<u8>>(None, &options)?, None);
		assert!(from_node::<u8>(None, &options).is_err());
		Ok(())
	}

	#[test]
	fn test_document_options() -> Result<()> {
		let mut options = SerializerOptions::default();
		let json = "[1, /* two */ 2,]";
		assert!(from_str::<Vec<u8>>(json, &options).is_err());
		assert!(options.set_read_comment_handling(CommentHandling::Skip).is_err());

		let mut options = options.clone();
		options.set_read_comment_handling(CommentHandling::Skip)?;
		options.set_allow_trailing_commas(true)?;
		assert_eq!(from_str::<Vec<u8>>(json, &options)?, vec![1, 2]);
		Ok(())
	}

	#[test]
	fn test_max_depth() -> Result<()> {
		let mut options = SerializerOptions::default();
		options.set_max_depth(2)?;
		let err = from_str::<Vec<Vec<Vec<u8>>>>("[[[1]]]", &options).unwrap_err();
		assert_eq!(error_kind(&err), Some(ErrorKind::Format));
		assert_eq!(from_str::<Vec<Vec<u8>>>("[[1]]", &options)?, vec![vec![1]]);
		Ok(())
	}
}
