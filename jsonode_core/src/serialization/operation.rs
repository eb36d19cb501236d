//! Resumable read and write operations.
//!
//! A [`ReadOperation`] is fed input in chunks of any size and produces the value once the
//! document is complete. A [`WriteOperation`] produces output in steps, each ending when the
//! pending output exceeds the flush threshold of the options.

use super::{ReadStack, WriteStack, advance_to_value, read_nested, unbox_value};
use crate::{
	error::{JsonError, attach_path},
	metadata::{JsonType, TypeDescriptor},
	options::SerializerOptions,
	reader::{JsonReader, ReaderState},
	writer::JsonWriter,
};
use anyhow::Result;
use log::trace;
use std::{any::Any, marker::PhantomData, sync::Arc};

pub struct ReadOperation<'o, T> {
	options: &'o SerializerOptions,
	descriptor: Arc<TypeDescriptor>,
	stack: ReadStack,
	reader_state: ReaderState,
	buffer: Vec<u8>,
	started: bool,
	value: Option<T>,
	marker: PhantomData<fn() -> T>,
}

impl<'o, T: JsonType> ReadOperation<'o, T> {
	pub fn new(options: &'o SerializerOptions) -> Result<Self> {
		Ok(Self {
			options,
			descriptor: options.descriptor::<T>()?,
			stack: ReadStack::new(options),
			reader_state: ReaderState::new(options.document_options()),
			buffer: Vec::new(),
			started: false,
			value: None,
			marker: PhantomData,
		})
	}

	/// Bytes received but not consumed yet.
	#[must_use]
	pub fn buffered(&self) -> usize {
		self.buffer.len()
	}

	/// True once the value is complete. Trailing whitespace may still follow.
	#[must_use]
	pub fn is_complete(&self) -> bool {
		self.value.is_some()
	}

	/// Consume the next chunk of input.
	pub fn feed(&mut self, bytes: &[u8]) -> Result<()> {
		self.buffer.extend_from_slice(bytes);
		self.step(false)
	}

	/// Signal the end of input and return the value.
	pub fn finish(mut self) -> Result<T> {
		self.step(true)?;
		self.value.ok_or_else(|| JsonError::format("unexpected end of data").into())
	}

	fn step(&mut self, is_final: bool) -> Result<()> {
		let mut reader = JsonReader::new(&self.buffer, is_final, self.reader_state.clone());
		if self.value.is_none() {
			if !self.started {
				if !advance_to_value(&mut reader, self.descriptor.converter())? {
					if is_final {
						return Err(JsonError::format("the input does not contain any JSON tokens").into());
					}
					return Ok(());
				}
				self.started = true;
			} else {
				trace!("resuming a read of {} at depth {}", self.descriptor.type_key().name(), reader.current_depth());
			}
			self.stack.push();
			match read_nested(&self.descriptor, &mut reader, self.options, &mut self.stack) {
				Ok(Some(value)) => {
					self.stack.pop(true);
					self.value = Some(unbox_value(value, &self.descriptor.type_key())?);
				}
				Ok(None) => {
					self.stack.pop(false);
					if is_final {
						return Err(reader.format_error("unexpected end of data"));
					}
					trace!("suspended a read of {}", self.descriptor.type_key().name());
				}
				Err(err) => {
					let stack = &self.stack;
					return Err(attach_path(err, || stack.json_path()));
				}
			}
		}
		if self.value.is_some() {
			// anything but whitespace after the value is an error
			while reader.read()? {}
		}
		let consumed = reader.bytes_consumed();
		self.reader_state = reader.into_state();
		self.buffer.drain(..consumed);
		Ok(())
	}
}

pub struct WriteOperation<'a> {
	options: &'a SerializerOptions,
	descriptor: Arc<TypeDescriptor>,
	value: &'a dyn Any,
	writer: JsonWriter,
	stack: WriteStack,
	done: bool,
}

impl<'a> WriteOperation<'a> {
	pub fn new<T: JsonType>(value: &'a T, options: &'a SerializerOptions) -> Result<Self> {
		Ok(Self {
			options,
			descriptor: options.descriptor::<T>()?,
			value,
			writer: JsonWriter::new(options.writer_options()),
			stack: WriteStack::new(options),
			done: false,
		})
	}

	/// Write until the value is complete (`true`) or the flush threshold is exceeded (`false`).
	pub fn step(&mut self) -> Result<bool> {
		if self.done {
			return Ok(true);
		}
		self.stack.push();
		match self
			.descriptor
			.converter()
			.try_write(&mut self.writer, self.value, self.options, &mut self.stack)
		{
			Ok(true) => {
				self.stack.pop(true);
				self.done = true;
				Ok(true)
			}
			Ok(false) => {
				self.stack.pop(false);
				trace!("suspended a write after {} bytes", self.writer.bytes_pending());
				Ok(false)
			}
			Err(err) => {
				let stack = &self.stack;
				Err(attach_path(err, || stack.json_path()))
			}
		}
	}

	/// Take the output produced so far.
	pub fn take_pending(&mut self) -> Vec<u8> {
		self.writer.take_pending()
	}

	#[must_use]
	pub fn is_done(&self) -> bool {
		self.done
	}

	#[must_use]
	pub fn bytes_written(&self) -> u64 {
		self.writer.bytes_committed() + self.writer.bytes_pending() as u64
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{
		error::{ErrorKind, error_kind},
		serialization::{from_str, to_string},
	};
	use pretty_assertions::assert_eq;
	use std::collections::BTreeMap;

	type Document = BTreeMap<String, Vec<Option<Vec<String>>>>;

	fn document() -> Document {
		(0..40)
			.map(|i| {
				let items = (0..i % 7)
					.map(|j| (j % 3 != 0).then(|| vec![format!("item {i}.{j}"), "x".repeat(j)]))
					.collect();
				(format!("key {i:02}"), items)
			})
			.collect()
	}

	fn small_buffer() -> Result<SerializerOptions> {
		let mut options = SerializerOptions::default();
		options.set_default_buffer_size(16)?;
		Ok(options)
	}

	#[test]
	fn test_suspended_write_is_identical() -> Result<()> {
		let value = document();
		let expected = to_string(&value, &SerializerOptions::default())?;

		let options = small_buffer()?;
		let mut operation = WriteOperation::new(&value, &options)?;
		let mut output = Vec::new();
		let mut steps = 0;
		loop {
			let done = operation.step()?;
			output.extend(operation.take_pending());
			steps += 1;
			if done {
				break;
			}
		}
		assert!(steps > 10, "{steps}");
		assert_eq!(String::from_utf8(output)?, expected);
		Ok(())
	}

	#[test]
	fn test_byte_at_a_time_read() -> Result<()> {
		let options = SerializerOptions::default();
		let value = document();
		let json = format!(" {} \n", to_string(&value, &options)?);
		let mut operation = ReadOperation::<Document>::new(&options)?;
		for byte in json.as_bytes() {
			operation.feed(std::slice::from_ref(byte))?;
			assert!(operation.buffered() < 64);
		}
		assert!(operation.is_complete());
		assert_eq!(operation.finish()?, value);
		Ok(())
	}

	#[test]
	fn test_chunked_read_with_objects() -> Result<()> {
		let options = SerializerOptions::default();
		let json = r#"{"a":[["1","2"],null],"b":[],"c":[null]}"#;
		let expected = from_str::<Document>(json, &options)?;
		for size in 1..json.len() {
			let mut operation = ReadOperation::<Document>::new(&options)?;
			for chunk in json.as_bytes().chunks(size) {
				operation.feed(chunk)?;
			}
			assert_eq!(operation.finish()?, expected);
		}
		Ok(())
	}

	#[test]
	fn test_truncated_input() -> Result<()> {
		let options = SerializerOptions::default();
		let mut operation = ReadOperation::<Vec<u8>>::new(&options)?;
		operation.feed(b"[1,2")?;
		assert!(!operation.is_complete());
		let err = operation.finish().unwrap_err();
		assert_eq!(error_kind(&err), Some(ErrorKind::Format));

		let operation = ReadOperation::<Vec<u8>>::new(&options)?;
		assert!(operation.finish().is_err());
		Ok(())
	}

	#[test]
	fn test_trailing_data() -> Result<()> {
		let options = SerializerOptions::default();
		let mut operation = ReadOperation::<u8>::new(&options)?;
		operation.feed(b"1 ")?;
		let err = operation.feed(b"2").unwrap_err();
		assert_eq!(error_kind(&err), Some(ErrorKind::Format));
		Ok(())
	}
}
