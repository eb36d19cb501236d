use super::escape::push_escaped;
use crate::{error::JsonError, options::DEFAULT_MAX_DEPTH};
use anyhow::Result;
use std::{fmt::Display, io::Write};

const INDENT: &str = "  ";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WriterOptions {
	/// Pretty print with two spaces per level.
	pub indented: bool,
	pub max_depth: usize,
}

impl Default for WriterOptions {
	fn default() -> Self {
		Self {
			indented: false,
			max_depth: DEFAULT_MAX_DEPTH,
		}
	}
}

#[derive(Clone, Copy, Debug)]
struct Container {
	is_object: bool,
	has_items: bool,
}

/// Buffered JSON writer.
///
/// Structural misuse (a value where a property name is required, unbalanced containers)
/// fails with an `InvalidOperation` error.
#[derive(Debug, Default)]
pub struct JsonWriter {
	pending: String,
	committed: u64,
	options: WriterOptions,
	containers: Vec<Container>,
	after_property_name: bool,
	root_written: bool,
}

impl JsonWriter {
	#[must_use]
	pub fn new(options: WriterOptions) -> Self {
		Self {
			options,
			..Self::default()
		}
	}

	#[must_use]
	pub fn options(&self) -> &WriterOptions {
		&self.options
	}

	/// Bytes written but not yet flushed or taken.
	#[must_use]
	pub fn bytes_pending(&self) -> usize {
		self.pending.len()
	}

	/// Bytes already flushed or taken.
	#[must_use]
	pub fn bytes_committed(&self) -> u64 {
		self.committed
	}

	/// Number of open containers.
	#[must_use]
	pub fn current_depth(&self) -> usize {
		self.containers.len()
	}

	/// True once a complete top-level value has been written.
	#[must_use]
	pub fn is_complete(&self) -> bool {
		self.root_written && self.containers.is_empty()
	}

	/// Remove and return the pending output.
	pub fn take_pending(&mut self) -> Vec<u8> {
		self.committed += self.pending.len() as u64;
		std::mem::take(&mut self.pending).into_bytes()
	}

	/// Write the pending output to `sink`.
	pub fn flush(&mut self, sink: &mut impl Write) -> Result<()> {
		sink.write_all(self.pending.as_bytes())?;
		self.committed += self.pending.len() as u64;
		self.pending.clear();
		Ok(())
	}

	/// The pending output as text, e.g. after writing a complete value into a fresh writer.
	#[must_use]
	pub fn into_string(self) -> String {
		self.pending
	}

	fn new_line(&mut self) {
		self.pending.push('\n');
		for _ in 0..self.containers.len() {
			self.pending.push_str(INDENT);
		}
	}

	fn before_value(&mut self) -> Result<()> {
		if self.after_property_name {
			self.after_property_name = false;
			return Ok(());
		}
		match self.containers.last_mut() {
			Some(container) if container.is_object => {
				Err(JsonError::invalid_operation("cannot write a value in an object without a property name").into())
			}
			Some(container) => {
				let has_items = std::mem::replace(&mut container.has_items, true);
				if has_items {
					self.pending.push(',');
				}
				if self.options.indented {
					self.new_line();
				}
				Ok(())
			}
			None if self.root_written => {
				Err(JsonError::invalid_operation("cannot write a second top-level value").into())
			}
			None => Ok(()),
		}
	}

	fn after_value(&mut self) {
		if self.containers.is_empty() {
			self.root_written = true;
		}
	}

	fn write_start(&mut self, is_object: bool) -> Result<()> {
		if self.containers.len() >= self.options.max_depth {
			return Err(JsonError::format(format!(
				"the maximum depth of {} has been exceeded",
				self.options.max_depth
			))
			.into());
		}
		self.before_value()?;
		self.pending.push(if is_object { '{' } else { '[' });
		self.containers.push(Container {
			is_object,
			has_items: false,
		});
		Ok(())
	}

	fn write_end(&mut self, is_object: bool) -> Result<()> {
		match self.containers.last() {
			Some(container) if container.is_object == is_object && !self.after_property_name => {}
			_ => {
				return Err(JsonError::invalid_operation(format!(
					"cannot close {} here",
					if is_object { "an object" } else { "an array" }
				))
				.into());
			}
		}
		let Some(container) = self.containers.pop() else {
			return Ok(());
		};
		if self.options.indented && container.has_items {
			self.new_line();
		}
		self.pending.push(if is_object { '}' } else { ']' });
		self.after_value();
		Ok(())
	}

	pub fn write_start_object(&mut self) -> Result<()> {
		self.write_start(true)
	}

	pub fn write_end_object(&mut self) -> Result<()> {
		self.write_end(true)
	}

	pub fn write_start_array(&mut self) -> Result<()> {
		self.write_start(false)
	}

	pub fn write_end_array(&mut self) -> Result<()> {
		self.write_end(false)
	}

	pub fn write_property_name(&mut self, name: &str) -> Result<()> {
		let Some(container) = self.containers.last_mut() else {
			return Err(JsonError::invalid_operation("cannot write a property name outside of an object").into());
		};
		if !container.is_object || self.after_property_name {
			return Err(JsonError::invalid_operation("a property name is not allowed here").into());
		}
		let has_items = std::mem::replace(&mut container.has_items, true);
		if has_items {
			self.pending.push(',');
		}
		if self.options.indented {
			self.new_line();
		}
		self.pending.push('"');
		push_escaped(&mut self.pending, name);
		self.pending.push_str(if self.options.indented { "\": " } else { "\":" });
		self.after_property_name = true;
		Ok(())
	}

	pub fn write_string(&mut self, value: &str) -> Result<()> {
		self.before_value()?;
		self.pending.push('"');
		push_escaped(&mut self.pending, value);
		self.pending.push('"');
		self.after_value();
		Ok(())
	}

	/// Write a number from its textual form. The caller guarantees valid JSON number text.
	pub fn write_number_text(&mut self, text: &str) -> Result<()> {
		self.write_raw_scalar(text)
	}

	/// Write an integer or a finite float.
	pub fn write_number<T: Display>(&mut self, value: T) -> Result<()> {
		self.write_raw_scalar(&value.to_string())
	}

	/// Write a number as a JSON string, e.g. `"42"`.
	pub fn write_number_as_string<T: Display>(&mut self, value: T) -> Result<()> {
		self.write_string(&value.to_string())
	}

	pub fn write_bool(&mut self, value: bool) -> Result<()> {
		self.write_raw_scalar(if value { "true" } else { "false" })
	}

	pub fn write_null(&mut self) -> Result<()> {
		self.write_raw_scalar("null")
	}

	fn write_raw_scalar(&mut self, text: &str) -> Result<()> {
		self.before_value()?;
		self.pending.push_str(text);
		self.after_value();
		Ok(())
	}
}
