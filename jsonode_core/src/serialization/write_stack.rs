use crate::{
	node::path::{self, Segment},
	options::{NumberHandlingSet, SerializerOptions},
	writer::JsonWriter,
};

/// Position of a converter within the members or elements it writes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum EnumeratorState {
	#[default]
	NotStarted,
	/// Next element or property index.
	Index(usize),
	/// Snapshot of dictionary keys and the next one to write.
	Keys { keys: Vec<String>, next: usize },
	Done,
}

/// One level of a write in progress.
#[derive(Debug, Default)]
pub struct WriteFrame {
	segment: Option<Segment>,
	number_handling: NumberHandlingSet,
	/// Set once the opening token has been written.
	pub started: bool,
	pub enumerator: EnumeratorState,
	/// Set while the name of the current property is written but its value is not.
	pub property_name_written: bool,
}

impl WriteFrame {
	#[must_use]
	pub fn number_handling(&self) -> NumberHandlingSet {
		self.number_handling
	}
}

/// The stack of a (possibly suspended) write. Mirrors [`ReadStack`](super::ReadStack).
pub struct WriteStack {
	frames: Vec<WriteFrame>,
	depth: usize,
	number_handling: NumberHandlingSet,
	flush_threshold: usize,
}

impl WriteStack {
	#[must_use]
	pub fn new(options: &SerializerOptions) -> Self {
		Self {
			frames: Vec::new(),
			depth: 0,
			number_handling: options.number_handling(),
			flush_threshold: options.flush_threshold(),
		}
	}

	#[must_use]
	pub fn depth(&self) -> usize {
		self.depth
	}

	#[must_use]
	pub fn is_continuation(&self) -> bool {
		self.frames.len() > self.depth
	}

	pub fn push(&mut self) {
		self.push_frame(None, None);
	}

	pub fn push_property(&mut self, name: &str, number_handling: Option<NumberHandlingSet>) {
		self.push_frame(Some(Segment::Property(name.to_string())), number_handling);
	}

	pub fn push_index(&mut self, index: usize) {
		self.push_frame(Some(Segment::Index(index)), None);
	}

	fn push_frame(&mut self, segment: Option<Segment>, number_handling: Option<NumberHandlingSet>) {
		let number_handling = number_handling.unwrap_or_else(|| self.number_handling());
		if let Some(frame) = self.frames.get_mut(self.depth) {
			frame.segment = segment;
			frame.number_handling = number_handling;
		} else {
			self.frames.push(WriteFrame {
				segment,
				number_handling,
				..WriteFrame::default()
			});
		}
		self.depth += 1;
	}

	pub fn pop(&mut self, success: bool) {
		self.depth = self.depth.saturating_sub(1);
		if success {
			self.frames.truncate(self.depth);
		}
	}

	/// # Panics
	/// If no frame has been pushed.
	#[must_use]
	pub fn current(&self) -> &WriteFrame {
		&self.frames[self.depth - 1]
	}

	pub fn current_mut(&mut self) -> &mut WriteFrame {
		&mut self.frames[self.depth - 1]
	}

	#[must_use]
	pub fn number_handling(&self) -> NumberHandlingSet {
		match self.depth {
			0 => self.number_handling,
			depth => self.frames[depth - 1].number_handling,
		}
	}

	/// True if the writer holds more pending output than the flush threshold.
	#[must_use]
	pub fn should_flush(&self, writer: &JsonWriter) -> bool {
		writer.bytes_pending() > self.flush_threshold
	}

	#[must_use]
	pub fn json_path(&self) -> String {
		path::build(self.frames[..self.depth].iter().filter_map(|frame| frame.segment.as_ref()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_retained_frame_keeps_cursor() {
		let options = SerializerOptions::default();
		let mut stack = WriteStack::new(&options);
		stack.push();
		stack.current_mut().started = true;
		stack.current_mut().enumerator = EnumeratorState::Index(3);
		stack.pop(false);

		stack.push();
		assert!(stack.current().started);
		assert_eq!(stack.current().enumerator, EnumeratorState::Index(3));
		stack.push_property("a b", None);
		assert_eq!(stack.json_path(), "$['a b']");
		stack.pop(true);
		stack.pop(true);
		assert_eq!(stack.depth(), 0);
		assert!(!stack.is_continuation());
	}

	#[test]
	fn test_should_flush() -> anyhow::Result<()> {
		let mut options = SerializerOptions::default();
		options.set_default_buffer_size(20)?;
		let stack = WriteStack::new(&options);
		let mut writer = JsonWriter::default();
		writer.write_string("0123456789abcdefghij")?;
		assert!(stack.should_flush(&writer));
		writer.take_pending();
		assert!(!stack.should_flush(&writer));
		Ok(())
	}
}
