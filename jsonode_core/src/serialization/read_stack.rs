use super::BoxedValue;
use crate::{
	node::path::{self, Segment},
	options::{NumberHandlingSet, SerializerOptions},
};
use std::any::Any;

/// One level of a read in progress.
#[derive(Default)]
pub struct ReadFrame {
	segment: Option<Segment>,
	number_handling: NumberHandlingSet,
	state: Option<BoxedValue>,
}

impl ReadFrame {
	pub(crate) fn segment(&self) -> Option<&Segment> {
		self.segment.as_ref()
	}

	#[must_use]
	pub fn number_handling(&self) -> NumberHandlingSet {
		self.number_handling
	}

	/// True if a converter left state behind when it suspended.
	#[must_use]
	pub fn has_state(&self) -> bool {
		self.state.is_some()
	}

	/// Take the state a suspended converter stored, if it has the type `S`.
	pub fn take_state<S: Any>(&mut self) -> Option<S> {
		match self.state.take()?.downcast::<S>() {
			Ok(state) => Some(*state),
			Err(other) => {
				self.state = Some(other);
				None
			}
		}
	}

	pub fn set_state<S: Any + Send>(&mut self, state: S) {
		self.state = Some(Box::new(state));
	}
}

/// The stack of a (possibly suspended) read.
///
/// Frames above the current depth are kept when a converter suspends and are handed back when
/// the same position is pushed again on resume. A successful pop drops them.
pub struct ReadStack {
	frames: Vec<ReadFrame>,
	depth: usize,
	number_handling: NumberHandlingSet,
}

impl ReadStack {
	#[must_use]
	pub fn new(options: &SerializerOptions) -> Self {
		Self {
			frames: Vec::new(),
			depth: 0,
			number_handling: options.number_handling(),
		}
	}

	#[must_use]
	pub fn depth(&self) -> usize {
		self.depth
	}

	/// True while suspended frames wait to be resumed.
	#[must_use]
	pub fn is_continuation(&self) -> bool {
		self.frames.len() > self.depth
	}

	/// Push a frame without a path segment, used for the root and for wrappers.
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
			self.frames.push(ReadFrame {
				segment,
				number_handling,
				state: None,
			});
		}
		self.depth += 1;
	}

	/// Leave the current frame. After a suspension (`success == false`) it is kept for resuming.
	pub fn pop(&mut self, success: bool) {
		self.depth = self.depth.saturating_sub(1);
		if success {
			self.frames.truncate(self.depth);
		}
	}

	/// The frame of the converter that is running.
	///
	/// # Panics
	/// If no frame has been pushed.
	#[must_use]
	pub fn current(&self) -> &ReadFrame {
		&self.frames[self.depth - 1]
	}

	pub fn current_mut(&mut self) -> &mut ReadFrame {
		&mut self.frames[self.depth - 1]
	}

	/// Number handling in effect for the current frame.
	#[must_use]
	pub fn number_handling(&self) -> NumberHandlingSet {
		match self.depth {
			0 => self.number_handling,
			depth => self.frames[depth - 1].number_handling,
		}
	}

	/// Path of the value being read, e.g. `$.items[2]`.
	#[must_use]
	pub fn json_path(&self) -> String {
		path::build(self.frames[..self.depth].iter().filter_map(ReadFrame::segment))
	}
}
