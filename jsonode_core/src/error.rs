//! Error taxonomy shared by the document model, the tokenizer and the serializer.
//!
//! Every error raised by this crate travels as an [`anyhow::Error`] whose root cause is a
//! [`JsonError`]. Callers that need to tell the categories apart use [`error_kind`] or
//! `err.downcast_ref::<JsonError>()`; context added on the way up does not hide the root cause.

use std::fmt;

/// The category of a [`JsonError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
	/// Malformed or unexpected input, or a value that cannot be converted to the requested type.
	Format,
	/// Invalid type metadata or options, or an attempt to change locked options.
	Configuration,
	/// An illegal call for the current state, e.g. re-parenting a node or indexing the wrong variant.
	InvalidOperation,
	/// The input is fine but the target type cannot host it.
	NotSupported,
	/// An invalid argument, e.g. a duplicate key.
	Argument,
	/// An index outside the valid range.
	OutOfRange,
}

impl ErrorKind {
	#[must_use]
	pub fn as_str(&self) -> &'static str {
		match self {
			ErrorKind::Format => "format",
			ErrorKind::Configuration => "configuration",
			ErrorKind::InvalidOperation => "invalid operation",
			ErrorKind::NotSupported => "not supported",
			ErrorKind::Argument => "argument",
			ErrorKind::OutOfRange => "out of range",
		}
	}
}

/// A structured error carrying its kind and, for format errors, where it happened.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JsonError {
	kind: ErrorKind,
	message: String,
	path: Option<String>,
	position: Option<u64>,
}

impl JsonError {
	pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
		Self {
			kind,
			message: message.into(),
			path: None,
			position: None,
		}
	}

	pub fn format(message: impl Into<String>) -> Self {
		Self::new(ErrorKind::Format, message)
	}

	pub fn configuration(message: impl Into<String>) -> Self {
		Self::new(ErrorKind::Configuration, message)
	}

	pub fn invalid_operation(message: impl Into<String>) -> Self {
		Self::new(ErrorKind::InvalidOperation, message)
	}

	pub fn not_supported(message: impl Into<String>) -> Self {
		Self::new(ErrorKind::NotSupported, message)
	}

	pub fn argument(message: impl Into<String>) -> Self {
		Self::new(ErrorKind::Argument, message)
	}

	pub fn out_of_range(message: impl Into<String>) -> Self {
		Self::new(ErrorKind::OutOfRange, message)
	}

	/// Record the absolute byte offset in the input.
	#[must_use]
	pub fn at_position(mut self, position: u64) -> Self {
		self.position = Some(position);
		self
	}

	/// Record the JSON path of the failing value. An already recorded path is kept,
	/// so the innermost (most precise) path wins.
	#[must_use]
	pub fn with_path(mut self, path: impl Into<String>) -> Self {
		if self.path.is_none() {
			self.path = Some(path.into());
		}
		self
	}

	#[must_use]
	pub fn kind(&self) -> ErrorKind {
		self.kind
	}

	#[must_use]
	pub fn message(&self) -> &str {
		&self.message
	}

	#[must_use]
	pub fn path(&self) -> Option<&str> {
		self.path.as_deref()
	}

	#[must_use]
	pub fn position(&self) -> Option<u64> {
		self.position
	}
}

impl fmt::Display for JsonError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.message)?;
		if let Some(position) = self.position {
			write!(f, " at position {position}")?;
		}
		if let Some(path) = &self.path {
			write!(f, ", path: {path}")?;
		}
		Ok(())
	}
}

impl std::error::Error for JsonError {}

/// Returns the kind of the [`JsonError`] at the root of `err`, if there is one.
#[must_use]
pub fn error_kind(err: &anyhow::Error) -> Option<ErrorKind> {
	err.downcast_ref::<JsonError>().map(JsonError::kind)
}

/// Attach `path` to the root [`JsonError`] of `err` unless it already has one.
pub(crate) fn attach_path(mut err: anyhow::Error, path: impl FnOnce() -> String) -> anyhow::Error {
	if let Some(json_error) = err.downcast_mut::<JsonError>()
		&& json_error.path.is_none()
	{
		json_error.path = Some(path());
	}
	err
}

/// Return early with a [`JsonError`] of the given kind.
///
/// ```
/// # use jsonode_core::json_bail;
/// fn check(n: i32) -> anyhow::Result<()> {
/// 	if n < 0 {
/// 		json_bail!(Argument, "negative value {n}");
/// 	}
/// 	Ok(())
/// }
/// assert!(check(-1).is_err());
/// ```
#[macro_export]
macro_rules! json_bail {
	($kind:ident, $($arg:tt)*) => {
		return Err($crate::JsonError::new($crate::ErrorKind::$kind, format!($($arg)*)).into())
	};
}

#[cfg(test)]
mod tests {
	use super::*;
	use anyhow::{Context, Result};

	fn failing() -> Result<()> {
		json_bail!(NotSupported, "type {} has no constructor", "Foo");
	}

	#[test]
	fn test_display() {
		let err = JsonError::format("unexpected character").at_position(12).with_path("$.a[1]");
		assert_eq!(err.to_string(), "unexpected character at position 12, path: $.a[1]");
		assert_eq!(JsonError::configuration("locked").to_string(), "locked");
	}

	#[test]
	fn test_innermost_path_wins() {
		let err = JsonError::format("x").with_path("$.inner").with_path("$");
		assert_eq!(err.path(), Some("$.inner"));
	}

	#[test]
	fn test_kind_survives_context() {
		let err = failing().context("while doing something").unwrap_err();
		assert_eq!(error_kind(&err), Some(ErrorKind::NotSupported));
		assert_eq!(err.root_cause().to_string(), "type Foo has no constructor");
	}

	#[test]
	fn test_attach_path() {
		let err = attach_path(failing().unwrap_err(), || "$.x".to_string());
		assert_eq!(err.downcast_ref::<JsonError>().unwrap().path(), Some("$.x"));

		let err = attach_path(anyhow::anyhow!("plain"), || "$.y".to_string());
		assert_eq!(error_kind(&err), None);
	}
}
