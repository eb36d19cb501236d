//! Opt-in handling of numbers written as JSON strings.

use enumset::{EnumSet, EnumSetType};

/// A single number-handling flag. Combine flags with `|` into an [`EnumSet`].
#[derive(EnumSetType, Debug)]
pub enum NumberHandling {
	/// Numbers may be read from JSON strings such as `"42"`.
	AllowReadingFromString,
	/// Numbers are written as JSON strings such as `"42"`.
	WriteAsString,
	/// `"NaN"`, `"Infinity"` and `"-Infinity"` are read and written for floating point types.
	AllowNamedFloatingPointLiterals,
}

pub type NumberHandlingSet = EnumSet<NumberHandling>;

pub(crate) const NAN_LITERAL: &str = "NaN";
pub(crate) const POSITIVE_INFINITY_LITERAL: &str = "Infinity";
pub(crate) const NEGATIVE_INFINITY_LITERAL: &str = "-Infinity";

/// Parse one of the named floating point literals.
pub(crate) fn parse_named_literal(text: &str) -> Option<f64> {
	match text {
		NAN_LITERAL => Some(f64::NAN),
		POSITIVE_INFINITY_LITERAL => Some(f64::INFINITY),
		NEGATIVE_INFINITY_LITERAL => Some(f64::NEG_INFINITY),
		_ => None,
	}
}

/// The named literal for a non-finite value.
pub(crate) fn named_literal(value: f64) -> &'static str {
	if value.is_nan() {
		NAN_LITERAL
	} else if value.is_sign_positive() {
		POSITIVE_INFINITY_LITERAL
	} else {
		NEGATIVE_INFINITY_LITERAL
	}
}
