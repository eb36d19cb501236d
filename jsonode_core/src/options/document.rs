//! Options for parsing documents and for DOM nodes.

/// What the tokenizer does with `//` and `/* */` comments.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CommentHandling {
	/// Comments are a format error.
	#[default]
	Disallow,
	/// Comments are skipped like whitespace.
	Skip,
}

/// Tokenizer options, passed through unchanged by `JsonNode::parse` and the serializer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DocumentOptions {
	pub comment_handling: CommentHandling,
	pub allow_trailing_commas: bool,
	pub max_depth: usize,
}

pub const DEFAULT_MAX_DEPTH: usize = 64;

impl Default for DocumentOptions {
	fn default() -> Self {
		Self {
			comment_handling: CommentHandling::Disallow,
			allow_trailing_commas: false,
			max_depth: DEFAULT_MAX_DEPTH,
		}
	}
}

/// Options of a DOM node, inherited by descendants that do not define their own.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NodeOptions {
	/// Object keys are compared case-insensitively. Fixed for an object when its map is created.
	pub property_name_case_insensitive: bool,
}

impl NodeOptions {
	#[must_use]
	pub fn case_insensitive() -> Self {
		Self {
			property_name_case_insensitive: true,
		}
	}
}
