//! JSON path segments: `$`, `.name`, `['name']` and `[index]`.

use std::fmt::Write;

pub(crate) const ROOT: &str = "$";

/// How a parent reaches one of its children.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Segment {
	Property(String),
	Index(usize),
}

impl Segment {
	pub(crate) fn push_to(&self, path: &mut String) {
		match self {
			Segment::Property(name) => push_property(path, name),
			Segment::Index(index) => push_index(path, *index),
		}
	}
}

fn needs_quotes(name: &str) -> bool {
	name.is_empty()
		|| name.chars().any(|c| {
			c.is_whitespace() || matches!(c, '.' | '\'' | '"' | '/' | '[' | ']' | '(' | ')' | '\\' | '\u{08}' | '\u{0c}')
		})
}

pub(crate) fn push_property(path: &mut String, name: &str) {
	if needs_quotes(name) {
		path.push_str("['");
		for c in name.chars() {
			if c == '\'' || c == '\\' {
				path.push('\\');
			}
			path.push(c);
		}
		path.push_str("']");
	} else {
		path.push('.');
		path.push_str(name);
	}
}

pub(crate) fn push_index(path: &mut String, index: usize) {
	let _ = write!(path, "[{index}]");
}

/// Build a path from root-first segments.
pub(crate) fn build<'a>(segments: impl IntoIterator<Item = &'a Segment>) -> String {
	let mut path = String::from(ROOT);
	for segment in segments {
		segment.push_to(&mut path);
	}
	path
}
