/// The JSON type of a node or element.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ValueKind {
	#[default]
	Undefined,
	Object,
	Array,
	String,
	Number,
	True,
	False,
	Null,
}

impl ValueKind {
	#[must_use]
	pub fn as_str(&self) -> &'static str {
		match self {
			ValueKind::Undefined => "undefined",
			ValueKind::Object => "object",
			ValueKind::Array => "array",
			ValueKind::String => "string",
			ValueKind::Number => "number",
			ValueKind::True => "true",
			ValueKind::False => "false",
			ValueKind::Null => "null",
		}
	}
}

impl std::fmt::Display for ValueKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}
