/// The kind of token the reader is positioned on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TokenType {
	#[default]
	None,
	StartObject,
	EndObject,
	StartArray,
	EndArray,
	PropertyName,
	String,
	Number,
	True,
	False,
	Null,
}

impl TokenType {
	#[must_use]
	pub fn is_start(self) -> bool {
		matches!(self, TokenType::StartObject | TokenType::StartArray)
	}

	#[must_use]
	pub fn is_end(self) -> bool {
		matches!(self, TokenType::EndObject | TokenType::EndArray)
	}

	/// Scalar tokens: strings, numbers and literals.
	#[must_use]
	pub fn is_scalar(self) -> bool {
		matches!(
			self,
			TokenType::String | TokenType::Number | TokenType::True | TokenType::False | TokenType::Null
		)
	}

	/// True after a token that completes a value (a scalar or a closing bracket).
	#[must_use]
	pub fn ends_value(self) -> bool {
		self.is_scalar() || self.is_end()
	}

	#[must_use]
	pub fn as_str(self) -> &'static str {
		match self {
			TokenType::None => "none",
			TokenType::StartObject => "start of object",
			TokenType::EndObject => "end of object",
			TokenType::StartArray => "start of array",
			TokenType::EndArray => "end of array",
			TokenType::PropertyName => "property name",
			TokenType::String => "string",
			TokenType::Number => "number",
			TokenType::True => "true",
			TokenType::False => "false",
			TokenType::Null => "null",
		}
	}
}
