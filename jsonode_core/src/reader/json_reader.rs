use super::{
	TokenType,
	scan::{ScanError, scan_literal, scan_number, scan_string, skip_trivia, unescape},
};
use crate::{error::JsonError, options::DocumentOptions};
use anyhow::{Error, Result};
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Container {
	Object,
	Array,
}

/// Everything a reader needs to continue on the next buffer.
#[derive(Clone, Debug, Default)]
pub struct ReaderState {
	containers: Vec<Container>,
	token_type: TokenType,
	offset: u64,
	options: DocumentOptions,
}

impl ReaderState {
	#[must_use]
	pub fn new(options: DocumentOptions) -> Self {
		Self {
			options,
			..Self::default()
		}
	}

	#[must_use]
	pub fn token_type(&self) -> TokenType {
		self.token_type
	}

	/// Number of open containers.
	#[must_use]
	pub fn depth(&self) -> usize {
		self.containers.len()
	}

	/// Absolute offset of the first byte the next reader will see.
	#[must_use]
	pub fn offset(&self) -> u64 {
		self.offset
	}

	/// True once a complete top-level value has been read.
	#[must_use]
	pub fn is_root_complete(&self) -> bool {
		self.containers.is_empty() && self.token_type.ends_value()
	}
}

enum Expect {
	Value,
	Name,
	End,
}

/// Token reader over a (possibly partial) UTF-8 JSON buffer.
#[derive(Clone, Debug)]
pub struct JsonReader<'a> {
	buffer: &'a [u8],
	is_final_block: bool,
	consumed: usize,
	token_start: usize,
	value_start: usize,
	value_end: usize,
	value_has_escapes: bool,
	state: ReaderState,
}

impl<'a> JsonReader<'a> {
	/// Create a reader continuing from `state`. `is_final_block` says that no data follows `buffer`.
	#[must_use]
	pub fn new(buffer: &'a [u8], is_final_block: bool, state: ReaderState) -> Self {
		Self {
			buffer,
			is_final_block,
			consumed: 0,
			token_start: 0,
			value_start: 0,
			value_end: 0,
			value_has_escapes: false,
			state,
		}
	}

	/// Create a reader over a complete document.
	#[must_use]
	pub fn from_slice(buffer: &'a [u8], options: DocumentOptions) -> Self {
		Self::new(buffer, true, ReaderState::new(options))
	}

	#[must_use]
	pub fn token_type(&self) -> TokenType {
		self.state.token_type
	}

	#[must_use]
	pub fn is_final_block(&self) -> bool {
		self.is_final_block
	}

	/// Bytes of the buffer fully processed so far.
	#[must_use]
	pub fn bytes_consumed(&self) -> usize {
		self.consumed
	}

	/// Absolute offset of the current token in the whole input.
	#[must_use]
	pub fn token_position(&self) -> u64 {
		self.state.offset + self.token_start as u64
	}

	/// Depth of the current token; the root value has depth 0.
	#[must_use]
	pub fn current_depth(&self) -> usize {
		let depth = self.state.containers.len();
		if self.state.token_type.is_start() { depth - 1 } else { depth }
	}

	#[must_use]
	pub fn options(&self) -> &DocumentOptions {
		&self.state.options
	}

	/// The state to continue with after the consumed part of the buffer has been dropped.
	#[must_use]
	pub fn state(&self) -> ReaderState {
		let mut state = self.state.clone();
		state.offset += self.consumed as u64;
		state
	}

	#[must_use]
	pub fn into_state(mut self) -> ReaderState {
		self.state.offset += self.consumed as u64;
		self.state
	}

	/// Format error at the current token.
	#[must_use]
	pub fn format_error(&self, message: &str) -> Error {
		JsonError::format(message).at_position(self.token_position()).into()
	}

	fn scan_error(&self, err: ScanError) -> Error {
		JsonError::format(err.message).at_position(self.state.offset + err.index as u64).into()
	}

	fn error_at(&self, index: usize, message: String) -> Error {
		JsonError::format(message).at_position(self.state.offset + index as u64).into()
	}

	fn skip_trivia(&self, index: usize) -> Result<Option<usize>> {
		skip_trivia(self.buffer, index, self.state.options.comment_handling, self.is_final_block)
			.map_err(|err| self.scan_error(err))
	}

	fn end_of_buffer(&self) -> Result<bool> {
		if !self.is_final_block {
			return Ok(false);
		}
		if self.state.containers.is_empty() && self.state.token_type == TokenType::None {
			Err(self.error_at(self.buffer.len(), "the input does not contain any JSON tokens".into()))
		} else {
			Err(self.error_at(self.buffer.len(), "unexpected end of data".into()))
		}
	}

	fn set_token(&mut self, token_type: TokenType, start: usize, value: (usize, usize), consumed: usize) {
		self.state.token_type = token_type;
		self.token_start = start;
		self.value_start = value.0;
		self.value_end = value.1;
		self.consumed = consumed;
	}

	/// Advance to the next token.
	///
	/// Returns `false` if the buffer holds no further complete token. For a non-final buffer
	/// that means "feed more data"; for the final buffer it means the document has ended.
	/// Nothing is consumed when `false` is returned for a partial token.
	pub fn read(&mut self) -> Result<bool> {
		let Some(mut pos) = self.skip_trivia(self.consumed)? else {
			return Ok(false);
		};
		let previous = self.state.token_type;
		let top = self.state.containers.last().copied();

		if top.is_none() && previous.ends_value() {
			if let Some(&byte) = self.buffer.get(pos) {
				return Err(self.error_at(
					pos,
					format!("'{}' is invalid after a single JSON value, expected end of data", byte as char),
				));
			}
			self.consumed = pos;
			return Ok(false);
		}
		if pos >= self.buffer.len() {
			return self.end_of_buffer();
		}

		let byte = self.buffer[pos];
		let expect = match (top, previous) {
			(_, TokenType::None | TokenType::PropertyName) => Expect::Value,
			(Some(Container::Array), TokenType::StartArray) if byte == b']' => Expect::End,
			(Some(Container::Object), TokenType::StartObject) if byte == b'}' => Expect::End,
			(Some(Container::Array), TokenType::StartArray) => Expect::Value,
			(Some(Container::Object), TokenType::StartObject) => Expect::Name,
			(Some(container), _) => match byte {
				b',' => {
					let Some(next) = self.skip_trivia(pos + 1)? else {
						return Ok(false);
					};
					pos = next;
					let Some(&next_byte) = self.buffer.get(pos) else {
						return self.end_of_buffer();
					};
					let closes = matches!(
						(container, next_byte),
						(Container::Object, b'}') | (Container::Array, b']')
					);
					if closes {
						if !self.state.options.allow_trailing_commas {
							return Err(self.error_at(pos, "trailing commas are not allowed".into()));
						}
						Expect::End
					} else if container == Container::Object {
						Expect::Name
					} else {
						Expect::Value
					}
				}
				b'}' if container == Container::Object => Expect::End,
				b']' if container == Container::Array => Expect::End,
				_ => {
					let message = match container {
						Container::Object => "expected ',' or '}' after property value",
						Container::Array => "expected ',' or ']' after array element",
					};
					return Err(self.error_at(pos, message.into()));
				}
			},
			(None, _) => Expect::Value,
		};

		match expect {
			Expect::End => self.read_end(pos),
			Expect::Name => self.read_property_name(pos),
			Expect::Value => self.read_value(pos),
		}
	}

	fn read_end(&mut self, pos: usize) -> Result<bool> {
		let byte = self.buffer[pos];
		let token_type = match (self.state.containers.last(), byte) {
			(Some(Container::Object), b'}') => TokenType::EndObject,
			(Some(Container::Array), b']') => TokenType::EndArray,
			_ => return Err(self.error_at(pos, format!("unexpected '{}'", byte as char))),
		};
		self.state.containers.pop();
		self.set_token(token_type, pos, (pos, pos + 1), pos + 1);
		Ok(true)
	}

	fn read_property_name(&mut self, pos: usize) -> Result<bool> {
		if self.buffer[pos] != b'"' {
			return Err(self.error_at(
				pos,
				format!("expected a property name in quotes, found '{}'", self.buffer[pos] as char),
			));
		}
		let Some((end, has_escapes)) = scan_string(self.buffer, pos + 1, self.is_final_block).map_err(|e| self.scan_error(e))?
		else {
			return Ok(false);
		};
		let Some(colon) = self.skip_trivia(end)? else {
			return Ok(false);
		};
		match self.buffer.get(colon) {
			Some(b':') => {}
			Some(&other) => {
				return Err(self.error_at(
					colon,
					format!("expected ':' after property name, found '{}'", other as char),
				));
			}
			None => return self.end_of_buffer(),
		}
		self.value_has_escapes = has_escapes;
		self.set_token(TokenType::PropertyName, pos, (pos + 1, end - 1), colon + 1);
		Ok(true)
	}

	fn read_value(&mut self, pos: usize) -> Result<bool> {
		let is_final = self.is_final_block;
		let buffer = self.buffer;
		let scanned = match buffer[pos] {
			b'{' | b'[' => {
				if self.state.containers.len() >= self.state.options.max_depth {
					return Err(self.error_at(
						pos,
						format!("the maximum depth of {} has been exceeded", self.state.options.max_depth),
					));
				}
				let (container, token_type) = if buffer[pos] == b'{' {
					(Container::Object, TokenType::StartObject)
				} else {
					(Container::Array, TokenType::StartArray)
				};
				self.state.containers.push(container);
				self.set_token(token_type, pos, (pos, pos + 1), pos + 1);
				return Ok(true);
			}
			b'"' => scan_string(buffer, pos + 1, is_final).map(|r| {
				r.map(|(end, has_escapes)| (TokenType::String, (pos + 1, end - 1), end, has_escapes))
			}),
			b'-' | b'0'..=b'9' => {
				scan_number(buffer, pos, is_final).map(|r| r.map(|end| (TokenType::Number, (pos, end), end, false)))
			}
			b't' => scan_literal(buffer, pos, b"true", is_final)
				.map(|r| r.map(|end| (TokenType::True, (pos, end), end, false))),
			b'f' => scan_literal(buffer, pos, b"false", is_final)
				.map(|r| r.map(|end| (TokenType::False, (pos, end), end, false))),
			b'n' => scan_literal(buffer, pos, b"null", is_final)
				.map(|r| r.map(|end| (TokenType::Null, (pos, end), end, false))),
			other => {
				return Err(self.error_at(pos, format!("'{}' is an invalid start of a value", other as char)));
			}
		};
		match scanned.map_err(|e| self.scan_error(e))? {
			Some((token_type, value, end, has_escapes)) => {
				self.value_has_escapes = has_escapes;
				self.set_token(token_type, pos, value, end);
				Ok(true)
			}
			None => Ok(false),
		}
	}

	/// Read the next token; if it starts an object or array and `require_complete_value` is set,
	/// make sure the whole value is buffered. If it is not, the reader is left untouched and
	/// `false` is returned.
	pub fn read_with_read_ahead(&mut self, require_complete_value: bool) -> Result<bool> {
		if !require_complete_value || self.is_final_block {
			return self.read();
		}
		let checkpoint = self.clone();
		if !self.read()? {
			return Ok(false);
		}
		if self.state.token_type.is_start() {
			let mut lookahead = self.clone();
			if !lookahead.try_skip()? {
				*self = checkpoint;
				return Ok(false);
			}
		}
		Ok(true)
	}

	/// Skip the value at the current token. On a property name the property's value is skipped.
	/// Returns `false` and leaves the reader untouched if the value is not completely buffered.
	pub fn try_skip(&mut self) -> Result<bool> {
		let mut lookahead = self.clone();
		if lookahead.state.token_type == TokenType::PropertyName && !lookahead.read()? {
			return Ok(false);
		}
		if lookahead.state.token_type.is_start() {
			let depth = lookahead.current_depth();
			loop {
				if !lookahead.read()? {
					return Ok(false);
				}
				if lookahead.state.token_type.is_end() && lookahead.current_depth() == depth {
					break;
				}
			}
		}
		*self = lookahead;
		Ok(true)
	}

	/// Skip a value that is known to be completely buffered.
	pub fn skip(&mut self) -> Result<()> {
		if self.try_skip()? {
			Ok(())
		} else {
			Err(self.format_error("unexpected end of data while skipping a value"))
		}
	}

	/// Raw bytes of the current token: the body of a string or property name (still escaped),
	/// the text of a number or literal, or the bracket of a container token.
	#[must_use]
	pub fn value_bytes(&self) -> &'a [u8] {
		&self.buffer[self.value_start..self.value_end]
	}

	/// The unescaped text of a string or property name token.
	pub fn get_string(&self) -> Result<String> {
		match self.state.token_type {
			TokenType::String | TokenType::PropertyName => {}
			other => {
				return Err(self.format_error(&format!("cannot get a string from a token of type {}", other.as_str())));
			}
		}
		let bytes = self.value_bytes();
		if self.value_has_escapes {
			unescape(bytes).map_err(|err| self.error_at(self.value_start + err.index, err.message))
		} else {
			String::from_utf8(bytes.to_vec()).map_err(|_| self.format_error("invalid UTF-8 in string"))
		}
	}

	pub fn get_bool(&self) -> Result<bool> {
		match self.state.token_type {
			TokenType::True => Ok(true),
			TokenType::False => Ok(false),
			other => Err(self.format_error(&format!(
				"cannot get a boolean from a token of type {}",
				other.as_str()
			))),
		}
	}

	/// The text of a number token.
	pub fn number_text(&self) -> Result<&'a str> {
		if self.state.token_type != TokenType::Number {
			return Err(self.format_error(&format!(
				"cannot get a number from a token of type {}",
				self.state.token_type.as_str()
			)));
		}
		std::str::from_utf8(self.value_bytes()).map_err(|_| self.format_error("invalid number"))
	}

	/// Parse the current number token as `T`, `None` if it does not fit.
	#[must_use]
	pub fn try_get_number<T: FromStr>(&self) -> Option<T> {
		self.number_text().ok()?.parse::<T>().ok()
	}
}
