//! Byte-level scanners used by [`JsonReader`](super::JsonReader).
//!
//! Each scanner looks at a buffer that may end in the middle of a token. It returns
//! `Ok(Some(end))` for a complete token, `Ok(None)` when more input is needed (only possible
//! when the buffer is not the final block) and `Err` for malformed input.

use crate::options::CommentHandling;

/// A malformed-input error with the buffer index it was detected at.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct ScanError {
	pub message: String,
	pub index: usize,
}

impl ScanError {
	fn new(index: usize, message: impl Into<String>) -> Self {
		Self {
			message: message.into(),
			index,
		}
	}
}

pub(crate) type Scan<T> = Result<Option<T>, ScanError>;

fn incomplete<T>(is_final: bool, index: usize, what: &str) -> Scan<T> {
	if is_final {
		Err(ScanError::new(index, format!("unexpected end of data while reading {what}")))
	} else {
		Ok(None)
	}
}

#[inline]
pub(crate) fn is_whitespace(byte: u8) -> bool {
	matches!(byte, b' ' | b'\t' | b'\n' | b'\r')
}

#[inline]
fn is_delimiter(byte: u8) -> bool {
	is_whitespace(byte) || matches!(byte, b',' | b']' | b'}' | b'/')
}

/// Skip whitespace and, if allowed, comments. Returns the index of the next significant byte,
/// or `buffer.len()` if there is none.
pub(crate) fn skip_trivia(buffer: &[u8], mut index: usize, comments: CommentHandling, is_final: bool) -> Scan<usize> {
	while index < buffer.len() {
		match buffer[index] {
			b if is_whitespace(b) => index += 1,
			b'/' => {
				if comments == CommentHandling::Disallow {
					return Err(ScanError::new(index, "comments are not allowed"));
				}
				let Some(&kind) = buffer.get(index + 1) else {
					return incomplete(is_final, index, "a comment");
				};
				match kind {
					b'/' => match buffer[index + 2..].iter().position(|&b| b == b'\n') {
						Some(offset) => index += offset + 3,
						None if is_final => index = buffer.len(),
						None => return Ok(None),
					},
					b'*' => match buffer[index + 2..].windows(2).position(|w| w == b"*/") {
						Some(offset) => index += offset + 4,
						None => return incomplete(is_final, index, "a comment"),
					},
					_ => return Err(ScanError::new(index, "invalid comment, expected '//' or '/*'")),
				}
			}
			_ => break,
		}
	}
	Ok(Some(index))
}

/// Scan a string body starting right after the opening quote.
/// Returns the index after the closing quote and whether escapes occur.
pub(crate) fn scan_string(buffer: &[u8], start: usize, is_final: bool) -> Scan<(usize, bool)> {
	let mut index = start;
	let mut has_escapes = false;
	while index < buffer.len() {
		match buffer[index] {
			b'"' => return Ok(Some((index + 1, has_escapes))),
			b'\\' => {
				has_escapes = true;
				let Some(&escape) = buffer.get(index + 1) else {
					return incomplete(is_final, index, "a string");
				};
				match escape {
					b'"' | b'\\' | b'/' | b'b' | b'f' | b'n' | b'r' | b't' => index += 2,
					b'u' => {
						if index + 6 > buffer.len() {
							return incomplete(is_final, index, "a string");
						}
						if !buffer[index + 2..index + 6].iter().all(u8::is_ascii_hexdigit) {
							return Err(ScanError::new(index, "invalid unicode escape, expected 4 hex digits"));
						}
						index += 6;
					}
					other => {
						return Err(ScanError::new(
							index,
							format!("invalid escape character '{}'", other as char),
						));
					}
				}
			}
			b if b < 0x20 => {
				return Err(ScanError::new(index, "control characters must be escaped in strings"));
			}
			_ => index += 1,
		}
	}
	incomplete(is_final, index, "a string")
}

/// Scan a number according to the JSON grammar, starting at its first byte.
/// Returns the index after the last byte of the number.
pub(crate) fn scan_number(buffer: &[u8], start: usize, is_final: bool) -> Scan<usize> {
	let len = buffer.len();
	let mut index = start;

	// A number may legally end at the end of the buffer only if it is the final block.
	let may_end = |index: usize| -> Scan<usize> { if is_final { Ok(Some(index)) } else { Ok(None) } };
	let digits = |mut index: usize| {
		while index < len && buffer[index].is_ascii_digit() {
			index += 1;
		}
		index
	};

	if buffer[index] == b'-' {
		index += 1;
		if index == len {
			return incomplete(is_final, index, "a number");
		}
	}
	match buffer[index] {
		b'0' => index += 1,
		b'1'..=b'9' => index = digits(index + 1),
		_ => return Err(ScanError::new(index, "expected a digit in number")),
	}
	if index == len {
		return may_end(index);
	}

	if buffer[index] == b'.' {
		index += 1;
		if index == len {
			return incomplete(is_final, index, "a number");
		}
		if !buffer[index].is_ascii_digit() {
			return Err(ScanError::new(index, "expected digits after decimal point"));
		}
		index = digits(index);
		if index == len {
			return may_end(index);
		}
	}

	if matches!(buffer[index], b'e' | b'E') {
		index += 1;
		if index < len && matches!(buffer[index], b'+' | b'-') {
			index += 1;
		}
		if index == len {
			return incomplete(is_final, index, "a number");
		}
		if !buffer[index].is_ascii_digit() {
			return Err(ScanError::new(index, "expected digits after exponent"));
		}
		index = digits(index);
		if index == len {
			return may_end(index);
		}
	}

	if is_delimiter(buffer[index]) {
		Ok(Some(index))
	} else {
		Err(ScanError::new(
			index,
			format!("unexpected character '{}' in number", buffer[index] as char),
		))
	}
}

/// Scan one of the literals `true`, `false`, `null`.
pub(crate) fn scan_literal(buffer: &[u8], start: usize, literal: &[u8], is_final: bool) -> Scan<usize> {
	for (offset, expected) in literal.iter().enumerate() {
		match buffer.get(start + offset) {
			Some(b) if b == expected => {}
			Some(_) => {
				return Err(ScanError::new(
					start + offset,
					format!("invalid literal, expected '{}'", String::from_utf8_lossy(literal)),
				));
			}
			None => return incomplete(is_final, start + offset, "a literal"),
		}
	}
	let end = start + literal.len();
	match buffer.get(end) {
		Some(&b) if !is_delimiter(b) => Err(ScanError::new(
			end,
			format!("unexpected character '{}' after literal", b as char),
		)),
		_ => Ok(Some(end)),
	}
}

/// Decode the body of a string that contains escapes. The body has already been validated
/// by [`scan_string`], apart from surrogate pairing.
pub(crate) fn unescape(bytes: &[u8]) -> Result<String, ScanError> {
	let mut result = Vec::with_capacity(bytes.len());
	let mut index = 0;
	while index < bytes.len() {
		let byte = bytes[index];
		if byte != b'\\' {
			result.push(byte);
			index += 1;
			continue;
		}
		let escape = bytes.get(index + 1).copied().unwrap_or(0);
		index += 2;
		match escape {
			b'"' => result.push(b'"'),
			b'\\' => result.push(b'\\'),
			b'/' => result.push(b'/'),
			b'b' => result.push(b'\x08'),
			b'f' => result.push(b'\x0C'),
			b'n' => result.push(b'\n'),
			b'r' => result.push(b'\r'),
			b't' => result.push(b'\t'),
			b'u' => {
				let high = read_hex(bytes, index)?;
				index += 4;
				let code_point = if (0xD800..0xDC00).contains(&high) {
					if bytes.get(index) != Some(&b'\\') || bytes.get(index + 1) != Some(&b'u') {
						return Err(ScanError::new(index, "unpaired high surrogate in unicode escape"));
					}
					let low = read_hex(bytes, index + 2)?;
					if !(0xDC00..0xE000).contains(&low) {
						return Err(ScanError::new(index, "invalid low surrogate in unicode escape"));
					}
					index += 6;
					0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00)
				} else if (0xDC00..0xE000).contains(&high) {
					return Err(ScanError::new(index, "unpaired low surrogate in unicode escape"));
				} else {
					high
				};
				let c = char::from_u32(code_point).ok_or_else(|| ScanError::new(index, "invalid unicode code point"))?;
				let mut utf8 = [0u8; 4];
				result.extend_from_slice(c.encode_utf8(&mut utf8).as_bytes());
			}
			other => {
				return Err(ScanError::new(
					index,
					format!("invalid escape character '{}'", other as char),
				));
			}
		}
	}
	String::from_utf8(result).map_err(|_| ScanError::new(0, "invalid UTF-8 in string"))
}

fn read_hex(bytes: &[u8], index: usize) -> Result<u32, ScanError> {
	bytes
		.get(index..index + 4)
		.and_then(|hex| std::str::from_utf8(hex).ok())
		.and_then(|hex| u32::from_str_radix(hex, 16).ok())
		.ok_or_else(|| ScanError::new(index, "invalid unicode escape"))
}

/// Checks that `text` is a complete JSON number (used for numbers quoted in strings).
pub(crate) fn is_json_number(text: &str) -> bool {
	!text.is_empty() && matches!(scan_number(text.as_bytes(), 0, true), Ok(Some(end)) if end == text.len())
}
