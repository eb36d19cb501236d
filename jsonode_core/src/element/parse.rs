use super::{JsonElement, json_element::ElementData};
use crate::{
	options::DocumentOptions,
	reader::{JsonReader, TokenType},
};
use anyhow::Result;
use jsonode_derive::context;

enum Partial {
	Array(Vec<JsonElement>),
	Object(Vec<(String, JsonElement)>, Option<String>),
}

impl JsonElement {
	/// Parse a complete JSON document.
	pub fn parse(json: &str, options: DocumentOptions) -> Result<JsonElement> {
		Self::parse_slice(json.as_bytes(), options)
	}

	#[context("while parsing a JSON document")]
	pub fn parse_slice(json: &[u8], options: DocumentOptions) -> Result<JsonElement> {
		let mut reader = JsonReader::from_slice(json, options);
		if !reader.read()? {
			return Err(reader.format_error("the input does not contain any JSON tokens"));
		}
		let element = Self::read_from(&mut reader)?;
		// fails on trailing data
		reader.read()?;
		Ok(element)
	}

	/// Build an element from the value starting at the reader's current token.
	///
	/// The whole value must be buffered (see [`JsonReader::read_with_read_ahead`]). Afterwards
	/// the reader is positioned on the last token of the value.
	pub fn read_from(reader: &mut JsonReader) -> Result<JsonElement> {
		let mut stack: Vec<Partial> = Vec::new();
		loop {
			let completed = match reader.token_type() {
				TokenType::StartObject => {
					stack.push(Partial::Object(Vec::new(), None));
					None
				}
				TokenType::StartArray => {
					stack.push(Partial::Array(Vec::new()));
					None
				}
				TokenType::PropertyName => {
					if let Some(Partial::Object(_, name)) = stack.last_mut() {
						*name = Some(reader.get_string()?);
					}
					None
				}
				TokenType::EndObject | TokenType::EndArray => match stack.pop() {
					Some(Partial::Array(items)) => Some(ElementData::Array(items)),
					Some(Partial::Object(entries, _)) => Some(ElementData::Object(entries)),
					None => return Err(reader.format_error("unexpected end of a container")),
				},
				TokenType::String => Some(ElementData::String(reader.get_string()?)),
				TokenType::Number => Some(ElementData::Number(reader.number_text()?.to_string())),
				TokenType::True => Some(ElementData::Bool(true)),
				TokenType::False => Some(ElementData::Bool(false)),
				TokenType::Null => Some(ElementData::Null),
				TokenType::None => return Err(reader.format_error("expected a JSON value")),
			};

			if let Some(data) = completed {
				let element = JsonElement::from_data(data);
				match stack.last_mut() {
					None => return Ok(element),
					Some(Partial::Array(items)) => items.push(element),
					Some(Partial::Object(entries, name)) => match name.take() {
						Some(name) => entries.push((name, element)),
						None => return Err(reader.format_error("missing property name")),
					},
				}
			}

			if !reader.read()? {
				return Err(reader.format_error("unexpected end of data"));
			}
		}
	}
}
