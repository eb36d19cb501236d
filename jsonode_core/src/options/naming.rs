//! Property naming policies.
//!
//! A policy maps a declared property name to the name used in JSON. It is consulted once,
//! when a type descriptor is built, and never for names that carry an explicit override.

use std::fmt::Debug;

/// Converts declared names into JSON names.
pub trait NamingPolicy: Send + Sync + Debug {
	fn convert_name(&self, name: &str) -> String;
}

/// `MyProperty`, `my_property` and `myProperty` all become `myProperty`.
///
/// A leading run of upper-case letters is lower-cased as a whole (`URLValue` becomes `urlValue`),
/// and words separated by underscores are joined with their first letter capitalized.
#[derive(Clone, Copy, Debug, Default)]
pub struct CamelCase;

impl NamingPolicy for CamelCase {
	fn convert_name(&self, name: &str) -> String {
		let mut words = name.split('_').filter(|word| !word.is_empty());
		let mut result = match words.next() {
			Some(first) => lower_leading_run(first),
			None => return name.to_string(),
		};
		for word in words {
			let mut chars = word.chars();
			if let Some(c) = chars.next() {
				result.extend(c.to_uppercase());
				result.push_str(chars.as_str());
			}
		}
		result
	}
}

fn lower_leading_run(word: &str) -> String {
	let chars: Vec<char> = word.chars().collect();
	let mut result = String::with_capacity(word.len());
	let mut in_run = true;
	for (i, c) in chars.iter().enumerate() {
		if in_run && c.is_uppercase() {
			let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
			if i > 0 && next_is_lower {
				in_run = false;
				result.push(*c);
			} else {
				result.extend(c.to_lowercase());
			}
		} else {
			in_run = false;
			result.push(*c);
		}
	}
	result
}

/// `MyProperty` and `myProperty` become `my_property`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SnakeCaseLower;

impl NamingPolicy for SnakeCaseLower {
	fn convert_name(&self, name: &str) -> String {
		let chars: Vec<char> = name.chars().collect();
		let mut result = String::with_capacity(name.len() + 4);
		for (i, c) in chars.iter().enumerate() {
			if c.is_uppercase() {
				if i > 0 {
					let prev = chars[i - 1];
					let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
					if prev != '_' && (prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower)) {
						result.push('_');
					}
				}
				result.extend(c.to_lowercase());
			} else {
				result.push(*c);
			}
		}
		result
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("MyProperty", "myProperty")]
	#[case("myProperty", "myProperty")]
	#[case("my_property", "myProperty")]
	#[case("URLValue", "urlValue")]
	#[case("ID", "id")]
	#[case("x", "x")]
	#[case("_leading", "leading")]
	#[case("a_b_c", "aBC")]
	fn test_camel_case(#[case] input: &str, #[case] expected: &str) {
		assert_eq!(CamelCase.convert_name(input), expected);
	}

	#[rstest]
	#[case("MyProperty", "my_property")]
	#[case("myProperty", "my_property")]
	#[case("my_property", "my_property")]
	#[case("URLValue", "url_value")]
	#[case("Value2Go", "value2_go")]
	#[case("ID", "id")]
	fn test_snake_case(#[case] input: &str, #[case] expected: &str) {
		assert_eq!(SnakeCaseLower.convert_name(input), expected);
	}
}
