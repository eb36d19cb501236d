/// Escape `input` for use inside a JSON string literal (without the surrounding quotes).
#[must_use]
pub fn escape_json_string(input: &str) -> String {
	let mut output = String::with_capacity(input.len());
	push_escaped(&mut output, input);
	output
}

pub(crate) fn push_escaped(output: &mut String, input: &str) {
	for c in input.chars() {
		match c {
			'"' => output.push_str("\\\""),
			'\\' => output.push_str("\\\\"),
			'\n' => output.push_str("\\n"),
			'\r' => output.push_str("\\r"),
			'\t' => output.push_str("\\t"),
			'\u{08}' => output.push_str("\\b"),
			'\u{0c}' => output.push_str("\\f"),
			c if c.is_control() => output.push_str(&format!("\\u{:04x}", c as u32)),
			c => output.push(c),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("plain", "plain")]
	#[case("Line1\nLine2\rTab\tBackslash\\", "Line1\\nLine2\\rTab\\tBackslash\\\\")]
	#[case("Hello \"World\"", "Hello \\\"World\\\"")]
	#[case("Control:\x01\x02", "Control:\\u0001\\u0002")]
	#[case("\u{08}\u{0c}", "\\b\\f")]
	#[case("Emoji and text 🌟✨", "Emoji and text 🌟✨")]
	#[case("a/b", "a/b")]
	fn test_escape(#[case] input: &str, #[case] expected: &str) {
		assert_eq!(escape_json_string(input), expected);
	}
}
