use super::InputArgs;
use anyhow::{Context, Result};
use clap::Args;
use jsonode_core::{JsonNode, JsonWriter, WriterOptions};
use log::info;
use std::{
	fs::File,
	io::{BufWriter, Write, stdout},
	path::PathBuf,
};

#[derive(Args, Debug)]
#[command(arg_required_else_help = true, disable_version_flag = true)]
pub struct Subcommand {
	#[command(flatten)]
	input: InputArgs,

	/// write to this file instead of stdout
	#[arg(long, short)]
	output: Option<PathBuf>,

	/// write everything on one line
	#[arg(long, short)]
	compact: bool,
}

pub fn run(arguments: &Subcommand) -> Result<()> {
	let node = arguments.input.read_document()?;
	let options = WriterOptions {
		indented: !arguments.compact,
		max_depth: arguments.input.max_depth,
	};

	match &arguments.output {
		Some(path) => {
			let file = File::create(path).with_context(|| format!("while creating {path:?}"))?;
			let mut sink = BufWriter::new(file);
			write_document(node.as_ref(), options, &mut sink)?;
			sink.flush()?;
			info!("wrote {path:?}");
		}
		None => write_document(node.as_ref(), options, &mut stdout().lock())?,
	}
	Ok(())
}

fn write_document(node: Option<&JsonNode>, options: WriterOptions, sink: &mut impl Write) -> Result<()> {
	let mut writer = JsonWriter::new(options);
	match node {
		Some(node) => node.write_to(&mut writer)?,
		None => writer.write_null()?,
	}
	writer.flush(sink)?;
	sink.write_all(b"\n")?;
	Ok(())
}

#[cfg(test)]
mod tests {
	use crate::tests::run_command;
	use anyhow::Result;
	use assert_fs::{NamedTempFile, prelude::*};
	use pretty_assertions::assert_eq;
	use std::fs::read_to_string;

	#[test]
	fn test_format_file() -> Result<()> {
		let input = NamedTempFile::new("input.json")?;
		input.write_str("{ \"a\" : [1, 2.50, \"x\"], \"b\" : { } }")?;
		let output = NamedTempFile::new("output.json")?;

		run_command(vec![
			"jsonode",
			"format",
			input.path().to_str().unwrap(),
			"-o",
			output.path().to_str().unwrap(),
		])?;
		assert_eq!(
			read_to_string(output.path())?,
			"{\n  \"a\": [\n    1,\n    2.50,\n    \"x\"\n  ],\n  \"b\": {}\n}\n"
		);

		run_command(vec![
			"jsonode",
			"format",
			"--compact",
			input.path().to_str().unwrap(),
			"--output",
			output.path().to_str().unwrap(),
		])?;
		assert_eq!(read_to_string(output.path())?, "{\"a\":[1,2.50,\"x\"],\"b\":{}}\n");
		Ok(())
	}

	#[test]
	fn test_comments_and_trailing_commas() -> Result<()> {
		let input = NamedTempFile::new("input.json")?;
		input.write_str("[1, // one\n 2,]")?;
		let output = NamedTempFile::new("output.json")?;
		let input_path = input.path().to_str().unwrap();
		let output_path = output.path().to_str().unwrap();

		let err = run_command(vec!["jsonode", "format", input_path, "-o", output_path]).unwrap_err();
		assert!(format!("{err:?}").contains("while reading JSON from"), "{err:?}");

		run_command(vec![
			"jsonode",
			"format",
			"--allow-comments",
			"--allow-trailing-commas",
			"-c",
			input_path,
			"-o",
			output_path,
		])?;
		assert_eq!(read_to_string(output.path())?, "[1,2]\n");
		Ok(())
	}

	#[test]
	fn test_null_document() -> Result<()> {
		let input = NamedTempFile::new("null.json")?;
		input.write_str(" null ")?;
		let output = NamedTempFile::new("output.json")?;
		run_command(vec![
			"jsonode",
			"format",
			input.path().to_str().unwrap(),
			"-o",
			output.path().to_str().unwrap(),
		])?;
		assert_eq!(read_to_string(output.path())?, "null\n");
		Ok(())
	}

	#[test]
	fn test_missing_file() {
		let err = run_command(vec!["jsonode", "format", "does/not/exist.json"]).unwrap_err();
		assert!(err.to_string().starts_with("while opening"), "{err}");
	}
}
