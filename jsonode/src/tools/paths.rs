use super::InputArgs;
use anyhow::Result;
use clap::Args;
use jsonode_core::{JsonNode, ValueKind};
use std::io::{Write, stdout};

#[derive(Args, Debug)]
#[command(arg_required_else_help = true, disable_version_flag = true)]
pub struct Subcommand {
	#[command(flatten)]
	input: InputArgs,

	/// print the value of every scalar
	#[arg(long)]
	values: bool,
}

pub fn run(arguments: &Subcommand) -> Result<()> {
	let node = arguments.input.read_document()?;
	let mut sink = stdout().lock();
	if let Some(node) = node {
		write_paths(&node, arguments.values, &mut sink)?;
	}
	Ok(())
}

/// One line per non-null node: its path, its kind and optionally its value.
fn write_paths(node: &JsonNode, values: bool, sink: &mut impl Write) -> Result<()> {
	let kind = node.value_kind();
	if values && !matches!(kind, ValueKind::Object | ValueKind::Array) {
		writeln!(sink, "{}\t{kind}\t{}", node.path(), node.to_json_string()?)?;
	} else {
		writeln!(sink, "{}\t{kind}", node.path())?;
	}

	let children = match kind {
		ValueKind::Object => node.as_object()?.entries()?.into_iter().map(|(_, child)| child).collect(),
		ValueKind::Array => node.as_array()?.items()?,
		_ => Vec::new(),
	};
	for child in children.iter().flatten() {
		write_paths(child, values, sink)?;
	}
	Ok(())
}
