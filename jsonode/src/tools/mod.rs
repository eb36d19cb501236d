pub mod format;
pub mod paths;

use anyhow::{Context, Result};
use clap::Args;
use jsonode_core::{CommentHandling, DocumentOptions, JsonNode, NodeOptions};
use log::debug;
use std::{fs::File, io::stdin};

/// Input options shared by all subcommands.
#[derive(Args, Debug)]
pub struct InputArgs {
	/// JSON file to read, "-" reads stdin
	#[arg(required = true)]
	input: String,

	/// skip /* */ and // comments
	#[arg(long)]
	allow_comments: bool,

	/// accept a comma after the last item of an object or array
	#[arg(long)]
	allow_trailing_commas: bool,

	/// maximum nesting depth
	#[arg(long, default_value_t = jsonode_core::options::DEFAULT_MAX_DEPTH)]
	max_depth: usize,

	/// match property names ignoring case
	#[arg(long, short = 'i')]
	case_insensitive: bool,
}

impl InputArgs {
	fn document_options(&self) -> DocumentOptions {
		DocumentOptions {
			comment_handling: if self.allow_comments {
				CommentHandling::Skip
			} else {
				CommentHandling::Disallow
			},
			allow_trailing_commas: self.allow_trailing_commas,
			max_depth: self.max_depth,
		}
	}

	/// Parse the input document. `None` is a document consisting of `null`.
	pub fn read_document(&self) -> Result<Option<JsonNode>> {
		let node_options = self.case_insensitive.then(NodeOptions::case_insensitive);
		debug!("reading {:?} with {:?}", self.input, self.document_options());
		if self.input == "-" {
			JsonNode::parse_reader(stdin().lock(), node_options, self.document_options())
				.context("while reading JSON from stdin")
		} else {
			let file = File::open(&self.input).with_context(|| format!("while opening {:?}", self.input))?;
			JsonNode::parse_reader(file, node_options, self.document_options())
				.with_context(|| format!("while reading JSON from {:?}", self.input))
		}
	}
}
