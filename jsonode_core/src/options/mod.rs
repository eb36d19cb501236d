//! Options for documents, nodes and the serializer.

mod document;
mod naming;
mod number_handling;
mod serializer_options;

pub use document::*;
pub use naming::*;
pub use number_handling::{NumberHandling, NumberHandlingSet};
pub(crate) use number_handling::{named_literal, parse_named_literal};
pub use serializer_options::*;
