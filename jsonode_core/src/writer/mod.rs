//! Buffered JSON output.
//!
//! [`JsonWriter`] accumulates output in memory; the number of bytes not yet handed to a sink
//! is [`JsonWriter::bytes_pending`], which the serializer polls to decide when to suspend.

mod escape;
mod json_writer;

pub use escape::escape_json_string;
pub use json_writer::*;
