//! Resumable token reader.
//!
//! The reader works on a byte slice that may hold only part of the document. When the slice ends
//! in the middle of a token and more data may follow, `read` reports "no token" instead of an
//! error; the caller keeps the [`ReaderState`], refills its buffer starting at
//! [`JsonReader::bytes_consumed`] and continues with a new reader.

mod json_reader;
pub(crate) mod scan;
mod token;

pub use json_reader::*;
pub use token::TokenType;
