//! # jsonode
//!
//! A mutable JSON document model with a resumable, descriptor-driven serializer.
//!
//! ## Usage Example
//!
//! ```rust
//! use jsonode::{JsonNode, JsonType, SerializerOptions, from_str};
//!
//! #[derive(Default, JsonType)]
//! struct Config {
//! 	name: String,
//! 	retries: Option<u8>,
//! }
//!
//! # fn main() -> anyhow::Result<()> {
//! let config: Config = from_str(r#"{"name":"demo"}"#, &SerializerOptions::default())?;
//! assert_eq!(config.name, "demo");
//! assert_eq!(config.retries, None);
//!
//! let node = JsonNode::parse_str(r#"{"list":[true]}"#)?.unwrap();
//! assert_eq!(node.get("list")?.unwrap().at(0)?.unwrap().path(), "$.list[0]");
//! # Ok(())
//! # }
//! ```

pub use jsonode_core as core;
pub use jsonode_core::*;
