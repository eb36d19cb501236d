//! Serialization over tokio streams.

use super::{ReadOperation, WriteOperation};
use crate::{metadata::JsonType, options::SerializerOptions};
use anyhow::Result;
use jsonode_derive::context;
use log::trace;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Serialize `value` into `sink`. Every suspension of the write operation becomes one
/// `write_all` on the sink.
#[context("while serializing {} to an async stream", std::any::type_name::<T>())]
pub async fn to_async_writer<T, W>(sink: &mut W, value: &T, options: &SerializerOptions) -> Result<()>
where
	T: JsonType,
	W: AsyncWrite + Unpin,
{
	let mut operation = WriteOperation::new(value, options)?;
	loop {
		let done = operation.step()?;
		let chunk = operation.take_pending();
		if !chunk.is_empty() {
			sink.write_all(&chunk).await?;
		}
		if done {
			break;
		}
	}
	sink.flush().await?;
	trace!("wrote {} bytes asynchronously", operation.bytes_written());
	Ok(())
}

/// Deserialize from `source`. The chunk size starts at the default buffer size and doubles
/// whenever the unconsumed input outgrows it.
#[context("while deserializing {} from an async stream", std::any::type_name::<T>())]
pub async fn from_async_reader<T, R>(source: &mut R, options: &SerializerOptions) -> Result<T>
where
	T: JsonType,
	R: AsyncRead + Unpin,
{
	let mut operation = ReadOperation::<T>::new(options)?;
	let mut chunk = vec![0; options.default_buffer_size().max(1)];
	loop {
		let count = source.read(&mut chunk).await?;
		if count == 0 {
			break;
		}
		operation.feed(&chunk[..count])?;
		if operation.buffered() >= chunk.len() {
			let size = chunk.len() * 2;
			chunk.resize(size, 0);
		}
	}
	operation.finish()
}
