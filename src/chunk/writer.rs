//! Writes chunked messages to an async byte stream.

use bytes::BytesMut;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use super::{DEFAULT_CHUNK_SIZE, END_MARKER, MAX_CHUNK_SIZE};
use crate::error::BoltError;
use crate::message::{encode_message, Message};

/// Writes Bolt-chunked messages to an `AsyncWrite` stream.
pub struct ChunkWriter<W> {
    writer: W,
    max_chunk_size: usize,
    buf: BytesMut,
}

impl<W: AsyncWrite + Unpin> ChunkWriter<W> {
    pub fn new(writer: W) -> Self {
        Self::with_max_chunk_size(writer, DEFAULT_CHUNK_SIZE)
    }

    /// Creates a writer whose chunks carry at most `max_chunk_size` bytes,
    /// clamped to `1..=65535`.
    pub fn with_max_chunk_size(writer: W, max_chunk_size: usize) -> Self {
        Self {
            writer,
            max_chunk_size: max_chunk_size.clamp(1, MAX_CHUNK_SIZE),
            buf: BytesMut::new(),
        }
    }

    /// Writes a complete message body, splitting into chunks if needed,
    /// and appends the `0x0000` terminator.
    pub async fn write_message(&mut self, data: &[u8]) -> Result<(), BoltError> {
        let mut chunks = 0usize;
        for chunk in data.chunks(self.max_chunk_size) {
            let len = chunk.len() as u16;
            self.writer.write_all(&len.to_be_bytes()).await?;
            self.writer.write_all(chunk).await?;
            chunks += 1;
        }
        self.writer.write_all(&END_MARKER).await?;
        tracing::trace!(bytes = data.len(), chunks, "wrote chunked message");
        Ok(())
    }

    /// Encodes a message and writes it as chunks.
    ///
    /// Nothing is written if encoding fails.
    pub async fn send(&mut self, msg: &Message) -> Result<(), BoltError> {
        self.buf.clear();
        encode_message(&mut self.buf, msg)?;
        let body = self.buf.split();
        self.write_message(&body).await
    }

    /// Flushes the underlying writer.
    pub async fn flush(&mut self) -> Result<(), BoltError> {
        self.writer.flush().await?;
        Ok(())
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}
