//! Reads chunked messages from an async byte stream.

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt};

use super::DEFAULT_MAX_MESSAGE_SIZE;
use crate::error::BoltError;
use crate::message::{decode_message, Message};

/// Reads Bolt-chunked messages from an `AsyncRead` stream.
///
/// Each message consists of one or more chunks (2-byte big-endian length prefix
/// followed by that many data bytes), terminated by a zero-length chunk (0x0000).
/// No state survives a failed read; the failing message is simply lost.
pub struct ChunkReader<R> {
    reader: R,
    max_message_size: usize,
}

impl<R: AsyncRead + Unpin> ChunkReader<R> {
    pub fn new(reader: R) -> Self {
        Self::with_max_message_size(reader, DEFAULT_MAX_MESSAGE_SIZE)
    }

    pub fn with_max_message_size(reader: R, max_message_size: usize) -> Self {
        Self {
            reader,
            max_message_size,
        }
    }

    /// Reads a complete message body (all chunks until the `0x0000` terminator).
    ///
    /// A stream that ends before the terminator yields an `Io` error with
    /// kind `UnexpectedEof`.
    pub async fn read_message(&mut self) -> Result<BytesMut, BoltError> {
        let mut message = BytesMut::new();
        let mut chunks = 0usize;

        loop {
            let mut header = [0u8; 2];
            self.reader.read_exact(&mut header).await?;
            let chunk_len = usize::from(u16::from_be_bytes(header));

            if chunk_len == 0 {
                break;
            }

            let size = message.len() + chunk_len;
            if size > self.max_message_size {
                return Err(BoltError::MessageTooLarge {
                    size,
                    max: self.max_message_size,
                });
            }

            let start = message.len();
            message.resize(size, 0);
            self.reader.read_exact(&mut message[start..]).await?;
            chunks += 1;
        }

        tracing::trace!(bytes = message.len(), chunks, "read chunked message");
        Ok(message)
    }

    /// Reads and decodes the next message.
    pub async fn recv(&mut self) -> Result<Message, BoltError> {
        let body = self.read_message().await?;
        decode_message(&body)
    }

    /// Returns the underlying reader.
    pub fn into_inner(self) -> R {
        self.reader
    }
}
