//! Sans-I/O chunk framing for `tokio_util::codec`.
//!
//! [`ChunkCodec`] reassembles message bodies incrementally as bytes arrive,
//! so it can sit under a `Framed` transport. [`MessageCodec`] layers
//! message encoding and decoding on top of it.

use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use super::{DEFAULT_CHUNK_SIZE, DEFAULT_MAX_MESSAGE_SIZE, END_MARKER, MAX_CHUNK_SIZE};
use crate::error::BoltError;
use crate::message::{decode_message, encode_message, Message};

/// Frames raw message bodies as chunks.
#[derive(Debug)]
pub struct ChunkCodec {
    max_chunk_size: usize,
    max_message_size: usize,
    /// Payload of the message currently being reassembled.
    message: BytesMut,
}

impl ChunkCodec {
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_CHUNK_SIZE, DEFAULT_MAX_MESSAGE_SIZE)
    }

    /// `max_chunk_size` is clamped to `1..=65535`.
    pub fn with_limits(max_chunk_size: usize, max_message_size: usize) -> Self {
        Self {
            max_chunk_size: max_chunk_size.clamp(1, MAX_CHUNK_SIZE),
            max_message_size,
            message: BytesMut::new(),
        }
    }
}

impl Default for ChunkCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for ChunkCodec {
    type Item = BytesMut;
    type Error = BoltError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            if src.len() < 2 {
                return Ok(None);
            }
            let chunk_len = usize::from(u16::from_be_bytes([src[0], src[1]]));

            if chunk_len == 0 {
                src.advance(2);
                return Ok(Some(self.message.split()));
            }

            if src.len() < 2 + chunk_len {
                src.reserve(2 + chunk_len - src.len());
                return Ok(None);
            }

            let size = self.message.len() + chunk_len;
            if size > self.max_message_size {
                self.message.clear();
                return Err(BoltError::MessageTooLarge {
                    size,
                    max: self.max_message_size,
                });
            }

            src.advance(2);
            self.message.extend_from_slice(&src[..chunk_len]);
            src.advance(chunk_len);
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(src)? {
            Some(body) => Ok(Some(body)),
            None if src.is_empty() && self.message.is_empty() => Ok(None),
            None => Err(BoltError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "stream closed inside a chunked message",
            ))),
        }
    }
}

impl Encoder<&[u8]> for ChunkCodec {
    type Error = BoltError;

    fn encode(&mut self, body: &[u8], dst: &mut BytesMut) -> Result<(), Self::Error> {
        let chunks = body.len().div_ceil(self.max_chunk_size);
        dst.reserve(body.len() + 2 * chunks + END_MARKER.len());
        for chunk in body.chunks(self.max_chunk_size) {
            dst.put_u16(chunk.len() as u16);
            dst.put_slice(chunk);
        }
        dst.put_slice(&END_MARKER);
        Ok(())
    }
}

/// Frames and encodes whole [`Message`]s.
#[derive(Debug, Default)]
pub struct MessageCodec {
    inner: ChunkCodec,
    scratch: BytesMut,
}

impl MessageCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(max_chunk_size: usize, max_message_size: usize) -> Self {
        Self {
            inner: ChunkCodec::with_limits(max_chunk_size, max_message_size),
            scratch: BytesMut::new(),
        }
    }
}

impl Decoder for MessageCodec {
    type Item = Message;
    type Error = BoltError;

    /// Empty bodies are keep-alives and are skipped.
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            match self.inner.decode(src)? {
                Some(body) if body.is_empty() => continue,
                Some(body) => return decode_message(&body).map(Some),
                None => return Ok(None),
            }
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            match self.inner.decode_eof(src)? {
                Some(body) if body.is_empty() => continue,
                Some(body) => return decode_message(&body).map(Some),
                None => return Ok(None),
            }
        }
    }
}

impl Encoder<&Message> for MessageCodec {
    type Error = BoltError;

    fn encode(&mut self, msg: &Message, dst: &mut BytesMut) -> Result<(), Self::Error> {
        self.scratch.clear();
        encode_message(&mut self.scratch, msg)?;
        self.inner.encode(&self.scratch[..], dst)
    }
}
