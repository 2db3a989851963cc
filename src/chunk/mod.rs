//! Bolt message chunking: 2-byte length-prefixed framing.
//!
//! A message body is sent as one or more chunks, each a big-endian `u16`
//! length followed by that many bytes, and closed by a zero-length chunk.
//! Chunk boundaries need not line up with value boundaries.

pub mod codec;
pub mod reader;
pub mod writer;

pub use codec::{ChunkCodec, MessageCodec};
pub use reader::ChunkReader;
pub use writer::ChunkWriter;

/// Largest payload a single chunk can declare.
pub const MAX_CHUNK_SIZE: usize = u16::MAX as usize;

/// Payload size the writer uses by default.
pub const DEFAULT_CHUNK_SIZE: usize = 32_767;

/// Receive-side cap on a reassembled message body.
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 16 * 1024 * 1024;

/// The zero-length chunk that terminates every message.
pub const END_MARKER: [u8; 2] = [0x00, 0x00];
