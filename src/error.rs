//! Error types for the PackStream codec, message framing and client.

use crate::types::BoltDict;

/// Result alias used throughout the crate.
pub type BoltResult<T> = Result<T, BoltError>;

/// Errors that can occur while encoding, decoding, framing or exchanging
/// Bolt messages.
#[derive(Debug, thiserror::Error)]
pub enum BoltError {
    // -- Encoding: value out of wire range --
    #[error("integer {0} is outside the signed 64-bit range")]
    IntegerOverflow(i128),

    #[error("{kind} of size {len} is too large to encode")]
    TooLarge { kind: &'static str, len: usize },

    #[error("structure has {0} fields, at most 15 are supported")]
    TooManyFields(usize),

    // -- Encoding: no wire form --
    #[error("unsupported value: {0}")]
    Unsupported(String),

    // -- Decoding: malformed input --
    #[error("nothing to unpack")]
    NothingToUnpack,

    #[error("unknown marker byte: 0x{0:02X}")]
    UnknownMarker(u8),

    #[error("need {needed} bytes but only {remaining} remaining")]
    UnexpectedEnd { needed: usize, remaining: usize },

    #[error("protocol error: {0}")]
    Protocol(String),

    // -- Framing --
    #[error("message too large: {size} bytes (max: {max})")]
    MessageTooLarge { size: usize, max: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // -- Connection --
    #[error("authentication error: {0}")]
    Authentication(String),

    #[error("query error {code}: {message}")]
    Query { code: String, message: String },
}

impl BoltError {
    /// Builds a `Query` or `Authentication` error from FAILURE metadata.
    pub fn from_failure(metadata: &BoltDict) -> Self {
        let code = metadata
            .get("code")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown")
            .to_string();
        let message = metadata
            .get("message")
            .and_then(|v| v.as_str())
            .unwrap_or("request failed")
            .to_string();
        if code.starts_with("Neo.ClientError.Security.") {
            Self::Authentication(message)
        } else {
            Self::Query { code, message }
        }
    }

    /// Returns `true` if the byte stream can no longer be trusted after
    /// this error and the connection should be dropped.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Query { .. } | Self::Authentication(_))
    }
}
