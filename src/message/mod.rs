//! Bolt protocol messages.
//!
//! On the wire a message is a structure: marker `0xB0 | n`, a signature
//! byte, then `n` fields. [`Message`] is that generic form; the typed
//! [`ClientMessage`] and [`ServerMessage`] convert to and from it.

pub mod decode;
pub mod encode;
pub mod request;
pub mod response;

pub use decode::{decode_client_message, decode_message, decode_server_message};
pub use encode::{encode_client_message, encode_message, encode_server_message};
pub use request::ClientMessage;
pub use response::ServerMessage;

use crate::packstream::Value;

/// Message signature bytes.
pub mod sig {
    // Client → Server
    pub const HELLO: u8 = 0x01;
    pub const GOODBYE: u8 = 0x02;
    pub const RESET: u8 = 0x0F;
    pub const RUN: u8 = 0x10;
    pub const BEGIN: u8 = 0x11;
    pub const COMMIT: u8 = 0x12;
    pub const ROLLBACK: u8 = 0x13;
    pub const DISCARD: u8 = 0x2F;
    pub const PULL: u8 = 0x3F;
    pub const LOGON: u8 = 0x6A;
    pub const LOGOFF: u8 = 0x6B;

    // Server → Client
    pub const SUCCESS: u8 = 0x70;
    pub const RECORD: u8 = 0x71;
    pub const IGNORED: u8 = 0x7E;
    pub const FAILURE: u8 = 0x7F;
}

/// A message in its generic wire form: a signature tag plus up to 15 fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub tag: u8,
    pub fields: Vec<Value>,
}

impl Message {
    pub fn new(tag: u8, fields: Vec<Value>) -> Self {
        Self { tag, fields }
    }
}
