//! Encode Bolt messages to PackStream bytes.

use bytes::BufMut;

use super::{ClientMessage, Message, ServerMessage};
use crate::error::BoltError;
use crate::packstream::encode as ps;

/// Encodes a message body: structure header (`0xB0 | n`, tag) then each field.
///
/// The result is the unchunked body handed to the chunk writer.
pub fn encode_message(buf: &mut impl BufMut, msg: &Message) -> Result<(), BoltError> {
    ps::encode_struct_header(buf, msg.tag, msg.fields.len())?;
    for field in &msg.fields {
        ps::encode_value(buf, field)?;
    }
    Ok(())
}

/// Encodes a client message into PackStream bytes.
pub fn encode_client_message(buf: &mut impl BufMut, msg: &ClientMessage) -> Result<(), BoltError> {
    encode_message(buf, &msg.to_message())
}

/// Encodes a server message into PackStream bytes.
pub fn encode_server_message(buf: &mut impl BufMut, msg: &ServerMessage) -> Result<(), BoltError> {
    encode_message(buf, &msg.to_message())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::sig;
    use crate::packstream::Value;

    #[test]
    fn hello_world_message_bytes() {
        let msg = Message::new(0x01, vec![Value::from("hello"), Value::Integer(42)]);
        let mut buf = Vec::new();
        encode_message(&mut buf, &msg).unwrap();
        assert_eq!(
            buf,
            [0xB2, 0x01, 0x85, 0x68, 0x65, 0x6C, 0x6C, 0x6F, 0x2A]
        );
    }

    #[test]
    fn zero_field_message() {
        let mut buf = Vec::new();
        encode_client_message(&mut buf, &ClientMessage::Reset).unwrap();
        assert_eq!(buf, [0xB0, sig::RESET]);
    }

    #[test]
    fn sixteen_fields_rejected() {
        let msg = Message::new(0x10, vec![Value::Null; 16]);
        let mut buf = Vec::new();
        assert!(matches!(
            encode_message(&mut buf, &msg),
            Err(BoltError::TooManyFields(16))
        ));
    }
}
