//! Decode Bolt messages from PackStream bytes.

use bytes::Buf;

use super::{sig, ClientMessage, Message, ServerMessage};
use crate::error::BoltError;
use crate::packstream::decode::decode_value;
use crate::packstream::marker;
use crate::packstream::{Dict, Value};

/// Decodes one reassembled message body into its generic form.
///
/// The body must hold exactly one structure; trailing bytes are an error.
pub fn decode_message(data: &[u8]) -> Result<Message, BoltError> {
    let mut buf = data;
    let m = read_u8(&mut buf)?;
    if m & 0xF0 != marker::TINY_STRUCT_NIBBLE {
        return Err(BoltError::Protocol(format!(
            "message must start with a structure marker, got 0x{m:02X}"
        )));
    }
    let field_count = usize::from(m & 0x0F);
    let tag = read_u8(&mut buf)?;

    let mut fields = Vec::with_capacity(field_count);
    for _ in 0..field_count {
        fields.push(decode_value(&mut buf)?);
    }
    if buf.has_remaining() {
        return Err(BoltError::Protocol(format!(
            "{} trailing bytes after message 0x{tag:02X}",
            buf.remaining()
        )));
    }
    Ok(Message { tag, fields })
}

/// Decodes a client message from PackStream bytes.
pub fn decode_client_message(data: &[u8]) -> Result<ClientMessage, BoltError> {
    ClientMessage::try_from(decode_message(data)?)
}

/// Decodes a server message from PackStream bytes.
pub fn decode_server_message(data: &[u8]) -> Result<ServerMessage, BoltError> {
    ServerMessage::try_from(decode_message(data)?)
}

impl TryFrom<Message> for ClientMessage {
    type Error = BoltError;

    fn try_from(msg: Message) -> Result<Self, Self::Error> {
        let mut fields = Fields::new(msg);
        let tag = fields.tag;
        let decoded = match tag {
            sig::HELLO => Self::Hello {
                extra: fields.dict("HELLO")?,
            },
            sig::LOGON => Self::Logon {
                auth: fields.dict("LOGON")?,
            },
            sig::LOGOFF => Self::Logoff,
            sig::GOODBYE => Self::Goodbye,
            sig::RESET => Self::Reset,
            sig::RUN => Self::Run {
                query: fields.string("RUN")?,
                parameters: fields.dict("RUN")?,
                extra: fields.dict("RUN")?,
            },
            sig::PULL => Self::Pull {
                extra: fields.dict("PULL")?,
            },
            sig::DISCARD => Self::Discard {
                extra: fields.dict("DISCARD")?,
            },
            sig::BEGIN => Self::Begin {
                extra: fields.dict("BEGIN")?,
            },
            sig::COMMIT => Self::Commit,
            sig::ROLLBACK => Self::Rollback,
            _ => {
                return Err(BoltError::Protocol(format!(
                    "unknown client message tag: 0x{tag:02X}"
                )));
            }
        };
        Ok(decoded)
    }
}

impl TryFrom<Message> for ServerMessage {
    type Error = BoltError;

    fn try_from(msg: Message) -> Result<Self, Self::Error> {
        let mut fields = Fields::new(msg);
        let tag = fields.tag;
        let decoded = match tag {
            sig::SUCCESS => Self::Success {
                metadata: fields.dict("SUCCESS")?,
            },
            sig::RECORD => Self::Record {
                data: fields.list("RECORD")?,
            },
            sig::FAILURE => Self::Failure {
                metadata: fields.dict("FAILURE")?,
            },
            sig::IGNORED => Self::Ignored,
            _ => {
                return Err(BoltError::Protocol(format!(
                    "unknown server message tag: 0x{tag:02X}"
                )));
            }
        };
        Ok(decoded)
    }
}

/// Consumes message fields in order, checking each one's kind.
struct Fields {
    tag: u8,
    fields: std::vec::IntoIter<Value>,
}

impl Fields {
    fn new(msg: Message) -> Self {
        Self {
            tag: msg.tag,
            fields: msg.fields.into_iter(),
        }
    }

    fn next(&mut self, msg_name: &str) -> Result<Value, BoltError> {
        self.fields
            .next()
            .ok_or_else(|| BoltError::Protocol(format!("{msg_name} is missing a field")))
    }

    fn dict(&mut self, msg_name: &str) -> Result<Dict, BoltError> {
        match self.next(msg_name)? {
            Value::Dict(d) => Ok(d),
            other => Err(BoltError::Protocol(format!(
                "{msg_name}: expected dict, got: {other}"
            ))),
        }
    }

    fn list(&mut self, msg_name: &str) -> Result<Vec<Value>, BoltError> {
        match self.next(msg_name)? {
            Value::List(l) => Ok(l),
            other => Err(BoltError::Protocol(format!(
                "{msg_name}: expected list, got: {other}"
            ))),
        }
    }

    fn string(&mut self, msg_name: &str) -> Result<String, BoltError> {
        match self.next(msg_name)? {
            Value::String(s) => Ok(s),
            other => Err(BoltError::Protocol(format!(
                "{msg_name}: expected string, got: {other}"
            ))),
        }
    }
}

fn read_u8(buf: &mut &[u8]) -> Result<u8, BoltError> {
    if buf.has_remaining() {
        Ok(buf.get_u8())
    } else {
        Err(BoltError::NothingToUnpack)
    }
}
