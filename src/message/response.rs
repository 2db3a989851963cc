//! Server-to-client Bolt messages.

use super::{sig, Message};
use crate::packstream::{Dict, Value};

/// A message sent from the server to the client.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerMessage {
    /// Request completed successfully. Metadata varies by context.
    Success { metadata: Dict },

    /// A row of query results, still in wire form.
    Record { data: Vec<Value> },

    /// Request failed. Contains error code and message.
    Failure { metadata: Dict },

    /// Request was ignored (connection is in an error state).
    Ignored,
}

impl ServerMessage {
    /// Protocol name of the message, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Success { .. } => "SUCCESS",
            Self::Record { .. } => "RECORD",
            Self::Failure { .. } => "FAILURE",
            Self::Ignored => "IGNORED",
        }
    }

    /// Converts to the generic wire form.
    pub fn to_message(&self) -> Message {
        match self {
            Self::Success { metadata } => {
                Message::new(sig::SUCCESS, vec![Value::Dict(metadata.clone())])
            }
            Self::Record { data } => Message::new(sig::RECORD, vec![Value::List(data.clone())]),
            Self::Failure { metadata } => {
                Message::new(sig::FAILURE, vec![Value::Dict(metadata.clone())])
            }
            Self::Ignored => Message::new(sig::IGNORED, vec![]),
        }
    }
}
