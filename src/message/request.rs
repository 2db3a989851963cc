//! Client-to-server Bolt messages.

use super::{sig, Message};
use crate::packstream::{Dict, Value};

/// A message sent from the client to the server.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientMessage {
    /// Initialize connection. Sent once after handshake.
    Hello { extra: Dict },

    /// Authenticate after HELLO (Bolt 5.1+).
    Logon { auth: Dict },

    /// De-authenticate (Bolt 5.1+).
    Logoff,

    /// Gracefully close the connection.
    Goodbye,

    /// Reset the connection to a clean state, aborting any pending work.
    Reset,

    /// Execute a query (auto-commit or within a transaction).
    Run {
        query: String,
        parameters: Dict,
        extra: Dict,
    },

    /// Pull results from the last RUN.
    Pull { extra: Dict },

    /// Discard results from the last RUN.
    Discard { extra: Dict },

    /// Begin an explicit transaction.
    Begin { extra: Dict },

    /// Commit the current explicit transaction.
    Commit,

    /// Roll back the current explicit transaction.
    Rollback,
}

impl ClientMessage {
    /// Creates a PULL message requesting all remaining records.
    pub fn pull_all() -> Self {
        Self::pull_n(-1)
    }

    /// Creates a PULL message requesting `n` records.
    pub fn pull_n(n: i64) -> Self {
        Self::Pull {
            extra: Dict::from([("n".to_string(), Value::Integer(n))]),
        }
    }

    /// Creates a DISCARD message discarding all remaining records.
    pub fn discard_all() -> Self {
        Self::Discard {
            extra: Dict::from([("n".to_string(), Value::Integer(-1))]),
        }
    }

    /// Protocol name of the message, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Hello { .. } => "HELLO",
            Self::Logon { .. } => "LOGON",
            Self::Logoff => "LOGOFF",
            Self::Goodbye => "GOODBYE",
            Self::Reset => "RESET",
            Self::Run { .. } => "RUN",
            Self::Pull { .. } => "PULL",
            Self::Discard { .. } => "DISCARD",
            Self::Begin { .. } => "BEGIN",
            Self::Commit => "COMMIT",
            Self::Rollback => "ROLLBACK",
        }
    }

    /// Converts to the generic wire form.
    pub fn to_message(&self) -> Message {
        match self {
            Self::Hello { extra } => Message::new(sig::HELLO, vec![Value::Dict(extra.clone())]),
            Self::Logon { auth } => Message::new(sig::LOGON, vec![Value::Dict(auth.clone())]),
            Self::Logoff => Message::new(sig::LOGOFF, vec![]),
            Self::Goodbye => Message::new(sig::GOODBYE, vec![]),
            Self::Reset => Message::new(sig::RESET, vec![]),
            Self::Run {
                query,
                parameters,
                extra,
            } => Message::new(
                sig::RUN,
                vec![
                    Value::String(query.clone()),
                    Value::Dict(parameters.clone()),
                    Value::Dict(extra.clone()),
                ],
            ),
            Self::Pull { extra } => Message::new(sig::PULL, vec![Value::Dict(extra.clone())]),
            Self::Discard { extra } => {
                Message::new(sig::DISCARD, vec![Value::Dict(extra.clone())])
            }
            Self::Begin { extra } => Message::new(sig::BEGIN, vec![Value::Dict(extra.clone())]),
            Self::Commit => Message::new(sig::COMMIT, vec![]),
            Self::Rollback => Message::new(sig::ROLLBACK, vec![]),
        }
    }
}
