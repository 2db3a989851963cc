//! Bolt client: one connection driving the framer and the hydration layer.
//!
//! Feature-gated behind `client`. There is no pooling, routing or retry;
//! callers own a [`Connection`] and issue requests on it in sequence.

mod connection;
mod handshake;

pub use connection::{Connection, QueryResult};
pub use handshake::client_handshake;
