//! boltwire: the PackStream codec and chunked message framing used by Bolt
//! graph database clients.
//!
//! # Architecture
//!
//! - **`packstream`**: binary encoding and decoding of the value model
//! - **`chunk`**: message framing (2-byte length-prefixed chunks, `0x0000` terminator)
//! - **`message`**: protocol message structures and their typed forms
//! - **`types`**: application values (graph, temporal, spatial)
//! - **`hydration`**: conversion between the two value models, per protocol version
//! - **`version`**: protocol versions and handshake bytes
//! - **`config`**: connection settings
//! - **`client`**: a single client connection (feature-gated)
//!
//! ```
//! use boltwire::packstream::{decode_value, encode_value, Structure, Value};
//!
//! let value = Value::Structure(Structure::new(0x01, vec![Value::from("hello"), Value::from(42)]));
//! let mut buf = Vec::new();
//! encode_value(&mut buf, &value).unwrap();
//! assert_eq!(buf, [0xB2, 0x01, 0x85, b'h', b'e', b'l', b'l', b'o', 0x2A]);
//! assert_eq!(decode_value(&mut buf.as_slice()).unwrap(), value);
//! ```

pub mod chunk;
pub mod config;
pub mod error;
pub mod hydration;
pub mod message;
pub mod packstream;
pub mod types;
pub mod version;

#[cfg(feature = "client")]
pub mod client;

pub use error::{BoltError, BoltResult};
