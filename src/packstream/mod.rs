//! PackStream binary encoding format for the Bolt protocol.
//!
//! PackStream is a compact, self-describing binary presentation format. Each
//! value starts with a marker byte; small integers and small string, list,
//! dict and structure sizes live in the marker itself. All multi-byte
//! numbers are big-endian.

pub mod decode;
pub mod encode;
pub mod marker;
pub mod value;

pub use decode::{decode_item, decode_value};
pub use encode::encode_value;
pub use value::{Dict, Item, Structure, Value};
