//! PackStream decoding: bytes → `Value`.
//!
//! Decoding reads from any `Buf` cursor and advances it exactly past the
//! bytes of one value. Errors are not recoverable: once a decode fails the
//! remaining bytes are no longer aligned to a value boundary.

use bytes::Buf;

use super::marker;
use super::value::{Dict, Item, Structure, Value};
use crate::error::BoltError;

/// Deepest container nesting accepted. Anything deeper fails instead of
/// recursing further.
pub const MAX_DEPTH: usize = 128;

/// Decodes a single `Value` from the buffer.
///
/// A bare end-of-stream marker is rejected; use [`decode_item`] to observe it.
pub fn decode_value(buf: &mut impl Buf) -> Result<Value, BoltError> {
    decode_value_at(buf, 0)
}

/// Decodes one item from the buffer, which may be the end-of-stream sentinel.
pub fn decode_item(buf: &mut impl Buf) -> Result<Item, BoltError> {
    decode_item_at(buf, 0)
}

fn decode_value_at(buf: &mut impl Buf, depth: usize) -> Result<Value, BoltError> {
    decode_item_at(buf, depth)?.into_value()
}

fn decode_item_at(buf: &mut impl Buf, depth: usize) -> Result<Item, BoltError> {
    if depth > MAX_DEPTH {
        return Err(BoltError::Protocol(format!(
            "nesting too deep: more than {MAX_DEPTH} levels"
        )));
    }
    if !buf.has_remaining() {
        return Err(BoltError::NothingToUnpack);
    }

    let m = buf.get_u8();
    let value = match m {
        // TINY_INT positive: 0x00..=0x7F
        0x00..=0x7F => Value::Integer(i64::from(m)),

        // TINY_INT negative: 0xF0..=0xFF (-16..-1)
        0xF0..=0xFF => Value::Integer(i64::from(m as i8)),

        // TINY_STRING, TINY_LIST, TINY_DICT, TINY_STRUCT
        0x80..=0x8F => decode_string_data(buf, tiny_size(m))?,
        0x90..=0x9F => decode_list_data(buf, tiny_size(m), depth)?,
        0xA0..=0xAF => decode_dict_data(buf, tiny_size(m), depth)?,
        0xB0..=0xBF => decode_struct_data(buf, tiny_size(m), depth)?,

        marker::NULL => Value::Null,
        marker::FALSE => Value::Boolean(false),
        marker::TRUE => Value::Boolean(true),

        marker::FLOAT_64 => {
            ensure_remaining(buf, 8)?;
            Value::Float(f64::from_bits(buf.get_u64()))
        }

        marker::INT_8 => {
            ensure_remaining(buf, 1)?;
            Value::Integer(i64::from(buf.get_i8()))
        }
        marker::INT_16 => {
            ensure_remaining(buf, 2)?;
            Value::Integer(i64::from(buf.get_i16()))
        }
        marker::INT_32 => {
            ensure_remaining(buf, 4)?;
            Value::Integer(i64::from(buf.get_i32()))
        }
        marker::INT_64 => {
            ensure_remaining(buf, 8)?;
            Value::Integer(buf.get_i64())
        }

        marker::BYTES_8 | marker::BYTES_16 | marker::BYTES_32 => {
            let len = read_size(buf, m - marker::BYTES_8)?;
            decode_bytes_data(buf, len)?
        }
        marker::STRING_8 | marker::STRING_16 | marker::STRING_32 => {
            let len = read_size(buf, m - marker::STRING_8)?;
            decode_string_data(buf, len)?
        }
        marker::LIST_8 | marker::LIST_16 | marker::LIST_32 => {
            let len = read_size(buf, m - marker::LIST_8)?;
            decode_list_data(buf, len, depth)?
        }
        marker::DICT_8 | marker::DICT_16 | marker::DICT_32 => {
            let len = read_size(buf, m - marker::DICT_8)?;
            decode_dict_data(buf, len, depth)?
        }

        marker::LIST_STREAM => decode_list_stream(buf, depth)?,
        marker::DICT_STREAM => decode_dict_stream(buf, depth)?,
        marker::END_OF_STREAM => return Ok(Item::EndOfStream),

        _ => return Err(BoltError::UnknownMarker(m)),
    };
    Ok(Item::Value(value))
}

fn tiny_size(m: u8) -> usize {
    usize::from(m & 0x0F)
}

/// Reads an 8, 16 or 32-bit size prefix; `width` is 0, 1 or 2 respectively.
fn read_size(buf: &mut impl Buf, width: u8) -> Result<usize, BoltError> {
    let len = match width {
        0 => {
            ensure_remaining(buf, 1)?;
            usize::from(buf.get_u8())
        }
        1 => {
            ensure_remaining(buf, 2)?;
            usize::from(buf.get_u16())
        }
        _ => {
            ensure_remaining(buf, 4)?;
            buf.get_u32() as usize
        }
    };
    Ok(len)
}

fn ensure_remaining(buf: &impl Buf, needed: usize) -> Result<(), BoltError> {
    if buf.remaining() < needed {
        Err(BoltError::UnexpectedEnd {
            needed,
            remaining: buf.remaining(),
        })
    } else {
        Ok(())
    }
}

fn decode_bytes_data(buf: &mut impl Buf, len: usize) -> Result<Value, BoltError> {
    ensure_remaining(buf, len)?;
    let mut data = vec![0u8; len];
    buf.copy_to_slice(&mut data);
    Ok(Value::Bytes(data))
}

fn decode_string_data(buf: &mut impl Buf, len: usize) -> Result<Value, BoltError> {
    ensure_remaining(buf, len)?;
    let mut data = vec![0u8; len];
    buf.copy_to_slice(&mut data);
    let s = String::from_utf8(data)
        .map_err(|e| BoltError::Protocol(format!("invalid UTF-8 string: {e}")))?;
    Ok(Value::String(s))
}

fn decode_list_data(buf: &mut impl Buf, len: usize, depth: usize) -> Result<Value, BoltError> {
    // Each element is at least one byte.
    ensure_remaining(buf, len)?;
    let mut items = Vec::with_capacity(len);
    for _ in 0..len {
        items.push(decode_value_at(buf, depth + 1)?);
    }
    Ok(Value::List(items))
}

fn decode_list_stream(buf: &mut impl Buf, depth: usize) -> Result<Value, BoltError> {
    let mut items = Vec::new();
    loop {
        match decode_item_at(buf, depth + 1)? {
            Item::Value(v) => items.push(v),
            Item::EndOfStream => return Ok(Value::List(items)),
        }
    }
}

fn decode_dict_data(buf: &mut impl Buf, len: usize, depth: usize) -> Result<Value, BoltError> {
    ensure_remaining(buf, len)?;
    let mut dict = Dict::with_capacity(len);
    for _ in 0..len {
        let key = require_key(decode_value_at(buf, depth + 1)?)?;
        let value = decode_value_at(buf, depth + 1)?;
        // Duplicate keys: last write wins.
        dict.insert(key, value);
    }
    Ok(Value::Dict(dict))
}

fn decode_dict_stream(buf: &mut impl Buf, depth: usize) -> Result<Value, BoltError> {
    let mut dict = Dict::new();
    loop {
        let key = match decode_item_at(buf, depth + 1)? {
            Item::Value(k) => require_key(k)?,
            Item::EndOfStream => return Ok(Value::Dict(dict)),
        };
        let value = decode_value_at(buf, depth + 1)?;
        dict.insert(key, value);
    }
}

fn decode_struct_data(
    buf: &mut impl Buf,
    field_count: usize,
    depth: usize,
) -> Result<Value, BoltError> {
    ensure_remaining(buf, 1)?;
    let tag = buf.get_u8();
    let mut fields = Vec::with_capacity(field_count);
    for _ in 0..field_count {
        fields.push(decode_value_at(buf, depth + 1)?);
    }
    Ok(Value::Structure(Structure { tag, fields }))
}

fn require_key(v: Value) -> Result<String, BoltError> {
    match v {
        Value::String(s) => Ok(s),
        other => Err(BoltError::Protocol(format!(
            "dict key must be a string, got: {other}"
        ))),
    }
}
