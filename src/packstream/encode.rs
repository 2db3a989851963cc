//! PackStream encoding: `Value` → bytes.
//!
//! Every function writes into any `BufMut` sink (`BytesMut`, `Vec<u8>`, ...)
//! and always picks the shortest marker form for the value. On error the
//! sink may hold a partial value and must be discarded.

use bytes::BufMut;

use super::marker::{self, SizedMarkers};
use super::value::{Dict, Structure, Value};
use crate::error::BoltError;

/// Encodes a `Value` into the buffer using PackStream format.
pub fn encode_value(buf: &mut impl BufMut, value: &Value) -> Result<(), BoltError> {
    match value {
        Value::Null => encode_null(buf),
        Value::Boolean(b) => encode_bool(buf, *b),
        Value::Integer(i) => encode_int(buf, *i),
        Value::Float(f) => encode_float(buf, *f),
        Value::String(s) => encode_string(buf, s)?,
        Value::Bytes(b) => encode_bytes(buf, b)?,
        Value::List(items) => encode_list(buf, items)?,
        Value::Dict(dict) => encode_dict(buf, dict)?,
        Value::Structure(s) => encode_structure(buf, s)?,
    }
    Ok(())
}

pub fn encode_null(buf: &mut impl BufMut) {
    buf.put_u8(marker::NULL);
}

pub fn encode_bool(buf: &mut impl BufMut, value: bool) {
    buf.put_u8(if value { marker::TRUE } else { marker::FALSE });
}

/// Encodes an integer using the smallest possible PackStream representation.
pub fn encode_int(buf: &mut impl BufMut, value: i64) {
    if (marker::TINY_INT_MIN..=marker::TINY_INT_MAX).contains(&value) {
        // TINY_INT: the marker is the value
        buf.put_i8(value as i8);
    } else if let Ok(v) = i8::try_from(value) {
        buf.put_u8(marker::INT_8);
        buf.put_i8(v);
    } else if let Ok(v) = i16::try_from(value) {
        buf.put_u8(marker::INT_16);
        buf.put_i16(v);
    } else if let Ok(v) = i32::try_from(value) {
        buf.put_u8(marker::INT_32);
        buf.put_i32(v);
    } else {
        buf.put_u8(marker::INT_64);
        buf.put_i64(value);
    }
}

/// Encodes an integer that may lie outside the wire's 64-bit range.
pub fn encode_wide_int(buf: &mut impl BufMut, value: i128) -> Result<(), BoltError> {
    let narrow = i64::try_from(value).map_err(|_| BoltError::IntegerOverflow(value))?;
    encode_int(buf, narrow);
    Ok(())
}

/// Encodes a float as its 8-byte big-endian IEEE 754 bit pattern.
pub fn encode_float(buf: &mut impl BufMut, value: f64) {
    buf.put_u8(marker::FLOAT_64);
    buf.put_u64(value.to_bits());
}

/// Encodes a string (size = UTF-8 byte length, not char count).
pub fn encode_string(buf: &mut impl BufMut, value: &str) -> Result<(), BoltError> {
    encode_sized_header(buf, &marker::STRING_MARKERS, value.len())?;
    buf.put_slice(value.as_bytes());
    Ok(())
}

pub fn encode_bytes(buf: &mut impl BufMut, value: &[u8]) -> Result<(), BoltError> {
    encode_sized_header(buf, &marker::BYTES_MARKERS, value.len())?;
    buf.put_slice(value);
    Ok(())
}

pub fn encode_list(buf: &mut impl BufMut, items: &[Value]) -> Result<(), BoltError> {
    encode_list_header(buf, items.len())?;
    for item in items {
        encode_value(buf, item)?;
    }
    Ok(())
}

pub fn encode_list_header(buf: &mut impl BufMut, len: usize) -> Result<(), BoltError> {
    encode_sized_header(buf, &marker::LIST_MARKERS, len)
}

pub fn encode_dict(buf: &mut impl BufMut, dict: &Dict) -> Result<(), BoltError> {
    encode_dict_header(buf, dict.len())?;
    for (key, value) in dict {
        encode_string(buf, key)?;
        encode_value(buf, value)?;
    }
    Ok(())
}

pub fn encode_dict_header(buf: &mut impl BufMut, len: usize) -> Result<(), BoltError> {
    encode_sized_header(buf, &marker::DICT_MARKERS, len)
}

/// Encodes a structure: header, then each field in order.
pub fn encode_structure(buf: &mut impl BufMut, s: &Structure) -> Result<(), BoltError> {
    encode_struct_header(buf, s.tag, s.fields.len())?;
    for field in &s.fields {
        encode_value(buf, field)?;
    }
    Ok(())
}

/// Encodes a structure header: marker byte (0xBn) + tag byte.
pub fn encode_struct_header(
    buf: &mut impl BufMut,
    tag_byte: u8,
    field_count: usize,
) -> Result<(), BoltError> {
    if field_count > marker::TINY_SIZE_MAX {
        return Err(BoltError::TooManyFields(field_count));
    }
    buf.put_u8(marker::TINY_STRUCT[field_count]);
    buf.put_u8(tag_byte);
    Ok(())
}

// -- Streaming writer --
//
// Used when the element count is not known up front: write the stream
// header, then each element (or key/value pair), then `encode_end_of_stream`.

pub fn encode_list_stream_header(buf: &mut impl BufMut) {
    buf.put_u8(marker::LIST_STREAM);
}

pub fn encode_dict_stream_header(buf: &mut impl BufMut) {
    buf.put_u8(marker::DICT_STREAM);
}

pub fn encode_end_of_stream(buf: &mut impl BufMut) {
    buf.put_u8(marker::END_OF_STREAM);
}

fn encode_sized_header(
    buf: &mut impl BufMut,
    markers: &SizedMarkers,
    len: usize,
) -> Result<(), BoltError> {
    match markers.tiny {
        Some(tiny) if len <= marker::TINY_SIZE_MAX => buf.put_u8(tiny[len]),
        _ => {
            if let Ok(n) = u8::try_from(len) {
                buf.put_u8(markers.size_8);
                buf.put_u8(n);
            } else if let Ok(n) = u16::try_from(len) {
                buf.put_u8(markers.size_16);
                buf.put_u16(n);
            } else if let Ok(n) = u32::try_from(len) {
                buf.put_u8(markers.size_32);
                buf.put_u32(n);
            } else {
                return Err(BoltError::TooLarge {
                    kind: markers.kind,
                    len,
                });
            }
        }
    }
    Ok(())
}
