//! PackStream marker byte constants.

// Null
pub const NULL: u8 = 0xC0;

// Float (IEEE 754 double-precision)
pub const FLOAT_64: u8 = 0xC1;

// Boolean
pub const FALSE: u8 = 0xC2;
pub const TRUE: u8 = 0xC3;

// Integer (beyond TINY_INT range)
pub const INT_8: u8 = 0xC8;
pub const INT_16: u8 = 0xC9;
pub const INT_32: u8 = 0xCA;
pub const INT_64: u8 = 0xCB;

// TINY_INT: single byte, range -16..=127
// Positive: 0x00..=0x7F (0..127)
// Negative: 0xF0..=0xFF (-16..-1)
pub const TINY_INT_MIN: i64 = -16;
pub const TINY_INT_MAX: i64 = 127;

// Bytes
pub const BYTES_8: u8 = 0xCC;
pub const BYTES_16: u8 = 0xCD;
pub const BYTES_32: u8 = 0xCE;

// String
pub const STRING_8: u8 = 0xD0;
pub const STRING_16: u8 = 0xD1;
pub const STRING_32: u8 = 0xD2;

// List
pub const LIST_8: u8 = 0xD4;
pub const LIST_16: u8 = 0xD5;
pub const LIST_32: u8 = 0xD6;
pub const LIST_STREAM: u8 = 0xD7;

// Dictionary (Map)
pub const DICT_8: u8 = 0xD8;
pub const DICT_16: u8 = 0xD9;
pub const DICT_32: u8 = 0xDA;
pub const DICT_STREAM: u8 = 0xDB;

// Terminates a streamed list or dict.
pub const END_OF_STREAM: u8 = 0xDF;

// High-nibble masks for tiny types; the low nibble carries the size.
pub const TINY_STRING_NIBBLE: u8 = 0x80;
pub const TINY_LIST_NIBBLE: u8 = 0x90;
pub const TINY_DICT_NIBBLE: u8 = 0xA0;
pub const TINY_STRUCT_NIBBLE: u8 = 0xB0;

/// Largest size that fits in the low nibble of a tiny marker.
pub const TINY_SIZE_MAX: usize = 15;

const fn tiny_table(nibble: u8) -> [u8; 16] {
    let mut table = [0u8; 16];
    let mut i = 0;
    while i < 16 {
        table[i] = nibble | i as u8;
        i += 1;
    }
    table
}

pub const TINY_STRING: [u8; 16] = tiny_table(TINY_STRING_NIBBLE);
pub const TINY_LIST: [u8; 16] = tiny_table(TINY_LIST_NIBBLE);
pub const TINY_DICT: [u8; 16] = tiny_table(TINY_DICT_NIBBLE);
pub const TINY_STRUCT: [u8; 16] = tiny_table(TINY_STRUCT_NIBBLE);

/// Marker family for a sized container header: the tiny table plus the
/// 8/16/32-bit length markers. `None` means that width has no form.
pub(crate) struct SizedMarkers {
    pub kind: &'static str,
    pub tiny: Option<&'static [u8; 16]>,
    pub size_8: u8,
    pub size_16: u8,
    pub size_32: u8,
}

pub(crate) const STRING_MARKERS: SizedMarkers = SizedMarkers {
    kind: "string",
    tiny: Some(&TINY_STRING),
    size_8: STRING_8,
    size_16: STRING_16,
    size_32: STRING_32,
};

pub(crate) const BYTES_MARKERS: SizedMarkers = SizedMarkers {
    kind: "byte array",
    tiny: None,
    size_8: BYTES_8,
    size_16: BYTES_16,
    size_32: BYTES_32,
};

pub(crate) const LIST_MARKERS: SizedMarkers = SizedMarkers {
    kind: "list",
    tiny: Some(&TINY_LIST),
    size_8: LIST_8,
    size_16: LIST_16,
    size_32: LIST_32,
};

pub(crate) const DICT_MARKERS: SizedMarkers = SizedMarkers {
    kind: "dict",
    tiny: Some(&TINY_DICT),
    size_8: DICT_8,
    size_16: DICT_16,
    size_32: DICT_32,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiny_tables_match_marker_ranges() {
        assert_eq!(TINY_STRING[0], 0x80);
        assert_eq!(TINY_STRING[15], 0x8F);
        assert_eq!(TINY_LIST[5], 0x95);
        assert_eq!(TINY_DICT[15], 0xAF);
        assert_eq!(TINY_STRUCT[2], 0xB2);
    }
}
