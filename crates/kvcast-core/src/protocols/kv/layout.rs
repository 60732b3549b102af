/// Byte separating a key from its value.
pub const KEY_DELIMITER: u8 = b':';
/// Byte opening and closing a quoted value.
pub const QUOTE: u8 = b'"';
/// Separator bytes between tokens. Nothing else counts as whitespace.
pub const WHITESPACE: [u8; 4] = [b' ', b'\t', b'\n', b'\r'];

/// Key storage capacity; spans at or above it are cut to `KEY_CAPACITY - 1`.
pub const KEY_CAPACITY: usize = 255;
/// Value storage capacity; spans at or above it are cut to `VALUE_CAPACITY - 1`.
pub const VALUE_CAPACITY: usize = 2048;

pub const KEY_MAX_LEN: usize = KEY_CAPACITY - 1;
pub const VALUE_MAX_LEN: usize = VALUE_CAPACITY - 1;

pub fn is_whitespace(byte: u8) -> bool {
    WHITESPACE.contains(&byte)
}

pub fn is_key_byte(byte: u8) -> bool {
    byte != KEY_DELIMITER && !is_whitespace(byte)
}

pub fn is_unquoted_value_byte(byte: u8) -> bool {
    !is_whitespace(byte)
}
