pub const UDP_HEADER_LEN: usize = 8;
/// Big-endian length of header plus payload.
pub const UDP_LENGTH_FIELD: std::ops::Range<usize> = 4..6;
