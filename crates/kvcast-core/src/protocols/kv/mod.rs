//! `key:value` datagram payload decoding.
//!
//! A payload is a run of `key:value` tokens separated by space, tab, CR or
//! LF. Keys stop at the first `:` or whitespace byte. Values are either a
//! `"`-delimited span (no escapes, the first `"` closes it) or a run of
//! non-whitespace bytes. Oversized keys and values are truncated silently;
//! a missing delimiter, empty key, missing value or unterminated quote stops
//! decoding of the payload.
//!
//! Grammar constants live in `layout`, the bounds-checked cursor in `reader`.

pub mod error;
pub mod layout;
pub mod pair;
pub mod parser;
pub mod reader;

pub use error::{DecodeError, KeyFault, ValueFault};
pub use pair::{Key, Pair, Value};
pub use parser::{DecodeOutcome, Pairs, decode_all, decode_payload};
