use std::borrow::Cow;
use std::fmt;
use std::ops::Range;

use super::layout;
use crate::protocols::common::reader::clamp_to_capacity;

macro_rules! bounded_bytes {
    ($(#[$meta:meta])* $name:ident, $capacity:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name<'a> {
            bytes: &'a [u8],
            original_len: usize,
        }

        impl<'a> $name<'a> {
            pub(crate) fn from_span(span: &'a [u8]) -> Self {
                Self {
                    bytes: clamp_to_capacity(span, $capacity),
                    original_len: span.len(),
                }
            }

            pub fn as_bytes(&self) -> &'a [u8] {
                self.bytes
            }

            pub fn len(&self) -> usize {
                self.bytes.len()
            }

            pub fn is_empty(&self) -> bool {
                self.bytes.is_empty()
            }

            /// Length of the span in the payload before truncation.
            pub fn original_len(&self) -> usize {
                self.original_len
            }

            pub fn is_truncated(&self) -> bool {
                self.bytes.len() < self.original_len
            }

            pub fn to_string_lossy(&self) -> Cow<'a, str> {
                String::from_utf8_lossy(self.bytes)
            }
        }

        impl fmt::Display for $name<'_> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.to_string_lossy(), f)
            }
        }

        impl PartialEq<[u8]> for $name<'_> {
            fn eq(&self, other: &[u8]) -> bool {
                self.bytes == other
            }
        }

        impl PartialEq<&str> for $name<'_> {
            fn eq(&self, other: &&str) -> bool {
                self.bytes == other.as_bytes()
            }
        }
    };
}

bounded_bytes!(
    /// Key bytes borrowed from the payload, at most `KEY_MAX_LEN` long.
    Key,
    layout::KEY_CAPACITY
);

bounded_bytes!(
    /// Value bytes borrowed from the payload, at most `VALUE_MAX_LEN` long.
    ///
    /// Quoted values are stored without their quotes.
    Value,
    layout::VALUE_CAPACITY
);

/// One decoded `key:value` token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pair<'a> {
    pub key: Key<'a>,
    pub value: Value<'a>,
    /// Payload bytes covered by the token, from the first key byte to the end
    /// of the value (closing quote included).
    pub span: Range<usize>,
}

impl Pair<'_> {
    pub fn is_truncated(&self) -> bool {
        self.key.is_truncated() || self.value.is_truncated()
    }
}
