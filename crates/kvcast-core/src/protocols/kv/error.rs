use std::fmt;

use thiserror::Error;

/// Errors that halt decoding of a single datagram payload.
///
/// Pairs produced before the error remain valid; nothing after it is read.
///
/// # Examples
/// ```
/// use kvcast_core::{DecodeError, KeyFault, decode_all};
///
/// let outcome = decode_all(b"abc def:1");
/// assert!(outcome.pairs.is_empty());
/// assert!(matches!(
///     outcome.error,
///     Some(DecodeError::MalformedKey { fault: KeyFault::MissingDelimiter, .. })
/// ));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("invalid key format at offset {offset}: {fault}")]
    MalformedKey { fault: KeyFault, offset: usize },
    #[error("invalid value format for key '{key}' at offset {offset}: {fault}")]
    MalformedValue {
        key: String,
        fault: ValueFault,
        offset: usize,
    },
}

impl DecodeError {
    /// Byte offset in the payload where the failing token started.
    pub fn offset(&self) -> usize {
        match self {
            DecodeError::MalformedKey { offset, .. } | DecodeError::MalformedValue { offset, .. } => {
                *offset
            }
        }
    }

    /// Key whose value failed to decode, when one was read.
    pub fn key(&self) -> Option<&str> {
        match self {
            DecodeError::MalformedKey { .. } => None,
            DecodeError::MalformedValue { key, .. } => Some(key),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyFault {
    /// Whitespace or end of payload reached before `:`.
    MissingDelimiter,
    /// `:` with no key bytes in front of it.
    Empty,
}

impl fmt::Display for KeyFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyFault::MissingDelimiter => write!(f, "missing ':' delimiter"),
            KeyFault::Empty => write!(f, "empty key"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueFault {
    /// Payload ended right after the key.
    Missing,
    /// Opening `"` with no closing `"`.
    UnterminatedQuote,
    /// Unquoted value with no bytes.
    Empty,
}

impl fmt::Display for ValueFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueFault::Missing => write!(f, "missing value"),
            ValueFault::UnterminatedQuote => write!(f, "unterminated quoted value"),
            ValueFault::Empty => write!(f, "empty value"),
        }
    }
}
