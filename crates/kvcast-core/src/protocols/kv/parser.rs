use std::iter::FusedIterator;

use super::error::{DecodeError, KeyFault, ValueFault};
use super::layout;
use super::pair::{Key, Pair, Value};
use super::reader::Cursor;

/// Reads the next key and the `:` after it.
///
/// Returns `Ok(None)` when only whitespace is left in the payload.
pub fn read_key<'a>(cursor: &mut Cursor<'a>) -> Result<Option<Key<'a>>, DecodeError> {
    cursor.skip_whitespace();
    if cursor.is_exhausted() {
        return Ok(None);
    }

    let offset = cursor.offset();
    let span = cursor.take_while(layout::is_key_byte);
    if cursor.peek() != Some(layout::KEY_DELIMITER) {
        return Err(DecodeError::MalformedKey {
            fault: KeyFault::MissingDelimiter,
            offset,
        });
    }
    if span.is_empty() {
        return Err(DecodeError::MalformedKey {
            fault: KeyFault::Empty,
            offset,
        });
    }
    cursor.advance();

    Ok(Some(Key::from_span(span)))
}

/// Reads the value belonging to `key`, quoted or unquoted.
///
/// A quoted value ends at the first `"`; an unquoted one at the first
/// whitespace byte, which is left for the next read.
pub fn read_value<'a>(cursor: &mut Cursor<'a>, key: &Key<'_>) -> Result<Value<'a>, DecodeError> {
    cursor.skip_whitespace();
    let offset = cursor.offset();
    let malformed = |fault| DecodeError::MalformedValue {
        key: key.to_string_lossy().into_owned(),
        fault,
        offset,
    };

    match cursor.peek() {
        None => Err(malformed(ValueFault::Missing)),
        Some(layout::QUOTE) => {
            cursor.advance();
            let span = cursor.take_while(|byte| byte != layout::QUOTE);
            if !cursor.eat(layout::QUOTE) {
                return Err(malformed(ValueFault::UnterminatedQuote));
            }
            Ok(Value::from_span(span))
        }
        Some(_) => {
            let span = cursor.take_while(layout::is_unquoted_value_byte);
            if span.is_empty() {
                return Err(malformed(ValueFault::Empty));
            }
            Ok(Value::from_span(span))
        }
    }
}

/// Lazy sequence of pairs decoded from one payload.
///
/// Yields `Err` at most once; the sequence ends right after it.
#[derive(Debug, Clone)]
pub struct Pairs<'a> {
    cursor: Cursor<'a>,
    done: bool,
}

impl<'a> Pairs<'a> {
    pub fn new(payload: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(payload),
            done: false,
        }
    }

    /// Number of payload bytes consumed so far.
    pub fn offset(&self) -> usize {
        self.cursor.offset()
    }

    fn next_pair(&mut self) -> Result<Option<Pair<'a>>, DecodeError> {
        self.cursor.skip_whitespace();
        let start = self.cursor.offset();
        let Some(key) = read_key(&mut self.cursor)? else {
            return Ok(None);
        };
        let value = read_value(&mut self.cursor, &key)?;
        Ok(Some(Pair {
            key,
            value,
            span: start..self.cursor.offset(),
        }))
    }
}

impl<'a> Iterator for Pairs<'a> {
    type Item = Result<Pair<'a>, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = self.next_pair().transpose();
        if !matches!(item, Some(Ok(_))) {
            self.done = true;
        }
        item
    }
}

impl FusedIterator for Pairs<'_> {}

/// Decodes a datagram payload lazily.
///
/// # Examples
/// ```
/// use kvcast_core::decode_payload;
///
/// let mut pairs = decode_payload(b"temp:21.5 room:\"living room\"");
/// let first = pairs.next().unwrap()?;
/// assert_eq!(first.key, "temp");
/// assert_eq!(first.value, "21.5");
/// let second = pairs.next().unwrap()?;
/// assert_eq!(second.value, "living room");
/// assert!(pairs.next().is_none());
/// # Ok::<(), kvcast_core::DecodeError>(())
/// ```
pub fn decode_payload(payload: &[u8]) -> Pairs<'_> {
    Pairs::new(payload)
}

/// Every pair of a payload plus the error that stopped decoding, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeOutcome<'a> {
    pub pairs: Vec<Pair<'a>>,
    pub error: Option<DecodeError>,
}

impl DecodeOutcome<'_> {
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}

/// Decodes a payload eagerly.
///
/// # Examples
/// ```
/// use kvcast_core::decode_all;
///
/// let outcome = decode_all(b"a:1 b:2 c");
/// assert_eq!(outcome.pairs.len(), 2);
/// assert!(outcome.error.is_some());
/// ```
pub fn decode_all(payload: &[u8]) -> DecodeOutcome<'_> {
    let mut pairs = Vec::new();
    let mut error = None;
    for item in decode_payload(payload) {
        match item {
            Ok(pair) => pairs.push(pair),
            Err(err) => error = Some(err),
        }
    }
    DecodeOutcome { pairs, error }
}
