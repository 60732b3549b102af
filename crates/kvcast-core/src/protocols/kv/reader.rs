use super::layout;

/// Forward-only position over one payload.
///
/// Every operation stays inside the payload: reads past the end yield `None`
/// or an empty span, and the offset never exceeds the payload length.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    payload: &'a [u8],
    offset: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(payload: &'a [u8]) -> Self {
        Self { payload, offset: 0 }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn is_exhausted(&self) -> bool {
        self.offset >= self.payload.len()
    }

    pub fn peek(&self) -> Option<u8> {
        self.payload.get(self.offset).copied()
    }

    pub fn advance(&mut self) {
        if !self.is_exhausted() {
            self.offset += 1;
        }
    }

    /// Advances past `byte` if it is the current byte.
    pub fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.offset += 1;
            true
        } else {
            false
        }
    }

    pub fn skip_whitespace(&mut self) {
        self.take_while(layout::is_whitespace);
    }

    /// Consumes the longest run of bytes matching `accept` and returns it.
    pub fn take_while(&mut self, accept: impl Fn(u8) -> bool) -> &'a [u8] {
        let start = self.offset;
        while matches!(self.peek(), Some(byte) if accept(byte)) {
            self.offset += 1;
        }
        self.slice_from(start)
    }

    fn slice_from(&self, start: usize) -> &'a [u8] {
        self.payload.get(start..self.offset).unwrap_or_default()
    }
}
