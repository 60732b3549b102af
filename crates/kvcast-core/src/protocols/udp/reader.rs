use super::error::UdpError;
use super::layout;

/// View over a UDP segment (header plus whatever the IP layer carried).
pub struct UdpReader<'a> {
    segment: &'a [u8],
}

impl<'a> UdpReader<'a> {
    pub fn new(segment: &'a [u8]) -> Self {
        Self { segment }
    }

    pub fn declared_len(&self) -> Result<usize, UdpError> {
        self.segment
            .get(layout::UDP_LENGTH_FIELD)
            .and_then(|field| <[u8; 2]>::try_from(field).ok())
            .map(|field| usize::from(u16::from_be_bytes(field)))
            .ok_or(UdpError::Truncated {
                available: self.segment.len(),
            })
    }

    /// Payload bounded by the header's length field; trailing bytes are dropped.
    pub fn payload(&self) -> Result<&'a [u8], UdpError> {
        let declared = self.declared_len()?;
        self.segment
            .get(layout::UDP_HEADER_LEN..declared)
            .ok_or(UdpError::LengthMismatch {
                declared,
                available: self.segment.len(),
            })
    }
}
