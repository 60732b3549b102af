use thiserror::Error;

/// Errors returned by UDP extraction.
///
/// # Examples
/// ```
/// use kvcast_core::UdpError;
///
/// let err = UdpError::LengthMismatch { declared: 40, available: 12 };
/// assert_eq!(err.to_string(), "UDP length 40 does not fit a 12-byte segment");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UdpError {
    #[error("undecodable frame: {0}")]
    Malformed(String),
    #[error("UDP header cut short: {available} bytes")]
    Truncated { available: usize },
    /// The header's length field is below the header size or past the segment end.
    #[error("UDP length {declared} does not fit a {available}-byte segment")]
    LengthMismatch { declared: usize, available: usize },
}
