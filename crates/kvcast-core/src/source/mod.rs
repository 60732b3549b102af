mod memory;
mod multicast;
mod pcap;

pub use memory::MemorySource;
pub use multicast::{MulticastConfig, MulticastSource, SocketStep};
pub use pcap::{DatagramFilter, PcapFileSource};

use std::net::{Ipv4Addr, SocketAddr};

use thiserror::Error;

/// Largest payload handed to the decoder; longer datagrams are cut.
pub const MAX_DATAGRAM_LEN: usize = 4095;

/// One received datagram payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Datagram {
    /// Receive or capture time in seconds since the Unix epoch.
    pub ts: Option<f64>,
    /// Sender address, when known.
    pub origin: Option<SocketAddr>,
    pub payload: Vec<u8>,
}

impl Datagram {
    /// Builds a datagram, keeping at most `MAX_DATAGRAM_LEN` payload bytes.
    pub fn new(payload: &[u8], origin: Option<SocketAddr>, ts: Option<f64>) -> Self {
        let len = payload.len().min(MAX_DATAGRAM_LEN);
        Self {
            ts,
            origin,
            payload: payload[..len].to_vec(),
        }
    }
}

/// Producer of datagrams for the session loop.
///
/// `Ok(None)` means the source is exhausted; live sources never return it.
pub trait DatagramSource {
    fn next_datagram(&mut self) -> Result<Option<Datagram>, SourceError>;
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("capture error ({context}): {message}")]
    Pcap {
        context: &'static str,
        message: String,
    },
    #[error("socket error ({step}): {source}")]
    Socket {
        step: SocketStep,
        source: std::io::Error,
    },
    #[error("not an IPv4 multicast address: {group}")]
    InvalidGroup { group: Ipv4Addr },
    #[error("invalid port: {port}")]
    InvalidPort { port: u16 },
}

impl SourceError {
    pub(crate) fn pcap(context: &'static str, err: impl std::fmt::Display) -> Self {
        SourceError::Pcap {
            context,
            message: err.to_string(),
        }
    }
}
