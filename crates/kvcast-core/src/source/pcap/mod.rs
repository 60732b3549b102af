//! Capture replay source.
//!
//! Reads PCAP or PCAPNG files, extracts IPv4 UDP datagrams and hands their
//! payloads to the session loop as if they had been received live. Frames
//! that are not UDP, or not addressed to the selected group/port, are
//! skipped.

mod frames;
pub mod layout;
pub mod reader;

use std::fs::File;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::path::Path;

use tracing::debug;

use crate::protocols::udp::parse_udp_datagram;

use super::{Datagram, DatagramSource, SourceError};
use frames::CaptureFrames;

/// Destination filter applied to captured datagrams.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DatagramFilter {
    pub group: Option<Ipv4Addr>,
    pub port: Option<u16>,
}

impl DatagramFilter {
    pub fn accepts(&self, dst: &SocketAddrV4) -> bool {
        self.group.is_none_or(|group| *dst.ip() == group)
            && self.port.is_none_or(|port| dst.port() == port)
    }
}

pub struct PcapFileSource {
    frames: CaptureFrames,
    filter: DatagramFilter,
}

impl PcapFileSource {
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        Self::open_filtered(path, DatagramFilter::default())
    }

    pub fn open_filtered(path: &Path, filter: DatagramFilter) -> Result<Self, SourceError> {
        let file = File::open(path)?;
        let frames = CaptureFrames::open(file)?;
        Ok(Self { frames, filter })
    }
}

impl DatagramSource for PcapFileSource {
    fn next_datagram(&mut self) -> Result<Option<Datagram>, SourceError> {
        while let Some(frame) = self.frames.next_frame()? {
            let udp = match parse_udp_datagram(frame.linktype, &frame.data) {
                Ok(Some(udp)) => udp,
                Ok(None) => continue,
                Err(err) => {
                    debug!(%err, ts = frame.ts, "skipping undecodable frame");
                    continue;
                }
            };
            if !self.filter.accepts(&udp.dst) {
                continue;
            }
            return Ok(Some(Datagram::new(
                udp.payload,
                Some(SocketAddr::V4(udp.src)),
                Some(frame.ts),
            )));
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use std::net::{Ipv4Addr, SocketAddrV4};

    use super::DatagramFilter;

    #[test]
    fn default_filter_accepts_everything() {
        let dst = SocketAddrV4::new(Ipv4Addr::new(10, 0, 0, 1), 1);
        assert!(DatagramFilter::default().accepts(&dst));
    }

    #[test]
    fn filter_matches_group_and_port() {
        let filter = DatagramFilter {
            group: Some(Ipv4Addr::new(239, 0, 0, 1)),
            port: Some(5000),
        };
        assert!(filter.accepts(&SocketAddrV4::new(Ipv4Addr::new(239, 0, 0, 1), 5000)));
        assert!(!filter.accepts(&SocketAddrV4::new(Ipv4Addr::new(239, 0, 0, 2), 5000)));
        assert!(!filter.accepts(&SocketAddrV4::new(Ipv4Addr::new(239, 0, 0, 1), 5001)));
    }
}
