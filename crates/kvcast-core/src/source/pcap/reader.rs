use std::io::{Read, Seek, SeekFrom};

use pcap_parser::Linktype;

use super::layout;
use crate::source::SourceError;

/// Sub-second unit of legacy PCAP record timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TsResolution {
    Micros,
    Nanos,
}

impl TsResolution {
    pub fn seconds(self, secs: u32, fraction: u32) -> f64 {
        let per_second = match self {
            TsResolution::Micros => 1e6,
            TsResolution::Nanos => 1e9,
        };
        f64::from(secs) + f64::from(fraction) / per_second
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureKind {
    Legacy(TsResolution),
    Ng,
}

impl CaptureKind {
    /// Identifies the capture from its leading magic and rewinds the input.
    pub fn sniff<R: Read + Seek>(input: &mut R) -> Result<Self, SourceError> {
        let mut magic = [0u8; 4];
        input.read_exact(&mut magic)?;
        input.seek(SeekFrom::Start(0))?;
        Ok(Self::from_magic(magic))
    }

    fn from_magic(magic: [u8; 4]) -> Self {
        match magic {
            layout::PCAPNG_MAGIC => CaptureKind::Ng,
            layout::PCAP_NANOS_MAGIC_LE | layout::PCAP_NANOS_MAGIC_BE => {
                CaptureKind::Legacy(TsResolution::Nanos)
            }
            _ => CaptureKind::Legacy(TsResolution::Micros),
        }
    }
}

/// Link types of the interfaces declared so far in a PCAPNG section.
#[derive(Debug, Default)]
pub struct Interfaces {
    linktypes: Vec<Linktype>,
}

impl Interfaces {
    pub fn declare(&mut self, linktype: Linktype) {
        self.linktypes.push(linktype);
    }

    /// Packets on undeclared interfaces are read as Ethernet.
    pub fn linktype(&self, if_id: u32) -> Linktype {
        usize::try_from(if_id)
            .ok()
            .and_then(|index| self.linktypes.get(index))
            .copied()
            .unwrap_or(Linktype::ETHERNET)
    }
}

pub fn ng_ts_seconds(ts_high: u32, ts_low: u32) -> f64 {
    let ticks = (u64::from(ts_high) << 32) | u64::from(ts_low);
    ticks as f64 / layout::PCAPNG_TICKS_PER_SECOND
}
