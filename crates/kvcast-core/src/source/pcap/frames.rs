use std::fs::File;

use pcap_parser::traits::PcapReaderIterator;
use pcap_parser::{Block, LegacyPcapReader, Linktype, PcapBlockOwned, PcapError, PcapNGReader};

use super::layout;
use super::reader::{CaptureKind, Interfaces, TsResolution, ng_ts_seconds};
use crate::source::SourceError;

/// Link-layer frame read from a capture.
#[derive(Debug, Clone)]
pub struct CapturedFrame {
    pub ts: f64,
    pub linktype: Linktype,
    pub data: Vec<u8>,
}

/// Streaming frame reader over legacy PCAP or PCAPNG.
pub enum CaptureFrames {
    Legacy {
        reader: LegacyPcapReader<File>,
        resolution: TsResolution,
        linktype: Linktype,
    },
    Ng {
        reader: PcapNGReader<File>,
        interfaces: Interfaces,
    },
}

impl CaptureFrames {
    pub fn open(mut file: File) -> Result<Self, SourceError> {
        match CaptureKind::sniff(&mut file)? {
            CaptureKind::Ng => Ok(Self::Ng {
                reader: PcapNGReader::new(layout::PCAP_READER_BUFFER_SIZE, file)
                    .map_err(|e| SourceError::pcap("pcapng header", e))?,
                interfaces: Interfaces::default(),
            }),
            CaptureKind::Legacy(resolution) => Ok(Self::Legacy {
                reader: LegacyPcapReader::new(layout::PCAP_READER_BUFFER_SIZE, file)
                    .map_err(|e| SourceError::pcap("pcap header", e))?,
                resolution,
                linktype: Linktype::ETHERNET,
            }),
        }
    }

    pub fn next_frame(&mut self) -> Result<Option<CapturedFrame>, SourceError> {
        match self {
            Self::Legacy {
                reader,
                resolution,
                linktype,
            } => next_block(reader, "pcap", |block| match block {
                PcapBlockOwned::LegacyHeader(header) => {
                    *linktype = header.network;
                    None
                }
                PcapBlockOwned::Legacy(packet) => Some(CapturedFrame {
                    ts: resolution.seconds(packet.ts_sec, packet.ts_usec),
                    linktype: *linktype,
                    data: packet.data.to_vec(),
                }),
                _ => None,
            }),
            Self::Ng { reader, interfaces } => next_block(reader, "pcapng", |block| match block {
                PcapBlockOwned::NG(Block::InterfaceDescription(intf)) => {
                    interfaces.declare(intf.linktype);
                    None
                }
                PcapBlockOwned::NG(Block::EnhancedPacket(packet)) => Some(CapturedFrame {
                    ts: ng_ts_seconds(packet.ts_high, packet.ts_low),
                    linktype: interfaces.linktype(packet.if_id),
                    data: packet.data.to_vec(),
                }),
                // A new section starts a new interface list.
                PcapBlockOwned::NG(Block::SectionHeader(_)) => {
                    *interfaces = Interfaces::default();
                    None
                }
                _ => None,
            }),
        }
    }
}

/// Pulls blocks until `on_block` yields a frame or the capture ends.
fn next_block<R, F>(
    reader: &mut R,
    context: &'static str,
    mut on_block: F,
) -> Result<Option<CapturedFrame>, SourceError>
where
    R: PcapReaderIterator,
    F: FnMut(PcapBlockOwned<'_>) -> Option<CapturedFrame>,
{
    loop {
        match reader.next() {
            Ok((offset, block)) => {
                let frame = on_block(block);
                reader.consume(offset);
                if frame.is_some() {
                    return Ok(frame);
                }
            }
            Err(PcapError::Eof) => return Ok(None),
            Err(PcapError::Incomplete(_)) => {
                reader
                    .refill()
                    .map_err(|e| SourceError::pcap(context, format!("refill failed: {e}")))?;
            }
            Err(e) => return Err(SourceError::pcap(context, e)),
        }
    }
}
