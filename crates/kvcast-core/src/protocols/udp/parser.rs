use std::net::SocketAddrV4;

use etherparse::{NetSlice, SlicedPacket, TransportSlice};
use pcap_parser::Linktype;

use super::error::UdpError;
use super::reader::UdpReader;

/// IPv4 UDP datagram with its endpoints.
#[derive(Debug)]
pub struct UdpDatagram<'a> {
    pub src: SocketAddrV4,
    pub dst: SocketAddrV4,
    pub payload: &'a [u8],
}

/// Extracts an IPv4 UDP datagram from a link-layer frame.
///
/// Returns `Ok(None)` for unsupported link types and for frames that are not
/// IPv4 UDP (ARP, IPv6, TCP, ...).
pub fn parse_udp_datagram(
    linktype: Linktype,
    data: &[u8],
) -> Result<Option<UdpDatagram<'_>>, UdpError> {
    let sliced = match linktype {
        Linktype::ETHERNET => {
            SlicedPacket::from_ethernet(data).map_err(|e| UdpError::Malformed(e.to_string()))?
        }
        Linktype::RAW => {
            SlicedPacket::from_ip(data).map_err(|e| UdpError::Malformed(e.to_string()))?
        }
        _ => return Ok(None),
    };

    let Some(TransportSlice::Udp(udp)) = sliced.transport else {
        return Ok(None);
    };
    let Some(NetSlice::Ipv4(ipv4)) = sliced.net else {
        return Ok(None);
    };

    let header = ipv4.header();
    let payload = UdpReader::new(ipv4.payload().payload).payload()?;
    Ok(Some(UdpDatagram {
        src: SocketAddrV4::new(header.source_addr(), udp.source_port()),
        dst: SocketAddrV4::new(header.destination_addr(), udp.destination_port()),
        payload,
    }))
}
