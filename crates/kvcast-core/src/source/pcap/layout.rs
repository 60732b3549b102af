/// Section header block type, as stored on disk in either byte order.
pub const PCAPNG_MAGIC: [u8; 4] = [0x0a, 0x0d, 0x0d, 0x0a];

/// Legacy headers written with nanosecond timestamps (`a1b23c4d`).
pub const PCAP_NANOS_MAGIC_LE: [u8; 4] = [0x4d, 0x3c, 0xb2, 0xa1];
pub const PCAP_NANOS_MAGIC_BE: [u8; 4] = [0xa1, 0xb2, 0x3c, 0x4d];

pub const PCAP_READER_BUFFER_SIZE: usize = 64 * 1024;

/// Enhanced packet timestamps are in microseconds unless the interface says otherwise.
pub const PCAPNG_TICKS_PER_SECOND: f64 = 1_000_000.0;
