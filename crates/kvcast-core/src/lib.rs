//! kvcast core library: multicast `key:value` datagram decoding.
//!
//! Sources deliver one datagram payload at a time, the `kv` decoder turns the
//! payload into bounded key/value pairs, and the session loop writes each pair
//! as a formatted line. Decoding is byte-oriented and side-effect free; all
//! I/O is isolated in `source` modules and the output sink.
//!
//! Invariants:
//! - The decoder never reads outside the payload and never rewinds.
//! - Oversized keys (>= 255 bytes) and values (>= 2048 bytes) are truncated,
//!   never rejected.
//! - A malformed token ends its datagram only; pairs already produced stand.
//!
//! # Examples
//! ```
//! use kvcast_core::{MemorySource, OutputFormat, PairSink, SessionOptions, run_session};
//!
//! let mut source = MemorySource::from_payloads([&b"a:1 b:\"two words\""[..], b"c"]);
//! let mut sink = PairSink::new(OutputFormat::Table, Vec::new(), Vec::new());
//! let summary = run_session(&mut source, &mut sink, &SessionOptions::default())?;
//! assert_eq!(summary.pairs, 2);
//! assert_eq!(summary.decode_errors, 1);
//! # Ok::<(), kvcast_core::SessionError>(())
//! ```

pub mod format;
mod protocols;
mod session;
mod source;

pub use format::{
    FIELD_WIDTH, OutputFormat, PairRecord, PairSink, format_diagnostic, format_table_line,
};
pub use protocols::kv::layout::{
    KEY_CAPACITY, KEY_MAX_LEN, VALUE_CAPACITY, VALUE_MAX_LEN,
};
pub use protocols::kv::{
    DecodeError, DecodeOutcome, Key, KeyFault, Pair, Pairs, Value, ValueFault, decode_all,
    decode_payload,
};
pub use protocols::udp::error::UdpError;
pub use protocols::udp::{UdpDatagram, parse_udp_datagram};
pub use session::{
    DatagramReport, SessionError, SessionOptions, SessionSummary, process_datagram, run_session,
};
pub use source::{
    Datagram, DatagramFilter, DatagramSource, MAX_DATAGRAM_LEN, MemorySource, MulticastConfig,
    MulticastSource, PcapFileSource, SocketStep, SourceError,
};
