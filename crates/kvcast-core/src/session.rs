//! Receive/decode loop.
//!
//! Datagrams are processed strictly one at a time: every pair of a datagram
//! is written and the sink flushed before the next datagram is requested.
//! Decode errors end the current datagram only; source and output failures
//! end the session.

use std::io::{self, Write};

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::format::PairSink;
use crate::protocols::kv::{DecodeError, decode_payload};
use crate::source::{Datagram, DatagramSource, SourceError};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Source error: {0}")]
    Source(#[from] SourceError),
    #[error("Output error: {0}")]
    Output(#[from] io::Error),
}

#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// Stop after this many datagrams; `None` runs until the source ends.
    pub max_datagrams: Option<u64>,
}

/// Counters accumulated over a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub datagrams: u64,
    pub pairs: u64,
    pub decode_errors: u64,
    /// Keys and values shortened to their capacity.
    pub truncated_fields: u64,
}

/// Result of decoding one datagram.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatagramReport {
    pub pairs: u64,
    pub truncated_fields: u64,
    pub error: Option<DecodeError>,
}

impl SessionSummary {
    fn record(&mut self, report: &DatagramReport) {
        self.datagrams += 1;
        self.pairs += report.pairs;
        self.truncated_fields += report.truncated_fields;
        if report.error.is_some() {
            self.decode_errors += 1;
        }
    }
}

/// Decodes `datagram` and streams its pairs into `sink` as they are produced.
pub fn process_datagram<W: Write, E: Write>(
    datagram: &Datagram,
    sink: &mut PairSink<W, E>,
) -> io::Result<DatagramReport> {
    let mut report = DatagramReport::default();
    for item in decode_payload(&datagram.payload) {
        match item {
            Ok(pair) => {
                let truncated =
                    u64::from(pair.key.is_truncated()) + u64::from(pair.value.is_truncated());
                if truncated > 0 {
                    debug!(
                        key_len = pair.key.original_len(),
                        value_len = pair.value.original_len(),
                        offset = pair.span.start,
                        "pair truncated"
                    );
                }
                report.truncated_fields += truncated;
                report.pairs += 1;
                sink.write_pair(&pair, datagram)?;
            }
            Err(err) => {
                debug!(%err, origin = ?datagram.origin, "datagram decode stopped");
                sink.write_error(&err)?;
                report.error = Some(err);
            }
        }
    }
    Ok(report)
}

/// Runs the loop until the source is exhausted or the datagram limit is hit.
pub fn run_session<S, W, E>(
    source: &mut S,
    sink: &mut PairSink<W, E>,
    options: &SessionOptions,
) -> Result<SessionSummary, SessionError>
where
    S: DatagramSource,
    W: Write,
    E: Write,
{
    let mut summary = SessionSummary::default();
    while options
        .max_datagrams
        .is_none_or(|max| summary.datagrams < max)
    {
        let Some(datagram) = source.next_datagram()? else {
            break;
        };
        debug!(
            len = datagram.payload.len(),
            origin = ?datagram.origin,
            "datagram received"
        );
        let report = process_datagram(&datagram, sink)?;
        sink.flush()?;
        summary.record(&report);
    }
    Ok(summary)
}
