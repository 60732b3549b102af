//! Output rendering for decoded pairs and decode diagnostics.

use std::borrow::Cow;
use std::io::{self, Write};

use serde::Serialize;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::protocols::kv::{DecodeError, Pair};
use crate::source::Datagram;

/// Width of each column in table output, in characters.
pub const FIELD_WIDTH: usize = 20;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Two left-aligned 20-character columns.
    #[default]
    Table,
    /// One JSON object per pair.
    Json,
}

/// Renders a pair as two fixed-width columns, cutting longer fields.
///
/// # Examples
/// ```
/// use kvcast_core::format_table_line;
///
/// let line = format_table_line("temp", "21.5");
/// assert_eq!(line, format!("{:<20} {:<20}", "temp", "21.5"));
/// assert_eq!(format_table_line(&"k".repeat(30), "v").len(), 41);
/// ```
pub fn format_table_line(key: &str, value: &str) -> String {
    format!(
        "{key:<width$.width$} {value:<width$.width$}",
        width = FIELD_WIDTH
    )
}

/// One-line diagnostic for a payload that stopped decoding.
pub fn format_diagnostic(err: &DecodeError) -> String {
    match err.key() {
        Some(key) => format!("Invalid value format for key '{key}'."),
        None => "Invalid key format.".to_string(),
    }
}

/// JSON shape of a decoded pair.
#[derive(Debug, Clone, Serialize)]
pub struct PairRecord<'a> {
    pub key: Cow<'a, str>,
    pub value: Cow<'a, str>,
    pub truncated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ts: Option<String>,
}

impl<'a> PairRecord<'a> {
    pub fn new(pair: &Pair<'a>, datagram: &Datagram) -> Self {
        Self {
            key: pair.key.to_string_lossy(),
            value: pair.value.to_string_lossy(),
            truncated: pair.is_truncated(),
            src: datagram.origin.map(|origin| origin.to_string()),
            ts: ts_to_rfc3339(datagram.ts),
        }
    }
}

pub fn ts_to_rfc3339(ts: Option<f64>) -> Option<String> {
    let ts = ts?;
    let nanos = (ts * 1_000_000_000.0) as i128;
    OffsetDateTime::from_unix_timestamp_nanos(nanos)
        .ok()
        .and_then(|dt| dt.format(&Rfc3339).ok())
}

/// Writes pair lines to `out` and diagnostics to `diag`.
pub struct PairSink<W, E> {
    format: OutputFormat,
    out: W,
    diag: E,
}

impl<W: Write, E: Write> PairSink<W, E> {
    pub fn new(format: OutputFormat, out: W, diag: E) -> Self {
        Self { format, out, diag }
    }

    pub fn write_pair(&mut self, pair: &Pair<'_>, datagram: &Datagram) -> io::Result<()> {
        match self.format {
            OutputFormat::Table => writeln!(
                self.out,
                "{}",
                format_table_line(&pair.key.to_string_lossy(), &pair.value.to_string_lossy())
            ),
            OutputFormat::Json => {
                let record = PairRecord::new(pair, datagram);
                serde_json::to_writer(&mut self.out, &record)?;
                writeln!(self.out)
            }
        }
    }

    pub fn write_error(&mut self, err: &DecodeError) -> io::Result<()> {
        writeln!(self.diag, "{}", format_diagnostic(err))
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()?;
        self.diag.flush()
    }

    pub fn into_parts(self) -> (W, E) {
        (self.out, self.diag)
    }
}
