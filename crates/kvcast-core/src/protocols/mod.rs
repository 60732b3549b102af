//! Payload and frame decoding.
//!
//! Each decoder follows the same layered structure:
//! - `layout`: constants describing the wire format (source of truth)
//! - `reader`: bounds-checked byte access
//! - `parser`: domain-level decoding (no direct byte indexing)
//! - `error`: explicit, actionable errors
//!
//! Parsers are pure and contain no I/O; sources and the session loop handle
//! sockets, files and output.

pub(crate) mod common;
pub mod kv;
pub mod udp;
