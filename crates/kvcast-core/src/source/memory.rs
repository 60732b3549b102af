use std::collections::VecDeque;

use super::{Datagram, DatagramSource, SourceError};

/// Source replaying datagrams already held in memory.
#[derive(Debug, Default, Clone)]
pub struct MemorySource {
    queue: VecDeque<Datagram>,
}

impl MemorySource {
    pub fn new(datagrams: impl IntoIterator<Item = Datagram>) -> Self {
        Self {
            queue: datagrams.into_iter().collect(),
        }
    }

    /// One datagram per payload, without origin or timestamp.
    pub fn from_payloads<P: AsRef<[u8]>>(payloads: impl IntoIterator<Item = P>) -> Self {
        Self::new(
            payloads
                .into_iter()
                .map(|payload| Datagram::new(payload.as_ref(), None, None)),
        )
    }
}

impl DatagramSource for MemorySource {
    fn next_datagram(&mut self) -> Result<Option<Datagram>, SourceError> {
        Ok(self.queue.pop_front())
    }
}
