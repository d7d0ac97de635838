use bytes::Bytes;

use crate::edition::Edition;

/// One candidate edition reported by the polling engine, together with the
/// content it was found with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Discovery {
    pub edition: Edition,
    /// The content at this edition is a metadata document rather than raw data.
    pub metadata: bool,
    /// Compression codec of `payload`, if any.
    pub codec: Option<u16>,
    pub payload: Option<Bytes>,
    /// Content passed strong verification ("known good").
    pub known_good: bool,
    /// The edition was (also) found by the cheap slot heuristic.
    pub slot_too: bool,
}

impl Discovery {
    /// A bare slot number: no content, not known good.
    pub fn new(edition: u64) -> Self {
        Self::at(Edition(edition))
    }

    pub fn at(edition: Edition) -> Self {
        Self {
            edition,
            metadata: false,
            codec: None,
            payload: None,
            known_good: false,
            slot_too: false,
        }
    }

    pub fn with_metadata(mut self, metadata: bool) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_codec(mut self, codec: u16) -> Self {
        self.codec = Some(codec);
        self
    }

    pub fn with_payload(mut self, payload: impl Into<Bytes>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    /// Mark as verified known-good content.
    pub fn known_good(mut self, known_good: bool) -> Self {
        self.known_good = known_good;
        self
    }

    /// Mark as found via the slot heuristic.
    pub fn slot_too(mut self, slot_too: bool) -> Self {
        self.slot_too = slot_too;
        self
    }
}
