use std::cmp::Ordering;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::discovery::Discovery;
use crate::edition::Edition;

/// What a proxy should do with a discovery after it has been folded into the state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Admission {
    /// Older than the highest edition and not worth a late notification.
    Dropped,
    /// Folded into the state; held back until the next flush.
    Buffered,
    /// Forward the call as-is to the subscriber.
    PassThrough,
}

/// What a flush has to announce.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Announcement {
    /// The highest discovered edition with its cached content.
    Cached(Discovery),
    /// Nothing discovered yet; ask the poll context for the latest known slot.
    Lookup,
}

/// Coalescing state of one (subscriber, resource) pairing.
///
/// Pure data, no locking: the owning proxy serializes access.
#[derive(Clone, Debug, Default)]
pub struct ProxyState {
    highest: Option<Edition>,
    last_delivered: Option<Edition>,
    highest_metadata: bool,
    highest_codec: Option<u16>,
    highest_payload: Option<Bytes>,
    highest_known_good: bool,
    round_finished: bool,
    fallback_announced: Option<Edition>,
}

/// Diagnostic view of a `ProxyState`, without cached content.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxySnapshot {
    pub highest: Option<Edition>,
    pub last_delivered: Option<Edition>,
    pub highest_known_good: bool,
    pub round_finished: bool,
}

impl ProxyState {
    /// Fold a discovery into the state and decide whether it goes straight through.
    pub fn observe(&mut self, found: &Discovery) -> Admission {
        match self.highest.map(|h| found.edition.cmp(&h)) {
            Some(Ordering::Less) => {
                // Only a late confirmation after the round settled is worth sending.
                return if self.round_finished && found.known_good {
                    Admission::PassThrough
                } else {
                    Admission::Dropped
                };
            }
            Some(Ordering::Equal) => {
                if found.known_good {
                    self.highest_known_good = true;
                }
            }
            Some(Ordering::Greater) | None => {
                self.highest = Some(found.edition);
                self.highest_metadata = found.metadata;
                self.highest_codec = found.codec;
                self.highest_payload = found.payload.clone();
                self.highest_known_good = found.known_good;
            }
        }

        if !self.round_finished {
            return Admission::Buffered;
        }
        // Below an announced fallback slot counts as stale.
        if self.below_fallback(found.edition) && !found.known_good {
            return Admission::Dropped;
        }
        Admission::PassThrough
    }

    #[inline]
    fn below_fallback(&self, edition: Edition) -> bool {
        self.fallback_announced.is_some_and(|floor| edition < floor)
    }

    /// Start a flush. Latches `round_finished` when `finish_round` is set.
    ///
    /// Returns `None` when the highest edition, or a newer fallback slot, has
    /// already been delivered.
    pub fn take_announcement(&mut self, finish_round: bool) -> Option<Announcement> {
        if finish_round {
            self.round_finished = true;
        }

        let Some(edition) = self.highest else {
            if self.fallback_announced.is_some() {
                return None;
            }
            return Some(Announcement::Lookup);
        };
        if self.last_delivered == Some(edition) || self.below_fallback(edition) {
            return None;
        }
        self.last_delivered = Some(edition);

        Some(Announcement::Cached(Discovery {
            edition,
            metadata: self.highest_metadata,
            codec: self.highest_codec,
            payload: self.highest_payload.clone(),
            known_good: self.highest_known_good,
            slot_too: self.highest_known_good,
        }))
    }

    /// Record a fallback edition found through the poll context.
    ///
    /// Returns `true` if it should be announced: nothing has been discovered
    /// and no fallback has been announced since the lookup started. Once
    /// announced, the slot is a floor for later announcements.
    pub fn settle_fallback(&mut self, edition: Edition) -> bool {
        if self.highest.is_some() || self.fallback_announced.is_some() {
            return false;
        }
        self.fallback_announced = Some(edition);
        true
    }

    #[inline]
    pub fn highest(&self) -> Option<Edition> {
        self.highest
    }

    #[inline]
    pub fn last_delivered(&self) -> Option<Edition> {
        self.last_delivered
    }

    #[inline]
    pub fn highest_known_good(&self) -> bool {
        self.highest_known_good
    }

    #[inline]
    pub fn round_finished(&self) -> bool {
        self.round_finished
    }

    #[inline]
    pub fn fallback_announced(&self) -> Option<Edition> {
        self.fallback_announced
    }

    pub fn snapshot(&self) -> ProxySnapshot {
        ProxySnapshot {
            highest: self.highest,
            last_delivered: self.last_delivered,
            highest_known_good: self.highest_known_good,
            round_finished: self.round_finished,
        }
    }
}
