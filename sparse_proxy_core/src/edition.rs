use std::fmt;

use serde::{Deserialize, Serialize};

/// Version number of an updateable resource.
///
/// "No edition yet" is spelled `Option<Edition>::None`, never a magic value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Edition(pub u64);

impl Edition {
    #[inline]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for Edition {
    fn from(v: u64) -> Self {
        Edition(v)
    }
}

impl fmt::Display for Edition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Opaque identifier of a tracked resource.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
    pub fn new(id: impl Into<String>) -> Self {
        ResourceId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// FNV-1a over the id bytes; stable across runs and platforms.
    pub fn stable_hash(&self) -> u64 {
        self.0.bytes().fold(0xcbf2_9ce4_8422_2325, |h, b| {
            (h ^ u64::from(b)).wrapping_mul(0x0100_0000_01b3)
        })
    }
}

impl From<&str> for ResourceId {
    fn from(s: &str) -> Self {
        ResourceId(s.to_string())
    }
}

impl From<String> for ResourceId {
    fn from(s: String) -> Self {
        ResourceId(s)
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Scheduling class a subscriber asks the polling engine for.
///
/// Lower values are more urgent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PollingPriority(pub u8);

impl PollingPriority {
    pub const MAXIMUM: PollingPriority = PollingPriority(0);
    pub const INTERACTIVE: PollingPriority = PollingPriority(1);
    pub const UPDATE: PollingPriority = PollingPriority(3);
    pub const BULK: PollingPriority = PollingPriority(4);
    pub const MINIMUM: PollingPriority = PollingPriority(6);

    /// The more urgent of two priorities.
    #[inline]
    pub fn most_urgent(self, other: PollingPriority) -> PollingPriority {
        self.min(other)
    }
}

impl Default for PollingPriority {
    fn default() -> Self {
        PollingPriority::UPDATE
    }
}
