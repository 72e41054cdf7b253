//! Content Store
//!
//! Payload bytes live outside the flow unit, in a store addressed by [`ContentClaim`].
//! The merge engine reads member payloads as streams and writes each merge result as a
//! new claim.

pub mod memory;

pub use memory::MemoryContentStore;

use crate::error::ContentError;
use std::fmt;
use std::io::Read;
use uuid::Uuid;

/// Reference to an immutable payload held by a [`ContentStore`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentClaim(Uuid);

impl ContentClaim {
    pub fn new() -> Self {
        ContentClaim(Uuid::new_v4())
    }

    pub fn id(&self) -> Uuid {
        self.0
    }
}

impl Default for ContentClaim {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ContentClaim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Storage for payload bytes.
///
/// Implementations must be safe to share between worker threads.
pub trait ContentStore: Send + Sync {
    /// Persist `content` as a new immutable payload.
    fn write(&self, content: Vec<u8>) -> Result<ContentClaim, ContentError>;

    /// Open a stream over the payload behind `claim`.
    fn read(&self, claim: &ContentClaim) -> Result<Box<dyn Read + Send>, ContentError>;

    fn exists(&self, claim: &ContentClaim) -> bool;

    /// Drop a payload. Returns `false` if the claim was unknown.
    fn remove(&self, claim: &ContentClaim) -> bool;

    /// Number of payloads currently held.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
