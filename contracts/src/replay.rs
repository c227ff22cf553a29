//! One-time-use authorization digests.
//!
//! For mints this is off unless `reject_replayed_mints` is configured. When
//! on, the engine checks a mint's digest before applying it and records it
//! after, so a failed mint never burns its approval. The node keeps a
//! second, always-on guard for caller-signed requests.

use std::collections::HashSet;

use pegcoin_protocol::crypto::Digest;

#[derive(Debug, Clone, Default)]
pub struct ReplayGuard {
    consumed: HashSet<Digest>,
}

impl ReplayGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_consumed(&self, digest: &Digest) -> bool {
        self.consumed.contains(digest)
    }

    /// Marks `digest` as used. Returns `false` if it already was.
    pub fn consume(&mut self, digest: Digest) -> bool {
        self.consumed.insert(digest)
    }

    pub fn len(&self) -> usize {
        self.consumed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.consumed.is_empty()
    }
}
