// ABOUTME: Replay cache tracking (consumer key, nonce) pairs inside the freshness window
// ABOUTME: Atomic check-and-record via the DashMap entry API; stale entries swept lazily

//! Nonce replay cache.
//!
//! The one piece of shared mutable state in the crate. `DashMap` gives
//! sharded locking, so independent launches do not contend on a global
//! lock, and the entry API makes check-and-record atomic: two concurrent
//! deliveries of the same signed request yield exactly one acceptance.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::time::Duration;

/// Tracks recently accepted (consumer key, nonce) pairs.
pub struct NonceCache {
    seen: DashMap<(String, String), i64>,
    window_secs: i64,
    cleanup_threshold: usize,
}

impl NonceCache {
    /// Create a cache whose entries stay effective for `window` and whose
    /// stale entries are swept once the map grows past
    /// `cleanup_threshold`.
    #[must_use]
    pub fn new(window: Duration, cleanup_threshold: usize) -> Self {
        Self {
            seen: DashMap::new(),
            window_secs: i64::try_from(window.as_secs()).unwrap_or(i64::MAX),
            cleanup_threshold,
        }
    }

    /// Atomically check a nonce and record it if new.
    ///
    /// Returns `true` when the pair was not seen inside the freshness
    /// window (the nonce is recorded under `timestamp`), `false` when this
    /// is a replay. An entry left over from outside the window is
    /// overwritten rather than treated as a replay.
    pub fn check_and_record(
        &self,
        consumer_key: &str,
        nonce: &str,
        timestamp: i64,
        now: i64,
    ) -> bool {
        let accepted = match self
            .seen
            .entry((consumer_key.to_owned(), nonce.to_owned()))
        {
            Entry::Occupied(mut slot) => {
                if (now - *slot.get()).abs() <= self.window_secs {
                    false
                } else {
                    slot.insert(timestamp);
                    true
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(timestamp);
                true
            }
        };

        // Sweep off the hot path, and only after the entry guard above has
        // been released; retain would contend with a held shard lock.
        if accepted && self.seen.len() > self.cleanup_threshold {
            self.sweep(now);
        }
        accepted
    }

    /// Drop entries outside the freshness window. Entries still inside the
    /// window are never evicted; doing so would re-open a replay gap.
    pub fn sweep(&self, now: i64) {
        self.seen
            .retain(|_, timestamp| (now - *timestamp).abs() <= self.window_secs);
    }

    /// Number of tracked pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
