//! Per-run dedup and limit bookkeeping.

use std::collections::HashSet;

/// Dedup and limit state for one collection run.
///
/// A user key is in exactly one of three conditions: never seen, in
/// `processing` (download in flight), or in `saved` (download completed
/// and persisted). `saved` only grows; keys move out of `processing`
/// when their task completes either way.
///
/// The state itself is not synchronized; the coordinator holds it
/// behind a mutex and is its only mutator.
#[derive(Debug, Default)]
pub struct CollectorState {
    saved: HashSet<String>,
    processing: HashSet<String>,
}

impl CollectorState {
    /// Creates empty state for a fresh run.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of users whose avatar has been saved.
    #[must_use]
    pub fn saved_count(&self) -> usize {
        self.saved.len()
    }

    /// Number of downloads currently in flight.
    #[must_use]
    pub fn processing_count(&self) -> usize {
        self.processing.len()
    }

    /// Whether the key has been saved already or is in flight.
    #[must_use]
    pub fn is_known(&self, key: &str) -> bool {
        self.saved.contains(key) || self.processing.contains(key)
    }

    /// Transitions a key into `processing` on admission.
    pub(crate) fn begin(&mut self, key: &str) {
        debug_assert!(!self.is_known(key), "admitted a known key: {key}");
        self.processing.insert(key.to_string());
    }

    /// Releases a key's in-flight slot without marking it saved.
    ///
    /// Used on task failure and on the late-finisher path; the key
    /// becomes eligible again for a later event from the same user.
    pub(crate) fn release(&mut self, key: &str) {
        self.processing.remove(key);
    }

    /// Completes a key: out of `processing`, into `saved` unless the
    /// target was already reached by other tasks racing ahead.
    ///
    /// Returns `true` when the key was counted toward the target.
    pub(crate) fn complete(&mut self, key: &str, max: usize) -> bool {
        self.processing.remove(key);
        if self.saved.len() >= max {
            // Late finisher: the slot is released but the result is not
            // counted, keeping |saved| <= max.
            return false;
        }
        self.saved.insert(key.to_string());
        true
    }
}
