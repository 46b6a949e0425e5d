// SPDX-License-Identifier: MIT OR Apache-2.0
//! The per-package lookup state machine (`spec.md` §4.4), modeled the way
//! `abp-host::lifecycle::LifecycleManager` tracks sidecar state: an explicit
//! enum plus a `transition` that rejects invalid moves.

use std::fmt;

/// State of a single package's metadata/zip lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupState {
    /// No fetch has been attempted yet.
    Idle,
    /// The metadata document is being fetched over HTTPS.
    MetadataFetching,
    /// The metadata document was fetched and its checksum (if any) verified.
    MetadataVerified,
    /// The zip archive is being fetched over HTTPS.
    ZipFetching,
    /// The zip archive was fetched, verified, and is open for asset reads.
    ZipOpen,
}

impl fmt::Display for LookupState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::MetadataFetching => "metadata_fetching",
            Self::MetadataVerified => "metadata_verified",
            Self::ZipFetching => "zip_fetching",
            Self::ZipOpen => "zip_open",
        };
        f.write_str(s)
    }
}

/// Tracks one package lookup's progress through `S0..S4` and rejects
/// transitions the state machine doesn't allow.
#[derive(Debug, Clone, Copy)]
pub struct LookupTracker {
    state: LookupState,
}

impl LookupTracker {
    /// A tracker starting at `S0 Idle`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: LookupState::Idle,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> LookupState {
        self.state
    }

    /// Attempt to move to `to`. Returns `false` (and leaves state
    /// unchanged) if the transition isn't in the table (`spec.md` §4.4).
    pub fn transition(&mut self, to: LookupState) -> bool {
        let allowed = matches!(
            (self.state, to),
            (LookupState::Idle, LookupState::MetadataFetching)
                | (LookupState::MetadataFetching, LookupState::MetadataVerified)
                | (LookupState::MetadataVerified, LookupState::ZipFetching)
                | (LookupState::ZipFetching, LookupState::ZipOpen)
                | (LookupState::ZipOpen, LookupState::Idle)
                | (LookupState::MetadataVerified, LookupState::Idle)
        );
        if allowed {
            self.state = to;
        }
        allowed
    }
}

impl Default for LookupTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walks_the_full_s0_to_s4_path() {
        let mut tracker = LookupTracker::new();
        assert!(tracker.transition(LookupState::MetadataFetching));
        assert!(tracker.transition(LookupState::MetadataVerified));
        assert!(tracker.transition(LookupState::ZipFetching));
        assert!(tracker.transition(LookupState::ZipOpen));
        assert_eq!(tracker.state(), LookupState::ZipOpen);
    }

    #[test]
    fn metadata_only_lookup_terminates_without_opening_a_zip() {
        let mut tracker = LookupTracker::new();
        assert!(tracker.transition(LookupState::MetadataFetching));
        assert!(tracker.transition(LookupState::MetadataVerified));
        assert!(tracker.transition(LookupState::Idle));
    }

    #[test]
    fn rejects_skipping_a_state() {
        let mut tracker = LookupTracker::new();
        assert!(!tracker.transition(LookupState::ZipOpen));
        assert_eq!(tracker.state(), LookupState::Idle);
    }

    #[test]
    fn close_returns_to_idle_for_refcount_zero() {
        let mut tracker = LookupTracker::new();
        tracker.transition(LookupState::MetadataFetching);
        tracker.transition(LookupState::MetadataVerified);
        tracker.transition(LookupState::ZipFetching);
        tracker.transition(LookupState::ZipOpen);
        assert!(tracker.transition(LookupState::Idle));
    }
}
