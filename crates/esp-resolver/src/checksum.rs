// SPDX-License-Identifier: MIT OR Apache-2.0
//! Streaming SHA-256 verification of fetched bytes (`spec.md` §4.4).

use sha2::{Digest, Sha256};

/// Sentinel that bypasses checksum comparison in the source's own
/// snippet-test corpus. Production code MUST NOT honor it; see
/// [`Verifier::with_test_mode`].
pub const SKIP_CHECKSUM_VERIFICATION_SENTINEL: &str = "$skipChecksumVerification";

/// Accumulates a streaming SHA-256 digest over bytes as they arrive off the
/// wire, so the whole artifact never needs to be buffered before hashing.
#[derive(Debug, Default)]
pub struct StreamingHasher {
    hasher: Sha256,
}

impl StreamingHasher {
    /// Start a fresh hasher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk of bytes into the running digest.
    pub fn update(&mut self, chunk: &[u8]) {
        self.hasher.update(chunk);
    }

    /// Finalize and return the lowercase hex-encoded digest.
    #[must_use]
    pub fn finish(self) -> String {
        let digest = self.hasher.finalize();
        hex_encode(&digest)
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    use std::fmt::Write;
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        write!(out, "{byte:02x}").expect("writing to a String never fails");
    }
    out
}

/// Verifies a fetched artifact's digest against an expected value.
///
/// `test_mode` gates the `$skipChecksumVerification` sentinel (`spec.md`
/// §4.4, §9): it must only ever be set by test harnesses, never by
/// production wiring.
#[derive(Debug, Clone, Copy, Default)]
pub struct Verifier {
    test_mode: bool,
}

impl Verifier {
    /// A verifier that never honors the skip sentinel.
    #[must_use]
    pub fn new() -> Self {
        Self { test_mode: false }
    }

    /// A verifier that honors `$skipChecksumVerification` as `expected`.
    /// Exists only for the test harness; unreachable from a production
    /// dependent (`spec.md` §9).
    #[cfg(test)]
    #[must_use]
    pub fn with_test_mode() -> Self {
        Self { test_mode: true }
    }

    /// Compare `actual` (a lowercase hex digest) against `expected`. Returns
    /// `true` if they match, or if `expected` is the skip sentinel and this
    /// verifier was built with [`Verifier::with_test_mode`].
    #[must_use]
    pub fn matches(&self, expected: &str, actual: &str) -> bool {
        if self.test_mode && expected == SKIP_CHECKSUM_VERIFICATION_SENTINEL {
            return true;
        }
        expected.eq_ignore_ascii_case(actual)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_known_vector() {
        let mut hasher = StreamingHasher::new();
        hasher.update(b"abc");
        assert_eq!(
            hasher.finish(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn hashes_incrementally_fed_chunks_same_as_one_shot() {
        let mut incremental = StreamingHasher::new();
        incremental.update(b"ab");
        incremental.update(b"c");
        let mut one_shot = StreamingHasher::new();
        one_shot.update(b"abc");
        assert_eq!(incremental.finish(), one_shot.finish());
    }

    #[test]
    fn production_verifier_rejects_the_sentinel() {
        let verifier = Verifier::new();
        assert!(!verifier.matches(SKIP_CHECKSUM_VERIFICATION_SENTINEL, "anything"));
    }

    #[test]
    fn test_mode_verifier_honors_the_sentinel() {
        let verifier = Verifier::with_test_mode();
        assert!(verifier.matches(SKIP_CHECKSUM_VERIFICATION_SENTINEL, "anything"));
        assert!(!verifier.matches("deadbeef", "feedface"));
    }

    #[test]
    fn case_insensitive_hex_comparison() {
        let verifier = Verifier::new();
        assert!(verifier.matches("DEADBEEF", "deadbeef"));
    }
}
