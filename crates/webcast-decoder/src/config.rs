//! Decoder configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::event::EventKind;

/// Tunables for one [`crate::FrameDecoder`].
///
/// Every field has a default, so configuration files only need to name the
/// values they change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Recursion depth for inflating gzip members found by scanning.
    pub max_inflate_depth: u8,
    /// Gzip magic occurrences tried per buffer.
    pub max_gzip_candidates: usize,
    /// Bytes skipped after a successful inflate before scanning resumes.
    pub gzip_lookahead: usize,
    /// Candidate slices tried by the opportunistic message scan.
    pub max_scan_candidates: usize,
    /// Upper bound on the size of any inflated payload.
    pub max_inflated_len: usize,
    /// How long a seen event suppresses its duplicates.
    pub dedup_ttl_secs: u64,
    /// Minimum wall time between opportunistic dedup sweeps.
    pub dedup_sweep_interval_secs: u64,
    /// Try every known schema against payloads with unrecognized method tags.
    ///
    /// Diagnostic only: this produces false positives on real traffic.
    pub probe_unknown_methods: bool,
    /// Event kinds that are decoded but never emitted.
    pub ignored_kinds: Vec<EventKind>,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_inflate_depth: 3,
            max_gzip_candidates: 16,
            gzip_lookahead: 10,
            max_scan_candidates: 4096,
            max_inflated_len: 8 * 1024 * 1024,
            dedup_ttl_secs: 300,
            dedup_sweep_interval_secs: 30,
            probe_unknown_methods: false,
            ignored_kinds: Vec::new(),
        }
    }
}

impl DecoderConfig {
    pub fn dedup_ttl(&self) -> Duration {
        Duration::from_secs(self.dedup_ttl_secs)
    }

    pub fn dedup_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.dedup_sweep_interval_secs)
    }

    pub fn is_ignored(&self, kind: EventKind) -> bool {
        self.ignored_kinds.contains(&kind)
    }
}
