//! Decoder counters.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::resolver::Strategy;

/// Lock-free counters shared by every decode call of one decoder.
#[derive(Debug, Default)]
pub struct DecoderStats {
    frames: AtomicU64,
    empty_frames: AtomicU64,
    envelope_hits: AtomicU64,
    response_hits: AtomicU64,
    gzip_scan_hits: AtomicU64,
    message_scan_hits: AtomicU64,
    messages: AtomicU64,
    unknown_methods: AtomicU64,
    dropped: AtomicU64,
    duplicates: AtomicU64,
    ignored: AtomicU64,
    emitted: AtomicU64,
}

/// Point-in-time copy of [`DecoderStats`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub frames: u64,
    pub empty_frames: u64,
    pub envelope_hits: u64,
    pub response_hits: u64,
    pub gzip_scan_hits: u64,
    pub message_scan_hits: u64,
    pub messages: u64,
    pub unknown_methods: u64,
    pub dropped: u64,
    pub duplicates: u64,
    pub ignored: u64,
    pub emitted: u64,
}

fn bump(counter: &AtomicU64, by: u64) {
    counter.fetch_add(by, Ordering::Relaxed);
}

impl DecoderStats {
    pub(crate) fn frame(&self, strategy: Option<Strategy>) {
        bump(&self.frames, 1);
        let counter = match strategy {
            None => &self.empty_frames,
            Some(Strategy::Envelope) => &self.envelope_hits,
            Some(Strategy::Response) => &self.response_hits,
            Some(Strategy::GzipScan) => &self.gzip_scan_hits,
            Some(Strategy::MessageScan) => &self.message_scan_hits,
        };
        bump(counter, 1);
    }

    pub(crate) fn messages(&self, n: usize) {
        bump(&self.messages, n as u64);
    }

    pub(crate) fn unknown_method(&self) {
        bump(&self.unknown_methods, 1);
    }

    pub(crate) fn dropped(&self) {
        bump(&self.dropped, 1);
    }

    pub(crate) fn duplicate(&self) {
        bump(&self.duplicates, 1);
    }

    pub(crate) fn ignored(&self) {
        bump(&self.ignored, 1);
    }

    pub(crate) fn emitted(&self) {
        bump(&self.emitted, 1);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let load = |c: &AtomicU64| c.load(Ordering::Relaxed);
        StatsSnapshot {
            frames: load(&self.frames),
            empty_frames: load(&self.empty_frames),
            envelope_hits: load(&self.envelope_hits),
            response_hits: load(&self.response_hits),
            gzip_scan_hits: load(&self.gzip_scan_hits),
            message_scan_hits: load(&self.message_scan_hits),
            messages: load(&self.messages),
            unknown_methods: load(&self.unknown_methods),
            dropped: load(&self.dropped),
            duplicates: load(&self.duplicates),
            ignored: load(&self.ignored),
            emitted: load(&self.emitted),
        }
    }
}
