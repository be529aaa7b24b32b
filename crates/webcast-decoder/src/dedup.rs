//! Time-windowed duplicate suppression.

use std::time::Duration;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::event::{Event, EventKind};

/// Identity of an event for duplicate detection.
///
/// Timestamps are truncated to whole seconds, so re-deliveries of the same
/// message with jittered millisecond stamps collapse onto one key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey {
    kind: EventKind,
    user_id: String,
    content: String,
    second: i64,
}

impl DedupKey {
    pub fn of(event: &Event) -> Self {
        Self {
            kind: event.kind,
            user_id: event.user_id().to_owned(),
            content: event.content.clone(),
            second: event.timestamp.div_euclid(1000),
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    /// Key to first-seen wall time, epoch milliseconds.
    seen: FxHashMap<DedupKey, i64>,
    last_sweep: i64,
}

/// Suppresses events whose key was first seen less than `ttl` ago.
///
/// Expiry is measured from the first sighting; repeats do not extend it.
#[derive(Debug)]
pub struct DedupCache {
    ttl_ms: i64,
    sweep_interval_ms: i64,
    inner: Mutex<Inner>,
}

fn millis(d: Duration) -> i64 {
    i64::try_from(d.as_millis()).unwrap_or(i64::MAX)
}

impl DedupCache {
    pub fn new(ttl: Duration, sweep_interval: Duration) -> Self {
        Self {
            ttl_ms: millis(ttl),
            sweep_interval_ms: millis(sweep_interval),
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Returns `true` if `event` should be emitted, recording it as seen.
    pub fn admit(&self, event: &Event, now_ms: i64) -> bool {
        let key = DedupKey::of(event);
        let mut inner = self.inner.lock();

        if now_ms.saturating_sub(inner.last_sweep) >= self.sweep_interval_ms {
            let removed = Self::evict(&mut inner.seen, now_ms, self.ttl_ms);
            inner.last_sweep = now_ms;
            if removed > 0 {
                debug!(removed, remaining = inner.seen.len(), "dedup sweep");
            }
        }

        match inner.seen.get_mut(&key) {
            Some(first_seen) if now_ms.saturating_sub(*first_seen) < self.ttl_ms => false,
            Some(first_seen) => {
                *first_seen = now_ms;
                true
            }
            None => {
                inner.seen.insert(key, now_ms);
                true
            }
        }
    }

    /// Drop every entry whose window has elapsed. Returns the number removed.
    pub fn sweep(&self, now_ms: i64) -> usize {
        let mut inner = self.inner.lock();
        inner.last_sweep = now_ms;
        Self::evict(&mut inner.seen, now_ms, self.ttl_ms)
    }

    fn evict(seen: &mut FxHashMap<DedupKey, i64>, now_ms: i64, ttl_ms: i64) -> usize {
        let before = seen.len();
        seen.retain(|_, first_seen| now_ms.saturating_sub(*first_seen) < ttl_ms);
        before - seen.len()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.inner.lock().seen.clear();
    }
}
