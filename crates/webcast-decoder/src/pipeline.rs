//! Frame-to-event pipeline.
//!
//! [`FrameDecoder`] is the entry point of the crate: resolve the frame shape,
//! dispatch every inner message to its normalizer, drop ignored kinds and
//! duplicates, and hand the survivors to an [`EventSink`].
//!
//! Decoding never fails from the caller's point of view. Every error is
//! absorbed at the smallest scope that can recover from it and shows up only
//! in logs and [`DecoderStats`].

use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, trace};

use crate::clock::{Clock, SystemClock};
use crate::config::DecoderConfig;
use crate::dedup::DedupCache;
use crate::event::Event;
use crate::normalize::{self, MessageKind};
use crate::resolver::Resolver;
use crate::schema::InnerMessage;
use crate::stats::{DecoderStats, StatsSnapshot};

/// Receiver of decoded events.
pub trait EventSink {
    fn emit(&mut self, event: Event);
}

impl EventSink for Vec<Event> {
    fn emit(&mut self, event: Event) {
        self.push(event);
    }
}

impl<F> EventSink for F
where
    F: FnMut(Event),
{
    fn emit(&mut self, event: Event) {
        self(event)
    }
}

/// Stateful frame decoder.
///
/// Holds the dedup window, so one instance should see every frame of a room.
/// All methods take `&self`; the decoder can be shared behind an [`Arc`].
#[derive(Debug)]
pub struct FrameDecoder {
    config: DecoderConfig,
    clock: Arc<dyn Clock>,
    dedup: DedupCache,
    stats: DecoderStats,
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new(DecoderConfig::default())
    }
}

impl FrameDecoder {
    pub fn new(config: DecoderConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: DecoderConfig, clock: Arc<dyn Clock>) -> Self {
        let dedup = DedupCache::new(config.dedup_ttl(), config.dedup_sweep_interval());
        Self {
            config,
            clock,
            dedup,
            stats: DecoderStats::default(),
        }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Decode one frame into events, in wire order.
    pub fn decode(&self, frame: impl Into<Bytes>) -> Vec<Event> {
        let mut events = Vec::new();
        self.decode_into(frame, &mut events);
        events
    }

    /// Decode one frame, emitting each surviving event into `sink`.
    ///
    /// Returns the number of events emitted.
    pub fn decode_into<S: EventSink + ?Sized>(&self, frame: impl Into<Bytes>, sink: &mut S) -> usize {
        let frame = frame.into();
        let now_ms = self.clock.now_millis();

        let resolution = Resolver::new(&self.config, now_ms).resolve(&frame);
        self.stats.frame(resolution.strategy);
        self.stats.messages(resolution.messages.len());
        trace!(
            len = frame.len(),
            strategy = resolution.strategy.map(|s| s.as_str()),
            messages = resolution.messages.len(),
            "frame resolved"
        );

        let mut emitted = 0;
        for message in &resolution.messages {
            let Some(event) = self.normalize_message(message, now_ms) else {
                continue;
            };
            if self.config.is_ignored(event.kind) {
                self.stats.ignored();
                continue;
            }
            if !self.dedup.admit(&event, now_ms) {
                self.stats.duplicate();
                trace!(kind = %event.kind, "duplicate suppressed");
                continue;
            }
            self.stats.emitted();
            sink.emit(event);
            emitted += 1;
        }
        emitted
    }

    fn normalize_message(&self, message: &InnerMessage, now_ms: i64) -> Option<Event> {
        let Some(kind) = MessageKind::from_method(&message.method) else {
            self.stats.unknown_method();
            if self.config.probe_unknown_methods {
                let probed = normalize::probe(&message.payload, now_ms);
                if let Some((kind, _)) = &probed {
                    debug!(method = %message.method, as_kind = kind.method(), "probed unknown method");
                }
                return probed.map(|(_, event)| event);
            }
            trace!(method = %message.method, "unknown method dropped");
            return None;
        };

        match normalize::normalize(kind, &message.payload, now_ms) {
            Ok(event) => Some(event),
            Err(e) => {
                self.stats.dropped();
                trace!(method = kind.method(), reason = e.label(), error = %e, "message dropped");
                None
            }
        }
    }

    /// Evict expired dedup entries. Returns the number removed.
    pub fn sweep(&self) -> usize {
        self.dedup.sweep(self.clock.now_millis())
    }

    /// Number of keys currently held by the dedup window.
    pub fn dedup_len(&self) -> usize {
        self.dedup.len()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }
}
