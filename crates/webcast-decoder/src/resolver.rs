//! Frame-shape resolution.
//!
//! A raw frame is not self-describing: it may be a full envelope, a bare
//! response batch, a noisy buffer with gzip members embedded at arbitrary
//! offsets, or a run of length-prefixed message bodies. [`Resolver`] tries
//! each interpretation in a fixed order and stops at the first that yields
//! messages.

use std::fmt;

use bytes::Bytes;
use tracing::{debug, trace, warn};

use crate::config::DecoderConfig;
use crate::error::Result;
use crate::normalize;
use crate::schema::{Envelope, InnerMessage, ResponseBatch};
use crate::transcode::{find_gzip_magic, inflate_at, transcode};
use crate::wire::read_varint;

/// Frame interpretations, in the order they are attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Push envelope around a (possibly compressed) response batch.
    Envelope,
    /// Bare response batch.
    Response,
    /// Gzip members found by scanning for the magic bytes.
    GzipScan,
    /// Length-prefixed bodies accepted by a normalizer.
    MessageScan,
}

impl Strategy {
    pub const ALL: [Strategy; 4] = [
        Self::Envelope,
        Self::Response,
        Self::GzipScan,
        Self::MessageScan,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Envelope => "envelope",
            Self::Response => "response",
            Self::GzipScan => "gzip_scan",
            Self::MessageScan => "message_scan",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of resolving one buffer.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// The strategy that succeeded, if any.
    pub strategy: Option<Strategy>,
    pub messages: Vec<InnerMessage>,
}

impl Resolution {
    fn empty() -> Self {
        Self::default()
    }

    fn hit(strategy: Strategy, messages: Vec<InnerMessage>) -> Self {
        Self {
            strategy: Some(strategy),
            messages,
        }
    }
}

/// Resolves raw frames into method-tagged inner messages.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    config: &'a DecoderConfig,
    now_ms: i64,
}

impl<'a> Resolver<'a> {
    /// `now_ms` is only used by the message scan, whose acceptance test runs
    /// the normalizers.
    pub fn new(config: &'a DecoderConfig, now_ms: i64) -> Self {
        Self { config, now_ms }
    }

    pub fn resolve(&self, frame: &Bytes) -> Resolution {
        self.resolve_at(frame, 0)
    }

    fn resolve_at(&self, buf: &Bytes, depth: u8) -> Resolution {
        if buf.is_empty() {
            return Resolution::empty();
        }

        let empty_envelope = match self.try_envelope(buf) {
            Ok(messages) if !messages.is_empty() => {
                return Resolution::hit(Strategy::Envelope, messages);
            }
            Ok(_) => {
                trace!(depth, "envelope carried no messages");
                true
            }
            Err(e) => {
                trace!(depth, error = %e, "envelope strategy rejected");
                false
            }
        };

        match ResponseBatch::parse(buf) {
            Ok(batch) if !batch.messages.is_empty() => {
                return Resolution::hit(Strategy::Response, batch.messages);
            }
            Ok(_) => trace!(depth, "response strategy found no messages"),
            Err(e) => trace!(depth, error = %e, "response strategy rejected"),
        }

        let messages = self.scan_gzip(buf, depth);
        if !messages.is_empty() {
            return Resolution::hit(Strategy::GzipScan, messages);
        }

        let messages = self.scan_messages(buf);
        if !messages.is_empty() {
            return Resolution::hit(Strategy::MessageScan, messages);
        }

        if empty_envelope {
            return Resolution::hit(Strategy::Envelope, Vec::new());
        }
        debug!(depth, len = buf.len(), "no strategy matched");
        Resolution::empty()
    }

    /// An empty batch is not final: the remaining strategies still run, and
    /// the envelope is credited only if none of them finds messages.
    fn try_envelope(&self, buf: &Bytes) -> Result<Vec<InnerMessage>> {
        let envelope = Envelope::parse(buf)?;
        let payload = transcode(
            &envelope.payload,
            envelope.payload_encoding,
            self.config.max_inflated_len,
        )?;
        let batch = ResponseBatch::parse(&payload)?;
        trace!(
            seq = envelope.sequence_id,
            encoding = ?envelope.payload_encoding,
            messages = batch.messages.len(),
            "envelope decoded"
        );
        Ok(batch.messages)
    }

    fn scan_gzip(&self, buf: &Bytes, depth: u8) -> Vec<InnerMessage> {
        let mut messages = Vec::new();
        if depth >= self.config.max_inflate_depth {
            trace!(depth, "inflate depth exhausted");
            return messages;
        }

        let mut from = 0;
        let mut candidates = 0;
        while candidates < self.config.max_gzip_candidates {
            let Some(pos) = find_gzip_magic(buf, from) else {
                break;
            };
            candidates += 1;

            match inflate_at(buf, pos, self.config.max_inflated_len) {
                Ok(inflated) => {
                    trace!(depth, offset = pos, len = inflated.len(), "inflated gzip member");
                    let inner = self.resolve_at(&Bytes::from(inflated), depth + 1);
                    messages.extend(inner.messages);
                    from = pos + self.config.gzip_lookahead.max(1);
                }
                Err(e) => {
                    trace!(depth, offset = pos, error = %e, "gzip candidate rejected");
                    from = pos + 1;
                }
            }
        }
        messages
    }

    /// Walk `buf` reading a varint length and testing the slice behind it.
    ///
    /// A slice counts only when one of the probe-order normalizers accepts
    /// it; the emitted message is tagged with that kind's method name. A
    /// well-formed length always moves the cursor past its slice, matched or
    /// not; anything else advances one byte.
    fn scan_messages(&self, buf: &Bytes) -> Vec<InnerMessage> {
        let mut messages = Vec::new();
        let mut offset = 0;
        let mut candidates = 0;

        while offset < buf.len() {
            if candidates >= self.config.max_scan_candidates {
                warn!(offset, len = buf.len(), "message scan budget exhausted");
                break;
            }
            let Some((start, end)) = candidate_slice(buf, offset) else {
                offset += 1;
                continue;
            };
            candidates += 1;

            if let Some((kind, _)) = normalize::probe(&buf[start..end], self.now_ms) {
                trace!(offset = start, len = end - start, method = kind.method(), "scan matched");
                messages.push(InnerMessage::new(kind.method(), buf.slice(start..end)));
            }
            offset = end;
        }
        messages
    }
}

/// Bounds of the slice announced by a varint length at `offset`, if the
/// length is non-zero and the slice fits in `buf`.
fn candidate_slice(buf: &[u8], offset: usize) -> Option<(usize, usize)> {
    let (len, start) = read_varint(buf, offset).ok()?;
    let len = usize::try_from(len).ok().filter(|&len| len > 0)?;
    let end = start.checked_add(len).filter(|&end| end <= buf.len())?;
    Some((start, end))
}
