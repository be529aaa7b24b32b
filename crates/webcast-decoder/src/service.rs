//! Async frame-decoding service.
//!
//! Frames arrive on an mpsc channel; each is decoded on the blocking pool so
//! inflate work never stalls the runtime, and events go out on a second
//! channel in frame order. A periodic tick sweeps the dedup window.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::ServiceError;
use crate::event::Event;
use crate::pipeline::FrameDecoder;

/// Drives a shared [`FrameDecoder`] from channels.
#[derive(Debug, Clone)]
pub struct DecoderService {
    decoder: Arc<FrameDecoder>,
    sweep_interval: Duration,
}

impl DecoderService {
    pub fn new(decoder: Arc<FrameDecoder>) -> Self {
        let sweep_interval = decoder.config().dedup_sweep_interval();
        Self {
            decoder,
            sweep_interval,
        }
    }

    pub fn decoder(&self) -> &Arc<FrameDecoder> {
        &self.decoder
    }

    /// Run until the frame channel closes or `cancel` fires.
    ///
    /// Fails only when the event receiver goes away or a decode task dies.
    pub async fn run(
        self,
        mut frames: mpsc::Receiver<Bytes>,
        events: mpsc::Sender<Event>,
        cancel: CancellationToken,
    ) -> Result<(), ServiceError> {
        let mut sweep = tokio::time::interval(self.sweep_interval.max(Duration::from_millis(1)));
        sweep.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick completes immediately.
        sweep.tick().await;

        loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    debug!("decoder service cancelled");
                    break;
                }

                _ = sweep.tick() => {
                    let removed = self.decoder.sweep();
                    if removed > 0 {
                        debug!(removed, "dedup window swept");
                    }
                }

                frame = frames.recv() => {
                    let Some(frame) = frame else {
                        debug!("frame channel closed");
                        break;
                    };
                    for event in self.decode_blocking(frame).await? {
                        events.send(event).await.map_err(|_| ServiceError::ChannelClosed)?;
                    }
                }
            }
        }

        info!(stats = ?self.decoder.stats(), "decoder service stopped");
        Ok(())
    }

    async fn decode_blocking(&self, frame: Bytes) -> Result<Vec<Event>, ServiceError> {
        let decoder = Arc::clone(&self.decoder);
        Ok(tokio::task::spawn_blocking(move || decoder.decode(frame)).await?)
    }
}
