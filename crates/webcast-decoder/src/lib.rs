//! webcast-decoder: typed events from live-room push frames.
//!
//! Push frames on the room websocket are protobuf envelopes around
//! gzip-compressed batches of method-tagged messages, but in practice frames
//! also arrive bare, truncated, or with compressed members buried in noise.
//! This crate resolves whatever shape a frame has, decodes every recognized
//! message against a static schema table, validates it, and emits
//! de-duplicated [`Event`]s.
//!
//! ## Core Types
//!
//! - [`FrameDecoder`] - Stateful frame-to-event pipeline
//! - [`Event`] / [`EventKind`] / [`EventDetail`] - The decoded output
//! - [`DecoderConfig`] - Tunables, loadable with serde
//! - [`DecoderService`] - Channel-driven async wrapper
//!
//! ## Lower Layers
//!
//! - [`wire`] - Protobuf wire-format reader
//! - [`schema`] - Message shapes and envelope/batch parsing
//! - [`transcode`] - Gzip handling
//! - [`resolver`] - Frame-shape strategies
//! - [`normalize`] - Per-kind normalizers
//! - [`dedup`] - Time-windowed duplicate suppression
//!
//! ## Example
//!
//! ```
//! use webcast_decoder::FrameDecoder;
//!
//! let decoder = FrameDecoder::default();
//! let events = decoder.decode(vec![0xffu8; 16]);
//! assert!(events.is_empty());
//! ```

pub mod clock;
pub mod config;
pub mod dedup;
pub mod error;
pub mod event;
pub mod normalize;
pub mod pipeline;
pub mod resolver;
pub mod schema;
pub mod service;
pub mod stats;
pub mod text;
pub mod transcode;
pub mod wire;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::DecoderConfig;
pub use dedup::DedupCache;
pub use error::{DecodeError, Result, ServiceError};
pub use event::{
    ANONYMOUS, ControlStatus, Event, EventDetail, EventKind, EventUser, FansclubAction,
    GiftDetail, MemberAction, RankedUser, SocialAction,
};
pub use normalize::MessageKind;
pub use pipeline::{EventSink, FrameDecoder};
pub use resolver::{Resolution, Resolver, Strategy};
pub use schema::{Envelope, InnerMessage, PayloadEncoding, ResponseBatch};
pub use service::DecoderService;
pub use stats::StatsSnapshot;
