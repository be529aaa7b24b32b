//! Shared fixtures for integration tests.
//!
//! The message structs mirror the push-channel schema so frames can be built
//! with an independent protobuf encoder.

#![allow(dead_code)]

use std::io::Write;
use std::sync::Arc;

use bytes::Bytes;
use flate2::Compression;
use flate2::write::GzEncoder;
use prost::Message as _;
use webcast_decoder::{DecoderConfig, FrameDecoder, ManualClock};

/// 2023-11-14T22:13:20Z.
pub const T0: i64 = 1_700_000_000_000;

#[derive(Clone, PartialEq, prost::Message)]
pub struct HeaderEntry {
    #[prost(string, tag = "1")]
    pub key: String,
    #[prost(string, tag = "2")]
    pub value: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct PushFrame {
    #[prost(uint64, tag = "1")]
    pub seq_id: u64,
    #[prost(uint64, tag = "2")]
    pub log_id: u64,
    #[prost(uint64, tag = "3")]
    pub service: u64,
    #[prost(uint64, tag = "4")]
    pub method: u64,
    #[prost(message, repeated, tag = "5")]
    pub headers: Vec<HeaderEntry>,
    #[prost(string, tag = "6")]
    pub payload_encoding: String,
    #[prost(string, tag = "7")]
    pub payload_type: String,
    #[prost(bytes = "vec", tag = "8")]
    pub payload: Vec<u8>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Message {
    #[prost(string, tag = "1")]
    pub method: String,
    #[prost(bytes = "vec", tag = "2")]
    pub payload: Vec<u8>,
    #[prost(uint64, tag = "3")]
    pub msg_id: u64,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Response {
    #[prost(message, repeated, tag = "1")]
    pub messages: Vec<Message>,
    #[prost(string, tag = "2")]
    pub cursor: String,
    #[prost(uint64, tag = "3")]
    pub fetch_interval: u64,
    #[prost(uint64, tag = "4")]
    pub now: u64,
    #[prost(string, tag = "5")]
    pub internal_ext: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Common {
    #[prost(string, tag = "1")]
    pub method: String,
    #[prost(uint64, tag = "2")]
    pub msg_id: u64,
    #[prost(uint64, tag = "3")]
    pub room_id: u64,
    #[prost(uint64, tag = "4")]
    pub create_time: u64,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Image {
    #[prost(string, repeated, tag = "1")]
    pub url_list: Vec<String>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct User {
    #[prost(uint64, tag = "1")]
    pub id: u64,
    #[prost(string, tag = "3")]
    pub nickname: String,
    #[prost(uint64, tag = "6")]
    pub level: u64,
    #[prost(message, optional, tag = "9")]
    pub avatar_thumb: Option<Image>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct ChatMessage {
    #[prost(message, optional, tag = "1")]
    pub common: Option<Common>,
    #[prost(message, optional, tag = "2")]
    pub user: Option<User>,
    #[prost(string, tag = "3")]
    pub content: String,
    #[prost(uint64, tag = "15")]
    pub event_time: u64,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct GiftStruct {
    #[prost(uint64, tag = "5")]
    pub id: u64,
    #[prost(uint64, tag = "12")]
    pub diamond_count: u64,
    #[prost(string, tag = "16")]
    pub name: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct GiftMessage {
    #[prost(message, optional, tag = "1")]
    pub common: Option<Common>,
    #[prost(uint64, tag = "2")]
    pub gift_id: u64,
    #[prost(uint64, tag = "5")]
    pub repeat_count: u64,
    #[prost(uint64, tag = "6")]
    pub combo_count: u64,
    #[prost(message, optional, tag = "7")]
    pub user: Option<User>,
    #[prost(message, optional, tag = "15")]
    pub gift: Option<GiftStruct>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct LikeMessage {
    #[prost(message, optional, tag = "1")]
    pub common: Option<Common>,
    #[prost(uint64, tag = "2")]
    pub count: u64,
    #[prost(uint64, tag = "3")]
    pub total: u64,
    #[prost(message, optional, tag = "5")]
    pub user: Option<User>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct MemberMessage {
    #[prost(message, optional, tag = "1")]
    pub common: Option<Common>,
    #[prost(message, optional, tag = "2")]
    pub user: Option<User>,
    #[prost(uint64, tag = "3")]
    pub member_count: u64,
    #[prost(uint64, tag = "10")]
    pub action: u64,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct ControlMessage {
    #[prost(message, optional, tag = "1")]
    pub common: Option<Common>,
    #[prost(uint64, tag = "2")]
    pub status: u64,
}

pub fn user(id: u64, nickname: &str) -> User {
    User {
        id,
        nickname: nickname.to_owned(),
        level: 12,
        avatar_thumb: Some(Image {
            url_list: vec![format!("https://example.invalid/avatar/{id}.jpg")],
        }),
    }
}

pub fn common(msg_id: u64, create_time: i64) -> Common {
    Common {
        method: String::new(),
        msg_id,
        room_id: 7_300_000_000_000_000_001,
        create_time: create_time as u64,
    }
}

pub fn chat(msg_id: u64, nickname: &str, content: &str, create_time: i64) -> Message {
    chat_from(msg_id, user(1000 + msg_id, nickname), content, create_time)
}

pub fn chat_from(msg_id: u64, sender: User, content: &str, create_time: i64) -> Message {
    let body = ChatMessage {
        common: Some(common(msg_id, create_time)),
        user: Some(sender),
        content: content.to_owned(),
        event_time: 0,
    };
    tagged("WebcastChatMessage", msg_id, body.encode_to_vec())
}

pub fn like(msg_id: u64, count: u64, create_time: i64) -> Message {
    let body = LikeMessage {
        common: Some(common(msg_id, create_time)),
        count,
        total: 1000,
        user: Some(user(2000 + msg_id, "liker")),
    };
    tagged("WebcastLikeMessage", msg_id, body.encode_to_vec())
}

pub fn gift(msg_id: u64, name: &str, repeat_count: u64, create_time: i64) -> Message {
    let body = GiftMessage {
        common: Some(common(msg_id, create_time)),
        gift_id: 463,
        repeat_count,
        combo_count: repeat_count,
        user: Some(user(3000 + msg_id, "patron")),
        gift: Some(GiftStruct {
            id: 463,
            diamond_count: 1,
            name: name.to_owned(),
        }),
    };
    tagged("WebcastGiftMessage", msg_id, body.encode_to_vec())
}

pub fn member(msg_id: u64, action: u64, create_time: i64) -> Message {
    let body = MemberMessage {
        common: Some(common(msg_id, create_time)),
        user: Some(user(4000 + msg_id, "visitor")),
        member_count: 321,
        action,
    };
    tagged("WebcastMemberMessage", msg_id, body.encode_to_vec())
}

pub fn control(msg_id: u64, status: u64, create_time: i64) -> Message {
    let body = ControlMessage {
        common: Some(common(msg_id, create_time)),
        status,
    };
    tagged("WebcastControlMessage", msg_id, body.encode_to_vec())
}

pub fn tagged(method: &str, msg_id: u64, payload: Vec<u8>) -> Message {
    Message {
        method: method.to_owned(),
        payload,
        msg_id,
    }
}

pub fn response(messages: Vec<Message>) -> Vec<u8> {
    Response {
        messages,
        cursor: "t-1700000000000_r-1".to_owned(),
        fetch_interval: 1000,
        now: T0 as u64,
        internal_ext: String::new(),
    }
    .encode_to_vec()
}

pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Envelope around a gzip-compressed batch, as sent by the live server.
pub fn gzip_envelope(messages: Vec<Message>) -> Bytes {
    let frame = PushFrame {
        seq_id: 1,
        log_id: 42,
        service: 88,
        method: 8,
        headers: vec![HeaderEntry {
            key: "compress_type".to_owned(),
            value: "gzip".to_owned(),
        }],
        payload_encoding: "gzip".to_owned(),
        payload_type: "msg".to_owned(),
        payload: gzip(&response(messages)),
    };
    Bytes::from(frame.encode_to_vec())
}

pub fn plain_envelope(messages: Vec<Message>) -> Bytes {
    let frame = PushFrame {
        seq_id: 2,
        payload_type: "msg".to_owned(),
        payload: response(messages),
        ..PushFrame::default()
    };
    Bytes::from(frame.encode_to_vec())
}

pub fn decoder_at(start: i64) -> (FrameDecoder, Arc<ManualClock>) {
    decoder_with(DecoderConfig::default(), start)
}

pub fn decoder_with(config: DecoderConfig, start: i64) -> (FrameDecoder, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(start));
    let decoder = FrameDecoder::with_clock(config, clock.clone());
    (decoder, clock)
}
