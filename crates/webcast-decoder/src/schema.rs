//! Static schema table for the push channel.
//!
//! Each message shape is declared once as a module holding its field-number
//! constants and a [`MessageSchema`] describing the expected wire type of
//! every field the decoder consumes. [`decode_fields`] walks a body with the
//! wire reader and rejects any known field whose wire type disagrees with the
//! table; unknown field numbers are skipped.

use bytes::Bytes;

use crate::error::{DecodeError, Result};
use crate::wire::{Field, FieldValue, WireReader, WireType};

/// Description of one field of a message shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub number: u32,
    pub name: &'static str,
    pub wire: WireType,
    pub repeated: bool,
}

/// Description of one message shape.
#[derive(Debug)]
pub struct MessageSchema {
    pub name: &'static str,
    pub fields: &'static [FieldSpec],
}

impl MessageSchema {
    pub fn field(&self, number: u32) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.number == number)
    }
}

macro_rules! message_schema {
    (@repeated) => { false };
    (@repeated repeated) => { true };
    (
        $(#[$meta:meta])*
        pub mod $module:ident = $name:literal {
            $($field:ident = $number:literal : $wire:ident $($repeated:ident)?;)*
        }
    ) => {
        $(#[$meta])*
        pub mod $module {
            use super::{FieldSpec, MessageSchema, WireType};

            $(pub const $field: u32 = $number;)*

            pub static SCHEMA: MessageSchema = MessageSchema {
                name: $name,
                fields: &[$(FieldSpec {
                    number: $number,
                    name: stringify!($field),
                    wire: WireType::$wire,
                    repeated: message_schema!(@repeated $($repeated)?),
                },)*],
            };
        }
    };
}

message_schema! {
    /// Outermost push envelope.
    pub mod push_frame = "PushFrame" {
        SEQ_ID = 1: Varint;
        LOG_ID = 2: Varint;
        SERVICE = 3: Varint;
        METHOD = 4: Varint;
        HEADERS = 5: LengthDelimited repeated;
        PAYLOAD_ENCODING = 6: LengthDelimited;
        PAYLOAD_TYPE = 7: LengthDelimited;
        PAYLOAD = 8: LengthDelimited;
    }
}

message_schema! {
    /// Key/value header attached to an envelope.
    pub mod header_entry = "HeaderEntry" {
        KEY = 1: LengthDelimited;
        VALUE = 2: LengthDelimited;
    }
}

message_schema! {
    /// Batch of inner messages carried in an envelope payload.
    pub mod response = "Response" {
        MESSAGES = 1: LengthDelimited repeated;
        CURSOR = 2: LengthDelimited;
        FETCH_INTERVAL = 3: Varint;
        NOW = 4: Varint;
        INTERNAL_EXT = 5: LengthDelimited;
        FETCH_TYPE = 6: Varint;
        HEARTBEAT_DURATION = 8: Varint;
        NEED_ACK = 9: Varint;
        PUSH_SERVER = 10: LengthDelimited;
    }
}

message_schema! {
    /// One method-tagged payload within a response.
    pub mod message = "Message" {
        METHOD = 1: LengthDelimited;
        PAYLOAD = 2: LengthDelimited;
        MSG_ID = 3: Varint;
        MSG_TYPE = 4: Varint;
        OFFSET = 5: Varint;
    }
}

message_schema! {
    /// Metadata block shared by every payload kind.
    pub mod common = "Common" {
        METHOD = 1: LengthDelimited;
        MSG_ID = 2: Varint;
        ROOM_ID = 3: Varint;
        CREATE_TIME = 4: Varint;
    }
}

message_schema! {
    pub mod user = "User" {
        ID = 1: Varint;
        SHORT_ID = 2: Varint;
        NICKNAME = 3: LengthDelimited;
        GENDER = 4: Varint;
        SIGNATURE = 5: LengthDelimited;
        LEVEL = 6: Varint;
        AVATAR_THUMB = 9: LengthDelimited;
    }
}

message_schema! {
    pub mod image = "Image" {
        URL_LIST = 1: LengthDelimited repeated;
        URI = 2: LengthDelimited;
    }
}

message_schema! {
    pub mod chat = "ChatMessage" {
        COMMON = 1: LengthDelimited;
        USER = 2: LengthDelimited;
        CONTENT = 3: LengthDelimited;
        VISIBLE_TO_SENDER = 4: Varint;
        EVENT_TIME = 15: Varint;
    }
}

message_schema! {
    /// Gift definition embedded in a gift message.
    pub mod gift_struct = "GiftStruct" {
        IMAGE = 1: LengthDelimited;
        DESCRIBE = 2: LengthDelimited;
        DURATION = 4: Varint;
        ID = 5: Varint;
        COMBO = 10: Varint;
        TYPE = 11: Varint;
        DIAMOND_COUNT = 12: Varint;
        NAME = 16: LengthDelimited;
    }
}

message_schema! {
    pub mod gift = "GiftMessage" {
        COMMON = 1: LengthDelimited;
        GIFT_ID = 2: Varint;
        FAN_TICKET_COUNT = 3: Varint;
        GROUP_COUNT = 4: Varint;
        REPEAT_COUNT = 5: Varint;
        COMBO_COUNT = 6: Varint;
        USER = 7: LengthDelimited;
        TO_USER = 8: LengthDelimited;
        REPEAT_END = 9: Varint;
        GIFT = 15: LengthDelimited;
    }
}

message_schema! {
    pub mod like = "LikeMessage" {
        COMMON = 1: LengthDelimited;
        COUNT = 2: Varint;
        TOTAL = 3: Varint;
        COLOR = 4: Varint;
        USER = 5: LengthDelimited;
    }
}

message_schema! {
    pub mod member = "MemberMessage" {
        COMMON = 1: LengthDelimited;
        USER = 2: LengthDelimited;
        MEMBER_COUNT = 3: Varint;
        OPERATOR = 4: LengthDelimited;
        ACTION = 10: Varint;
        ACTION_DESCRIPTION = 11: LengthDelimited;
    }
}

message_schema! {
    pub mod social = "SocialMessage" {
        COMMON = 1: LengthDelimited;
        USER = 2: LengthDelimited;
        SHARE_TYPE = 3: Varint;
        ACTION = 4: Varint;
        SHARE_TARGET = 5: LengthDelimited;
        FOLLOW_COUNT = 6: Varint;
    }
}

message_schema! {
    /// Online-viewer statistics.
    pub mod room_user_seq = "RoomUserSeqMessage" {
        COMMON = 1: LengthDelimited;
        RANKS = 2: LengthDelimited repeated;
        TOTAL = 3: Varint;
        POP_STR = 4: LengthDelimited;
        POPULARITY = 6: Varint;
        TOTAL_USER = 7: Varint;
        TOTAL_USER_STR = 8: LengthDelimited;
        TOTAL_STR = 9: LengthDelimited;
    }
}

message_schema! {
    pub mod control = "ControlMessage" {
        COMMON = 1: LengthDelimited;
        STATUS = 2: Varint;
    }
}

message_schema! {
    pub mod fansclub = "FansclubMessage" {
        COMMON = 1: LengthDelimited;
        TYPE = 2: Varint;
        CONTENT = 3: LengthDelimited;
        USER = 4: LengthDelimited;
    }
}

message_schema! {
    pub mod room_rank = "RoomRankMessage" {
        COMMON = 1: LengthDelimited;
        RANKS = 2: LengthDelimited repeated;
    }
}

message_schema! {
    pub mod rank_entry = "RoomRank" {
        USER = 1: LengthDelimited;
        SCORE_STR = 2: LengthDelimited;
        PROFILE_HIDDEN = 3: Varint;
    }
}

message_schema! {
    pub mod room = "RoomMessage" {
        COMMON = 1: LengthDelimited;
        CONTENT = 2: LengthDelimited;
        ROOM_MESSAGE_TYPE = 4: Varint;
    }
}

message_schema! {
    pub mod emoji_chat = "EmojiChatMessage" {
        COMMON = 1: LengthDelimited;
        USER = 2: LengthDelimited;
        EMOJI_ID = 3: Varint;
        EMOJI_CONTENT = 4: LengthDelimited;
        DEFAULT_CONTENT = 5: LengthDelimited;
    }
}

/// Every schema in the table, envelope first.
pub fn all() -> [&'static MessageSchema; 20] {
    [
        &push_frame::SCHEMA,
        &header_entry::SCHEMA,
        &response::SCHEMA,
        &message::SCHEMA,
        &common::SCHEMA,
        &user::SCHEMA,
        &image::SCHEMA,
        &chat::SCHEMA,
        &gift_struct::SCHEMA,
        &gift::SCHEMA,
        &like::SCHEMA,
        &member::SCHEMA,
        &social::SCHEMA,
        &room_user_seq::SCHEMA,
        &control::SCHEMA,
        &fansclub::SCHEMA,
        &room_rank::SCHEMA,
        &rank_entry::SCHEMA,
        &room::SCHEMA,
        &emoji_chat::SCHEMA,
    ]
}

/// Known fields of one decoded message body.
#[derive(Debug)]
pub struct Fields<'a> {
    schema: &'static MessageSchema,
    entries: Vec<Field<'a>>,
}

/// Decode `data` against `schema`.
///
/// Fails on any wire-level error and on a wire-type mismatch for a field the
/// schema knows. Unknown fields are skipped.
pub fn decode_fields<'a>(schema: &'static MessageSchema, data: &'a [u8]) -> Result<Fields<'a>> {
    let mut reader = WireReader::new(data);
    let mut entries = Vec::new();

    while let Some(field) = reader.next_field()? {
        let Some(spec) = schema.field(field.number) else {
            continue;
        };
        if spec.wire != field.value.wire_type() {
            return Err(DecodeError::mismatch(
                schema.name,
                format!(
                    "field {} ({}) expected wire type {}, got {}",
                    spec.number,
                    spec.name,
                    spec.wire.as_u8(),
                    field.value.wire_type().as_u8()
                ),
            ));
        }
        entries.push(field);
    }

    Ok(Fields { schema, entries })
}

impl<'a> Fields<'a> {
    pub fn schema(&self) -> &'static MessageSchema {
        self.schema
    }

    pub fn has(&self, number: u32) -> bool {
        self.entries.iter().any(|f| f.number == number)
    }

    fn last(&self, number: u32) -> Option<FieldValue<'a>> {
        self.entries
            .iter()
            .rev()
            .find(|f| f.number == number)
            .map(|f| f.value)
    }

    /// Last varint value for `number`, or zero when absent.
    pub fn varint(&self, number: u32) -> u64 {
        match self.last(number) {
            Some(FieldValue::Varint(v)) => v,
            _ => 0,
        }
    }

    pub fn bool(&self, number: u32) -> bool {
        self.varint(number) != 0
    }

    pub fn bytes(&self, number: u32) -> Option<&'a [u8]> {
        match self.last(number) {
            Some(FieldValue::Bytes(b)) => Some(b),
            _ => None,
        }
    }

    /// All occurrences of a repeated length-delimited field, in wire order.
    pub fn repeated_bytes(&self, number: u32) -> impl Iterator<Item = &'a [u8]> + '_ {
        self.entries
            .iter()
            .filter(move |f| f.number == number)
            .filter_map(|f| match f.value {
                FieldValue::Bytes(b) => Some(b),
                _ => None,
            })
    }

    /// UTF-8 string field; empty when absent. Invalid UTF-8 is a schema mismatch.
    pub fn string(&self, number: u32) -> Result<&'a str> {
        match self.bytes(number) {
            None => Ok(""),
            Some(raw) => std::str::from_utf8(raw).map_err(|e| {
                DecodeError::mismatch(self.schema.name, format!("field {number}: {e}"))
            }),
        }
    }

    /// Decode an embedded message field, if present.
    pub fn message(
        &self,
        number: u32,
        schema: &'static MessageSchema,
    ) -> Result<Option<Fields<'a>>> {
        self.bytes(number)
            .map(|raw| decode_fields(schema, raw))
            .transpose()
    }
}

/// Payload compression announced by an envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PayloadEncoding {
    #[default]
    None,
    Gzip,
}

/// Decoded push envelope.
#[derive(Debug, Clone)]
pub struct Envelope {
    pub sequence_id: u64,
    pub log_id: u64,
    pub service_id: u64,
    pub method_id: u64,
    pub headers: Vec<(String, String)>,
    pub payload_encoding: PayloadEncoding,
    pub payload_type: String,
    pub payload: Bytes,
}

impl Envelope {
    /// Parse `frame` as an envelope. The payload must be present and non-empty.
    pub fn parse(frame: &Bytes) -> Result<Self> {
        let fields = decode_fields(&push_frame::SCHEMA, frame)?;

        let payload = fields
            .bytes(push_frame::PAYLOAD)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| DecodeError::mismatch(push_frame::SCHEMA.name, "payload missing"))?;

        let headers = fields
            .repeated_bytes(push_frame::HEADERS)
            .map(|raw| {
                let entry = decode_fields(&header_entry::SCHEMA, raw)?;
                Ok((
                    entry.string(header_entry::KEY)?.to_owned(),
                    entry.string(header_entry::VALUE)?.to_owned(),
                ))
            })
            .collect::<Result<Vec<_>>>()?;

        let declared = fields.string(push_frame::PAYLOAD_ENCODING)?;
        let payload_encoding = resolve_encoding(declared, &headers, payload);

        Ok(Self {
            sequence_id: fields.varint(push_frame::SEQ_ID),
            log_id: fields.varint(push_frame::LOG_ID),
            service_id: fields.varint(push_frame::SERVICE),
            method_id: fields.varint(push_frame::METHOD),
            payload_encoding,
            payload_type: fields.string(push_frame::PAYLOAD_TYPE)?.to_owned(),
            headers,
            payload: frame.slice_ref(payload),
        })
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Declared encoding wins, then the `compress_type` header, then the gzip magic.
fn resolve_encoding(declared: &str, headers: &[(String, String)], payload: &[u8]) -> PayloadEncoding {
    let hint = if !declared.is_empty() {
        declared
    } else if let Some((_, v)) = headers.iter().find(|(k, _)| k == "compress_type") {
        v.as_str()
    } else if crate::transcode::has_gzip_magic(payload) {
        return PayloadEncoding::Gzip;
    } else {
        return PayloadEncoding::None;
    };

    if hint.eq_ignore_ascii_case("gzip") {
        PayloadEncoding::Gzip
    } else {
        PayloadEncoding::None
    }
}

/// One method-tagged payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InnerMessage {
    pub method: String,
    pub payload: Bytes,
    pub msg_id: u64,
}

impl InnerMessage {
    pub fn new(method: impl Into<String>, payload: Bytes) -> Self {
        Self {
            method: method.into(),
            payload,
            msg_id: 0,
        }
    }
}

/// Decoded response batch.
#[derive(Debug, Clone, Default)]
pub struct ResponseBatch {
    pub cursor: String,
    pub fetch_interval_ms: u64,
    pub now: u64,
    pub internal_ext: String,
    pub need_ack: bool,
    pub messages: Vec<InnerMessage>,
}

impl ResponseBatch {
    /// Parse `buf` as a response. Entries without a method or payload are skipped.
    pub fn parse(buf: &Bytes) -> Result<Self> {
        let fields = decode_fields(&response::SCHEMA, buf)?;

        let mut messages = Vec::new();
        for raw in fields.repeated_bytes(response::MESSAGES) {
            let entry = decode_fields(&message::SCHEMA, raw)?;
            let method = entry.string(message::METHOD)?;
            let payload = entry.bytes(message::PAYLOAD).unwrap_or_default();
            if method.is_empty() || payload.is_empty() {
                continue;
            }
            messages.push(InnerMessage {
                method: method.to_owned(),
                payload: buf.slice_ref(payload),
                msg_id: entry.varint(message::MSG_ID),
            });
        }

        Ok(Self {
            cursor: fields.string(response::CURSOR)?.to_owned(),
            fetch_interval_ms: fields.varint(response::FETCH_INTERVAL),
            now: fields.varint(response::NOW),
            internal_ext: fields.string(response::INTERNAL_EXT)?.to_owned(),
            need_ack: fields.bool(response::NEED_ACK),
            messages,
        })
    }
}

/// Shared per-message metadata.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Common {
    pub msg_id: u64,
    pub room_id: u64,
    pub create_time: u64,
}

impl Common {
    pub fn from_fields(fields: &Fields<'_>) -> Self {
        Self {
            msg_id: fields.varint(common::MSG_ID),
            room_id: fields.varint(common::ROOM_ID),
            create_time: fields.varint(common::CREATE_TIME),
        }
    }
}

/// Sender profile embedded in user-bearing payloads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserInfo {
    pub id: u64,
    pub nickname: String,
    pub level: u64,
    pub avatar_url: Option<String>,
}

impl UserInfo {
    pub fn from_fields(fields: &Fields<'_>) -> Result<Self> {
        let avatar_url = match fields.message(user::AVATAR_THUMB, &image::SCHEMA)? {
            Some(image) => image
                .repeated_bytes(image::URL_LIST)
                .next()
                .map(|raw| String::from_utf8_lossy(raw).into_owned()),
            None => None,
        };

        Ok(Self {
            id: fields.varint(user::ID),
            nickname: fields.string(user::NICKNAME)?.trim().to_owned(),
            level: fields.varint(user::LEVEL),
            avatar_url,
        })
    }
}
