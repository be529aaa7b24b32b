//! Per-kind message normalizers.
//!
//! Each inner message kind has one normalizer that decodes the payload against
//! its schema, enforces the kind's required fields and produces an [`Event`].
//! Dispatch goes through [`MessageKind`], so adding a kind without a
//! normalizer does not compile.

use crate::error::{DecodeError, Result};
use crate::event::{
    ControlStatus, Event, EventDetail, EventKind, EventUser, FansclubAction, GiftDetail,
    MemberAction, RankedUser, SocialAction,
};
use crate::schema::{
    self, Common, Fields, MessageSchema, UserInfo, chat, control, decode_fields, emoji_chat,
    fansclub, gift, gift_struct, like, member, rank_entry, room, room_rank, room_user_seq, social,
};
use crate::text::{is_valid_chat_content, is_valid_text};

/// Lower bound (exclusive) of a plausible epoch-millisecond timestamp.
pub const MIN_PLAUSIBLE_MILLIS: u64 = 1_000_000_000_000;
/// Upper bound (exclusive) of a plausible epoch-millisecond timestamp.
pub const MAX_PLAUSIBLE_MILLIS: u64 = 9_999_999_999_999;

/// Inner message kinds with a normalizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    Chat,
    Gift,
    Like,
    Member,
    Social,
    RoomUserSeq,
    Control,
    Fansclub,
    RoomRank,
    Room,
    EmojiChat,
}

impl MessageKind {
    /// Kinds tried, in order, against payloads of unknown kind.
    ///
    /// Kinds without a user or free text (statistics, control, rank) are left
    /// out: almost any short byte run satisfies their schemas.
    pub const PROBE_ORDER: [MessageKind; 7] = [
        Self::Chat,
        Self::Gift,
        Self::Like,
        Self::Member,
        Self::Social,
        Self::EmojiChat,
        Self::Room,
    ];

    pub fn from_method(method: &str) -> Option<Self> {
        let kind = match method {
            "WebcastChatMessage" => Self::Chat,
            "WebcastGiftMessage" => Self::Gift,
            "WebcastLikeMessage" => Self::Like,
            "WebcastMemberMessage" => Self::Member,
            "WebcastSocialMessage" => Self::Social,
            "WebcastRoomUserSeqMessage" => Self::RoomUserSeq,
            "WebcastControlMessage" => Self::Control,
            "WebcastFansclubMessage" => Self::Fansclub,
            "WebcastRoomRankMessage" => Self::RoomRank,
            "WebcastRoomMessage" => Self::Room,
            "WebcastEmojiChatMessage" => Self::EmojiChat,
            _ => return None,
        };
        Some(kind)
    }

    pub const fn method(self) -> &'static str {
        match self {
            Self::Chat => "WebcastChatMessage",
            Self::Gift => "WebcastGiftMessage",
            Self::Like => "WebcastLikeMessage",
            Self::Member => "WebcastMemberMessage",
            Self::Social => "WebcastSocialMessage",
            Self::RoomUserSeq => "WebcastRoomUserSeqMessage",
            Self::Control => "WebcastControlMessage",
            Self::Fansclub => "WebcastFansclubMessage",
            Self::RoomRank => "WebcastRoomRankMessage",
            Self::Room => "WebcastRoomMessage",
            Self::EmojiChat => "WebcastEmojiChatMessage",
        }
    }

    pub const fn event_kind(self) -> EventKind {
        match self {
            Self::Chat => EventKind::Chat,
            Self::Gift => EventKind::Gift,
            Self::Like => EventKind::Like,
            Self::Member => EventKind::Member,
            Self::Social => EventKind::Social,
            Self::RoomUserSeq => EventKind::RoomStats,
            Self::Control => EventKind::Control,
            Self::Fansclub => EventKind::Fansclub,
            Self::RoomRank => EventKind::RoomRank,
            Self::Room => EventKind::Room,
            Self::EmojiChat => EventKind::EmojiChat,
        }
    }

    pub fn schema(self) -> &'static MessageSchema {
        match self {
            Self::Chat => &chat::SCHEMA,
            Self::Gift => &gift::SCHEMA,
            Self::Like => &like::SCHEMA,
            Self::Member => &member::SCHEMA,
            Self::Social => &social::SCHEMA,
            Self::RoomUserSeq => &room_user_seq::SCHEMA,
            Self::Control => &control::SCHEMA,
            Self::Fansclub => &fansclub::SCHEMA,
            Self::RoomRank => &room_rank::SCHEMA,
            Self::Room => &room::SCHEMA,
            Self::EmojiChat => &emoji_chat::SCHEMA,
        }
    }
}

/// Normalize one payload of a known kind.
///
/// `now_ms` replaces missing or implausible source timestamps.
pub fn normalize(kind: MessageKind, payload: &[u8], now_ms: i64) -> Result<Event> {
    let fields = decode_fields(kind.schema(), payload)?;
    match kind {
        MessageKind::Chat => normalize_chat(&fields, now_ms),
        MessageKind::Gift => normalize_gift(&fields, now_ms),
        MessageKind::Like => normalize_like(&fields, now_ms),
        MessageKind::Member => normalize_member(&fields, now_ms),
        MessageKind::Social => normalize_social(&fields, now_ms),
        MessageKind::RoomUserSeq => normalize_room_stats(&fields, now_ms),
        MessageKind::Control => normalize_control(&fields, now_ms),
        MessageKind::Fansclub => normalize_fansclub(&fields, now_ms),
        MessageKind::RoomRank => normalize_room_rank(&fields, now_ms),
        MessageKind::Room => normalize_room(&fields, now_ms),
        MessageKind::EmojiChat => normalize_emoji_chat(&fields, now_ms),
    }
}

/// Try every kind in [`MessageKind::PROBE_ORDER`]; the first that passes its
/// own required-field checks wins.
pub fn probe(payload: &[u8], now_ms: i64) -> Option<(MessageKind, Event)> {
    MessageKind::PROBE_ORDER
        .into_iter()
        .find_map(|kind| normalize(kind, payload, now_ms).ok().map(|e| (kind, e)))
}

pub(crate) fn plausible_millis(raw: u64) -> Option<i64> {
    (raw > MIN_PLAUSIBLE_MILLIS && raw < MAX_PLAUSIBLE_MILLIS).then_some(raw as i64)
}

fn id_string(id: u64) -> String {
    if id == 0 { String::new() } else { id.to_string() }
}

fn common_of(fields: &Fields<'_>, number: u32) -> Result<Common> {
    Ok(fields
        .message(number, &schema::common::SCHEMA)?
        .map(|c| Common::from_fields(&c))
        .unwrap_or_default())
}

fn optional_user(fields: &Fields<'_>, number: u32) -> Result<Option<EventUser>> {
    let Some(user) = fields.message(number, &schema::user::SCHEMA)? else {
        return Ok(None);
    };
    let info = UserInfo::from_fields(&user)?;
    if info.nickname.is_empty() {
        return Ok(None);
    }
    Ok(Some(EventUser {
        id: id_string(info.id),
        nickname: info.nickname,
        level: info.level,
        avatar_url: info.avatar_url,
    }))
}

fn required_user(fields: &Fields<'_>, number: u32, kind: EventKind) -> Result<EventUser> {
    optional_user(fields, number)?.ok_or_else(|| DecodeError::missing(kind.as_str(), "nickname"))
}

/// Event skeleton carrying the shared metadata.
fn base_event(kind: EventKind, content: impl Into<String>, common: Common, now_ms: i64) -> Event {
    let timestamp = plausible_millis(common.create_time).unwrap_or(now_ms);
    Event::new(kind, content, timestamp).with_ids(id_string(common.room_id), id_string(common.msg_id))
}

fn normalize_chat(fields: &Fields<'_>, now_ms: i64) -> Result<Event> {
    let kind = EventKind::Chat;
    let user = required_user(fields, chat::USER, kind)?;
    let content = fields.string(chat::CONTENT)?.trim();
    if !is_valid_chat_content(content) {
        return Err(DecodeError::missing(kind.as_str(), "content"));
    }

    let common = common_of(fields, chat::COMMON)?;
    let mut event = base_event(kind, content, common, now_ms).with_user(user);
    if plausible_millis(common.create_time).is_none() {
        // eventTime is in seconds.
        let event_time = fields.varint(chat::EVENT_TIME).saturating_mul(1000);
        if let Some(ts) = plausible_millis(event_time) {
            event.timestamp = ts;
        }
    }
    Ok(event)
}

fn normalize_gift(fields: &Fields<'_>, now_ms: i64) -> Result<Event> {
    let kind = EventKind::Gift;
    let user = required_user(fields, gift::USER, kind)?;
    let count = fields.varint(gift::REPEAT_COUNT);
    if count == 0 {
        return Err(DecodeError::missing(kind.as_str(), "repeat_count"));
    }

    let definition = fields.message(gift::GIFT, &gift_struct::SCHEMA)?;
    let (name, struct_id, diamond_count) = match &definition {
        Some(g) => (
            g.string(gift_struct::NAME)?.trim(),
            g.varint(gift_struct::ID),
            g.varint(gift_struct::DIAMOND_COUNT),
        ),
        None => ("", 0, 0),
    };
    let name = if name.is_empty() { "gift" } else { name };
    let gift_id = match fields.varint(gift::GIFT_ID) {
        0 => struct_id,
        id => id,
    };

    let detail = GiftDetail {
        id: id_string(gift_id),
        name: name.to_owned(),
        count,
        combo_count: fields.varint(gift::COMBO_COUNT).max(1),
        diamond_count,
    };
    let common = common_of(fields, gift::COMMON)?;
    Ok(base_event(kind, format!("sent {name} x{count}"), common, now_ms)
        .with_user(user)
        .with_detail(EventDetail::Gift(detail)))
}

fn normalize_like(fields: &Fields<'_>, now_ms: i64) -> Result<Event> {
    let kind = EventKind::Like;
    let user = required_user(fields, like::USER, kind)?;
    let count = fields.varint(like::COUNT);
    if count == 0 {
        return Err(DecodeError::missing(kind.as_str(), "count"));
    }

    let common = common_of(fields, like::COMMON)?;
    Ok(base_event(kind, format!("liked the room +{count}"), common, now_ms)
        .with_user(user)
        .with_detail(EventDetail::Like {
            count,
            total: fields.varint(like::TOTAL),
        }))
}

fn normalize_member(fields: &Fields<'_>, now_ms: i64) -> Result<Event> {
    let kind = EventKind::Member;
    let user = required_user(fields, member::USER, kind)?;
    let action = MemberAction::from_code(fields.varint(member::ACTION))
        .ok_or_else(|| DecodeError::missing(kind.as_str(), "action"))?;

    let common = common_of(fields, member::COMMON)?;
    Ok(base_event(kind, action.content(), common, now_ms)
        .with_user(user)
        .with_detail(EventDetail::Member {
            action,
            member_count: fields.varint(member::MEMBER_COUNT),
        }))
}

fn normalize_social(fields: &Fields<'_>, now_ms: i64) -> Result<Event> {
    let kind = EventKind::Social;
    let user = required_user(fields, social::USER, kind)?;
    let action = SocialAction::from_code(fields.varint(social::ACTION))
        .ok_or_else(|| DecodeError::missing(kind.as_str(), "action"))?;

    let common = common_of(fields, social::COMMON)?;
    Ok(base_event(kind, action.content(), common, now_ms)
        .with_user(user)
        .with_detail(EventDetail::Social {
            action,
            share_type: fields.varint(social::SHARE_TYPE),
            follow_count: fields.varint(social::FOLLOW_COUNT),
        }))
}

fn normalize_room_stats(fields: &Fields<'_>, now_ms: i64) -> Result<Event> {
    let total_user = fields.varint(room_user_seq::TOTAL_USER);
    let display = match fields.string(room_user_seq::TOTAL_USER_STR)?.trim() {
        "" => total_user.to_string(),
        s => s.to_owned(),
    };

    let common = common_of(fields, room_user_seq::COMMON)?;
    Ok(base_event(
        EventKind::RoomStats,
        format!("online viewers: {display}"),
        common,
        now_ms,
    )
    .with_detail(EventDetail::RoomStats {
        total: fields.varint(room_user_seq::TOTAL),
        total_user,
        popularity: fields.varint(room_user_seq::POPULARITY),
        display,
    }))
}

fn normalize_control(fields: &Fields<'_>, now_ms: i64) -> Result<Event> {
    let kind = EventKind::Control;
    let status = ControlStatus::from_code(fields.varint(control::STATUS))
        .ok_or_else(|| DecodeError::missing(kind.as_str(), "status"))?;

    let common = common_of(fields, control::COMMON)?;
    Ok(base_event(kind, status.content(), common, now_ms)
        .with_detail(EventDetail::Control { status }))
}

fn normalize_fansclub(fields: &Fields<'_>, now_ms: i64) -> Result<Event> {
    let kind = EventKind::Fansclub;
    let user = required_user(fields, fansclub::USER, kind)?;
    let action = FansclubAction::from_code(fields.varint(fansclub::TYPE))
        .ok_or_else(|| DecodeError::missing(kind.as_str(), "type"))?;

    let text = fields.string(fansclub::CONTENT)?.trim();
    let content = if is_valid_text(text) {
        text
    } else {
        action.content()
    };

    let common = common_of(fields, fansclub::COMMON)?;
    Ok(base_event(kind, content, common, now_ms)
        .with_user(user)
        .with_detail(EventDetail::Fansclub { action }))
}

fn normalize_room_rank(fields: &Fields<'_>, now_ms: i64) -> Result<Event> {
    let mut ranks = Vec::new();
    for raw in fields.repeated_bytes(room_rank::RANKS) {
        let entry = decode_fields(&rank_entry::SCHEMA, raw)?;
        if let Some(user) = optional_user(&entry, rank_entry::USER)? {
            ranks.push(RankedUser {
                user,
                score: entry.string(rank_entry::SCORE_STR)?.to_owned(),
            });
        }
    }

    let common = common_of(fields, room_rank::COMMON)?;
    Ok(base_event(
        EventKind::RoomRank,
        format!("rank updated, {} users", ranks.len()),
        common,
        now_ms,
    )
    .with_detail(EventDetail::RoomRank { ranks }))
}

fn normalize_room(fields: &Fields<'_>, now_ms: i64) -> Result<Event> {
    let kind = EventKind::Room;
    let content = fields.string(room::CONTENT)?.trim();
    if !is_valid_text(content) {
        return Err(DecodeError::missing(kind.as_str(), "content"));
    }

    let common = common_of(fields, room::COMMON)?;
    Ok(base_event(kind, content, common, now_ms))
}

fn normalize_emoji_chat(fields: &Fields<'_>, now_ms: i64) -> Result<Event> {
    let kind = EventKind::EmojiChat;
    let user = required_user(fields, emoji_chat::USER, kind)?;
    let content = fields.string(emoji_chat::DEFAULT_CONTENT)?.trim();
    if !is_valid_text(content) {
        return Err(DecodeError::missing(kind.as_str(), "default_content"));
    }

    let common = common_of(fields, emoji_chat::COMMON)?;
    Ok(base_event(kind, content, common, now_ms)
        .with_user(user)
        .with_detail(EventDetail::EmojiChat {
            emoji_id: id_string(fields.varint(emoji_chat::EMOJI_ID)),
        }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{common, user};
    use crate::wire::encode_varint;

    const NOW: i64 = 1_700_000_000_000;

    fn key(number: u32, wire: u8, out: &mut Vec<u8>) {
        encode_varint(u64::from((number << 3) | u32::from(wire)), out);
    }

    fn ld(out: &mut Vec<u8>, number: u32, body: &[u8]) {
        key(number, 2, out);
        encode_varint(body.len() as u64, out);
        out.extend_from_slice(body);
    }

    fn vi(out: &mut Vec<u8>, number: u32, value: u64) {
        key(number, 0, out);
        encode_varint(value, out);
    }

    fn user_body(id: u64, nickname: &str) -> Vec<u8> {
        let mut out = Vec::new();
        vi(&mut out, user::ID, id);
        ld(&mut out, user::NICKNAME, nickname.as_bytes());
        vi(&mut out, user::LEVEL, 3);
        out
    }

    fn common_body(msg_id: u64, room_id: u64, create_time: u64) -> Vec<u8> {
        let mut out = Vec::new();
        vi(&mut out, common::MSG_ID, msg_id);
        vi(&mut out, common::ROOM_ID, room_id);
        vi(&mut out, common::CREATE_TIME, create_time);
        out
    }

    fn chat_payload(nickname: &str, content: &str, create_time: u64) -> Vec<u8> {
        let mut out = Vec::new();
        ld(&mut out, chat::COMMON, &common_body(11, 22, create_time));
        ld(&mut out, chat::USER, &user_body(7, nickname));
        ld(&mut out, chat::CONTENT, content.as_bytes());
        out
    }

    fn like_payload(count: u64) -> Vec<u8> {
        let mut out = Vec::new();
        ld(&mut out, like::COMMON, &common_body(1, 2, 1_700_000_000_500));
        vi(&mut out, like::COUNT, count);
        vi(&mut out, like::TOTAL, 99);
        ld(&mut out, like::USER, &user_body(8, "liker"));
        out
    }

    #[test]
    fn test_method_tags_round_trip() {
        for kind in MessageKind::PROBE_ORDER {
            assert_eq!(MessageKind::from_method(kind.method()), Some(kind));
        }
        assert_eq!(MessageKind::from_method("WebcastRoomUserSeqMessage"), Some(MessageKind::RoomUserSeq));
        assert_eq!(MessageKind::from_method("WebcastUnknownMessage"), None);
        assert_eq!(MessageKind::RoomUserSeq.event_kind(), EventKind::RoomStats);
    }

    #[test]
    fn test_chat_normalized() {
        let payload = chat_payload(" alice ", "  你好123 ", 1_700_000_000_123);
        let event = normalize(MessageKind::Chat, &payload, NOW).unwrap();

        assert_eq!(event.kind, EventKind::Chat);
        assert_eq!(event.content, "你好123");
        assert_eq!(event.display_name(), "alice");
        assert_eq!(event.user_id(), "7");
        assert_eq!(event.timestamp, 1_700_000_000_123);
        assert_eq!(event.room_id, "22");
        assert_eq!(event.msg_id, "11");
    }

    #[test]
    fn test_chat_requires_nickname_and_valid_content() {
        let no_nick = chat_payload("", "hello", 0);
        assert_eq!(
            normalize(MessageKind::Chat, &no_nick, NOW),
            Err(DecodeError::missing("chat", "nickname"))
        );

        let garbage = chat_payload("bob", "\u{01}\u{02}\u{03}a", 0);
        assert_eq!(
            normalize(MessageKind::Chat, &garbage, NOW),
            Err(DecodeError::missing("chat", "content"))
        );
    }

    #[test]
    fn test_implausible_timestamp_uses_clock() {
        let payload = chat_payload("bob", "hi", 1_700_000_000);
        let event = normalize(MessageKind::Chat, &payload, NOW).unwrap();
        assert_eq!(event.timestamp, NOW);
    }

    #[test]
    fn test_chat_event_time_fallback() {
        let mut payload = chat_payload("bob", "hi", 0);
        vi(&mut payload, chat::EVENT_TIME, 1_690_000_000);
        let event = normalize(MessageKind::Chat, &payload, NOW).unwrap();
        assert_eq!(event.timestamp, 1_690_000_000_000);
    }

    #[test]
    fn test_like_count() {
        assert!(normalize(MessageKind::Like, &like_payload(0), NOW).is_err());

        let event = normalize(MessageKind::Like, &like_payload(1), NOW).unwrap();
        assert_eq!(event.kind, EventKind::Like);
        assert!(event.content.contains("+1"));
        assert_eq!(event.detail, EventDetail::Like { count: 1, total: 99 });
    }

    #[test]
    fn test_gift_defaults() {
        let mut definition = Vec::new();
        vi(&mut definition, gift_struct::ID, 463);
        vi(&mut definition, gift_struct::DIAMOND_COUNT, 1);
        ld(&mut definition, gift_struct::NAME, "Rose".as_bytes());

        let mut payload = Vec::new();
        vi(&mut payload, gift::REPEAT_COUNT, 5);
        ld(&mut payload, gift::USER, &user_body(9, "giver"));
        ld(&mut payload, gift::GIFT, &definition);

        let event = normalize(MessageKind::Gift, &payload, NOW).unwrap();
        assert_eq!(event.content, "sent Rose x5");
        assert_eq!(event.timestamp, NOW);
        let EventDetail::Gift(detail) = event.detail else {
            panic!("expected gift detail");
        };
        assert_eq!(detail.id, "463");
        assert_eq!(detail.count, 5);
        assert_eq!(detail.combo_count, 1);
        assert_eq!(detail.diamond_count, 1);
    }

    #[test]
    fn test_gift_requires_repeat_count() {
        let mut payload = Vec::new();
        vi(&mut payload, gift::GIFT_ID, 1);
        ld(&mut payload, gift::USER, &user_body(9, "giver"));
        assert_eq!(
            normalize(MessageKind::Gift, &payload, NOW),
            Err(DecodeError::missing("gift", "repeat_count"))
        );
    }

    #[test]
    fn test_member_and_social_actions() {
        let mut entered = Vec::new();
        ld(&mut entered, member::USER, &user_body(1, "newbie"));
        vi(&mut entered, member::ACTION, 1);
        vi(&mut entered, member::MEMBER_COUNT, 1234);
        let event = normalize(MessageKind::Member, &entered, NOW).unwrap();
        assert_eq!(event.content, "entered");

        let mut unknown = Vec::new();
        ld(&mut unknown, member::USER, &user_body(1, "newbie"));
        vi(&mut unknown, member::ACTION, 9);
        assert!(normalize(MessageKind::Member, &unknown, NOW).is_err());

        let mut shared = Vec::new();
        ld(&mut shared, social::USER, &user_body(2, "fan"));
        vi(&mut shared, social::ACTION, 2);
        let event = normalize(MessageKind::Social, &shared, NOW).unwrap();
        assert_eq!(event.content, "shared the room");

        let mut no_action = Vec::new();
        ld(&mut no_action, social::USER, &user_body(2, "fan"));
        assert!(normalize(MessageKind::Social, &no_action, NOW).is_err());
    }

    #[test]
    fn test_system_kinds_are_anonymous() {
        let mut stats = Vec::new();
        vi(&mut stats, room_user_seq::TOTAL_USER, 5321);
        vi(&mut stats, room_user_seq::POPULARITY, 10);
        let event = normalize(MessageKind::RoomUserSeq, &stats, NOW).unwrap();
        assert_eq!(event.kind, EventKind::RoomStats);
        assert_eq!(event.content, "online viewers: 5321");
        assert_eq!(event.display_name(), crate::event::ANONYMOUS);

        let mut ended = Vec::new();
        vi(&mut ended, control::STATUS, 3);
        let event = normalize(MessageKind::Control, &ended, NOW).unwrap();
        assert_eq!(event.content, "live ended");

        let mut bogus = Vec::new();
        vi(&mut bogus, control::STATUS, 42);
        assert!(normalize(MessageKind::Control, &bogus, NOW).is_err());
    }

    #[test]
    fn test_fansclub_content_fallback() {
        let mut payload = Vec::new();
        vi(&mut payload, fansclub::TYPE, 2);
        ld(&mut payload, fansclub::CONTENT, b"\x01\x02");
        ld(&mut payload, fansclub::USER, &user_body(3, "clubber"));
        let event = normalize(MessageKind::Fansclub, &payload, NOW).unwrap();
        assert_eq!(event.content, "joined the fans club");
    }

    #[test]
    fn test_room_rank_entries() {
        let mut entry = Vec::new();
        ld(&mut entry, rank_entry::USER, &user_body(5, "top"));
        ld(&mut entry, rank_entry::SCORE_STR, b"1.2w");
        let mut anonymous_entry = Vec::new();
        ld(&mut anonymous_entry, rank_entry::SCORE_STR, b"10");

        let mut payload = Vec::new();
        ld(&mut payload, room_rank::RANKS, &entry);
        ld(&mut payload, room_rank::RANKS, &anonymous_entry);

        let event = normalize(MessageKind::RoomRank, &payload, NOW).unwrap();
        assert_eq!(event.content, "rank updated, 1 users");
        let EventDetail::RoomRank { ranks } = event.detail else {
            panic!("expected rank detail");
        };
        assert_eq!(ranks[0].score, "1.2w");
        assert!(event.user.is_none());
    }

    #[test]
    fn test_room_notice_has_no_author() {
        let mut payload = Vec::new();
        ld(&mut payload, room::CONTENT, "欢迎来到直播间".as_bytes());
        let event = normalize(MessageKind::Room, &payload, NOW).unwrap();
        assert_eq!(event.kind, EventKind::Room);
        assert!(event.user.is_none());
        assert_eq!(event.display_name(), crate::event::ANONYMOUS);
    }

    #[test]
    fn test_emoji_chat_requires_default_content() {
        let mut payload = Vec::new();
        ld(&mut payload, emoji_chat::USER, &user_body(4, "emo"));
        vi(&mut payload, emoji_chat::EMOJI_ID, 77);
        assert!(normalize(MessageKind::EmojiChat, &payload, NOW).is_err());

        ld(&mut payload, emoji_chat::DEFAULT_CONTENT, "[微笑]".as_bytes());
        let event = normalize(MessageKind::EmojiChat, &payload, NOW).unwrap();
        assert_eq!(event.content, "[微笑]");
        assert_eq!(event.detail, EventDetail::EmojiChat { emoji_id: "77".into() });
    }

    #[test]
    fn test_probe_prefers_chat() {
        let payload = chat_payload("bob", "probe me", 0);
        let (kind, event) = probe(&payload, NOW).unwrap();
        assert_eq!(kind, MessageKind::Chat);
        assert_eq!(event.content, "probe me");

        assert!(probe(b"\xff\xff\xff", NOW).is_none());
    }
}
