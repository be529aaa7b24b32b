//! Typed events produced by the decoder.
//!
//! An [`Event`] is the only value that leaves the pipeline. Kind-specific
//! data travels in [`EventDetail`]; the human-readable `content` is always
//! populated, synthesized for kinds that carry no free text.

use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, TimeZone, Utc};
use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};

/// Display name used for events without an actionable sender.
pub const ANONYMOUS: &str = "anonymous";

/// Semantic kind of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Chat,
    Gift,
    Like,
    Member,
    Social,
    RoomStats,
    Control,
    Fansclub,
    RoomRank,
    Room,
    EmojiChat,
}

impl EventKind {
    pub const ALL: [EventKind; 11] = [
        Self::Chat,
        Self::Gift,
        Self::Like,
        Self::Member,
        Self::Social,
        Self::RoomStats,
        Self::Control,
        Self::Fansclub,
        Self::RoomRank,
        Self::Room,
        Self::EmojiChat,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::Gift => "gift",
            Self::Like => "like",
            Self::Member => "member",
            Self::Social => "social",
            Self::RoomStats => "room_stats",
            Self::Control => "control",
            Self::Fansclub => "fansclub",
            Self::RoomRank => "room_rank",
            Self::Room => "room",
            Self::EmojiChat => "emoji_chat",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sender of an event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventUser {
    pub id: String,
    pub nickname: String,
    pub level: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// Member action codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberAction {
    Entered,
    Left,
}

impl MemberAction {
    pub const fn from_code(code: u64) -> Option<Self> {
        match code {
            1 => Some(Self::Entered),
            2 => Some(Self::Left),
            _ => None,
        }
    }

    pub const fn content(self) -> &'static str {
        match self {
            Self::Entered => "entered",
            Self::Left => "left",
        }
    }
}

/// Social action codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SocialAction {
    Followed,
    Shared,
}

impl SocialAction {
    pub const fn from_code(code: u64) -> Option<Self> {
        match code {
            1 => Some(Self::Followed),
            2 => Some(Self::Shared),
            _ => None,
        }
    }

    pub const fn content(self) -> &'static str {
        match self {
            Self::Followed => "followed the host",
            Self::Shared => "shared the room",
        }
    }
}

/// Live status carried by control messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlStatus {
    Started,
    Paused,
    Ended,
}

impl ControlStatus {
    pub const fn from_code(code: u64) -> Option<Self> {
        match code {
            1 => Some(Self::Started),
            2 => Some(Self::Paused),
            3 => Some(Self::Ended),
            _ => None,
        }
    }

    pub const fn content(self) -> &'static str {
        match self {
            Self::Started => "live started",
            Self::Paused => "live paused",
            Self::Ended => "live ended",
        }
    }
}

/// Fans-club notification types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FansclubAction {
    LevelUp,
    Joined,
}

impl FansclubAction {
    pub const fn from_code(code: u64) -> Option<Self> {
        match code {
            1 => Some(Self::LevelUp),
            2 => Some(Self::Joined),
            _ => None,
        }
    }

    pub const fn content(self) -> &'static str {
        match self {
            Self::LevelUp => "fans club level up",
            Self::Joined => "joined the fans club",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GiftDetail {
    pub id: String,
    pub name: String,
    pub count: u64,
    pub combo_count: u64,
    pub diamond_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedUser {
    pub user: EventUser,
    pub score: String,
}

/// Kind-specific payload of an event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventDetail {
    #[default]
    None,
    Gift(GiftDetail),
    Like {
        count: u64,
        total: u64,
    },
    Member {
        action: MemberAction,
        member_count: u64,
    },
    Social {
        action: SocialAction,
        share_type: u64,
        follow_count: u64,
    },
    RoomStats {
        total: u64,
        total_user: u64,
        popularity: u64,
        display: String,
    },
    Control {
        status: ControlStatus,
    },
    Fansclub {
        action: FansclubAction,
    },
    RoomRank {
        ranks: Vec<RankedUser>,
    },
    EmojiChat {
        emoji_id: String,
    },
}

impl EventDetail {
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

/// A normalized, validated event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub kind: EventKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<EventUser>,
    pub content: String,
    /// Epoch milliseconds.
    pub timestamp: i64,
    pub room_id: String,
    pub msg_id: String,
    #[serde(default, skip_serializing_if = "EventDetail::is_none")]
    pub detail: EventDetail,
}

impl Event {
    pub fn new(kind: EventKind, content: impl Into<String>, timestamp: i64) -> Self {
        Self {
            kind,
            user: None,
            content: content.into(),
            timestamp,
            room_id: String::new(),
            msg_id: String::new(),
            detail: EventDetail::None,
        }
    }

    pub fn with_user(mut self, user: EventUser) -> Self {
        self.user = Some(user);
        self
    }

    pub fn with_ids(mut self, room_id: impl Into<String>, msg_id: impl Into<String>) -> Self {
        self.room_id = room_id.into();
        self.msg_id = msg_id.into();
        self
    }

    pub fn with_detail(mut self, detail: EventDetail) -> Self {
        self.detail = detail;
        self
    }

    pub fn user_id(&self) -> &str {
        self.user.as_ref().map_or("", |u| u.id.as_str())
    }

    pub fn display_name(&self) -> &str {
        self.user
            .as_ref()
            .map(|u| u.nickname.as_str())
            .filter(|n| !n.is_empty())
            .unwrap_or(ANONYMOUS)
    }

    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.timestamp).single()
    }

    /// Key under which a store should insert this event.
    ///
    /// The platform message id when present, otherwise an id derived from the
    /// same components the dedup cache keys on.
    pub fn store_key(&self) -> String {
        if !self.msg_id.is_empty() && self.msg_id != "0" {
            return self.msg_id.clone();
        }
        let mut hasher = FxHasher::default();
        self.content.hash(&mut hasher);
        format!(
            "{}-{}-{}-{:016x}",
            self.kind,
            self.user_id(),
            self.timestamp.div_euclid(1000),
            hasher.finish()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_kind_names() {
        assert_eq!(EventKind::RoomStats.to_string(), "room_stats");
        assert_eq!(
            serde_json::to_string(&EventKind::EmojiChat).unwrap(),
            "\"emoji_chat\""
        );
        assert_eq!(EventKind::ALL.len(), 11);
    }

    #[test]
    fn test_action_codes() {
        assert_eq!(MemberAction::from_code(1), Some(MemberAction::Entered));
        assert_eq!(MemberAction::from_code(2), Some(MemberAction::Left));
        assert_eq!(MemberAction::from_code(7), None);
        assert_eq!(SocialAction::from_code(0), None);
        assert_eq!(ControlStatus::from_code(3).map(ControlStatus::content), Some("live ended"));
        assert_eq!(FansclubAction::from_code(2), Some(FansclubAction::Joined));
    }

    #[test]
    fn test_display_name_fallback() {
        let event = Event::new(EventKind::Control, "live ended", 0);
        assert_eq!(event.display_name(), ANONYMOUS);
        assert_eq!(event.user_id(), "");
    }

    #[test]
    fn test_store_key() {
        let event = Event::new(EventKind::Chat, "hi", 1_700_000_000_123).with_ids("9", "77");
        assert_eq!(event.store_key(), "77");

        let anonymous = Event::new(EventKind::Chat, "hi", 1_700_000_000_123);
        let same = Event::new(EventKind::Chat, "hi", 1_700_000_000_999);
        let other = Event::new(EventKind::Chat, "hey", 1_700_000_000_123);
        assert!(anonymous.store_key().starts_with("chat--1700000000-"));
        assert_eq!(anonymous.store_key(), same.store_key());
        assert_ne!(anonymous.store_key(), other.store_key());
    }

    #[test]
    fn test_serialized_shape() {
        let event = Event::new(EventKind::Like, "liked the room +3", 1_700_000_000_000)
            .with_user(EventUser {
                id: "1".into(),
                nickname: "bob".into(),
                level: 2,
                avatar_url: None,
            })
            .with_detail(EventDetail::Like { count: 3, total: 10 });

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "like");
        assert_eq!(json["user"]["nickname"], "bob");
        assert_eq!(json["detail"]["type"], "like");
        assert_eq!(json["detail"]["count"], 3);
        assert!(json["user"].get("avatar_url").is_none());

        let back: Event = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }
}
