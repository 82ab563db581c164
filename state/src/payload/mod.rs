//! Inbound payload structs.
//!
//! These mirror what the transport layer delivers: one full-state
//! [`GuildSnapshot`] at guild creation, then a stream of small
//! [`GuildEvent`]s. Every field is tolerant: ids are `Option` so a
//! single malformed element can be skipped without aborting a whole
//! load, and everything else falls back to a documented default.

mod event;

pub use event::GuildEvent;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::snowflake::Snowflake;

fn default_true() -> bool {
    true
}

/// Full-state payload sufficient to construct a guild from scratch.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GuildSnapshot {
    pub id: Option<Snowflake>,
    pub name: Option<String>,
    pub unavailable: bool,
    pub owner_id: Option<Snowflake>,
    pub description: Option<String>,
    pub features: Vec<String>,
    pub preferred_locale: Option<String>,
    pub vanity_url_code: Option<String>,

    pub verification_level: Option<u8>,
    pub default_message_notifications: Option<u8>,
    pub explicit_content_filter: Option<u8>,
    pub nsfw_level: Option<u8>,
    pub mfa_level: Option<u8>,

    pub premium_tier: Option<u8>,
    pub premium_subscription_count: Option<u32>,
    pub afk_timeout: Option<u32>,
    pub max_members: Option<u64>,
    pub max_presences: Option<u64>,

    /// Authoritative member count; only trusted when present.
    pub member_count: Option<u64>,
    pub large: Option<bool>,
    pub approximate_member_count: Option<u64>,
    pub approximate_presence_count: Option<u64>,

    pub roles: Vec<RolePayload>,
    pub channels: Vec<ChannelPayload>,
    pub threads: Vec<ThreadPayload>,
    pub stage_instances: Vec<StageInstancePayload>,
    pub scheduled_events: Vec<ScheduledEventPayload>,
    pub emojis: Vec<EmojiPayload>,
    pub stickers: Vec<StickerPayload>,
    pub voice_states: Vec<VoiceStatePayload>,
    pub members: Vec<MemberPayload>,
    pub presences: Vec<PresencePayload>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RolePayload {
    pub id: Option<Snowflake>,
    pub name: String,
    pub position: i32,
    pub permissions: u64,
    pub color: u32,
    pub hoist: bool,
    pub mentionable: bool,
    pub managed: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ChannelPayload {
    pub id: Option<Snowflake>,
    /// Raw channel kind tag; unrecognized tags cause the payload to be
    /// skipped, not the load to fail.
    #[serde(rename = "type")]
    pub kind: Option<u8>,
    pub name: String,
    pub parent_id: Option<Snowflake>,
    pub position: i32,
    pub topic: Option<String>,
    pub nsfw: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ThreadPayload {
    pub id: Option<Snowflake>,
    pub parent_id: Option<Snowflake>,
    pub name: String,
    pub owner_id: Option<Snowflake>,
    pub archived: bool,
    pub locked: bool,
    pub archive_timestamp: Option<DateTime<Utc>>,
    pub auto_archive_minutes: u32,
    pub message_count: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UserPayload {
    pub id: Option<Snowflake>,
    pub username: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MemberPayload {
    pub user: Option<UserPayload>,
    pub nick: Option<String>,
    pub roles: Vec<Snowflake>,
    pub joined_at: Option<DateTime<Utc>>,
    pub premium_since: Option<DateTime<Utc>>,
    pub pending: bool,
    /// Presence bundled with the member; staged on the entry and handed
    /// to the presence store when the member is cached.
    pub presence: Option<PresencePayload>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VoiceStatePayload {
    pub user_id: Option<Snowflake>,
    /// `None` means the user disconnected.
    pub channel_id: Option<Snowflake>,
    pub session_id: String,
    pub deaf: bool,
    pub mute: bool,
    pub self_deaf: bool,
    pub self_mute: bool,
    pub self_video: bool,
    pub self_stream: bool,
    pub suppress: bool,
    /// Member data embedded by the platform for users not otherwise
    /// known; used to synthesize a minimal member entry when the cache
    /// policy admits voice participants.
    pub member: Option<Box<MemberPayload>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StageInstancePayload {
    pub id: Option<Snowflake>,
    pub channel_id: Option<Snowflake>,
    pub topic: String,
    pub privacy_level: u8,
    pub discoverable_disabled: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScheduledEventPayload {
    pub id: Option<Snowflake>,
    pub channel_id: Option<Snowflake>,
    pub name: String,
    pub description: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub status: Option<u8>,
    pub user_count: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmojiPayload {
    pub id: Option<Snowflake>,
    pub name: String,
    pub animated: bool,
    #[serde(default = "default_true")]
    pub available: bool,
    pub managed: bool,
    pub roles: Vec<Snowflake>,
}

impl Default for EmojiPayload {
    fn default() -> Self {
        Self {
            id: None,
            name: String::new(),
            animated: false,
            available: true,
            managed: false,
            roles: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StickerPayload {
    pub id: Option<Snowflake>,
    pub name: String,
    pub description: Option<String>,
    pub format_type: u8,
    #[serde(default = "default_true")]
    pub available: bool,
}

impl Default for StickerPayload {
    fn default() -> Self {
        Self {
            id: None,
            name: String::new(),
            description: None,
            format_type: 0,
            available: true,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PresencePayload {
    pub user_id: Option<Snowflake>,
    pub status: String,
    pub custom_status: Option<String>,
    pub status_emoji: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_tolerates_sparse_json() {
        let snapshot: GuildSnapshot = serde_json::from_value(serde_json::json!({
            "id": 123,
            "name": "test guild",
        }))
        .unwrap();
        assert_eq!(snapshot.id, Some(123));
        assert_eq!(snapshot.name.as_deref(), Some("test guild"));
        assert!(snapshot.roles.is_empty());
        assert!(snapshot.member_count.is_none());
        assert!(!snapshot.unavailable);
    }

    #[test]
    fn test_channel_kind_tag_renames() {
        let channel: ChannelPayload = serde_json::from_value(serde_json::json!({
            "id": 5,
            "type": 4,
            "name": "lobby",
        }))
        .unwrap();
        assert_eq!(channel.kind, Some(4));
    }

    #[test]
    fn test_emoji_defaults_to_available() {
        let emoji: EmojiPayload =
            serde_json::from_value(serde_json::json!({ "id": 9, "name": "blob" })).unwrap();
        assert!(emoji.available);
    }

    #[test]
    fn test_timestamps_parse_rfc3339() {
        let member: MemberPayload = serde_json::from_value(serde_json::json!({
            "user": { "id": 1, "username": "ada" },
            "joined_at": "2023-04-01T12:00:00Z",
        }))
        .unwrap();
        assert!(member.joined_at.is_some());
    }
}
