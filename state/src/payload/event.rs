use serde::Deserialize;

use super::{
    ChannelPayload, EmojiPayload, GuildSnapshot, MemberPayload, RolePayload,
    ScheduledEventPayload, StageInstancePayload, StickerPayload, ThreadPayload,
    VoiceStatePayload,
};
use crate::snowflake::Snowflake;

/// One incremental mutation to a guild's state.
///
/// Each kind maps to exactly one store operation (plus the documented
/// channel→thread cascade and explicit presence side-calls). Events are
/// tolerant of out-of-order delivery: referencing an entity that is
/// already gone, or not yet known, is never an error.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GuildEvent {
    /// A member joined the guild.
    MemberAdd { member: MemberPayload },

    /// A cached member's attributes changed.
    MemberUpdate { member: MemberPayload },

    /// A member left the guild.
    MemberRemove { user_id: Snowflake },

    /// A channel was created.
    ChannelCreate { channel: ChannelPayload },

    /// A channel's attributes changed.
    ChannelUpdate { channel: ChannelPayload },

    /// A channel was deleted. Its threads go with it.
    ChannelDelete { channel_id: Snowflake },

    /// A role was created.
    RoleCreate { role: RolePayload },

    /// A role's attributes changed.
    RoleUpdate { role: RolePayload },

    /// A role was deleted.
    RoleDelete { role_id: Snowflake },

    /// A thread was created.
    ThreadCreate { thread: ThreadPayload },

    /// A thread's attributes changed (including archival).
    ThreadUpdate { thread: ThreadPayload },

    /// A thread was deleted or archived beyond retention.
    ThreadDelete { thread_id: Snowflake },

    /// A user's voice connection changed.
    VoiceStateUpdate { voice_state: VoiceStatePayload },

    /// A stage instance started.
    StageInstanceCreate { stage_instance: StageInstancePayload },

    /// A stage instance's attributes changed.
    StageInstanceUpdate { stage_instance: StageInstancePayload },

    /// A stage instance ended.
    StageInstanceDelete { stage_instance_id: Snowflake },

    /// A scheduled event was created.
    ScheduledEventCreate { event: ScheduledEventPayload },

    /// A scheduled event's attributes changed.
    ScheduledEventUpdate { event: ScheduledEventPayload },

    /// A scheduled event was deleted.
    ScheduledEventDelete { event_id: Snowflake },

    /// The guild's emoji list was replaced.
    EmojisUpdate { emojis: Vec<EmojiPayload> },

    /// The guild's sticker list was replaced.
    StickersUpdate { stickers: Vec<StickerPayload> },

    /// The guild's scalar identity fields changed. Sub-stores are not
    /// touched by this event.
    GuildUpdate { guild: GuildSnapshot },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tagged_deserialization() {
        let event: GuildEvent = serde_json::from_value(serde_json::json!({
            "type": "channel_delete",
            "channel_id": 42,
        }))
        .unwrap();
        assert!(matches!(event, GuildEvent::ChannelDelete { channel_id: 42 }));
    }

    #[test]
    fn test_nested_payload_deserialization() {
        let event: GuildEvent = serde_json::from_value(serde_json::json!({
            "type": "role_create",
            "role": { "id": 9, "name": "mods", "position": 2 },
        }))
        .unwrap();
        match event {
            GuildEvent::RoleCreate { role } => {
                assert_eq!(role.id, Some(9));
                assert_eq!(role.position, 2);
            }
            other => panic!("expected RoleCreate, got {other:?}"),
        }
    }
}
