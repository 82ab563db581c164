use bitflags::bitflags;
use chrono::{DateTime, Utc};

use crate::payload::RolePayload;
use crate::snowflake::{Snowflake, snowflake_time};
use crate::store::Keyed;

bitflags! {
    /// Permission bitfield carried by roles. Bits the cache does not know
    /// about are retained as-is so newer payloads survive a round trip.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct Permissions: u64 {
        // ── General ──
        const VIEW_CHANNELS         = 1 << 0;
        const MANAGE_CHANNELS       = 1 << 1;
        const MANAGE_ROLES          = 1 << 2;
        const MANAGE_GUILD          = 1 << 3;
        const CREATE_INVITES        = 1 << 4;
        const KICK_MEMBERS          = 1 << 5;
        const BAN_MEMBERS           = 1 << 6;
        const ADMINISTRATOR         = 1 << 7;

        // ── Channel text ──
        const SEND_MESSAGES         = 1 << 10;
        const EMBED_LINKS           = 1 << 11;
        const ATTACH_FILES          = 1 << 12;
        const ADD_REACTIONS         = 1 << 13;
        const MENTION_EVERYONE      = 1 << 14;
        const MANAGE_MESSAGES       = 1 << 15;
        const READ_MESSAGE_HISTORY  = 1 << 16;

        // ── Voice ──
        const CONNECT               = 1 << 20;
        const SPEAK                 = 1 << 21;
        const MUTE_MEMBERS          = 1 << 22;
        const DEAFEN_MEMBERS        = 1 << 23;
        const MOVE_MEMBERS          = 1 << 24;
    }
}

/// Baseline permissions granted through the base role when a snapshot
/// omits them.
pub const fn default_everyone_permissions() -> Permissions {
    Permissions::VIEW_CHANNELS
        .union(Permissions::SEND_MESSAGES)
        .union(Permissions::EMBED_LINKS)
        .union(Permissions::ATTACH_FILES)
        .union(Permissions::ADD_REACTIONS)
        .union(Permissions::READ_MESSAGE_HISTORY)
        .union(Permissions::CREATE_INVITES)
        .union(Permissions::CONNECT)
        .union(Permissions::SPEAK)
}

/// A guild role.
///
/// Hierarchy order is total: `(position, id)` ascending, lowest role
/// first. Exactly one role shares the guild's own id: the implicit base
/// role every member holds.
#[derive(Debug, Clone, PartialEq)]
pub struct RoleState {
    pub id: Snowflake,
    pub name: String,
    pub position: i32,
    pub permissions: Permissions,
    pub color: u32,
    pub hoist: bool,
    pub mentionable: bool,
    pub managed: bool,
}

impl RoleState {
    /// Build from a payload. `None` when the payload has no id.
    pub fn from_payload(payload: &RolePayload) -> Option<Self> {
        let id = payload.id?;
        Some(Self {
            id,
            name: payload.name.clone(),
            position: payload.position,
            permissions: Permissions::from_bits_retain(payload.permissions),
            color: payload.color,
            hoist: payload.hoist,
            mentionable: payload.mentionable,
            managed: payload.managed,
        })
    }

    /// Total hierarchy ordering key; ties on position break by id.
    pub fn sort_key(&self) -> (i32, Snowflake) {
        (self.position, self.id)
    }

    /// Whether this is the guild's base role.
    pub fn is_default(&self, guild_id: Snowflake) -> bool {
        self.id == guild_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        snowflake_time(self.id)
    }
}

impl Keyed for RoleState {
    fn key(&self) -> Snowflake {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_key_ties_break_by_id() {
        let a = RoleState::from_payload(&RolePayload {
            id: Some(9),
            position: 1,
            ..Default::default()
        })
        .unwrap();
        let b = RoleState::from_payload(&RolePayload {
            id: Some(5),
            position: 1,
            ..Default::default()
        })
        .unwrap();
        assert!(b.sort_key() < a.sort_key());
    }

    #[test]
    fn test_unknown_permission_bits_are_retained() {
        let payload = RolePayload {
            id: Some(1),
            permissions: 1 << 40 | Permissions::SEND_MESSAGES.bits(),
            ..Default::default()
        };
        let role = RoleState::from_payload(&payload).unwrap();
        assert!(role.permissions.contains(Permissions::SEND_MESSAGES));
        assert_eq!(role.permissions.bits(), payload.permissions);
    }

    #[test]
    fn test_missing_id_is_rejected() {
        assert!(RoleState::from_payload(&RolePayload::default()).is_none());
    }
}
