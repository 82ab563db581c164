use dashmap::DashMap;

use crate::payload::PresencePayload;
use crate::snowflake::Snowflake;

/// A user's presence as delivered by the platform. The cache stores and
/// forwards these records; it never interprets their contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Presence {
    pub status: String,
    pub custom_status: Option<String>,
    pub status_emoji: Option<String>,
}

impl From<&PresencePayload> for Presence {
    fn from(payload: &PresencePayload) -> Self {
        Self {
            status: payload.status.clone(),
            custom_status: payload.custom_status.clone(),
            status_emoji: payload.status_emoji.clone(),
        }
    }
}

/// Destination for presence records, keyed by (guild, user).
///
/// Presences live outside the guild itself; the guild only hands records
/// over (snapshot bundles, staged member presences) and requests eviction
/// when a member leaves.
pub trait PresenceSink: Send + Sync {
    fn store(&self, user_id: Snowflake, presence: Presence, guild_id: Snowflake);
    fn remove(&self, user_id: Snowflake, guild_id: Snowflake);
}

/// Plain in-memory presence store.
#[derive(Debug, Default)]
pub struct MemoryPresenceStore {
    entries: DashMap<(Snowflake, Snowflake), Presence>,
}

impl MemoryPresenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, guild_id: Snowflake, user_id: Snowflake) -> Option<Presence> {
        self.entries
            .get(&(guild_id, user_id))
            .map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PresenceSink for MemoryPresenceStore {
    fn store(&self, user_id: Snowflake, presence: Presence, guild_id: Snowflake) {
        self.entries.insert((guild_id, user_id), presence);
    }

    fn remove(&self, user_id: Snowflake, guild_id: Snowflake) {
        self.entries.remove(&(guild_id, user_id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn online() -> Presence {
        Presence {
            status: "online".into(),
            custom_status: None,
            status_emoji: None,
        }
    }

    #[test]
    fn test_store_and_remove() {
        let store = MemoryPresenceStore::new();
        store.store(7, online(), 1);
        assert_eq!(store.get(1, 7), Some(online()));

        store.remove(7, 1);
        assert_eq!(store.get(1, 7), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_guilds_are_isolated() {
        let store = MemoryPresenceStore::new();
        store.store(7, online(), 1);
        store.store(7, online(), 2);
        store.remove(7, 1);
        assert!(store.get(1, 7).is_none());
        assert!(store.get(2, 7).is_some());
    }
}
