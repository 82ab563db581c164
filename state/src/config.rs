use serde::Deserialize;

use crate::snowflake::Snowflake;

/// Cache-admission policy: which members encountered in snapshots and
/// events are worth keeping in the member store at all.
///
/// The local user is always admitted; large parts of a client are
/// useless without its own member entry.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache every member delivered by snapshots and member-add events.
    pub cache_joined_members: bool,
    /// Cache members that participate in voice, including minimal entries
    /// synthesized from member data embedded in voice-state updates.
    pub cache_voice_members: bool,
    /// The local user's id, when known.
    pub self_user_id: Option<Snowflake>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_joined_members: true,
            cache_voice_members: true,
            self_user_id: None,
        }
    }
}

impl CacheConfig {
    /// Should a member with this id be cached? `in_voice` is whether the
    /// user currently has a voice-state entry.
    pub fn admits_member(&self, user_id: Snowflake, in_voice: bool) -> bool {
        self.cache_joined_members
            || self.self_user_id == Some(user_id)
            || (self.cache_voice_members && in_voice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_admits_everyone() {
        let config = CacheConfig::default();
        assert!(config.admits_member(1, false));
        assert!(config.admits_member(1, true));
    }

    #[test]
    fn test_voice_only_policy() {
        let config = CacheConfig {
            cache_joined_members: false,
            cache_voice_members: true,
            self_user_id: None,
        };
        assert!(!config.admits_member(1, false));
        assert!(config.admits_member(1, true));
    }

    #[test]
    fn test_self_is_always_admitted() {
        let config = CacheConfig {
            cache_joined_members: false,
            cache_voice_members: false,
            self_user_id: Some(42),
        };
        assert!(config.admits_member(42, false));
        assert!(!config.admits_member(43, false));
    }
}
