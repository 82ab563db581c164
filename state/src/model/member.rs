use chrono::{DateTime, Utc};

use crate::payload::MemberPayload;
use crate::presence::Presence;
use crate::snowflake::{Snowflake, SnowflakeList};
use crate::store::Keyed;

/// A guild member: per-guild attributes layered over a user id.
///
/// A presence bundled with the member payload is staged on the entry and
/// handed off to the external presence store the moment the member is
/// added. The transfer happens once, it is not an ongoing link.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberState {
    pub user_id: Snowflake,
    pub username: String,
    pub nick: Option<String>,
    pub roles: SnowflakeList,
    pub joined_at: Option<DateTime<Utc>>,
    pub premium_since: Option<DateTime<Utc>>,
    pub pending: bool,
    pub(crate) staged_presence: Option<Presence>,
}

impl MemberState {
    /// Build from a payload. `None` when no user id can be extracted.
    pub fn from_payload(payload: &MemberPayload) -> Option<Self> {
        let user = payload.user.as_ref()?;
        let user_id = user.id?;
        Some(Self {
            user_id,
            username: user.username.clone(),
            nick: payload.nick.clone(),
            roles: SnowflakeList::new(payload.roles.clone(), false),
            joined_at: payload.joined_at,
            premium_since: payload.premium_since,
            pending: payload.pending,
            staged_presence: payload.presence.as_ref().map(Presence::from),
        })
    }

    /// Nickname when set, username otherwise.
    pub fn display_name(&self) -> &str {
        self.nick.as_deref().unwrap_or(&self.username)
    }

    /// Whether the member currently boosts the guild.
    pub fn is_boosting(&self) -> bool {
        self.premium_since.is_some()
    }

    pub fn has_role(&self, role_id: Snowflake) -> bool {
        self.roles.contains(role_id)
    }
}

impl Keyed for MemberState {
    fn key(&self) -> Snowflake {
        self.user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::UserPayload;

    #[test]
    fn test_from_payload_sorts_roles() {
        let payload = MemberPayload {
            user: Some(UserPayload {
                id: Some(7),
                username: "ada".into(),
            }),
            roles: vec![30, 10, 20],
            ..Default::default()
        };
        let member = MemberState::from_payload(&payload).unwrap();
        assert_eq!(member.roles.as_slice(), &[10, 20, 30]);
        assert!(member.has_role(20));
    }

    #[test]
    fn test_display_name_prefers_nick() {
        let payload = MemberPayload {
            user: Some(UserPayload {
                id: Some(7),
                username: "ada".into(),
            }),
            nick: Some("The Countess".into()),
            ..Default::default()
        };
        let member = MemberState::from_payload(&payload).unwrap();
        assert_eq!(member.display_name(), "The Countess");
    }

    #[test]
    fn test_missing_user_is_rejected() {
        assert!(MemberState::from_payload(&MemberPayload::default()).is_none());
        let no_id = MemberPayload {
            user: Some(UserPayload::default()),
            ..Default::default()
        };
        assert!(MemberState::from_payload(&no_id).is_none());
    }
}
