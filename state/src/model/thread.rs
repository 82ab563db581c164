use chrono::{DateTime, Utc};

use crate::payload::ThreadPayload;
use crate::snowflake::{Snowflake, snowflake_time};
use crate::store::Keyed;

/// An active thread. Threads live in their own store, not the channel
/// store; `parent_id` must reference a channel but may dangle transiently
/// while events race.
#[derive(Debug, Clone, PartialEq)]
pub struct ThreadState {
    pub id: Snowflake,
    pub parent_id: Snowflake,
    pub name: String,
    pub owner_id: Option<Snowflake>,
    pub archived: bool,
    pub locked: bool,
    pub archive_timestamp: Option<DateTime<Utc>>,
    pub auto_archive_minutes: u32,
    pub message_count: u32,
}

impl ThreadState {
    /// Build from a payload. `None` when the payload has no id or no
    /// parent channel id.
    pub fn from_payload(payload: &ThreadPayload) -> Option<Self> {
        let id = payload.id?;
        let parent_id = payload.parent_id?;
        Some(Self {
            id,
            parent_id,
            name: payload.name.clone(),
            owner_id: payload.owner_id,
            archived: payload.archived,
            locked: payload.locked,
            archive_timestamp: payload.archive_timestamp,
            auto_archive_minutes: payload.auto_archive_minutes,
            message_count: payload.message_count,
        })
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        snowflake_time(self.id)
    }
}

impl Keyed for ThreadState {
    fn key(&self) -> Snowflake {
        self.id
    }
}
