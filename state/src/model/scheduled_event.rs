use chrono::{DateTime, Utc};

use crate::payload::ScheduledEventPayload;
use crate::snowflake::Snowflake;
use crate::store::Keyed;

/// Lifecycle status of a scheduled event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScheduledEventStatus {
    #[default]
    Scheduled,
    Active,
    Completed,
    Canceled,
    Unknown(u8),
}

impl ScheduledEventStatus {
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            1 => Self::Scheduled,
            2 => Self::Active,
            3 => Self::Completed,
            4 => Self::Canceled,
            other => Self::Unknown(other),
        }
    }
}

/// A scheduled guild event.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledEventState {
    pub id: Snowflake,
    pub channel_id: Option<Snowflake>,
    pub name: String,
    pub description: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub status: ScheduledEventStatus,
    pub user_count: u32,
}

impl ScheduledEventState {
    /// Build from a payload. `None` when the payload has no id.
    pub fn from_payload(payload: &ScheduledEventPayload) -> Option<Self> {
        let id = payload.id?;
        Some(Self {
            id,
            channel_id: payload.channel_id,
            name: payload.name.clone(),
            description: payload.description.clone(),
            start_time: payload.start_time,
            end_time: payload.end_time,
            status: payload
                .status
                .map(ScheduledEventStatus::from_raw)
                .unwrap_or_default(),
            user_count: payload.user_count,
        })
    }
}

impl Keyed for ScheduledEventState {
    fn key(&self) -> Snowflake {
        self.id
    }
}
