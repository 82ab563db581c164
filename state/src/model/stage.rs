use crate::payload::StageInstancePayload;
use crate::snowflake::Snowflake;
use crate::store::Keyed;

/// A live stage instance: the "what's happening" attached to a stage
/// channel while it hosts an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageInstanceState {
    pub id: Snowflake,
    pub channel_id: Snowflake,
    pub topic: String,
    pub privacy_level: u8,
    pub discoverable_disabled: bool,
}

impl StageInstanceState {
    /// Build from a payload. `None` when the id or the hosting channel id
    /// is missing.
    pub fn from_payload(payload: &StageInstancePayload) -> Option<Self> {
        let id = payload.id?;
        let channel_id = payload.channel_id?;
        Some(Self {
            id,
            channel_id,
            topic: payload.topic.clone(),
            privacy_level: payload.privacy_level,
            discoverable_disabled: payload.discoverable_disabled,
        })
    }
}

impl Keyed for StageInstanceState {
    fn key(&self) -> Snowflake {
        self.id
    }
}
