use chrono::{DateTime, Utc};

use crate::payload::ChannelPayload;
use crate::snowflake::{Snowflake, snowflake_time};
use crate::store::Keyed;

/// Guild channel kinds. Thread kinds are not listed here: threads live in
/// their own store and never appear in the channel store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    Text,
    Voice,
    Category,
    News,
    Stage,
    Directory,
    Forum,
}

impl ChannelKind {
    /// Map a raw payload kind tag to a constructor. Unknown tags return
    /// `None` and the payload is skipped.
    pub fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::Text),
            2 => Some(Self::Voice),
            4 => Some(Self::Category),
            5 => Some(Self::News),
            13 => Some(Self::Stage),
            14 => Some(Self::Directory),
            15 => Some(Self::Forum),
            _ => None,
        }
    }

    /// Bucket used as the leading sort key inside a category: text-like
    /// channels sort above voice-like ones regardless of position.
    pub fn sorting_bucket(self) -> u8 {
        match self {
            Self::Category => 2,
            Self::Voice | Self::Stage => 1,
            _ => 0,
        }
    }

    pub fn is_voice_like(self) -> bool {
        matches!(self, Self::Voice | Self::Stage)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Voice => "voice",
            Self::Category => "category",
            Self::News => "news",
            Self::Stage => "stage",
            Self::Directory => "directory",
            Self::Forum => "forum",
        }
    }
}

/// A guild channel. A category is itself a channel with no parent.
///
/// `position` is not guaranteed unique or gap-free; display order is
/// always the `(sorting bucket, position, id)` triple.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelState {
    pub id: Snowflake,
    pub name: String,
    pub kind: ChannelKind,
    pub parent_id: Option<Snowflake>,
    pub position: i32,
    pub topic: Option<String>,
    pub nsfw: bool,
}

impl ChannelState {
    /// Build from a payload. `None` when the payload has no id or carries
    /// an unrecognized kind tag.
    pub fn from_payload(payload: &ChannelPayload) -> Option<Self> {
        let id = payload.id?;
        let kind = ChannelKind::from_raw(payload.kind?)?;
        Some(Self {
            id,
            name: payload.name.clone(),
            kind,
            parent_id: payload.parent_id,
            position: payload.position,
            topic: payload.topic.clone(),
            nsfw: payload.nsfw,
        })
    }

    /// Sort key for display order among siblings.
    pub fn sort_key(&self) -> (u8, i32, Snowflake) {
        (self.kind.sorting_bucket(), self.position, self.id)
    }

    /// Sort key for per-kind listings, where the bucket is constant.
    pub fn position_key(&self) -> (i32, Snowflake) {
        (self.position, self.id)
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        snowflake_time(self.id)
    }
}

impl Keyed for ChannelState {
    fn key(&self) -> Snowflake {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_kind_is_rejected() {
        assert_eq!(ChannelKind::from_raw(1), None); // direct message
        assert_eq!(ChannelKind::from_raw(11), None); // thread
        assert_eq!(ChannelKind::from_raw(42), None);
    }

    #[test]
    fn test_sorting_buckets() {
        assert!(ChannelKind::Text.sorting_bucket() < ChannelKind::Voice.sorting_bucket());
        assert!(ChannelKind::Stage.sorting_bucket() < ChannelKind::Category.sorting_bucket());
        assert_eq!(ChannelKind::News.sorting_bucket(), ChannelKind::Forum.sorting_bucket());
    }

    #[test]
    fn test_from_payload_requires_id_and_kind() {
        let payload = ChannelPayload {
            id: Some(10),
            kind: Some(0),
            name: "general".into(),
            ..Default::default()
        };
        let channel = ChannelState::from_payload(&payload).unwrap();
        assert_eq!(channel.kind, ChannelKind::Text);

        assert!(ChannelState::from_payload(&ChannelPayload::default()).is_none());
        let unknown_kind = ChannelPayload {
            id: Some(10),
            kind: Some(99),
            ..Default::default()
        };
        assert!(ChannelState::from_payload(&unknown_kind).is_none());
    }
}
