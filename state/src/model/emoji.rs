use crate::payload::{EmojiPayload, StickerPayload};
use crate::snowflake::{Snowflake, SnowflakeList};

/// A custom guild emoji. Emoji are an owned collection replaced wholesale
/// on snapshot or bulk update, never merged item by item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmojiState {
    pub id: Snowflake,
    pub name: String,
    pub animated: bool,
    pub available: bool,
    pub managed: bool,
    /// Roles allowed to use the emoji; empty means everyone.
    pub roles: SnowflakeList,
}

impl EmojiState {
    pub fn from_payload(payload: &EmojiPayload) -> Option<Self> {
        let id = payload.id?;
        Some(Self {
            id,
            name: payload.name.clone(),
            animated: payload.animated,
            available: payload.available,
            managed: payload.managed,
            roles: SnowflakeList::new(payload.roles.clone(), false),
        })
    }
}

/// A custom guild sticker; same wholesale-replacement lifecycle as emoji.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StickerState {
    pub id: Snowflake,
    pub name: String,
    pub description: Option<String>,
    pub format_type: u8,
    pub available: bool,
}

impl StickerState {
    pub fn from_payload(payload: &StickerPayload) -> Option<Self> {
        let id = payload.id?;
        Some(Self {
            id,
            name: payload.name.clone(),
            description: payload.description.clone(),
            format_type: payload.format_type,
            available: payload.available,
        })
    }
}
