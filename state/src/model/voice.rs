use crate::payload::VoiceStatePayload;
use crate::snowflake::Snowflake;
use crate::store::Keyed;

/// One user's voice connection, keyed by user id.
///
/// The voice-state store never holds an entry whose `channel_id` is
/// `None`; absence from the store *is* "not connected". The `Option`
/// exists so pre/post-update copies handed to callers can represent the
/// disconnected side of a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceConnection {
    pub user_id: Snowflake,
    pub channel_id: Option<Snowflake>,
    pub session_id: String,
    pub deaf: bool,
    pub mute: bool,
    pub self_deaf: bool,
    pub self_mute: bool,
    pub self_video: bool,
    pub self_stream: bool,
    pub suppress: bool,
}

impl VoiceConnection {
    /// Build from a payload against an already-resolved channel id.
    pub fn from_payload(
        user_id: Snowflake,
        payload: &VoiceStatePayload,
        channel_id: Option<Snowflake>,
    ) -> Self {
        Self {
            user_id,
            channel_id,
            session_id: payload.session_id.clone(),
            deaf: payload.deaf,
            mute: payload.mute,
            self_deaf: payload.self_deaf,
            self_mute: payload.self_mute,
            self_video: payload.self_video,
            self_stream: payload.self_stream,
            suppress: payload.suppress,
        }
    }

    /// Overwrite the mutable fields from a payload, moving the connection
    /// to `channel_id`.
    pub(crate) fn update_from(&mut self, payload: &VoiceStatePayload, channel_id: Option<Snowflake>) {
        self.channel_id = channel_id;
        self.session_id = payload.session_id.clone();
        self.deaf = payload.deaf;
        self.mute = payload.mute;
        self.self_deaf = payload.self_deaf;
        self.self_mute = payload.self_mute;
        self.self_video = payload.self_video;
        self.self_stream = payload.self_stream;
        self.suppress = payload.suppress;
    }

    pub fn is_connected(&self) -> bool {
        self.channel_id.is_some()
    }
}

impl Keyed for VoiceConnection {
    fn key(&self) -> Snowflake {
        self.user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_from_moves_channels() {
        let payload = VoiceStatePayload {
            user_id: Some(7),
            channel_id: Some(100),
            session_id: "abc".into(),
            self_mute: true,
            ..Default::default()
        };
        let mut connection = VoiceConnection::from_payload(7, &payload, Some(100));
        assert!(connection.is_connected());
        assert!(connection.self_mute);

        let moved = VoiceStatePayload {
            user_id: Some(7),
            channel_id: Some(200),
            session_id: "abc".into(),
            ..Default::default()
        };
        connection.update_from(&moved, Some(200));
        assert_eq!(connection.channel_id, Some(200));
        assert!(!connection.self_mute);
    }
}
