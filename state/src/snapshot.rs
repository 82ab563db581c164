//! Guild construction from a full-state snapshot.
//!
//! One pass, terminal on completion: scalars, roles, channels, threads,
//! stage instances, scheduled events, emoji/stickers, voice states (which
//! need the channel store), then members (whose admission may depend on
//! the voice store), then bundled presences. A malformed list element is
//! skipped with a diagnostic; only a snapshot with no guild id at all is
//! fatal, and in that case no guild is ever published.

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::CacheConfig;
use crate::error::SnapshotError;
use crate::guild::{GuildMeta, GuildState};
use crate::model::{
    ChannelState, ContentFilter, EmojiState, MemberState, MfaLevel, NotificationLevel,
    NsfwLevel, RoleState, ScheduledEventState, StageInstanceState, StickerState, ThreadState,
    VerificationLevel,
};
use crate::payload::GuildSnapshot;
use crate::presence::{Presence, PresenceSink};
use crate::snowflake::Snowflake;

impl GuildMeta {
    /// Overwrite scalar fields from a snapshot. Fields the payload omits
    /// fall back to their documented defaults, except the authoritative
    /// member count and the large flag, which are only touched when
    /// present, so partial payloads cannot erase them.
    pub(crate) fn apply_snapshot(&mut self, snapshot: &GuildSnapshot) {
        self.name = snapshot.name.clone().unwrap_or_default();
        self.description = snapshot.description.clone();
        self.owner_id = snapshot.owner_id;
        self.features = snapshot.features.clone();
        self.preferred_locale = snapshot
            .preferred_locale
            .clone()
            .unwrap_or_else(|| "en-US".into());
        self.vanity_url_code = snapshot.vanity_url_code.clone();

        self.verification_level = snapshot
            .verification_level
            .map(VerificationLevel::from_raw)
            .unwrap_or_default();
        self.default_notifications = snapshot
            .default_message_notifications
            .map(NotificationLevel::from_raw)
            .unwrap_or_default();
        self.explicit_content_filter = snapshot
            .explicit_content_filter
            .map(ContentFilter::from_raw)
            .unwrap_or_default();
        self.nsfw_level = snapshot.nsfw_level.map(NsfwLevel::from_raw).unwrap_or_default();
        self.mfa_level = snapshot.mfa_level.map(MfaLevel::from_raw).unwrap_or_default();

        self.premium_tier = snapshot.premium_tier;
        self.premium_subscription_count = snapshot.premium_subscription_count.unwrap_or(0);
        self.afk_timeout = snapshot.afk_timeout.unwrap_or(0);
        self.max_members = snapshot.max_members;
        self.max_presences = snapshot.max_presences;
        self.unavailable = snapshot.unavailable;

        if snapshot.member_count.is_some() {
            self.member_count = snapshot.member_count;
        }
        if snapshot.large.is_some() {
            self.large = snapshot.large;
        }
        self.approximate_member_count = snapshot.approximate_member_count;
        self.approximate_presence_count = snapshot.approximate_presence_count;
        if snapshot.approximate_presence_count.is_some() {
            self.presence_count = snapshot.approximate_presence_count;
        }
    }
}

impl GuildState {
    /// Build the entire guild from one snapshot.
    ///
    /// The only fatal condition is a snapshot with no id
    /// ([`SnapshotError::MissingId`]); everything else degrades to
    /// skipping the offending element.
    pub fn from_snapshot(
        snapshot: &GuildSnapshot,
        config: CacheConfig,
        presences: Arc<dyn PresenceSink>,
    ) -> Result<Self, SnapshotError> {
        let id = snapshot.id.ok_or(SnapshotError::MissingId)?;
        let guild = Self::bare(id, config, presences);
        guild.load(snapshot);
        Ok(guild)
    }

    /// Stub for a guild the platform reports as unavailable: identity
    /// only, zero members, to be replaced by a real snapshot later.
    pub fn unavailable(
        id: Snowflake,
        config: CacheConfig,
        presences: Arc<dyn PresenceSink>,
    ) -> Self {
        let guild = Self::bare(id, config, presences);
        {
            let mut meta = guild.meta.write();
            meta.unavailable = true;
            meta.member_count = Some(0);
        }
        guild
    }

    fn load(&self, snapshot: &GuildSnapshot) {
        {
            let mut meta = self.meta.write();
            meta.apply_snapshot(snapshot);
            if meta.unavailable {
                meta.member_count = Some(0);
            }
        }

        for payload in &snapshot.roles {
            match RoleState::from_payload(payload) {
                Some(role) => self.add_role(role),
                None => {
                    warn!(guild_id = self.id, "skipping role payload without id");
                    self.note_skipped();
                }
            }
        }

        for payload in &snapshot.channels {
            match ChannelState::from_payload(payload) {
                Some(channel) => self.add_channel(channel),
                None => {
                    warn!(
                        guild_id = self.id,
                        channel_id = payload.id.unwrap_or_default(),
                        kind = payload.kind.unwrap_or_default(),
                        "skipping channel payload with missing id or unknown kind"
                    );
                    self.note_skipped();
                }
            }
        }

        for payload in &snapshot.threads {
            match ThreadState::from_payload(payload) {
                Some(thread) => self.add_thread(thread),
                None => {
                    warn!(guild_id = self.id, "skipping thread payload without id or parent");
                    self.note_skipped();
                }
            }
        }

        for payload in &snapshot.stage_instances {
            match StageInstanceState::from_payload(payload) {
                Some(stage_instance) => self.add_stage_instance(stage_instance),
                None => {
                    warn!(guild_id = self.id, "skipping stage-instance payload without id");
                    self.note_skipped();
                }
            }
        }

        for payload in &snapshot.scheduled_events {
            match ScheduledEventState::from_payload(payload) {
                Some(event) => self.add_scheduled_event(event),
                None => {
                    warn!(guild_id = self.id, "skipping scheduled-event payload without id");
                    self.note_skipped();
                }
            }
        }

        // Emoji and stickers are owned collections, replaced wholesale.
        self.set_emojis(
            snapshot
                .emojis
                .iter()
                .filter_map(EmojiState::from_payload)
                .collect(),
        );
        self.set_stickers(
            snapshot
                .stickers
                .iter()
                .filter_map(StickerState::from_payload)
                .collect(),
        );

        // Voice states resolve against the channel store populated above.
        for payload in &snapshot.voice_states {
            self.update_voice_state(payload);
        }

        // Member admission may consult the voice store, so members load
        // after voice states.
        for payload in &snapshot.members {
            match MemberState::from_payload(payload) {
                Some(member) => {
                    let in_voice = self.voice_states.contains(member.user_id);
                    if self.config.admits_member(member.user_id, in_voice) {
                        self.add_member(member);
                    }
                }
                None => {
                    warn!(guild_id = self.id, "skipping member payload without user id");
                    self.note_skipped();
                }
            }
        }

        for payload in &snapshot.presences {
            let Some(user_id) = payload.user_id else {
                self.note_skipped();
                continue;
            };
            self.presences.store(user_id, Presence::from(payload), self.id);
        }

        info!(
            guild_id = self.id,
            roles = self.roles.len(),
            channels = self.channels.len(),
            threads = self.threads.len(),
            members = self.members.len(),
            voice_states = self.voice_states.len(),
            skipped = self.skipped_entities(),
            "guild snapshot loaded"
        );
    }
}
