use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::config::CacheConfig;
use crate::model::{
    ChannelKind, ChannelState, ContentFilter, EmojiState, MemberState, MfaLevel,
    NotificationLevel, NsfwLevel, Permissions, RoleState, ScheduledEventState,
    StageInstanceState, StickerState, ThreadState, VerificationLevel, VoiceConnection,
    default_everyone_permissions,
};
use crate::payload::VoiceStatePayload;
use crate::presence::PresenceSink;
use crate::sequence::SequenceView;
use crate::snowflake::{Snowflake, SnowflakeList, snowflake_time};
use crate::store::Store;

/// Member count at or above which a guild is considered "large".
pub const LARGE_GUILD_THRESHOLD: u64 = 250;

/// Scalar identity fields of a guild. Mutated only wholesale, from a
/// snapshot or a guild-update event; the keyed sub-stores live on
/// [`GuildState`] directly.
#[derive(Debug, Clone, PartialEq)]
pub struct GuildMeta {
    pub name: String,
    pub description: Option<String>,
    pub owner_id: Option<Snowflake>,
    pub features: Vec<String>,
    pub preferred_locale: String,
    pub vanity_url_code: Option<String>,
    pub verification_level: VerificationLevel,
    pub default_notifications: NotificationLevel,
    pub explicit_content_filter: ContentFilter,
    pub nsfw_level: NsfwLevel,
    pub mfa_level: MfaLevel,
    pub premium_tier: Option<u8>,
    pub premium_subscription_count: u32,
    pub afk_timeout: u32,
    pub max_members: Option<u64>,
    pub max_presences: Option<u64>,
    pub unavailable: bool,
    pub(crate) member_count: Option<u64>,
    pub(crate) presence_count: Option<u64>,
    pub(crate) approximate_member_count: Option<u64>,
    pub(crate) approximate_presence_count: Option<u64>,
    pub(crate) large: Option<bool>,
}

impl Default for GuildMeta {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: None,
            owner_id: None,
            features: Vec::new(),
            preferred_locale: "en-US".into(),
            vanity_url_code: None,
            verification_level: VerificationLevel::default(),
            default_notifications: NotificationLevel::default(),
            explicit_content_filter: ContentFilter::default(),
            nsfw_level: NsfwLevel::default(),
            mfa_level: MfaLevel::default(),
            premium_tier: None,
            premium_subscription_count: 0,
            afk_timeout: 0,
            max_members: None,
            max_presences: None,
            unavailable: false,
            member_count: None,
            presence_count: None,
            approximate_member_count: None,
            approximate_presence_count: None,
            large: None,
        }
    }
}

/// Either a channel or a thread, for lookups that accept both.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelOrThread {
    Channel(ChannelState),
    Thread(ThreadState),
}

/// Result of applying one voice-state payload: the affected member (if
/// known or synthesizable), plus explicit pre/post-update copies.
/// `None` on either side means "not connected".
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceStateChange {
    pub member: Option<MemberState>,
    pub before: Option<VoiceConnection>,
    pub after: Option<VoiceConnection>,
}

/// The local mirror of one guild.
///
/// Built once from a snapshot, then mutated for the life of the process
/// by one ordered event stream. All mutation goes through `&self` methods
/// over the owning stores; reads hand out clones and never block on I/O.
/// Mutation calls for one guild must be issued by a single logical writer
/// in arrival order; readers may run concurrently with it.
pub struct GuildState {
    pub(crate) id: Snowflake,
    pub(crate) meta: RwLock<GuildMeta>,
    pub(crate) channels: Store<ChannelState>,
    pub(crate) threads: Store<ThreadState>,
    pub(crate) roles: Store<RoleState>,
    pub(crate) members: Store<MemberState>,
    pub(crate) voice_states: Store<VoiceConnection>,
    pub(crate) stage_instances: Store<StageInstanceState>,
    pub(crate) scheduled_events: Store<ScheduledEventState>,
    pub(crate) emojis: RwLock<Vec<EmojiState>>,
    pub(crate) stickers: RwLock<Vec<StickerState>>,
    pub(crate) config: CacheConfig,
    pub(crate) presences: Arc<dyn PresenceSink>,
    pub(crate) skipped_entities: AtomicU64,
}

impl fmt::Debug for GuildState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuildState")
            .field("id", &self.id)
            .field("name", &self.meta.read().name)
            .field("chunked", &self.chunked())
            .field("member_count", &self.member_count())
            .finish_non_exhaustive()
    }
}

impl GuildState {
    pub(crate) fn bare(
        id: Snowflake,
        config: CacheConfig,
        presences: Arc<dyn PresenceSink>,
    ) -> Self {
        Self {
            id,
            meta: RwLock::new(GuildMeta::default()),
            channels: Store::new(),
            threads: Store::new(),
            roles: Store::new(),
            members: Store::new(),
            voice_states: Store::new(),
            stage_instances: Store::new(),
            scheduled_events: Store::new(),
            emojis: RwLock::new(Vec::new()),
            stickers: RwLock::new(Vec::new()),
            config,
            presences,
            skipped_entities: AtomicU64::new(0),
        }
    }

    // ── Identity ────────────────────────────────────────────────────

    pub fn id(&self) -> Snowflake {
        self.id
    }

    pub fn name(&self) -> String {
        self.meta.read().name.clone()
    }

    /// Cloned copy of all scalar identity fields.
    pub fn meta(&self) -> GuildMeta {
        self.meta.read().clone()
    }

    pub fn has_feature(&self, feature: &str) -> bool {
        self.meta.read().features.iter().any(|f| f == feature)
    }

    pub fn is_unavailable(&self) -> bool {
        self.meta.read().unavailable
    }

    pub fn created_at(&self) -> chrono::DateTime<chrono::Utc> {
        snowflake_time(self.id)
    }

    /// Number of snapshot/event items skipped for unrecognized kinds or
    /// missing ids since construction.
    pub fn skipped_entities(&self) -> u64 {
        self.skipped_entities.load(Ordering::Relaxed)
    }

    pub(crate) fn note_skipped(&self) {
        self.skipped_entities.fetch_add(1, Ordering::Relaxed);
    }

    // ── Channels ────────────────────────────────────────────────────

    pub fn add_channel(&self, channel: ChannelState) {
        self.channels.insert(channel);
    }

    /// Remove a channel along with every thread parented to it.
    ///
    /// Threads are drained first: a concurrent reader may briefly see the
    /// doomed channel with no threads, but never a removed parent with
    /// orphaned children still listed against it.
    pub fn remove_channel(&self, channel_id: Snowflake) -> (Option<ChannelState>, Vec<ThreadState>) {
        let threads = self.threads.drain_matching(|thread| thread.parent_id == channel_id);
        let channel = self.channels.remove(channel_id);
        if channel.is_none() && !threads.is_empty() {
            warn!(
                guild_id = self.id,
                %channel_id,
                count = threads.len(),
                "cascade removed threads of a channel that was not cached"
            );
        }
        (channel, threads)
    }

    pub fn get_channel(&self, channel_id: Snowflake) -> Option<ChannelState> {
        self.channels.get(channel_id)
    }

    /// All channels, unsorted snapshot view.
    pub fn channels(&self) -> SequenceView<ChannelState> {
        self.channels.values()
    }

    /// Channels of one kind in display order.
    pub fn channels_of_kind(&self, kind: ChannelKind) -> Vec<ChannelState> {
        let mut channels: Vec<ChannelState> = self
            .channels
            .snapshot()
            .into_iter()
            .filter(|channel| channel.kind == kind)
            .collect();
        channels.sort_by_key(ChannelState::position_key);
        channels
    }

    pub fn text_channels(&self) -> Vec<ChannelState> {
        self.channels_of_kind(ChannelKind::Text)
    }

    pub fn voice_channels(&self) -> Vec<ChannelState> {
        self.channels_of_kind(ChannelKind::Voice)
    }

    pub fn stage_channels(&self) -> Vec<ChannelState> {
        self.channels_of_kind(ChannelKind::Stage)
    }

    pub fn categories(&self) -> Vec<ChannelState> {
        self.channels_of_kind(ChannelKind::Category)
    }

    pub fn forums(&self) -> Vec<ChannelState> {
        self.channels_of_kind(ChannelKind::Forum)
    }

    /// Every category and its channels, in UI order: categories by
    /// `(position, id)` with uncategorized channels first, channels
    /// within a category by `(kind bucket, position, id)`.
    pub fn by_category(&self) -> Vec<(Option<ChannelState>, Vec<ChannelState>)> {
        let mut grouped: HashMap<Option<Snowflake>, Vec<ChannelState>> = HashMap::new();
        for channel in self.channels.snapshot() {
            if channel.kind == ChannelKind::Category {
                grouped.entry(Some(channel.id)).or_default();
            } else {
                grouped.entry(channel.parent_id).or_default().push(channel);
            }
        }

        let mut listing: Vec<(Option<ChannelState>, Vec<ChannelState>)> = grouped
            .into_iter()
            .map(|(category_id, channels)| {
                (category_id.and_then(|id| self.channels.get(id)), channels)
            })
            .collect();

        // Channels whose parent is unknown (dangling or none) land in the
        // leading `None` group.
        listing.sort_by_key(|(category, _)| match category {
            Some(category) => (i64::from(category.position), category.id),
            None => (-1, 0),
        });
        for (_, channels) in &mut listing {
            channels.sort_by_key(ChannelState::sort_key);
        }
        listing
    }

    /// Channel or thread lookup by one id.
    pub fn get_channel_or_thread(&self, id: Snowflake) -> Option<ChannelOrThread> {
        if let Some(channel) = self.channels.get(id) {
            return Some(ChannelOrThread::Channel(channel));
        }
        self.threads.get(id).map(ChannelOrThread::Thread)
    }

    // ── Threads ─────────────────────────────────────────────────────

    pub fn add_thread(&self, thread: ThreadState) {
        self.threads.insert(thread);
    }

    pub fn remove_thread(&self, thread_id: Snowflake) -> Option<ThreadState> {
        self.threads.remove(thread_id)
    }

    pub fn get_thread(&self, thread_id: Snowflake) -> Option<ThreadState> {
        self.threads.get(thread_id)
    }

    /// All active threads, unsorted snapshot view.
    pub fn threads(&self) -> SequenceView<ThreadState> {
        self.threads.values()
    }

    /// Threads parented to any of `channel_ids`, keyed by thread id.
    pub fn filter_threads(&self, channel_ids: &SnowflakeList) -> HashMap<Snowflake, ThreadState> {
        self.threads
            .snapshot()
            .into_iter()
            .filter(|thread| channel_ids.contains(thread.parent_id))
            .map(|thread| (thread.id, thread))
            .collect()
    }

    // ── Roles ───────────────────────────────────────────────────────

    pub fn add_role(&self, role: RoleState) {
        self.roles.insert(role);
    }

    pub fn remove_role(&self, role_id: Snowflake) -> Option<RoleState> {
        self.roles.remove(role_id)
    }

    pub fn get_role(&self, role_id: Snowflake) -> Option<RoleState> {
        self.roles.get(role_id)
    }

    /// Roles in hierarchy order, lowest first: `(position, id)` ascending.
    pub fn roles(&self) -> SequenceView<RoleState> {
        self.roles.values_sorted_by(|a, b| a.sort_key().cmp(&b.sort_key()))
    }

    /// The base role every member implicitly holds. Its id equals the
    /// guild id; a well-formed snapshot always carries it.
    pub fn default_role(&self) -> Option<RoleState> {
        self.roles.get(self.id)
    }

    /// Permissions granted through the base role, falling back to the
    /// crate baseline if the base role has somehow not arrived yet.
    pub fn base_permissions(&self) -> Permissions {
        self.default_role()
            .map(|role| role.permissions)
            .unwrap_or_else(default_everyone_permissions)
    }

    // ── Members ─────────────────────────────────────────────────────

    /// Insert or replace a member. A presence staged on the entry is
    /// handed to the presence store and cleared.
    pub fn add_member(&self, member: MemberState) {
        let mut member = member;
        if let Some(presence) = member.staged_presence.take() {
            self.presences.store(member.user_id, presence, self.id);
        }
        self.members.insert(member);
    }

    /// Remove a member. Presence eviction is attempted whether or not the
    /// member was cached; the presence store may know users we don't.
    pub fn remove_member(&self, user_id: Snowflake) -> Option<MemberState> {
        let removed = self.members.remove(user_id);
        self.presences.remove(user_id, self.id);
        removed
    }

    pub fn get_member(&self, user_id: Snowflake) -> Option<MemberState> {
        self.members.get(user_id)
    }

    /// All cached members, unsorted snapshot view.
    pub fn members(&self) -> SequenceView<MemberState> {
        self.members.values()
    }

    /// Members currently boosting the guild.
    pub fn premium_subscribers(&self) -> Vec<MemberState> {
        self.members
            .snapshot()
            .into_iter()
            .filter(MemberState::is_boosting)
            .collect()
    }

    // ── Voice states ────────────────────────────────────────────────

    pub fn voice_state_for(&self, user_id: Snowflake) -> Option<VoiceConnection> {
        self.voice_states.get(user_id)
    }

    /// All current voice connections, unsorted snapshot view.
    pub fn voice_states(&self) -> SequenceView<VoiceConnection> {
        self.voice_states.values()
    }

    /// Apply one voice-state payload.
    ///
    /// The payload's channel reference is resolved against the channel
    /// store; a null or dangling reference means "disconnected" and
    /// removes the entry (silently when none exists). Otherwise the
    /// existing entry is updated in place, or a new one inserted. When
    /// the payload embeds member data for a user we don't have, a
    /// minimal member is synthesized and, policy permitting, cached.
    ///
    /// Returns `None` only for a payload with no user id.
    pub fn update_voice_state(&self, payload: &VoiceStatePayload) -> Option<VoiceStateChange> {
        let Some(user_id) = payload.user_id else {
            debug!(guild_id = self.id, "voice-state payload without user id dropped");
            self.note_skipped();
            return None;
        };

        let resolved = payload.channel_id.and_then(|id| self.channels.get(id));
        if let Some(channel_id) = payload.channel_id
            && resolved.is_none()
        {
            debug!(
                guild_id = self.id,
                %user_id,
                %channel_id,
                "voice channel not cached, treating update as disconnect"
            );
        }
        let resolved_id = resolved.map(|channel| channel.id);

        let (before, after) = if resolved_id.is_none() {
            (self.voice_states.remove(user_id), None)
        } else if let Some(existing) = self.voice_states.get(user_id) {
            self.voice_states
                .update(user_id, |entry| entry.update_from(payload, resolved_id));
            (Some(existing), self.voice_states.get(user_id))
        } else {
            let created = VoiceConnection::from_payload(user_id, payload, resolved_id);
            self.voice_states.insert(created.clone());
            (None, Some(created))
        };

        let mut member = self.get_member(user_id);
        if member.is_none()
            && let Some(embedded) = payload.member.as_deref()
            && let Some(synthesized) = MemberState::from_payload(embedded)
        {
            if self.config.cache_voice_members {
                self.add_member(synthesized.clone());
            }
            member = Some(synthesized);
        }

        Some(VoiceStateChange { member, before, after })
    }

    // ── Stage instances ─────────────────────────────────────────────

    pub fn add_stage_instance(&self, stage_instance: StageInstanceState) {
        self.stage_instances.insert(stage_instance);
    }

    pub fn remove_stage_instance(&self, stage_instance_id: Snowflake) -> Option<StageInstanceState> {
        self.stage_instances.remove(stage_instance_id)
    }

    pub fn get_stage_instance(&self, stage_instance_id: Snowflake) -> Option<StageInstanceState> {
        self.stage_instances.get(stage_instance_id)
    }

    pub fn stage_instances(&self) -> SequenceView<StageInstanceState> {
        self.stage_instances.values()
    }

    // ── Scheduled events ────────────────────────────────────────────

    pub fn add_scheduled_event(&self, event: ScheduledEventState) {
        self.scheduled_events.insert(event);
    }

    pub fn remove_scheduled_event(&self, event_id: Snowflake) -> Option<ScheduledEventState> {
        self.scheduled_events.remove(event_id)
    }

    pub fn get_scheduled_event(&self, event_id: Snowflake) -> Option<ScheduledEventState> {
        self.scheduled_events.get(event_id)
    }

    pub fn scheduled_events(&self) -> SequenceView<ScheduledEventState> {
        self.scheduled_events.values()
    }

    // ── Emoji & stickers ────────────────────────────────────────────

    pub fn emojis(&self) -> Vec<EmojiState> {
        self.emojis.read().clone()
    }

    /// Replace the emoji list wholesale, returning the prior list.
    pub(crate) fn set_emojis(&self, emojis: Vec<EmojiState>) -> Vec<EmojiState> {
        std::mem::replace(&mut *self.emojis.write(), emojis)
    }

    pub fn stickers(&self) -> Vec<StickerState> {
        self.stickers.read().clone()
    }

    /// Replace the sticker list wholesale, returning the prior list.
    pub(crate) fn set_stickers(&self, stickers: Vec<StickerState>) -> Vec<StickerState> {
        std::mem::replace(&mut *self.stickers.write(), stickers)
    }

    // ── Derived counters ────────────────────────────────────────────

    /// Member count: authoritative when present, else the platform's
    /// approximation, else unknown.
    pub fn member_count(&self) -> Option<u64> {
        let meta = self.meta.read();
        meta.member_count.or(meta.approximate_member_count)
    }

    /// Online member count, when the platform has reported one.
    pub fn online_count(&self) -> Option<u64> {
        self.meta.read().presence_count
    }

    /// Whether the guild is "large": the platform's flag when present,
    /// else the member count (authoritative, falling back to live store
    /// size) against [`LARGE_GUILD_THRESHOLD`].
    pub fn is_large(&self) -> bool {
        let meta = self.meta.read();
        if let Some(large) = meta.large {
            return large;
        }
        match meta.member_count {
            Some(count) => count >= LARGE_GUILD_THRESHOLD,
            None => self.members.len() as u64 >= LARGE_GUILD_THRESHOLD,
        }
    }

    /// Whether every member is cached: live store size equals the
    /// authoritative count. Always false when no authoritative count has
    /// been delivered.
    pub fn chunked(&self) -> bool {
        match self.meta.read().member_count {
            Some(count) => count == self.members.len() as u64,
            None => false,
        }
    }

    /// Boost tier, 0–3: the explicit tier when present, else the
    /// override feature flag, else derived from the boost count.
    pub fn premium_tier(&self) -> u8 {
        let meta = self.meta.read();
        if let Some(tier) = meta.premium_tier {
            return tier;
        }
        if meta.features.iter().any(|f| f == "PREMIUM_TIER_3_OVERRIDE") {
            return 3;
        }
        match meta.premium_subscription_count {
            0..=1 => 0,
            2..=6 => 1,
            7..=13 => 2,
            _ => 3,
        }
    }

    /// Adjust the authoritative member count, when one is tracked.
    pub(crate) fn bump_member_count(&self, delta: i64) {
        let mut meta = self.meta.write();
        if let Some(count) = meta.member_count {
            meta.member_count = Some(count.saturating_add_signed(delta));
        }
    }
}
