//! Incremental mutation: one event in, exactly one owned-store operation
//! out (plus the documented channel→thread cascade and explicit presence
//! side-calls).
//!
//! Events arrive from an eventually-consistent stream and may reference
//! entities the cache never saw or already dropped. None of that is an
//! error here: removals of unknown entities are no-ops, updates that
//! embed enough data create the entity, and anything else is dropped
//! with a diagnostic.

use tracing::{debug, warn};

use crate::guild::{GuildState, VoiceStateChange};
use crate::model::{
    ChannelState, EmojiState, MemberState, RoleState, ScheduledEventState, StageInstanceState,
    StickerState, ThreadState,
};
use crate::payload::GuildEvent;

/// What an applied event did to the cache, with pre-mutation copies where
/// a caller would otherwise need to diff against live state.
#[derive(Debug, Clone, PartialEq)]
pub enum StateChange {
    MemberAdded { member: MemberState, cached: bool },
    MemberUpdated { before: Option<MemberState>, member: MemberState },
    MemberRemoved { member: Option<MemberState> },
    ChannelUpserted { before: Option<ChannelState>, channel: ChannelState },
    ChannelRemoved { channel: Option<ChannelState>, threads: Vec<ThreadState> },
    RoleUpserted { before: Option<RoleState>, role: RoleState },
    RoleRemoved { role: Option<RoleState> },
    ThreadUpserted { before: Option<ThreadState>, thread: ThreadState },
    ThreadRemoved { thread: Option<ThreadState> },
    VoiceUpdated(VoiceStateChange),
    StageInstanceUpserted { before: Option<StageInstanceState>, stage_instance: StageInstanceState },
    StageInstanceRemoved { stage_instance: Option<StageInstanceState> },
    ScheduledEventUpserted { before: Option<ScheduledEventState>, event: ScheduledEventState },
    ScheduledEventRemoved { event: Option<ScheduledEventState> },
    EmojisReplaced { before: Vec<EmojiState> },
    StickersReplaced { before: Vec<StickerState> },
    GuildUpdated,
    /// The payload was malformed or referenced nothing we can act on;
    /// the cache is unchanged.
    Dropped,
}

impl GuildState {
    /// Apply one mutation event.
    ///
    /// Events for one guild must be applied in arrival order by a single
    /// logical writer; this method never raises for a plausible-but-stale
    /// event.
    pub fn apply(&self, event: GuildEvent) -> StateChange {
        match event {
            GuildEvent::MemberAdd { member } => {
                let Some(member) = MemberState::from_payload(&member) else {
                    warn!(guild_id = self.id, "member-add payload without user id dropped");
                    self.note_skipped();
                    return StateChange::Dropped;
                };
                // The count tracks the guild, not the cache: it moves even
                // when the admission policy keeps the member out.
                self.bump_member_count(1);
                let in_voice = self.voice_states.contains(member.user_id);
                let cached = self.config.admits_member(member.user_id, in_voice);
                if cached {
                    self.add_member(member.clone());
                }
                StateChange::MemberAdded { member, cached }
            }

            GuildEvent::MemberUpdate { member } => {
                let Some(member) = MemberState::from_payload(&member) else {
                    warn!(guild_id = self.id, "member-update payload without user id dropped");
                    self.note_skipped();
                    return StateChange::Dropped;
                };
                let before = self.get_member(member.user_id);
                let in_voice = self.voice_states.contains(member.user_id);
                if before.is_some() || self.config.admits_member(member.user_id, in_voice) {
                    self.add_member(member.clone());
                    StateChange::MemberUpdated { before, member }
                } else {
                    debug!(
                        guild_id = self.id,
                        user_id = member.user_id,
                        "member-update for an unadmitted member dropped"
                    );
                    StateChange::Dropped
                }
            }

            GuildEvent::MemberRemove { user_id } => {
                self.bump_member_count(-1);
                let member = self.remove_member(user_id);
                StateChange::MemberRemoved { member }
            }

            GuildEvent::ChannelCreate { channel } | GuildEvent::ChannelUpdate { channel } => {
                let Some(channel) = ChannelState::from_payload(&channel) else {
                    warn!(
                        guild_id = self.id,
                        "channel payload with missing id or unknown kind dropped"
                    );
                    self.note_skipped();
                    return StateChange::Dropped;
                };
                let before = self.get_channel(channel.id);
                self.add_channel(channel.clone());
                StateChange::ChannelUpserted { before, channel }
            }

            GuildEvent::ChannelDelete { channel_id } => {
                let (channel, threads) = self.remove_channel(channel_id);
                if channel.is_none() {
                    debug!(guild_id = self.id, %channel_id, "channel-delete for unknown channel");
                }
                StateChange::ChannelRemoved { channel, threads }
            }

            GuildEvent::RoleCreate { role } | GuildEvent::RoleUpdate { role } => {
                let Some(role) = RoleState::from_payload(&role) else {
                    warn!(guild_id = self.id, "role payload without id dropped");
                    self.note_skipped();
                    return StateChange::Dropped;
                };
                let before = self.get_role(role.id);
                self.add_role(role.clone());
                StateChange::RoleUpserted { before, role }
            }

            GuildEvent::RoleDelete { role_id } => {
                let role = self.remove_role(role_id);
                if role.is_none() {
                    // Deletes race with guilds briefly dropping off; stale
                    // deletes are expected traffic.
                    debug!(guild_id = self.id, %role_id, "role-delete for unknown role");
                }
                StateChange::RoleRemoved { role }
            }

            GuildEvent::ThreadCreate { thread } | GuildEvent::ThreadUpdate { thread } => {
                let Some(thread) = ThreadState::from_payload(&thread) else {
                    warn!(guild_id = self.id, "thread payload without id or parent dropped");
                    self.note_skipped();
                    return StateChange::Dropped;
                };
                let before = self.get_thread(thread.id);
                self.add_thread(thread.clone());
                StateChange::ThreadUpserted { before, thread }
            }

            GuildEvent::ThreadDelete { thread_id } => {
                let thread = self.remove_thread(thread_id);
                StateChange::ThreadRemoved { thread }
            }

            GuildEvent::VoiceStateUpdate { voice_state } => {
                match self.update_voice_state(&voice_state) {
                    Some(change) => StateChange::VoiceUpdated(change),
                    None => StateChange::Dropped,
                }
            }

            GuildEvent::StageInstanceCreate { stage_instance }
            | GuildEvent::StageInstanceUpdate { stage_instance } => {
                let Some(stage_instance) = StageInstanceState::from_payload(&stage_instance)
                else {
                    warn!(guild_id = self.id, "stage-instance payload without id dropped");
                    self.note_skipped();
                    return StateChange::Dropped;
                };
                let before = self.get_stage_instance(stage_instance.id);
                self.add_stage_instance(stage_instance.clone());
                StateChange::StageInstanceUpserted { before, stage_instance }
            }

            GuildEvent::StageInstanceDelete { stage_instance_id } => {
                let stage_instance = self.remove_stage_instance(stage_instance_id);
                StateChange::StageInstanceRemoved { stage_instance }
            }

            GuildEvent::ScheduledEventCreate { event }
            | GuildEvent::ScheduledEventUpdate { event } => {
                let Some(event) = ScheduledEventState::from_payload(&event) else {
                    warn!(guild_id = self.id, "scheduled-event payload without id dropped");
                    self.note_skipped();
                    return StateChange::Dropped;
                };
                let before = self.get_scheduled_event(event.id);
                self.add_scheduled_event(event.clone());
                StateChange::ScheduledEventUpserted { before, event }
            }

            GuildEvent::ScheduledEventDelete { event_id } => {
                let event = self.remove_scheduled_event(event_id);
                StateChange::ScheduledEventRemoved { event }
            }

            GuildEvent::EmojisUpdate { emojis } => {
                let parsed = emojis.iter().filter_map(EmojiState::from_payload).collect();
                let before = self.set_emojis(parsed);
                StateChange::EmojisReplaced { before }
            }

            GuildEvent::StickersUpdate { stickers } => {
                let parsed = stickers.iter().filter_map(StickerState::from_payload).collect();
                let before = self.set_stickers(parsed);
                StateChange::StickersReplaced { before }
            }

            GuildEvent::GuildUpdate { guild } => {
                self.meta.write().apply_snapshot(&guild);
                StateChange::GuildUpdated
            }
        }
    }
}
