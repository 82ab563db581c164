//! Entity value types held by the guild's stores.
//!
//! These are plain data: cloned out of the cache on read, replaced through
//! their owning store on write. Raw numeric enum values arriving in
//! payloads are preserved through `Unknown` variants rather than rejected,
//! so an unrecognized level never drops the entity carrying it.

mod channel;
mod emoji;
mod member;
mod role;
mod scheduled_event;
mod stage;
mod thread;
mod voice;

pub use channel::{ChannelKind, ChannelState};
pub use emoji::{EmojiState, StickerState};
pub use member::MemberState;
pub use role::{Permissions, RoleState, default_everyone_permissions};
pub use scheduled_event::{ScheduledEventState, ScheduledEventStatus};
pub use stage::StageInstanceState;
pub use thread::ThreadState;
pub use voice::VoiceConnection;

macro_rules! raw_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident = $value:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
        pub enum $name {
            #[default]
            $($variant,)+
            Unknown(u8),
        }

        impl $name {
            pub fn from_raw(raw: u8) -> Self {
                match raw {
                    $($value => Self::$variant,)+
                    other => Self::Unknown(other),
                }
            }

            pub fn raw(self) -> u8 {
                match self {
                    $(Self::$variant => $value,)+
                    Self::Unknown(other) => other,
                }
            }
        }
    };
}

raw_enum! {
    /// How much verification the guild demands before members can talk.
    VerificationLevel {
        None = 0,
        Low = 1,
        Medium = 2,
        High = 3,
        Highest = 4,
    }
}

raw_enum! {
    /// Default message-notification setting.
    NotificationLevel {
        AllMessages = 0,
        OnlyMentions = 1,
    }
}

raw_enum! {
    /// Explicit-content scanning scope.
    ContentFilter {
        Disabled = 0,
        NoRole = 1,
        AllMembers = 2,
    }
}

raw_enum! {
    /// Guild-wide age-restriction designation.
    NsfwLevel {
        Default = 0,
        Explicit = 1,
        Safe = 2,
        AgeRestricted = 3,
    }
}

raw_enum! {
    /// Whether moderation actions require multi-factor auth.
    MfaLevel {
        None = 0,
        Elevated = 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_raw_values_round_trip() {
        assert_eq!(VerificationLevel::from_raw(3), VerificationLevel::High);
        assert_eq!(VerificationLevel::High.raw(), 3);
        assert_eq!(ContentFilter::from_raw(2), ContentFilter::AllMembers);
        assert_eq!(MfaLevel::from_raw(1), MfaLevel::Elevated);
    }

    #[test]
    fn test_unknown_raw_values_are_preserved() {
        let level = NotificationLevel::from_raw(9);
        assert_eq!(level, NotificationLevel::Unknown(9));
        assert_eq!(level.raw(), 9);
    }

    #[test]
    fn test_defaults() {
        assert_eq!(VerificationLevel::default(), VerificationLevel::None);
        assert_eq!(NsfwLevel::default(), NsfwLevel::Default);
    }
}
