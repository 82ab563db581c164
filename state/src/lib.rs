//! In-process guild state cache.
//!
//! Each [`GuildState`] mirrors one guild: membership, channel topology,
//! role hierarchy, voice presence, threads, stage instances, scheduled
//! events and custom emoji/stickers. It is built once from a full
//! [`GuildSnapshot`](payload::GuildSnapshot) and kept correct by applying
//! [`GuildEvent`](payload::GuildEvent)s in arrival order. Events that
//! reference entities the cache never saw, or already dropped, are
//! absorbed rather than raised.
//!
//! Transport is somebody else's job. This crate consumes payloads as
//! data, exposes read accessors and derived queries, and performs no
//! network I/O anywhere.
//!
//! ```no_run
//! use std::sync::Arc;
//! use concord_state::{CacheConfig, GuildState, MemoryPresenceStore};
//! use concord_state::payload::{GuildEvent, GuildSnapshot};
//!
//! # fn snapshot_from_transport() -> GuildSnapshot { GuildSnapshot::default() }
//! # fn next_event() -> GuildEvent { unimplemented!() }
//! let presences = Arc::new(MemoryPresenceStore::new());
//! let guild = GuildState::from_snapshot(
//!     &snapshot_from_transport(),
//!     CacheConfig::default(),
//!     presences,
//! )?;
//!
//! let change = guild.apply(next_event());
//! println!("applied: {change:?}");
//! # Ok::<(), concord_state::SnapshotError>(())
//! ```

pub mod apply;
pub mod config;
pub mod error;
pub mod guild;
pub mod model;
pub mod payload;
pub mod presence;
pub mod sequence;
pub mod snowflake;
pub mod store;

mod snapshot;

pub use apply::StateChange;
pub use config::CacheConfig;
pub use error::SnapshotError;
pub use guild::{ChannelOrThread, GuildMeta, GuildState, LARGE_GUILD_THRESHOLD, VoiceStateChange};
pub use presence::{MemoryPresenceStore, Presence, PresenceSink};
pub use sequence::SequenceView;
pub use snowflake::{Snowflake, SnowflakeList, snowflake_time};
pub use store::{Keyed, Store};
