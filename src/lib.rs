//! Workspace façade crate.
//!
//! Host applications depend on `spotify-playback` and get the player façade
//! plus the types needed to implement the bridge traits, without wiring each
//! workspace crate individually.

pub use core_service::{
    CoreError, PlayerDependencies, PlayerDependenciesBuilder, Result, SpotifyPlayer,
};

pub use core_playback::{LifecycleState, PlaybackError, PlaybackState, ToggleOutcome};
pub use core_runtime::config::{FeatureFlags, PlayerConfig};
pub use core_runtime::events::{EventBus, EventName, EventStream, PlayerEvent, SubscriptionId};
pub use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};

/// Capability traits the host and native SDK implement.
pub use bridge_traits as bridge;
