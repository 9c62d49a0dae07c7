//! Native playback and streaming notifications.
//!
//! The SDK reports playback delegate and streaming delegate callbacks on its
//! own callback context. Host adapters translate each callback into one
//! [`NativeNotification`] and hand it to the registered
//! [`NotificationCallback`].

use crate::player::TrackMetadata;

/// One callback from the native player.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeNotification {
    /// Playback started or paused.
    PlaybackStatusChanged { playing: bool },
    /// Playback position jumped, offset in seconds.
    SeekedToOffset { offset: f64 },
    /// Volume changed, `0.0..=1.0`.
    VolumeChanged { volume: f64 },
    ShuffleChanged { shuffle: bool },
    RepeatChanged { repeat: bool },
    /// A different track became current.
    TrackChanged { metadata: Option<TrackMetadata> },
    FailedToPlayTrack { url: Option<String> },
    StartedPlayingTrack { url: Option<String> },
    StoppedPlayingTrack { url: Option<String> },
    SkippedToNextTrack,
    SkippedToPreviousTrack,
    BecameActivePlaybackDevice,
    BecameInactivePlaybackDevice,
    PoppedQueue,
    /// Transient network failure; the SDK retries on its own.
    TemporaryConnectionError,
    StreamError { message: String },
    ReceivedMessage { message: String },
    Disconnected,
}

/// Receives notifications from a native player handle.
///
/// Implementations must be callable from any thread.
pub trait NotificationCallback: Send + Sync {
    fn on_notification(&self, notification: NativeNotification);
}
