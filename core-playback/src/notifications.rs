//! # Notification Adapter
//!
//! Translates native player callbacks into [`PlayerEvent`] publications.
//!
//! Every native notification produces exactly one publication, after the
//! internal state it affects has been updated. The adapter runs on whatever
//! thread the SDK calls back on and publishes from there.
//!
//! | Native notification            | Event                       |
//! |--------------------------------|-----------------------------|
//! | `PlaybackStatusChanged`        | `changedPlaybackStatus`     |
//! | `SeekedToOffset`               | `seekedToOffset`            |
//! | `VolumeChanged`                | `changedVolume`             |
//! | `ShuffleChanged`               | `changedShuffleStatus`      |
//! | `RepeatChanged`                | `changedRepeatStatus`       |
//! | `TrackChanged`                 | `changedToTrack`            |
//! | `FailedToPlayTrack`            | `failedToPlayTrack`         |
//! | `StartedPlayingTrack`          | `startedPlayingTrack`       |
//! | `StoppedPlayingTrack`          | `stoppedPlayingTrack`       |
//! | `SkippedToNextTrack`           | `skippedToNextTrack`        |
//! | `SkippedToPreviousTrack`       | `skippedToPreviousTrack`    |
//! | `BecameActivePlaybackDevice`   | `activePlaybackDevice`      |
//! | `BecameInactivePlaybackDevice` | `inactivePlaybackDevice`    |
//! | `PoppedQueue`                  | `poppedQueue`               |
//! | `TemporaryConnectionError`     | `temporaryConnectionError`  |
//! | `StreamError`                  | `streamError`               |
//! | `ReceivedMessage`              | `receivedMessage`           |
//! | `Disconnected`                 | `streamDisconnected`        |
//!
//! `playerReady` and `albumArtChange` have no native counterpart; they are
//! published on login changes and when a cover resolves.

use crate::artwork::ArtworkTracker;
use crate::lifecycle::PlayerLifecycle;
use crate::state::SharedPlaybackState;
use bridge_traits::{NativeNotification, NotificationCallback};
use core_auth::is_login_error;
use core_runtime::events::{EventBus, PlayerEvent};
use std::sync::Weak;
use tracing::{debug, trace};

pub struct NotificationAdapter {
    bus: EventBus,
    playback: SharedPlaybackState,
    artwork: ArtworkTracker,
    lifecycle: Weak<PlayerLifecycle>,
}

impl NotificationAdapter {
    pub fn new(
        bus: EventBus,
        playback: SharedPlaybackState,
        artwork: ArtworkTracker,
        lifecycle: Weak<PlayerLifecycle>,
    ) -> Self {
        Self {
            bus,
            playback,
            artwork,
            lifecycle,
        }
    }

    /// Publishes `playerReady` for the given login state.
    pub fn publish_login_state(&self, logged_in: bool) {
        self.bus.publish(PlayerEvent::PlayerReady { logged_in });
    }

    /// Forgets the current album and its art.
    pub fn reset_track_context(&self) {
        self.artwork.reset();
    }

    pub fn current_album_art(&self) -> Option<String> {
        self.artwork.current_art()
    }

    /// Applies the state change a notification implies and returns the event
    /// to publish for it.
    fn translate(&self, notification: NativeNotification) -> PlayerEvent {
        match notification {
            NativeNotification::PlaybackStatusChanged { playing } => {
                self.playback.set_playing(playing);
                PlayerEvent::ChangedPlaybackStatus { playing }
            }
            NativeNotification::SeekedToOffset { offset } => PlayerEvent::SeekedToOffset { offset },
            NativeNotification::VolumeChanged { volume } => PlayerEvent::ChangedVolume { volume },
            NativeNotification::ShuffleChanged { shuffle } => {
                PlayerEvent::ChangedShuffleStatus { shuffle }
            }
            NativeNotification::RepeatChanged { repeat } => {
                PlayerEvent::ChangedRepeatStatus { repeat }
            }
            NativeNotification::TrackChanged { metadata } => {
                if let Some(album_uri) = metadata.as_ref().and_then(|m| m.album_uri.as_deref()) {
                    self.artwork.track_changed(album_uri);
                }
                PlayerEvent::ChangedToTrack { metadata }
            }
            NativeNotification::FailedToPlayTrack { url } => PlayerEvent::FailedToPlayTrack { url },
            NativeNotification::StartedPlayingTrack { url } => {
                PlayerEvent::StartedPlayingTrack { url }
            }
            NativeNotification::StoppedPlayingTrack { url } => {
                PlayerEvent::StoppedPlayingTrack { url }
            }
            NativeNotification::SkippedToNextTrack => PlayerEvent::SkippedToNextTrack,
            NativeNotification::SkippedToPreviousTrack => PlayerEvent::SkippedToPreviousTrack,
            NativeNotification::BecameActivePlaybackDevice => PlayerEvent::ActivePlaybackDevice,
            NativeNotification::BecameInactivePlaybackDevice => {
                PlayerEvent::InactivePlaybackDevice
            }
            NativeNotification::PoppedQueue => PlayerEvent::PoppedQueue,
            NativeNotification::TemporaryConnectionError => PlayerEvent::TemporaryConnectionError,
            NativeNotification::StreamError { message } => {
                if is_login_error(&message) {
                    match self.lifecycle.upgrade() {
                        Some(lifecycle) => lifecycle.expire_session(&message),
                        None => debug!("Session expired after player was dropped"),
                    }
                }
                PlayerEvent::StreamError { error: message }
            }
            NativeNotification::ReceivedMessage { message } => {
                PlayerEvent::ReceivedMessage { message }
            }
            NativeNotification::Disconnected => PlayerEvent::StreamDisconnected,
        }
    }
}

impl NotificationCallback for NotificationAdapter {
    fn on_notification(&self, notification: NativeNotification) {
        trace!(?notification, "Native notification");
        let event = self.translate(notification);
        self.bus.publish(event);
    }
}
