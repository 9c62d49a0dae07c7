//! Cached playback state.
//!
//! The core does not query the native player for its status. It keeps a
//! mirror that playback commands and native status notifications update.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// What is loaded and whether it plays.
///
/// `is_playing` implies `loaded_track_id.is_some()`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackState {
    pub loaded_track_id: Option<String>,
    pub is_playing: bool,
}

/// [`PlaybackState`] shared between the controller and the notification
/// adapter. Clones observe the same state.
#[derive(Debug, Clone, Default)]
pub struct SharedPlaybackState {
    inner: Arc<RwLock<PlaybackState>>,
}

impl SharedPlaybackState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> PlaybackState {
        self.inner.read().clone()
    }

    pub fn loaded_track(&self) -> Option<String> {
        self.inner.read().loaded_track_id.clone()
    }

    pub fn is_playing(&self) -> bool {
        self.inner.read().is_playing
    }

    /// Records that `track_id` was loaded and started.
    pub fn mark_playing(&self, track_id: &str) {
        let mut state = self.inner.write();
        state.loaded_track_id = Some(track_id.to_string());
        state.is_playing = true;
    }

    /// Sets the playing flag and returns the value actually stored.
    ///
    /// Without a loaded track the flag stays `false`.
    pub fn set_playing(&self, playing: bool) -> bool {
        let mut state = self.inner.write();
        let applied = playing && state.loaded_track_id.is_some();
        if applied != playing {
            debug!("Ignoring playing=true without a loaded track");
        }
        state.is_playing = applied;
        applied
    }

    /// Clears the loaded track and stops playing.
    pub fn reset(&self) {
        *self.inner.write() = PlaybackState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_playing() {
        let state = SharedPlaybackState::new();
        state.mark_playing("spotify:track:abc");

        assert_eq!(state.loaded_track().as_deref(), Some("spotify:track:abc"));
        assert!(state.is_playing());
    }

    #[test]
    fn test_playing_requires_loaded_track() {
        let state = SharedPlaybackState::new();

        assert!(!state.set_playing(true));
        assert_eq!(state.snapshot(), PlaybackState::default());

        state.mark_playing("spotify:track:abc");
        assert!(!state.set_playing(false));
        assert!(state.set_playing(true));
    }

    #[test]
    fn test_clones_share_state() {
        let state = SharedPlaybackState::new();
        let view = state.clone();

        state.mark_playing("spotify:track:abc");
        assert!(view.is_playing());

        view.reset();
        assert!(!state.is_playing());
        assert!(state.loaded_track().is_none());
    }
}
