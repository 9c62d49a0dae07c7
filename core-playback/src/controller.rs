//! # Playback Controller
//!
//! Play/toggle contract on top of [`PlayerLifecycle`].
//!
//! The controller keeps the cached [`PlaybackState`](crate::state::PlaybackState)
//! in step with the commands it issues. It never publishes events; playback
//! events come from the native player through the notification adapter.
//!
//! ## Ordering
//!
//! With `serialize_commands` enabled (the default) commands run one at a
//! time in arrival order. Disabled, overlapping commands race and the last
//! one to complete determines the cached state.
//!
//! A command that completes after a logout disposed its player leaves the
//! cached state alone and fails with [`PlaybackError::LoginRequired`].

use crate::error::{PlaybackError, Result};
use crate::lifecycle::PlayerLifecycle;
use crate::state::SharedPlaybackState;
use bridge_traits::TrackMetadata;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info, instrument, warn};

/// What a toggle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ToggleOutcome {
    /// A different track was requested and started.
    Started,
    Resumed,
    Paused,
    /// Nothing to toggle: no player yet, or no loaded track.
    NoOp,
}

pub struct PlaybackController {
    lifecycle: Arc<PlayerLifecycle>,
    commands: Mutex<()>,
    serialize: bool,
}

impl PlaybackController {
    pub fn new(lifecycle: Arc<PlayerLifecycle>) -> Self {
        let serialize = lifecycle.config().features.serialize_commands;
        Self {
            lifecycle,
            commands: Mutex::new(()),
            serialize,
        }
    }

    fn state(&self) -> &SharedPlaybackState {
        self.lifecycle.playback_state()
    }

    async fn command_slot(&self) -> Option<MutexGuard<'_, ()>> {
        if self.serialize {
            Some(self.commands.lock().await)
        } else {
            None
        }
    }

    /// Loads and plays `track_id`, initializing the player on first use.
    ///
    /// # Errors
    ///
    /// - [`PlaybackError::LoginRequired`] when logged out
    /// - [`PlaybackError::InitializationFailed`] when the player cannot be built
    /// - [`PlaybackError::CommandFailed`] when the SDK rejects the command
    #[instrument(skip(self))]
    pub async fn play(&self, track_id: &str) -> Result<()> {
        let _slot = self.command_slot().await;
        self.play_track(track_id).await
    }

    async fn play_track(&self, track_id: &str) -> Result<()> {
        if !self.lifecycle.session().is_logged_in() {
            return Err(PlaybackError::LoginRequired);
        }

        let handle = self.lifecycle.ensure_ready().await?;
        handle
            .play(track_id)
            .await
            .map_err(|err| PlaybackError::command_failed("play", err))?;

        if !self
            .lifecycle
            .commit_if_current(&handle, || self.state().mark_playing(track_id))
        {
            warn!(track_id, "Player disposed while starting playback");
            return Err(PlaybackError::LoginRequired);
        }
        info!(track_id, "Playing track");
        Ok(())
    }

    /// Toggles playback, or starts `track_id` if it differs from the loaded
    /// track. `force` picks the target state instead of flipping it.
    #[instrument(skip(self))]
    pub async fn toggle(&self, track_id: Option<&str>, force: Option<bool>) -> Result<ToggleOutcome> {
        let _slot = self.command_slot().await;
        let current = self.state().snapshot();

        if let Some(track_id) = track_id {
            if current.loaded_track_id.as_deref() != Some(track_id) {
                self.play_track(track_id).await?;
                return Ok(ToggleOutcome::Started);
            }
        }

        let Some(handle) = self.lifecycle.handle() else {
            debug!("Toggle without a player");
            return Ok(ToggleOutcome::NoOp);
        };
        if current.loaded_track_id.is_none() {
            debug!("Toggle without a loaded track");
            return Ok(ToggleOutcome::NoOp);
        }

        let target = force.unwrap_or(!current.is_playing);
        let outcome = if target {
            handle
                .resume()
                .await
                .map_err(|err| PlaybackError::command_failed("resume", err))?;
            ToggleOutcome::Resumed
        } else {
            handle
                .pause()
                .await
                .map_err(|err| PlaybackError::command_failed("pause", err))?;
            ToggleOutcome::Paused
        };

        if !self.lifecycle.commit_if_current(&handle, || {
            self.state().set_playing(target);
        }) {
            warn!(?outcome, "Player disposed while toggling playback");
            return Err(PlaybackError::LoginRequired);
        }
        debug!(?outcome, "Toggled playback");
        Ok(outcome)
    }

    /// Cached playing flag; not a live query of the native player.
    pub fn is_playing(&self) -> bool {
        self.state().is_playing()
    }

    pub fn loaded_track(&self) -> Option<String> {
        self.state().loaded_track()
    }

    /// Metadata of the current track, or an all-empty record when the player
    /// is not ready or exposes none.
    pub fn current_track_metadata(&self) -> TrackMetadata {
        self.lifecycle
            .handle()
            .and_then(|handle| handle.current_track_metadata())
            .unwrap_or_default()
    }

    pub fn lifecycle(&self) -> &Arc<PlayerLifecycle> {
        &self.lifecycle
    }
}
