//! Player façade and dependency wiring.
//!
//! This crate assembles the host-provided bridge implementations (auth
//! session, native player factory, optional alert/context/album-art
//! capabilities) into a [`SpotifyPlayer`], the single entry point a host
//! application talks to.
//!
//! ```ignore
//! use core_service::{PlayerDependencies, SpotifyPlayer};
//! use core_runtime::config::PlayerConfig;
//!
//! let config = PlayerConfig::builder().client_id("my-client-id").build()?;
//! let deps = PlayerDependencies::builder()
//!     .auth(auth)
//!     .factory(factory)
//!     .build()?;
//!
//! let player = SpotifyPlayer::new(config, deps)?;
//! player.init_player(true).await;
//! player.toggle_play(Some("spotify:track:abc"), None).await?;
//! ```

pub mod error;

pub use error::{CoreError, Result};

use std::fmt;
use std::sync::Arc;

use bridge_traits::{
    AlbumArtResolver, AuthSession, HostAlert, HostContext, NativePlayerFactory, TrackMetadata,
};
use core_auth::SessionVerifier;
use core_playback::{
    LifecycleDependencies, LifecycleState, PlaybackController, PlayerLifecycle, ToggleOutcome,
};
use core_runtime::config::PlayerConfig;
use core_runtime::events::{EventBus, EventName, EventStream, PlayerEvent, SubscriptionId};
use tracing::{info, instrument, warn};

/// Aggregated handle to the bridge capabilities the player requires.
#[derive(Clone)]
pub struct PlayerDependencies {
    pub auth: Arc<dyn AuthSession>,
    pub factory: Arc<dyn NativePlayerFactory>,
    pub host_context: Option<Arc<dyn HostContext>>,
    pub host_alert: Option<Arc<dyn HostAlert>>,
    pub album_art: Option<Arc<dyn AlbumArtResolver>>,
}

impl PlayerDependencies {
    /// Construct a bundle from the required capabilities.
    pub fn new(auth: Arc<dyn AuthSession>, factory: Arc<dyn NativePlayerFactory>) -> Self {
        Self {
            auth,
            factory,
            host_context: None,
            host_alert: None,
            album_art: None,
        }
    }

    pub fn builder() -> PlayerDependenciesBuilder {
        PlayerDependenciesBuilder::default()
    }
}

impl From<PlayerDependencies> for LifecycleDependencies {
    fn from(deps: PlayerDependencies) -> Self {
        LifecycleDependencies {
            auth: deps.auth,
            factory: deps.factory,
            host_context: deps.host_context,
            host_alert: deps.host_alert,
            album_art: deps.album_art,
        }
    }
}

/// Builder that fails fast when a required capability is missing.
#[derive(Default)]
pub struct PlayerDependenciesBuilder {
    auth: Option<Arc<dyn AuthSession>>,
    factory: Option<Arc<dyn NativePlayerFactory>>,
    host_context: Option<Arc<dyn HostContext>>,
    host_alert: Option<Arc<dyn HostAlert>>,
    album_art: Option<Arc<dyn AlbumArtResolver>>,
}

impl PlayerDependenciesBuilder {
    pub fn auth(mut self, auth: Arc<dyn AuthSession>) -> Self {
        self.auth = Some(auth);
        self
    }

    pub fn factory(mut self, factory: Arc<dyn NativePlayerFactory>) -> Self {
        self.factory = Some(factory);
        self
    }

    pub fn host_context(mut self, context: Arc<dyn HostContext>) -> Self {
        self.host_context = Some(context);
        self
    }

    pub fn host_alert(mut self, alert: Arc<dyn HostAlert>) -> Self {
        self.host_alert = Some(alert);
        self
    }

    pub fn album_art(mut self, resolver: Arc<dyn AlbumArtResolver>) -> Self {
        self.album_art = Some(resolver);
        self
    }

    /// # Errors
    ///
    /// [`CoreError::CapabilityMissing`] when the auth session or the native
    /// player factory was not provided.
    pub fn build(self) -> Result<PlayerDependencies> {
        let auth = self.auth.ok_or_else(|| {
            CoreError::capability_missing(
                "AuthSession",
                "An auth session is required. Use .auth() to set it.",
            )
        })?;
        let factory = self.factory.ok_or_else(|| {
            CoreError::capability_missing(
                "NativePlayerFactory",
                "A native player factory is required. Use .factory() to set it.",
            )
        })?;

        Ok(PlayerDependencies {
            auth,
            factory,
            host_context: self.host_context,
            host_alert: self.host_alert,
            album_art: self.album_art,
        })
    }
}

/// Primary façade exposed to host applications.
///
/// Cheap to clone; clones share the same player.
#[derive(Clone)]
pub struct SpotifyPlayer {
    inner: Arc<PlayerInner>,
}

struct PlayerInner {
    lifecycle: Arc<PlayerLifecycle>,
    controller: PlaybackController,
    verifier: SessionVerifier,
    bus: EventBus,
}

impl SpotifyPlayer {
    /// Create a player. Nothing native is built until the first play.
    ///
    /// # Errors
    ///
    /// [`CoreError::Runtime`] when the configuration is invalid.
    pub fn new(config: PlayerConfig, deps: PlayerDependencies) -> Result<Self> {
        config.validate()?;

        let bus = EventBus::new(config.event_buffer_size);
        let verifier = SessionVerifier::new(Arc::clone(&deps.auth));
        let lifecycle = PlayerLifecycle::new(config, deps.into(), bus.clone());
        let controller = PlaybackController::new(Arc::clone(&lifecycle));

        Ok(Self {
            inner: Arc::new(PlayerInner {
                lifecycle,
                controller,
                verifier,
                bus,
            }),
        })
    }

    /// Verifies the current session and starts tracking login changes.
    ///
    /// With `emit_events` off the bus stays silent; internal state is still
    /// kept up to date. A failed verification counts as logged out.
    /// Returns whether the session is logged in.
    #[instrument(skip(self))]
    pub async fn init_player(&self, emit_events: bool) -> bool {
        let inner = &self.inner;
        inner.bus.set_enabled(emit_events);
        inner.lifecycle.observe_login();

        let logged_in = match inner.verifier.verify().await {
            Ok(logged_in) => logged_in,
            Err(err) => {
                warn!(error = %err, "Session verification failed, treating as logged out");
                false
            }
        };

        inner.lifecycle.apply_login_state(logged_in);
        info!(logged_in, "Player initialized");
        logged_in
    }

    pub fn is_logged_in(&self) -> bool {
        self.inner.lifecycle.session().is_logged_in()
    }

    /// Starts `track_id` when it differs from the loaded track, otherwise
    /// toggles (or forces) playback. Resolves to the resulting playing flag.
    ///
    /// With no player yet and no loaded track this resolves without doing
    /// anything.
    ///
    /// # Errors
    ///
    /// [`CoreError::Playback`] when logged out, when the native player cannot
    /// be built, or when the SDK rejects the command.
    pub async fn toggle_play(&self, track_id: Option<&str>, force: Option<bool>) -> Result<bool> {
        let outcome = self.inner.controller.toggle(track_id, force).await?;
        Ok(match outcome {
            ToggleOutcome::Started | ToggleOutcome::Resumed => true,
            ToggleOutcome::Paused => false,
            ToggleOutcome::NoOp => self.is_playing(),
        })
    }

    /// Loads and plays `track_id`.
    pub async fn play(&self, track_id: &str) -> Result<()> {
        self.inner.controller.play(track_id).await?;
        Ok(())
    }

    /// Cached playing flag.
    pub fn is_playing(&self) -> bool {
        self.inner.controller.is_playing()
    }

    pub fn loaded_track(&self) -> Option<String> {
        self.inner.controller.loaded_track()
    }

    /// Metadata of the current track; all fields empty before anything loads.
    pub fn current_track_metadata(&self) -> TrackMetadata {
        self.inner.controller.current_track_metadata()
    }

    pub fn lifecycle_state(&self) -> LifecycleState {
        self.inner.lifecycle.state()
    }

    pub fn current_album_art(&self) -> Option<String> {
        self.inner.lifecycle.current_album_art()
    }

    // ========================================================================
    // Event subscription
    // ========================================================================

    /// Registers `handler` for one event name. Handlers run synchronously on
    /// the publishing thread.
    pub fn subscribe<F>(&self, name: EventName, handler: F) -> SubscriptionId
    where
        F: Fn(&PlayerEvent) + Send + Sync + 'static,
    {
        self.inner.bus.subscribe(name, handler)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.bus.unsubscribe(id)
    }

    /// Async stream of every published event.
    pub fn subscribe_stream(&self) -> EventStream {
        self.inner.bus.subscribe_stream()
    }

    pub fn events(&self) -> &EventBus {
        &self.inner.bus
    }
}

impl fmt::Debug for SpotifyPlayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpotifyPlayer")
            .field("lifecycle", &self.inner.lifecycle)
            .field("loaded_track", &self.loaded_track())
            .field("is_playing", &self.is_playing())
            .finish()
    }
}
