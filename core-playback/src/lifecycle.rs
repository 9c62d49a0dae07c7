//! # Player Lifecycle
//!
//! Owns the single native player handle: lazy construction, initialization,
//! teardown on logout.
//!
//! ## State Machine
//!
//! ```text
//!                 ensure_ready()             build ok
//!  ┌───────────────┐   ──────>   ┌──────────────┐  ──────>  ┌─────────┐
//!  │ Uninitialized │             │ Initializing │           │  Ready  │
//!  └───────────────┘   <──────   └──────────────┘           └─────────┘
//!          ▲             build err        │ logout               │ logout
//!          │                              ▼                      ▼
//!          │  ensure_ready()        ┌──────────┐   <─────────────┘
//!          └─ ─ ─ ─ ─ ─ ─ ─ ─ ─ ─ ─ │ Disposed │
//!            (behaves as Uninit.)   └──────────┘
//! ```
//!
//! - Only one initialization is in flight. Callers arriving while
//!   `Initializing` await the same shared outcome.
//! - A failed initialization rejects every awaiting caller with
//!   [`PlaybackError::InitializationFailed`], returns to `Uninitialized`, and
//!   is not retried. The session is left untouched.
//! - Logging out while `Initializing` abandons the attempt. If it later
//!   succeeds, the orphan handle is torn down exactly once and its awaiters
//!   get [`PlaybackError::LoginRequired`]. The abandoned build is driven to
//!   completion on the tokio runtime even when every awaiter went away.
//!   Without a runtime, only a remaining awaiter can tear the orphan down.
//!
//! ## Login Changes
//!
//! [`PlayerLifecycle::apply_login_state`] is the single reaction to a login
//! change: it updates the session, disposes the handle on logout, resets the
//! cached playback state and publishes `playerReady`, in one synchronous pass.

use crate::artwork::ArtworkTracker;
use crate::error::{PlaybackError, Result};
use crate::notifications::NotificationAdapter;
use crate::state::SharedPlaybackState;
use bridge_traits::{
    AlbumArtResolver, AuthSession, HostAlert, HostContext, LoginObserver, NativePlayerConfig,
    NativePlayerFactory, NotificationCallback, PlayerHandle,
};
use core_auth::SessionState;
use core_runtime::config::PlayerConfig;
use core_runtime::events::EventBus;
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tokio::runtime::Handle;
use tracing::{debug, error, info, instrument, warn};

/// Observable phase of the player lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LifecycleState {
    Uninitialized,
    Initializing,
    Ready,
    Disposed,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleState::Uninitialized => "uninitialized",
            LifecycleState::Initializing => "initializing",
            LifecycleState::Ready => "ready",
            LifecycleState::Disposed => "disposed",
        };
        f.write_str(name)
    }
}

/// Collaborators the lifecycle drives.
#[derive(Clone)]
pub struct LifecycleDependencies {
    pub auth: Arc<dyn AuthSession>,
    pub factory: Arc<dyn NativePlayerFactory>,
    pub host_context: Option<Arc<dyn HostContext>>,
    pub host_alert: Option<Arc<dyn HostAlert>>,
    pub album_art: Option<Arc<dyn AlbumArtResolver>>,
}

impl LifecycleDependencies {
    /// Required collaborators only; optional ones can be set on the fields.
    pub fn new(auth: Arc<dyn AuthSession>, factory: Arc<dyn NativePlayerFactory>) -> Self {
        Self {
            auth,
            factory,
            host_context: None,
            host_alert: None,
            album_art: None,
        }
    }
}

type InitOutcome = std::result::Result<Arc<dyn PlayerHandle>, String>;
type InitFuture = Shared<BoxFuture<'static, InitOutcome>>;

enum Slot {
    Uninitialized,
    Initializing { attempt: u64, future: InitFuture },
    Ready { attempt: u64, handle: Arc<dyn PlayerHandle> },
    Disposed,
}

impl Slot {
    fn state(&self) -> LifecycleState {
        match self {
            Slot::Uninitialized => LifecycleState::Uninitialized,
            Slot::Initializing { .. } => LifecycleState::Initializing,
            Slot::Ready { .. } => LifecycleState::Ready,
            Slot::Disposed => LifecycleState::Disposed,
        }
    }
}

/// Owner of the native player handle.
pub struct PlayerLifecycle {
    config: PlayerConfig,
    auth: Arc<dyn AuthSession>,
    factory: Arc<dyn NativePlayerFactory>,
    host_context: Option<Arc<dyn HostContext>>,
    host_alert: Option<Arc<dyn HostAlert>>,
    session: SessionState,
    playback: SharedPlaybackState,
    bus: EventBus,
    adapter: Arc<NotificationAdapter>,
    slot: Mutex<Slot>,
    /// Attempts abandoned by a logout whose handle still needs a teardown.
    /// Always locked after `slot`. Whoever removes an id owns the teardown.
    abandoned: Arc<Mutex<HashSet<u64>>>,
    runtime: Option<Handle>,
    attempts: AtomicU64,
    observing_login: AtomicBool,
}

impl PlayerLifecycle {
    pub fn new(config: PlayerConfig, deps: LifecycleDependencies, bus: EventBus) -> Arc<Self> {
        let playback = SharedPlaybackState::new();
        let artwork = ArtworkTracker::new(
            deps.album_art,
            config.features.resolve_album_art,
            bus.clone(),
        );

        Arc::new_cyclic(|lifecycle: &Weak<PlayerLifecycle>| Self {
            adapter: Arc::new(NotificationAdapter::new(
                bus.clone(),
                playback.clone(),
                artwork,
                lifecycle.clone(),
            )),
            config,
            auth: deps.auth,
            factory: deps.factory,
            host_context: deps.host_context,
            host_alert: deps.host_alert,
            session: SessionState::new(),
            playback,
            bus,
            slot: Mutex::new(Slot::Uninitialized),
            abandoned: Arc::new(Mutex::new(HashSet::new())),
            runtime: Handle::try_current().ok(),
            attempts: AtomicU64::new(0),
            observing_login: AtomicBool::new(false),
        })
    }

    /// Subscribes to the auth collaborator's login changes. Idempotent.
    pub fn observe_login(self: &Arc<Self>) {
        if self.observing_login.swap(true, Ordering::SeqCst) {
            return;
        }
        let forwarder = LoginForwarder {
            lifecycle: Arc::downgrade(self),
        };
        self.auth.register_login_observer(Arc::new(forwarder));
        debug!("Login observer registered");
    }

    /// Returns the ready handle, initializing the native player if needed.
    ///
    /// # Errors
    ///
    /// - [`PlaybackError::LoginRequired`] when the session credentials are not
    ///   valid, or the attempt was abandoned by a logout
    /// - [`PlaybackError::InitializationFailed`] with the SDK's message
    #[instrument(skip(self))]
    pub async fn ensure_ready(&self) -> Result<Arc<dyn PlayerHandle>> {
        let (attempt, future) = {
            let mut slot = self.slot.lock();
            match &*slot {
                Slot::Ready { handle, .. } => return Ok(Arc::clone(handle)),
                Slot::Initializing { attempt, future } => {
                    debug!(attempt, "Awaiting in-flight initialization");
                    (*attempt, future.clone())
                }
                Slot::Uninitialized | Slot::Disposed => {
                    if !self.session.credentials_valid() {
                        return Err(PlaybackError::LoginRequired);
                    }
                    let Some(credentials) = self.auth.credentials() else {
                        warn!("Session marked valid but no credentials available");
                        return Err(PlaybackError::LoginRequired);
                    };

                    let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
                    let native_config = NativePlayerConfig {
                        client_id: self.config.client_id.clone(),
                        credentials,
                        host_context: self.host_context.clone(),
                    };
                    let factory = Arc::clone(&self.factory);
                    let future = async move {
                        factory
                            .build(native_config)
                            .await
                            .map_err(|err| err.detail().to_string())
                    }
                    .boxed()
                    .shared();

                    *slot = Slot::Initializing {
                        attempt,
                        future: future.clone(),
                    };
                    info!(attempt, "Initializing native player");
                    (attempt, future)
                }
            }
        };

        let outcome = future.await;
        self.complete_initialization(attempt, outcome)
    }

    /// Applies the outcome of `attempt`. Every awaiter calls this; only the
    /// first one transitions the slot.
    fn complete_initialization(
        &self,
        attempt: u64,
        outcome: InitOutcome,
    ) -> Result<Arc<dyn PlayerHandle>> {
        let mut newly_ready = None;
        let mut orphan = None;

        let result = {
            let mut slot = self.slot.lock();
            let in_flight =
                matches!(&*slot, Slot::Initializing { attempt: current, .. } if *current == attempt);
            let already_ready =
                matches!(&*slot, Slot::Ready { attempt: current, .. } if *current == attempt);

            match outcome {
                Ok(handle) if in_flight => {
                    *slot = Slot::Ready {
                        attempt,
                        handle: Arc::clone(&handle),
                    };
                    info!(attempt, "Native player ready");
                    newly_ready = Some(Arc::clone(&handle));
                    Ok(handle)
                }
                Ok(handle) if already_ready => Ok(handle),
                Ok(handle) => {
                    if self.abandoned.lock().remove(&attempt) {
                        orphan = Some(handle);
                    }
                    Err(PlaybackError::LoginRequired)
                }
                Err(message) => {
                    if in_flight {
                        *slot = Slot::Uninitialized;
                        error!(attempt, error = %message, "Native player initialization failed");
                    } else if self.abandoned.lock().remove(&attempt) {
                        debug!(attempt, error = %message, "Abandoned initialization failed");
                    }
                    Err(PlaybackError::InitializationFailed(message))
                }
            }
        };

        if let Some(handle) = newly_ready {
            let callback: Arc<dyn NotificationCallback> = self.adapter.clone();
            handle.register_notification_callback(callback);
        }

        if let Some(handle) = orphan {
            info!(attempt, "Tearing down player initialized after logout");
            if let Err(err) = handle.logout() {
                warn!(attempt, error = %err, "Native player teardown failed");
            }
        }

        result
    }

    /// Tears down the native player and moves to `Disposed`.
    ///
    /// Teardown errors are logged and ignored.
    pub fn dispose(&self) {
        let previous = {
            let mut slot = self.slot.lock();
            let previous = std::mem::replace(&mut *slot, Slot::Disposed);
            if let Slot::Initializing { attempt, .. } = &previous {
                self.abandoned.lock().insert(*attempt);
            }
            previous
        };

        match previous {
            Slot::Ready { attempt, handle } => {
                info!(attempt, "Tearing down native player");
                if let Err(err) = handle.logout() {
                    warn!(attempt, error = %err, "Native player teardown failed");
                }
            }
            Slot::Initializing { attempt, future } => {
                info!(attempt, "Initialization abandoned on logout");
                self.reap_abandoned(attempt, future);
            }
            Slot::Uninitialized | Slot::Disposed => {}
        }
    }

    /// Drives an abandoned build to completion and tears its handle down,
    /// unless an awaiter gets to it first.
    fn reap_abandoned(&self, attempt: u64, future: InitFuture) {
        let Some(runtime) = Handle::try_current().ok().or_else(|| self.runtime.clone()) else {
            debug!(attempt, "No runtime to reap abandoned initialization");
            return;
        };
        let abandoned = Arc::clone(&self.abandoned);
        runtime.spawn(async move {
            let outcome = future.await;
            if !abandoned.lock().remove(&attempt) {
                return;
            }
            match outcome {
                Ok(handle) => {
                    info!(attempt, "Tearing down player initialized after logout");
                    if let Err(err) = handle.logout() {
                        warn!(attempt, error = %err, "Native player teardown failed");
                    }
                }
                Err(message) => {
                    debug!(attempt, error = %message, "Abandoned initialization failed");
                }
            }
        });
    }

    /// Runs `update` while `handle` is still the ready handle, under the slot
    /// lock so a concurrent logout cannot interleave. Returns `false` without
    /// running it once the handle was disposed or replaced.
    pub fn commit_if_current<F>(&self, handle: &Arc<dyn PlayerHandle>, update: F) -> bool
    where
        F: FnOnce(),
    {
        let slot = self.slot.lock();
        match &*slot {
            Slot::Ready { handle: current, .. } if Arc::ptr_eq(current, handle) => {
                update();
                true
            }
            _ => false,
        }
    }

    /// Reacts to a login change.
    ///
    /// Updates the session; on logout also disposes the player and resets
    /// the cached playback state. Publishes `playerReady` last.
    pub fn apply_login_state(&self, logged_in: bool) {
        info!(logged_in, "Login state changed");
        self.session.apply_login(logged_in);
        if !logged_in {
            self.dispose();
            self.playback.reset();
            self.adapter.reset_track_context();
        }
        self.adapter.publish_login_state(logged_in);
    }

    /// Handles an expired session: logs out and shows the renewal message.
    pub fn expire_session(&self, reason: &str) {
        warn!(reason, "Streaming session expired");
        self.apply_login_state(false);
        match &self.host_alert {
            Some(alert) => alert.alert(&self.config.login_renewal_message),
            None => debug!("No host alert configured, renewal message not shown"),
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.slot.lock().state()
    }

    /// The native handle, if the player is ready.
    pub fn handle(&self) -> Option<Arc<dyn PlayerHandle>> {
        match &*self.slot.lock() {
            Slot::Ready { handle, .. } => Some(Arc::clone(handle)),
            _ => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state(), LifecycleState::Ready)
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn playback_state(&self) -> &SharedPlaybackState {
        &self.playback
    }

    pub fn events(&self) -> &EventBus {
        &self.bus
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    /// Cover art of the current album, once resolved.
    pub fn current_album_art(&self) -> Option<String> {
        self.adapter.current_album_art()
    }

    /// Number of initializations started so far.
    pub fn initialization_attempts(&self) -> u64 {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for PlayerLifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlayerLifecycle")
            .field("state", &self.state())
            .field("session", &self.session)
            .field("attempts", &self.initialization_attempts())
            .finish()
    }
}

/// Forwards login changes to a lifecycle without keeping it alive.
pub struct LoginForwarder {
    lifecycle: Weak<PlayerLifecycle>,
}

impl LoginObserver for LoginForwarder {
    fn login_changed(&self, logged_in: bool) {
        match self.lifecycle.upgrade() {
            Some(lifecycle) => lifecycle.apply_login_state(logged_in),
            None => debug!(logged_in, "Login change after player was dropped"),
        }
    }
}
