//! Hand-written fakes of the bridge traits shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::{
    AuthSession, BridgeError, LoginObserver, NativeNotification, NativePlayerConfig,
    NativePlayerFactory, NotificationCallback, PlayerHandle, SessionCredentials, TrackMetadata,
};
use core_playback::{LifecycleDependencies, PlayerLifecycle};
use core_runtime::config::PlayerConfig;
use core_runtime::events::{EventBus, EventName, PlayerEvent};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

pub const CLIENT_ID: &str = "test-client";

// ============================================================================
// Auth
// ============================================================================

pub struct FakeAuth {
    pub valid: bool,
    pub credentials: Option<SessionCredentials>,
    observers: Mutex<Vec<Arc<dyn LoginObserver>>>,
}

impl FakeAuth {
    pub fn valid() -> Arc<Self> {
        Arc::new(Self {
            valid: true,
            credentials: Some(SessionCredentials::new("BQD8x-token").with_username("listener")),
            observers: Mutex::new(Vec::new()),
        })
    }

    pub fn expired() -> Arc<Self> {
        Arc::new(Self {
            valid: false,
            credentials: None,
            observers: Mutex::new(Vec::new()),
        })
    }

    /// Simulates the auth collaborator signalling a login change.
    pub fn emit_login(&self, logged_in: bool) {
        let observers = self.observers.lock().clone();
        for observer in observers {
            observer.login_changed(logged_in);
        }
    }

    pub fn observer_count(&self) -> usize {
        self.observers.lock().len()
    }
}

#[async_trait]
impl AuthSession for FakeAuth {
    async fn verify(&self) -> BridgeResult<bool> {
        Ok(self.valid)
    }

    fn credentials(&self) -> Option<SessionCredentials> {
        self.credentials.clone()
    }

    fn register_login_observer(&self, observer: Arc<dyn LoginObserver>) {
        self.observers.lock().push(observer);
    }
}

// ============================================================================
// Native player
// ============================================================================

#[derive(Default)]
pub struct FakeHandle {
    pub commands: Mutex<Vec<String>>,
    pub logouts: AtomicUsize,
    pub fail_command: Mutex<Option<(&'static str, String)>>,
    pub fail_logout: bool,
    pub metadata: Mutex<Option<TrackMetadata>>,
    callback: Mutex<Option<Arc<dyn NotificationCallback>>>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
}

impl FakeHandle {
    /// Delivers a notification the way the SDK would, through the registered callback.
    pub fn notify(&self, notification: NativeNotification) {
        let callback = self.callback.lock().clone();
        if let Some(callback) = callback {
            callback.on_notification(notification);
        }
    }

    pub fn has_callback(&self) -> bool {
        self.callback.lock().is_some()
    }

    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().clone()
    }

    pub fn logout_count(&self) -> usize {
        self.logouts.load(Ordering::SeqCst)
    }

    pub fn fail_next(&self, command: &'static str, message: &str) {
        *self.fail_command.lock() = Some((command, message.to_string()));
    }

    /// Holds the command recorded as `entry` (e.g. `"play:<id>"`, `"pause"`)
    /// until the returned gate is notified.
    pub fn gate(&self, entry: &str) -> Arc<Notify> {
        Arc::clone(
            self.gates
                .lock()
                .entry(entry.to_string())
                .or_insert_with(|| Arc::new(Notify::new())),
        )
    }

    async fn run(&self, command: &'static str, entry: String) -> BridgeResult<()> {
        let gate = self.gates.lock().get(&entry).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let mut failure = self.fail_command.lock();
        if let Some((failing, message)) = failure.as_ref() {
            if *failing == command {
                let message = message.clone();
                *failure = None;
                return Err(BridgeError::Native(message));
            }
        }
        self.commands.lock().push(entry);
        Ok(())
    }
}

#[async_trait]
impl PlayerHandle for FakeHandle {
    async fn play(&self, track_id: &str) -> BridgeResult<()> {
        self.run("play", format!("play:{}", track_id)).await
    }

    async fn resume(&self) -> BridgeResult<()> {
        self.run("resume", "resume".to_string()).await
    }

    async fn pause(&self) -> BridgeResult<()> {
        self.run("pause", "pause".to_string()).await
    }

    fn logout(&self) -> BridgeResult<()> {
        self.logouts.fetch_add(1, Ordering::SeqCst);
        if self.fail_logout {
            Err(BridgeError::Native("logout rejected".to_string()))
        } else {
            Ok(())
        }
    }

    fn current_track_metadata(&self) -> Option<TrackMetadata> {
        self.metadata.lock().clone()
    }

    fn register_notification_callback(&self, callback: Arc<dyn NotificationCallback>) {
        *self.callback.lock() = Some(callback);
    }
}

#[derive(Default)]
pub struct FakeFactory {
    pub builds: AtomicUsize,
    pub failure: Mutex<Option<String>>,
    pub fail_logout: bool,
    /// When set, every build waits for one `notify_one`.
    pub gate: Option<Notify>,
    pub configs: Mutex<Vec<NativePlayerConfig>>,
    handles: Mutex<Vec<Arc<FakeHandle>>>,
}

impl FakeFactory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn gated() -> Arc<Self> {
        Arc::new(Self {
            gate: Some(Notify::new()),
            ..Self::default()
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            failure: Mutex::new(Some(message.to_string())),
            ..Self::default()
        })
    }

    pub fn with_failing_logout() -> Arc<Self> {
        Arc::new(Self {
            fail_logout: true,
            ..Self::default()
        })
    }

    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }

    pub fn build_count(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }

    pub fn last_handle(&self) -> Option<Arc<FakeHandle>> {
        self.handles.lock().last().cloned()
    }
}

#[async_trait]
impl NativePlayerFactory for FakeFactory {
    async fn build(&self, config: NativePlayerConfig) -> BridgeResult<Arc<dyn PlayerHandle>> {
        self.builds.fetch_add(1, Ordering::SeqCst);
        self.configs.lock().push(config);

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        if let Some(message) = self.failure.lock().clone() {
            return Err(BridgeError::Native(message));
        }

        let handle = Arc::new(FakeHandle {
            fail_logout: self.fail_logout,
            ..FakeHandle::default()
        });
        self.handles.lock().push(Arc::clone(&handle));
        Ok(handle)
    }
}

// ============================================================================
// Wiring
// ============================================================================

pub fn test_config() -> PlayerConfig {
    PlayerConfig::builder()
        .client_id(CLIENT_ID)
        .build()
        .expect("valid test config")
}

pub fn lifecycle_with(deps: LifecycleDependencies) -> Arc<PlayerLifecycle> {
    PlayerLifecycle::new(test_config(), deps, EventBus::default())
}

pub fn lifecycle_with_config(
    config: PlayerConfig,
    auth: Arc<FakeAuth>,
    factory: Arc<FakeFactory>,
) -> Arc<PlayerLifecycle> {
    PlayerLifecycle::new(
        config,
        LifecycleDependencies::new(auth, factory),
        EventBus::default(),
    )
}

pub fn lifecycle(auth: Arc<FakeAuth>, factory: Arc<FakeFactory>) -> Arc<PlayerLifecycle> {
    lifecycle_with(LifecycleDependencies::new(auth, factory))
}

/// Records every event published on `bus`, in order.
pub fn record_events(bus: &EventBus) -> Arc<Mutex<Vec<PlayerEvent>>> {
    let events = Arc::new(Mutex::new(Vec::new()));
    for name in EventName::ALL {
        let sink = Arc::clone(&events);
        bus.subscribe(name, move |event| sink.lock().push(event.clone()));
    }
    events
}

pub fn event_names(events: &Mutex<Vec<PlayerEvent>>) -> Vec<EventName> {
    events.lock().iter().map(PlayerEvent::name).collect()
}
