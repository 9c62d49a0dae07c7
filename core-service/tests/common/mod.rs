//! In-memory bridge collaborators for the façade scenarios.

#![allow(dead_code)]

use async_trait::async_trait;
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::{
    AuthSession, BridgeError, LoginObserver, NativeNotification, NativePlayerConfig,
    NativePlayerFactory, NotificationCallback, PlayerHandle, SessionCredentials, TrackMetadata,
};
use core_runtime::config::PlayerConfig;
use core_runtime::events::{EventBus, EventName, PlayerEvent};
use core_service::{PlayerDependencies, SpotifyPlayer};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub const TRACK: &str = "spotify:track:abc";

pub struct StubAuth {
    verify_result: Mutex<BridgeResult<bool>>,
    pub verify_calls: AtomicUsize,
    observers: Mutex<Vec<Arc<dyn LoginObserver>>>,
}

impl StubAuth {
    pub fn verifying(result: BridgeResult<bool>) -> Arc<Self> {
        Arc::new(Self {
            verify_result: Mutex::new(result),
            verify_calls: AtomicUsize::new(0),
            observers: Mutex::new(Vec::new()),
        })
    }

    pub fn logged_in() -> Arc<Self> {
        Self::verifying(Ok(true))
    }

    pub fn emit_login(&self, logged_in: bool) {
        let observers = self.observers.lock().clone();
        for observer in observers {
            observer.login_changed(logged_in);
        }
    }
}

#[async_trait]
impl AuthSession for StubAuth {
    async fn verify(&self) -> BridgeResult<bool> {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        self.verify_result.lock().clone()
    }

    fn credentials(&self) -> Option<SessionCredentials> {
        Some(SessionCredentials::new("BQD8x-token"))
    }

    fn register_login_observer(&self, observer: Arc<dyn LoginObserver>) {
        self.observers.lock().push(observer);
    }
}

#[derive(Default)]
pub struct StubHandle {
    pub commands: Mutex<Vec<String>>,
    pub logouts: AtomicUsize,
    pub metadata: Mutex<Option<TrackMetadata>>,
    callback: Mutex<Option<Arc<dyn NotificationCallback>>>,
}

impl StubHandle {
    pub fn notify(&self, notification: NativeNotification) {
        let callback = self.callback.lock().clone();
        if let Some(callback) = callback {
            callback.on_notification(notification);
        }
    }

    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().clone()
    }
}

#[async_trait]
impl PlayerHandle for StubHandle {
    async fn play(&self, track_id: &str) -> BridgeResult<()> {
        self.commands.lock().push(format!("play:{}", track_id));
        Ok(())
    }

    async fn resume(&self) -> BridgeResult<()> {
        self.commands.lock().push("resume".to_string());
        Ok(())
    }

    async fn pause(&self) -> BridgeResult<()> {
        self.commands.lock().push("pause".to_string());
        Ok(())
    }

    fn logout(&self) -> BridgeResult<()> {
        self.logouts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn current_track_metadata(&self) -> Option<TrackMetadata> {
        self.metadata.lock().clone()
    }

    fn register_notification_callback(&self, callback: Arc<dyn NotificationCallback>) {
        *self.callback.lock() = Some(callback);
    }
}

#[derive(Default)]
pub struct StubFactory {
    pub failure: Option<String>,
    handles: Mutex<Vec<Arc<StubHandle>>>,
}

impl StubFactory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            failure: Some(message.to_string()),
            ..Self::default()
        })
    }

    pub fn build_count(&self) -> usize {
        self.handles.lock().len()
    }

    pub fn last_handle(&self) -> Option<Arc<StubHandle>> {
        self.handles.lock().last().cloned()
    }
}

#[async_trait]
impl NativePlayerFactory for StubFactory {
    async fn build(&self, _config: NativePlayerConfig) -> BridgeResult<Arc<dyn PlayerHandle>> {
        if let Some(message) = &self.failure {
            return Err(BridgeError::Native(message.clone()));
        }
        let handle = Arc::new(StubHandle::default());
        self.handles.lock().push(Arc::clone(&handle));
        Ok(handle)
    }
}

pub fn config() -> PlayerConfig {
    PlayerConfig::builder()
        .client_id("test-client")
        .build()
        .expect("valid test config")
}

pub fn player(auth: Arc<StubAuth>, factory: Arc<StubFactory>) -> SpotifyPlayer {
    let deps = PlayerDependencies::builder()
        .auth(auth)
        .factory(factory)
        .build()
        .expect("complete dependencies");
    SpotifyPlayer::new(config(), deps).expect("valid player")
}

pub fn record_events(bus: &EventBus) -> Arc<Mutex<Vec<PlayerEvent>>> {
    let events = Arc::new(Mutex::new(Vec::new()));
    for name in EventName::ALL {
        let sink = Arc::clone(&events);
        bus.subscribe(name, move |event| sink.lock().push(event.clone()));
    }
    events
}
