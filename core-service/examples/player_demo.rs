//! Player façade walkthrough against an in-memory SDK.
//!
//! Run with:
//! ```bash
//! # Pretty logs (default in debug)
//! cargo run -p core-service --example player_demo
//!
//! # JSON logs
//! cargo run -p core-service --example player_demo -- json
//! ```

use std::env;
use std::sync::Arc;

use async_trait::async_trait;
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::logging::LogLevel;
use bridge_traits::{
    AuthSession, HostAlert, LoginObserver, NativeNotification, NativePlayerConfig,
    NativePlayerFactory, NotificationCallback, PlayerHandle, SessionCredentials, TrackMetadata,
};
use core_runtime::config::PlayerConfig;
use core_runtime::events::{EventName, PlayerEvent};
use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
use core_service::{PlayerDependencies, SpotifyPlayer};
use parking_lot::Mutex;
use tracing::info;

struct DemoAuth {
    observers: Mutex<Vec<Arc<dyn LoginObserver>>>,
}

impl DemoAuth {
    fn logout(&self) {
        let observers = self.observers.lock().clone();
        for observer in observers {
            observer.login_changed(false);
        }
    }
}

#[async_trait]
impl AuthSession for DemoAuth {
    async fn verify(&self) -> BridgeResult<bool> {
        Ok(true)
    }

    fn credentials(&self) -> Option<SessionCredentials> {
        Some(SessionCredentials::new("BQD-demo-token").with_username("demo"))
    }

    fn register_login_observer(&self, observer: Arc<dyn LoginObserver>) {
        self.observers.lock().push(observer);
    }
}

/// Echoes every command back as the notification a real SDK would send.
#[derive(Default)]
struct DemoHandle {
    callback: Mutex<Option<Arc<dyn NotificationCallback>>>,
    track: Mutex<Option<TrackMetadata>>,
}

impl DemoHandle {
    fn emit(&self, notification: NativeNotification) {
        let callback = self.callback.lock().clone();
        if let Some(callback) = callback {
            // The SDK calls back on its own thread.
            std::thread::spawn(move || callback.on_notification(notification));
        }
    }
}

#[async_trait]
impl PlayerHandle for DemoHandle {
    async fn play(&self, track_id: &str) -> BridgeResult<()> {
        let metadata = TrackMetadata {
            track_name: Some("Teardrop".to_string()),
            track_uri: Some(track_id.to_string()),
            artist_name: Some("Massive Attack".to_string()),
            album_uri: Some("spotify:album:mezzanine".to_string()),
            track_duration: Some(330.0),
            ..TrackMetadata::default()
        };
        *self.track.lock() = Some(metadata.clone());
        self.emit(NativeNotification::TrackChanged {
            metadata: Some(metadata),
        });
        self.emit(NativeNotification::PlaybackStatusChanged { playing: true });
        Ok(())
    }

    async fn resume(&self) -> BridgeResult<()> {
        self.emit(NativeNotification::PlaybackStatusChanged { playing: true });
        Ok(())
    }

    async fn pause(&self) -> BridgeResult<()> {
        self.emit(NativeNotification::PlaybackStatusChanged { playing: false });
        Ok(())
    }

    fn logout(&self) -> BridgeResult<()> {
        Ok(())
    }

    fn current_track_metadata(&self) -> Option<TrackMetadata> {
        self.track.lock().clone()
    }

    fn register_notification_callback(&self, callback: Arc<dyn NotificationCallback>) {
        *self.callback.lock() = Some(callback);
    }
}

struct DemoFactory;

#[async_trait]
impl NativePlayerFactory for DemoFactory {
    async fn build(&self, config: NativePlayerConfig) -> BridgeResult<Arc<dyn PlayerHandle>> {
        info!(client_id = %config.client_id, "Building demo player");
        Ok(Arc::new(DemoHandle::default()))
    }
}

struct ConsoleAlert;

impl HostAlert for ConsoleAlert {
    fn alert(&self, message: &str) {
        println!("[alert] {}", message);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let format = match env::args().nth(1).as_deref() {
        Some("json") => LogFormat::Json,
        Some("compact") => LogFormat::Compact,
        _ => LogFormat::Pretty,
    };
    init_logging(
        LoggingConfig::default()
            .with_format(format)
            .with_level(LogLevel::Debug),
    )?;

    let auth = Arc::new(DemoAuth {
        observers: Mutex::new(Vec::new()),
    });
    let deps = PlayerDependencies::builder()
        .auth(auth.clone())
        .factory(Arc::new(DemoFactory))
        .host_alert(Arc::new(ConsoleAlert))
        .build()?;
    let config = PlayerConfig::builder().client_id("demo-client").build()?;
    let player = SpotifyPlayer::new(config, deps)?;

    for name in [
        EventName::PlayerReady,
        EventName::ChangedToTrack,
        EventName::ChangedPlaybackStatus,
    ] {
        player.subscribe(name, |event: &PlayerEvent| {
            println!("[event] {} {}", event.name(), event.payload());
        });
    }

    let logged_in = player.init_player(true).await;
    info!(logged_in, "Session checked");

    let playing = player
        .toggle_play(Some("spotify:track:6VZ9wBbWwCFOaMCcKXMwFF"), None)
        .await?;
    info!(playing, track = ?player.loaded_track(), "Started");

    let playing = player.toggle_play(None, None).await?;
    info!(playing, "Toggled");

    let metadata = player.current_track_metadata();
    info!(track = ?metadata.track_name, artist = ?metadata.artist_name, "Now loaded");

    // Let the SDK threads deliver their notifications.
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    auth.logout();
    info!(state = %player.lifecycle_state(), "Logged out");

    Ok(())
}
