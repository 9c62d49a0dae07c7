//! Album art tracking.
//!
//! Resolves the cover of the current album in the background and publishes
//! `albumArtChange` once it is known. A resolution that completes after the
//! album changed again is dropped.

use bridge_traits::AlbumArtResolver;
use core_runtime::events::{EventBus, PlayerEvent};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

#[derive(Debug, Default)]
struct ArtworkState {
    album_uri: Option<String>,
    art_url: Option<String>,
}

pub struct ArtworkTracker {
    resolver: Option<Arc<dyn AlbumArtResolver>>,
    enabled: bool,
    bus: EventBus,
    state: Arc<Mutex<ArtworkState>>,
    runtime: Option<Handle>,
}

impl ArtworkTracker {
    /// Creates a tracker.
    ///
    /// Captures the current tokio runtime, if any, so resolutions can be
    /// spawned from native callback threads that have none.
    pub fn new(resolver: Option<Arc<dyn AlbumArtResolver>>, enabled: bool, bus: EventBus) -> Self {
        Self {
            resolver,
            enabled,
            bus,
            state: Arc::new(Mutex::new(ArtworkState::default())),
            runtime: Handle::try_current().ok(),
        }
    }

    /// Records the album of a new track and starts resolving its cover.
    ///
    /// Returns the resolution task, or `None` when the album did not change,
    /// resolution is disabled, or no runtime is available.
    pub fn track_changed(&self, album_uri: &str) -> Option<JoinHandle<()>> {
        {
            let mut state = self.state.lock();
            if state.album_uri.as_deref() == Some(album_uri) {
                return None;
            }
            state.album_uri = Some(album_uri.to_string());
            state.art_url = None;
        }

        if !self.enabled {
            return None;
        }
        let resolver = Arc::clone(self.resolver.as_ref()?);
        let Some(runtime) = self.runtime.clone().or_else(|| Handle::try_current().ok()) else {
            debug!(album_uri, "No async runtime available, album art not resolved");
            return None;
        };

        let state = Arc::clone(&self.state);
        let bus = self.bus.clone();
        let album_uri = album_uri.to_string();

        Some(runtime.spawn(async move {
            match resolver.resolve_cover(&album_uri).await {
                Ok(Some(url)) => {
                    let still_current = {
                        let mut state = state.lock();
                        if state.album_uri.as_deref() == Some(album_uri.as_str()) {
                            state.art_url = Some(url.clone());
                            true
                        } else {
                            false
                        }
                    };
                    if still_current {
                        bus.publish(PlayerEvent::AlbumArtChange { url });
                    } else {
                        debug!(album_uri = %album_uri, "Album changed before cover resolved");
                    }
                }
                Ok(None) => debug!(album_uri = %album_uri, "No cover for album"),
                Err(err) => warn!(album_uri = %album_uri, error = %err, "Album art resolution failed"),
            }
        }))
    }

    pub fn current_album(&self) -> Option<String> {
        self.state.lock().album_uri.clone()
    }

    /// Cover URL of the current album, once resolved.
    pub fn current_art(&self) -> Option<String> {
        self.state.lock().art_url.clone()
    }

    pub fn reset(&self) {
        *self.state.lock() = ArtworkState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::BridgeError;
    use core_runtime::events::EventName;
    use mockall::mock;

    mock! {
        pub Resolver {}

        #[async_trait::async_trait]
        impl AlbumArtResolver for Resolver {
            async fn resolve_cover(&self, album_uri: &str) -> bridge_traits::error::Result<Option<String>>;
        }
    }

    fn art_events(bus: &EventBus) -> Arc<Mutex<Vec<String>>> {
        let urls = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&urls);
        bus.subscribe(EventName::AlbumArtChange, move |event| {
            if let PlayerEvent::AlbumArtChange { url } = event {
                sink.lock().push(url.clone());
            }
        });
        urls
    }

    #[tokio::test]
    async fn test_resolves_and_publishes() {
        let mut resolver = MockResolver::new();
        resolver
            .expect_resolve_cover()
            .withf(|album_uri| album_uri == "spotify:album:1")
            .times(1)
            .returning(|_| Ok(Some("https://i.scdn.co/image/1".to_string())));

        let bus = EventBus::default();
        let urls = art_events(&bus);
        let tracker = ArtworkTracker::new(Some(Arc::new(resolver)), true, bus);

        tracker.track_changed("spotify:album:1").unwrap().await.unwrap();

        assert_eq!(*urls.lock(), vec!["https://i.scdn.co/image/1"]);
        assert_eq!(
            tracker.current_art().as_deref(),
            Some("https://i.scdn.co/image/1")
        );
    }

    #[tokio::test]
    async fn test_same_album_is_not_resolved_twice() {
        let mut resolver = MockResolver::new();
        resolver
            .expect_resolve_cover()
            .times(1)
            .returning(|_| Ok(Some("https://i.scdn.co/image/1".to_string())));

        let tracker = ArtworkTracker::new(Some(Arc::new(resolver)), true, EventBus::default());

        tracker.track_changed("spotify:album:1").unwrap().await.unwrap();
        assert!(tracker.track_changed("spotify:album:1").is_none());
    }

    #[tokio::test]
    async fn test_stale_resolution_is_dropped() {
        let mut resolver = MockResolver::new();
        resolver
            .expect_resolve_cover()
            .returning(|album| Ok(Some(format!("https://covers/{}", album))));

        let bus = EventBus::default();
        let urls = art_events(&bus);
        let tracker = ArtworkTracker::new(Some(Arc::new(resolver)), true, bus);

        // The current-thread test runtime does not run the first task before
        // the album changes again.
        let first = tracker.track_changed("spotify:album:1").unwrap();
        let second = tracker.track_changed("spotify:album:2").unwrap();
        first.await.unwrap();
        second.await.unwrap();

        assert_eq!(*urls.lock(), vec!["https://covers/spotify:album:2"]);
        assert_eq!(tracker.current_album().as_deref(), Some("spotify:album:2"));
    }

    #[tokio::test]
    async fn test_failures_are_not_published() {
        let mut resolver = MockResolver::new();
        resolver
            .expect_resolve_cover()
            .returning(|_| Err(BridgeError::OperationFailed("404".to_string())));

        let bus = EventBus::default();
        let urls = art_events(&bus);
        let tracker = ArtworkTracker::new(Some(Arc::new(resolver)), true, bus);

        tracker.track_changed("spotify:album:1").unwrap().await.unwrap();

        assert!(urls.lock().is_empty());
        assert!(tracker.current_art().is_none());
    }

    #[tokio::test]
    async fn test_disabled_or_missing_resolver() {
        let disabled = ArtworkTracker::new(
            Some(Arc::new(MockResolver::new())),
            false,
            EventBus::default(),
        );
        assert!(disabled.track_changed("spotify:album:1").is_none());
        assert_eq!(disabled.current_album().as_deref(), Some("spotify:album:1"));

        let missing = ArtworkTracker::new(None, true, EventBus::default());
        assert!(missing.track_changed("spotify:album:1").is_none());
    }
}
