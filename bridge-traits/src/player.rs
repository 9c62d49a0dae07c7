//! Native player capabilities.
//!
//! These abstractions let the core drive the streaming SDK's player without
//! knowing how it decodes, buffers or authenticates. Host applications wrap
//! the SDK's player object in a [`PlayerHandle`] and its builder in a
//! [`NativePlayerFactory`].

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::host::HostContext;
use crate::notification::NotificationCallback;
use crate::session::SessionCredentials;

/// Snapshot of the currently loaded track as reported by the native player.
///
/// Every field is optional: all of them stay `None` until a track is loaded
/// and the SDK supports metadata introspection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackMetadata {
    pub album_name: Option<String>,
    pub album_uri: Option<String>,
    pub artist_name: Option<String>,
    pub artist_uri: Option<String>,
    /// Track duration in seconds.
    pub track_duration: Option<f64>,
    pub track_name: Option<String>,
    pub track_uri: Option<String>,
}

impl TrackMetadata {
    /// Returns `true` when no field is populated.
    pub fn is_empty(&self) -> bool {
        self == &TrackMetadata::default()
    }
}

/// Everything the native SDK needs to build a player.
#[derive(Clone)]
pub struct NativePlayerConfig {
    /// Application client id registered with the streaming service.
    pub client_id: String,
    /// Credentials of the session the player is bound to.
    pub credentials: SessionCredentials,
    /// Host activity/context the SDK attaches to, when the platform needs one.
    pub host_context: Option<Arc<dyn HostContext>>,
}

impl std::fmt::Debug for NativePlayerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativePlayerConfig")
            .field("client_id", &self.client_id)
            .field("credentials", &self.credentials)
            .field(
                "host_context",
                &self.host_context.as_ref().map(|ctx| ctx.describe()),
            )
            .finish()
    }
}

/// An initialized native player instance.
///
/// Playback commands are round-trips to the SDK and therefore async. Teardown
/// is synchronous so logout can complete within a single notification pass.
#[async_trait]
pub trait PlayerHandle: Send + Sync {
    /// Start playing the given track URI.
    async fn play(&self, track_id: &str) -> Result<()>;

    /// Resume the paused track.
    async fn resume(&self) -> Result<()>;

    /// Pause the current track.
    async fn pause(&self) -> Result<()>;

    /// Log the player out and release native resources.
    fn logout(&self) -> Result<()>;

    /// Metadata of the current track; `None` when nothing is loaded or the
    /// SDK does not expose metadata.
    fn current_track_metadata(&self) -> Option<TrackMetadata> {
        None
    }

    /// Install the callback that receives playback and streaming
    /// notifications for this handle.
    fn register_notification_callback(&self, callback: Arc<dyn NotificationCallback>);
}

/// Builds native player handles.
#[async_trait]
pub trait NativePlayerFactory: Send + Sync {
    /// Build and initialize a player. Resolves once the SDK reports the player
    /// initialized, or fails with the SDK's error message.
    async fn build(&self, config: NativePlayerConfig) -> Result<Arc<dyn PlayerHandle>>;
}

/// Resolves album cover art for an album URI.
#[async_trait]
pub trait AlbumArtResolver: Send + Sync {
    /// URL of the largest available cover, `None` when the album has none.
    async fn resolve_cover(&self, album_uri: &str) -> Result<Option<String>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_metadata_is_empty() {
        assert!(TrackMetadata::default().is_empty());

        let metadata = TrackMetadata {
            track_name: Some("Intro".to_string()),
            ..Default::default()
        };
        assert!(!metadata.is_empty());
    }

    #[test]
    fn test_metadata_serializes_camel_case() {
        let metadata = TrackMetadata {
            album_uri: Some("spotify:album:1".to_string()),
            track_duration: Some(215.0),
            ..Default::default()
        };
        let json = serde_json::to_value(&metadata).unwrap();
        assert_eq!(json["albumUri"], "spotify:album:1");
        assert_eq!(json["trackDuration"], 215.0);
        assert!(json["artistName"].is_null());
    }
}
