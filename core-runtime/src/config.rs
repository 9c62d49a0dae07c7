//! # Player Configuration
//!
//! Settings for the playback core.
//!
//! ## Overview
//!
//! [`PlayerConfig`] holds the values the core needs besides its bridges: the
//! client id handed to the native SDK, the stream buffer size of the event
//! bus, the text shown when a session expires, and [`FeatureFlags`]. It is
//! constructed through [`PlayerConfigBuilder`] or parsed from JSON; both paths
//! validate before returning, so an invalid configuration never reaches the
//! player.
//!
//! ## Usage
//!
//! ```
//! use core_runtime::config::PlayerConfig;
//!
//! let config = PlayerConfig::builder()
//!     .client_id("0f3c9a1e")
//!     .event_buffer_size(256)
//!     .build()
//!     .unwrap();
//!
//! assert!(config.features.serialize_commands);
//! ```
//!
//! ## From JSON
//!
//! ```
//! use core_runtime::config::PlayerConfig;
//!
//! let config = PlayerConfig::from_json(
//!     r#"{"client_id": "0f3c9a1e", "features": {"resolve_album_art": false}}"#,
//! )
//! .unwrap();
//!
//! assert!(!config.features.resolve_album_art);
//! assert_eq!(config.event_buffer_size, 100);
//! ```
//!
//! ## Error Handling
//!
//! ```should_panic
//! use core_runtime::config::PlayerConfig;
//!
//! // A client id is mandatory.
//! let config = PlayerConfig::builder()
//!     .build()
//!     .expect("Should fail - missing client id");
//! ```

use crate::error::{Error, Result};
use crate::events::DEFAULT_EVENT_BUFFER_SIZE;
use serde::{Deserialize, Serialize};

/// Alert text shown when the streaming session has to be renewed.
pub const DEFAULT_LOGIN_RENEWAL_MESSAGE: &str = "You need to login to renew your session.";

/// Upper bound for [`PlayerConfig::event_buffer_size`].
const MAX_EVENT_BUFFER_SIZE: usize = 65_536;

/// Configuration of the playback core.
///
/// Use [`PlayerConfig::builder`] or [`PlayerConfig::from_json`] to construct
/// validated instances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Client id of the host application, passed to the native SDK.
    pub client_id: String,

    /// Buffer size of event streams (handlers are unbuffered).
    #[serde(default = "default_event_buffer_size")]
    pub event_buffer_size: usize,

    /// Text shown through `HostAlert` when the session expires.
    #[serde(default = "default_login_renewal_message")]
    pub login_renewal_message: String,

    #[serde(default)]
    pub features: FeatureFlags,
}

/// Feature flags control optional behavior of the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureFlags {
    /// Resolve album art on track changes (requires an `AlbumArtResolver`).
    pub resolve_album_art: bool,

    /// Run playback commands one at a time, in arrival order.
    ///
    /// When disabled, overlapping commands race and the last one to complete
    /// determines the cached state.
    pub serialize_commands: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            resolve_album_art: true,
            serialize_commands: true,
        }
    }
}

fn default_event_buffer_size() -> usize {
    DEFAULT_EVENT_BUFFER_SIZE
}

fn default_login_renewal_message() -> String {
    DEFAULT_LOGIN_RENEWAL_MESSAGE.to_string()
}

impl PlayerConfig {
    /// Creates a new builder for constructing a `PlayerConfig`.
    pub fn builder() -> PlayerConfigBuilder {
        PlayerConfigBuilder::default()
    }

    /// Parses and validates a JSON configuration document.
    ///
    /// Only `client_id` is mandatory; every other field falls back to its
    /// default.
    ///
    /// # Errors
    ///
    /// - [`Error::Serialization`] when the document is malformed
    /// - [`Error::Config`] when a value fails validation
    pub fn from_json(json: &str) -> Result<Self> {
        let config: PlayerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - Client id is not blank
    /// - Event buffer size is within `1..=65536`
    /// - Renewal message is not blank
    pub fn validate(&self) -> Result<()> {
        if self.client_id.trim().is_empty() {
            return Err(Error::Config("Client id cannot be empty".to_string()));
        }

        if self.event_buffer_size == 0 {
            return Err(Error::Config(
                "Event buffer size must be greater than 0".to_string(),
            ));
        }

        if self.event_buffer_size > MAX_EVENT_BUFFER_SIZE {
            return Err(Error::Config(format!(
                "Event buffer size exceeds maximum of {}",
                MAX_EVENT_BUFFER_SIZE
            )));
        }

        if self.login_renewal_message.trim().is_empty() {
            return Err(Error::Config(
                "Login renewal message cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for [`PlayerConfig`].
#[derive(Debug, Default)]
pub struct PlayerConfigBuilder {
    client_id: Option<String>,
    event_buffer_size: Option<usize>,
    login_renewal_message: Option<String>,
    features: FeatureFlags,
}

impl PlayerConfigBuilder {
    /// Sets the client id registered with the streaming service (required).
    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Sets the per-stream event buffer (default: 100).
    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = Some(size);
        self
    }

    /// Overrides the alert text shown when the session expires.
    pub fn login_renewal_message(mut self, message: impl Into<String>) -> Self {
        self.login_renewal_message = Some(message.into());
        self
    }

    pub fn resolve_album_art(mut self, enabled: bool) -> Self {
        self.features.resolve_album_art = enabled;
        self
    }

    pub fn serialize_commands(mut self, enabled: bool) -> Self {
        self.features.serialize_commands = enabled;
        self
    }

    /// Replaces all feature flags at once.
    pub fn features(mut self, features: FeatureFlags) -> Self {
        self.features = features;
        self
    }

    /// Builds the final `PlayerConfig` instance.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the client id is missing or any value
    /// fails [`PlayerConfig::validate`].
    pub fn build(self) -> Result<PlayerConfig> {
        let client_id = self.client_id.ok_or_else(|| {
            Error::Config("Client id is required. Use .client_id() to set it.".to_string())
        })?;

        let config = PlayerConfig {
            client_id,
            event_buffer_size: self
                .event_buffer_size
                .unwrap_or(DEFAULT_EVENT_BUFFER_SIZE),
            login_renewal_message: self
                .login_renewal_message
                .unwrap_or_else(default_login_renewal_message),
            features: self.features,
        };

        config.validate()?;

        Ok(config)
    }
}
