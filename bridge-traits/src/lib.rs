//! # Host Bridge Traits
//!
//! Capability traits implemented by the host application and its native
//! streaming SDK wrapper.
//!
//! ## Overview
//!
//! This crate defines the contract between the playback core and everything it
//! does not own: the auth collaborator, the native player SDK, and the host's
//! UI. The core never reimplements these; it only drives them through the
//! traits below.
//!
//! ## Traits
//!
//! ### Session
//! - [`AuthSession`](session::AuthSession) - Session verification, credentials, login-change signals
//! - [`LoginObserver`](session::LoginObserver) - Receiver of login-change signals
//!
//! ### Native player
//! - [`NativePlayerFactory`](player::NativePlayerFactory) - Asynchronous player construction
//! - [`PlayerHandle`](player::PlayerHandle) - Playback commands, teardown, metadata
//! - [`NotificationCallback`](notification::NotificationCallback) - Playback/streaming callbacks
//! - [`AlbumArtResolver`](player::AlbumArtResolver) - Optional cover art lookup
//!
//! ### Host integration
//! - [`HostContext`](host::HostContext) - Opaque activity/context capability
//! - [`HostAlert`](host::HostAlert) - User-visible alerts
//! - [`LoggerSink`](logging::LoggerSink) - Forward structured logs to host logging
//!
//! ## Thread Safety
//!
//! All traits require `Send + Sync`. Native callbacks may arrive on any
//! thread, and the core shares bridge handles across async tasks.
//!
//! ## Error Handling
//!
//! Bridge implementations report failures as [`BridgeError`](error::BridgeError).
//! Use [`BridgeError::Native`] to pass an SDK message through verbatim; the
//! core surfaces it to callers without reinterpreting it.

pub mod error;
pub mod host;
pub mod logging;
pub mod notification;
pub mod player;
pub mod session;

pub use error::BridgeError;

// Re-export commonly used types
pub use host::{HostAlert, HostContext};
pub use logging::{LogEntry, LogLevel, LoggerSink};
pub use notification::{NativeNotification, NotificationCallback};
pub use player::{
    AlbumArtResolver, NativePlayerConfig, NativePlayerFactory, PlayerHandle, TrackMetadata,
};
pub use session::{AuthSession, LoginObserver, SessionCredentials};
