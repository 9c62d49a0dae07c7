//! # Playback Session Module
//!
//! Session-aware control of the native streaming player.
//!
//! ## Overview
//!
//! This module handles:
//! - Lazy construction and teardown of the single native player handle
//!   ([`PlayerLifecycle`])
//! - The play/toggle contract and the cached playback state
//!   ([`PlaybackController`], [`PlaybackState`])
//! - Translation of native callbacks into published events
//!   ([`NotificationAdapter`])
//! - Background album art resolution ([`ArtworkTracker`])

pub mod artwork;
pub mod controller;
pub mod error;
pub mod lifecycle;
pub mod notifications;
pub mod state;

pub use artwork::ArtworkTracker;
pub use controller::{PlaybackController, ToggleOutcome};
pub use error::{PlaybackError, Result};
pub use lifecycle::{LifecycleDependencies, LifecycleState, LoginForwarder, PlayerLifecycle};
pub use notifications::NotificationAdapter;
pub use state::{PlaybackState, SharedPlaybackState};
