//! # Playback Error Types
//!
//! Errors surfaced by playback commands and player initialization.

use bridge_traits::BridgeError;
use thiserror::Error;

/// Errors that can occur during playback operations.
///
/// A toggle with nothing to toggle is not an error; it resolves to
/// [`ToggleOutcome::NoOp`](crate::controller::ToggleOutcome::NoOp).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    /// The session is logged out or its credentials are not usable.
    #[error("Login required")]
    LoginRequired,

    /// The native player could not be built. Carries the SDK's message verbatim.
    #[error("Player initialization failed: {0}")]
    InitializationFailed(String),

    /// A native playback command was rejected; the cached state is unchanged.
    #[error("Playback command '{command}' failed: {message}")]
    CommandFailed {
        command: &'static str,
        message: String,
    },
}

impl PlaybackError {
    pub(crate) fn command_failed(command: &'static str, err: BridgeError) -> Self {
        PlaybackError::CommandFailed {
            command,
            message: err.detail().to_string(),
        }
    }

    /// Returns `true` if the caller has to log in before retrying.
    pub fn is_login_required(&self) -> bool {
        matches!(self, PlaybackError::LoginRequired)
    }

    /// The collaborator's message, when the error carries one.
    pub fn native_message(&self) -> Option<&str> {
        match self {
            PlaybackError::InitializationFailed(message)
            | PlaybackError::CommandFailed { message, .. } => Some(message),
            PlaybackError::LoginRequired => None,
        }
    }
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;
