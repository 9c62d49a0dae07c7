use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Player initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Capability missing: {capability} - {message}")]
    CapabilityMissing { capability: String, message: String },

    #[error("Runtime error: {0}")]
    Runtime(#[from] core_runtime::Error),

    #[error("Authentication error: {0}")]
    Auth(#[from] core_auth::AuthError),

    #[error("Playback error: {0}")]
    Playback(#[from] core_playback::PlaybackError),
}

impl CoreError {
    pub(crate) fn capability_missing(capability: &str, message: &str) -> Self {
        CoreError::CapabilityMissing {
            capability: capability.to_string(),
            message: message.to_string(),
        }
    }

    /// True when the operation needs a logged-in session.
    pub fn is_login_required(&self) -> bool {
        matches!(
            self,
            CoreError::Playback(core_playback::PlaybackError::LoginRequired)
                | CoreError::Auth(core_auth::AuthError::NotAuthenticated)
        )
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;
    use core_playback::PlaybackError;

    #[test]
    fn test_playback_error_converts() {
        let err: CoreError = PlaybackError::InitializationFailed("Invalid client id".into()).into();
        assert!(matches!(err, CoreError::Playback(_)));
        assert_eq!(
            err.to_string(),
            "Playback error: Player initialization failed: Invalid client id"
        );
        assert!(!err.is_login_required());
    }

    #[test]
    fn test_login_required_detection() {
        let err: CoreError = PlaybackError::LoginRequired.into();
        assert!(err.is_login_required());
    }

    #[test]
    fn test_runtime_error_converts() {
        let err: CoreError = core_runtime::Error::Config("Client id is required".into()).into();
        assert!(matches!(err, CoreError::Runtime(_)));
    }
}
