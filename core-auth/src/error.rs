use bridge_traits::BridgeError;
use thiserror::Error;

/// Session-level failures.
///
/// `Clone` so a single verification result can be handed to every caller
/// awaiting it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Session verification failed: {0}")]
    VerificationFailed(String),

    #[error("Not authenticated")]
    NotAuthenticated,
}

impl From<BridgeError> for AuthError {
    fn from(err: BridgeError) -> Self {
        AuthError::VerificationFailed(err.detail().to_string())
    }
}

pub type Result<T> = std::result::Result<T, AuthError>;
