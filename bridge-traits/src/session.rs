//! Authentication session capability.
//!
//! The login/token lifecycle belongs to the host's auth collaborator. The core
//! only asks whether the existing session is still valid, reads the
//! credentials needed to build a native player, and listens for login-state
//! changes.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Credentials handed to the native player when it is built.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCredentials {
    /// OAuth access token for the streaming service.
    pub access_token: String,
    /// Canonical username, when the auth collaborator knows it.
    pub username: Option<String>,
}

impl SessionCredentials {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            username: None,
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }
}

// Access tokens must never reach a log line through `{:?}`.
impl fmt::Debug for SessionCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCredentials")
            .field("access_token", &"[REDACTED]")
            .field("username", &self.username)
            .finish()
    }
}

/// Receives login-state changes from the auth collaborator.
///
/// Called synchronously on whatever context the collaborator uses; the core's
/// implementation finishes all of its state transitions and publications
/// before returning.
pub trait LoginObserver: Send + Sync {
    fn login_changed(&self, logged_in: bool);
}

/// Host-provided authentication session.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::session::{AuthSession, LoginObserver, SessionCredentials};
///
/// struct KeychainSession { /* ... */ }
///
/// #[async_trait::async_trait]
/// impl AuthSession for KeychainSession {
///     async fn verify(&self) -> bridge_traits::error::Result<bool> {
///         Ok(self.token_is_fresh())
///     }
///     fn credentials(&self) -> Option<SessionCredentials> {
///         self.stored_token().map(SessionCredentials::new)
///     }
///     fn register_login_observer(&self, observer: std::sync::Arc<dyn LoginObserver>) {
///         self.observers.lock().push(observer);
///     }
/// }
/// ```
#[async_trait]
pub trait AuthSession: Send + Sync {
    /// Resolve whether an existing session is still valid.
    ///
    /// Never used to acquire new credentials; interactive login is a separate
    /// flow owned by the host.
    async fn verify(&self) -> Result<bool>;

    /// Credentials of the current session, if any.
    fn credentials(&self) -> Option<SessionCredentials>;

    /// Register an observer for `loginChange(status)` signals.
    fn register_login_observer(&self, observer: Arc<dyn LoginObserver>);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_debug_is_redacted() {
        let creds = SessionCredentials::new("BQD-secret-token").with_username("listener");
        let debug = format!("{:?}", creds);
        assert!(!debug.contains("BQD-secret-token"));
        assert!(debug.contains("[REDACTED]"));
        assert!(debug.contains("listener"));
    }
}
