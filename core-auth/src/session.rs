//! Session record and verification.

use crate::error::{AuthError, Result};
use bridge_traits::AuthSession;
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Login state of the streaming session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub logged_in: bool,
    /// Whether the auth collaborator's credentials may be handed to the SDK.
    pub credentials_valid: bool,
}

impl Session {
    pub fn logged_in() -> Self {
        Self {
            logged_in: true,
            credentials_valid: true,
        }
    }

    pub fn logged_out() -> Self {
        Self::default()
    }
}

/// Shared, thread-safe holder of the current [`Session`].
///
/// Clones observe the same record.
#[derive(Clone, Default)]
pub struct SessionState {
    inner: Arc<RwLock<Session>>,
}

impl SessionState {
    /// Creates a logged-out session.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Session {
        *self.inner.read()
    }

    pub fn is_logged_in(&self) -> bool {
        self.inner.read().logged_in
    }

    pub fn credentials_valid(&self) -> bool {
        self.inner.read().credentials_valid
    }

    /// Applies a login-state change and returns the previous record.
    pub fn apply_login(&self, logged_in: bool) -> Session {
        let next = if logged_in {
            Session::logged_in()
        } else {
            Session::logged_out()
        };
        let previous = std::mem::replace(&mut *self.inner.write(), next);
        if previous != next {
            debug!(logged_in, "Session changed");
        }
        previous
    }

    /// Resets to logged out.
    pub fn reset(&self) {
        self.apply_login(false);
    }
}

impl fmt::Debug for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SessionState").field(&self.snapshot()).finish()
    }
}

type VerifyFuture = Shared<BoxFuture<'static, Result<bool>>>;

struct InFlight {
    attempt: u64,
    future: VerifyFuture,
}

/// Asks the auth collaborator whether the session is valid.
///
/// At most one verification runs at a time. Callers arriving while one is in
/// flight await the same result instead of issuing another request.
pub struct SessionVerifier {
    auth: Arc<dyn AuthSession>,
    in_flight: Mutex<Option<InFlight>>,
    attempts: AtomicU64,
}

impl SessionVerifier {
    pub fn new(auth: Arc<dyn AuthSession>) -> Self {
        Self {
            auth,
            in_flight: Mutex::new(None),
            attempts: AtomicU64::new(0),
        }
    }

    /// Verifies the session, joining a verification already in flight.
    ///
    /// # Errors
    ///
    /// [`AuthError::VerificationFailed`] carrying the collaborator's message.
    #[instrument(skip(self))]
    pub async fn verify(&self) -> Result<bool> {
        let (attempt, future) = {
            let mut in_flight = self.in_flight.lock();
            match in_flight.as_ref() {
                Some(current) => {
                    debug!(attempt = current.attempt, "Joining in-flight verification");
                    (current.attempt, current.future.clone())
                }
                None => {
                    let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
                    let auth = Arc::clone(&self.auth);
                    let future = async move { auth.verify().await.map_err(AuthError::from) }
                        .boxed()
                        .shared();
                    *in_flight = Some(InFlight {
                        attempt,
                        future: future.clone(),
                    });
                    debug!(attempt, "Starting session verification");
                    (attempt, future)
                }
            }
        };

        let result = future.await;

        {
            let mut in_flight = self.in_flight.lock();
            if in_flight
                .as_ref()
                .is_some_and(|current| current.attempt == attempt)
            {
                *in_flight = None;
            }
        }

        match &result {
            Ok(valid) => info!(attempt, valid = *valid, "Session verified"),
            Err(err) => warn!(attempt, error = %err, "Session verification failed"),
        }

        result
    }

    /// Whether a verification is currently running.
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.lock().is_some()
    }

    /// Number of verification requests issued to the collaborator.
    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for SessionVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionVerifier")
            .field("in_flight", &self.is_in_flight())
            .field("attempts", &self.attempts())
            .finish()
    }
}
