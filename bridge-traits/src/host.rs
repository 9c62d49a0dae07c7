//! Host application capabilities.

/// Opaque handle to the host's activity or UI context.
///
/// Some SDKs attach the player to a platform activity; the core passes this
/// capability through untouched.
pub trait HostContext: Send + Sync {
    /// Short description used in logs.
    fn describe(&self) -> String {
        "host-context".to_string()
    }
}

/// User-visible alerts (dialogs, toasts, banners).
///
/// Used when the session expired and the user has to log in again.
pub trait HostAlert: Send + Sync {
    fn alert(&self, message: &str);
}
