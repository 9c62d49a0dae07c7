//! Login-expiry classification.
//!
//! The streaming SDK reports an expired or revoked session as an ordinary
//! stream error. Its description is the only signal, so classification is a
//! substring match on the markers the SDK is known to use.

pub use core_runtime::config::DEFAULT_LOGIN_RENEWAL_MESSAGE;

/// Substrings of a stream error description that denote an invalid session.
/// Matching is case-sensitive.
const LOGIN_ERROR_MARKERS: &[&str] = &["invalid credentials", "NULL"];

/// Returns `true` when a stream error means the user has to log in again.
///
/// ```
/// use core_auth::is_login_error;
///
/// assert!(is_login_error("Login failed: invalid credentials"));
/// assert!(!is_login_error("Audio buffer underrun"));
/// ```
pub fn is_login_error(description: &str) -> bool {
    LOGIN_ERROR_MARKERS
        .iter()
        .any(|marker| description.contains(marker))
}
