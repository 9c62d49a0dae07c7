//! # Session Module
//!
//! Login state of the streaming session as seen by the playback core.
//!
//! ## Overview
//!
//! Authentication itself (token exchange, renewal, storage) belongs to the
//! host's auth collaborator behind [`bridge_traits::AuthSession`]. This crate
//! keeps the core's view of it:
//!
//! - [`Session`] / [`SessionState`]: the `{logged_in, credentials_valid}`
//!   record and its shared, thread-safe holder
//! - [`SessionVerifier`]: asks the collaborator whether the session is still
//!   valid, with at most one verification in flight
//! - [`expiry`]: recognizes SDK errors that mean the session expired

pub mod error;
pub mod expiry;
pub mod session;

pub use error::{AuthError, Result};
pub use expiry::{is_login_error, DEFAULT_LOGIN_RENEWAL_MESSAGE};
pub use session::{Session, SessionState, SessionVerifier};
