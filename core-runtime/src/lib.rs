//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the playback core:
//! - Logging and tracing infrastructure
//! - Configuration management
//! - Event bus and the player event catalog
//!
//! ## Overview
//!
//! This crate contains the runtime utilities the auth, playback and service
//! crates depend on. It establishes the logging conventions and the event
//! delivery contract used throughout the workspace.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
