//! # SessionStack Plugin
//!
//! Validates SessionStack credentials and, while events are ingested,
//! attaches a shareable replay link to events that carry a SessionStack
//! session id.

mod client;
pub mod consts;
pub mod models;
mod plugin;

// Re-export the client
pub use client::{SessionStackClient, SessionStackError, create_sessionstack_client};
// Re-export models
pub use models::{SessionStackAuth, ShareableUrl};
// Re-export the plugin
pub use plugin::{SessionStackContextPreprocessor, SessionStackPlugin};
