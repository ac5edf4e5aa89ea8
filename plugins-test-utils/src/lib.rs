//! Test utilities shared across the plugins workspace
//!
//! This crate provides common testing infrastructure including:
//! - XDG directory isolation ([`EnvTestGuard`])
//! - Pre-populated option stores for each plugin ([`jira_options`],
//!   [`sessionstack_options`])
//! - Host group fixtures ([`test_group`])
//!
//! The dead_code lint is disabled for this crate because test utilities may
//! not be used by all tests, and the compiler cannot detect usage across
//! crate boundaries in development dependencies.

#![allow(dead_code)]

pub mod env;
pub mod fixtures;

// Re-export commonly used items
pub use env::EnvTestGuard;
pub use fixtures::{TEST_PROJECT, jira_options, sessionstack_options, test_group};
