//! # Jira API Endpoints
//!
//! Endpoint implementations grouped by resource: project and creation
//! metadata, issue creation, and user lookups.

pub mod issues;
pub mod meta;
pub mod users;
