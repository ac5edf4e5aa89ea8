//! # Jira Plugin
//!
//! Jira REST API integration for the issue-tracker plugin: turns Jira's
//! issue-creation metadata into form fields, submits created issues, proxies
//! user autocomplete lookups, and validates the linked instance.
//!
//! [`JiraPlugin::ALLOWED_ACTIONS`] and the `conf_title` of its [`Plugin`]
//! identity are host-facing metadata: the host's plugin UI reads them to
//! label the configuration page and offer issue actions. The adapter itself
//! only uses `conf_title` in messages.
//!
//! [`Plugin`]: plugins_core::Plugin

pub mod autocomplete;
mod client;
pub mod consts;
mod endpoints;
pub mod fields;
pub mod models;
pub mod payload;
mod plugin;

// Re-export the client
pub use client::{JiraClient, JiraError, create_jira_client};
// Re-export models
pub use models::{
  CreateMeta, CreatedIssue, FieldMeta, FieldSchema, IssueTypeMeta, JiraAuth, JiraProject, JiraUser, NamedValue,
  ProjectMeta,
};
// Re-export the plugin
pub use plugin::{AutocompleteRequest, JiraPlugin};
