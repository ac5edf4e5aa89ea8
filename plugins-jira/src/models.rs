use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Represents Jira authentication credentials
#[derive(Clone)]
pub struct JiraAuth {
  pub username: String,
  pub password: String,
}

/// Response of the createmeta endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct CreateMeta {
  #[serde(default)]
  pub projects: Vec<ProjectMeta>,
}

/// Issue-creation metadata for one project
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectMeta {
  pub id: String,
  pub key: String,
  #[serde(default)]
  pub name: String,
  #[serde(default)]
  pub issuetypes: Vec<IssueTypeMeta>,
}

/// An issue type and the fields it accepts on creation
#[derive(Debug, Clone, Deserialize)]
pub struct IssueTypeMeta {
  pub id: String,
  pub name: String,
  #[serde(default)]
  pub fields: BTreeMap<String, FieldMeta>,
}

/// Creation metadata for a single field
#[derive(Debug, Clone, Deserialize)]
pub struct FieldMeta {
  #[serde(default)]
  pub name: String,
  #[serde(default)]
  pub required: bool,
  pub schema: FieldSchema,
  #[serde(rename = "allowedValues", default)]
  pub allowed_values: Option<Vec<NamedValue>>,
  #[serde(rename = "autoCompleteUrl", default)]
  pub auto_complete_url: Option<String>,
}

/// The type descriptor Jira attaches to each field
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FieldSchema {
  #[serde(rename = "type")]
  pub field_type: String,
  #[serde(default)]
  pub items: Option<String>,
  #[serde(default)]
  pub custom: Option<String>,
}

impl FieldSchema {
  pub fn is_type(&self, field_type: &str) -> bool {
    self.field_type == field_type
  }

  pub fn has_items(&self, items: &str) -> bool {
    self.items.as_deref() == Some(items)
  }

  pub fn is_custom(&self, custom: &str) -> bool {
    self.custom.as_deref() == Some(custom)
  }
}

/// An id with a display name, as used by priorities, versions and most
/// `allowedValues` lists. Custom field options carry `value` instead of
/// `name`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NamedValue {
  #[serde(default)]
  pub id: String,
  #[serde(default)]
  pub name: Option<String>,
  #[serde(default)]
  pub value: Option<String>,
}

impl NamedValue {
  pub fn label(&self) -> &str {
    self.name.as_deref().or(self.value.as_deref()).unwrap_or_default()
  }
}

/// Represents a Jira project as listed by the project endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct JiraProject {
  pub id: String,
  pub key: String,
  pub name: String,
}

/// Payload of the create-issue endpoint
#[derive(Debug, Serialize)]
pub struct CreateIssueRequest<'a> {
  pub fields: &'a serde_json::Map<String, serde_json::Value>,
}

/// Response of the create-issue endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedIssue {
  pub id: String,
  pub key: String,
}

/// A user returned by the JSON user-search API
#[derive(Debug, Clone, Deserialize)]
pub struct JiraUser {
  pub name: String,
  #[serde(rename = "displayName", default)]
  pub display_name: String,
  #[serde(rename = "emailAddress", default)]
  pub email_address: String,
}
