//! # Field Schema Mapping
//!
//! Pure functions turning Jira's createmeta field descriptions into form
//! field descriptors for the issue-creation dialog.

use std::collections::BTreeMap;

use plugins_core::url::quote_plus;
use plugins_core::{Choice, FieldDescriptor, FieldType};
use serde_json::json;

use crate::consts::{CUSTOM_FIELD_SELECT, CUSTOM_FIELD_TEXTAREA};
use crate::models::{FieldMeta, IssueTypeMeta, NamedValue, ProjectMeta};

/// Placement bias for well-known fields; lower sorts first, unlisted fields
/// weigh 0. Without it the dynamic fields come out in an unhelpful order.
pub const ANTI_GRAVITY: &[(&str, i32)] = &[
  ("priority", -150),
  ("fixVersions", -125),
  ("components", -100),
  ("security", -50),
];

fn gravity(field: &str) -> i32 {
  ANTI_GRAVITY
    .iter()
    .find(|(name, _)| *name == field)
    .map(|(_, weight)| *weight)
    .unwrap_or(0)
}

/// Field names of an issue type in form order.
///
/// Jira returns fields as an object, so the base order is by key; the sort
/// is stable, so only the biased fields move.
pub fn ordered_field_names(fields: &BTreeMap<String, FieldMeta>) -> Vec<&str> {
  let mut names: Vec<&str> = fields.keys().map(String::as_str).collect();
  names.sort_by_key(|name| gravity(name));
  names
}

/// `(id, name-or-value)` choices for a list of Jira values.
pub fn make_choices(values: Option<&[NamedValue]>) -> Vec<Choice> {
  values
    .unwrap_or_default()
    .iter()
    .map(|value| Choice::new(value.id.as_str(), value.label()))
    .collect()
}

/// `(id, name)` choices for a project's issue types.
pub fn issue_type_choices(meta: &ProjectMeta) -> Vec<Choice> {
  meta
    .issuetypes
    .iter()
    .map(|issue_type| Choice::new(issue_type.id.as_str(), issue_type.name.as_str()))
    .collect()
}

/// Pick the metadata for `issue_type`, falling back to the project's first
/// issue type when it is unset or unknown.
pub fn issue_type_meta<'a>(issue_type: Option<&str>, meta: &'a ProjectMeta) -> Option<&'a IssueTypeMeta> {
  issue_type
    .and_then(|wanted| meta.issuetypes.iter().find(|t| t.id == wanted))
    .or_else(|| meta.issuetypes.first())
}

/// Host route proxying autocomplete lookups for a group.
pub fn autocomplete_route(group_id: u64, slug: &str) -> String {
  format!("/api/0/issues/{group_id}/plugins/{slug}/autocomplete")
}

/// Build a form field from Jira's metadata for it.
///
/// Returns `None` for field types the form cannot represent (time
/// tracking, worklogs, attachments). The caller assigns the field name.
pub fn build_dynamic_field(group_id: u64, field_meta: &FieldMeta) -> Option<FieldDescriptor> {
  let schema = &field_meta.schema;

  let mut field =
    FieldDescriptor::new("", field_meta.name.as_str(), FieldType::Text).required(field_meta.required);

  if schema.is_type("securitylevel") || schema.is_type("priority") || schema.is_custom(CUSTOM_FIELD_SELECT) {
    field.field_type = FieldType::Select;
    field.choices = Some(make_choices(field_meta.allowed_values.as_deref()));
  } else if schema.has_items("user") || schema.is_type("user") {
    let jira_url = field_meta.auto_complete_url.as_deref().unwrap_or_default();
    let url = format!("{}?jira_url={}", autocomplete_route(group_id, "jira"), quote_plus(jira_url));
    field = field.autocomplete(url).placeholder("Start typing to search for a user");
    field.field_type = FieldType::Select;
  } else if schema.is_type("timetracking") {
    // TODO: support time tracking once the form can render duration inputs
    return None;
  } else if schema.has_items("worklog") || schema.has_items("attachment") {
    return None;
  } else if schema.is_type("array") && !schema.has_items("string") {
    field = field
      .multiple()
      .choices(make_choices(field_meta.allowed_values.as_deref()))
      .default_value(json!([]));
    field.field_type = FieldType::Select;
  }

  // A custom textarea overrides whatever the schema type picked.
  if schema.is_custom(CUSTOM_FIELD_TEXTAREA) {
    field.field_type = FieldType::Textarea;
  }

  Some(field)
}
