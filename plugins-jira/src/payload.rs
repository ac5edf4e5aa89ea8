//! # Issue Payload
//!
//! Converts submitted issue-creation form values into the nested shapes the
//! create-issue endpoint expects for each field type.

use plugins_core::form::value_as_text;
use plugins_core::{FormData, is_truthy};
use serde_json::{Map, Value, json};

use crate::consts::{CUSTOM_FIELD_MULTIUSERPICKER, CUSTOM_FIELD_SELECT, CUSTOM_FIELD_TEXTAREA};
use crate::models::{FieldSchema, IssueTypeMeta};

/// Shape one submitted value according to its field schema.
pub fn shape_value(schema: &FieldSchema, value: &Value) -> Value {
  if schema.is_type("string") && !schema.is_custom(CUSTOM_FIELD_SELECT) {
    return value.clone();
  }

  if schema.is_custom(CUSTOM_FIELD_MULTIUSERPICKER) {
    return Value::Array(as_list(value).into_iter().map(|name| json!({ "name": name })).collect());
  }

  if schema.is_type("user") || schema.has_items("user") {
    return json!({ "name": value });
  }

  if schema.is_type("array") {
    if schema.has_items("string") {
      return Value::Array(as_list(value));
    }
    return Value::Array(as_list(value).into_iter().map(|id| json!({ "id": id })).collect());
  }

  if schema.is_custom(CUSTOM_FIELD_TEXTAREA) {
    return value.clone();
  }

  json!({ "id": value })
}

fn as_list(value: &Value) -> Vec<Value> {
  match value {
    Value::Array(items) => items.clone(),
    other => vec![other.clone()],
  }
}

/// Build the `fields` object for a create-issue request.
///
/// `summary` is filled from the form's `title`; `description` is copied
/// as-is. Every other field the issue type declares is included when the
/// form carries a non-empty value for it. The caller has already checked
/// that `issuetype` is present.
pub fn build_issue_fields(form_data: &FormData, issue_type_meta: &IssueTypeMeta) -> Map<String, Value> {
  let mut cleaned = Map::new();

  for (name, field) in &issue_type_meta.fields {
    match name.as_str() {
      "description" => {
        if let Some(description) = form_data.get("description") {
          cleaned.insert(name.clone(), description.clone());
        }
        continue;
      }
      "summary" => {
        if let Some(title) = form_data.get("title") {
          cleaned.insert(name.clone(), title.clone());
        }
        continue;
      }
      _ => {}
    }

    if let Some(value) = form_data.get(name).filter(|value| is_truthy(value)) {
      cleaned.insert(name.clone(), shape_value(&field.schema, value));
    }
  }

  // Some Jira versions leave issuetype out of createmeta's field list.
  let issue_type_is_shaped = cleaned
    .get("issuetype")
    .and_then(Value::as_object)
    .is_some_and(|issue_type| issue_type.contains_key("id"));
  if !issue_type_is_shaped {
    let issue_type = form_data
      .get("issuetype")
      .and_then(value_as_text)
      .map(Value::String)
      .unwrap_or(Value::Null);
    cleaned.insert("issuetype".to_string(), json!({ "id": issue_type }));
  }

  cleaned
}
