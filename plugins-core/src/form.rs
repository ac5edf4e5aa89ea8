//! # Form Field Descriptors
//!
//! Plain data describing the fields a plugin wants rendered in the host's
//! configuration and issue-creation forms. Descriptors are built per request
//! and never persisted; the host turns them into widgets.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Submitted form values keyed by field name.
pub type FormData = serde_json::Map<String, Value>;

/// Widget type of a form field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
  Text,
  Textarea,
  Select,
  Secret,
  Bool,
}

/// A `(value, label)` pair offered by a select field.
///
/// Serializes as a two element array, the shape the host's form renderer
/// expects for choices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice(pub String, pub String);

impl Choice {
  pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
    Self(id.into(), label.into())
  }

  pub fn id(&self) -> &str {
    &self.0
  }

  pub fn label(&self) -> &str {
    &self.1
  }
}

/// Describes one form field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDescriptor {
  pub name: String,
  pub label: String,
  #[serde(rename = "type")]
  pub field_type: FieldType,
  pub required: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub default: Option<Value>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub choices: Option<Vec<Choice>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub url: Option<String>,
  #[serde(skip_serializing_if = "std::ops::Not::not")]
  pub has_autocomplete: bool,
  #[serde(skip_serializing_if = "std::ops::Not::not")]
  pub multiple: bool,
  #[serde(skip_serializing_if = "std::ops::Not::not")]
  pub readonly: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub placeholder: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub help: Option<String>,
}

impl FieldDescriptor {
  /// Create a required field with no default.
  pub fn new(name: impl Into<String>, label: impl Into<String>, field_type: FieldType) -> Self {
    Self {
      name: name.into(),
      label: label.into(),
      field_type,
      required: true,
      default: None,
      choices: None,
      url: None,
      has_autocomplete: false,
      multiple: false,
      readonly: false,
      placeholder: None,
      help: None,
    }
  }

  pub fn required(mut self, required: bool) -> Self {
    self.required = required;
    self
  }

  pub fn default_value(mut self, default: impl Into<Value>) -> Self {
    self.default = Some(default.into());
    self
  }

  pub fn choices(mut self, choices: Vec<Choice>) -> Self {
    self.choices = Some(choices);
    self
  }

  /// Back the field with a remote lookup endpoint.
  pub fn autocomplete(mut self, url: impl Into<String>) -> Self {
    self.url = Some(url.into());
    self.has_autocomplete = true;
    self
  }

  pub fn multiple(mut self) -> Self {
    self.multiple = true;
    self
  }

  pub fn readonly(mut self) -> Self {
    self.readonly = true;
    self
  }

  pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
    self.placeholder = Some(placeholder.into());
    self
  }

  pub fn help(mut self, help: impl Into<String>) -> Self {
    self.help = Some(help.into());
    self
  }
}

/// Python-style truthiness of a submitted value.
///
/// Empty strings, empty lists and objects, `false`, zero and `null` are all
/// treated as "not submitted".
pub fn is_truthy(value: &Value) -> bool {
  match value {
    Value::Null => false,
    Value::Bool(b) => *b,
    Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
    Value::String(s) => !s.is_empty(),
    Value::Array(items) => !items.is_empty(),
    Value::Object(map) => !map.is_empty(),
  }
}

/// Render a scalar form value as text, the way ids are sent to remote APIs.
pub fn value_as_text(value: &Value) -> Option<String> {
  match value {
    Value::String(s) => Some(s.clone()),
    Value::Number(n) => Some(n.to_string()),
    Value::Bool(b) => Some(b.to_string()),
    _ => None,
  }
}
