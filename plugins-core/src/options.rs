//! # Plugin Options
//!
//! Per-project key/value configuration. The host persists options for each
//! plugin; plugins only read and write them through [`OptionStore`].
//! [`OptionsFile`] is a TOML-backed store used by the CLI and tests.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// A single stored option value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
  Bool(bool),
  Int(i64),
  Text(String),
}

impl OptionValue {
  /// Text form of the value, if it is text.
  pub fn as_str(&self) -> Option<&str> {
    match self {
      Self::Text(s) => Some(s),
      _ => None,
    }
  }

  /// Whether the value counts as "set" for presence checks.
  pub fn is_set(&self) -> bool {
    match self {
      Self::Bool(b) => *b,
      Self::Int(_) => true,
      Self::Text(s) => !s.is_empty(),
    }
  }

  /// Parse a value typed on the command line as the key's kind.
  ///
  /// Text keys keep the raw input untouched, so secrets such as `000123`
  /// or `false` are stored as typed.
  pub fn parse(raw: &str, kind: OptionKind) -> Result<Self> {
    match kind {
      OptionKind::Text => Ok(Self::Text(raw.to_string())),
      OptionKind::Int => raw
        .trim()
        .parse::<i64>()
        .map(Self::Int)
        .with_context(|| format!("'{raw}' is not a whole number")),
      OptionKind::Bool => match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(Self::Bool(true)),
        "false" | "no" | "off" | "0" | "" => Ok(Self::Bool(false)),
        _ => anyhow::bail!("'{raw}' is not a boolean"),
      },
    }
  }
}

/// The type a plugin stores an option as
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OptionKind {
  #[default]
  Text,
  Int,
  Bool,
}

impl fmt::Display for OptionValue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Bool(b) => write!(f, "{b}"),
      Self::Int(i) => write!(f, "{i}"),
      Self::Text(s) => f.write_str(s),
    }
  }
}

impl From<&str> for OptionValue {
  fn from(value: &str) -> Self {
    Self::Text(value.to_string())
  }
}

impl From<String> for OptionValue {
  fn from(value: String) -> Self {
    Self::Text(value)
  }
}

impl From<i64> for OptionValue {
  fn from(value: i64) -> Self {
    Self::Int(value)
  }
}

impl From<bool> for OptionValue {
  fn from(value: bool) -> Self {
    Self::Bool(value)
  }
}

/// Per-project option storage owned by the host.
///
/// Options are namespaced by the plugin's conf key, so `key` is the bare
/// option name (`instance_url`, `api_token`, ...).
pub trait OptionStore {
  fn get_option(&self, plugin: &str, project: &str, key: &str) -> Option<&OptionValue>;

  fn set_option(&mut self, plugin: &str, project: &str, key: &str, value: OptionValue);

  fn unset_option(&mut self, plugin: &str, project: &str, key: &str);

  /// Fetch a set option rendered as text.
  ///
  /// Empty strings and a boolean `false` count as unset, matching the presence checks
  /// plugins perform before talking to remote services.
  fn get_text(&self, plugin: &str, project: &str, key: &str) -> Option<String> {
    self
      .get_option(plugin, project, key)
      .filter(|value| value.is_set())
      .map(ToString::to_string)
  }

  fn get_bool(&self, plugin: &str, project: &str, key: &str) -> bool {
    self.get_option(plugin, project, key).is_some_and(OptionValue::is_set)
  }
}

/// Options for every project, keyed `project -> "plugin:key" -> value`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptionsFile {
  #[serde(skip)]
  path: Option<PathBuf>,
  #[serde(default)]
  projects: BTreeMap<String, BTreeMap<String, OptionValue>>,
}

impl OptionsFile {
  /// In-memory store that is never written to disk
  pub fn in_memory() -> Self {
    Self::default()
  }

  /// Load the store from a TOML file, starting empty if it does not exist
  pub fn load(path: &Path) -> Result<Self> {
    let mut options = if path.exists() {
      let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read options from {}", path.display()))?;
      toml::from_str::<OptionsFile>(&content)
        .with_context(|| format!("Failed to parse options from {}", path.display()))?
    } else {
      Self::default()
    };
    options.path = Some(path.to_path_buf());
    Ok(options)
  }

  /// Write the store back to the file it was loaded from
  pub fn save(&self) -> Result<()> {
    let Some(path) = &self.path else {
      return Ok(());
    };

    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent).with_context(|| format!("Failed to create config directory {}", parent.display()))?;
    }

    let content = toml::to_string_pretty(self).context("Failed to serialize options to TOML")?;
    fs::write(path, content).with_context(|| format!("Failed to write options to {}", path.display()))?;

    Ok(())
  }

  /// All options stored for a plugin in a project
  pub fn plugin_options(&self, plugin: &str, project: &str) -> Vec<(&str, &OptionValue)> {
    let prefix = format!("{plugin}:");
    self
      .projects
      .get(project)
      .map(|options| {
        options
          .iter()
          .filter_map(|(key, value)| key.strip_prefix(&prefix).map(|name| (name, value)))
          .collect()
      })
      .unwrap_or_default()
  }

  fn option_key(plugin: &str, key: &str) -> String {
    format!("{plugin}:{key}")
  }
}

impl OptionStore for OptionsFile {
  fn get_option(&self, plugin: &str, project: &str, key: &str) -> Option<&OptionValue> {
    self.projects.get(project)?.get(&Self::option_key(plugin, key))
  }

  fn set_option(&mut self, plugin: &str, project: &str, key: &str, value: OptionValue) {
    self
      .projects
      .entry(project.to_string())
      .or_default()
      .insert(Self::option_key(plugin, key), value);
  }

  fn unset_option(&mut self, plugin: &str, project: &str, key: &str) {
    if let Some(options) = self.projects.get_mut(project) {
      options.remove(&Self::option_key(plugin, key));
    }
  }
}
