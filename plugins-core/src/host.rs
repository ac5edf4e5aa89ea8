//! The slices of the host platform that plugins see: plugin identity, issue
//! groups and raw events.

use std::future::Future;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::options::OptionKind;

/// Raw event payload as received during ingestion.
pub type Event = serde_json::Map<String, Value>;

/// Identity a plugin registers with the host.
///
/// Mirrors the metadata the host reads when listing and configuring
/// plugins; `conf_title` and the plugins' allowed-action lists are consumed
/// by the host's plugin UI rather than by the adapters themselves.
pub trait Plugin {
  fn slug(&self) -> &'static str;

  fn title(&self) -> &'static str;

  fn description(&self) -> &'static str;

  /// Namespace for the plugin's stored options
  fn conf_key(&self) -> &'static str {
    self.slug()
  }

  fn conf_title(&self) -> &'static str {
    self.title()
  }

  /// How the option stored under `key` is typed; everything else is text
  fn option_kind(&self, _key: &str) -> OptionKind {
    OptionKind::Text
  }
}

/// An issue group as exposed to issue-tracker plugins
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
  pub id: u64,
  /// Project the group belongs to; options are looked up under this key
  pub project: String,
  pub title: String,
  /// Absolute link back to the group in the host UI
  pub url: String,
  /// Rendered event body (message, stacktrace, ...) if the host has one
  #[serde(default)]
  pub body: Option<String>,
}

/// A hook run on each event before it is stored.
///
/// Preprocessors own the event for the duration of the call and hand back
/// the (possibly annotated) event. They must not fail: enrichment that
/// cannot complete leaves the event as it was.
pub trait EventPreprocessor {
  fn preprocess(&self, event: Event) -> impl Future<Output = Event> + Send;
}
