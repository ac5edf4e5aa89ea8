//! # SessionStack Plugin
//!
//! Configuration form and validation, plus the event preprocessor that
//! links events to their SessionStack replay.

use plugins_core::form::value_as_text;
use plugins_core::{
  Event, EventPreprocessor, FieldDescriptor, FieldType, FormData, OptionKind, OptionStore, Plugin, PluginError,
};
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::client::{SessionStackClient, SessionStackError, create_sessionstack_client};
use crate::consts::CONTEXT_KEY;

/// Links events to SessionStack session recordings
#[derive(Debug, Default, Clone, Copy)]
pub struct SessionStackPlugin;

impl Plugin for SessionStackPlugin {
  fn slug(&self) -> &'static str {
    "sessionstack"
  }

  fn title(&self) -> &'static str {
    "SessionStack"
  }

  fn description(&self) -> &'static str {
    "Watch SessionStack recordings in Sentry."
  }

  fn option_kind(&self, key: &str) -> OptionKind {
    match key {
      "website_id" => OptionKind::Int,
      _ => OptionKind::Text,
    }
  }
}

impl SessionStackPlugin {
  fn option(&self, options: &impl OptionStore, project: &str, key: &str) -> Option<String> {
    options.get_text(self.conf_key(), project, key)
  }

  /// Email, token and website id are all stored for the project
  pub fn is_configured(&self, options: &impl OptionStore, project: &str) -> bool {
    ["account_email", "api_token", "website_id"]
      .iter()
      .all(|key| self.option(options, project, key).is_some())
  }

  /// Build a client from the project's stored credentials, if complete
  pub fn sessionstack_client(&self, options: &impl OptionStore, project: &str) -> Option<SessionStackClient> {
    let account_email = self.option(options, project, "account_email")?;
    let api_token = self.option(options, project, "api_token")?;
    let website_id = self.option(options, project, "website_id")?;
    let api_url = self.option(options, project, "api_url");

    match create_sessionstack_client(&account_email, &api_token, &website_id, api_url.as_deref()) {
      Ok(client) => Some(client),
      Err(err) => {
        warn!("Failed to build SessionStack client: {}", err);
        None
      }
    }
  }

  /// User-facing text for a failed access check
  pub fn message_from_error(err: &SessionStackError) -> &'static str {
    match err {
      SessionStackError::Unauthorized => "Invalid email or API token.",
      SessionStackError::InvalidWebsiteId => "Invalid website ID.",
      SessionStackError::InvalidApiUrl => "The SessionStack API URL is not reachable. Please check it.",
      SessionStackError::Api { .. } | SessionStackError::Transport(_) => {
        "Something went wrong while validating the SessionStack credentials."
      }
    }
  }

  /// Check submitted credentials against the SessionStack API
  pub async fn validate_config(&self, config: &FormData) -> Result<(), PluginError> {
    // website_id may legitimately be 0, so presence is all that is checked.
    let text = |key: &str, label: &str| {
      config
        .get(key)
        .and_then(value_as_text)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| PluginError::Configuration(format!("{label} is required.")))
    };
    let account_email = text("account_email", "Account Email")?;
    let api_token = text("api_token", "API Token")?;
    let website_id = text("website_id", "Website ID")?;
    let api_url = config.get("api_url").and_then(value_as_text);

    let as_config_error = |err: SessionStackError| {
      if matches!(err, SessionStackError::Api { .. } | SessionStackError::Transport(_)) {
        error!("SessionStack validation failed: {}", err);
      }
      PluginError::Configuration(Self::message_from_error(&err).to_string())
    };
    let client = create_sessionstack_client(&account_email, &api_token, &website_id, api_url.as_deref())
      .map_err(as_config_error)?;
    client.validate_api_access().await.map_err(as_config_error)
  }

  /// Build the configuration form, pre-filled with stored values
  pub fn configure_plugin_fields(&self, options: &impl OptionStore, project: &str) -> Vec<FieldDescriptor> {
    let with_default = |field: FieldDescriptor, key: &str| match self.option(options, project, key) {
      Some(default) => field.default_value(default),
      None => field,
    };

    vec![
      with_default(
        FieldDescriptor::new("account_email", "Account Email", FieldType::Text)
          .placeholder("e.g. \"user@example.com\""),
        "account_email",
      ),
      FieldDescriptor::new("api_token", "API Token", FieldType::Secret)
        .help("Generate an API token from your SessionStack account settings"),
      with_default(
        FieldDescriptor::new("website_id", "Website ID", FieldType::Text),
        "website_id",
      ),
      with_default(
        FieldDescriptor::new("api_url", "SessionStack API URL", FieldType::Text)
          .required(false)
          .placeholder("e.g. \"https://api.sessionstack.com\"")
          .help("Only needed for on-premises SessionStack installations"),
        "api_url",
      ),
    ]
  }

  /// Preprocessors to run for an event.
  ///
  /// Returns the context preprocessor only for events carrying a
  /// SessionStack session id in projects with stored credentials.
  pub fn event_preprocessors(
    &self,
    options: &impl OptionStore,
    project: &str,
    event: &Event,
  ) -> Vec<SessionStackContextPreprocessor> {
    if session_id(event).is_none() {
      return Vec::new();
    }

    match self.sessionstack_client(options, project) {
      Some(client) => vec![SessionStackContextPreprocessor { client }],
      None => {
        debug!("SessionStack is not configured for project {}", project);
        Vec::new()
      }
    }
  }
}

fn sessionstack_context(event: &Event) -> Option<&serde_json::Map<String, Value>> {
  event.get("contexts")?.get(CONTEXT_KEY)?.as_object()
}

fn session_id(event: &Event) -> Option<String> {
  sessionstack_context(event)?
    .get("session_id")
    .and_then(value_as_text)
    .filter(|id| !id.is_empty())
}

fn event_timestamp(event: &Event) -> Option<String> {
  event
    .get("timestamp")
    .and_then(value_as_text)
    .or_else(|| sessionstack_context(event)?.get("timestamp").and_then(value_as_text))
}

/// Writes a shareable replay link into an event's SessionStack context
pub struct SessionStackContextPreprocessor {
  client: SessionStackClient,
}

impl EventPreprocessor for SessionStackContextPreprocessor {
  async fn preprocess(&self, mut event: Event) -> Event {
    let Some(session_id) = session_id(&event) else {
      return event;
    };
    let timestamp = event_timestamp(&event);

    let Some(session_url) = self.client.get_session_url(&session_id, timestamp.as_deref()).await else {
      return event;
    };

    if let Some(context) = event
      .get_mut("contexts")
      .and_then(|contexts| contexts.get_mut(CONTEXT_KEY))
      .and_then(Value::as_object_mut)
    {
      context.insert("session_url".to_string(), Value::String(session_url));
    }
    event
  }
}
