//! # Jira Issue-Tracker Plugin
//!
//! Wires the Jira client, field mapping and payload building into the
//! operations the host invokes: configuration forms and validation, the
//! issue-creation form, issue creation, the autocomplete proxy, and
//! automatic ticket creation for new groups.

use plugins_core::form::value_as_text;
use plugins_core::{
  Choice, FieldDescriptor, FieldType, FormData, Group, GroupMetaStore, OptionKind, OptionStore, Plugin, PluginError,
  is_truthy,
};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::{debug, error, warn};

use crate::autocomplete::{parse_users, rewrite_autocomplete_url};
use crate::client::{JiraClient, JiraError, create_jira_client};
use crate::consts::{ERR_INTERNAL, ERR_UNAUTHORIZED, TICKET_ID_SUFFIX};
use crate::fields::{
  build_dynamic_field, issue_type_choices, issue_type_meta, make_choices, ordered_field_names,
};
use crate::payload::build_issue_fields;

/// Form values copied from the issue form when creating tickets automatically.
const AUTO_CREATE_FIELDS: &[&str] = &["priority", "issuetype", "title", "description", "project"];

/// Query parameters of an autocomplete request routed to the plugin
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AutocompleteRequest {
  #[serde(default)]
  pub autocomplete_query: String,
  #[serde(default)]
  pub autocomplete_field: String,
  /// Autocomplete URL advertised by Jira for the field
  #[serde(default)]
  pub jira_url: Option<String>,
}

/// Links a project's issue groups to a Jira project
#[derive(Debug, Default, Clone, Copy)]
pub struct JiraPlugin;

impl Plugin for JiraPlugin {
  fn slug(&self) -> &'static str {
    "jira"
  }

  fn title(&self) -> &'static str {
    "JIRA"
  }

  fn description(&self) -> &'static str {
    "Integrate JIRA issues by linking a project."
  }

  fn option_kind(&self, key: &str) -> OptionKind {
    match key {
      "auto_create" => OptionKind::Bool,
      _ => OptionKind::Text,
    }
  }
}

impl JiraPlugin {
  /// Issue actions the host offers for linked groups
  pub const ALLOWED_ACTIONS: &'static [&'static str] = &["create", "unlink"];

  fn option(&self, options: &impl OptionStore, project: &str, key: &str) -> Option<String> {
    options.get_text(self.conf_key(), project, key)
  }

  /// A project is usable once it is linked to a Jira project.
  pub fn is_configured(&self, options: &impl OptionStore, project: &str) -> bool {
    self.option(options, project, "default_project").is_some()
  }

  /// Build a client from the project's stored credentials
  pub fn jira_client(&self, options: &impl OptionStore, project: &str) -> Result<JiraClient, PluginError> {
    let credentials = (
      self.option(options, project, "instance_url"),
      self.option(options, project, "username"),
      self.option(options, project, "password"),
    );
    match credentials {
      (Some(instance), Some(username), Some(password)) => {
        create_jira_client(&instance, &username, &password).map_err(|err| self.raise_error(err))
      }
      _ => Err(PluginError::Configuration(
        "JIRA is not configured for this project. Please check your configuration.".to_string(),
      )),
    }
  }

  fn linked_project(&self, options: &impl OptionStore, project: &str) -> Result<String, PluginError> {
    self
      .option(options, project, "default_project")
      .ok_or_else(|| PluginError::Configuration("No JIRA project is linked. Please check your configuration.".to_string()))
  }

  /// User-facing text for a Jira failure
  pub fn message_from_error(err: &JiraError) -> String {
    match err {
      JiraError::Unauthorized => ERR_UNAUTHORIZED.to_string(),
      JiraError::Api { status, .. } => format!(
        "Error Communicating with Jira (HTTP {}): {}",
        status,
        err.api_message().unwrap_or("unknown error")
      ),
      JiraError::Transport(_) | JiraError::Parse(_) => ERR_INTERNAL.to_string(),
    }
  }

  /// Convert a Jira failure into a plugin error, logging anything Jira did
  /// not explicitly answer.
  pub fn raise_error(&self, err: JiraError) -> PluginError {
    if !matches!(err, JiraError::Unauthorized | JiraError::Api { .. }) {
      error!("{}", err);
    }
    PluginError::Integration(Self::message_from_error(&err))
  }

  /// Group link followed by the event body in a Jira `{code}` block
  pub fn group_description(&self, group: &Group) -> String {
    let mut output = vec![group.url.clone()];
    if let Some(body) = group.body.as_deref().filter(|body| !body.is_empty()) {
      output.extend(["".to_string(), "{code}".to_string(), body.to_string(), "{code}".to_string()]);
    }
    output.join("\n")
  }

  /// Title and description fields every issue form starts from
  fn base_issue_fields(&self, group: &Group) -> Vec<FieldDescriptor> {
    vec![
      FieldDescriptor::new("title", "Title", FieldType::Text).default_value(group.title.as_str()),
      FieldDescriptor::new("description", "Description", FieldType::Textarea)
        .default_value(self.group_description(group)),
    ]
  }

  /// Build the issue-creation form for a group.
  ///
  /// `issue_type` is the type picked in the dialog, if any; otherwise the
  /// project's default issue type (or the first one Jira lists) is used.
  pub async fn new_issue_fields(
    &self,
    options: &impl OptionStore,
    group: &Group,
    issue_type: Option<&str>,
  ) -> Result<Vec<FieldDescriptor>, PluginError> {
    let jira_project_key = self.linked_project(options, &group.project)?;
    let client = self.jira_client(options, &group.project)?;

    let meta = match client.get_create_meta_for_project(&jira_project_key).await {
      Ok(meta) => meta,
      Err(JiraError::Unauthorized) => {
        return Err(PluginError::Configuration(
          "Something went wrong. Please check your configuration.".to_string(),
        ));
      }
      Err(err) => return Err(self.raise_error(err)),
    };
    let Some(meta) = meta else {
      return Err(PluginError::Configuration(format!(
        "Error in JIRA configuration, no projects found for user {}.",
        client.username()
      )));
    };

    let issue_type = issue_type
      .map(str::to_string)
      .or_else(|| self.option(options, &group.project, "default_issue_type"));
    let Some(type_meta) = issue_type_meta(issue_type.as_deref(), &meta) else {
      return Err(PluginError::Configuration(format!(
        "Error in JIRA configuration, project {jira_project_key} has no issue types."
      )));
    };

    let mut fields = vec![
      FieldDescriptor::new("project", "Jira Project", FieldType::Select)
        .choices(vec![Choice::new(meta.id.as_str(), jira_project_key.as_str())])
        .default_value(meta.id.as_str())
        .readonly(),
    ];
    fields.extend(self.base_issue_fields(group));
    fields.push(
      FieldDescriptor::new("issuetype", "Issue Type", FieldType::Select)
        .default_value(issue_type.unwrap_or_else(|| type_meta.id.clone()))
        .choices(issue_type_choices(&meta)),
    );

    // title is sent to Jira as summary
    let mut standard_fields: Vec<String> = fields.iter().map(|f| f.name.clone()).collect();
    standard_fields.push("summary".to_string());
    let ignored_fields = self.option(options, &group.project, "ignored_fields").unwrap_or_default();
    let ignored_fields: Vec<&str> = ignored_fields.split(',').map(str::trim).collect();

    for name in ordered_field_names(&type_meta.fields) {
      if standard_fields.iter().any(|f| f == name) || ignored_fields.contains(&name) {
        continue;
      }
      if let Some(mut field) = build_dynamic_field(group.id, &type_meta.fields[name]) {
        field.name = name.to_string();
        fields.push(field);
      }
    }

    for field in &mut fields {
      match field.name.as_str() {
        "priority" => {
          // allowedValues lacks detail for priorities; list them directly.
          let priorities = client.get_priorities().await.map_err(|err| self.raise_error(err))?;
          field.choices = Some(make_choices(Some(priorities.as_slice())));
          field.default = Some(Value::String(
            self.option(options, &group.project, "default_priority").unwrap_or_default(),
          ));
        }
        "fixVersions" => {
          let versions = client
            .get_versions(&jira_project_key)
            .await
            .map_err(|err| self.raise_error(err))?;
          field.choices = Some(make_choices(Some(versions.as_slice())));
        }
        _ => {}
      }
    }

    Ok(fields)
  }

  /// Create a Jira issue from submitted form data and return its key
  pub async fn create_issue(
    &self,
    options: &impl OptionStore,
    group: &Group,
    form_data: &FormData,
  ) -> Result<String, PluginError> {
    // A misconfigured form can be submitted without an issue type.
    let Some(issue_type) = form_data.get("issuetype").filter(|v| is_truthy(v)).and_then(value_as_text) else {
      return Err(PluginError::Validation("Issue Type is required.".to_string()));
    };

    let jira_project_key = self.linked_project(options, &group.project)?;
    let client = self.jira_client(options, &group.project)?;
    let meta = client
      .get_create_meta_for_project(&jira_project_key)
      .await
      .map_err(|err| self.raise_error(err))?
      .ok_or_else(|| PluginError::Configuration("Something went wrong. Check your plugin configuration.".to_string()))?;

    let Some(type_meta) = issue_type_meta(Some(issue_type.as_str()), &meta) else {
      return Err(PluginError::Configuration(
        "Something went wrong. Check your plugin configuration.".to_string(),
      ));
    };

    let fields = build_issue_fields(form_data, type_meta);
    debug!("Creating {} issue in {}", type_meta.name, jira_project_key);
    let issue = client.create_issue(&fields).await.map_err(|err| self.raise_error(err))?;

    Ok(issue.key)
  }

  /// Label shown for a linked issue
  pub fn issue_label(&self, issue_id: &str) -> String {
    issue_id.to_string()
  }

  /// Link to a linked issue on the configured instance
  pub fn issue_url(&self, options: &impl OptionStore, project: &str, issue_id: &str) -> Option<String> {
    let instance = self.option(options, project, "instance_url")?;
    Some(format!("{}/browse/{}", instance.trim_end_matches('/'), issue_id))
  }

  /// Proxy a user-field autocomplete lookup to Jira.
  ///
  /// Responds with `{<autocomplete_field>: [{id, text}, ...]}`.
  pub async fn view_autocomplete(
    &self,
    options: &impl OptionStore,
    group: &Group,
    request: &AutocompleteRequest,
  ) -> Result<Value, PluginError> {
    let mut response = Map::new();
    let Some(jira_url) = request.jira_url.as_deref().filter(|url| !url.is_empty()) else {
      response.insert(request.autocomplete_field.clone(), json!([]));
      return Ok(Value::Object(response));
    };

    let client = self.jira_client(options, &group.project)?;
    let project = self.option(options, &group.project, "default_project").unwrap_or_default();

    let (final_url, variant) = rewrite_autocomplete_url(jira_url, &request.autocomplete_query, &project);
    let url = plugins_core::url::resolve_against(client.base_url(), &final_url)
      .map_err(|err| self.raise_error(JiraError::Parse(err.to_string())))?;

    let body = client.get_autocomplete(url).await.map_err(|err| self.raise_error(err))?;
    let users = parse_users(&body, variant).map_err(|err| self.raise_error(err))?;

    let users = users
      .into_iter()
      .map(|user| json!({ "id": user.id, "text": user.text }))
      .collect();
    response.insert(request.autocomplete_field.clone(), Value::Array(users));
    Ok(Value::Object(response))
  }

  /// Normalize a submitted configuration value.
  ///
  /// A blank password keeps the stored one so users don't have to re-enter
  /// it on every save.
  pub fn validate_config_field(&self, options: &impl OptionStore, project: &str, name: &str, value: Value) -> Value {
    if name == "password" && !is_truthy(&value) {
      return self
        .option(options, project, "password")
        .map(Value::String)
        .unwrap_or(value);
    }
    value
  }

  /// Check submitted credentials by listing projects on the instance
  pub async fn validate_config(&self, config: &FormData) -> Result<(), PluginError> {
    let text = |key: &str, label: &str| {
      config
        .get(key)
        .filter(|v| is_truthy(v))
        .and_then(value_as_text)
        .ok_or_else(|| PluginError::Configuration(format!("{label} is required.")))
    };
    let instance_url = text("instance_url", "JIRA Instance URL")?;
    let username = text("username", "Username")?;
    let password = text("password", "Password")?;

    let as_config_error = |err: JiraError| PluginError::Configuration(self.raise_error(err).message().to_string());
    let client = create_jira_client(&instance_url, &username, &password).map_err(as_config_error)?;
    client.get_projects_list().await.map_err(as_config_error)?;

    Ok(())
  }

  /// Build the configuration form, filling choice lists from Jira when the
  /// stored credentials allow it. Lookups that fail leave their list empty.
  pub async fn configure_plugin_fields(&self, options: &impl OptionStore, project: &str) -> Vec<FieldDescriptor> {
    let instance = self.option(options, project, "instance_url");
    let username = self.option(options, project, "username");
    let password = self.option(options, project, "password");
    let jira_project = self.option(options, project, "default_project");

    let mut project_choices = Vec::new();
    let mut priority_choices = Vec::new();
    let mut issue_type_choice_list = Vec::new();

    let client = match (&instance, &username, &password) {
      (Some(instance), Some(username), Some(password)) => match create_jira_client(instance, username, password) {
        Ok(client) => Some(client),
        Err(err) => {
          warn!("Failed to build Jira client: {}", err);
          None
        }
      },
      _ => None,
    };

    if let Some(client) = client {
      match client.get_projects_list().await {
        Ok(projects) => {
          project_choices = projects
            .iter()
            .map(|p| Choice::new(p.key.as_str(), format!("{} ({})", p.name, p.key)))
            .collect();
        }
        Err(err) => warn!("Failed to list Jira projects: {}", err),
      }

      if let Some(jira_project) = &jira_project {
        match client.get_priorities().await {
          Ok(priorities) => {
            priority_choices = priorities
              .iter()
              .map(|p| Choice::new(p.id.as_str(), p.name.as_deref().unwrap_or_default()))
              .collect();
          }
          Err(err) => warn!("Failed to list Jira priorities: {}", err),
        }

        match client.get_create_meta_for_project(jira_project).await {
          Ok(Some(meta)) => issue_type_choice_list = issue_type_choices(&meta),
          Ok(None) => {}
          Err(err) => warn!("Failed to fetch Jira createmeta: {}", err),
        }
      }
    }

    let with_default = |field: FieldDescriptor, default: Option<String>| match default {
      Some(default) => field.default_value(default),
      None => field,
    };

    let mut password_field = FieldDescriptor::new("password", "Password", FieldType::Secret).required(password.is_none());
    if password.is_some() {
      password_field = password_field.help("Only enter a new password if you wish to update the stored value");
    }

    vec![
      with_default(
        FieldDescriptor::new("instance_url", "JIRA Instance URL", FieldType::Text)
          .placeholder("e.g. \"https://jira.atlassian.com\"")
          .help("It must be visible to the Sentry server"),
        instance,
      ),
      with_default(
        FieldDescriptor::new("username", "Username", FieldType::Text)
          .help("Ensure the JIRA user has admin permissions on the project"),
        username,
      ),
      password_field,
      with_default(
        FieldDescriptor::new("default_project", "Linked Project", FieldType::Select)
          .choices(project_choices)
          .required(false),
        jira_project,
      ),
      FieldDescriptor::new("ignored_fields", "Ignored Fields", FieldType::Textarea)
        .required(false)
        .placeholder("e.g. \"components, security, customfield_10006\"")
        .default_value(self.option(options, project, "ignored_fields").unwrap_or_default())
        .help("Comma-separated list of properties that you don't want to show in the form"),
      with_default(
        FieldDescriptor::new("default_priority", "Default Priority", FieldType::Select)
          .choices(priority_choices)
          .required(false),
        self.option(options, project, "default_priority"),
      ),
      with_default(
        FieldDescriptor::new("default_issue_type", "Default Issue Type", FieldType::Select)
          .choices(issue_type_choice_list)
          .required(false),
        self.option(options, project, "default_issue_type"),
      ),
      FieldDescriptor::new("auto_create", "Automatically create JIRA Tickets", FieldType::Bool)
        .default_value(options.get_bool(self.conf_key(), project, "auto_create"))
        .required(false)
        .help("Automatically create a JIRA ticket for EVERY new issue"),
    ]
  }

  fn ticket_key(&self) -> String {
    format!("{}:{}", self.conf_key(), TICKET_ID_SUFFIX)
  }

  /// Whether a ticket should be filed automatically for this group
  pub fn should_create(
    &self,
    options: &impl OptionStore,
    group_meta: &impl GroupMetaStore,
    group: &Group,
    is_new: bool,
  ) -> bool {
    is_new
      && options.get_bool(self.conf_key(), &group.project, "auto_create")
      && group_meta.get_value(group.id, &self.ticket_key()).is_none()
  }

  /// Automatically file a ticket for a new group.
  ///
  /// Uses the issue form's defaults, appending the stacktrace to the
  /// description. Failures are logged and never propagated; returns the
  /// created issue key when a ticket was filed.
  pub async fn post_process(
    &self,
    options: &impl OptionStore,
    group_meta: &mut impl GroupMetaStore,
    group: &Group,
    stacktrace: Option<&str>,
    is_new: bool,
  ) -> Option<String> {
    if !self.should_create(options, &*group_meta, group, is_new) {
      return None;
    }

    let fields = match self.new_issue_fields(options, group, None).await {
      Ok(fields) => fields,
      Err(err) => {
        error!("Error creating JIRA ticket: {}", err);
        return None;
      }
    };

    let mut post_data = FormData::new();
    for field in fields {
      if AUTO_CREATE_FIELDS.contains(&field.name.as_str()) {
        post_data.insert(field.name, field.default.unwrap_or(Value::Null));
      }
    }

    let has = |name: &str| post_data.get(name).is_some_and(is_truthy);
    if !(has("priority") && has("issuetype") && has("project")) {
      debug!("Skipping automatic JIRA ticket for group {}: no default priority", group.id);
      return None;
    }

    if let Some(stacktrace) = stacktrace {
      let description = post_data
        .get("description")
        .and_then(Value::as_str)
        .unwrap_or_default();
      let description = format!("{description}\n{{code}}{stacktrace}{{code}}");
      post_data.insert("description".to_string(), Value::String(description));
    }

    match self.create_issue(options, group, &post_data).await {
      Ok(issue_id) => {
        group_meta.set_value(group.id, &self.ticket_key(), &issue_id);
        Some(issue_id)
      }
      Err(err) => {
        error!("Error creating JIRA ticket: {}", err);
        None
      }
    }
  }
}
