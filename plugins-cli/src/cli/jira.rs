//! # Jira Command
//!
//! Runs the Jira plugin's operations for the selected project: credential
//! validation, configuration and issue forms, issue creation, autocomplete
//! and automatic ticket creation.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use plugins_core::output::{print_info, print_success, print_warning};
use plugins_core::{FormData, OptionStore, Plugin};
use plugins_jira::{AutocompleteRequest, JiraPlugin};
use serde_json::Value;

use super::{GroupArgs, Scope, print_json, read_json_object, runtime};

/// Command for the Jira plugin
#[derive(Args)]
pub struct JiraArgs {
  /// The subcommand to execute
  #[command(subcommand)]
  pub subcommand: JiraSubcommands,
}

/// Subcommands for the Jira command
#[derive(Subcommand)]
pub enum JiraSubcommands {
  /// Check the stored credentials against the instance
  Validate,

  /// Print the configuration form as JSON
  #[command(name = "config-fields")]
  ConfigFields,

  /// Print the issue-creation form for a group as JSON
  #[command(long_about = "Build the issue-creation form for a group from Jira's createmeta.\n\n\
                          Uses the project's default issue type unless one is given.")]
  Fields {
    #[command(flatten)]
    group: GroupArgs,

    /// Issue type id to build the form for
    #[arg(long = "issue-type")]
    issue_type: Option<String>,
  },

  /// Create an issue from a JSON file of form values
  Create {
    #[command(flatten)]
    group: GroupArgs,

    /// JSON object of submitted form values
    #[arg(long = "form", value_name = "FILE")]
    form: PathBuf,
  },

  /// Look up users for a user field
  Autocomplete {
    #[command(flatten)]
    group: GroupArgs,

    /// Autocomplete URL advertised by Jira for the field
    #[arg(long = "jira-url")]
    jira_url: Option<String>,

    /// What the user typed
    #[arg(long, default_value = "")]
    query: String,

    /// Name of the field being completed
    #[arg(long)]
    field: String,
  },

  /// Print the link to an issue
  #[command(name = "issue-url")]
  IssueUrl {
    /// The Jira issue key (e.g., SEN-123)
    key: String,
  },

  /// File a ticket for a new group if automatic creation is enabled
  #[command(name = "post-process")]
  #[command(long_about = "Run automatic ticket creation for a group.\n\n\
                          A ticket is filed only for new groups, when auto_create is enabled\n\
                          and no ticket was filed for the group before.")]
  PostProcess {
    #[command(flatten)]
    group: GroupArgs,

    /// File whose contents are appended to the description as a stacktrace
    #[arg(long = "stacktrace", value_name = "FILE")]
    stacktrace: Option<PathBuf>,

    /// Treat the group as one seen before
    #[arg(long)]
    existing: bool,
  },
}

/// Handle the Jira command
pub(crate) fn handle_jira_command(jira: JiraArgs, scope: &Scope) -> Result<()> {
  let plugin = JiraPlugin;
  let options = scope.load_options()?;
  let project = scope.project.as_str();
  let rt = runtime()?;

  match jira.subcommand {
    JiraSubcommands::Validate => {
      let mut config = FormData::new();
      for key in ["instance_url", "username", "password"] {
        if let Some(value) = options.get_text(plugin.conf_key(), project, key) {
          config.insert(key.to_string(), Value::String(value));
        }
      }
      rt.block_on(plugin.validate_config(&config))?;
      print_success(&format!("{} credentials are valid", plugin.conf_title()));
    }
    JiraSubcommands::ConfigFields => {
      let fields = rt.block_on(plugin.configure_plugin_fields(&options, project));
      print_json(&fields)?;
    }
    JiraSubcommands::Fields { group, issue_type } => {
      let group = group.into_group(project);
      let fields = rt.block_on(plugin.new_issue_fields(&options, &group, issue_type.as_deref()))?;
      print_json(&fields)?;
    }
    JiraSubcommands::Create { group, form } => {
      let group = group.into_group(project);
      let form_data = read_json_object(&form)?;
      let key = rt.block_on(plugin.create_issue(&options, &group, &form_data))?;

      print_success(&format!("Created {}", plugin.issue_label(&key)));
      if let Some(url) = plugin.issue_url(&options, project, &key) {
        print_info(&url);
      }
    }
    JiraSubcommands::Autocomplete {
      group,
      jira_url,
      query,
      field,
    } => {
      let group = group.into_group(project);
      let request = AutocompleteRequest {
        autocomplete_query: query,
        autocomplete_field: field,
        jira_url,
      };
      let response = rt.block_on(plugin.view_autocomplete(&options, &group, &request))?;
      print_json(&response)?;
    }
    JiraSubcommands::IssueUrl { key } => match plugin.issue_url(&options, project, &key) {
      Some(url) => println!("{url}"),
      None => anyhow::bail!("JIRA instance_url is not set for project {project}"),
    },
    JiraSubcommands::PostProcess {
      group,
      stacktrace,
      existing,
    } => {
      let group = group.into_group(project);
      let stacktrace = stacktrace
        .map(|path| fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display())))
        .transpose()?;
      let mut group_meta = scope.load_group_meta()?;

      let filed = rt.block_on(plugin.post_process(
        &options,
        &mut group_meta,
        &group,
        stacktrace.as_deref(),
        !existing,
      ));
      match filed {
        Some(key) => {
          group_meta.save()?;
          print_success(&format!("Created {} for group {}", plugin.issue_label(&key), group.id));
        }
        None => print_warning(&format!("No ticket created for group {}", group.id)),
      }
    }
  }

  Ok(())
}
