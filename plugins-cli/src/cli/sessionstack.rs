//! # SessionStack Command

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Subcommand};
use plugins_core::output::print_success;
use plugins_core::{EventPreprocessor, FormData, OptionStore, Plugin};
use plugins_sessionstack::SessionStackPlugin;
use serde_json::Value;
use tracing::info;

use super::{Scope, print_json, read_json_object, runtime};

/// Command for the SessionStack plugin
#[derive(Args)]
pub struct SessionStackArgs {
  /// The subcommand to execute
  #[command(subcommand)]
  pub subcommand: SessionStackSubcommands,
}

/// Subcommands for the SessionStack command
#[derive(Subcommand)]
pub enum SessionStackSubcommands {
  /// Check the stored credentials and website id
  Validate,

  /// Print the configuration form as JSON
  #[command(name = "config-fields")]
  ConfigFields,

  /// Run event preprocessing on a JSON event and print the result
  #[command(long_about = "Attach a shareable replay link to an event.\n\n\
                          Events without a SessionStack session id, or projects without\n\
                          credentials, are printed unchanged.")]
  Enrich {
    /// JSON file holding the event
    #[arg(value_name = "EVENT_FILE")]
    event: PathBuf,
  },
}

/// Handle the SessionStack command
pub(crate) fn handle_sessionstack_command(args: SessionStackArgs, scope: &Scope) -> Result<()> {
  let plugin = SessionStackPlugin;
  let options = scope.load_options()?;
  let project = scope.project.as_str();
  let rt = runtime()?;

  match args.subcommand {
    SessionStackSubcommands::Validate => {
      let mut config = FormData::new();
      for key in ["account_email", "api_token", "website_id", "api_url"] {
        if let Some(value) = options.get_text(plugin.conf_key(), project, key) {
          config.insert(key.to_string(), Value::String(value));
        }
      }
      rt.block_on(plugin.validate_config(&config))?;
      print_success(&format!("{} credentials are valid", plugin.conf_title()));
    }
    SessionStackSubcommands::ConfigFields => {
      print_json(&plugin.configure_plugin_fields(&options, project))?;
    }
    SessionStackSubcommands::Enrich { event } => {
      let mut event = read_json_object(&event)?;
      let preprocessors = plugin.event_preprocessors(&options, project, &event);
      info!("Running {} preprocessor(s)", preprocessors.len());

      for preprocessor in &preprocessors {
        event = rt.block_on(preprocessor.preprocess(event));
      }
      print_json(&event)?;
    }
  }

  Ok(())
}
