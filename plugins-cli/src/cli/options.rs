//! # Options Command
//!
//! Reads and writes the per-project options each plugin stores.

use anyhow::Result;
use clap::{Args, Subcommand, ValueEnum};
use owo_colors::OwoColorize;
use plugins_core::form::value_as_text;
use plugins_core::output::{print_info, print_success, print_warning};
use plugins_core::{OptionKind, OptionStore, OptionValue, Plugin};
use plugins_jira::JiraPlugin;
use plugins_sessionstack::SessionStackPlugin;
use serde_json::Value;

use super::Scope;

/// Options never echoed back in listings
const SECRET_KEYS: &[&str] = &["password", "api_token"];

/// Command for option management
#[derive(Args)]
pub struct OptionsArgs {
  /// The subcommand to execute
  #[command(subcommand)]
  pub subcommand: OptionsSubcommands,
}

/// Plugins that store options
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum PluginArg {
  Jira,
  #[value(name = "sessionstack")]
  SessionStack,
}

impl PluginArg {
  fn conf_key(self) -> &'static str {
    match self {
      Self::Jira => JiraPlugin.conf_key(),
      Self::SessionStack => SessionStackPlugin.conf_key(),
    }
  }

  fn option_kind(self, key: &str) -> OptionKind {
    match self {
      Self::Jira => JiraPlugin.option_kind(key),
      Self::SessionStack => SessionStackPlugin.option_kind(key),
    }
  }
}

/// Subcommands for the options command
#[derive(Subcommand)]
pub enum OptionsSubcommands {
  /// Store an option
  #[command(long_about = "Store an option for the selected project.\n\n\
                          Values are stored as typed, except jira auto_create (a boolean)\n\
                          and sessionstack website_id (a whole number).\n\
                          An empty Jira password keeps the stored one.")]
  Set {
    #[arg(value_enum)]
    plugin: PluginArg,
    key: String,
    value: String,
  },

  /// Print an option
  Get {
    #[arg(value_enum)]
    plugin: PluginArg,
    key: String,
  },

  /// Remove an option
  Unset {
    #[arg(value_enum)]
    plugin: PluginArg,
    key: String,
  },

  /// List a plugin's options
  List {
    #[arg(value_enum)]
    plugin: PluginArg,
  },
}

pub(crate) fn handle_options_command(args: OptionsArgs, scope: &Scope) -> Result<()> {
  let mut options = scope.load_options()?;
  let project = scope.project.as_str();

  match args.subcommand {
    OptionsSubcommands::Set { plugin, key, value } => {
      let value = match plugin {
        PluginArg::Jira => {
          let submitted = JiraPlugin.validate_config_field(&options, project, &key, Value::String(value));
          value_as_text(&submitted).unwrap_or_default()
        }
        PluginArg::SessionStack => value,
      };
      options.set_option(plugin.conf_key(), project, &key, OptionValue::parse(&value, plugin.option_kind(&key))?);
      options.save()?;
      print_success(&format!("Set {}:{} for project {}", plugin.conf_key(), key, project));
    }
    OptionsSubcommands::Get { plugin, key } => match options.get_option(plugin.conf_key(), project, &key) {
      Some(value) => println!("{value}"),
      None => anyhow::bail!("{}:{} is not set for project {}", plugin.conf_key(), key, project),
    },
    OptionsSubcommands::Unset { plugin, key } => {
      options.unset_option(plugin.conf_key(), project, &key);
      options.save()?;
      print_success(&format!("Unset {}:{} for project {}", plugin.conf_key(), key, project));
    }
    OptionsSubcommands::List { plugin } => {
      let stored = options.plugin_options(plugin.conf_key(), project);
      if stored.is_empty() {
        print_warning(&format!("No {} options stored for project {}", plugin.conf_key(), project));
        return Ok(());
      }

      print_info(&format!("{} options for project {}", plugin.conf_key(), project));
      for (key, value) in stored {
        let shown = if SECRET_KEYS.contains(&key) && value.is_set() {
          "********".to_string()
        } else {
          value.to_string()
        };
        println!("  {} = {}", key.bold(), shown);
      }
    }
  }

  Ok(())
}
