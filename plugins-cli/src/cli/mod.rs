//! # Command Line Interface
//!
//! Defines the CLI structure and command handlers for driving the plugins:
//! option management plus one command group per plugin.

mod jira;
mod options;
mod sessionstack;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::builder::Styles;
use clap::builder::styling::AnsiColor;
use clap::{ArgAction, Args, Parser, Subcommand};
use plugins_core::{ConfigDirs, FormData, Group, GroupMetaFile, OptionsFile, get_config_dirs};
use serde::Serialize;
use tracing::debug;

/// Top-level CLI command
#[derive(Parser)]
#[command(name = "sentry-plugins")]
#[command(about = "Configure and exercise the Jira and SessionStack plugins")]
#[command(
  long_about = "Drives the Jira and SessionStack plugins against a local option store.\n\n\
        Options are stored per project and plugin. Plugin commands read their\n\
        configuration from the store and talk to the configured services."
)]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(propagate_version = true)]
#[command(subcommand_required(true))]
#[command(disable_help_subcommand = true)]
#[command(max_term_width = 120)]
#[command(styles = Styles::styled()
    .header(AnsiColor::BrightGreen.on_default().bold().underline())
    .usage(AnsiColor::Green.on_default().bold())
    .literal(AnsiColor::BrightGreen.on_default().bold())
    .placeholder(AnsiColor::BrightWhite.on_default().italic())
    .valid(AnsiColor::Green.on_default())
    .invalid(AnsiColor::BrightRed.on_default().bold())
)]
pub struct Cli {
  /// Sets the level of verbosity (can be used multiple times)
  #[arg(
    short = 'v',
    long = "verbose",
    action = ArgAction::Count,
    global = true,
    long_help = "Sets the level of verbosity for tracing and logging output.\n\n\
             -v: Show info level messages\n\
             -vv: Show debug level messages\n\
             -vvv: Show trace level messages"
  )]
  pub verbose: u8,

  /// Option store to use instead of the one in the config directory
  #[arg(long = "options", value_name = "PATH", global = true)]
  pub options_path: Option<PathBuf>,

  /// Project whose options are read and written
  #[arg(long, short = 'p', global = true, default_value = "default")]
  pub project: String,

  /// Subcommands
  #[command(subcommand)]
  pub command: Commands,
}

/// Subcommands for the CLI
#[derive(Subcommand)]
pub enum Commands {
  /// Per-project plugin options
  #[command(long_about = "Set, read, remove and list the options a plugin stores for a project.")]
  #[command(arg_required_else_help = true)]
  Options(options::OptionsArgs),

  /// Jira issue-tracker plugin
  #[command(long_about = "Validate Jira credentials, render the configuration and issue forms,\n\
            create issues and proxy user autocomplete lookups.")]
  #[command(arg_required_else_help = true)]
  Jira(jira::JiraArgs),

  /// SessionStack plugin
  #[command(name = "sessionstack")]
  #[command(long_about = "Validate SessionStack credentials and enrich events with replay links.")]
  #[command(arg_required_else_help = true)]
  SessionStack(sessionstack::SessionStackArgs),
}

/// Where a command reads and writes its state
pub(crate) struct Scope {
  pub options_path: Option<PathBuf>,
  pub project: String,
}

impl Scope {
  fn default_dirs() -> Result<ConfigDirs> {
    let dirs = get_config_dirs()?;
    dirs.init()?;
    Ok(dirs)
  }

  fn options_path(&self) -> Result<PathBuf> {
    match &self.options_path {
      Some(path) => Ok(path.clone()),
      None => Ok(Self::default_dirs()?.options_path()),
    }
  }

  /// Load the option store
  pub fn load_options(&self) -> Result<OptionsFile> {
    let path = self.options_path()?;
    debug!("Loading options from {}", path.display());
    OptionsFile::load(&path)
  }

  /// Load the group metadata, kept next to an explicit option store or in
  /// the data directory otherwise.
  pub fn load_group_meta(&self) -> Result<GroupMetaFile> {
    let path = match &self.options_path {
      Some(options_path) => options_path.with_file_name("group_meta.json"),
      None => Self::default_dirs()?.group_meta_path(),
    };
    debug!("Loading group metadata from {}", path.display());
    GroupMetaFile::load(&path)
  }
}

/// Issue group the command acts on
#[derive(Args, Debug, Clone)]
pub(crate) struct GroupArgs {
  /// Id of the issue group
  #[arg(long = "group-id", default_value_t = 1)]
  pub id: u64,

  /// Title of the issue group
  #[arg(long = "group-title", default_value = "")]
  pub title: String,

  /// Link back to the issue group
  #[arg(long = "group-url", default_value = "")]
  pub url: String,

  /// Rendered event body included in issue descriptions
  #[arg(long = "group-body")]
  pub body: Option<String>,
}

impl GroupArgs {
  pub fn into_group(self, project: &str) -> Group {
    Group {
      id: self.id,
      project: project.to_string(),
      title: self.title,
      url: self.url,
      body: self.body,
    }
  }
}

/// Handle the parsed command line
pub fn handle_cli(cli: Cli) -> Result<()> {
  let scope = Scope {
    options_path: cli.options_path,
    project: cli.project,
  };

  match cli.command {
    Commands::Options(args) => options::handle_options_command(args, &scope),
    Commands::Jira(args) => jira::handle_jira_command(args, &scope),
    Commands::SessionStack(args) => sessionstack::handle_sessionstack_command(args, &scope),
  }
}

pub(crate) fn runtime() -> Result<tokio::runtime::Runtime> {
  tokio::runtime::Runtime::new().context("Failed to create tokio runtime")
}

/// Read a JSON object (form data or an event) from a file
pub(crate) fn read_json_object(path: &Path) -> Result<FormData> {
  let content = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
  let value: serde_json::Value =
    serde_json::from_str(&content).with_context(|| format!("Failed to parse JSON from {}", path.display()))?;

  match value {
    serde_json::Value::Object(map) => Ok(map),
    _ => anyhow::bail!("Expected a JSON object in {}", path.display()),
  }
}

pub(crate) fn print_json(value: &impl Serialize) -> Result<()> {
  println!(
    "{}",
    serde_json::to_string_pretty(value).context("Failed to serialize output")?
  );
  Ok(())
}
