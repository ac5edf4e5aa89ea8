//! # Plugins Core Library
//!
//! Host-facing building blocks shared by the Jira and SessionStack plugins:
//! the per-project option store, group metadata, form field descriptors,
//! plugin errors, and the event preprocessing hook. The host platform owns
//! the real implementations of these surfaces; the types here model just
//! enough of them for the adapters to be driven from tests and the CLI.

pub mod config;
pub mod error;
pub mod form;
pub mod group_meta;
pub mod host;
pub mod options;
pub mod output;
pub mod url;

// Re-export main types for plugin crates
pub use config::{ConfigDirs, get_config_dirs};
pub use error::PluginError;
pub use form::{Choice, FieldDescriptor, FieldType, FormData, is_truthy};
pub use group_meta::{GroupMetaFile, GroupMetaStore};
pub use host::{Event, EventPreprocessor, Group, Plugin};
pub use options::{OptionKind, OptionStore, OptionValue, OptionsFile};
pub use output::{print_error, print_info, print_success, print_warning};
