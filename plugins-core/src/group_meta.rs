//! # Group Metadata
//!
//! Small per-group key/value records the host keeps for plugins, such as
//! the id of the remote issue already filed for a group.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Host storage for per-group plugin metadata
pub trait GroupMetaStore {
  fn get_value(&self, group_id: u64, key: &str) -> Option<&str>;

  fn set_value(&mut self, group_id: u64, key: &str, value: &str);
}

/// JSON file-backed group metadata
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroupMetaFile {
  #[serde(skip)]
  path: Option<PathBuf>,
  #[serde(default)]
  groups: BTreeMap<u64, BTreeMap<String, String>>,
}

impl GroupMetaFile {
  pub fn in_memory() -> Self {
    Self::default()
  }

  /// Load group metadata, starting empty if the file does not exist
  pub fn load(path: &Path) -> Result<Self> {
    let mut meta = if path.exists() {
      let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read group metadata from {}", path.display()))?;
      serde_json::from_str::<GroupMetaFile>(&content)
        .with_context(|| format!("Failed to parse group metadata from {}", path.display()))?
    } else {
      Self::default()
    };
    meta.path = Some(path.to_path_buf());
    Ok(meta)
  }

  pub fn save(&self) -> Result<()> {
    let Some(path) = &self.path else {
      return Ok(());
    };

    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent).with_context(|| format!("Failed to create data directory {}", parent.display()))?;
    }

    let content = serde_json::to_string_pretty(self).context("Failed to serialize group metadata")?;
    fs::write(path, content).with_context(|| format!("Failed to write group metadata to {}", path.display()))?;

    Ok(())
  }
}

impl GroupMetaStore for GroupMetaFile {
  fn get_value(&self, group_id: u64, key: &str) -> Option<&str> {
    self.groups.get(&group_id)?.get(key).map(String::as_str)
  }

  fn set_value(&mut self, group_id: u64, key: &str, value: &str) {
    self
      .groups
      .entry(group_id)
      .or_default()
      .insert(key.to_string(), value.to_string());
  }
}
