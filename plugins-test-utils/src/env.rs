//! Environment variable management for testing
//!
//! Overrides the XDG directories for the lifetime of a guard so tests that
//! resolve config paths never touch the user's real configuration.

use std::env;
use std::path::PathBuf;

use tempfile::TempDir;

/// A test environment that points the XDG directories at a per-test
/// temporary directory
pub struct EnvTestGuard {
  /// The temporary directory backing the XDG directories
  pub temp_dir: TempDir,
  original_config_home: Option<String>,
  original_data_home: Option<String>,
}

impl Default for EnvTestGuard {
  fn default() -> Self {
    Self::new()
  }
}

impl EnvTestGuard {
  pub const XDG_CONFIG_HOME: &'static str = "XDG_CONFIG_HOME";
  pub const XDG_DATA_HOME: &'static str = "XDG_DATA_HOME";

  /// Create a new test environment with overridden XDG directories
  pub fn new() -> Self {
    let temp_dir = TempDir::new().expect("Failed to create temporary directory");

    let original_config_home = env::var(Self::XDG_CONFIG_HOME).ok();
    let original_data_home = env::var(Self::XDG_DATA_HOME).ok();

    let temp_path = temp_dir.path().to_path_buf();
    unsafe {
      env::set_var(Self::XDG_CONFIG_HOME, temp_path.join("config"));
      env::set_var(Self::XDG_DATA_HOME, temp_path.join("data"));
    }

    std::fs::create_dir_all(temp_path.join("config")).expect("Failed to create config directory");
    std::fs::create_dir_all(temp_path.join("data")).expect("Failed to create data directory");

    Self {
      temp_dir,
      original_config_home,
      original_data_home,
    }
  }

  /// Get the path to the XDG config directory
  pub fn config_dir(&self) -> PathBuf {
    self.temp_dir.path().join("config")
  }

  /// Get the path to the XDG data directory
  pub fn data_dir(&self) -> PathBuf {
    self.temp_dir.path().join("data")
  }
}

impl Drop for EnvTestGuard {
  fn drop(&mut self) {
    restore(Self::XDG_CONFIG_HOME, self.original_config_home.as_deref());
    restore(Self::XDG_DATA_HOME, self.original_data_home.as_deref());
  }
}

fn restore(key: &str, original: Option<&str>) {
  match original {
    Some(val) => unsafe {
      env::set_var(key, val);
    },
    None => unsafe {
      env::remove_var(key);
    },
  }
}
