//! Errors surfaced to the host when a plugin operation fails.

use thiserror::Error;

/// A user-facing plugin failure.
///
/// The message is what the host shows inline (configuration) or in the
/// issue-creation dialog, so variants carry pre-rendered text rather than
/// the underlying transport error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PluginError {
  /// Submitted form data failed a presence or shape check.
  #[error("{0}")]
  Validation(String),
  /// Stored or submitted configuration is missing or rejected by the remote service.
  #[error("{0}")]
  Configuration(String),
  /// The remote service failed while handling a request.
  #[error("{0}")]
  Integration(String),
}

impl PluginError {
  /// The message shown to the user.
  pub fn message(&self) -> &str {
    match self {
      Self::Validation(message) | Self::Configuration(message) | Self::Integration(message) => message,
    }
  }
}
