use serde::Deserialize;

/// Represents SessionStack authentication credentials
#[derive(Clone)]
pub struct SessionStackAuth {
  pub account_email: String,
  pub api_token: String,
}

/// Response of the shareable-url endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShareableUrl {
  #[serde(default)]
  pub url: Option<String>,
}
