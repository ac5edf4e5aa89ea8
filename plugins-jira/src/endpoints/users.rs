//! # Jira User Lookup
//!
//! Fetches the autocomplete URLs Jira advertises for user fields. The URL is
//! opaque to us beyond the rewriting done in [`crate::autocomplete`].

use url::Url;

use crate::client::{JiraClient, JiraError};

impl JiraClient {
  /// Fetch a fully-formed autocomplete URL and return the raw body, which is
  /// JSON or XML depending on the API variant.
  pub async fn get_autocomplete(&self, url: Url) -> Result<String, JiraError> {
    let response = self.send(self.client.get(url)).await?;
    Ok(response.text().await?)
  }
}
