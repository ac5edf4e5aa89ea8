use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode, header};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::consts::{REQUEST_TIMEOUT, USER_AGENT};
use crate::models::JiraAuth;

/// Failures talking to a Jira instance
#[derive(Debug, Error)]
pub enum JiraError {
  /// Jira rejected the credentials (HTTP 401)
  #[error("Authentication failed. Please check your Jira credentials.")]
  Unauthorized,
  /// Jira answered with a non-success status
  #[error("Jira returned HTTP {status}")]
  Api { status: u16, json: Option<Value> },
  /// The request never produced a response
  #[error("Failed to connect to Jira: {0}")]
  Transport(#[from] reqwest::Error),
  /// A response or URL could not be interpreted
  #[error("Unexpected response from Jira: {0}")]
  Parse(String),
}

impl JiraError {
  /// The `message` Jira put in an error body, falling back to its first
  /// `errorMessages` entry.
  pub fn api_message(&self) -> Option<&str> {
    let Self::Api { json: Some(json), .. } = self else {
      return None;
    };
    json.get("message").and_then(Value::as_str).or_else(|| {
      json
        .get("errorMessages")
        .and_then(Value::as_array)
        .and_then(|messages| messages.first())
        .and_then(Value::as_str)
    })
  }
}

/// Represents a Jira API client
pub struct JiraClient {
  pub(crate) client: Client,
  pub(crate) base_url: String,
  pub(crate) auth: JiraAuth,
}

impl JiraClient {
  /// Create a new Jira client with the default request timeout
  pub fn new(base_url: &str, auth: JiraAuth) -> Result<Self, JiraError> {
    Self::with_timeout(base_url, auth, REQUEST_TIMEOUT)
  }

  /// Create a new Jira client whose requests give up after `timeout`
  pub fn with_timeout(base_url: &str, auth: JiraAuth, timeout: Duration) -> Result<Self, JiraError> {
    let client = Client::builder().timeout(timeout).build()?;
    Ok(Self {
      client,
      base_url: plugins_core::url::remove_trailing_slashes(base_url),
      auth,
    })
  }

  /// The account the client authenticates as
  pub fn username(&self) -> &str {
    &self.auth.username
  }

  /// The instance the client talks to
  pub fn base_url(&self) -> &str {
    &self.base_url
  }

  pub(crate) fn endpoint(&self, path: &str) -> String {
    format!("{}{}", self.base_url, path)
  }

  /// Attach credentials, send, and classify the response status.
  pub(crate) async fn send(&self, request: RequestBuilder) -> Result<Response, JiraError> {
    let response = request
      .basic_auth(&self.auth.username, Some(&self.auth.password))
      .header(header::USER_AGENT, USER_AGENT)
      .header(header::ACCEPT, "application/json")
      .send()
      .await?;

    let status = response.status();
    debug!("Jira responded {} for {}", status, response.url());

    match status {
      s if s.is_success() => Ok(response),
      StatusCode::UNAUTHORIZED => Err(JiraError::Unauthorized),
      _ => {
        let body = response.text().await.unwrap_or_default();
        Err(JiraError::Api {
          status: status.as_u16(),
          json: serde_json::from_str(&body).ok(),
        })
      }
    }
  }

  pub(crate) async fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, &str)]) -> Result<T, JiraError> {
    let response = self.send(self.client.get(url).query(query)).await?;
    response
      .json::<T>()
      .await
      .map_err(|e| JiraError::Parse(format!("{url}: {e}")))
  }
}

/// Create a Jira client from credentials
pub fn create_jira_client(base_url: &str, username: &str, password: &str) -> Result<JiraClient, JiraError> {
  let auth = JiraAuth {
    username: username.to_string(),
    password: password.to_string(),
  };

  JiraClient::new(base_url, auth)
}
