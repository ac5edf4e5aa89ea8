use std::time::Duration;

use reqwest::{Client, Response, StatusCode, header};
use thiserror::Error;
use tracing::{debug, warn};

use crate::consts::{API_URL, REQUEST_TIMEOUT, SESSIONS_ENDPOINT, USER_AGENT, WEBSITES_ENDPOINT};
use crate::models::{SessionStackAuth, ShareableUrl};

/// Failures validating access to the SessionStack API
#[derive(Debug, Error)]
pub enum SessionStackError {
  /// The account email or API token was rejected (HTTP 401)
  #[error("SessionStack rejected the account email or API token")]
  Unauthorized,
  /// SessionStack did not accept the website id (HTTP 400)
  #[error("SessionStack rejected the website id")]
  InvalidWebsiteId,
  /// The API url is unreachable or does not serve the SessionStack API
  #[error("The SessionStack API url is not reachable")]
  InvalidApiUrl,
  /// Any other non-success status
  #[error("SessionStack returned HTTP {status}")]
  Api { status: u16 },
  /// The request failed before a response arrived
  #[error("Failed to connect to SessionStack: {0}")]
  Transport(#[from] reqwest::Error),
}

/// Represents a SessionStack API client
pub struct SessionStackClient {
  pub(crate) client: Client,
  pub(crate) api_url: String,
  pub(crate) website_id: String,
  pub(crate) auth: SessionStackAuth,
}

impl SessionStackClient {
  /// Create a new client. A missing or blank `api_url` selects the public API.
  pub fn new(auth: SessionStackAuth, website_id: &str, api_url: Option<&str>) -> Result<Self, SessionStackError> {
    Self::with_timeout(auth, website_id, api_url, REQUEST_TIMEOUT)
  }

  /// Create a new client whose requests give up after `timeout`
  pub fn with_timeout(
    auth: SessionStackAuth,
    website_id: &str,
    api_url: Option<&str>,
    timeout: Duration,
  ) -> Result<Self, SessionStackError> {
    let api_url = api_url.filter(|url| !url.trim().is_empty()).unwrap_or(API_URL);
    let client = Client::builder().timeout(timeout).build()?;

    Ok(Self {
      client,
      api_url: plugins_core::url::remove_trailing_slashes(api_url),
      website_id: website_id.to_string(),
      auth,
    })
  }

  /// The API the client talks to
  pub fn api_url(&self) -> &str {
    &self.api_url
  }

  pub fn website_id(&self) -> &str {
    &self.website_id
  }

  fn endpoint(&self, path: &str) -> String {
    format!("{}{}", self.api_url, path)
  }

  async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Response, reqwest::Error> {
    let url = self.endpoint(path);
    debug!("GET {}", url);

    self
      .client
      .get(&url)
      .query(query)
      .basic_auth(&self.auth.account_email, Some(&self.auth.api_token))
      .header(header::USER_AGENT, USER_AGENT)
      .header(header::CONTENT_TYPE, "application/json")
      .send()
      .await
  }

  /// Check the credentials and website id against the websites endpoint
  pub async fn validate_api_access(&self) -> Result<(), SessionStackError> {
    let path = format!("{}/{}", WEBSITES_ENDPOINT, self.website_id);

    let response = match self.get(&path, &[]).await {
      Ok(response) => response,
      Err(err) if err.is_connect() || err.is_builder() => {
        debug!("SessionStack API unreachable: {}", err);
        return Err(SessionStackError::InvalidApiUrl);
      }
      Err(err) => return Err(err.into()),
    };

    match response.status() {
      s if s.is_success() => Ok(()),
      StatusCode::UNAUTHORIZED => Err(SessionStackError::Unauthorized),
      StatusCode::BAD_REQUEST => Err(SessionStackError::InvalidWebsiteId),
      StatusCode::NOT_FOUND => Err(SessionStackError::InvalidApiUrl),
      status => Err(SessionStackError::Api {
        status: status.as_u16(),
      }),
    }
  }

  /// Fetch a shareable replay link for a session.
  ///
  /// Never fails: an unreachable or stalled API, an error status or an
  /// unreadable body all yield `None`.
  pub async fn get_session_url(&self, session_id: &str, event_timestamp: Option<&str>) -> Option<String> {
    let path = format!("{SESSIONS_ENDPOINT}/{session_id}/shareable_url");
    let query: Vec<(&str, &str)> = event_timestamp.map(|ts| ("event_timestamp", ts)).into_iter().collect();

    let response = match self.get(&path, &query).await {
      Ok(response) => response,
      Err(err) if err.is_timeout() => {
        warn!("SessionStack timed out for session {}: {}", session_id, err);
        return None;
      }
      Err(err) => {
        warn!("Could not reach SessionStack for session {}: {}", session_id, err);
        return None;
      }
    };

    let status = response.status();
    if !status.is_success() {
      warn!("SessionStack returned HTTP {} for session {}", status, session_id);
      return None;
    }

    match response.json::<ShareableUrl>().await {
      Ok(shareable) => shareable.url,
      Err(err) => {
        warn!("Unreadable shareable url response for session {}: {}", session_id, err);
        None
      }
    }
  }
}

/// Create a SessionStack client from credentials
pub fn create_sessionstack_client(
  account_email: &str,
  api_token: &str,
  website_id: &str,
  api_url: Option<&str>,
) -> Result<SessionStackClient, SessionStackError> {
  let auth = SessionStackAuth {
    account_email: account_email.to_string(),
    api_token: api_token.to_string(),
  };

  SessionStackClient::new(auth, website_id, api_url)
}
