//! # Jira Issue Endpoints

use serde_json::{Map, Value};
use tracing::info;

use crate::client::{JiraClient, JiraError};
use crate::consts::CREATE_ISSUE_PATH;
use crate::models::{CreateIssueRequest, CreatedIssue};

impl JiraClient {
  /// Create an issue from an already-shaped `fields` payload
  pub async fn create_issue(&self, fields: &Map<String, Value>) -> Result<CreatedIssue, JiraError> {
    let payload = CreateIssueRequest { fields };

    let response = self
      .send(self.client.post(self.endpoint(CREATE_ISSUE_PATH)).json(&payload))
      .await?;

    let issue = response
      .json::<CreatedIssue>()
      .await
      .map_err(|e| JiraError::Parse(format!("created issue: {e}")))?;
    info!("Created Jira issue {}", issue.key);
    Ok(issue)
  }
}
