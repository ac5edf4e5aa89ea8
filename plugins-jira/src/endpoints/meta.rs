//! # Jira Metadata Endpoints
//!
//! Project listing, issue-creation metadata, priorities and versions. These
//! feed the configuration and issue-creation forms and are fetched fresh on
//! every call.

use tracing::debug;

use crate::client::{JiraClient, JiraError};
use crate::consts::{CREATE_META_PATH, PRIORITIES_PATH, PROJECTS_PATH};
use crate::models::{CreateMeta, JiraProject, NamedValue, ProjectMeta};

impl JiraClient {
  /// List the projects visible to the configured user
  pub async fn get_projects_list(&self) -> Result<Vec<JiraProject>, JiraError> {
    self.get_json(&self.endpoint(PROJECTS_PATH), &[]).await
  }

  /// Fetch creation metadata for a single project, with field schemas
  /// expanded. Returns `None` when the project is unknown or invisible to
  /// the user.
  pub async fn get_create_meta_for_project(&self, project_key: &str) -> Result<Option<ProjectMeta>, JiraError> {
    debug!("Fetching createmeta for project {}", project_key);
    let meta: CreateMeta = self
      .get_json(
        &self.endpoint(CREATE_META_PATH),
        &[("projectKeys", project_key), ("expand", "projects.issuetypes.fields")],
      )
      .await?;

    Ok(meta.projects.into_iter().next())
  }

  /// List every priority configured on the instance
  pub async fn get_priorities(&self) -> Result<Vec<NamedValue>, JiraError> {
    self.get_json(&self.endpoint(PRIORITIES_PATH), &[]).await
  }

  /// List the versions of a project
  pub async fn get_versions(&self, project_key: &str) -> Result<Vec<NamedValue>, JiraError> {
    let path = format!("{PROJECTS_PATH}/{project_key}/versions");
    self.get_json(&self.endpoint(&path), &[]).await
  }
}
