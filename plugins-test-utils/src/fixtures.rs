//! Ready-made host state for plugin tests

use plugins_core::{Group, OptionStore, OptionsFile};

/// Project every fixture stores its options under
pub const TEST_PROJECT: &str = "backend";

/// Options for a Jira plugin linked to project `SEN` on `instance_url`
pub fn jira_options(instance_url: &str) -> OptionsFile {
  let mut options = OptionsFile::in_memory();
  options.set_option("jira", TEST_PROJECT, "instance_url", instance_url.into());
  options.set_option("jira", TEST_PROJECT, "username", "test_user".into());
  options.set_option("jira", TEST_PROJECT, "password", "test_token".into());
  options.set_option("jira", TEST_PROJECT, "default_project", "SEN".into());
  options
}

/// Options for a SessionStack plugin talking to `api_url` with website id 0
pub fn sessionstack_options(api_url: &str) -> OptionsFile {
  let mut options = OptionsFile::in_memory();
  options.set_option("sessionstack", TEST_PROJECT, "account_email", "user@example.com".into());
  options.set_option("sessionstack", TEST_PROJECT, "api_token", "example-api-token".into());
  options.set_option("sessionstack", TEST_PROJECT, "website_id", 0_i64.into());
  options.set_option("sessionstack", TEST_PROJECT, "api_url", api_url.into());
  options
}

/// A group in [`TEST_PROJECT`]
pub fn test_group() -> Group {
  Group {
    id: 1,
    project: TEST_PROJECT.to_string(),
    title: "ZeroDivisionError: division by zero".to_string(),
    url: "https://sentry.example.com/organizations/acme/issues/1/".to_string(),
    body: Some("ZeroDivisionError: division by zero\n  File \"app.py\", line 3".to_string()),
  }
}
