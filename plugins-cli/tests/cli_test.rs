use std::fs;
use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use plugins_test_utils::EnvTestGuard;
use predicates::prelude::*;
use serde_json::{Value, json};
use tempfile::TempDir;
use wiremock::matchers::{basic_auth, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn set_option(options: &Path, plugin: &str, key: &str, value: &str) {
  cargo_bin_cmd!("sentry-plugins")
    .arg("--options")
    .arg(options)
    .args(["--project", "backend", "options", "set", plugin, key, value])
    .assert()
    .success();
}

#[test]
fn help_output_lists_commands() {
  cargo_bin_cmd!("sentry-plugins")
    .arg("--help")
    .assert()
    .success()
    .stdout(predicate::str::contains("options"))
    .stdout(predicate::str::contains("jira"))
    .stdout(predicate::str::contains("sessionstack"))
    .stdout(predicate::str::contains("--project"));
}

#[test]
fn options_round_trip() {
  let temp = TempDir::new().unwrap();
  let options = temp.path().join("options.toml");

  set_option(&options, "jira", "instance_url", "https://jira.example.com");
  set_option(&options, "jira", "password", "hunter2");
  set_option(&options, "jira", "auto_create", "true");

  cargo_bin_cmd!("sentry-plugins")
    .arg("--options")
    .arg(&options)
    .args(["--project", "backend", "options", "get", "jira", "instance_url"])
    .assert()
    .success()
    .stdout("https://jira.example.com\n");

  cargo_bin_cmd!("sentry-plugins")
    .arg("--options")
    .arg(&options)
    .args(["--project", "backend", "options", "list", "jira"])
    .assert()
    .success()
    .stdout(predicate::str::contains("auto_create"))
    .stdout(predicate::str::contains("********"))
    .stdout(predicate::str::contains("hunter2").not());

  cargo_bin_cmd!("sentry-plugins")
    .arg("--options")
    .arg(&options)
    .args(["--project", "backend", "options", "unset", "jira", "instance_url"])
    .assert()
    .success();

  cargo_bin_cmd!("sentry-plugins")
    .arg("--options")
    .arg(&options)
    .args(["--project", "backend", "options", "get", "jira", "instance_url"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("jira:instance_url is not set for project backend"));
}

#[test]
fn blank_jira_password_keeps_stored_one() {
  let temp = TempDir::new().unwrap();
  let options = temp.path().join("options.toml");

  set_option(&options, "jira", "password", "hunter2");
  set_option(&options, "jira", "password", "");

  cargo_bin_cmd!("sentry-plugins")
    .arg("--options")
    .arg(&options)
    .args(["--project", "backend", "options", "get", "jira", "password"])
    .assert()
    .success()
    .stdout("hunter2\n");
}

#[test]
fn credentials_are_stored_verbatim() {
  let temp = TempDir::new().unwrap();
  let options = temp.path().join("options.toml");

  set_option(&options, "sessionstack", "api_token", "000123");
  set_option(&options, "jira", "password", "false");
  set_option(&options, "sessionstack", "website_id", "42");

  for (plugin, key, expected) in [
    ("sessionstack", "api_token", "000123\n"),
    ("jira", "password", "false\n"),
    ("sessionstack", "website_id", "42\n"),
  ] {
    cargo_bin_cmd!("sentry-plugins")
      .arg("--options")
      .arg(&options)
      .args(["--project", "backend", "options", "get", plugin, key])
      .assert()
      .success()
      .stdout(expected);
  }

  let stored = fs::read_to_string(&options).unwrap();
  assert!(stored.contains("000123"));
  assert!(stored.contains("= 42\n"));
}

#[test]
fn typed_options_reject_malformed_values() {
  let temp = TempDir::new().unwrap();
  let options = temp.path().join("options.toml");

  cargo_bin_cmd!("sentry-plugins")
    .arg("--options")
    .arg(&options)
    .args(["options", "set", "sessionstack", "website_id", "abc"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("'abc' is not a whole number"));
}

#[test]
fn options_default_to_config_dir() {
  let guard = EnvTestGuard::new();

  cargo_bin_cmd!("sentry-plugins")
    .env(EnvTestGuard::XDG_CONFIG_HOME, guard.config_dir())
    .env(EnvTestGuard::XDG_DATA_HOME, guard.data_dir())
    .args(["options", "set", "sessionstack", "website_id", "0"])
    .assert()
    .success();

  let stored = fs::read_to_string(guard.config_dir().join("sentry-plugins").join("options.toml")).unwrap();
  assert!(stored.contains("sessionstack:website_id"));
  assert!(guard.data_dir().join("sentry-plugins").is_dir());
}

#[test]
fn jira_issue_url() {
  let temp = TempDir::new().unwrap();
  let options = temp.path().join("options.toml");
  set_option(&options, "jira", "instance_url", "https://jira.example.com/");

  cargo_bin_cmd!("sentry-plugins")
    .arg("--options")
    .arg(&options)
    .args(["--project", "backend", "jira", "issue-url", "SEN-7"])
    .assert()
    .success()
    .stdout("https://jira.example.com/browse/SEN-7\n");
}

#[test]
fn jira_create_requires_issue_type() {
  let temp = TempDir::new().unwrap();
  let options = temp.path().join("options.toml");
  let form = temp.path().join("form.json");
  fs::write(&form, json!({"title": "Boom"}).to_string()).unwrap();

  cargo_bin_cmd!("sentry-plugins")
    .arg("--options")
    .arg(&options)
    .args(["jira", "create", "--group-id", "7", "--form"])
    .arg(&form)
    .assert()
    .failure()
    .stderr(predicate::str::contains("Issue Type is required."));
}

#[test]
fn sessionstack_enrich_passes_through_events_without_session() {
  let temp = TempDir::new().unwrap();
  let options = temp.path().join("options.toml");
  let event_file = temp.path().join("event.json");
  let event = json!({"platform": "javascript", "contexts": {"browser": {"name": "Firefox"}}});
  fs::write(&event_file, event.to_string()).unwrap();

  let output = cargo_bin_cmd!("sentry-plugins")
    .arg("--options")
    .arg(&options)
    .args(["sessionstack", "enrich"])
    .arg(&event_file)
    .output()
    .unwrap();

  assert!(output.status.success());
  let printed: Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(printed, event);
}

#[tokio::test(flavor = "multi_thread")]
async fn sessionstack_validate_uses_stored_credentials() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/v1/websites/0"))
    .and(basic_auth("user@example.com", "example-api-token"))
    .respond_with(ResponseTemplate::new(200))
    .mount(&server)
    .await;

  let temp = TempDir::new().unwrap();
  let options = temp.path().join("options.toml");
  set_option(&options, "sessionstack", "account_email", "user@example.com");
  set_option(&options, "sessionstack", "api_token", "example-api-token");
  set_option(&options, "sessionstack", "website_id", "0");
  set_option(&options, "sessionstack", "api_url", &server.uri());

  cargo_bin_cmd!("sentry-plugins")
    .arg("--options")
    .arg(&options)
    .args(["--project", "backend", "sessionstack", "validate"])
    .assert()
    .success()
    .stdout(predicate::str::contains("SessionStack credentials are valid"));

  set_option(&options, "sessionstack", "website_id", "5");

  cargo_bin_cmd!("sentry-plugins")
    .arg("--options")
    .arg(&options)
    .args(["--project", "backend", "sessionstack", "validate"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("The SessionStack API URL is not reachable"));
}
