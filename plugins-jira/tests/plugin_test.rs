//! End-to-end tests of the Jira plugin against a mocked Jira instance.

use plugins_core::{FieldType, FormData, GroupMetaFile, GroupMetaStore, OptionStore, Plugin, PluginError};
use plugins_jira::consts::{ERR_UNAUTHORIZED, JSON_AUTOCOMPLETE_MARKER};
use plugins_jira::{AutocompleteRequest, JiraPlugin};
use plugins_test_utils::{TEST_PROJECT, jira_options, test_group};
use serde_json::{Value, json};
use wiremock::matchers::{any, basic_auth, body_json, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_meta() -> Value {
  json!({
      "expand": "projects",
      "projects": [{
          "id": "10000",
          "key": "SEN",
          "name": "Sentry",
          "issuetypes": [
              {
                  "id": "1",
                  "name": "Bug",
                  "fields": {
                      "summary": {"name": "Summary", "required": true, "schema": {"type": "string"}},
                      "description": {"name": "Description", "required": false, "schema": {"type": "string"}},
                      "project": {"name": "Project", "required": true, "schema": {"type": "project"}},
                      "issuetype": {"name": "Issue Type", "required": true, "schema": {"type": "issuetype"}},
                      "priority": {
                          "name": "Priority", "required": false, "schema": {"type": "priority"},
                          "allowedValues": [{"id": "1"}]
                      },
                      "fixVersions": {
                          "name": "Fix Version/s", "required": false,
                          "schema": {"type": "array", "items": "version"},
                          "allowedValues": []
                      },
                      "components": {
                          "name": "Component/s", "required": false,
                          "schema": {"type": "array", "items": "component"},
                          "allowedValues": [{"id": "10", "name": "API"}]
                      },
                      "assignee": {
                          "name": "Assignee", "required": false, "schema": {"type": "user"},
                          "autoCompleteUrl": "https://jira.example.com/rest/api/latest/user/assignable/search?issueKey=null&username="
                      },
                      "labels": {"name": "Labels", "required": false, "schema": {"type": "array", "items": "string"}},
                      "customfield_10006": {"name": "Epic Link", "required": false, "schema": {"type": "any"}},
                      "timetracking": {"name": "Time tracking", "required": false, "schema": {"type": "timetracking"}}
                  }
              },
              {"id": "3", "name": "Task", "fields": {}}
          ]
      }]
  })
}

async fn mount_create_meta(server: &MockServer) {
  Mock::given(method("GET"))
    .and(path("/rest/api/2/issue/createmeta"))
    .and(query_param("projectKeys", "SEN"))
    .and(basic_auth("test_user", "test_token"))
    .respond_with(ResponseTemplate::new(200).set_body_json(create_meta()))
    .mount(server)
    .await;
}

async fn mount_priorities(server: &MockServer) {
  Mock::given(method("GET"))
    .and(path("/rest/api/2/priority"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!([
        {"id": "1", "name": "Highest"},
        {"id": "3", "name": "Medium"}
    ])))
    .mount(server)
    .await;
}

fn form(value: Value) -> FormData {
  value.as_object().cloned().unwrap_or_default()
}

#[tokio::test]
async fn test_create_issue_requires_issuetype_before_any_request() {
  let server = MockServer::start().await;
  Mock::given(any())
    .respond_with(ResponseTemplate::new(200))
    .expect(0)
    .mount(&server)
    .await;

  let plugin = JiraPlugin;
  let options = jira_options(&server.uri());

  for form_data in [form(json!({"title": "Boom"})), form(json!({"title": "Boom", "issuetype": ""}))] {
    let err = plugin
      .create_issue(&options, &test_group(), &form_data)
      .await
      .unwrap_err();
    assert_eq!(err, PluginError::Validation("Issue Type is required.".to_string()));
  }
}

#[tokio::test]
async fn test_new_issue_fields() -> anyhow::Result<()> {
  let server = MockServer::start().await;
  mount_create_meta(&server).await;
  mount_priorities(&server).await;
  Mock::given(method("GET"))
    .and(path("/rest/api/2/project/SEN/versions"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "10200", "name": "1.0"}])))
    .mount(&server)
    .await;

  let plugin = JiraPlugin;
  let mut options = jira_options(&server.uri());
  options.set_option("jira", TEST_PROJECT, "ignored_fields", "customfield_10006, labels".into());
  options.set_option("jira", TEST_PROJECT, "default_priority", "3".into());

  let group = test_group();
  let fields = plugin.new_issue_fields(&options, &group, None).await?;
  let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
  assert_eq!(
    names,
    vec![
      "project",
      "title",
      "description",
      "issuetype",
      "priority",
      "fixVersions",
      "components",
      "assignee"
    ]
  );

  let project = &fields[0];
  assert!(project.readonly);
  assert_eq!(project.default, Some(json!("10000")));

  let title = &fields[1];
  assert_eq!(title.default, Some(json!(group.title)));

  let description = &fields[2];
  assert_eq!(description.field_type, FieldType::Textarea);
  assert_eq!(
    description.default,
    Some(json!(format!("{}\n\n{{code}}\n{}\n{{code}}", group.url, group.body.clone().unwrap())))
  );

  let issuetype = &fields[3];
  assert_eq!(issuetype.default, Some(json!("1")));
  assert_eq!(issuetype.choices.as_ref().map(Vec::len), Some(2));

  let priority = &fields[4];
  assert_eq!(priority.default, Some(json!("3")));
  assert_eq!(priority.choices.as_ref().unwrap()[1].label(), "Medium");

  let versions = &fields[5];
  assert_eq!(versions.choices.as_ref().unwrap()[0].id(), "10200");

  let assignee = &fields[7];
  assert!(assignee.has_autocomplete);
  assert!(
    assignee
      .url
      .as_deref()
      .unwrap()
      .starts_with(&format!("/api/0/issues/{}/plugins/jira/autocomplete?jira_url=", group.id))
  );
  Ok(())
}

#[tokio::test]
async fn test_new_issue_fields_uses_requested_issue_type() -> anyhow::Result<()> {
  let server = MockServer::start().await;
  mount_create_meta(&server).await;

  let plugin = JiraPlugin;
  let mut options = jira_options(&server.uri());
  options.set_option("jira", TEST_PROJECT, "default_issue_type", "1".into());

  let fields = plugin.new_issue_fields(&options, &test_group(), Some("3")).await?;
  let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
  assert_eq!(names, vec!["project", "title", "description", "issuetype"]);
  assert_eq!(fields[3].default, Some(json!("3")));
  Ok(())
}

#[tokio::test]
async fn test_new_issue_fields_without_projects() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/rest/api/2/issue/createmeta"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({"projects": []})))
    .mount(&server)
    .await;

  let err = JiraPlugin
    .new_issue_fields(&jira_options(&server.uri()), &test_group(), None)
    .await
    .unwrap_err();
  assert_eq!(
    err.message(),
    "Error in JIRA configuration, no projects found for user test_user."
  );
}

#[tokio::test]
async fn test_create_issue() -> anyhow::Result<()> {
  let server = MockServer::start().await;
  mount_create_meta(&server).await;
  Mock::given(method("POST"))
    .and(path("/rest/api/2/issue"))
    .and(body_json(json!({
        "fields": {
            "summary": "ZeroDivisionError",
            "description": "details",
            "project": {"id": "10000"},
            "issuetype": {"id": "1"},
            "priority": {"id": "3"},
            "components": [{"id": "10"}],
            "assignee": {"name": "jdoe"}
        }
    })))
    .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "10042", "key": "SEN-42"})))
    .expect(1)
    .mount(&server)
    .await;

  let form_data = form(json!({
      "title": "ZeroDivisionError",
      "description": "details",
      "project": "10000",
      "issuetype": "1",
      "priority": "3",
      "components": ["10"],
      "assignee": "jdoe",
      "labels": ""
  }));

  let key = JiraPlugin
    .create_issue(&jira_options(&server.uri()), &test_group(), &form_data)
    .await?;
  assert_eq!(key, "SEN-42");
  Ok(())
}

#[tokio::test]
async fn test_create_issue_api_error() {
  let server = MockServer::start().await;
  mount_create_meta(&server).await;
  Mock::given(method("POST"))
    .and(path("/rest/api/2/issue"))
    .respond_with(ResponseTemplate::new(400).set_body_json(json!({"message": "Field 'summary' is required"})))
    .mount(&server)
    .await;

  let err = JiraPlugin
    .create_issue(
      &jira_options(&server.uri()),
      &test_group(),
      &form(json!({"issuetype": "1"})),
    )
    .await
    .unwrap_err();
  assert_eq!(
    err,
    PluginError::Integration("Error Communicating with Jira (HTTP 400): Field 'summary' is required".to_string())
  );
}

#[tokio::test]
async fn test_create_issue_unauthorized() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/rest/api/2/issue/createmeta"))
    .respond_with(ResponseTemplate::new(401))
    .mount(&server)
    .await;

  let err = JiraPlugin
    .create_issue(
      &jira_options(&server.uri()),
      &test_group(),
      &form(json!({"issuetype": "1"})),
    )
    .await
    .unwrap_err();
  assert_eq!(err.message(), ERR_UNAUTHORIZED);
}

#[tokio::test]
async fn test_validate_config() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/rest/api/2/project"))
    .and(basic_auth("admin", "secret"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "10000", "key": "SEN", "name": "Sentry"}])))
    .mount(&server)
    .await;
  Mock::given(method("GET"))
    .and(path("/rest/api/2/project"))
    .respond_with(ResponseTemplate::new(401))
    .mount(&server)
    .await;

  let plugin = JiraPlugin;
  let good = form(json!({"instance_url": server.uri(), "username": "admin", "password": "secret"}));
  assert!(plugin.validate_config(&good).await.is_ok());

  let bad = form(json!({"instance_url": server.uri(), "username": "admin", "password": "wrong"}));
  let err = plugin.validate_config(&bad).await.unwrap_err();
  assert_eq!(err, PluginError::Configuration(ERR_UNAUTHORIZED.to_string()));

  let missing = form(json!({"instance_url": server.uri(), "username": "admin"}));
  let err = plugin.validate_config(&missing).await.unwrap_err();
  assert_eq!(err.message(), "Password is required.");
}

#[tokio::test]
async fn test_autocomplete_json_variant() -> anyhow::Result<()> {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/rest/api/latest/user/assignable/search"))
    .and(query_param("username", "jan"))
    .and(query_param("project", "SEN"))
    .and(query_param_is_missing("issueKey"))
    .and(basic_auth("test_user", "test_token"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!([
        {"name": "jdoe", "displayName": "Jane Doe", "emailAddress": "jane@example.com"}
    ])))
    .mount(&server)
    .await;

  let request = AutocompleteRequest {
    autocomplete_query: "jan".to_string(),
    autocomplete_field: "assignee".to_string(),
    jira_url: Some(format!(
      "{}{}assignable/search?issueKey=null&username=",
      server.uri(),
      JSON_AUTOCOMPLETE_MARKER
    )),
  };

  let response = JiraPlugin
    .view_autocomplete(&jira_options(&server.uri()), &test_group(), &request)
    .await?;
  assert_eq!(
    response,
    json!({"assignee": [{"id": "jdoe", "text": "Jane Doe - jane@example.com (jdoe)"}]})
  );
  Ok(())
}

#[tokio::test]
async fn test_autocomplete_xml_variant_with_relative_url() -> anyhow::Result<()> {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/rest/api/1.0/users/picker"))
    .and(query_param("fieldName", "reporter"))
    .and(query_param("query", "js"))
    .respond_with(ResponseTemplate::new(200).set_body_string(
      "<restPickerResponse><users><name>jsmith</name><html>John Smith</html></users></restPickerResponse>",
    ))
    .mount(&server)
    .await;

  let request = AutocompleteRequest {
    autocomplete_query: "js".to_string(),
    autocomplete_field: "reporter".to_string(),
    jira_url: Some("/rest/api/1.0/users/picker?fieldName=reporter".to_string()),
  };

  let response = JiraPlugin
    .view_autocomplete(&jira_options(&server.uri()), &test_group(), &request)
    .await?;
  assert_eq!(response, json!({"reporter": [{"id": "jsmith", "text": "John Smith"}]}));
  Ok(())
}

#[tokio::test]
async fn test_autocomplete_without_url() -> anyhow::Result<()> {
  let request = AutocompleteRequest {
    autocomplete_query: "js".to_string(),
    autocomplete_field: "reporter".to_string(),
    jira_url: None,
  };

  let response = JiraPlugin
    .view_autocomplete(&jira_options("https://jira.invalid"), &test_group(), &request)
    .await?;
  assert_eq!(response, json!({"reporter": []}));
  Ok(())
}

#[tokio::test]
async fn test_configure_plugin_fields() {
  let server = MockServer::start().await;
  mount_create_meta(&server).await;
  mount_priorities(&server).await;
  Mock::given(method("GET"))
    .and(path("/rest/api/2/project"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "10000", "key": "SEN", "name": "Sentry"}])))
    .mount(&server)
    .await;

  let fields = JiraPlugin
    .configure_plugin_fields(&jira_options(&server.uri()), TEST_PROJECT)
    .await;
  let by_name = |name: &str| fields.iter().find(|f| f.name == name).unwrap();

  assert_eq!(fields.len(), 8);
  assert_eq!(by_name("instance_url").default, Some(json!(server.uri())));
  assert!(!by_name("password").required);
  assert!(by_name("password").help.is_some());
  assert_eq!(by_name("password").field_type, FieldType::Secret);
  assert_eq!(
    by_name("default_project").choices.as_ref().unwrap()[0].label(),
    "Sentry (SEN)"
  );
  assert_eq!(by_name("default_priority").choices.as_ref().map(Vec::len), Some(2));
  assert_eq!(by_name("default_issue_type").choices.as_ref().map(Vec::len), Some(2));
  assert_eq!(by_name("auto_create").default, Some(json!(false)));
}

#[tokio::test]
async fn test_configure_plugin_fields_without_credentials() {
  let options = plugins_core::OptionsFile::in_memory();
  let fields = JiraPlugin.configure_plugin_fields(&options, TEST_PROJECT).await;
  let password = fields.iter().find(|f| f.name == "password").unwrap();

  assert!(password.required);
  assert!(password.help.is_none());
  assert!(fields.iter().all(|f| f.choices.as_ref().is_none_or(Vec::is_empty)));
}

#[tokio::test]
async fn test_post_process_files_ticket_once() {
  let server = MockServer::start().await;
  mount_create_meta(&server).await;
  mount_priorities(&server).await;
  Mock::given(method("GET"))
    .and(path("/rest/api/2/project/SEN/versions"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
    .mount(&server)
    .await;
  Mock::given(method("POST"))
    .and(path("/rest/api/2/issue"))
    .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "10043", "key": "SEN-43"})))
    .expect(1)
    .mount(&server)
    .await;

  let plugin = JiraPlugin;
  let mut options = jira_options(&server.uri());
  options.set_option("jira", TEST_PROJECT, "auto_create", true.into());
  options.set_option("jira", TEST_PROJECT, "default_priority", "3".into());
  let mut group_meta = GroupMetaFile::in_memory();
  let group = test_group();

  let filed = plugin
    .post_process(&options, &mut group_meta, &group, Some("Traceback ..."), true)
    .await;
  assert_eq!(filed.as_deref(), Some("SEN-43"));
  assert_eq!(group_meta.get_value(group.id, "jira:tid"), Some("SEN-43"));

  let again = plugin
    .post_process(&options, &mut group_meta, &group, Some("Traceback ..."), true)
    .await;
  assert!(again.is_none());
}

#[tokio::test]
async fn test_post_process_skips_without_default_priority() {
  let server = MockServer::start().await;
  mount_create_meta(&server).await;
  mount_priorities(&server).await;
  Mock::given(method("GET"))
    .and(path("/rest/api/2/project/SEN/versions"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
    .mount(&server)
    .await;
  Mock::given(method("POST"))
    .and(path("/rest/api/2/issue"))
    .respond_with(ResponseTemplate::new(201))
    .expect(0)
    .mount(&server)
    .await;

  let mut options = jira_options(&server.uri());
  options.set_option("jira", TEST_PROJECT, "auto_create", true.into());
  let mut group_meta = GroupMetaFile::in_memory();

  let filed = JiraPlugin
    .post_process(&options, &mut group_meta, &test_group(), None, true)
    .await;
  assert!(filed.is_none());
}

#[test]
fn test_should_create() {
  let plugin = JiraPlugin;
  let mut options = jira_options("https://jira.example.com");
  let mut group_meta = GroupMetaFile::in_memory();
  let group = test_group();

  assert!(!plugin.should_create(&options, &group_meta, &group, true));

  options.set_option("jira", TEST_PROJECT, "auto_create", true.into());
  assert!(plugin.should_create(&options, &group_meta, &group, true));
  assert!(!plugin.should_create(&options, &group_meta, &group, false));

  group_meta.set_value(group.id, "jira:tid", "SEN-1");
  assert!(!plugin.should_create(&options, &group_meta, &group, true));
}

#[test]
fn test_plugin_metadata_and_links() {
  let plugin = JiraPlugin;
  let options = jira_options("https://jira.example.com/");

  assert_eq!(plugin.conf_key(), "jira");
  assert_eq!(plugin.title(), "JIRA");
  assert_eq!(JiraPlugin::ALLOWED_ACTIONS, &["create", "unlink"]);
  assert!(plugin.is_configured(&options, TEST_PROJECT));
  assert!(!plugin.is_configured(&options, "other"));
  assert_eq!(plugin.issue_label("SEN-1"), "SEN-1");
  assert_eq!(
    plugin.issue_url(&options, TEST_PROJECT, "SEN-1").as_deref(),
    Some("https://jira.example.com/browse/SEN-1")
  );
}

#[test]
fn test_validate_config_field_keeps_stored_password() {
  let plugin = JiraPlugin;
  let options = jira_options("https://jira.example.com");

  assert_eq!(
    plugin.validate_config_field(&options, TEST_PROJECT, "password", json!("")),
    json!("test_token")
  );
  assert_eq!(
    plugin.validate_config_field(&options, TEST_PROJECT, "password", json!("new")),
    json!("new")
  );
  assert_eq!(
    plugin.validate_config_field(&options, TEST_PROJECT, "username", json!("")),
    json!("")
  );
}
