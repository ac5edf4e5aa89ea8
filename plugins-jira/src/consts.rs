//! Constants for the Jira plugin.

use std::time::Duration;

/// User-Agent header value for the Jira API client
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// How long a single Jira request may take
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub const CREATE_META_PATH: &str = "/rest/api/2/issue/createmeta";
pub const CREATE_ISSUE_PATH: &str = "/rest/api/2/issue";
pub const PROJECTS_PATH: &str = "/rest/api/2/project";
pub const PRIORITIES_PATH: &str = "/rest/api/2/priority";

/// Marker in autocomplete URLs served by the JSON user-search API; anything
/// else is the legacy XML picker.
pub const JSON_AUTOCOMPLETE_MARKER: &str = "/rest/api/latest/user/";

/// Builtin Jira custom field types the form mapping cares about.
pub const CUSTOM_FIELD_SELECT: &str = "com.atlassian.jira.plugin.system.customfieldtypes:select";
pub const CUSTOM_FIELD_TEXTAREA: &str = "com.atlassian.jira.plugin.system.customfieldtypes:textarea";
pub const CUSTOM_FIELD_MULTIUSERPICKER: &str = "com.atlassian.jira.plugin.system.customfieldtypes:multiuserpicker";

pub const ERR_UNAUTHORIZED: &str =
  "Unauthorized: either your username and password were invalid or you do not have access";

pub const ERR_INTERNAL: &str =
  "An internal error occurred with the integration and the Sentry team has been notified";

/// Group metadata key suffix recording the issue filed for a group.
pub const TICKET_ID_SUFFIX: &str = "tid";
