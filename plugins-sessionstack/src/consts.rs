//! Constants for the SessionStack plugin.

use std::time::Duration;

/// User-Agent header value for the SessionStack API client
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// API used when a project does not configure its own
pub const API_URL: &str = "https://api.sessionstack.com";

pub const WEBSITES_ENDPOINT: &str = "/v1/websites";
pub const SESSIONS_ENDPOINT: &str = "/sentry/sessions";

/// Event context the session id is read from and the replay link written to
pub const CONTEXT_KEY: &str = "sessionstack";

/// How long a request may take before it is abandoned
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
