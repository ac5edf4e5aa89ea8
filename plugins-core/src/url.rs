//! URL helpers shared by the service clients.

use anyhow::Result;
use url::Url;

/// Trim whitespace and any trailing slashes from a configured base URL.
pub fn remove_trailing_slashes(url: &str) -> String {
  url.trim().trim_end_matches('/').to_string()
}

/// Join a possibly relative URL onto a service base URL.
///
/// Absolute URLs are returned as parsed; relative ones are resolved against
/// `base_url`, keeping any path prefix the base carries (Jira behind a
/// context path such as `https://example.com/jira`).
pub fn resolve_against(base_url: &str, target: &str) -> Result<Url> {
  if let Ok(url) = Url::parse(target) {
    return Ok(url);
  }

  let base = format!("{}/", remove_trailing_slashes(base_url));
  let base = Url::parse(&base).map_err(|e| anyhow::anyhow!("Invalid base URL '{base_url}': {e}"))?;
  base
    .join(target.trim_start_matches('/'))
    .map_err(|e| anyhow::anyhow!("Invalid URL '{target}': {e}"))
}

/// `application/x-www-form-urlencoded` encoding of a single value, with
/// spaces as `+`.
pub fn quote_plus(value: &str) -> String {
  url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}
