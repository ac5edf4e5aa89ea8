//! # User Autocomplete Proxy
//!
//! Jira advertises an autocomplete URL for every user field. Depending on
//! the Jira version it points either at the JSON user-search API or at the
//! legacy XML user picker. The host forwards what the user typed; we splice
//! it into the advertised URL, fetch it, and normalize either response
//! format into `{id, text}` pairs.

use quick_xml::Reader;
use quick_xml::events::Event;
use quick_xml::name::QName;
use serde::Serialize;

use crate::client::JiraError;
use crate::consts::JSON_AUTOCOMPLETE_MARKER;
use crate::models::JiraUser;

/// Which flavour of user search an autocomplete URL targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutocompleteVariant {
  Json,
  Xml,
}

/// A single autocomplete suggestion
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AutocompleteUser {
  pub id: String,
  pub text: String,
}

/// Query parameters kept in their original order, one value per key
#[derive(Debug, Default)]
struct QueryParams(Vec<(String, String)>);

impl QueryParams {
  fn parse(query: &str) -> Self {
    let mut params = Self::default();
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
      // Repeated keys collapse to their first value.
      if !params.0.iter().any(|(k, _)| *k == key) {
        params.0.push((key.into_owned(), value.into_owned()));
      }
    }
    params
  }

  fn set(&mut self, key: &str, value: &str) {
    match self.0.iter_mut().find(|(k, _)| k == key) {
      Some(entry) => entry.1 = value.to_string(),
      None => self.0.push((key.to_string(), value.to_string())),
    }
  }

  fn remove(&mut self, key: &str) {
    self.0.retain(|(k, _)| k != key);
  }

  fn encode(&self) -> String {
    url::form_urlencoded::Serializer::new(String::new())
      .extend_pairs(self.0.iter())
      .finish()
  }
}

/// Splice the user's query (and, for the JSON API, the linked project) into
/// an autocomplete URL advertised by Jira.
pub fn rewrite_autocomplete_url(jira_url: &str, query: &str, project: &str) -> (String, AutocompleteVariant) {
  let (without_fragment, fragment) = match jira_url.split_once('#') {
    Some((url, fragment)) => (url, Some(fragment)),
    None => (jira_url, None),
  };
  let (base, query_string) = without_fragment.split_once('?').unwrap_or((without_fragment, ""));
  let mut params = QueryParams::parse(query_string);

  let variant = if jira_url.contains(JSON_AUTOCOMPLETE_MARKER) {
    params.set("username", query);
    // Jira rejects user searches that carry an issue key.
    params.remove("issueKey");
    params.set("project", project);
    AutocompleteVariant::Json
  } else {
    params.set("query", query);
    AutocompleteVariant::Xml
  };

  let mut rewritten = format!("{base}?{}", params.encode());
  if let Some(fragment) = fragment {
    rewritten.push('#');
    rewritten.push_str(fragment);
  }
  (rewritten, variant)
}

/// Normalize a JSON user-search response
pub fn parse_json_users(body: &str) -> Result<Vec<AutocompleteUser>, JiraError> {
  let users: Vec<JiraUser> =
    serde_json::from_str(body).map_err(|e| JiraError::Parse(format!("user search response: {e}")))?;

  Ok(
    users
      .into_iter()
      .map(|user| AutocompleteUser {
        text: format!("{} - {} ({})", user.display_name, user.email_address, user.name),
        id: user.name,
      })
      .collect(),
  )
}

/// Normalize a legacy XML user-picker response.
///
/// Every `<users>` element is one match; its `<name>` child is the id and
/// its `<html>` child the (already highlighted) label.
pub fn parse_xml_users(body: &str) -> Result<Vec<AutocompleteUser>, JiraError> {
  let xml_error = |e: &dyn std::fmt::Display| JiraError::Parse(format!("user picker response: {e}"));

  let mut reader = Reader::from_str(body);
  reader.config_mut().trim_text(true);

  let mut users = Vec::new();
  let mut in_user = false;
  let mut name: Option<String> = None;
  let mut html: Option<String> = None;

  loop {
    match reader.read_event().map_err(|e| xml_error(&e))? {
      Event::Start(e) if e.name().as_ref() == b"users" => {
        in_user = true;
        name = None;
        html = None;
      }
      Event::Start(e) if in_user && matches!(e.name().as_ref(), b"name" | b"html") => {
        let tag = e.name().as_ref().to_vec();
        let raw = reader.read_text(QName(&tag)).map_err(|e| xml_error(&e))?;
        let text = quick_xml::escape::unescape(&raw).map_err(|e| xml_error(&e))?.into_owned();
        if tag == b"name" {
          name = Some(text);
        } else {
          html = Some(text);
        }
      }
      Event::End(e) if e.name().as_ref() == b"users" => {
        in_user = false;
        if let Some(id) = name.take() {
          users.push(AutocompleteUser {
            id,
            text: html.take().unwrap_or_default(),
          });
        }
      }
      Event::Eof => break,
      _ => {}
    }
  }

  Ok(users)
}

/// Parse an autocomplete response of the given variant
pub fn parse_users(body: &str, variant: AutocompleteVariant) -> Result<Vec<AutocompleteUser>, JiraError> {
  match variant {
    AutocompleteVariant::Json => parse_json_users(body),
    AutocompleteVariant::Xml => parse_xml_users(body),
  }
}
