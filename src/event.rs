//! Query parameters and gateway proxy events.
//!
//! Handlers read their inputs from a [`QueryParams`] map. The HTTP server
//! builds it from the raw query string; the `invoke` command builds it from
//! a gateway [`ProxyEvent`].

use std::collections::HashMap;

use serde::Deserialize;

use crate::error::EventError;

/// Decoded query string parameters.
///
/// When a name repeats, the last value wins, matching how the gateway
/// collapses multi-value parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(HashMap<String, String>);

impl QueryParams {
    /// Parse a raw, percent-encoded query string (without the leading `?`).
    pub fn parse(raw: Option<&str>) -> Self {
        raw.map(|query| {
            url::form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .collect()
        })
        .unwrap_or_default()
    }

    /// Get a parameter value.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, String)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<HashMap<String, String>> for QueryParams {
    fn from(map: HashMap<String, String>) -> Self {
        Self(map)
    }
}

/// The subset of a gateway proxy event the handlers need.
///
/// Accepts both the REST (`path`, `queryStringParameters`) and HTTP API
/// (`rawPath`, `rawQueryString`) shapes. `queryStringParameters` may be
/// `null`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyEvent {
    #[serde(default)]
    pub path: Option<String>,

    #[serde(default)]
    pub raw_path: Option<String>,

    #[serde(default)]
    pub query_string_parameters: Option<HashMap<String, String>>,

    #[serde(default)]
    pub raw_query_string: Option<String>,
}

impl ProxyEvent {
    /// Parse an event from JSON text.
    pub fn from_json(json: &str) -> Result<Self, EventError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Query parameters of the event.
    ///
    /// Decoded `queryStringParameters` take precedence over `rawQueryString`.
    pub fn query(&self) -> QueryParams {
        match &self.query_string_parameters {
            Some(params) => QueryParams::from(params.clone()),
            None => QueryParams::parse(self.raw_query_string.as_deref()),
        }
    }

    /// Request path, if the event carries one.
    pub fn request_path(&self) -> Option<&str> {
        self.raw_path.as_deref().or(self.path.as_deref())
    }
}
