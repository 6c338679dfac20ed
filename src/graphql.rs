//! graphql types
//!
//! wire request, response envelope, and server-reported errors.

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// request body posted to the endpoint
#[derive(Debug, Clone, Serialize)]
pub struct WireRequest<'a> {
    /// graphql query or mutation document
    pub query: &'a str,
    /// variable values, omitted from the body when empty
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub variables: BTreeMap<&'a str, &'a serde_json::Value>,
}

impl WireRequest<'_> {
    /// serialize the request into a json body
    pub fn to_body(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|err| Error::Encoding(err.to_string()))
    }
}

/// top-level `{data, errors}` shape of a response
///
/// `extensions` is accepted on the wire and dropped.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlResponse<T> {
    /// response data, `None` when absent or null
    pub data: Option<T>,
    /// graphql errors array
    #[serde(default, deserialize_with = "null_as_empty")]
    pub errors: Vec<GraphQlError>,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<GraphQlError>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<GraphQlError>>::deserialize(deserializer)?.unwrap_or_default())
}

impl<T> GraphQlResponse<T> {
    /// true if the response contains graphql errors
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// decode a status 200 body into its envelope
pub fn decode_envelope(body: &str) -> Result<GraphQlResponse<serde_json::Value>> {
    serde_json::from_str(body).map_err(Error::Decode)
}

/// graphql error entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphQlError {
    /// error message
    pub message: String,
    /// error locations in the query
    #[serde(default)]
    pub locations: Vec<GraphQlLocation>,
    /// response path
    #[serde(default)]
    pub path: Vec<serde_json::Value>,
    /// optional extensions payload
    #[serde(default)]
    pub extensions: Option<serde_json::Value>,
}

/// graphql error location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphQlLocation {
    /// line number (1-based)
    pub line: i64,
    /// column number (1-based)
    pub column: i64,
}

/// non-empty list of errors reported by the server
///
/// formats as the first error's message only. the rest stay available
/// through [`GraphQlErrors::as_slice`].
#[derive(Debug, Clone, PartialEq)]
pub struct GraphQlErrors(Vec<GraphQlError>);

impl GraphQlErrors {
    /// wrap an error list, `None` if it is empty
    pub fn new(errors: Vec<GraphQlError>) -> Option<Self> {
        if errors.is_empty() {
            None
        } else {
            Some(Self(errors))
        }
    }

    /// the first reported error
    pub fn first(&self) -> &GraphQlError {
        &self.0[0]
    }

    pub fn as_slice(&self) -> &[GraphQlError] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GraphQlError> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// always false; kept for clippy's `len_without_is_empty`
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn into_inner(self) -> Vec<GraphQlError> {
        self.0
    }
}

impl std::fmt::Display for GraphQlErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.first().message)
    }
}

impl<'a> IntoIterator for &'a GraphQlErrors {
    type Item = &'a GraphQlError;
    type IntoIter = std::slice::Iter<'a, GraphQlError>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_has_errors() {
        let ok = decode_envelope(r#"{"data": {"ok": true}}"#).unwrap();
        assert!(!ok.has_errors());
        assert_eq!(ok.data.unwrap()["ok"], true);

        let err = decode_envelope(r#"{"data": null, "errors": [{"message": "boom"}]}"#).unwrap();
        assert!(err.has_errors());
        assert!(err.data.is_none());
    }

    #[test]
    fn test_wire_request_omits_empty_variables() {
        let request = WireRequest {
            query: "{viewer{login}}",
            variables: BTreeMap::new(),
        };
        let body: serde_json::Value = serde_json::from_slice(&request.to_body().unwrap()).unwrap();
        assert_eq!(body, json!({"query": "{viewer{login}}"}));
    }

    #[test]
    fn test_wire_request_includes_variables() {
        let owner = json!("octocat");
        let first = json!(10);
        let mut variables = BTreeMap::new();
        variables.insert("owner", &owner);
        variables.insert("first", &first);
        let request = WireRequest {
            query: "query($first:Int!$owner:String!){x}",
            variables,
        };
        let body: serde_json::Value = serde_json::from_slice(&request.to_body().unwrap()).unwrap();
        assert_eq!(body["variables"], json!({"owner": "octocat", "first": 10}));
    }

    #[test]
    fn test_decode_envelope_with_locations_and_extensions() {
        let body = r#"{
            "errors": [{"message": "Field 'x' doesn't exist", "locations": [{"line": 1, "column": 5}]}],
            "extensions": {"cost": 1}
        }"#;
        let envelope = decode_envelope(body).unwrap();
        assert!(envelope.data.is_none());
        assert_eq!(
            envelope.errors[0].locations,
            vec![GraphQlLocation { line: 1, column: 5 }]
        );
    }

    #[test]
    fn test_decode_envelope_null_errors() {
        let envelope = decode_envelope(r#"{"data": {"a": 1}, "errors": null}"#).unwrap();
        assert!(!envelope.has_errors());
    }

    #[test]
    fn test_decode_envelope_rejects_malformed() {
        assert!(matches!(decode_envelope("{\"data\":"), Err(Error::Decode(_))));
        assert!(matches!(
            decode_envelope(r#"{"errors": "nope"}"#),
            Err(Error::Decode(_))
        ));
    }

    #[test]
    fn test_errors_aggregate() {
        assert!(GraphQlErrors::new(vec![]).is_none());
        let errors = decode_envelope(r#"{"errors": [{"message": "a"}, {"message": "b"}]}"#)
            .unwrap()
            .errors;
        let errors = GraphQlErrors::new(errors).unwrap();
        assert_eq!(errors.to_string(), "a");
        assert_eq!(errors.len(), 2);
        let messages: Vec<_> = errors.iter().map(|e| e.to_string()).collect();
        assert_eq!(messages, vec!["a", "b"]);
    }
}
