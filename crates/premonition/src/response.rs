//! Wire types for oracle responses.
//!
//! These mirror the standard GraphQL response envelope. Every part of the
//! envelope is optional because the oracle is a black box: a missing piece
//! means "no signal", never a parse failure.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One parsed response from the oracle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphQLResponse {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub errors: Option<Vec<GraphQLError>>,
}

impl GraphQLResponse {
    /// Returns the diagnostics list, or `None` when the response carried none.
    #[must_use]
    pub fn diagnostics(&self) -> Option<&[GraphQLError]> {
        self.errors.as_deref()
    }

    /// Returns `true` when the response carries a non-empty data payload.
    #[must_use]
    pub fn has_data(&self) -> bool {
        match &self.data {
            None | Some(Value::Null) => false,
            Some(Value::Object(map)) => !map.is_empty(),
            Some(_) => true,
        }
    }
}

/// A single diagnostic from the `errors` list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphQLError {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub path: Vec<PathSegment>,
    #[serde(default)]
    pub extensions: Option<ErrorExtensions>,
}

impl GraphQLError {
    /// The diagnostic code, if the server attached one.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.extensions.as_ref()?.code.as_deref()
    }

    /// The printed type name carried by the diagnostic, if any.
    #[must_use]
    pub fn type_name(&self) -> Option<&str> {
        self.extensions.as_ref()?.type_name.as_deref()
    }

    /// The last path segment when it is a field name.
    #[must_use]
    pub fn last_path_key(&self) -> Option<&str> {
        match self.path.last()? {
            PathSegment::Key(key) => Some(key),
            PathSegment::Index(_) => None,
        }
    }
}

/// A response path element: a field name or a list index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Key(String),
    Index(u64),
}

/// The recognized keys of a diagnostic's `extensions` mapping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorExtensions {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub type_name: Option<String>,
    /// Raw argument payload; its shape varies by server (see
    /// [`crate::classify::decode_argument_names`]).
    #[serde(default)]
    pub arguments: Option<Value>,
    #[serde(default)]
    pub argument_name: Option<String>,
}
