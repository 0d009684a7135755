use crate::json_ext::{Object, Path};
use crate::response::Response;
use displaydoc::Display;
use serde::{Deserialize, Serialize};
use serde_json_bytes::Value;
use thiserror::Error;

/// An opaque error returned by a collaborator.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error types for an enrichment pass.
///
/// Note that these are not actually returned to the client as-is, but are
/// instead converted to JSON for [`struct@Error`].
#[derive(Error, Display, Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
#[ignore_extra_doc_attributes]
pub enum FetchError {
    /// Query was malformed: {reason}
    MalformedQuery {
        /// The parser diagnostics.
        reason: String,
    },

    /// HTTP fetch failed from upstream: {reason}
    ///
    /// Note that this relates to a transport error and not a GraphQL error.
    UpstreamHttpError {
        /// The reason the fetch failed.
        reason: String,
    },

    /// Upstream response was malformed: {reason}
    UpstreamMalformedResponse {
        /// The reason the deserialization failed.
        reason: String,
    },

    /// Enrichment resolver failed at '{path}': {reason}
    ResolverFailed {
        /// The path of the node the resolver was invoked for.
        path: String,

        /// The underlying resolver error.
        reason: String,
    },
}

impl FetchError {
    /// Convert the fetch error to a GraphQL error.
    pub fn to_graphql_error(&self, path: Option<Path>) -> Error {
        Error {
            message: self.to_string(),
            locations: Default::default(),
            path,
            extensions: serde_json_bytes::to_value(self)
                .ok()
                .and_then(|value| match value {
                    Value::Object(object) => Some(object),
                    _ => None,
                })
                .unwrap_or_default(),
        }
    }

    /// Convert the error to a response a client can consume.
    pub fn to_response(&self) -> Response {
        Response {
            data: Default::default(),
            errors: vec![self.to_graphql_error(None)],
            extensions: Default::default(),
        }
    }
}

/// Any error.
#[derive(Error, Clone, Debug, Eq, PartialEq, Serialize, Deserialize, Default)]
#[error("{message}")]
#[serde(rename_all = "camelCase")]
pub struct Error {
    /// The error message.
    pub message: String,

    /// The locations of the error from the originating request.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<Location>,

    /// The path of the error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Path>,

    /// The optional graphql extensions.
    #[serde(default, skip_serializing_if = "Object::is_empty")]
    pub extensions: Object,
}

/// A location in the request that triggered a graphql error.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// The line number.
    pub line: i32,

    /// The column number.
    pub column: i32,
}
