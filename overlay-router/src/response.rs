use crate::error::{Error, FetchError};
use crate::json_ext::Object;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json_bytes::Value;
use typed_builder::TypedBuilder;

/// A graphql response.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
#[builder(field_defaults(setter(into)))]
pub struct Response {
    /// The response data.
    #[serde(skip_serializing_if = "skip_data_if", default)]
    #[builder(default = Value::Object(Default::default()))]
    pub data: Value,

    /// The optional graphql errors encountered.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    #[builder(default)]
    pub errors: Vec<Error>,

    /// The optional graphql extensions.
    #[serde(skip_serializing_if = "Object::is_empty", default)]
    #[builder(default)]
    pub extensions: Object,
}

fn skip_data_if(value: &Value) -> bool {
    value.is_null()
}

impl Response {
    /// Parse an upstream body.
    ///
    /// Parsing is tolerant the way upstream servers require: a missing `data`
    /// member defaults to null and unknown top level members are ignored, but
    /// a body that is not a JSON object, or whose `errors` member does not
    /// hold graphql errors, is rejected.
    pub fn from_bytes(body: Bytes) -> Result<Response, FetchError> {
        let value =
            Value::from_bytes(body).map_err(|error| FetchError::UpstreamMalformedResponse {
                reason: error.to_string(),
            })?;

        let mut object = match value {
            Value::Object(object) => object,
            _ => {
                return Err(FetchError::UpstreamMalformedResponse {
                    reason: "expected a JSON object".to_string(),
                })
            }
        };

        let data = object.remove("data").unwrap_or_default();

        let errors = match object.remove("errors") {
            Some(errors @ Value::Array(_)) => serde_json_bytes::from_value(errors).map_err(
                |error| FetchError::UpstreamMalformedResponse {
                    reason: error.to_string(),
                },
            )?,
            _ => Vec::new(),
        };

        let extensions = match object.remove("extensions") {
            Some(Value::Object(extensions)) => extensions,
            _ => Object::new(),
        };

        Ok(Response {
            data,
            errors,
            extensions,
        })
    }

    /// Serialize the response for the wire.
    pub fn to_bytes(&self) -> Bytes {
        Bytes::from(serde_json::to_vec(self).expect("responses serialize to JSON objects; qed"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Location;
    use crate::json_ext::{Path, PathElement};
    use serde_json_bytes::json;

    #[test]
    fn test_response() {
        let body = r#"{
          "errors": [
            {
              "message": "Name for character with ID 1002 could not be fetched.",
              "locations": [{ "line": 6, "column": 7 }],
              "path": ["hero", "heroFriends", 1, "name"],
              "extensions": { "code": "NOT_FOUND" }
            }
          ],
          "data": {
            "hero": {
              "name": "R2-D2",
              "heroFriends": [
                { "id": "1000", "name": "Luke Skywalker" },
                { "id": "1002", "name": null },
                { "id": "1003", "name": "Leia Organa" }
              ]
            }
          },
          "extensions": { "response-extension": 3 }
        }"#;

        let response = Response::from_bytes(Bytes::from(body)).unwrap();
        assert_eq!(
            response,
            Response::builder()
                .data(json!({
                  "hero": {
                    "name": "R2-D2",
                    "heroFriends": [
                      { "id": "1000", "name": "Luke Skywalker" },
                      { "id": "1002", "name": null },
                      { "id": "1003", "name": "Leia Organa" }
                    ]
                  }
                }))
                .errors(vec![Error {
                    message: "Name for character with ID 1002 could not be fetched.".to_string(),
                    locations: vec![Location { line: 6, column: 7 }],
                    path: Some(Path(vec![
                        PathElement::Key("hero".to_string()),
                        PathElement::Key("heroFriends".to_string()),
                        PathElement::Index(1),
                        PathElement::Key("name".to_string()),
                    ])),
                    extensions: json!({ "code": "NOT_FOUND" }).as_object().cloned().unwrap(),
                }])
                .extensions(json!({ "response-extension": 3 }).as_object().cloned().unwrap())
                .build()
        );
    }

    #[test]
    fn a_missing_data_member_defaults_to_null() {
        let response = Response::from_bytes(Bytes::from(r#"{"extensions":{}}"#)).unwrap();
        assert!(response.data.is_null());
        assert!(response.errors.is_empty());
        assert!(response.extensions.is_empty());
    }

    #[test]
    fn a_non_object_body_is_rejected() {
        let error = Response::from_bytes(Bytes::from("[1, 2]")).unwrap_err();
        assert!(matches!(
            error,
            FetchError::UpstreamMalformedResponse { reason } if reason.contains("JSON object")
        ));
    }

    #[test]
    fn unparseable_bytes_are_rejected() {
        assert!(matches!(
            Response::from_bytes(Bytes::from("not json")).unwrap_err(),
            FetchError::UpstreamMalformedResponse { .. }
        ));
    }
}
