use crate::json_ext::Object;
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

/// A graphql request.
///
/// This is the shape the service accepts and the shape it forwards upstream;
/// only `query` is rewritten on the way through, the other members travel
/// unchanged.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
#[builder(field_defaults(setter(into)))]
pub struct Request {
    /// The graphql query.
    pub query: String,

    /// The optional graphql operation name.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    #[builder(default)]
    pub operation_name: Option<String>,

    /// The optional variables in the form of a json object.
    #[serde(skip_serializing_if = "Object::is_empty", default)]
    #[builder(default)]
    pub variables: Object,

    /// The optional graphql extensions sent by the client.
    #[serde(skip_serializing_if = "Object::is_empty", default)]
    #[builder(default)]
    pub extensions: Object,
}
