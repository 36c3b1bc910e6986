use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::components::Components;
use super::media_type::{MediaType, media_type_key};
use super::parameter::Parameter;
use super::reference::{RefOr, Referenceable};

/// Name used for the body parameter when the request body carries none.
pub const DEFAULT_BODY_NAME: &str = "body";

/// An OpenAPI 3 request body. Mirrored by the Swagger 2.0 body parameter of
/// the owning operation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RequestBody {
    /// Synthetic name for code generation.
    #[serde(rename = "x-name", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub content: IndexMap<String, MediaType>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,

    #[serde(rename = "x-position", skip_serializing_if = "Option::is_none")]
    pub position: Option<i32>,

    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

impl RequestBody {
    /// `name`, or `"body"` when unset or empty.
    pub fn actual_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => DEFAULT_BODY_NAME,
        }
    }

    /// Takes over the fields of a body parameter. The content is replaced by
    /// a single entry keyed by the parameter's media type.
    pub fn follow_body_parameter(&mut self, parameter: Parameter) {
        self.name = Some(parameter.name);
        self.position = parameter.position;
        self.description = parameter.description;
        self.required = parameter.required;
        self.content.clear();
        let key = media_type_key(parameter.schema.as_ref());
        self.content.insert(
            key.to_string(),
            MediaType::new(parameter.schema, parameter.example),
        );
    }
}

pub type RequestBodyOrRef = RefOr<RequestBody>;

impl Referenceable for RequestBody {
    const SECTION: &'static str = "requestBodies";

    fn pool(components: &Components) -> &IndexMap<String, RefOr<Self>> {
        &components.request_bodies
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actual_name_defaults_to_body() {
        let mut body = RequestBody::default();
        assert_eq!(body.actual_name(), "body");
        body.name = Some(String::new());
        assert_eq!(body.actual_name(), "body");
        body.name = Some("pet".to_string());
        assert_eq!(body.actual_name(), "pet");
    }

    #[test]
    fn test_follow_binary_body_parameter() {
        use crate::model::parameter::ParameterKind;
        use crate::model::schema::{JsonType, SchemaOrRef};

        let mut body = RequestBody::default();
        body.content
            .insert("application/json".to_string(), MediaType::new(None, None));
        body.follow_body_parameter(
            Parameter::new("file", ParameterKind::Body)
                .with_schema(SchemaOrRef::of_type(JsonType::File)),
        );
        assert_eq!(body.actual_name(), "file");
        let keys: Vec<&String> = body.content.keys().collect();
        assert_eq!(keys, ["application/octet-stream"]);
    }
}
