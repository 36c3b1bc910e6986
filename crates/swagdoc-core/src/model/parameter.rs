use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::components::Components;
use super::example::ExampleOrRef;
use super::reference::{RefOr, Referenceable};
use super::schema::SchemaOrRef;

/// Parameter location. `body` and `formData` are Swagger 2.0 only,
/// `cookie` is OpenAPI 3 only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParameterKind {
    #[serde(rename = "body")]
    Body,
    #[serde(rename = "query")]
    Query,
    #[serde(rename = "path")]
    Path,
    #[serde(rename = "header")]
    Header,
    #[serde(rename = "formData")]
    FormData,
    #[serde(rename = "cookie")]
    Cookie,
}

/// An operation or path-level parameter.
///
/// Body parameters carry their payload type in `schema`. For the other kinds
/// `schema` holds the type keywords that Swagger 2.0 writes inline on the
/// parameter object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,

    #[serde(rename = "in")]
    pub kind: ParameterKind,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deprecated: bool,

    #[serde(rename = "allowEmptyValue", skip_serializing_if = "Option::is_none")]
    pub allow_empty_value: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub explode: Option<bool>,

    #[serde(rename = "allowReserved", skip_serializing_if = "Option::is_none")]
    pub allow_reserved: Option<bool>,

    #[serde(rename = "collectionFormat", skip_serializing_if = "Option::is_none")]
    pub collection_format: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaOrRef>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub examples: IndexMap<String, ExampleOrRef>,

    /// Overrides the nullability inferred from the schema.
    #[serde(rename = "x-nullable", skip_serializing_if = "Option::is_none")]
    pub is_nullable_raw: Option<bool>,

    /// Explicit ordinal preserving the producer's ordering across regenerations.
    #[serde(rename = "x-position", skip_serializing_if = "Option::is_none")]
    pub position: Option<i32>,

    #[serde(rename = "x-originalName", skip_serializing_if = "Option::is_none")]
    pub original_name: Option<String>,

    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, kind: ParameterKind) -> Self {
        Parameter {
            name: name.into(),
            kind,
            title: None,
            description: None,
            required: kind == ParameterKind::Path,
            deprecated: false,
            allow_empty_value: None,
            style: None,
            explode: None,
            allow_reserved: None,
            collection_format: None,
            schema: None,
            example: None,
            examples: IndexMap::new(),
            is_nullable_raw: None,
            position: None,
            original_name: None,
            extensions: IndexMap::new(),
        }
    }

    pub fn with_schema(mut self, schema: SchemaOrRef) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn is_body(&self) -> bool {
        self.kind == ParameterKind::Body
    }

    /// The binary-payload check used to pick the request body media type.
    pub fn has_binary_body(&self) -> bool {
        self.schema.as_ref().is_some_and(SchemaOrRef::is_binary)
    }
}

pub type ParameterOrRef = RefOr<Parameter>;

impl Referenceable for Parameter {
    const SECTION: &'static str = "parameters";

    fn pool(components: &Components) -> &IndexMap<String, RefOr<Self>> {
        &components.parameters
    }
}

impl ParameterOrRef {
    /// The inline parameter when it is body-kind. References are opaque here.
    pub fn as_body(&self) -> Option<&Parameter> {
        self.as_item().filter(|p| p.is_body())
    }
}
