use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::components::Components;
use super::header::HeaderOrRef;
use super::link::LinkOrRef;
use super::media_type::{MediaType, media_type_key};
use super::reference::{RefOr, Referenceable};
use super::schema::SchemaOrRef;

/// One of several schemas a response may carry (`x-expectedSchemas`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpectedSchema {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub schema: SchemaOrRef,
}

/// A response definition.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub description: String,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub headers: IndexMap<String, HeaderOrRef>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub content: IndexMap<String, MediaType>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub links: IndexMap<String, LinkOrRef>,

    #[serde(rename = "x-nullable", skip_serializing_if = "Option::is_none")]
    pub is_nullable_raw: Option<bool>,

    #[serde(
        rename = "x-expectedSchemas",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub expected_schemas: Vec<ExpectedSchema>,

    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

impl Response {
    pub fn new(description: impl Into<String>) -> Self {
        Response {
            description: description.into(),
            ..Response::default()
        }
    }

    pub fn with_schema(mut self, schema: SchemaOrRef) -> Self {
        self.set_schema(Some(schema));
        self
    }

    /// Single-schema view: the first content entry that has a schema.
    pub fn schema(&self) -> Option<&SchemaOrRef> {
        self.content.values().find_map(|mt| mt.schema.as_ref())
    }

    /// Single-example view: the first content entry that has an example.
    pub fn examples(&self) -> Option<&Value> {
        self.content.values().find_map(|mt| mt.example.as_ref())
    }

    /// Replaces the content map with a single entry holding `schema` and the
    /// current example.
    pub fn set_schema(&mut self, schema: Option<SchemaOrRef>) {
        let examples = self.examples().cloned();
        self.replace_content(schema, examples);
    }

    /// Replaces the content map with a single entry holding `examples` and the
    /// current schema.
    pub fn set_examples(&mut self, examples: Option<Value>) {
        let schema = self.schema().cloned();
        self.replace_content(schema, examples);
    }

    fn replace_content(&mut self, schema: Option<SchemaOrRef>, example: Option<Value>) {
        self.content.clear();
        if schema.is_none() && example.is_none() {
            return;
        }
        let key = media_type_key(schema.as_ref());
        self.content
            .insert(key.to_string(), MediaType::new(schema, example));
    }
}

pub type ResponseOrRef = RefOr<Response>;

impl Referenceable for Response {
    const SECTION: &'static str = "responses";

    fn pool(components: &Components) -> &IndexMap<String, RefOr<Self>> {
        &components.responses
    }
}

/// A three-character status code starting with `2`.
pub fn is_success_status_code(status_code: &str) -> bool {
    status_code.len() == 3 && status_code.starts_with('2')
}
