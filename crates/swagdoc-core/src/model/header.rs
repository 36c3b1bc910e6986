use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::components::Components;
use super::reference::{RefOr, Referenceable};
use super::schema::SchemaOrRef;

/// A response header. Swagger 2.0 writes the `schema` keywords inline.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Header {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deprecated: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaOrRef>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,

    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

pub type HeaderOrRef = RefOr<Header>;

impl Referenceable for Header {
    const SECTION: &'static str = "headers";

    fn pool(components: &Components) -> &IndexMap<String, RefOr<Self>> {
        &components.headers
    }
}
