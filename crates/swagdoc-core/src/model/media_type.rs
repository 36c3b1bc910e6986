use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::example::ExampleOrRef;
use super::header::HeaderOrRef;
use super::schema::SchemaOrRef;

pub const JSON_MEDIA_TYPE: &str = "application/json";
pub const BINARY_MEDIA_TYPE: &str = "application/octet-stream";

/// Encoding object for multipart requests.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Encoding {
    #[serde(rename = "contentType", skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub headers: IndexMap<String, HeaderOrRef>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub explode: Option<bool>,

    #[serde(rename = "allowReserved", skip_serializing_if = "Option::is_none")]
    pub allow_reserved: Option<bool>,
}

/// Payload description for one MIME type of a request body or response.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MediaType {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaOrRef>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub examples: IndexMap<String, ExampleOrRef>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub encoding: IndexMap<String, Encoding>,

    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

impl MediaType {
    pub fn new(schema: Option<SchemaOrRef>, example: Option<Value>) -> Self {
        MediaType {
            schema,
            example,
            ..MediaType::default()
        }
    }
}

/// Content key for a single-schema payload: binary schemas travel as
/// `application/octet-stream`, everything else as `application/json`.
pub fn media_type_key(schema: Option<&SchemaOrRef>) -> &'static str {
    if schema.is_some_and(SchemaOrRef::is_binary) {
        BINARY_MEDIA_TYPE
    } else {
        JSON_MEDIA_TYPE
    }
}
