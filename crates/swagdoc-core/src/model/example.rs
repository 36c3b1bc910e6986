use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::components::Components;
use super::reference::{RefOr, Referenceable};

/// A named example value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Example {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,

    #[serde(rename = "externalValue", skip_serializing_if = "Option::is_none")]
    pub external_value: Option<String>,

    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

pub type ExampleOrRef = RefOr<Example>;

impl Referenceable for Example {
    const SECTION: &'static str = "examples";

    fn pool(components: &Components) -> &IndexMap<String, RefOr<Self>> {
        &components.examples
    }
}
