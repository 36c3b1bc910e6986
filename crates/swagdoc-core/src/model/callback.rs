use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::components::Components;
use super::path_item::PathItemOrRef;
use super::reference::{RefOr, Referenceable};

/// Out-of-band requests keyed by runtime expression (OpenAPI 3 only).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Callback {
    pub expressions: IndexMap<String, PathItemOrRef>,
}

pub type CallbackOrRef = RefOr<Callback>;

impl Referenceable for Callback {
    const SECTION: &'static str = "callbacks";

    fn pool(components: &Components) -> &IndexMap<String, RefOr<Self>> {
        &components.callbacks
    }
}
