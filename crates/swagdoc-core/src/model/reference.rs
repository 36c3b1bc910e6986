use std::collections::HashSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::components::Components;
use crate::error::ResolveError;

/// An entity that is either a `$ref` to a component of the same kind or the
/// inline entity itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RefOr<T> {
    Ref {
        #[serde(rename = "$ref")]
        ref_path: String,
    },
    Item(T),
}

/// Kinds that live in a named component pool and can be referenced.
pub trait Referenceable: Sized {
    /// Pool name under `#/components/`.
    const SECTION: &'static str;

    fn pool(components: &Components) -> &IndexMap<String, RefOr<Self>>;
}

impl<T> RefOr<T> {
    pub fn reference(ref_path: impl Into<String>) -> Self {
        RefOr::Ref {
            ref_path: ref_path.into(),
        }
    }

    pub fn is_ref(&self) -> bool {
        matches!(self, RefOr::Ref { .. })
    }

    pub fn ref_path(&self) -> Option<&str> {
        match self {
            RefOr::Ref { ref_path } => Some(ref_path),
            RefOr::Item(_) => None,
        }
    }

    pub fn as_item(&self) -> Option<&T> {
        match self {
            RefOr::Item(item) => Some(item),
            RefOr::Ref { .. } => None,
        }
    }

    pub fn as_item_mut(&mut self) -> Option<&mut T> {
        match self {
            RefOr::Item(item) => Some(item),
            RefOr::Ref { .. } => None,
        }
    }

    /// Turns this into a reference; any inline content is dropped.
    pub fn set_reference(&mut self, ref_path: impl Into<String>) {
        *self = RefOr::reference(ref_path);
    }

    /// Turns this into inline content; any reference path is dropped.
    pub fn set_item(&mut self, item: T) {
        *self = RefOr::Item(item);
    }
}

impl<T: Referenceable> RefOr<T> {
    /// Reference to `#/components/{SECTION}/{name}`.
    pub fn component(name: &str) -> Self {
        RefOr::reference(format!("#/components/{}/{}", T::SECTION, name))
    }

    /// The inline entity, following references transitively.
    pub fn actual<'a>(&'a self, components: &'a Components) -> Result<&'a T, ResolveError> {
        let mut current = self;
        let mut visited = HashSet::new();
        loop {
            match current {
                RefOr::Item(item) => return Ok(item),
                RefOr::Ref { ref_path } => {
                    if !visited.insert(ref_path.as_str()) {
                        return Err(ResolveError::CircularRef(ref_path.clone()));
                    }
                    let name = parse_ref_name(ref_path, T::SECTION)?;
                    current = T::pool(components)
                        .get(name)
                        .ok_or_else(|| ResolveError::RefTargetNotFound(ref_path.clone()))?;
                }
            }
        }
    }
}

impl<T> From<T> for RefOr<T> {
    fn from(item: T) -> Self {
        RefOr::Item(item)
    }
}

/// Parse a `$ref` path like `#/components/schemas/Foo` and extract the name.
pub fn parse_ref_name<'a>(
    ref_path: &'a str,
    expected_section: &str,
) -> Result<&'a str, ResolveError> {
    if !ref_path.starts_with('#') {
        return Err(ResolveError::UnresolvedRef(ref_path.to_string()));
    }
    let stripped = ref_path
        .strip_prefix("#/components/")
        .ok_or_else(|| ResolveError::InvalidRefFormat(ref_path.to_string()))?;
    let (section, name) = stripped
        .split_once('/')
        .ok_or_else(|| ResolveError::InvalidRefFormat(ref_path.to_string()))?;
    if section != expected_section {
        return Err(ResolveError::InvalidRefFormat(format!(
            "expected section '{}', got '{}' in {}",
            expected_section, section, ref_path
        )));
    }
    Ok(name)
}
