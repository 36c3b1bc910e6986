use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::components::Components;
use super::operation::Operation;
use super::parameter::ParameterOrRef;
use super::reference::{RefOr, Referenceable};
use super::server::Server;

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Options,
    Head,
    Patch,
    Trace,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 8] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Delete,
        HttpMethod::Options,
        HttpMethod::Head,
        HttpMethod::Patch,
        HttpMethod::Trace,
    ];

    /// Wire key, always lowercase.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Delete => "delete",
            HttpMethod::Options => "options",
            HttpMethod::Head => "head",
            HttpMethod::Patch => "patch",
            HttpMethod::Trace => "trace",
        }
    }

    pub fn as_upper_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Trace => "TRACE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMethod(pub String);

impl FromStr for HttpMethod {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HttpMethod::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownMethod(s.to_string()))
    }
}

/// The operations defined at one URL template, keyed by method.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PathItem {
    pub summary: Option<String>,
    pub description: Option<String>,
    pub servers: Vec<Server>,
    /// Inherited by every operation of this path.
    pub parameters: Vec<ParameterOrRef>,
    pub operations: IndexMap<HttpMethod, Operation>,
    /// `x-` keys, round-tripped verbatim.
    pub extensions: IndexMap<String, Value>,
}

impl PathItem {
    pub fn new() -> Self {
        PathItem::default()
    }

    pub fn with_operation(mut self, method: HttpMethod, operation: Operation) -> Self {
        self.operations.insert(method, operation);
        self
    }

    pub fn operation(&self, method: HttpMethod) -> Option<&Operation> {
        self.operations.get(&method)
    }

    pub fn operation_mut(&mut self, method: HttpMethod) -> Option<&mut Operation> {
        self.operations.get_mut(&method)
    }

    /// Inserts or replaces the operation for `method`, returning the old one.
    pub fn insert_operation(&mut self, method: HttpMethod, operation: Operation) -> Option<Operation> {
        self.operations.insert(method, operation)
    }

    pub fn remove_operation(&mut self, method: HttpMethod) -> Option<Operation> {
        self.operations.shift_remove(&method)
    }
}

impl Serialize for PathItem {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if let Some(summary) = &self.summary {
            map.serialize_entry("summary", summary)?;
        }
        if let Some(description) = &self.description {
            map.serialize_entry("description", description)?;
        }
        if !self.servers.is_empty() {
            map.serialize_entry("servers", &self.servers)?;
        }
        if !self.parameters.is_empty() {
            map.serialize_entry("parameters", &self.parameters)?;
        }
        for (method, operation) in &self.operations {
            map.serialize_entry(method.as_str(), operation)?;
        }
        for (key, value) in &self.extensions {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for PathItem {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = IndexMap::<String, Value>::deserialize(deserializer)?;
        let mut item = PathItem::default();
        for (key, value) in raw {
            match key.as_str() {
                "summary" => item.summary = from_value::<D, _>(value)?,
                "description" => item.description = from_value::<D, _>(value)?,
                "servers" => item.servers = from_value::<D, _>(value)?,
                "parameters" => item.parameters = from_value::<D, _>(value)?,
                _ if key.starts_with("x-") => {
                    item.extensions.insert(key, value);
                }
                _ => match key.parse::<HttpMethod>() {
                    Ok(method) => {
                        item.operations.insert(method, from_value::<D, _>(value)?);
                    }
                    Err(_) => log::warn!("dropping unknown path item key '{key}'"),
                },
            }
        }
        Ok(item)
    }
}

fn from_value<'de, D: Deserializer<'de>, T: de::DeserializeOwned>(
    value: Value,
) -> Result<T, D::Error> {
    serde_json::from_value(value).map_err(de::Error::custom)
}

pub type PathItemOrRef = RefOr<PathItem>;

impl Referenceable for PathItem {
    const SECTION: &'static str = "pathItems";

    fn pool(components: &Components) -> &IndexMap<String, RefOr<Self>> {
        &components.path_items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_parse_is_case_insensitive() {
        assert_eq!("GET".parse::<HttpMethod>(), Ok(HttpMethod::Get));
        assert_eq!("Patch".parse::<HttpMethod>(), Ok(HttpMethod::Patch));
        assert!("connect".parse::<HttpMethod>().is_err());
    }

    #[test]
    fn test_method_keys_are_normalized() {
        let item: PathItem = serde_json::from_value(serde_json::json!({
            "GET": { "responses": {} },
            "x-internal": true,
            "unknown": 1
        }))
        .unwrap();
        assert!(item.operation(HttpMethod::Get).is_some());
        assert_eq!(item.extensions["x-internal"], true);

        let back = serde_json::to_value(&item).unwrap();
        assert!(back.get("get").is_some());
        assert!(back.get("GET").is_none());
        assert!(back.get("unknown").is_none());
    }

    #[test]
    fn test_reference_path_item() {
        let item: PathItemOrRef =
            serde_json::from_value(serde_json::json!({ "$ref": "#/components/pathItems/Ping" }))
                .unwrap();
        assert_eq!(item.ref_path(), Some("#/components/pathItems/Ping"));
    }
}
