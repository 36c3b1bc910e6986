use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::components::Components;
use super::info::{ExternalDocs, Info, Tag};
use super::operation::Operation;
use super::parameter::Parameter;
use super::path_item::{HttpMethod, PathItem, PathItemOrRef};
use super::response::{Response, ResponseOrRef};
use super::security::SecurityRequirement;
use super::server::{
    Server, TransferScheme, base_path_from_url, host_from_url, schemes_from_servers,
    servers_from_parts,
};
use crate::error::ResolveError;

pub const SWAGGER2_VERSION: &str = "2.0";
pub const OPENAPI3_VERSION: &str = "3.0.0";

/// Wire format of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SchemaType {
    /// A bare JSON Schema. Not a valid document type.
    JsonSchema,
    #[default]
    Swagger2,
    OpenApi3,
}

impl SchemaType {
    /// Rejects [`SchemaType::JsonSchema`].
    pub fn is_document_type(&self) -> bool {
        !matches!(self, SchemaType::JsonSchema)
    }
}

impl fmt::Display for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SchemaType::JsonSchema => "JsonSchema",
            SchemaType::Swagger2 => "Swagger2",
            SchemaType::OpenApi3 => "OpenApi3",
        })
    }
}

/// Root of the document graph.
///
/// Holds one version-agnostic model. `host`, `basePath` and `schemes` are not
/// stored; they are computed from `servers` on every read and rewrite
/// `servers` on every write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(rename = "x-generator", skip_serializing_if = "Option::is_none")]
    pub generator: Option<String>,

    #[serde(default = "default_swagger_version")]
    pub swagger: String,

    #[serde(default = "default_openapi_version")]
    pub openapi: String,

    #[serde(default)]
    pub info: Info,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<Server>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub consumes: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub produces: Vec<String>,

    #[serde(default)]
    pub paths: IndexMap<String, PathItemOrRef>,

    #[serde(default, skip_serializing_if = "Components::is_empty")]
    pub components: Components,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub security: Vec<SecurityRequirement>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,

    #[serde(rename = "externalDocs", skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<ExternalDocs>,

    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,

    /// Format used by [`Document::to_json`]. Set from the input on load.
    #[serde(skip)]
    pub schema_type: SchemaType,
}

fn default_swagger_version() -> String {
    SWAGGER2_VERSION.to_string()
}

fn default_openapi_version() -> String {
    OPENAPI3_VERSION.to_string()
}

impl Default for Document {
    fn default() -> Self {
        Document {
            generator: None,
            swagger: default_swagger_version(),
            openapi: default_openapi_version(),
            info: Info::default(),
            servers: Vec::new(),
            consumes: Vec::new(),
            produces: Vec::new(),
            paths: IndexMap::new(),
            components: Components::default(),
            security: Vec::new(),
            tags: Vec::new(),
            external_docs: None,
            extensions: IndexMap::new(),
            schema_type: SchemaType::default(),
        }
    }
}

impl Document {
    pub fn new(schema_type: SchemaType) -> Self {
        Document {
            schema_type,
            ..Document::default()
        }
    }

    /// Host of the first server.
    pub fn host(&self) -> Option<String> {
        self.servers.first().and_then(|s| host_from_url(&s.url))
    }

    /// Base path of the first server.
    pub fn base_path(&self) -> Option<String> {
        self.servers.first().and_then(|s| base_path_from_url(&s.url))
    }

    pub fn schemes(&self) -> Vec<TransferScheme> {
        schemes_from_servers(&self.servers)
    }

    pub fn set_host(&mut self, host: Option<&str>) {
        let base_path = self.base_path();
        let schemes = self.schemes();
        self.servers = servers_from_parts(&schemes, host, base_path.as_deref());
    }

    pub fn set_base_path(&mut self, base_path: Option<&str>) {
        let host = self.host();
        let schemes = self.schemes();
        self.servers = servers_from_parts(&schemes, host.as_deref(), base_path);
    }

    pub fn set_schemes(&mut self, schemes: Vec<TransferScheme>) {
        let host = self.host();
        let base_path = self.base_path();
        self.servers = servers_from_parts(&schemes, host.as_deref(), base_path.as_deref());
    }

    /// Edits the derived scheme list in place and rebuilds `servers` from it.
    pub fn update_schemes(&mut self, update: impl FnOnce(&mut Vec<TransferScheme>)) {
        let mut schemes = self.schemes();
        update(&mut schemes);
        self.set_schemes(schemes);
    }

    /// Inline path item for `path`, created when missing. `None` when the
    /// path holds a reference.
    pub fn path_item_entry(&mut self, path: &str) -> Option<&mut PathItem> {
        self.paths
            .entry(path.to_string())
            .or_insert_with(|| PathItem::default().into())
            .as_item_mut()
    }

    /// Every operation of every inline path item, in path then method order.
    pub fn operations(&self) -> impl Iterator<Item = DocumentOperation<'_>> {
        self.paths.iter().flat_map(move |(path, item)| {
            let path_item = item.as_item();
            if path_item.is_none() {
                log::debug!("skipping referenced path item '{path}'");
            }
            path_item
                .into_iter()
                .flat_map(|path_item| path_item.operations.iter().map(move |(m, o)| (path_item, m, o)))
                .map(move |(path_item, method, operation)| DocumentOperation {
                    path: path.as_str(),
                    method: *method,
                    path_item,
                    operation,
                    components: &self.components,
                    consumes: &self.consumes,
                    produces: &self.produces,
                })
        })
    }

    pub fn operation(&self, path: &str, method: HttpMethod) -> Option<&Operation> {
        self.paths.get(path)?.as_item()?.operation(method)
    }

    pub fn operation_mut(&mut self, path: &str, method: HttpMethod) -> Option<&mut Operation> {
        self.paths.get_mut(path)?.as_item_mut()?.operation_mut(method)
    }
}

/// One operation together with the context needed to query it.
#[derive(Debug, Clone, Copy)]
pub struct DocumentOperation<'a> {
    pub path: &'a str,
    pub method: HttpMethod,
    pub path_item: &'a PathItem,
    pub operation: &'a Operation,
    pub components: &'a Components,
    consumes: &'a [String],
    produces: &'a [String],
}

impl<'a> DocumentOperation<'a> {
    pub fn actual_parameters(&self) -> Result<Vec<&'a Parameter>, ResolveError> {
        self.operation
            .actual_parameters(self.path_item, self.components)
    }

    pub fn actual_responses(&self) -> Result<IndexMap<&'a str, &'a Response>, ResolveError> {
        self.operation.actual_responses(self.components)
    }

    pub fn success_response(&self) -> Option<(&'a str, &'a ResponseOrRef)> {
        self.operation.success_response()
    }

    /// Operation-level `consumes`, else the document's.
    pub fn actual_consumes(&self) -> &'a [String] {
        if self.operation.consumes.is_empty() {
            self.consumes
        } else {
            &self.operation.consumes
        }
    }

    /// Operation-level `produces`, else the document's.
    pub fn actual_produces(&self) -> &'a [String] {
        if self.operation.produces.is_empty() {
            self.produces
        } else {
            &self.operation.produces
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::parameter::ParameterKind;

    #[test]
    fn test_servers_drive_host_base_path_and_schemes() {
        let mut document = Document::default();
        document.servers = vec![Server::new("https://api.example.com/v2")];
        assert_eq!(document.host().as_deref(), Some("api.example.com"));
        assert_eq!(document.base_path().as_deref(), Some("/v2"));
        assert_eq!(document.schemes(), vec![TransferScheme::Https]);
    }

    #[test]
    fn test_host_base_path_schemes_round_trip() {
        let mut document = Document::default();
        document.set_host(Some("petstore.io"));
        document.set_base_path(Some("/api"));
        document.set_schemes(vec![TransferScheme::Http, TransferScheme::Https]);

        assert_eq!(document.host().as_deref(), Some("petstore.io"));
        assert_eq!(document.base_path().as_deref(), Some("/api"));
        assert_eq!(
            document.schemes(),
            vec![TransferScheme::Http, TransferScheme::Https]
        );
        let urls: Vec<&str> = document.servers.iter().map(|s| s.url.as_str()).collect();
        assert_eq!(urls, ["http://petstore.io/api", "https://petstore.io/api"]);
    }

    #[test]
    fn test_host_without_schemes() {
        let mut document = Document::default();
        document.set_host(Some("petstore.io"));
        assert_eq!(document.servers.len(), 1);
        assert_eq!(document.servers[0].url, "petstore.io");
        assert!(document.schemes().is_empty());
        assert_eq!(document.base_path(), None);
    }

    #[test]
    fn test_update_schemes_rebuilds_servers() {
        let mut document = Document::default();
        document.servers = vec![Server::new("http://petstore.io/v1")];
        document.update_schemes(|schemes| schemes.push(TransferScheme::Https));
        let urls: Vec<&str> = document.servers.iter().map(|s| s.url.as_str()).collect();
        assert_eq!(urls, ["http://petstore.io/v1", "https://petstore.io/v1"]);
    }

    #[test]
    fn test_operations_view() {
        let mut document = Document::default();
        document.consumes = vec!["application/json".to_string()];
        let path_item = document.path_item_entry("/pets/{id}").unwrap();
        path_item
            .parameters
            .push(Parameter::new("id", ParameterKind::Path).into());
        let mut operation = Operation::new();
        operation.produces = vec!["text/plain".to_string()];
        path_item.insert_operation(HttpMethod::Get, operation);
        path_item.insert_operation(HttpMethod::Delete, Operation::new());
        document
            .paths
            .insert("/shared".to_string(), PathItemOrRef::component("Shared"));

        let ops: Vec<DocumentOperation<'_>> = document.operations().collect();
        assert_eq!(ops.len(), 2);
        assert_eq!(ops[0].method, HttpMethod::Get);
        assert_eq!(ops[0].path, "/pets/{id}");
        assert_eq!(ops[0].actual_parameters().unwrap().len(), 1);
        assert_eq!(ops[0].actual_consumes(), ["application/json"]);
        assert_eq!(ops[0].actual_produces(), ["text/plain"]);
        assert_eq!(ops[1].method, HttpMethod::Delete);
    }

    #[test]
    fn test_schema_type_display() {
        assert_eq!(SchemaType::OpenApi3.to_string(), "OpenApi3");
        assert!(!SchemaType::JsonSchema.is_document_type());
    }
}
