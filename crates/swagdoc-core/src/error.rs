use thiserror::Error;

use crate::model::document::SchemaType;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("operation '{operation}' declares more than one body parameter")]
    MultipleBodyParameters { operation: String },

    #[error("the schema type {0} is not a document type")]
    UnsupportedSchemaType(SchemaType),
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("unresolved reference: {0}")]
    UnresolvedRef(String),

    #[error("circular reference detected: {0}")]
    CircularRef(String),

    #[error("invalid reference format: {0}")]
    InvalidRefFormat(String),

    #[error("reference target not found: {0}")]
    RefTargetNotFound(String),
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to read document: {0}")]
    Io(#[from] std::io::Error),

    #[error("the schema type {0} is not supported for documents")]
    UnsupportedSchemaType(SchemaType),

    #[error("document root must be an object")]
    NotAnObject,

    #[error("resolve error: {0}")]
    Resolve(#[from] ResolveError),

    #[error("invalid document: {0}")]
    Document(#[from] DocumentError),
}

#[derive(Debug, Error)]
pub enum SerializeError {
    #[error("the schema type {0} is not supported for documents")]
    UnsupportedSchemaType(SchemaType),

    #[error("failed to render JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to render YAML: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Yaml {
        path: String,
        source: serde_yaml_ng::Error,
    },
}
