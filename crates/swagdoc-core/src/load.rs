use std::path::Path;

use serde_json::Value;

use crate::error::{ParseError, SerializeError};
use crate::model::document::{Document, SchemaType};
use crate::projection::{self, detect_schema_type, detect_value_schema_type};

impl Document {
    /// Parses JSON text, detecting the version and assuming Swagger 2.0 when
    /// the text carries no version marker.
    pub fn from_json(data: &str) -> Result<Document, ParseError> {
        Self::from_json_as(data, SchemaType::Swagger2)
    }

    /// Parses JSON text, falling back to `expected` when the version cannot
    /// be detected.
    pub fn from_json_as(data: &str, expected: SchemaType) -> Result<Document, ParseError> {
        let schema_type = detect_schema_type(data, expected)?;
        let value: Value = serde_json::from_str(data)?;
        projection::from_value(value, schema_type)
    }

    pub fn from_yaml(data: &str) -> Result<Document, ParseError> {
        Self::from_yaml_as(data, SchemaType::Swagger2)
    }

    pub fn from_yaml_as(data: &str, expected: SchemaType) -> Result<Document, ParseError> {
        let value: Value = serde_yaml_ng::from_str(data)?;
        let schema_type = detect_value_schema_type(&value, expected)?;
        projection::from_value(value, schema_type)
    }

    /// Reads a document from disk; `.yaml` and `.yml` files are parsed as
    /// YAML, everything else as JSON.
    pub fn from_file(path: &Path) -> Result<Document, ParseError> {
        let data = std::fs::read_to_string(path)?;
        Self::from_text(path, &data)
    }

    pub async fn from_file_async(path: &Path) -> Result<Document, ParseError> {
        let data = tokio::fs::read_to_string(path).await?;
        Self::from_text(path, &data)
    }

    fn from_text(path: &Path, data: &str) -> Result<Document, ParseError> {
        log::debug!("loading {}", path.display());
        if is_yaml_path(path) {
            Self::from_yaml(data)
        } else {
            Self::from_json(data)
        }
    }

    /// Generates operation IDs, then renders in the document's own format.
    pub fn to_json(&mut self) -> Result<String, SerializeError> {
        self.to_json_as(self.schema_type)
    }

    /// Generates operation IDs, then renders as `schema_type`.
    pub fn to_json_as(&mut self, schema_type: SchemaType) -> Result<String, SerializeError> {
        self.generate_operation_ids();
        let value = self.to_value(schema_type)?;
        Ok(serde_json::to_string_pretty(&value)?)
    }

    pub fn to_yaml(&mut self) -> Result<String, SerializeError> {
        self.to_yaml_as(self.schema_type)
    }

    pub fn to_yaml_as(&mut self, schema_type: SchemaType) -> Result<String, SerializeError> {
        self.generate_operation_ids();
        let value = self.to_value(schema_type)?;
        Ok(serde_yaml_ng::to_string(&value)?)
    }

    /// Renders as a `schema_type` JSON tree without touching operation IDs.
    pub fn to_value(&self, schema_type: SchemaType) -> Result<Value, SerializeError> {
        projection::to_value(self, schema_type)
    }
}

pub fn is_yaml_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_path_detection() {
        assert!(is_yaml_path(Path::new("api/openapi.yaml")));
        assert!(is_yaml_path(Path::new("swagger.YML")));
        assert!(!is_yaml_path(Path::new("swagger.json")));
        assert!(!is_yaml_path(Path::new("swagger")));
    }

    #[test]
    fn test_json_without_marker_uses_expected() {
        let document =
            Document::from_json_as(r#"{ "paths": {} }"#, SchemaType::OpenApi3).unwrap();
        assert_eq!(document.schema_type, SchemaType::OpenApi3);
        let document = Document::from_json(r#"{ "paths": {} }"#).unwrap();
        assert_eq!(document.schema_type, SchemaType::Swagger2);
    }

    #[test]
    fn test_to_json_generates_ids() {
        let mut document = Document::from_json(
            r#"{ "swagger": "2.0", "paths": { "/pets": { "get": { "responses": {} } } } }"#,
        )
        .unwrap();
        let json = document.to_json().unwrap();
        assert!(json.contains(r#""operationId": "pets""#));
    }
}
