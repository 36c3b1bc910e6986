use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::error::ParseError;
use crate::model::document::SchemaType;

static SWAGGER2_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""swagger"\s*:\s*"2"#).expect("valid regex"));

static OPENAPI3_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""openapi"\s*:\s*"3"#).expect("valid regex"));

/// Picks the document type of raw JSON text from its version marker, falling
/// back to `expected` when neither marker is present.
pub fn detect_schema_type(data: &str, expected: SchemaType) -> Result<SchemaType, ParseError> {
    let detected = if SWAGGER2_MARKER.is_match(data) {
        SchemaType::Swagger2
    } else if OPENAPI3_MARKER.is_match(data) {
        SchemaType::OpenApi3
    } else {
        expected
    };
    ensure_document_type(detected)
}

/// Same as [`detect_schema_type`] for an already parsed document, used for
/// YAML where the version may be an unquoted number.
pub fn detect_value_schema_type(
    value: &Value,
    expected: SchemaType,
) -> Result<SchemaType, ParseError> {
    let detected = if version_starts_with(value.get("swagger"), '2') {
        SchemaType::Swagger2
    } else if version_starts_with(value.get("openapi"), '3') {
        SchemaType::OpenApi3
    } else {
        expected
    };
    ensure_document_type(detected)
}

fn version_starts_with(version: Option<&Value>, major: char) -> bool {
    match version {
        Some(Value::String(s)) => s.starts_with(major),
        Some(Value::Number(n)) => n.to_string().starts_with(major),
        _ => false,
    }
}

fn ensure_document_type(schema_type: SchemaType) -> Result<SchemaType, ParseError> {
    if schema_type.is_document_type() {
        Ok(schema_type)
    } else {
        Err(ParseError::UnsupportedSchemaType(schema_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_detect_openapi3() {
        let data = r#"{ "openapi": "3.0.1", "info": {} }"#;
        assert_eq!(
            detect_schema_type(data, SchemaType::Swagger2).unwrap(),
            SchemaType::OpenApi3
        );
    }

    #[test]
    fn test_detect_swagger2_with_spacing() {
        let data = "{\n  \"swagger\" :\t\"2.0\"\n}";
        assert_eq!(
            detect_schema_type(data, SchemaType::OpenApi3).unwrap(),
            SchemaType::Swagger2
        );
    }

    #[test]
    fn test_fallback_to_expected() {
        let data = r#"{ "openapi": "2.5" }"#;
        assert_eq!(
            detect_schema_type(data, SchemaType::OpenApi3).unwrap(),
            SchemaType::OpenApi3
        );
        assert!(matches!(
            detect_schema_type(data, SchemaType::JsonSchema),
            Err(ParseError::UnsupportedSchemaType(SchemaType::JsonSchema))
        ));
    }

    #[test]
    fn test_detect_yaml_number_version() {
        let value = json!({ "swagger": 2.0 });
        assert_eq!(
            detect_value_schema_type(&value, SchemaType::OpenApi3).unwrap(),
            SchemaType::Swagger2
        );
    }
}
