use serde_json::{Map, Value};

use crate::model::document::SchemaType;

/// Entity kinds that carry version-specific fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Document,
    PathItem,
    Operation,
    Parameter,
    Response,
    SecurityScheme,
}

/// Fields that do not exist in OpenAPI 3.
const OPENAPI3_IGNORED: &[(EntityKind, &str)] = &[
    (EntityKind::Document, "swagger"),
    (EntityKind::Document, "host"),
    (EntityKind::Document, "basePath"),
    (EntityKind::Document, "schemes"),
    (EntityKind::Document, "consumes"),
    (EntityKind::Document, "produces"),
    (EntityKind::Document, "definitions"),
    (EntityKind::Document, "parameters"),
    (EntityKind::Document, "responses"),
    (EntityKind::Document, "securityDefinitions"),
    (EntityKind::Operation, "schemes"),
    (EntityKind::Operation, "consumes"),
    (EntityKind::Operation, "produces"),
    (EntityKind::Response, "schema"),
    (EntityKind::Response, "examples"),
    (EntityKind::SecurityScheme, "flow"),
    (EntityKind::SecurityScheme, "authorizationUrl"),
    (EntityKind::SecurityScheme, "tokenUrl"),
    (EntityKind::SecurityScheme, "scopes"),
];

/// Fields that do not exist in Swagger 2.0.
const SWAGGER2_IGNORED: &[(EntityKind, &str)] = &[
    (EntityKind::Document, "openapi"),
    (EntityKind::Document, "servers"),
    (EntityKind::Document, "components"),
    (EntityKind::Parameter, "title"),
    (EntityKind::Parameter, "examples"),
    (EntityKind::Parameter, "x-position"),
    (EntityKind::PathItem, "summary"),
    (EntityKind::PathItem, "description"),
    (EntityKind::PathItem, "servers"),
    (EntityKind::Operation, "callbacks"),
    (EntityKind::Operation, "servers"),
    (EntityKind::Operation, "requestBody"),
    (EntityKind::Response, "content"),
    (EntityKind::Response, "links"),
    (EntityKind::SecurityScheme, "scheme"),
    (EntityKind::SecurityScheme, "bearerFormat"),
    (EntityKind::SecurityScheme, "openIdConnectUrl"),
    (EntityKind::SecurityScheme, "flows"),
];

/// The exclusion table for one document version.
pub fn ignored_fields(schema_type: SchemaType) -> &'static [(EntityKind, &'static str)] {
    match schema_type {
        SchemaType::OpenApi3 => OPENAPI3_IGNORED,
        SchemaType::Swagger2 => SWAGGER2_IGNORED,
        SchemaType::JsonSchema => &[],
    }
}

pub fn is_ignored(schema_type: SchemaType, kind: EntityKind, field: &str) -> bool {
    ignored_fields(schema_type)
        .iter()
        .any(|&(k, f)| k == kind && f == field)
}

/// Drops the fields of `kind` that `schema_type` does not define.
pub fn mask(schema_type: SchemaType, kind: EntityKind, map: &mut Map<String, Value>) {
    for &(k, field) in ignored_fields(schema_type) {
        if k == kind {
            map.shift_remove(field);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_are_disjoint_per_entity() {
        for &(kind, field) in OPENAPI3_IGNORED {
            assert!(
                !is_ignored(SchemaType::Swagger2, kind, field),
                "{kind:?}.{field} masked in both versions"
            );
        }
    }

    #[test]
    fn test_mask_response() {
        let mut map = serde_json::json!({
            "description": "ok",
            "schema": { "type": "string" },
            "content": {},
            "x-nullable": true
        })
        .as_object()
        .cloned()
        .unwrap();
        mask(SchemaType::OpenApi3, EntityKind::Response, &mut map);
        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, ["description", "content", "x-nullable"]);
    }

    #[test]
    fn test_json_schema_masks_nothing() {
        assert!(ignored_fields(SchemaType::JsonSchema).is_empty());
        assert!(is_ignored(SchemaType::Swagger2, EntityKind::Operation, "requestBody"));
        assert!(!is_ignored(SchemaType::OpenApi3, EntityKind::Operation, "requestBody"));
    }
}
