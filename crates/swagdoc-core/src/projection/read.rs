use std::collections::HashSet;

use serde_json::{Map, Value};

use super::INLINE_SCHEMA_KEYWORDS;
use super::masking::{EntityKind, mask};
use super::refs::to_canonical_refs;
use crate::error::{DocumentError, ParseError, ResolveError};
use crate::model::document::{Document, SchemaType};
use crate::model::media_type::media_type_key;
use crate::model::path_item::HttpMethod;
use crate::model::reference::parse_ref_name;
use crate::model::schema::SchemaOrRef;
use crate::model::server::{TransferScheme, servers_from_parts};

/// Swagger 2.0 top-level pools and the component pool each one fills.
const SWAGGER2_POOLS: [(&str, &str); 4] = [
    ("definitions", "schemas"),
    ("parameters", "parameters"),
    ("responses", "responses"),
    ("securityDefinitions", "securitySchemes"),
];

/// Builds a document from a parsed `schema_type` JSON tree.
///
/// Fields the version does not define are dropped, Swagger 2.0 structures
/// are lifted into the canonical shape, and each operation's body parameter
/// and request body are linked while deserializing.
pub fn from_value(value: Value, schema_type: SchemaType) -> Result<Document, ParseError> {
    if !schema_type.is_document_type() {
        return Err(ParseError::UnsupportedSchemaType(schema_type));
    }
    let mut value = value;
    if schema_type == SchemaType::Swagger2 {
        to_canonical_refs(&mut value);
    }
    let Value::Object(mut root) = value else {
        return Err(ParseError::NotAnObject);
    };

    mask(schema_type, EntityKind::Document, &mut root);
    normalize_version(&mut root);
    if schema_type == SchemaType::Swagger2 {
        lift_swagger2_document(&mut root)?;
    }

    let pool = |name: &str| {
        root.get("components")
            .and_then(|c| c.get(name))
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default()
    };
    let reader = Reader {
        schema_type,
        parameters: pool("parameters"),
        request_bodies: pool("requestBodies"),
    };

    if let Some(Value::Object(paths)) = root.get_mut("paths") {
        for (path, item) in paths.iter_mut() {
            reader.path_item(path, item)?;
        }
    }
    if let Some(Value::Object(components)) = root.get_mut("components") {
        reader.components(components)?;
    }

    let mut document: Document = serde_json::from_value(Value::Object(root))?;
    document.schema_type = schema_type;
    Ok(document)
}

/// `host`/`basePath`/`schemes` become `servers`; the top-level pools move
/// under `components`.
fn lift_swagger2_document(root: &mut Map<String, Value>) -> Result<(), ParseError> {
    let host = take_string(root, "host");
    let base_path = take_string(root, "basePath");
    let schemes: Vec<TransferScheme> = match root.shift_remove("schemes") {
        Some(schemes) => serde_json::from_value(schemes)?,
        None => Vec::new(),
    };
    let servers = servers_from_parts(&schemes, host.as_deref(), base_path.as_deref());
    if !servers.is_empty() {
        root.insert("servers".to_string(), serde_json::to_value(&servers)?);
    }

    let mut components = Map::new();
    for (legacy, pool) in SWAGGER2_POOLS {
        if let Some(entries) = root.shift_remove(legacy) {
            components.insert(pool.to_string(), entries);
        }
    }
    if !components.is_empty() {
        root.insert("components".to_string(), Value::Object(components));
    }
    Ok(())
}

/// YAML allows an unquoted `swagger: 2.0`; the model keeps versions as text.
fn normalize_version(root: &mut Map<String, Value>) {
    for key in ["swagger", "openapi"] {
        let version = match root.get(key) {
            Some(Value::Number(n)) => n.to_string(),
            _ => continue,
        };
        root.insert(key.to_string(), Value::String(version));
    }
}

fn take_string(map: &mut Map<String, Value>, key: &str) -> Option<String> {
    match map.shift_remove(key) {
        Some(Value::String(s)) => Some(s),
        _ => None,
    }
}

struct Reader {
    schema_type: SchemaType,
    parameters: Map<String, Value>,
    request_bodies: Map<String, Value>,
}

impl Reader {
    fn is_swagger2(&self) -> bool {
        self.schema_type == SchemaType::Swagger2
    }

    fn components(&self, components: &mut Map<String, Value>) -> Result<(), ParseError> {
        for (pool, entries) in components.iter_mut() {
            let Value::Object(entries) = entries else {
                continue;
            };
            for (name, entry) in entries.iter_mut() {
                match pool.as_str() {
                    "parameters" => self.parameter(entry),
                    "responses" => self.response(entry)?,
                    "headers" => self.header(entry),
                    "securitySchemes" => self.security_scheme(entry),
                    "callbacks" => self.callback(entry)?,
                    "pathItems" => self.path_item(name, entry)?,
                    _ => {}
                }
            }
        }
        Ok(())
    }

    fn path_item(&self, path: &str, value: &mut Value) -> Result<(), ParseError> {
        let Some(map) = inline_object(value) else {
            return Ok(());
        };
        mask(self.schema_type, EntityKind::PathItem, map);
        if let Some(Value::Array(parameters)) = map.get_mut("parameters") {
            for parameter in parameters {
                self.parameter(parameter);
            }
        }
        for (key, operation) in map.iter_mut() {
            if let Ok(method) = key.parse::<HttpMethod>() {
                self.operation(path, method, operation)?;
            }
        }
        Ok(())
    }

    fn operation(&self, path: &str, method: HttpMethod, value: &mut Value) -> Result<(), ParseError> {
        let Value::Object(map) = value else {
            return Ok(());
        };
        mask(self.schema_type, EntityKind::Operation, map);

        let name = map
            .get("operationId")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("{} {path}", method.as_upper_str()));
        if let Some(Value::Array(parameters)) = map.get_mut("parameters") {
            for parameter in parameters.iter_mut() {
                self.inline_body_parameter(parameter);
                self.parameter(parameter);
            }
            let bodies = parameters.iter().filter(|p| is_body_parameter(p)).count();
            if bodies > 1 {
                return Err(DocumentError::MultipleBodyParameters { operation: name }.into());
            }
        }
        if let Some(Value::Object(responses)) = map.get_mut("responses") {
            for response in responses.values_mut() {
                self.response(response)?;
            }
        }
        if let Some(request_body) = map.get_mut("requestBody") {
            self.inline_request_body(request_body)?;
        }
        if let Some(Value::Object(callbacks)) = map.get_mut("callbacks") {
            for callback in callbacks.values_mut() {
                self.callback(callback)?;
            }
        }
        Ok(())
    }

    fn callback(&self, value: &mut Value) -> Result<(), ParseError> {
        let Some(map) = inline_object(value) else {
            return Ok(());
        };
        for (expression, item) in map.iter_mut() {
            self.path_item(expression, item)?;
        }
        Ok(())
    }

    fn parameter(&self, value: &mut Value) {
        let Some(map) = inline_object(value) else {
            return;
        };
        mask(self.schema_type, EntityKind::Parameter, map);
        if self.is_swagger2() && map.get("in").and_then(Value::as_str) != Some("body") {
            collect_inline_schema(map);
        }
    }

    fn header(&self, value: &mut Value) {
        if !self.is_swagger2() {
            return;
        }
        if let Some(map) = inline_object(value) {
            collect_inline_schema(map);
        }
    }

    /// Swagger 2.0 `schema`/`examples` become a single content entry.
    fn response(&self, value: &mut Value) -> Result<(), ParseError> {
        let Some(map) = inline_object(value) else {
            return Ok(());
        };
        mask(self.schema_type, EntityKind::Response, map);
        if self.is_swagger2() {
            let schema = map.shift_remove("schema");
            let examples = map.shift_remove("examples");
            if schema.is_some() || examples.is_some() {
                let typed: Option<SchemaOrRef> =
                    schema.clone().map(serde_json::from_value).transpose()?;
                let mut media = Map::new();
                if let Some(schema) = schema {
                    media.insert("schema".to_string(), schema);
                }
                if let Some(examples) = examples {
                    media.insert("example".to_string(), examples);
                }
                let mut content = Map::new();
                content.insert(
                    media_type_key(typed.as_ref()).to_string(),
                    Value::Object(media),
                );
                map.insert("content".to_string(), Value::Object(content));
            }
        }
        if let Some(Value::Object(headers)) = map.get_mut("headers") {
            for header in headers.values_mut() {
                self.header(header);
            }
        }
        Ok(())
    }

    fn security_scheme(&self, value: &mut Value) {
        if let Value::Object(map) = value {
            mask(self.schema_type, EntityKind::SecurityScheme, map);
        }
    }

    /// Replaces a parameter reference with a copy of its target when the
    /// target is a body parameter, so the request body can mirror it.
    fn inline_body_parameter(&self, value: &mut Value) {
        if let Some(target) = self.body_parameter_target(value).cloned() {
            *value = target;
        }
    }

    /// The body parameter at the end of a chain of parameter references.
    /// Dangling or circular chains are left for reference validation.
    fn body_parameter_target<'a>(&'a self, value: &'a Value) -> Option<&'a Value> {
        let mut target = value;
        let mut visited = HashSet::new();
        while let Some(ref_path) = target.get("$ref").and_then(Value::as_str) {
            if !visited.insert(ref_path) {
                return None;
            }
            let name = parse_ref_name(ref_path, "parameters").ok()?;
            target = self.parameters.get(name)?;
        }
        (!visited.is_empty() && is_body_parameter(target)).then_some(target)
    }

    /// Replaces a `requestBody` reference with a copy of its target.
    fn inline_request_body(&self, value: &mut Value) -> Result<(), ParseError> {
        let mut visited = HashSet::new();
        while let Some(ref_path) = value.get("$ref").and_then(Value::as_str).map(str::to_string) {
            if !visited.insert(ref_path.clone()) {
                return Err(ResolveError::CircularRef(ref_path).into());
            }
            let name = parse_ref_name(&ref_path, "requestBodies")?;
            let target = self
                .request_bodies
                .get(name)
                .ok_or_else(|| ResolveError::RefTargetNotFound(ref_path.clone()))?;
            *value = target.clone();
        }
        Ok(())
    }
}

/// The object behind `value` unless it is a `$ref`.
fn inline_object(value: &mut Value) -> Option<&mut Map<String, Value>> {
    match value {
        Value::Object(map) if !map.contains_key("$ref") => Some(map),
        _ => None,
    }
}

fn is_body_parameter(value: &Value) -> bool {
    value.get("in").and_then(Value::as_str) == Some("body")
}

/// Moves the inline type keywords of a Swagger 2.0 parameter or header into
/// `schema`. `x-schema` wins over the keywords when present.
fn collect_inline_schema(map: &mut Map<String, Value>) {
    let mut keywords = Map::new();
    for &key in INLINE_SCHEMA_KEYWORDS {
        if let Some(value) = map.shift_remove(key) {
            keywords.insert(key.to_string(), value);
        }
    }
    let schema = match map.shift_remove("x-schema") {
        Some(schema) => Some(schema),
        None if !keywords.is_empty() => Some(Value::Object(keywords)),
        None => None,
    };
    if let Some(schema) = schema {
        map.insert("schema".to_string(), schema);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::media_type::{BINARY_MEDIA_TYPE, JSON_MEDIA_TYPE};
    use crate::model::schema::{JsonType, Schema};
    use serde_json::json;

    #[test]
    fn test_swagger2_servers_and_pools() {
        let document = from_value(
            json!({
                "swagger": "2.0",
                "info": { "title": "t", "version": "1" },
                "host": "api.example.com",
                "basePath": "/v2",
                "schemes": ["https"],
                "paths": {},
                "definitions": { "Pet": { "type": "object" } },
                "securityDefinitions": { "key": { "type": "apiKey", "name": "k", "in": "header" } }
            }),
            SchemaType::Swagger2,
        )
        .unwrap();
        assert_eq!(document.servers[0].url, "https://api.example.com/v2");
        assert_eq!(document.host().as_deref(), Some("api.example.com"));
        assert_eq!(document.base_path().as_deref(), Some("/v2"));
        assert_eq!(document.schemes(), vec![TransferScheme::Https]);
        assert!(document.components.schemas.contains_key("Pet"));
        assert!(document.components.security_schemes.contains_key("key"));
        assert_eq!(document.schema_type, SchemaType::Swagger2);
    }

    #[test]
    fn test_swagger2_inline_parameter_types() {
        let document = from_value(
            json!({
                "swagger": "2.0",
                "paths": { "/items": { "get": {
                    "parameters": [
                        { "name": "limit", "in": "query", "type": "integer", "maximum": 50 },
                        { "name": "status", "in": "query", "type": "string",
                          "x-schema": { "$ref": "#/definitions/Status" } }
                    ],
                    "responses": {}
                } } }
            }),
            SchemaType::Swagger2,
        )
        .unwrap();
        let operation = document.operations().next().unwrap().operation;
        let limit = operation.parameters()[0].as_item().unwrap();
        assert_eq!(
            limit.schema,
            Some(SchemaOrRef::inline(Schema {
                maximum: Some(50.into()),
                ..Schema::of_type(JsonType::Integer)
            }))
        );
        let status = operation.parameters()[1].as_item().unwrap();
        assert_eq!(status.schema, Some(SchemaOrRef::component("Status")));
    }

    #[test]
    fn test_swagger2_response_schema_becomes_content() {
        let document = from_value(
            json!({
                "swagger": "2.0",
                "paths": { "/files": { "get": { "responses": {
                    "200": { "description": "file", "schema": { "type": "file" } },
                    "201": { "description": "pet", "schema": { "$ref": "#/definitions/Pet" } }
                } } } }
            }),
            SchemaType::Swagger2,
        )
        .unwrap();
        let operation = document.operations().next().unwrap().operation;
        let file = operation.responses["200"].as_item().unwrap();
        assert!(file.content.contains_key(BINARY_MEDIA_TYPE));
        let pet = operation.responses["201"].as_item().unwrap();
        assert_eq!(
            pet.content[JSON_MEDIA_TYPE].schema,
            Some(SchemaOrRef::component("Pet"))
        );
    }

    #[test]
    fn test_openapi3_request_body_reference_is_inlined() {
        let document = from_value(
            json!({
                "openapi": "3.0.1",
                "paths": { "/pets": { "post": {
                    "requestBody": { "$ref": "#/components/requestBodies/PetBody" },
                    "responses": {}
                } } },
                "components": { "requestBodies": { "PetBody": {
                    "required": true,
                    "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Pet" } } }
                } } }
            }),
            SchemaType::OpenApi3,
        )
        .unwrap();
        let operation = document.operations().next().unwrap().operation;
        assert!(operation.request_body().unwrap().required);
        let body = operation.body_parameter().unwrap();
        assert_eq!(body.name, "body");
        assert_eq!(body.schema, Some(SchemaOrRef::component("Pet")));
    }

    #[test]
    fn test_missing_request_body_target() {
        let result = from_value(
            json!({
                "openapi": "3.0.0",
                "paths": { "/pets": { "post": {
                    "requestBody": { "$ref": "#/components/requestBodies/Missing" },
                    "responses": {}
                } } }
            }),
            SchemaType::OpenApi3,
        );
        assert!(matches!(
            result,
            Err(ParseError::Resolve(ResolveError::RefTargetNotFound(_)))
        ));
    }

    #[test]
    fn test_multiple_body_parameters_name_the_operation() {
        let result = from_value(
            json!({
                "swagger": "2.0",
                "paths": { "/pets": { "post": {
                    "parameters": [
                        { "name": "a", "in": "body", "schema": {} },
                        { "name": "b", "in": "body", "schema": {} }
                    ],
                    "responses": {}
                } } }
            }),
            SchemaType::Swagger2,
        );
        match result {
            Err(ParseError::Document(DocumentError::MultipleBodyParameters { operation })) => {
                assert_eq!(operation, "POST /pets");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_referenced_body_parameter_is_inlined() {
        let document = from_value(
            json!({
                "swagger": "2.0",
                "paths": { "/pets": { "post": {
                    "parameters": [
                        { "$ref": "#/parameters/Limit" },
                        { "$ref": "#/parameters/PetBody" }
                    ],
                    "responses": {}
                } } },
                "parameters": {
                    "Limit": { "name": "limit", "in": "query", "type": "integer" },
                    "PetBody": { "$ref": "#/parameters/NewPet" },
                    "NewPet": { "name": "pet", "in": "body", "schema": { "$ref": "#/definitions/Pet" } }
                }
            }),
            SchemaType::Swagger2,
        )
        .unwrap();
        let operation = document.operations().next().unwrap().operation;
        assert!(operation.parameters()[0].is_ref());
        let body = operation.body_parameter().unwrap();
        assert_eq!(body.name, "pet");
        assert_eq!(
            operation.request_body().unwrap().content["application/json"].schema,
            Some(SchemaOrRef::component("Pet"))
        );
    }

    #[test]
    fn test_referenced_and_inline_body_parameters_conflict() {
        let result = from_value(
            json!({
                "swagger": "2.0",
                "paths": { "/pets": { "post": {
                    "operationId": "addPet",
                    "parameters": [
                        { "$ref": "#/parameters/PetBody" },
                        { "name": "other", "in": "body", "schema": {} }
                    ],
                    "responses": {}
                } } },
                "parameters": {
                    "PetBody": { "name": "pet", "in": "body", "schema": {} }
                }
            }),
            SchemaType::Swagger2,
        );
        assert!(matches!(
            result,
            Err(ParseError::Document(DocumentError::MultipleBodyParameters { ref operation }))
                if operation == "addPet"
        ));
    }

    #[test]
    fn test_masked_fields_are_dropped_on_read() {
        let document = from_value(
            json!({
                "openapi": "3.0.0",
                "host": "ignored.example.com",
                "paths": {}
            }),
            SchemaType::OpenApi3,
        )
        .unwrap();
        assert!(document.servers.is_empty());
        assert!(document.extensions.is_empty());
    }

    #[test]
    fn test_numeric_version_is_kept_as_text() {
        let document = from_value(
            json!({ "swagger": 2.0, "paths": {} }),
            SchemaType::Swagger2,
        )
        .unwrap();
        assert_eq!(document.swagger, "2.0");
    }

    #[test]
    fn test_root_must_be_object() {
        assert!(matches!(
            from_value(json!([1, 2]), SchemaType::OpenApi3),
            Err(ParseError::NotAnObject)
        ));
    }
}
