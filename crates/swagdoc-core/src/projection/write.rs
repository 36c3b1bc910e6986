use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value, json};

use super::INLINE_SCHEMA_KEYWORDS;
use super::masking::{EntityKind, mask};
use super::refs::to_swagger2_refs;
use crate::error::SerializeError;
use crate::model::callback::CallbackOrRef;
use crate::model::components::Components;
use crate::model::document::{Document, SchemaType};
use crate::model::header::HeaderOrRef;
use crate::model::operation::Operation;
use crate::model::parameter::{Parameter, ParameterOrRef};
use crate::model::path_item::{PathItem, PathItemOrRef};
use crate::model::reference::RefOr;
use crate::model::request_body::RequestBody;
use crate::model::response::ResponseOrRef;
use crate::model::schema::SchemaOrRef;
use crate::model::security::SecurityScheme;

const DOCUMENT_KEY_ORDER: &[&str] = &[
    "x-generator",
    "swagger",
    "openapi",
    "info",
    "servers",
    "host",
    "basePath",
    "schemes",
    "consumes",
    "produces",
    "paths",
    "components",
    "definitions",
    "parameters",
    "responses",
    "securityDefinitions",
    "security",
    "tags",
    "externalDocs",
];

const RESPONSE_KEY_ORDER: &[&str] = &[
    "description",
    "schema",
    "headers",
    "examples",
    "content",
    "links",
];

/// Renders `document` as a `schema_type` JSON tree. Operation IDs are not
/// touched.
pub fn to_value(document: &Document, schema_type: SchemaType) -> Result<Value, SerializeError> {
    if !schema_type.is_document_type() {
        return Err(SerializeError::UnsupportedSchemaType(schema_type));
    }
    let writer = Writer {
        schema_type,
        components: &document.components,
    };
    let mut value = Value::Object(writer.document(document)?);
    if schema_type == SchemaType::Swagger2 {
        to_swagger2_refs(&mut value);
    }
    Ok(value)
}

struct Writer<'a> {
    schema_type: SchemaType,
    components: &'a Components,
}

impl Writer<'_> {
    fn is_swagger2(&self) -> bool {
        self.schema_type == SchemaType::Swagger2
    }

    fn document(&self, document: &Document) -> Result<Map<String, Value>, SerializeError> {
        let mut map = object(document)?;

        let mut paths = Map::new();
        for (path, item) in &document.paths {
            paths.insert(path.clone(), self.path_item_or_ref(item)?);
        }
        map.insert("paths".to_string(), Value::Object(paths));

        let components = &document.components;
        if !components.is_empty() {
            map.insert(
                "components".to_string(),
                Value::Object(self.components(components)?),
            );
        }

        if let Some(host) = document.host() {
            map.insert("host".to_string(), Value::String(host));
        }
        if let Some(base_path) = document.base_path() {
            map.insert("basePath".to_string(), Value::String(base_path));
        }
        let schemes = document.schemes();
        if !schemes.is_empty() {
            map.insert("schemes".to_string(), serde_json::to_value(&schemes)?);
        }
        insert_non_empty(&mut map, "definitions", object(&components.schemas)?);
        insert_non_empty(
            &mut map,
            "parameters",
            self.parameter_pool(&components.parameters)?,
        );
        insert_non_empty(
            &mut map,
            "responses",
            self.response_pool(&components.responses)?,
        );
        insert_non_empty(
            &mut map,
            "securityDefinitions",
            self.security_schemes(&components.security_schemes)?,
        );

        mask(self.schema_type, EntityKind::Document, &mut map);
        Ok(reorder(map, DOCUMENT_KEY_ORDER))
    }

    fn components(&self, components: &Components) -> Result<Map<String, Value>, SerializeError> {
        let mut map = object(components)?;
        if map.contains_key("parameters") {
            map.insert(
                "parameters".to_string(),
                Value::Object(self.parameter_pool(&components.parameters)?),
            );
        }
        if map.contains_key("responses") {
            map.insert(
                "responses".to_string(),
                Value::Object(self.response_pool(&components.responses)?),
            );
        }
        if map.contains_key("headers") {
            let mut headers = Map::new();
            for (name, header) in &components.headers {
                headers.insert(name.clone(), self.header(header)?);
            }
            map.insert("headers".to_string(), Value::Object(headers));
        }
        if map.contains_key("securitySchemes") {
            map.insert(
                "securitySchemes".to_string(),
                Value::Object(self.security_schemes(&components.security_schemes)?),
            );
        }
        if map.contains_key("callbacks") {
            let mut callbacks = Map::new();
            for (name, callback) in &components.callbacks {
                callbacks.insert(name.clone(), self.callback(callback)?);
            }
            map.insert("callbacks".to_string(), Value::Object(callbacks));
        }
        if map.contains_key("pathItems") {
            let mut path_items = Map::new();
            for (name, item) in &components.path_items {
                path_items.insert(name.clone(), self.path_item_or_ref(item)?);
            }
            map.insert("pathItems".to_string(), Value::Object(path_items));
        }
        Ok(map)
    }

    fn parameter_pool(
        &self,
        pool: &IndexMap<String, ParameterOrRef>,
    ) -> Result<Map<String, Value>, SerializeError> {
        pool.iter()
            .map(|(name, parameter)| Ok((name.clone(), self.parameter(parameter)?)))
            .collect()
    }

    fn response_pool(
        &self,
        pool: &IndexMap<String, ResponseOrRef>,
    ) -> Result<Map<String, Value>, SerializeError> {
        pool.iter()
            .map(|(name, response)| Ok((name.clone(), self.response(response)?)))
            .collect()
    }

    fn security_schemes(
        &self,
        schemes: &IndexMap<String, SecurityScheme>,
    ) -> Result<Map<String, Value>, SerializeError> {
        let mut map = Map::new();
        for (name, scheme) in schemes {
            let scheme = if self.is_swagger2() {
                scheme.to_swagger2()
            } else {
                scheme.to_openapi3()
            };
            let mut fields = object(&scheme)?;
            mask(self.schema_type, EntityKind::SecurityScheme, &mut fields);
            map.insert(name.clone(), Value::Object(fields));
        }
        Ok(map)
    }

    fn path_item_or_ref(&self, item: &PathItemOrRef) -> Result<Value, SerializeError> {
        match item {
            RefOr::Item(item) => Ok(Value::Object(self.path_item(item)?)),
            RefOr::Ref { .. } => Ok(serde_json::to_value(item)?),
        }
    }

    fn path_item(&self, item: &PathItem) -> Result<Map<String, Value>, SerializeError> {
        let mut map = object(item)?;
        self.replace_parameters(&mut map, &item.parameters, self.is_swagger2())?;
        for (method, operation) in &item.operations {
            map.insert(
                method.as_str().to_string(),
                Value::Object(self.operation(operation)?),
            );
        }
        mask(self.schema_type, EntityKind::PathItem, &mut map);
        Ok(map)
    }

    fn operation(&self, operation: &Operation) -> Result<Map<String, Value>, SerializeError> {
        let mut map = object(operation)?;
        let mut keep_body = self.is_swagger2();
        if !keep_body && operation.request_body().is_none() {
            match self.referenced_request_body(operation.parameters()) {
                Some(request_body) => {
                    map.insert("requestBody".to_string(), serde_json::to_value(&request_body)?);
                }
                None => keep_body = true,
            }
        }
        self.replace_parameters(&mut map, operation.parameters(), keep_body)?;
        map.insert(
            "responses".to_string(),
            Value::Object(self.response_pool(&operation.responses)?),
        );
        if !operation.callbacks.is_empty() {
            let mut callbacks = Map::new();
            for (name, callback) in &operation.callbacks {
                callbacks.insert(name.clone(), self.callback(callback)?);
            }
            map.insert("callbacks".to_string(), Value::Object(callbacks));
        }
        mask(self.schema_type, EntityKind::Operation, &mut map);
        Ok(map)
    }

    /// A request body built from a body parameter that sits behind a
    /// reference, which the operation itself cannot follow.
    fn referenced_request_body(&self, parameters: &[ParameterOrRef]) -> Option<RequestBody> {
        let parameter = parameters
            .iter()
            .filter(|p| p.is_ref())
            .filter_map(|p| p.actual(self.components).ok())
            .find(|p| p.is_body())?;
        let mut request_body = RequestBody::default();
        request_body.follow_body_parameter(parameter.clone());
        Some(request_body)
    }

    /// OpenAPI 3 carries the body in `requestBody`, so body parameters are
    /// left out of its parameter lists once that is written.
    fn replace_parameters(
        &self,
        map: &mut Map<String, Value>,
        parameters: &[ParameterOrRef],
        keep_body: bool,
    ) -> Result<(), SerializeError> {
        let mut values = Vec::with_capacity(parameters.len());
        for parameter in parameters {
            let is_body = parameter
                .actual(self.components)
                .is_ok_and(Parameter::is_body);
            if is_body && !keep_body {
                continue;
            }
            values.push(self.parameter(parameter)?);
        }
        if values.is_empty() {
            map.shift_remove("parameters");
        } else {
            map.insert("parameters".to_string(), Value::Array(values));
        }
        Ok(())
    }

    fn callback(&self, callback: &CallbackOrRef) -> Result<Value, SerializeError> {
        let RefOr::Item(callback) = callback else {
            return Ok(serde_json::to_value(callback)?);
        };
        let mut map = Map::new();
        for (expression, item) in &callback.expressions {
            map.insert(expression.clone(), self.path_item_or_ref(item)?);
        }
        Ok(Value::Object(map))
    }

    fn parameter(&self, parameter: &ParameterOrRef) -> Result<Value, SerializeError> {
        let RefOr::Item(item) = parameter else {
            return Ok(serde_json::to_value(parameter)?);
        };
        let mut map = object(item)?;
        if self.is_swagger2() && !item.is_body() {
            if let Some(schema) = &item.schema {
                map = splice_schema(map, self.inline_schema(schema)?);
            }
        }
        mask(self.schema_type, EntityKind::Parameter, &mut map);
        Ok(Value::Object(map))
    }

    fn header(&self, header: &HeaderOrRef) -> Result<Value, SerializeError> {
        let RefOr::Item(item) = header else {
            return Ok(serde_json::to_value(header)?);
        };
        let mut map = object(item)?;
        if self.is_swagger2() {
            if let Some(schema) = &item.schema {
                map = splice_schema(map, self.inline_schema(schema)?);
            }
        }
        Ok(Value::Object(map))
    }

    fn response(&self, response: &ResponseOrRef) -> Result<Value, SerializeError> {
        let RefOr::Item(item) = response else {
            return Ok(serde_json::to_value(response)?);
        };
        let mut map = object(item)?;
        if let Some(schema) = item.schema() {
            map.insert("schema".to_string(), serde_json::to_value(schema)?);
        }
        if let Some(examples) = item.examples() {
            map.insert("examples".to_string(), examples.clone());
        }
        if !item.headers.is_empty() {
            let mut headers = Map::new();
            for (name, header) in &item.headers {
                headers.insert(name.clone(), self.header(header)?);
            }
            map.insert("headers".to_string(), Value::Object(headers));
        }
        mask(self.schema_type, EntityKind::Response, &mut map);
        Ok(Value::Object(reorder(map, RESPONSE_KEY_ORDER)))
    }

    /// Swagger 2.0 type keywords for a non-body parameter or header. A
    /// referenced schema is kept in `x-schema` next to the keywords of its
    /// target.
    fn inline_schema(&self, schema: &SchemaOrRef) -> Result<Map<String, Value>, SerializeError> {
        let resolved = match schema {
            SchemaOrRef::Schema(inline) => Some(inline.as_ref()),
            SchemaOrRef::Ref { .. } => schema.actual(self.components).ok(),
        };
        let mut keywords = Map::new();
        if let Some(resolved) = resolved {
            let fields = object(resolved)?;
            for &key in INLINE_SCHEMA_KEYWORDS {
                if let Some(value) = fields.get(key) {
                    keywords.insert(key.to_string(), value.clone());
                }
            }
        }
        if let SchemaOrRef::Ref { ref_path } = schema {
            keywords.insert("x-schema".to_string(), json!({ "$ref": ref_path }));
        }
        Ok(keywords)
    }
}

fn object<T: Serialize + ?Sized>(value: &T) -> Result<Map<String, Value>, SerializeError> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        _ => Ok(Map::new()),
    }
}

fn insert_non_empty(map: &mut Map<String, Value>, key: &str, value: Map<String, Value>) {
    if !value.is_empty() {
        map.insert(key.to_string(), Value::Object(value));
    }
}

/// Replaces the `schema` entry with `keywords`, keeping its position.
fn splice_schema(map: Map<String, Value>, keywords: Map<String, Value>) -> Map<String, Value> {
    let mut keywords = Some(keywords);
    let mut spliced = Map::new();
    for (key, value) in map {
        if key == "schema" {
            if let Some(keywords) = keywords.take() {
                spliced.extend(keywords);
            }
        } else {
            spliced.insert(key, value);
        }
    }
    spliced
}

/// Keys of `order` first, in that order, then the rest as they were.
fn reorder(mut map: Map<String, Value>, order: &[&str]) -> Map<String, Value> {
    let mut ordered = Map::new();
    for &key in order {
        if let Some(value) = map.shift_remove(key) {
            ordered.insert(key.to_string(), value);
        }
    }
    ordered.extend(map);
    ordered
}
