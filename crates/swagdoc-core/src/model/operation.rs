use std::collections::HashSet;
use std::ops::{Deref, DerefMut};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::callback::CallbackOrRef;
use super::components::Components;
use super::info::ExternalDocs;
use super::parameter::{Parameter, ParameterKind, ParameterOrRef};
use super::path_item::PathItem;
use super::request_body::{DEFAULT_BODY_NAME, RequestBody};
use super::response::{Response, ResponseOrRef, is_success_status_code};
use super::schema::Schema;
use super::security::SecurityRequirement;
use super::server::{Server, TransferScheme};
use crate::error::{DocumentError, ResolveError};

/// An API operation.
///
/// The Swagger 2.0 body parameter and the OpenAPI 3 request body are two views
/// of one payload. Both are private and only change through the methods
/// below, which keep the other view in step.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "OperationFields")]
pub struct Operation {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "externalDocs", skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<ExternalDocs>,

    #[serde(rename = "operationId", skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub consumes: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub produces: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub schemes: Vec<TransferScheme>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    parameters: Vec<ParameterOrRef>,

    #[serde(rename = "requestBody", skip_serializing_if = "Option::is_none")]
    request_body: Option<RequestBody>,

    #[serde(default)]
    pub responses: IndexMap<String, ResponseOrRef>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub callbacks: IndexMap<String, CallbackOrRef>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deprecated: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<Vec<SecurityRequirement>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<Server>,

    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,

    #[serde(skip)]
    disable_request_body_update: bool,

    #[serde(skip)]
    disable_body_parameter_update: bool,
}

/// Wire shape of [`Operation`] before the two payload views are linked.
#[derive(Deserialize)]
struct OperationFields {
    #[serde(default)]
    tags: Vec<String>,
    summary: Option<String>,
    description: Option<String>,
    #[serde(rename = "externalDocs")]
    external_docs: Option<ExternalDocs>,
    #[serde(rename = "operationId")]
    operation_id: Option<String>,
    #[serde(default)]
    consumes: Vec<String>,
    #[serde(default)]
    produces: Vec<String>,
    #[serde(default)]
    schemes: Vec<TransferScheme>,
    #[serde(default)]
    parameters: Vec<ParameterOrRef>,
    #[serde(rename = "requestBody")]
    request_body: Option<RequestBody>,
    #[serde(default)]
    responses: IndexMap<String, ResponseOrRef>,
    #[serde(default)]
    callbacks: IndexMap<String, CallbackOrRef>,
    #[serde(default)]
    deprecated: bool,
    security: Option<Vec<SecurityRequirement>>,
    #[serde(default)]
    servers: Vec<Server>,
    #[serde(flatten)]
    extensions: IndexMap<String, Value>,
}

impl TryFrom<OperationFields> for Operation {
    type Error = DocumentError;

    /// A request body, when present, overrides the body parameter. Otherwise
    /// the request body is derived from the body parameter.
    fn try_from(fields: OperationFields) -> Result<Self, Self::Error> {
        let mut operation = Operation {
            tags: fields.tags,
            summary: fields.summary,
            description: fields.description,
            external_docs: fields.external_docs,
            operation_id: fields.operation_id,
            consumes: fields.consumes,
            produces: fields.produces,
            schemes: fields.schemes,
            responses: fields.responses,
            callbacks: fields.callbacks,
            deprecated: fields.deprecated,
            security: fields.security,
            servers: fields.servers,
            extensions: fields.extensions,
            ..Operation::default()
        };
        operation.set_parameters(fields.parameters)?;
        if fields.request_body.is_some() {
            operation.set_request_body(fields.request_body);
        }
        Ok(operation)
    }
}

#[derive(Debug, Clone, Copy)]
enum SyncDirection {
    ToRequestBody,
    ToBodyParameter,
}

/// Holds the reverse-direction flag for the lifetime of one sync pass and
/// clears it on drop, including on unwind.
struct SyncGuard<'a> {
    operation: &'a mut Operation,
    direction: SyncDirection,
}

impl<'a> SyncGuard<'a> {
    fn enter(operation: &'a mut Operation, direction: SyncDirection) -> Self {
        operation.set_sync_flag(direction, true);
        SyncGuard {
            operation,
            direction,
        }
    }
}

impl Drop for SyncGuard<'_> {
    fn drop(&mut self) {
        self.operation.set_sync_flag(self.direction, false);
    }
}

impl Deref for SyncGuard<'_> {
    type Target = Operation;

    fn deref(&self) -> &Operation {
        self.operation
    }
}

impl DerefMut for SyncGuard<'_> {
    fn deref_mut(&mut self) -> &mut Operation {
        self.operation
    }
}

impl Operation {
    pub fn new() -> Self {
        Operation::default()
    }

    pub fn with_operation_id(mut self, operation_id: impl Into<String>) -> Self {
        self.operation_id = Some(operation_id.into());
        self
    }

    pub fn with_response(
        mut self,
        status_code: impl Into<String>,
        response: impl Into<ResponseOrRef>,
    ) -> Self {
        self.responses.insert(status_code.into(), response.into());
        self
    }

    pub fn parameters(&self) -> &[ParameterOrRef] {
        &self.parameters
    }

    pub fn request_body(&self) -> Option<&RequestBody> {
        self.request_body.as_ref()
    }

    /// The inline body-kind parameter, if any.
    pub fn body_parameter(&self) -> Option<&Parameter> {
        self.parameters.iter().find_map(ParameterOrRef::as_body)
    }

    pub fn add_parameter(
        &mut self,
        parameter: impl Into<ParameterOrRef>,
    ) -> Result<(), DocumentError> {
        let index = self.parameters.len();
        self.insert_parameter(index, parameter)
    }

    /// Inserts at `index`, clamped to the end of the list.
    pub fn insert_parameter(
        &mut self,
        index: usize,
        parameter: impl Into<ParameterOrRef>,
    ) -> Result<(), DocumentError> {
        let parameter = parameter.into();
        if parameter.as_body().is_some() && self.body_parameter().is_some() {
            return Err(self.multiple_body_parameters());
        }
        let index = index.min(self.parameters.len());
        self.parameters.insert(index, parameter);
        self.on_parameters_changed();
        Ok(())
    }

    pub fn remove_parameter(&mut self, index: usize) -> Option<ParameterOrRef> {
        if index >= self.parameters.len() {
            return None;
        }
        let removed = self.parameters.remove(index);
        self.on_parameters_changed();
        Some(removed)
    }

    pub fn set_parameters(&mut self, parameters: Vec<ParameterOrRef>) -> Result<(), DocumentError> {
        if parameters.iter().filter(|p| p.as_body().is_some()).count() > 1 {
            return Err(self.multiple_body_parameters());
        }
        self.replace_parameters(parameters);
        Ok(())
    }

    /// Applies `update` to the parameter at `index`. The edit is rejected
    /// without effect when it would leave two body parameters. Returns
    /// `false` when `index` is out of range.
    pub fn update_parameter(
        &mut self,
        index: usize,
        update: impl FnOnce(&mut ParameterOrRef),
    ) -> Result<bool, DocumentError> {
        let Some(current) = self.parameters.get(index) else {
            return Ok(false);
        };
        let mut updated = current.clone();
        update(&mut updated);

        let other_body = self
            .parameters
            .iter()
            .enumerate()
            .any(|(i, p)| i != index && p.as_body().is_some());
        if other_body && updated.as_body().is_some() {
            return Err(self.multiple_body_parameters());
        }

        self.parameters[index] = updated;
        self.on_parameters_changed();
        Ok(true)
    }

    pub fn set_request_body(&mut self, request_body: Option<RequestBody>) {
        self.replace_request_body(request_body);
    }

    /// Applies `update` to the request body. Returns `false` when there is none.
    pub fn update_request_body(&mut self, update: impl FnOnce(&mut RequestBody)) -> bool {
        let Some(request_body) = self.request_body.as_mut() else {
            return false;
        };
        update(request_body);
        self.on_request_body_changed();
        true
    }

    fn replace_parameters(&mut self, parameters: Vec<ParameterOrRef>) {
        self.parameters = parameters;
        self.on_parameters_changed();
    }

    fn replace_request_body(&mut self, request_body: Option<RequestBody>) {
        self.request_body = request_body;
        self.on_request_body_changed();
    }

    fn set_sync_flag(&mut self, direction: SyncDirection, value: bool) {
        match direction {
            SyncDirection::ToRequestBody => self.disable_body_parameter_update = value,
            SyncDirection::ToBodyParameter => self.disable_request_body_update = value,
        }
    }

    /// Body parameter to request body.
    fn on_parameters_changed(&mut self) {
        if self.disable_request_body_update {
            return;
        }
        let body = self.body_parameter().cloned();
        let mut operation = SyncGuard::enter(self, SyncDirection::ToRequestBody);

        let request_body = body.map(|parameter| {
            let mut request_body = operation.request_body.take().unwrap_or_default();
            log::debug!(
                "request body follows body parameter '{}'",
                parameter.name
            );
            request_body.follow_body_parameter(parameter);
            request_body
        });
        operation.replace_request_body(request_body);
    }

    /// Request body to body parameter.
    fn on_request_body_changed(&mut self) {
        if self.disable_body_parameter_update {
            return;
        }
        let request_body = self.request_body.clone();
        let mut operation = SyncGuard::enter(self, SyncDirection::ToBodyParameter);

        let mut parameters = operation.parameters.clone();
        let index = parameters.iter().position(|p| p.as_body().is_some());
        match (request_body, index) {
            (None, None) => return,
            (None, Some(index)) => {
                log::debug!("request body cleared, dropping body parameter");
                parameters.remove(index);
            }
            (Some(request_body), index) => {
                let mut parameter = index
                    .and_then(|i| parameters[i].as_item().cloned())
                    .unwrap_or_else(|| Parameter::new(DEFAULT_BODY_NAME, ParameterKind::Body));
                let (schema, example) = request_body
                    .content
                    .values()
                    .next()
                    .map(|media| (media.schema.clone(), media.example.clone()))
                    .unwrap_or_default();

                parameter.kind = ParameterKind::Body;
                parameter.name = request_body.actual_name().to_string();
                parameter.position = request_body.position;
                parameter.description = request_body.description;
                parameter.required = request_body.required;
                parameter.schema = schema;
                parameter.example = example;

                match index {
                    Some(index) => parameters[index] = parameter.into(),
                    None => parameters.push(parameter.into()),
                }
            }
        }
        operation.replace_parameters(parameters);
    }

    fn multiple_body_parameters(&self) -> DocumentError {
        DocumentError::MultipleBodyParameters {
            operation: self
                .operation_id
                .clone()
                .unwrap_or_else(|| "<unnamed>".to_string()),
        }
    }

    /// Dereferenced operation parameters followed by inherited path-level
    /// ones; the operation wins on a repeated name and location.
    pub fn actual_parameters<'a>(
        &'a self,
        path_item: &'a PathItem,
        components: &'a Components,
    ) -> Result<Vec<&'a Parameter>, ResolveError> {
        let mut parameters = self
            .parameters
            .iter()
            .map(|p| p.actual(components))
            .collect::<Result<Vec<_>, _>>()?;
        if path_item.parameters.is_empty() {
            return Ok(parameters);
        }

        for parameter in &path_item.parameters {
            parameters.push(parameter.actual(components)?);
        }
        let mut seen = HashSet::new();
        parameters.retain(|p| seen.insert((p.name.clone(), p.kind)));
        Ok(parameters)
    }

    pub fn actual_responses<'a>(
        &'a self,
        components: &'a Components,
    ) -> Result<IndexMap<&'a str, &'a Response>, ResolveError> {
        self.responses
            .iter()
            .map(|(code, response)| Ok((code.as_str(), response.actual(components)?)))
            .collect()
    }

    /// `"200"`, else the first 2xx code in declaration order, else `"default"`.
    pub fn success_response(&self) -> Option<(&str, &ResponseOrRef)> {
        self.responses
            .get_key_value("200")
            .or_else(|| {
                self.responses
                    .iter()
                    .find(|(code, _)| is_success_status_code(code))
            })
            .or_else(|| self.responses.get_key_value("default"))
            .map(|(code, response)| (code.as_str(), response))
    }

    /// Whether any 2xx response carries an array schema. Unresolvable
    /// references count as non-array.
    pub fn returns_array(&self, components: &Components) -> bool {
        self.responses
            .iter()
            .filter(|(code, _)| is_success_status_code(code))
            .filter_map(|(_, response)| response.actual(components).ok())
            .filter_map(Response::schema)
            .filter_map(|schema| schema.actual(components).ok())
            .any(Schema::is_array)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::media_type::{BINARY_MEDIA_TYPE, JSON_MEDIA_TYPE, MediaType};
    use crate::model::schema::{JsonType, SchemaOrRef};

    fn body(name: &str, schema: SchemaOrRef) -> Parameter {
        Parameter::new(name, ParameterKind::Body).with_schema(schema)
    }

    #[test]
    fn test_body_parameter_creates_request_body() {
        let mut operation = Operation::new();
        let mut parameter = body("pet", SchemaOrRef::of_type(JsonType::String));
        parameter.required = true;
        parameter.position = Some(1);
        parameter.description = Some("The pet".to_string());
        operation.add_parameter(parameter).unwrap();

        let request_body = operation.request_body().unwrap();
        assert_eq!(request_body.name.as_deref(), Some("pet"));
        assert_eq!(request_body.position, Some(1));
        assert!(request_body.required);
        assert_eq!(request_body.description.as_deref(), Some("The pet"));
        assert_eq!(
            request_body.content[JSON_MEDIA_TYPE].schema,
            Some(SchemaOrRef::of_type(JsonType::String))
        );
        assert_eq!(operation.parameters().len(), 1);
    }

    #[test]
    fn test_binary_body_uses_octet_stream() {
        let mut operation = Operation::new();
        operation
            .add_parameter(body("file", SchemaOrRef::of_type(JsonType::File)))
            .unwrap();
        let request_body = operation.request_body().unwrap();
        assert_eq!(request_body.content.len(), 1);
        assert!(request_body.content.contains_key(BINARY_MEDIA_TYPE));
    }

    #[test]
    fn test_clearing_request_body_removes_body_parameter() {
        let mut operation = Operation::new();
        operation
            .add_parameter(Parameter::new("id", ParameterKind::Path))
            .unwrap();
        operation
            .add_parameter(body("pet", SchemaOrRef::component("Pet")))
            .unwrap();

        operation.set_request_body(None);
        assert!(operation.body_parameter().is_none());
        assert_eq!(operation.parameters().len(), 1);
        assert!(operation.request_body().is_none());
    }

    #[test]
    fn test_request_body_creates_body_parameter() {
        let mut operation = Operation::new();
        operation
            .add_parameter(Parameter::new("id", ParameterKind::Path))
            .unwrap();

        let mut request_body = RequestBody {
            required: true,
            ..RequestBody::default()
        };
        request_body.content.insert(
            "application/xml".to_string(),
            MediaType::new(Some(SchemaOrRef::component("Pet")), None),
        );
        request_body.content.insert(
            JSON_MEDIA_TYPE.to_string(),
            MediaType::new(Some(SchemaOrRef::of_type(JsonType::String)), None),
        );
        operation.set_request_body(Some(request_body));

        let parameter = operation.body_parameter().unwrap();
        assert_eq!(parameter.name, "body");
        assert!(parameter.required);
        assert_eq!(parameter.schema, Some(SchemaOrRef::component("Pet")));
        assert_eq!(operation.parameters().len(), 2);
        // The request body keeps both content entries.
        assert_eq!(operation.request_body().unwrap().content.len(), 2);
    }

    #[test]
    fn test_request_body_edit_updates_existing_parameter() {
        let mut operation = Operation::new();
        operation
            .add_parameter(body("pet", SchemaOrRef::component("Pet")))
            .unwrap();

        assert!(operation.update_request_body(|rb| {
            rb.name = Some("animal".to_string());
            rb.description = Some("An animal".to_string());
        }));

        let parameter = operation.body_parameter().unwrap();
        assert_eq!(parameter.name, "animal");
        assert_eq!(parameter.description.as_deref(), Some("An animal"));
        assert_eq!(operation.parameters().len(), 1);
    }

    #[test]
    fn test_second_body_parameter_is_rejected() {
        let mut operation = Operation::new().with_operation_id("addPet");
        operation
            .add_parameter(body("a", SchemaOrRef::of_type(JsonType::String)))
            .unwrap();
        let err = operation
            .add_parameter(body("b", SchemaOrRef::of_type(JsonType::String)))
            .unwrap_err();
        assert!(matches!(
            err,
            DocumentError::MultipleBodyParameters { ref operation } if operation == "addPet"
        ));
        assert_eq!(operation.parameters().len(), 1);
    }

    #[test]
    fn test_changing_kind_away_from_body_clears_request_body() {
        let mut operation = Operation::new();
        operation
            .add_parameter(body("q", SchemaOrRef::of_type(JsonType::String)))
            .unwrap();
        let updated = operation
            .update_parameter(0, |p| {
                if let Some(p) = p.as_item_mut() {
                    p.kind = ParameterKind::Query;
                }
            })
            .unwrap();
        assert!(updated);
        assert!(operation.request_body().is_none());
        assert_eq!(operation.parameters().len(), 1);
    }

    #[test]
    fn test_removing_body_parameter_clears_request_body() {
        let mut operation = Operation::new();
        operation
            .add_parameter(body("pet", SchemaOrRef::component("Pet")))
            .unwrap();
        assert!(operation.remove_parameter(0).is_some());
        assert!(operation.request_body().is_none());
        assert!(operation.remove_parameter(0).is_none());
    }

    #[test]
    fn test_guards_are_reset_after_sync() {
        let mut operation = Operation::new();
        operation
            .add_parameter(body("pet", SchemaOrRef::component("Pet")))
            .unwrap();
        operation.set_request_body(None);
        assert!(!operation.disable_request_body_update);
        assert!(!operation.disable_body_parameter_update);

        // Both directions still fire after earlier passes.
        operation
            .add_parameter(body("pet", SchemaOrRef::component("Pet")))
            .unwrap();
        assert!(operation.request_body().is_some());
    }

    #[test]
    fn test_referenced_body_parameter_is_opaque() {
        let mut operation = Operation::new();
        operation
            .add_parameter(ParameterOrRef::component("PetBody"))
            .unwrap();
        assert!(operation.request_body().is_none());
    }

    #[test]
    fn test_deserialize_links_body_parameter() {
        let operation: Operation = serde_json::from_value(serde_json::json!({
            "parameters": [
                { "name": "pet", "in": "body", "schema": { "type": "string" } }
            ],
            "responses": {}
        }))
        .unwrap();
        assert_eq!(
            operation.request_body().unwrap().name.as_deref(),
            Some("pet")
        );
    }

    #[test]
    fn test_deserialize_links_request_body() {
        let operation: Operation = serde_json::from_value(serde_json::json!({
            "requestBody": {
                "x-name": "pet",
                "content": { "application/json": { "schema": { "type": "string" } } }
            },
            "responses": {}
        }))
        .unwrap();
        assert_eq!(operation.body_parameter().unwrap().name, "pet");
    }

    #[test]
    fn test_deserialize_rejects_two_body_parameters() {
        let result: Result<Operation, _> = serde_json::from_value(serde_json::json!({
            "operationId": "upload",
            "parameters": [
                { "name": "a", "in": "body" },
                { "name": "b", "in": "body" }
            ],
            "responses": {}
        }));
        let err = result.unwrap_err().to_string();
        assert!(err.contains("upload"));
    }

    #[test]
    fn test_operation_parameters_shadow_path_parameters() {
        let mut path_item = PathItem::new();
        path_item.parameters.push(
            Parameter::new("id", ParameterKind::Path)
                .with_description("shared")
                .into(),
        );
        path_item
            .parameters
            .push(Parameter::new("verbose", ParameterKind::Query).into());

        let mut operation = Operation::new();
        operation
            .add_parameter(Parameter::new("id", ParameterKind::Path).with_description("own"))
            .unwrap();
        operation
            .add_parameter(Parameter::new("id", ParameterKind::Header))
            .unwrap();

        let components = Components::default();
        let actual = operation
            .actual_parameters(&path_item, &components)
            .unwrap();
        let names: Vec<(&str, ParameterKind)> =
            actual.iter().map(|p| (p.name.as_str(), p.kind)).collect();
        assert_eq!(
            names,
            [
                ("id", ParameterKind::Path),
                ("id", ParameterKind::Header),
                ("verbose", ParameterKind::Query)
            ]
        );
        assert_eq!(actual[0].description.as_deref(), Some("own"));
    }

    #[test]
    fn test_actual_parameters_resolve_references() {
        let mut components = Components::default();
        components.parameters.insert(
            "Limit".to_string(),
            Parameter::new("limit", ParameterKind::Query).into(),
        );
        let mut operation = Operation::new();
        operation
            .add_parameter(ParameterOrRef::component("Limit"))
            .unwrap();

        let path_item = PathItem::new();
        let actual = operation
            .actual_parameters(&path_item, &components)
            .unwrap();
        assert_eq!(actual[0].name, "limit");
    }

    #[test]
    fn test_success_response_selection() {
        let operation = Operation::new()
            .with_response("default", Response::new("error"))
            .with_response("201", Response::new("created"))
            .with_response("200", Response::new("ok"));
        assert_eq!(operation.success_response().map(|(c, _)| c), Some("200"));

        let operation = Operation::new()
            .with_response("default", Response::new("error"))
            .with_response("204", Response::new("empty"));
        assert_eq!(operation.success_response().map(|(c, _)| c), Some("204"));

        let operation = Operation::new()
            .with_response("404", Response::new("missing"))
            .with_response("default", Response::new("error"));
        assert_eq!(
            operation.success_response().map(|(c, _)| c),
            Some("default")
        );

        assert!(Operation::new().success_response().is_none());
    }

    #[test]
    fn test_returns_array_follows_references() {
        let mut components = Components::default();
        components.schemas.insert(
            "Pets".to_string(),
            SchemaOrRef::array_of(SchemaOrRef::component("Pet")),
        );
        let operation = Operation::new().with_response(
            "200",
            Response::new("ok").with_schema(SchemaOrRef::component("Pets")),
        );
        assert!(operation.returns_array(&components));

        let operation = Operation::new().with_response(
            "200",
            Response::new("ok").with_schema(SchemaOrRef::component("Pet")),
        );
        assert!(!operation.returns_array(&components));
    }
}
