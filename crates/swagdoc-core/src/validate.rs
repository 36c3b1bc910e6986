use crate::error::{DocumentError, ParseError, ResolveError};
use crate::model::components::Components;
use crate::model::document::Document;
use crate::model::reference::{RefOr, Referenceable};
use crate::model::schema::SchemaOrRef;
use crate::model::{
    callback::Callback, example::Example, header::Header, link::Link, parameter::Parameter,
    path_item::PathItem, request_body::RequestBody, response::Response,
};
use crate::projection::refs::collect_refs;

impl Document {
    /// Resolves every `$ref` in the document against its components and
    /// returns how many were checked.
    ///
    /// Also fails when an operation ends up with more than one body
    /// parameter once its parameter references are followed.
    pub fn validate_references(&self) -> Result<usize, ParseError> {
        let value = serde_json::to_value(self)?;
        let mut refs = Vec::new();
        collect_refs(&value, &mut refs);
        for ref_path in &refs {
            resolve(ref_path, &self.components)?;
        }
        for operation in self.operations() {
            let mut bodies = 0;
            for parameter in operation.operation.parameters() {
                if parameter.actual(&self.components)?.is_body() {
                    bodies += 1;
                }
            }
            if bodies > 1 {
                let name = operation.operation.operation_id.clone().unwrap_or_else(|| {
                    format!("{} {}", operation.method.as_upper_str(), operation.path)
                });
                return Err(DocumentError::MultipleBodyParameters { operation: name }.into());
            }
        }
        log::debug!("{} references resolved", refs.len());
        Ok(refs.len())
    }
}

fn resolve(ref_path: &str, components: &Components) -> Result<(), ResolveError> {
    if !ref_path.starts_with('#') {
        return Err(ResolveError::UnresolvedRef(ref_path.to_string()));
    }
    let section = ref_path
        .strip_prefix("#/components/")
        .and_then(|rest| rest.split_once('/'))
        .map(|(section, _)| section)
        .ok_or_else(|| ResolveError::InvalidRefFormat(ref_path.to_string()))?;
    match section {
        "schemas" => SchemaOrRef::Ref {
            ref_path: ref_path.to_string(),
        }
        .actual(components)
        .map(|_| ()),
        "parameters" => resolve_in::<Parameter>(ref_path, components),
        "responses" => resolve_in::<Response>(ref_path, components),
        "examples" => resolve_in::<Example>(ref_path, components),
        "requestBodies" => resolve_in::<RequestBody>(ref_path, components),
        "headers" => resolve_in::<Header>(ref_path, components),
        "links" => resolve_in::<Link>(ref_path, components),
        "callbacks" => resolve_in::<Callback>(ref_path, components),
        "pathItems" => resolve_in::<PathItem>(ref_path, components),
        _ => Err(ResolveError::InvalidRefFormat(ref_path.to_string())),
    }
}

fn resolve_in<T: Referenceable>(ref_path: &str, components: &Components) -> Result<(), ResolveError> {
    RefOr::<T>::reference(ref_path).actual(components).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::operation::Operation;
    use crate::model::parameter::{ParameterKind, ParameterOrRef};
    use crate::model::path_item::HttpMethod;
    use crate::model::schema::JsonType;

    fn document_with_response_schema(schema: SchemaOrRef) -> Document {
        let mut document = Document::default();
        document
            .path_item_entry("/pets")
            .unwrap()
            .insert_operation(
                HttpMethod::Get,
                Operation::new().with_response("200", Response::new("ok").with_schema(schema)),
            );
        document
    }

    #[test]
    fn test_all_references_resolve() {
        let mut document = document_with_response_schema(SchemaOrRef::component("Pet"));
        document
            .components
            .schemas
            .insert("Pet".to_string(), SchemaOrRef::of_type(JsonType::Object));
        assert_eq!(document.validate_references().unwrap(), 1);
    }

    #[test]
    fn test_referenced_body_next_to_inline_body_is_reported() {
        let mut document = Document::default();
        document.components.parameters.insert(
            "PetBody".to_string(),
            Parameter::new("pet", ParameterKind::Body).into(),
        );
        let mut operation = Operation::new();
        operation
            .add_parameter(ParameterOrRef::component("PetBody"))
            .unwrap();
        operation
            .add_parameter(Parameter::new("other", ParameterKind::Body))
            .unwrap();
        document
            .path_item_entry("/pets")
            .unwrap()
            .insert_operation(HttpMethod::Post, operation);

        match document.validate_references() {
            Err(ParseError::Document(DocumentError::MultipleBodyParameters { operation })) => {
                assert_eq!(operation, "POST /pets");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_missing_target_is_reported() {
        let document = document_with_response_schema(SchemaOrRef::component("Missing"));
        assert!(matches!(
            document.validate_references(),
            Err(ParseError::Resolve(ResolveError::RefTargetNotFound(_)))
        ));
    }

    #[test]
    fn test_external_reference_is_unresolved() {
        let document = document_with_response_schema(SchemaOrRef::Ref {
            ref_path: "common.json#/Pet".to_string(),
        });
        assert!(matches!(
            document.validate_references(),
            Err(ParseError::Resolve(ResolveError::UnresolvedRef(_)))
        ));
    }
}
