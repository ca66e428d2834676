//! # Operation Assembly
//!
//! Builds one processor per operation request and one per declared
//! response.
//!
//! ## Request values
//!
//! A request is validated as a single JSON object:
//!
//! ```json
//! { "path": {..}, "query": {..}, "header": {..}, "cookie": {..}, "body": <json> }
//! ```
//!
//! Parameter values are the raw strings taken from the HTTP request. Each
//! is decoded by the filter for its serialization style, then typed by a
//! schema compiled with [`Encoding::Text`]. Only locations that declare
//! parameters appear in the processor; other keys pass through.
//!
//! ## Content
//!
//! Bodies are compiled only for `application/json` (media type parameters
//! such as `charset` are ignored). Any other declared media type fails
//! compilation, listing what was supported and what was declared.

use std::sync::Arc;

use sieve_core::step::{Form, IsObject, Label, Matrix, RequiredFields, Simple, Step};
use sieve_core::{Chain, ObjectSet, Processor};
use tracing::debug;

use crate::builder::{Encoding, SchemaCompiler};
use crate::document::{
    pointer_token, MediaType, Method, Operation, OrderedMap, Parameter, ParameterLocation, ParameterStyle,
    PathItem, Response, Type,
};
use crate::error::CompileError;
use crate::path_template::PathTemplate;

/// Media types bodies may be declared with.
pub const SUPPORTED_CONTENT_TYPES: [&str; 1] = ["application/json"];

/// One operation, resolved from its path item.
#[derive(Debug, Clone)]
pub struct OpenApiRequest<'a> {
    template: PathTemplate,
    path_item: &'a PathItem,
    operation: &'a Operation,
    method: Method,
    operation_id: &'a str,
}

impl<'a> OpenApiRequest<'a> {
    /// # Errors
    ///
    /// [`CompileError::MethodNotDeclaredOnPath`] if `path_item` has no
    /// `method` operation, [`CompileError::MissingOperationIdentifier`] if
    /// the operation has no `operationId`, and
    /// [`CompileError::InvalidPattern`] for a malformed template.
    pub fn new(template: &str, path_item: &'a PathItem, method: Method) -> Result<Self, CompileError> {
        let operation = path_item
            .operation(method)
            .ok_or_else(|| CompileError::MethodNotDeclaredOnPath {
                method,
                path: template.to_string(),
            })?;
        let operation_id = operation
            .operation_id
            .as_deref()
            .ok_or_else(|| CompileError::MissingOperationIdentifier {
                method,
                path: template.to_string(),
            })?;

        Ok(Self {
            template: PathTemplate::parse(template)?,
            path_item,
            operation,
            method,
            operation_id,
        })
    }

    pub fn operation_id(&self) -> &'a str {
        self.operation_id
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn template(&self) -> &PathTemplate {
        &self.template
    }

    pub fn operation(&self) -> &'a Operation {
        self.operation
    }

    /// JSON pointer of the operation.
    pub fn pointer(&self) -> String {
        format!("#/paths/{}/{}", pointer_token(self.template.template()), self.method)
    }

    /// Path-level and operation-level parameters with their pointers.
    /// An operation parameter replaces a path-level one with the same name
    /// and location.
    pub fn parameters(&self) -> Vec<(&'a Parameter, String)> {
        let path_pointer = format!("#/paths/{}/parameters", pointer_token(self.template.template()));
        let op_pointer = format!("{}/parameters", self.pointer());

        let mut merged: Vec<(&'a Parameter, String)> = self
            .path_item
            .parameters
            .iter()
            .enumerate()
            .map(|(i, p)| (p, format!("{path_pointer}/{i}")))
            .collect();
        for (i, param) in self.operation.parameters.iter().enumerate() {
            let pointer = format!("{op_pointer}/{i}");
            match merged
                .iter_mut()
                .find(|(p, _)| p.name == param.name && p.location == param.location)
            {
                Some(slot) => *slot = (param, pointer),
                None => merged.push((param, pointer)),
            }
        }
        merged
    }

    /// Declared responses, in document order.
    pub fn responses(&self) -> Vec<OpenApiResponse<'a>> {
        self.operation
            .responses
            .iter()
            .map(|(status, response)| {
                OpenApiResponse::new(self.operation_id, status, response)
                    .at(format!("{}/responses/{}", self.pointer(), pointer_token(status)))
            })
            .collect()
    }
}

/// One declared response of an operation.
#[derive(Debug, Clone)]
pub struct OpenApiResponse<'a> {
    operation_id: &'a str,
    status: &'a str,
    response: &'a Response,
    pointer: String,
}

impl<'a> OpenApiResponse<'a> {
    pub fn new(operation_id: &'a str, status: &'a str, response: &'a Response) -> Self {
        Self {
            operation_id,
            status,
            response,
            pointer: format!("#/responses/{}", pointer_token(status)),
        }
    }

    /// Locate the response in its document, for error messages.
    pub fn at(mut self, pointer: String) -> Self {
        self.pointer = pointer;
        self
    }

    pub fn operation_id(&self) -> &'a str {
        self.operation_id
    }

    /// Status code as declared (`200`, `4XX`, `default`).
    pub fn status(&self) -> &'a str {
        self.status
    }

    pub fn pointer(&self) -> &str {
        &self.pointer
    }
}

/// True for `application/json`, ignoring parameters and case.
pub fn is_supported_content_type(media_type: &str) -> bool {
    let essence = media_type.split(';').next().unwrap_or_default().trim();
    SUPPORTED_CONTENT_TYPES
        .iter()
        .any(|supported| essence.eq_ignore_ascii_case(supported))
}

/// Compile the JSON entry of a content map.
fn compile_content(
    compiler: &SchemaCompiler,
    content: &OrderedMap<MediaType>,
    pointer: &str,
) -> Result<Processor, CompileError> {
    if content.is_empty() {
        return Ok(Processor::passes());
    }
    let Some((media_type, media)) = content.iter().find(|(key, _)| is_supported_content_type(key)) else {
        return Err(CompileError::UnsupportedContentType {
            pointer: pointer.to_string(),
            supported: SUPPORTED_CONTENT_TYPES.iter().map(|s| s.to_string()).collect(),
            declared: content.keys().map(str::to_string).collect(),
        });
    };
    match &media.schema {
        Some(schema) => compiler.compile(schema, &format!("{pointer}/{}/schema", pointer_token(media_type))),
        None => Ok(Processor::passes()),
    }
}

/// Builds request processors.
#[derive(Debug, Clone, Default)]
pub struct RequestBuilder {
    compiler: SchemaCompiler,
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build(&self, request: &OpenApiRequest<'_>) -> Result<Processor, CompileError> {
        debug!(
            operation_id = request.operation_id(),
            method = %request.method(),
            path = request.template().template(),
            "compiling request"
        );

        let parameters = request.parameters();
        let mut required_locations = Vec::new();
        let mut properties = Vec::new();

        for location in ParameterLocation::ALL {
            let declared: Vec<&(&Parameter, String)> =
                parameters.iter().filter(|(p, _)| p.location == location).collect();
            if declared.is_empty() {
                continue;
            }

            let required: Vec<String> = declared
                .iter()
                .filter(|(p, _)| p.is_required())
                .map(|(p, _)| p.name.clone())
                .collect();

            let mut before = Chain::new().then(IsObject);
            if !required.is_empty() {
                before.push(RequiredFields::new(required));
                required_locations.push(location.as_str().to_string());
            }
            let mut set = ObjectSet::new(before);
            for (param, pointer) in declared {
                set = set.with_property(param.name.clone(), self.parameter(param, pointer)?);
            }
            properties.push((location.as_str(), Processor::ObjectSet(set)));
        }

        if let Some(body) = &request.operation().request_body {
            let pointer = format!("{}/requestBody/content", request.pointer());
            properties.push(("body", compile_content(&self.compiler, &body.content, &pointer)?));
            if body.required {
                required_locations.push("body".to_string());
            }
        }

        let mut before = Chain::new().then(IsObject);
        if !required_locations.is_empty() {
            before.push(RequiredFields::new(required_locations));
        }
        let root = properties
            .into_iter()
            .fold(ObjectSet::new(before), |set, (name, processor)| set.with_property(name, processor));
        Ok(Processor::ObjectSet(root))
    }

    fn parameter(&self, param: &Parameter, pointer: &str) -> Result<Processor, CompileError> {
        let style = param.style();
        if matches!(
            style,
            ParameterStyle::DeepObject | ParameterStyle::SpaceDelimited | ParameterStyle::PipeDelimited
        ) {
            return Err(CompileError::UnsupportedKeyword {
                pointer: pointer.to_string(),
                keyword: format!("style: {}", style.as_str()),
            });
        }

        let Some(schema) = &param.schema else {
            return Ok(Processor::passes());
        };
        let processor = self
            .compiler
            .compile_encoded(schema, &format!("{pointer}/schema"), Encoding::Text)?;

        let (name, explode, composite) = (param.name.as_str(), param.explode(), schema.declares(Type::Array));
        let decoder: Arc<dyn Step> = match style {
            ParameterStyle::Matrix => Arc::new(Matrix::new(name, explode, composite)),
            ParameterStyle::Label => Arc::new(Label::new(name, explode, composite)),
            ParameterStyle::Form => Arc::new(Form::new(name, explode, composite)),
            _ => Arc::new(Simple::new(name, explode, composite)),
        };
        Ok(processor.preceded_by(decoder))
    }
}

/// Builds response processors.
#[derive(Debug, Clone, Default)]
pub struct ResponseBuilder {
    compiler: SchemaCompiler,
}

impl ResponseBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build(&self, response: &OpenApiResponse<'_>) -> Result<Processor, CompileError> {
        debug!(
            operation_id = response.operation_id(),
            status = response.status(),
            "compiling response"
        );
        match &response.response.content {
            None => Ok(Processor::passes()),
            Some(content) => compile_content(&self.compiler, content, &format!("{}/content", response.pointer())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use serde_json::json;
    use sieve_core::FieldPath;

    fn document(value: serde_json::Value) -> Document {
        serde_json::from_value(value).unwrap()
    }

    fn petstore() -> Document {
        document(json!({
            "openapi": "3.0.3",
            "paths": {
                "/pets/{petId}": {
                    "parameters": [
                        {"name": "petId", "in": "path", "required": true, "schema": {"type": "string"}},
                        {"name": "X-Trace", "in": "header", "schema": {"type": "string"}}
                    ],
                    "get": {
                        "operationId": "showPetById",
                        "parameters": [
                            {"name": "petId", "in": "path", "required": true, "schema": {"type": "integer"}},
                            {"name": "fields", "in": "query", "schema": {"type": "array", "items": {"type": "string"}}, "explode": false},
                            {"name": "verbose", "in": "query", "schema": {"type": "boolean"}}
                        ],
                        "responses": {
                            "200": {"content": {"application/json; charset=utf-8": {"schema": {"type": "object", "required": ["id"]}}}},
                            "404": {"description": "missing"}
                        }
                    },
                    "put": {
                        "operationId": "updatePet",
                        "requestBody": {"required": true, "content": {"application/json": {"schema": {"type": "object"}}}},
                        "responses": {}
                    },
                    "delete": {
                        "responses": {}
                    },
                    "patch": {
                        "operationId": "patchPet",
                        "requestBody": {"content": {"application/xml": {}, "text/plain": {}}},
                        "responses": {}
                    }
                }
            }
        }))
    }

    fn request(doc: &Document, method: Method) -> Result<Processor, CompileError> {
        let item = doc.path_item("/pets/{petId}").unwrap();
        RequestBuilder::new().build(&OpenApiRequest::new("/pets/{petId}", item, method)?)
    }

    #[test]
    fn test_operation_parameters_override_path_parameters() {
        let doc = petstore();
        let item = doc.path_item("/pets/{petId}").unwrap();
        let request = OpenApiRequest::new("/pets/{petId}", item, Method::Get).unwrap();
        let params = request.parameters();
        let names: Vec<(&str, &str)> = params.iter().map(|(p, ptr)| (p.name.as_str(), ptr.as_str())).collect();
        assert_eq!(
            names,
            vec![
                ("petId", "#/paths/~1pets~1{petId}/get/parameters/0"),
                ("X-Trace", "#/paths/~1pets~1{petId}/parameters/1"),
                ("fields", "#/paths/~1pets~1{petId}/get/parameters/1"),
                ("verbose", "#/paths/~1pets~1{petId}/get/parameters/2"),
            ]
        );
    }

    #[test]
    fn test_request_decodes_parameters() {
        let doc = petstore();
        let processor = request(&doc, Method::Get).unwrap();
        let outcome = processor.process(
            &FieldPath::operation("showPetById"),
            json!({
                "path": {"petId": "12"},
                "query": {"fields": "name,tag", "verbose": "true"},
                "header": {"X-Trace": "abc"}
            }),
        );
        assert!(outcome.is_valid(), "{outcome}");
        assert_eq!(
            outcome.value(),
            &json!({
                "path": {"petId": 12},
                "query": {"fields": ["name", "tag"], "verbose": true},
                "header": {"X-Trace": "abc"}
            })
        );
    }

    #[test]
    fn test_request_reports_located_errors() {
        let doc = petstore();
        let processor = request(&doc, Method::Get).unwrap();
        let outcome = processor.process(
            &FieldPath::operation("showPetById"),
            json!({"path": {"petId": "abc"}, "query": {"verbose": "maybe"}}),
        );
        let located: Vec<String> = outcome
            .message_sets()
            .iter()
            .map(|set| set.path().map(ToString::to_string).unwrap_or_default())
            .collect();
        assert_eq!(located, vec!["showPetById.path.petId", "showPetById.query.verbose"]);
    }

    #[test]
    fn test_required_locations() {
        let doc = petstore();
        let processor = request(&doc, Method::Get).unwrap();
        let outcome = processor.process(&FieldPath::operation("showPetById"), json!({"query": {}}));
        assert_eq!(
            outcome.message_sets()[0].messages()[0].render(),
            "path is a required field"
        );

        let processor = request(&doc, Method::Put).unwrap();
        assert!(processor
            .process(&FieldPath::operation("updatePet"), json!({"path": {"petId": "1"}}))
            .is_invalid());
        assert!(processor
            .process(&FieldPath::operation("updatePet"), json!({"path": {"petId": "1"}, "body": {}}))
            .is_valid());
    }

    #[test]
    fn test_missing_operation_id_names_method() {
        let doc = petstore();
        assert_eq!(
            request(&doc, Method::Delete).unwrap_err(),
            CompileError::MissingOperationIdentifier { method: Method::Delete, path: "/pets/{petId}".into() }
        );
    }

    #[test]
    fn test_undeclared_method() {
        let doc = petstore();
        assert!(matches!(
            request(&doc, Method::Post).unwrap_err(),
            CompileError::MethodNotDeclaredOnPath { method: Method::Post, .. }
        ));
    }

    #[test]
    fn test_unsupported_body_content_type() {
        let doc = petstore();
        let err = request(&doc, Method::Patch).unwrap_err();
        assert_eq!(
            err,
            CompileError::UnsupportedContentType {
                pointer: "#/paths/~1pets~1{petId}/patch/requestBody/content".into(),
                supported: vec!["application/json".into()],
                declared: vec!["application/xml".into(), "text/plain".into()],
            }
        );
        assert_eq!(
            err.to_string(),
            "unsupported content at '#/paths/~1pets~1{petId}/patch/requestBody/content': \
             supported [application/json], declared [application/xml, text/plain]"
        );
    }

    #[test]
    fn test_unsupported_parameter_style() {
        let doc = document(json!({"paths": {"/search": {"get": {
            "operationId": "search",
            "parameters": [{"name": "filter", "in": "query", "style": "deepObject", "schema": {"type": "string"}}],
            "responses": {}
        }}}}));
        let item = doc.path_item("/search").unwrap();
        let err = RequestBuilder::new()
            .build(&OpenApiRequest::new("/search", item, Method::Get).unwrap())
            .unwrap_err();
        assert_eq!(
            err,
            CompileError::UnsupportedKeyword {
                pointer: "#/paths/~1search/get/parameters/0".into(),
                keyword: "style: deepObject".into(),
            }
        );
    }

    #[test]
    fn test_responses() {
        let doc = petstore();
        let item = doc.path_item("/pets/{petId}").unwrap();
        let request = OpenApiRequest::new("/pets/{petId}", item, Method::Get).unwrap();
        let responses = request.responses();
        assert_eq!(responses.iter().map(OpenApiResponse::status).collect::<Vec<_>>(), vec!["200", "404"]);

        let builder = ResponseBuilder::new();
        let ok = builder.build(&responses[0]).unwrap();
        assert!(ok.process(&FieldPath::root(), json!({"id": 1})).is_valid());
        assert!(ok.process(&FieldPath::root(), json!({})).is_invalid());

        let missing = builder.build(&responses[1]).unwrap();
        assert!(missing.process(&FieldPath::root(), json!("anything")).is_valid());
    }

    #[test]
    fn test_content_type_matching() {
        assert!(is_supported_content_type("application/json"));
        assert!(is_supported_content_type("Application/JSON; charset=utf-8"));
        assert!(!is_supported_content_type("application/problem+json"));
    }
}
