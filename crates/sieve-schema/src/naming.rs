//! # Definition Generation
//!
//! Walks every operation of a document and yields one named [`Definition`]
//! per request and per declared response, ready for an artifact writer to
//! persist.
//!
//! Definitions are namespaced `<ns>::Request` and
//! `<ns>::Response::Code<status>`. Each operation gets one name, shared by
//! its request and all of its responses. Names derive from the
//! `operationId`: PascalCase, alphanumeric only, and prefixed with `m` when
//! they would start with a digit or be empty. A name already given to an
//! earlier operation of the document gets the smallest free integer
//! suffix, so the result depends on document order.

use std::collections::HashSet;

use sieve_core::step::{AlphaNumeric, ToPascalCase};
use sieve_core::Processor;
use tracing::info;

use crate::document::Document;
use crate::error::CompileError;
use crate::operation::{OpenApiRequest, RequestBuilder, ResponseBuilder};

/// A compiled processor with the name it should be persisted under.
#[derive(Debug, Clone)]
pub struct Definition {
    pub namespace: String,
    pub name: String,
    pub processor: Processor,
}

impl Definition {
    /// `namespace::name`.
    pub fn qualified_name(&self) -> String {
        format!("{}::{}", self.namespace, self.name)
    }
}

/// Derive a name from `operation_id` that is not in `existing`.
pub fn class_name(operation_id: &str, existing: &HashSet<String>) -> String {
    let mut base = AlphaNumeric::convert(&ToPascalCase::convert(operation_id));
    if base.is_empty() || base.starts_with(|c: char| c.is_ascii_digit()) {
        base.insert(0, 'm');
    }
    if !existing.contains(&base) {
        return base;
    }
    (1u64..)
        .map(|suffix| format!("{base}{suffix}"))
        .find(|candidate| !existing.contains(candidate))
        .unwrap_or(base)
}

/// Produces the definitions of a whole document.
#[derive(Debug, Clone, Default)]
pub struct DefinitionGenerator {
    requests: RequestBuilder,
    responses: ResponseBuilder,
}

impl DefinitionGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile every operation of `document`, in path then method order.
    ///
    /// # Errors
    ///
    /// The first [`CompileError`] met; nothing is returned for a document
    /// that fails anywhere.
    pub fn generate(
        &self,
        document: &Document,
        namespace: &str,
        requests: bool,
        responses: bool,
    ) -> Result<Vec<Definition>, CompileError> {
        let mut taken = HashSet::new();
        let mut definitions = Vec::new();

        for (template, path_item) in document.paths.iter() {
            for (method, _) in path_item.operations() {
                let request = OpenApiRequest::new(template, path_item, method)?;
                let name = class_name(request.operation_id(), &taken);
                taken.insert(name.clone());

                if requests {
                    let processor = self.requests.build(&request)?;
                    definitions.push(define(format!("{namespace}::Request"), &name, processor));
                }

                if responses {
                    for response in request.responses() {
                        let processor = self.responses.build(&response)?;
                        definitions.push(define(
                            format!("{namespace}::Response::Code{}", response.status()),
                            &name,
                            processor,
                        ));
                    }
                }
            }
        }

        Ok(definitions)
    }
}

fn define(namespace: String, name: &str, processor: Processor) -> Definition {
    let name = name.to_string();
    info!(namespace = %namespace, name = %name, kind = processor.kind(), "generated definition");
    Definition {
        namespace,
        name,
        processor,
    }
}
