//! # Check Subcommand
//!
//! Runs the request or response processor of one operation against a value
//! read from disk and reports every located message.

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context};
use clap::Args;
use serde::Serialize;
use serde_json::Value;
use sieve_core::{FieldPath, Outcome};
use sieve_schema::{Document, OpenApiRequest, RequestBuilder, ResponseBuilder};

/// Arguments for the check subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// OpenAPI document (`.json`, `.yaml` or `.yml`).
    #[arg(long)]
    pub spec: PathBuf,

    /// `operationId` of the operation to check against.
    #[arg(long)]
    pub operation: String,

    /// Check a response with this status code.
    #[arg(long, conflicts_with = "request", required_unless_present = "request")]
    pub status: Option<String>,

    /// Check a request value (`{path, query, header, cookie, body}`).
    #[arg(long)]
    pub request: bool,

    /// JSON or YAML file holding the value.
    #[arg(long)]
    pub value: PathBuf,

    /// Concrete URL path; its template parameters fill `path` of the request.
    #[arg(long, requires = "request")]
    pub url_path: Option<String>,
}

/// Messages reported at one location.
#[derive(Debug, Clone, Serialize)]
pub struct LocatedMessages {
    pub path: String,
    pub messages: Vec<String>,
}

/// Result of a check.
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub valid: bool,
    pub verdict: String,
    pub value: Value,
    pub messages: Vec<LocatedMessages>,
}

impl From<Outcome> for CheckReport {
    fn from(outcome: Outcome) -> Self {
        let valid = !outcome.is_invalid();
        let verdict = outcome.verdict().to_string();
        let (value, _, sets) = outcome.into_parts();
        let messages = sets
            .iter()
            .map(|set| LocatedMessages {
                path: set.path().map(ToString::to_string).unwrap_or_default(),
                messages: set.messages().iter().map(ToString::to_string).collect(),
            })
            .collect();
        Self {
            valid,
            verdict,
            value,
            messages,
        }
    }
}

/// Compile the selected processor and run it on the value.
pub fn run_check(args: &CheckArgs) -> anyhow::Result<CheckReport> {
    let document = crate::load_document(&args.spec)?;
    let mut value = crate::load_value(&args.value)?;
    let request = find_operation(&document, &args.operation)?;

    let outcome = if args.request {
        if let Some(url_path) = &args.url_path {
            let params = request
                .template()
                .extract(url_path)
                .ok_or_else(|| anyhow!("{url_path} does not match {}", request.template().template()))?;
            let object = value
                .as_object_mut()
                .context("a request value must be an object")?;
            object.insert("path".to_string(), Value::Object(params));
        }
        let processor = RequestBuilder::new().build(&request)?;
        processor.process(&FieldPath::operation(request.operation_id()), value)
    } else {
        let status = args.status.as_deref().unwrap_or_default();
        let response = request
            .responses()
            .into_iter()
            .find(|response| response.status() == status)
            .ok_or_else(|| anyhow!("operation {} declares no {status} response", args.operation))?;
        let processor = ResponseBuilder::new().build(&response)?;
        processor.process(&FieldPath::root(), value)
    };

    tracing::debug!(operation = %args.operation, verdict = %outcome.verdict(), "checked value");
    Ok(outcome.into())
}

fn find_operation<'a>(document: &'a Document, operation_id: &str) -> anyhow::Result<OpenApiRequest<'a>> {
    for (template, item) in document.paths.iter() {
        for (method, operation) in item.operations() {
            if operation.operation_id.as_deref() == Some(operation_id) {
                return Ok(OpenApiRequest::new(template, item, method)?);
            }
        }
    }
    bail!("no operation with operationId {operation_id}")
}
