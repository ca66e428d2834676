//! # sieve-schema — OpenAPI to Processor Compiler
//!
//! Reads an OpenAPI document into a typed model and compiles its schemas
//! into `sieve-core` [`Processor`](sieve_core::Processor) trees.
//!
//! ## Document Model (`document`)
//!
//! [`Document`] is deserialized with serde from JSON or YAML that has
//! already had its `$ref`s resolved. Map order is preserved, so properties
//! and responses compile in the order they were written.
//!
//! ## Compilation (`fact`, `builder`)
//!
//! A [`Schema`] is narrowed to one [`SchemaFact`] per declared type, and
//! each fact is handed to its builder. [`SchemaCompiler`] owns the builders
//! and resolves `allOf` / `anyOf` / `oneOf` and `nullable` around them.
//!
//! ## Operations (`operation`, `naming`)
//!
//! - [`RequestBuilder`] compiles the parameters and body of one operation
//!   into a processor for a `{path, query, header, cookie, body}` value.
//! - [`ResponseBuilder`] compiles one declared response body.
//! - [`DefinitionGenerator`] walks a whole document and names every
//!   compiled processor for ahead-of-time persistence.
//!
//! ## Crate Policy
//!
//! - Depends only on `sieve-core` internally.
//! - Performs no I/O beyond [`Document::from_path`].
//! - Every [`CompileError`] names the document node it came from.

pub mod builder;
pub mod document;
pub mod error;
pub mod fact;
pub mod naming;
pub mod operation;
pub mod path_template;

pub use builder::{Encoding, SchemaCompiler};
pub use document::{Document, Method, Schema};
pub use error::{CompileError, DocumentError};
pub use fact::SchemaFact;
pub use naming::{class_name, Definition, DefinitionGenerator};
pub use operation::{OpenApiRequest, OpenApiResponse, RequestBuilder, ResponseBuilder};
pub use path_template::PathTemplate;
