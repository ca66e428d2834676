//! # Compile and Load Errors
//!
//! Every failure carries enough context to find the offending node: a JSON
//! pointer into the document, or the HTTP method and path template of the
//! operation being assembled. Compilation never guesses past an error.

use thiserror::Error;

use crate::document::Method;

/// Failure to turn a document (or one of its schemas) into a processor.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    /// A fact was narrowed from a schema of a different type.
    #[error("schema at '{pointer}' cannot be read as {expected}: it declares {declared}")]
    SchemaMismatch {
        /// JSON pointer of the schema node.
        pointer: String,
        /// Type the fact requires.
        expected: &'static str,
        /// Type(s) the schema declares.
        declared: String,
    },

    /// The schema uses a keyword or a construct that is not compiled.
    #[error("unsupported keyword '{keyword}' at '{pointer}'")]
    UnsupportedKeyword {
        /// JSON pointer of the schema or parameter node.
        pointer: String,
        /// The keyword, or a short description of the construct.
        keyword: String,
    },

    /// No supported media type among those declared.
    #[error(
        "unsupported content at '{pointer}': supported [{}], declared [{}]",
        .supported.join(", "),
        .declared.join(", ")
    )]
    UnsupportedContentType {
        /// JSON pointer of the `content` map.
        pointer: String,
        /// Media types the compiler accepts.
        supported: Vec<String>,
        /// Media types the document declares.
        declared: Vec<String>,
    },

    /// An operation without `operationId`.
    #[error("{method} operation on '{path}' has no operationId")]
    MissingOperationIdentifier {
        /// HTTP method of the operation.
        method: Method,
        /// Path template the operation is declared on.
        path: String,
    },

    /// The requested method is not declared on the path.
    #[error("method {method} is not declared on path '{path}'")]
    MethodNotDeclaredOnPath {
        /// Requested HTTP method.
        method: Method,
        /// Path template that was searched.
        path: String,
    },

    /// A `$ref` survived into the AST handed to the compiler.
    #[error("unresolved reference '{reference}' at '{pointer}'")]
    UnresolvedReference {
        /// JSON pointer of the schema node.
        pointer: String,
        /// The reference target.
        reference: String,
    },

    /// A `pattern` (or path template) that does not compile to a regex.
    #[error("invalid pattern '{pattern}' at '{pointer}': {reason}")]
    InvalidPattern {
        /// JSON pointer of the schema node, or the path template.
        pointer: String,
        /// The pattern as written.
        pattern: String,
        /// Why the regex engine rejected it.
        reason: String,
    },
}

/// Failure to read a document from disk.
#[derive(Error, Debug)]
pub enum DocumentError {
    /// IO error reading the file.
    #[error("io error reading '{path}': {source}")]
    Io {
        /// Path of the document.
        path: String,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The file is not a well-formed document.
    #[error("document load error for '{path}': {reason}")]
    Parse {
        /// Path of the document.
        path: String,
        /// Parser message.
        reason: String,
    },
}
