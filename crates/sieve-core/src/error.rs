//! # Error Types — Programming-Contract Violations
//!
//! Runtime validation failures are never errors: they are ordinary
//! `Invalid` outcomes. The errors defined here signal that the outcome
//! algebra or the processor tree was *misused* by the code assembling it,
//! e.g. an `Invalid` outcome built without messages, or a combinator
//! with a single branch.

use thiserror::Error;

use crate::path::FieldPath;

/// Top-level error type for `sieve-core`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// Two message sets with unrelated field paths were merged.
    #[error("cannot merge message sets for unrelated field paths '{left}' and '{right}'")]
    MergeConflict {
        /// Path of the receiving message set.
        left: FieldPath,
        /// Path of the message set being merged in.
        right: FieldPath,
    },

    /// An invalid outcome was requested without any message sets.
    #[error("an invalid outcome requires at least one message set")]
    MissingMessageSets,

    /// An invalid outcome was requested with an empty message set.
    #[error("message set at index {index} is empty; invalid outcomes only carry non-empty sets")]
    EmptyMessageSet {
        /// Position of the offending set in the argument list.
        index: usize,
    },

    /// A combinator was configured with fewer than two branches.
    #[error("{kind} requires at least 2 branches, {given} given")]
    RedundantCombinator {
        /// Combinator name (`AnyOf`, `AllOf`, `OneOf`).
        kind: &'static str,
        /// Number of branches supplied.
        given: usize,
    },
}
