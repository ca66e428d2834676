//! # sieve-core — Runtime for Compiled Validators
//!
//! This crate executes validation pipelines. It knows nothing about
//! OpenAPI: `sieve-schema` compiles documents into the [`Processor`] trees
//! defined here, and applications run those trees against untyped
//! `serde_json::Value` input.
//!
//! ## Key Design Principles
//!
//! 1. **Failures are values.** Invalid input never produces an `Err`. It
//!    produces an `Invalid` [`Outcome`] carrying every violated location as a
//!    [`MessageSet`]. [`CoreError`] is reserved for misuse of the algebra.
//!
//! 2. **Three verdicts.** `NoOpinion` is distinct from `Valid`, so a wrapper
//!    with nothing to check never claims that its input is valid.
//!
//! 3. **Immutable trees.** A [`Processor`] holds no per-call state. It is
//!    `Send + Sync + Clone` and may serve concurrent requests unguarded.
//!
//! 4. **Open step seam.** Leaf checks implement the [`Step`] trait; the
//!    processor node kinds are a closed enum with exhaustive matching.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `sieve-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod outcome;
pub mod path;
pub mod processor;
pub mod step;

// Re-export primary types for ergonomic imports.
pub use error::CoreError;
pub use outcome::{Message, MessageSet, Outcome, Verdict};
pub use path::{FieldPath, Segment};
pub use processor::{ArraySet, Chain, ObjectSet, Processor};
pub use step::Step;
