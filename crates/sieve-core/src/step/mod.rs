//! # Leaf Steps
//!
//! A step is one independent filter or validator: a pure function from a
//! value to an [`Outcome`]. Validators pass the value through unchanged;
//! filters may transform it. Steps report failures with unlocated message
//! sets; the enclosing processor assigns the location.
//!
//! The catalog is grouped by concern:
//!
//! - [`types`] — JSON type checks.
//! - [`utility`] — fixed-verdict steps and step-level alternation.
//! - [`collection`] — enum membership, cardinality, uniqueness, required keys.
//! - [`numeric`] — range and divisibility checks.
//! - [`string`] — length, pattern, dates and textual scalars.
//! - [`filter`] — value transformations.
//! - [`style`] — OpenAPI parameter serialization decoding.
//!
//! [`Step`] is a trait rather than a closed enum: applications may add
//! their own filters next to the built-in catalog.

use std::fmt;

use serde_json::Value;

use crate::outcome::Outcome;

pub mod collection;
pub mod filter;
pub mod numeric;
pub mod string;
pub mod style;
pub mod types;
pub mod utility;

pub use collection::{Contained, Count, NoAdditionalFields, RequiredFields, Unique};
pub use filter::{AlphaNumeric, Explode, Implode, ToBool, ToInt, ToNumber, ToPascalCase, ToUpperCase};
pub use numeric::{Maximum, Minimum, MultipleOf};
pub use string::{BoolString, DateString, DateTimeString, IntString, Length, NumericString, Regex};
pub use style::{Form, Label, Matrix, Simple};
pub use types::{IsBool, IsFloat, IsInt, IsList, IsNull, IsNumber, IsObject, IsString};
pub use utility::{AnyOfSteps, Fails, Indifferent, Passes};

/// One filter or validator in a chain.
///
/// `Display` describes what the step checks ("is a string"); it feeds
/// processor descriptions and outlines, never control flow.
pub trait Step: fmt::Display + fmt::Debug + Send + Sync {
    /// Apply the step to `value`.
    fn apply(&self, value: Value) -> Outcome;
}

/// JSON type name of a value, as used in messages.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_type_names() {
        assert_eq!(type_name(&json!(null)), "null");
        assert_eq!(type_name(&json!(true)), "boolean");
        assert_eq!(type_name(&json!(1)), "integer");
        assert_eq!(type_name(&json!(1.5)), "float");
        assert_eq!(type_name(&json!("a")), "string");
        assert_eq!(type_name(&json!([])), "array");
        assert_eq!(type_name(&json!({})), "object");
    }
}
