//! Whole-container validators: enum membership, cardinality, uniqueness
//! and key presence.

use std::fmt;

use serde_json::{json, Value};

use super::{type_name, Step};
use crate::outcome::{Message, MessageSet, Outcome};

/// Structural equality that treats numerically equal numbers as equal
/// (`2` and `2.0`), recursively.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) if x.is_f64() || y.is_f64() => {
            x.as_f64() == y.as_f64()
        }
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).is_some_and(|y| values_equal(x, y)))
        }
        _ => a == b,
    }
}

/// The value must equal one of the listed values (`enum`).
#[derive(Debug, Clone, PartialEq)]
pub struct Contained {
    allowed: Vec<Value>,
}

impl Contained {
    pub fn new(allowed: Vec<Value>) -> Self {
        Self { allowed }
    }

    pub fn allowed(&self) -> &[Value] {
        &self.allowed
    }
}

impl fmt::Display for Contained {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "is one of the following values: {}", Value::Array(self.allowed.clone()))
    }
}

impl Step for Contained {
    fn apply(&self, value: Value) -> Outcome {
        if self.allowed.iter().any(|allowed| values_equal(allowed, &value)) {
            return Outcome::valid(value);
        }
        let allowed = Value::Array(self.allowed.clone());
        Outcome::fail(
            value,
            Message::new("Contained validator did not find value within {}", vec![allowed]),
        )
    }
}

/// Bounds the number of items of an array or properties of an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Count {
    min: usize,
    max: Option<usize>,
}

impl Count {
    pub fn new(min: usize, max: Option<usize>) -> Self {
        Self { min, max }
    }
}

impl fmt::Display for Count {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) => write!(f, "has between {} and {} values", self.min, max),
            None => write!(f, "has at least {} values", self.min),
        }
    }
}

impl Step for Count {
    fn apply(&self, value: Value) -> Outcome {
        let (size, kind, unit) = match &value {
            Value::Array(items) => (items.len(), "Array", "values"),
            Value::Object(fields) => (fields.len(), "Object", "properties"),
            other => {
                let given = type_name(other);
                return Outcome::fail(
                    value,
                    Message::new(
                        "Count validator requires an array or object, {} given",
                        vec![json!(given)],
                    ),
                );
            }
        };

        if size < self.min {
            return Outcome::fail(
                value,
                Message::new(
                    format!("{kind} is expected to have a minimum of {{}} {unit}"),
                    vec![json!(self.min)],
                ),
            );
        }
        if let Some(max) = self.max {
            if size > max {
                return Outcome::fail(
                    value,
                    Message::new(
                        format!("{kind} is expected to have a maximum of {{}} {unit}"),
                        vec![json!(max)],
                    ),
                );
            }
        }
        Outcome::valid(value)
    }
}

/// Array items must be pairwise distinct (`uniqueItems`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Unique;

impl fmt::Display for Unique {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("has unique values")
    }
}

impl Step for Unique {
    fn apply(&self, value: Value) -> Outcome {
        let Some(items) = value.as_array() else {
            let given = type_name(&value);
            return Outcome::fail(
                value,
                Message::new("Unique validator requires an array, {} given", vec![json!(given)]),
            );
        };

        let duplicated = items
            .iter()
            .enumerate()
            .any(|(i, a)| items[i + 1..].iter().any(|b| values_equal(a, b)));
        if duplicated {
            return Outcome::fail(value, Message::new("Collection contains duplicate values", vec![]));
        }
        Outcome::valid(value)
    }
}

/// The listed keys must be present on the object (`required`).
///
/// Every missing key is reported, in declaration order, in one set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredFields {
    fields: Vec<String>,
}

impl RequiredFields {
    pub fn new(fields: Vec<String>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }
}

impl fmt::Display for RequiredFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "contains the following fields: {}", self.fields.join(", "))
    }
}

impl Step for RequiredFields {
    fn apply(&self, value: Value) -> Outcome {
        let Some(object) = value.as_object() else {
            let given = type_name(&value);
            return Outcome::fail(
                value,
                Message::new(
                    "RequiredFields validator requires an object, {} given",
                    vec![json!(given)],
                ),
            );
        };

        let missing: Vec<Message> = self
            .fields
            .iter()
            .filter(|field| !object.contains_key(field.as_str()))
            .map(|field| Message::new("{} is a required field", vec![json!(field)]))
            .collect();

        if missing.is_empty() {
            Outcome::valid(value)
        } else {
            Outcome::rejected(value, vec![MessageSet::new(None, missing)])
        }
    }
}

/// Only the listed keys may appear (`additionalProperties: false`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoAdditionalFields {
    permitted: Vec<String>,
}

impl NoAdditionalFields {
    pub fn new(permitted: Vec<String>) -> Self {
        Self { permitted }
    }
}

impl fmt::Display for NoAdditionalFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "contains no fields other than: {}", self.permitted.join(", "))
    }
}

impl Step for NoAdditionalFields {
    fn apply(&self, value: Value) -> Outcome {
        let Some(object) = value.as_object() else {
            let given = type_name(&value);
            return Outcome::fail(
                value,
                Message::new(
                    "NoAdditionalFields validator requires an object, {} given",
                    vec![json!(given)],
                ),
            );
        };

        let extra: Vec<Message> = object
            .keys()
            .filter(|key| !self.permitted.iter().any(|p| p == *key))
            .map(|key| Message::new("{} is not a permitted field", vec![json!(key)]))
            .collect();

        if extra.is_empty() {
            Outcome::valid(value)
        } else {
            Outcome::rejected(value, vec![MessageSet::new(None, extra)])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(outcome: &Outcome) -> Vec<String> {
        outcome
            .message_sets()
            .iter()
            .flat_map(|s| s.messages().iter().map(Message::render))
            .collect()
    }

    #[test]
    fn test_values_equal_normalizes_numbers() {
        assert!(values_equal(&json!(2), &json!(2.0)));
        assert!(values_equal(&json!([1, {"a": 2.0}]), &json!([1.0, {"a": 2}])));
        assert!(!values_equal(&json!(2), &json!("2")));
        assert!(!values_equal(&json!({"a": 1}), &json!({"a": 1, "b": 2})));
    }

    #[test]
    fn test_contained() {
        let step = Contained::new(vec![json!("a"), json!("b"), json!(null)]);
        assert!(step.apply(json!("a")).is_valid());
        assert!(step.apply(json!(null)).is_valid());
        assert!(step.apply(json!("c")).is_invalid());
    }

    #[test]
    fn test_contained_whole_containers() {
        let step = Contained::new(vec![json!({"id": 5}), json!({"id": 10})]);
        assert!(step.apply(json!({"id": 10})).is_valid());
        assert!(step.apply(json!({"id": 11})).is_invalid());
    }

    #[test]
    fn test_count_bounds() {
        let step = Count::new(2, Some(3));
        assert!(step.apply(json!([1, 2])).is_valid());
        assert_eq!(
            rendered(&step.apply(json!([1]))),
            vec!["Array is expected to have a minimum of 2 values"]
        );
        assert_eq!(
            rendered(&step.apply(json!({"a": 1, "b": 2, "c": 3, "d": 4}))),
            vec!["Object is expected to have a maximum of 3 properties"]
        );
        assert!(step.apply(json!("ab")).is_invalid());
    }

    #[test]
    fn test_unique() {
        assert!(Unique.apply(json!([1, 2, 3])).is_valid());
        assert!(Unique.apply(json!([1, 2, 1.0])).is_invalid());
        assert!(Unique.apply(json!([])).is_valid());
    }

    #[test]
    fn test_required_fields_reports_each_missing_field() {
        let step = RequiredFields::new(vec!["id".into(), "name".into()]);
        assert!(step.apply(json!({"id": 1, "name": "Ben"})).is_valid());

        let outcome = step.apply(json!({}));
        assert_eq!(outcome.message_sets().len(), 1);
        assert_eq!(
            rendered(&outcome),
            vec!["id is a required field", "name is a required field"]
        );
    }

    #[test]
    fn test_no_additional_fields() {
        let step = NoAdditionalFields::new(vec!["id".into()]);
        assert!(step.apply(json!({"id": 1})).is_valid());
        assert_eq!(
            rendered(&step.apply(json!({"id": 1, "extra": true}))),
            vec!["extra is not a permitted field"]
        );
    }
}
