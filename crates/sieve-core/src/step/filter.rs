//! Value transformations.
//!
//! Filters never vouch for a value: a successful transformation yields
//! `NoOpinion` with the new value, leaving the verdict to the validators
//! that follow.

use std::fmt;

use serde_json::{json, Number, Value};

use super::{type_name, Step};
use crate::outcome::{Message, Outcome};

fn requires(filter: &str, expects: &str, value: Value) -> Outcome {
    let given = type_name(&value);
    Outcome::fail(
        value,
        Message::new(
            format!("{filter} filter requires {expects}, {{}} given"),
            vec![json!(given)],
        ),
    )
}

/// Upper-cases a string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ToUpperCase;

impl fmt::Display for ToUpperCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("convert to upper case")
    }
}

impl Step for ToUpperCase {
    fn apply(&self, value: Value) -> Outcome {
        match value {
            Value::String(text) => Outcome::no_opinion(Value::String(text.to_uppercase())),
            other => requires("ToUpperCase", "a string", other),
        }
    }
}

/// Converts `find-pets`, `find_pets` or `find pets` into `FindPets`.
///
/// Characters that are neither letters nor digits separate words and are
/// dropped. Capitals inside a word are kept, so `showPetById` becomes
/// `ShowPetById`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ToPascalCase;

impl ToPascalCase {
    pub fn convert(text: &str) -> String {
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|word| !word.is_empty())
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            })
            .collect()
    }
}

impl fmt::Display for ToPascalCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("convert to PascalCase")
    }
}

impl Step for ToPascalCase {
    fn apply(&self, value: Value) -> Outcome {
        match value {
            Value::String(text) => Outcome::no_opinion(Value::String(Self::convert(&text))),
            other => requires("ToPascalCase", "a string", other),
        }
    }
}

/// Strips every character outside `[A-Za-z0-9]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlphaNumeric;

impl AlphaNumeric {
    pub fn convert(text: &str) -> String {
        text.chars().filter(char::is_ascii_alphanumeric).collect()
    }
}

impl fmt::Display for AlphaNumeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("remove non-alphanumeric characters")
    }
}

impl Step for AlphaNumeric {
    fn apply(&self, value: Value) -> Outcome {
        match value {
            Value::String(text) => Outcome::no_opinion(Value::String(Self::convert(&text))),
            other => requires("AlphaNumeric", "a string", other),
        }
    }
}

/// Decodes `"true"` / `"false"` (any case) into a boolean.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ToBool;

impl fmt::Display for ToBool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("convert to a boolean")
    }
}

impl Step for ToBool {
    fn apply(&self, value: Value) -> Outcome {
        match &value {
            Value::Bool(_) => Outcome::no_opinion(value),
            Value::String(text) if text.eq_ignore_ascii_case("true") => {
                Outcome::no_opinion(Value::Bool(true))
            }
            Value::String(text) if text.eq_ignore_ascii_case("false") => {
                Outcome::no_opinion(Value::Bool(false))
            }
            _ => requires("ToBool", "a boolean string", value),
        }
    }
}

/// Decodes an integer string into a JSON integer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ToInt;

impl fmt::Display for ToInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("convert to an integer")
    }
}

impl Step for ToInt {
    fn apply(&self, value: Value) -> Outcome {
        let parsed = match &value {
            Value::Number(n) if !n.is_f64() => return Outcome::no_opinion(value),
            Value::String(text) => text
                .parse::<i64>()
                .map(Number::from)
                .or_else(|_| text.parse::<u64>().map(Number::from))
                .ok(),
            _ => None,
        };
        match parsed {
            Some(n) => Outcome::no_opinion(Value::Number(n)),
            None => requires("ToInt", "an integer string", value),
        }
    }
}

/// Decodes a numeric string into a JSON number, keeping integers integral.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ToNumber;

impl fmt::Display for ToNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("convert to a number")
    }
}

impl Step for ToNumber {
    fn apply(&self, value: Value) -> Outcome {
        let parsed = match &value {
            Value::Number(_) => return Outcome::no_opinion(value),
            Value::String(text) => match text.parse::<i64>() {
                Ok(n) => Some(Number::from(n)),
                Err(_) => text.parse::<f64>().ok().and_then(Number::from_f64),
            },
            _ => None,
        };
        match parsed {
            Some(n) => Outcome::no_opinion(Value::Number(n)),
            None => requires("ToNumber", "a numeric string", value),
        }
    }
}

/// Splits a string into a list of strings on a delimiter.
///
/// The empty string decodes to the empty list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Explode {
    delimiter: String,
}

impl Explode {
    pub fn new(delimiter: impl Into<String>) -> Self {
        Self {
            delimiter: delimiter.into(),
        }
    }
}

impl fmt::Display for Explode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "explode string on \"{}\"", self.delimiter)
    }
}

impl Step for Explode {
    fn apply(&self, value: Value) -> Outcome {
        let Value::String(text) = &value else {
            return requires("Explode", "a string", value);
        };
        if text.is_empty() {
            return Outcome::no_opinion(Value::Array(Vec::new()));
        }
        let items = text
            .split(self.delimiter.as_str())
            .map(|item| Value::String(item.to_string()))
            .collect();
        Outcome::no_opinion(Value::Array(items))
    }
}

/// Joins a list of scalars into one string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Implode {
    delimiter: String,
}

impl Implode {
    pub fn new(delimiter: impl Into<String>) -> Self {
        Self {
            delimiter: delimiter.into(),
        }
    }
}

impl fmt::Display for Implode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "implode list with \"{}\"", self.delimiter)
    }
}

impl Step for Implode {
    fn apply(&self, value: Value) -> Outcome {
        let Value::Array(items) = &value else {
            return requires("Implode", "a list", value);
        };
        let mut parts = Vec::with_capacity(items.len());
        for item in items {
            match item {
                Value::String(s) => parts.push(s.clone()),
                Value::Array(_) | Value::Object(_) => {
                    return requires("Implode", "a list of scalars", value);
                }
                scalar => parts.push(scalar.to_string()),
            }
        }
        Outcome::no_opinion(Value::String(parts.join(&self.delimiter)))
    }
}
