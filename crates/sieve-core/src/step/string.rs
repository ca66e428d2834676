//! String validators: length, pattern, dates, and strings that encode
//! other scalars (as request parameters do).

use std::fmt;

use chrono::{DateTime, NaiveDate};
use serde_json::{json, Value};

use super::{type_name, Step};
use crate::outcome::{Message, Outcome};

fn string_expected(value: Value) -> Outcome {
    let given = type_name(&value);
    Outcome::fail(
        value,
        Message::new("String value expected, {} provided", vec![json!(given)]),
    )
}

/// Character-count bounds (`minLength` / `maxLength`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Length {
    min: usize,
    max: Option<usize>,
}

impl Length {
    pub fn new(min: usize, max: Option<usize>) -> Self {
        Self { min, max }
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) => write!(f, "is between {} and {} characters long", self.min, max),
            None => write!(f, "is at least {} characters long", self.min),
        }
    }
}

impl Step for Length {
    fn apply(&self, value: Value) -> Outcome {
        let Some(text) = value.as_str() else {
            let given = type_name(&value);
            return Outcome::fail(
                value,
                Message::new("Length validator requires a string, {} given", vec![json!(given)]),
            );
        };

        let length = text.chars().count();
        if length < self.min {
            return Outcome::fail(
                value,
                Message::new(
                    "String is expected to be a minimum of {} characters",
                    vec![json!(self.min)],
                ),
            );
        }
        if let Some(max) = self.max {
            if length > max {
                return Outcome::fail(
                    value,
                    Message::new(
                        "String is expected to be a maximum of {} characters",
                        vec![json!(max)],
                    ),
                );
            }
        }
        Outcome::valid(value)
    }
}

/// The string must contain a match for the pattern (`pattern`).
///
/// Patterns are unanchored, as in JSON Schema.
#[derive(Debug, Clone)]
pub struct Regex {
    pattern: regex::Regex,
}

impl Regex {
    /// Compile `pattern`.
    ///
    /// # Errors
    ///
    /// Returns the `regex` crate's error for malformed patterns.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: regex::Regex::new(pattern)?,
        })
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }
}

impl PartialEq for Regex {
    fn eq(&self, other: &Self) -> bool {
        self.pattern() == other.pattern()
    }
}

impl fmt::Display for Regex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "matches the regex: \"{}\"", self.pattern())
    }
}

impl Step for Regex {
    fn apply(&self, value: Value) -> Outcome {
        let Some(text) = value.as_str() else {
            let given = type_name(&value);
            return Outcome::fail(
                value,
                Message::new("Regex validator requires a string, {} given", vec![json!(given)]),
            );
        };

        if self.pattern.is_match(text) {
            Outcome::valid(value)
        } else {
            Outcome::fail(
                value,
                Message::new(
                    "String does not match the required pattern {}",
                    vec![json!(self.pattern())],
                ),
            )
        }
    }
}

/// Calendar date in a fixed chrono pattern, e.g. `%Y-%m-%d` for the
/// OpenAPI `date` format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateString {
    format: String,
}

impl DateString {
    pub fn new(format: impl Into<String>) -> Self {
        Self {
            format: format.into(),
        }
    }

    /// The OpenAPI `date` format (RFC 3339 full-date).
    pub fn full_date() -> Self {
        Self::new("%Y-%m-%d")
    }
}

impl fmt::Display for DateString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "matches the DateTime format: \"{}\"", self.format)
    }
}

impl Step for DateString {
    fn apply(&self, value: Value) -> Outcome {
        let Some(text) = value.as_str() else {
            return string_expected(value);
        };

        if NaiveDate::parse_from_str(text, &self.format).is_ok() {
            Outcome::valid(value)
        } else {
            Outcome::fail(
                value,
                Message::new(
                    "String does not match the required format {}",
                    vec![json!(self.format)],
                ),
            )
        }
    }
}

/// RFC 3339 date-time (the OpenAPI `date-time` format).
///
/// Accepts both `Z` and numeric offsets. RFC 3339 is case-insensitive for
/// the `T` and `Z` designators; compilers place `ToUpperCase` first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateTimeString;

impl fmt::Display for DateTimeString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("is an RFC 3339 date-time")
    }
}

impl Step for DateTimeString {
    fn apply(&self, value: Value) -> Outcome {
        let Some(text) = value.as_str() else {
            return string_expected(value);
        };

        if DateTime::parse_from_rfc3339(text).is_ok() {
            return Outcome::valid(value);
        }
        let args = vec![json!(text)];
        Outcome::fail(
            value,
            Message::new("String is not a valid RFC 3339 date-time: {}", args),
        )
    }
}

/// A string spelling a boolean (`true`/`false`, any case).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoolString;

impl fmt::Display for BoolString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("is a string of a boolean")
    }
}

impl Step for BoolString {
    fn apply(&self, value: Value) -> Outcome {
        let Some(text) = value.as_str() else {
            return string_expected(value);
        };

        if text.eq_ignore_ascii_case("true") || text.eq_ignore_ascii_case("false") {
            Outcome::valid(value)
        } else {
            Outcome::fail(value, Message::new("String value must be a boolean", vec![]))
        }
    }
}

/// A string spelling an integer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntString;

impl fmt::Display for IntString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("is a string of an integer")
    }
}

impl Step for IntString {
    fn apply(&self, value: Value) -> Outcome {
        let Some(text) = value.as_str() else {
            return string_expected(value);
        };

        if text.parse::<i64>().is_ok() || text.parse::<u64>().is_ok() {
            Outcome::valid(value)
        } else {
            Outcome::fail(value, Message::new("String value must be an integer", vec![]))
        }
    }
}

/// A string spelling a finite number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NumericString;

impl fmt::Display for NumericString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("is a string of a number")
    }
}

impl Step for NumericString {
    fn apply(&self, value: Value) -> Outcome {
        let Some(text) = value.as_str() else {
            return string_expected(value);
        };

        if text.parse::<f64>().is_ok_and(f64::is_finite) {
            Outcome::valid(value)
        } else {
            Outcome::fail(value, Message::new("String value must be numeric", vec![]))
        }
    }
}
