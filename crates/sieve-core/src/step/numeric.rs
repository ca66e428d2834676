//! Numeric range and divisibility validators.

use std::fmt;

use serde_json::{json, Number, Value};

use super::{type_name, Step};
use crate::outcome::{Message, Outcome};

fn not_a_number(validator: &str, value: Value) -> Outcome {
    let given = type_name(&value);
    Outcome::fail(
        value,
        Message::new(
            format!("{validator} validator requires a number, {{}} given"),
            vec![json!(given)],
        ),
    )
}

/// Lower bound (`minimum` / `exclusiveMinimum`).
#[derive(Debug, Clone, PartialEq)]
pub struct Minimum {
    limit: Number,
    exclusive: bool,
}

impl Minimum {
    pub fn new(limit: Number, exclusive: bool) -> Self {
        Self { limit, exclusive }
    }

    pub fn inclusive(limit: Number) -> Self {
        Self::new(limit, false)
    }

    pub fn exclusive(limit: Number) -> Self {
        Self::new(limit, true)
    }
}

impl fmt::Display for Minimum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.exclusive { "greater than" } else { "greater than or equal to" };
        write!(f, "is {kind} {}", self.limit)
    }
}

impl Step for Minimum {
    fn apply(&self, value: Value) -> Outcome {
        let Some(n) = value.as_f64() else {
            return not_a_number("Minimum", value);
        };
        let limit = self.limit.as_f64().unwrap_or(f64::NEG_INFINITY);
        match (self.exclusive, n) {
            (false, n) if n < limit => Outcome::fail(
                value,
                Message::new("Number has a minimum of {}", vec![Value::Number(self.limit.clone())]),
            ),
            (true, n) if n <= limit => Outcome::fail(
                value,
                Message::new(
                    "Number has an exclusive minimum of {}",
                    vec![Value::Number(self.limit.clone())],
                ),
            ),
            _ => Outcome::valid(value),
        }
    }
}

/// Upper bound (`maximum` / `exclusiveMaximum`).
#[derive(Debug, Clone, PartialEq)]
pub struct Maximum {
    limit: Number,
    exclusive: bool,
}

impl Maximum {
    pub fn new(limit: Number, exclusive: bool) -> Self {
        Self { limit, exclusive }
    }

    pub fn inclusive(limit: Number) -> Self {
        Self::new(limit, false)
    }

    pub fn exclusive(limit: Number) -> Self {
        Self::new(limit, true)
    }
}

impl fmt::Display for Maximum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.exclusive { "less than" } else { "less than or equal to" };
        write!(f, "is {kind} {}", self.limit)
    }
}

impl Step for Maximum {
    fn apply(&self, value: Value) -> Outcome {
        let Some(n) = value.as_f64() else {
            return not_a_number("Maximum", value);
        };
        let limit = self.limit.as_f64().unwrap_or(f64::INFINITY);
        match (self.exclusive, n) {
            (false, n) if n > limit => Outcome::fail(
                value,
                Message::new("Number has a maximum of {}", vec![Value::Number(self.limit.clone())]),
            ),
            (true, n) if n >= limit => Outcome::fail(
                value,
                Message::new(
                    "Number has an exclusive maximum of {}",
                    vec![Value::Number(self.limit.clone())],
                ),
            ),
            _ => Outcome::valid(value),
        }
    }
}

/// Divisibility (`multipleOf`).
#[derive(Debug, Clone, PartialEq)]
pub struct MultipleOf {
    factor: Number,
}

impl MultipleOf {
    pub fn new(factor: Number) -> Self {
        Self { factor }
    }

    fn divides(&self, n: &Number) -> bool {
        if let (Some(n), Some(factor)) = (n.as_i64(), self.factor.as_i64()) {
            return factor != 0 && n % factor == 0;
        }
        match (n.as_f64(), self.factor.as_f64()) {
            (Some(n), Some(factor)) if factor != 0.0 => {
                let quotient = n / factor;
                (quotient - quotient.round()).abs() < 1e-9
            }
            _ => false,
        }
    }
}

impl fmt::Display for MultipleOf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "is a multiple of {}", self.factor)
    }
}

impl Step for MultipleOf {
    fn apply(&self, value: Value) -> Outcome {
        let divides = match &value {
            Value::Number(n) => self.divides(n),
            _ => return not_a_number("MultipleOf", value),
        };
        if divides {
            Outcome::valid(value)
        } else {
            Outcome::fail(
                value,
                Message::new(
                    "Number is expected to be a multiple of {}",
                    vec![Value::Number(self.factor.clone())],
                ),
            )
        }
    }
}
