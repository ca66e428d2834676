//! Fixed-verdict steps and step-level alternation.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use super::Step;
use crate::outcome::{Message, MessageSet, Outcome};

/// Always valid. Compiled for schemas that impose no constraint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Passes;

impl fmt::Display for Passes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("will return valid")
    }
}

impl Step for Passes {
    fn apply(&self, value: Value) -> Outcome {
        Outcome::valid(value)
    }
}

/// Always invalid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Fails;

impl fmt::Display for Fails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("will return invalid")
    }
}

impl Step for Fails {
    fn apply(&self, value: Value) -> Outcome {
        Outcome::fail(value, Message::new("I always fail", vec![]))
    }
}

/// Never expresses an opinion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Indifferent;

impl fmt::Display for Indifferent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("will return no opinion")
    }
}

impl Step for Indifferent {
    fn apply(&self, value: Value) -> Outcome {
        Outcome::no_opinion(value)
    }
}

/// Step-level OR: the first alternative that validates wins.
///
/// Unlike the `AnyOf` processor this operates inside a single field chain,
/// e.g. to accept either of two date-time spellings. Failures of all
/// alternatives are reported together in one message set.
#[derive(Debug, Clone)]
pub struct AnyOfSteps {
    alternatives: Vec<Arc<dyn Step>>,
}

impl AnyOfSteps {
    pub fn new(alternatives: Vec<Arc<dyn Step>>) -> Self {
        Self { alternatives }
    }
}

impl fmt::Display for AnyOfSteps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any of the following: ")?;
        for (i, step) in self.alternatives.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{step}")?;
        }
        Ok(())
    }
}

impl Step for AnyOfSteps {
    fn apply(&self, value: Value) -> Outcome {
        let mut messages = Vec::new();
        for step in &self.alternatives {
            let outcome = step.apply(value.clone());
            if outcome.is_valid() {
                return outcome;
            }
            for set in outcome.message_sets() {
                messages.extend(set.messages().iter().cloned());
            }
        }

        if messages.is_empty() {
            Outcome::no_opinion(value)
        } else {
            Outcome::rejected(value, vec![MessageSet::new(None, messages)])
        }
    }
}
