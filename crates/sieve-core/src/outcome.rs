//! # Outcome Model
//!
//! Every step and processor produces an [`Outcome`]: the (possibly
//! transformed) value plus a tri-state [`Verdict`] and, when invalid, the
//! field-located [`MessageSet`]s describing what went wrong.
//!
//! ## Invariants
//!
//! - A `MessageSet` is empty iff it carries zero messages.
//! - An `Invalid` outcome carries at least one message set and none of
//!   them is empty. `Valid` and `NoOpinion` outcomes carry none.
//!
//! The fields of [`Outcome`] are private so these invariants hold by
//! construction: [`Outcome::invalid`] rejects empty input and
//! [`Outcome::fail`] always produces exactly one root message.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::error::CoreError;
use crate::path::FieldPath;

/// A message template plus positional substitution values.
///
/// Templates use `{}` placeholders. The message is never pre-rendered, so
/// callers can inspect the template and arguments programmatically.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    template: String,
    args: Vec<Value>,
}

impl Message {
    /// Create a message from a template and its substitution values.
    pub fn new(template: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            template: template.into(),
            args,
        }
    }

    /// The raw template.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// The substitution values, in placeholder order.
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// Substitute the arguments into the template.
    ///
    /// String arguments are inserted without quotes; other values use their
    /// JSON rendering. Surplus placeholders are left as `{}`.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.template.len());
        let mut args = self.args.iter();
        let mut rest = self.template.as_str();
        while let Some(pos) = rest.find("{}") {
            out.push_str(&rest[..pos]);
            match args.next() {
                Some(Value::String(s)) => out.push_str(s),
                Some(other) => out.push_str(&other.to_string()),
                None => out.push_str("{}"),
            }
            rest = &rest[pos + 2..];
        }
        out.push_str(rest);
        out
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Messages that apply to one location. A `None` path means "wherever the
/// producing step was applied"; processors fill it in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageSet {
    path: Option<FieldPath>,
    messages: Vec<Message>,
}

impl MessageSet {
    /// Create a message set.
    pub fn new(path: Option<FieldPath>, messages: Vec<Message>) -> Self {
        Self { path, messages }
    }

    /// A single unlocated message.
    pub fn single(message: Message) -> Self {
        Self::new(None, vec![message])
    }

    /// The location these messages apply to, if known.
    pub fn path(&self) -> Option<&FieldPath> {
        self.path.as_ref()
    }

    /// The messages, in the order they were produced.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// True when the set carries no messages.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Merge two message sets for the same (or an enclosing) location.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MergeConflict`] if both paths are set and
    /// neither is a prefix of the other.
    pub fn merge(&self, other: &MessageSet) -> Result<MessageSet, CoreError> {
        if let (Some(left), Some(right)) = (&self.path, &other.path) {
            if !left.is_mergeable_with(right) {
                return Err(CoreError::MergeConflict {
                    left: left.clone(),
                    right: right.clone(),
                });
            }
        }

        let mut messages = self.messages.clone();
        messages.extend(other.messages.iter().cloned());
        Ok(MessageSet {
            path: self.path.clone().or_else(|| other.path.clone()),
            messages,
        })
    }

    /// Locate an unlocated set at `path`. Located sets are left untouched.
    pub fn at(mut self, path: &FieldPath) -> Self {
        if self.path.is_none() {
            self.path = Some(path.clone());
        }
        self
    }
}

impl fmt::Display for MessageSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let location = match &self.path {
            Some(path) if !path.is_root() => path.to_string(),
            _ => "(root)".to_string(),
        };
        for (i, message) in self.messages.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "  {location}: {message}")?;
        }
        Ok(())
    }
}

/// Classification carried by an [`Outcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// At least one step vouched for the value and none rejected it.
    Valid,
    /// At least one step rejected the value.
    Invalid,
    /// No step expressed an opinion.
    NoOpinion,
}

impl Verdict {
    /// Combine two verdicts: invalid dominates, then valid.
    pub fn combine(self, other: Verdict) -> Verdict {
        match (self, other) {
            (Self::Invalid, _) | (_, Self::Invalid) => Self::Invalid,
            (Self::Valid, _) | (_, Self::Valid) => Self::Valid,
            (Self::NoOpinion, Self::NoOpinion) => Self::NoOpinion,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Valid => "valid",
            Self::Invalid => "invalid",
            Self::NoOpinion => "no opinion",
        })
    }
}

/// Result of running a step or processor against a value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome {
    value: Value,
    verdict: Verdict,
    message_sets: Vec<MessageSet>,
}

impl Outcome {
    /// The value passed every check that expressed an opinion.
    pub fn valid(value: Value) -> Self {
        Self {
            value,
            verdict: Verdict::Valid,
            message_sets: Vec::new(),
        }
    }

    /// Nothing expressed an opinion about the value.
    pub fn no_opinion(value: Value) -> Self {
        Self {
            value,
            verdict: Verdict::NoOpinion,
            message_sets: Vec::new(),
        }
    }

    /// The value was rejected.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MissingMessageSets`] when `message_sets` is empty
    /// and [`CoreError::EmptyMessageSet`] when any set carries no messages.
    pub fn invalid(value: Value, message_sets: Vec<MessageSet>) -> Result<Self, CoreError> {
        if message_sets.is_empty() {
            return Err(CoreError::MissingMessageSets);
        }
        if let Some(index) = message_sets.iter().position(MessageSet::is_empty) {
            return Err(CoreError::EmptyMessageSet { index });
        }
        Ok(Self::rejected(value, message_sets))
    }

    /// The value was rejected with a single unlocated message.
    pub fn fail(value: Value, message: Message) -> Self {
        Self::rejected(value, vec![MessageSet::single(message)])
    }

    /// Invalid outcome from sets that the caller already took from other
    /// invalid outcomes, so they are known to be non-empty.
    pub(crate) fn rejected(value: Value, message_sets: Vec<MessageSet>) -> Self {
        debug_assert!(!message_sets.is_empty());
        Self {
            value,
            verdict: Verdict::Invalid,
            message_sets,
        }
    }

    /// Reassemble an outcome split by [`Outcome::into_parts`].
    pub(crate) fn from_parts(value: Value, verdict: Verdict, message_sets: Vec<MessageSet>) -> Self {
        debug_assert_eq!(verdict == Verdict::Invalid, !message_sets.is_empty());
        Self {
            value,
            verdict,
            message_sets,
        }
    }

    /// The produced value.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Consume the outcome and return the produced value.
    pub fn into_value(self) -> Value {
        self.value
    }

    /// The classification.
    pub fn verdict(&self) -> Verdict {
        self.verdict
    }

    /// Message sets; empty unless invalid.
    pub fn message_sets(&self) -> &[MessageSet] {
        &self.message_sets
    }

    /// Split into value, verdict and message sets.
    pub fn into_parts(self) -> (Value, Verdict, Vec<MessageSet>) {
        (self.value, self.verdict, self.message_sets)
    }

    pub fn is_valid(&self) -> bool {
        self.verdict == Verdict::Valid
    }

    pub fn is_invalid(&self) -> bool {
        self.verdict == Verdict::Invalid
    }

    pub fn is_no_opinion(&self) -> bool {
        self.verdict == Verdict::NoOpinion
    }

    /// Fold `next` into `self`, as a chain does after each step.
    ///
    /// The value is taken from `next`; verdicts combine with
    /// [`Verdict::combine`]; message sets concatenate, `self`'s first.
    pub fn merge(self, next: Outcome) -> Outcome {
        let mut message_sets = self.message_sets;
        message_sets.extend(next.message_sets);
        Outcome {
            value: next.value,
            verdict: self.verdict.combine(next.verdict),
            message_sets,
        }
    }

    /// Locate every unlocated message set at `path`.
    pub fn at(mut self, path: &FieldPath) -> Self {
        self.message_sets = self
            .message_sets
            .into_iter()
            .map(|set| set.at(path))
            .collect();
        self
    }

    /// Replace the carried value, keeping verdict and messages.
    pub fn with_value(mut self, value: Value) -> Self {
        self.value = value;
        self
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.verdict)?;
        for set in &self.message_sets {
            write!(f, "\n{set}")?;
        }
        Ok(())
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn json_leaf() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(|n| serde_json::json!(n)),
            "[a-zA-Z0-9_ ]{0,20}".prop_map(Value::String),
        ]
    }

    fn field_path() -> impl Strategy<Value = FieldPath> {
        prop::collection::vec(
            prop_oneof![
                "[a-z]{1,6}".prop_map(crate::path::Segment::Key),
                (0usize..5).prop_map(crate::path::Segment::Index),
            ],
            0..4,
        )
        .prop_map(FieldPath::from_segments)
    }

    proptest! {
        /// Valid and NoOpinion outcomes never carry messages.
        #[test]
        fn valid_and_no_opinion_carry_no_messages(value in json_leaf()) {
            prop_assert!(Outcome::valid(value.clone()).message_sets().is_empty());
            prop_assert!(Outcome::no_opinion(value).message_sets().is_empty());
        }

        /// Invalid outcomes always carry at least one non-empty set.
        #[test]
        fn invalid_carries_non_empty_sets(value in json_leaf(), text in "[a-z ]{1,20}") {
            let outcome = Outcome::invalid(
                value,
                vec![MessageSet::single(Message::new(text, vec![]))],
            ).unwrap();
            prop_assert!(outcome.is_invalid());
            prop_assert!(!outcome.message_sets().is_empty());
            prop_assert!(outcome.message_sets().iter().all(|s| !s.is_empty()));
        }

        /// Merging sets whose paths are not prefix-related always fails.
        #[test]
        fn merge_of_unrelated_paths_fails(a in field_path(), b in field_path()) {
            let left = MessageSet::new(Some(a.clone()), vec![Message::new("l", vec![])]);
            let right = MessageSet::new(Some(b.clone()), vec![Message::new("r", vec![])]);
            let merged = left.merge(&right);
            if a.is_mergeable_with(&b) {
                prop_assert!(merged.is_ok());
            } else {
                let is_conflict = matches!(merged, Err(CoreError::MergeConflict { .. }));
                prop_assert!(is_conflict);
            }
        }
    }
}
