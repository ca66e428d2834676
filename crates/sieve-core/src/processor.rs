//! # Processor Tree
//!
//! A [`Processor`] is the compiled, immutable form of a schema. It is built
//! once and then invoked any number of times, possibly concurrently, via
//! [`Processor::process`].
//!
//! ## Node kinds
//!
//! - [`Processor::Field`]: an ordered [`Chain`] of leaf steps applied to
//!   one value, stopping at the first invalid outcome.
//! - [`Processor::ObjectSet`] / [`Processor::ArraySet`]: a `before` chain of
//!   whole-container checks, then one child processor per property or item,
//!   then an `after` chain over the rebuilt container.
//! - [`Processor::AnyOf`], [`Processor::AllOf`], [`Processor::OneOf`]: the
//!   OR, AND and XOR combinators over two or more branches.
//!
//! Processors carry no names. A container extends the incoming
//! [`FieldPath`] with the child's key or index before delegating, and
//! every unlocated message set is placed at the path of the node that
//! produced it.

use std::fmt;
use std::sync::Arc;

use serde_json::{json, Map, Value};

use crate::error::CoreError;
use crate::outcome::{Message, MessageSet, Outcome, Verdict};
use crate::path::FieldPath;
use crate::step::{Passes, Step};

/// Ordered sequence of leaf steps.
///
/// Steps are shared through `Arc`, so cloning a chain (or a whole tree) is
/// cheap and never duplicates step state.
#[derive(Debug, Clone, Default)]
pub struct Chain {
    steps: Vec<Arc<dyn Step>>,
}

impl Chain {
    /// The empty chain. Running it yields `NoOpinion`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step.
    pub fn then(mut self, step: impl Step + 'static) -> Self {
        self.steps.push(Arc::new(step));
        self
    }

    /// Append an already shared step.
    pub fn then_shared(mut self, step: Arc<dyn Step>) -> Self {
        self.steps.push(step);
        self
    }

    /// Append a step in place.
    pub fn push(&mut self, step: impl Step + 'static) {
        self.steps.push(Arc::new(step));
    }

    /// Append every step of `other`.
    pub fn extend(&mut self, other: Chain) {
        self.steps.extend(other.steps);
    }

    pub fn steps(&self) -> &[Arc<dyn Step>] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Fold the steps over `value`.
    ///
    /// Each step sees the value produced by the previous one. Once the
    /// running outcome is invalid no further step runs. Unlocated message
    /// sets are placed at `path`.
    pub fn run(&self, path: &FieldPath, value: Value) -> Outcome {
        let mut outcome = Outcome::no_opinion(value);
        for step in &self.steps {
            if outcome.is_invalid() {
                break;
            }
            let (value, verdict, message_sets) = outcome.into_parts();
            let next = step.apply(value);
            outcome = Outcome::from_parts(Value::Null, verdict, message_sets).merge(next);
        }
        outcome.at(path)
    }

    fn descriptions(&self) -> Vec<Value> {
        self.steps
            .iter()
            .map(|step| Value::String(step.to_string()))
            .collect()
    }
}

/// Object container: `before` checks, declared properties, an optional
/// processor for undeclared keys, then `after` checks.
#[derive(Debug, Clone, Default)]
pub struct ObjectSet {
    before: Chain,
    properties: Vec<(String, Processor)>,
    additional: Option<Box<Processor>>,
    after: Chain,
}

impl ObjectSet {
    pub fn new(before: Chain) -> Self {
        Self {
            before,
            ..Self::default()
        }
    }

    /// Declare a property. Properties are processed in declaration order.
    pub fn with_property(mut self, name: impl Into<String>, processor: Processor) -> Self {
        self.properties.push((name.into(), processor));
        self
    }

    /// Processor applied to every key without a declared property.
    /// Without one, such keys pass through untouched.
    pub fn with_additional(mut self, processor: Processor) -> Self {
        self.additional = Some(Box::new(processor));
        self
    }

    /// Checks run on the rebuilt object when every property was accepted.
    pub fn with_after(mut self, after: Chain) -> Self {
        self.after = after;
        self
    }

    pub fn before(&self) -> &Chain {
        &self.before
    }

    pub fn properties(&self) -> &[(String, Processor)] {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&Processor> {
        self.properties
            .iter()
            .find(|(declared, _)| declared == name)
            .map(|(_, processor)| processor)
    }

    pub fn additional(&self) -> Option<&Processor> {
        self.additional.as_deref()
    }

    pub fn after(&self) -> &Chain {
        &self.after
    }

    fn process(&self, path: &FieldPath, value: Value) -> Outcome {
        let before = self.before.run(path, value);
        if before.is_invalid() {
            return before;
        }
        let (value, mut verdict, mut message_sets) = before.into_parts();
        let Value::Object(mut object) = value else {
            return Outcome::from_parts(value, verdict, message_sets);
        };

        for (name, processor) in &self.properties {
            if let Some(slot) = object.get_mut(name) {
                let (child, child_verdict, child_sets) =
                    processor.process(&path.key(name), std::mem::take(slot)).into_parts();
                *slot = child;
                verdict = verdict.combine(child_verdict);
                message_sets.extend(child_sets);
            }
        }

        if let Some(additional) = &self.additional {
            for (key, slot) in object.iter_mut() {
                if self.properties.iter().any(|(name, _)| name == key) {
                    continue;
                }
                let (child, child_verdict, child_sets) =
                    additional.process(&path.key(key), std::mem::take(slot)).into_parts();
                *slot = child;
                verdict = verdict.combine(child_verdict);
                message_sets.extend(child_sets);
            }
        }

        finish(path, &self.after, Value::Object(object), verdict, message_sets)
    }
}

/// Array container: `before` checks, one processor for every item, then
/// `after` checks.
#[derive(Debug, Clone, Default)]
pub struct ArraySet {
    before: Chain,
    items: Option<Box<Processor>>,
    after: Chain,
}

impl ArraySet {
    pub fn new(before: Chain) -> Self {
        Self {
            before,
            ..Self::default()
        }
    }

    pub fn with_items(mut self, processor: Processor) -> Self {
        self.items = Some(Box::new(processor));
        self
    }

    pub fn with_after(mut self, after: Chain) -> Self {
        self.after = after;
        self
    }

    pub fn before(&self) -> &Chain {
        &self.before
    }

    pub fn items(&self) -> Option<&Processor> {
        self.items.as_deref()
    }

    pub fn after(&self) -> &Chain {
        &self.after
    }

    fn process(&self, path: &FieldPath, value: Value) -> Outcome {
        let before = self.before.run(path, value);
        if before.is_invalid() {
            return before;
        }
        let (value, mut verdict, mut message_sets) = before.into_parts();
        let Value::Array(items) = value else {
            return Outcome::from_parts(value, verdict, message_sets);
        };

        let items = match &self.items {
            Some(processor) => items
                .into_iter()
                .enumerate()
                .map(|(i, item)| {
                    let (child, child_verdict, child_sets) =
                        processor.process(&path.index(i), item).into_parts();
                    verdict = verdict.combine(child_verdict);
                    message_sets.extend(child_sets);
                    child
                })
                .collect::<Vec<_>>(),
            None => items,
        };

        finish(path, &self.after, Value::Array(items), verdict, message_sets)
    }
}

/// Close a container: run `after` unless a child was invalid.
fn finish(
    path: &FieldPath,
    after: &Chain,
    value: Value,
    verdict: Verdict,
    message_sets: Vec<MessageSet>,
) -> Outcome {
    if verdict == Verdict::Invalid {
        return Outcome::from_parts(value, verdict, message_sets);
    }
    Outcome::from_parts(Value::Null, verdict, message_sets).merge(after.run(path, value))
}

/// Compiled validation and transformation tree.
#[derive(Debug, Clone)]
pub enum Processor {
    /// Chain of leaf steps over a single value.
    Field(Chain),
    /// Object container.
    ObjectSet(ObjectSet),
    /// Array container.
    ArraySet(ArraySet),
    /// First valid branch wins.
    AnyOf(Vec<Processor>),
    /// Every branch must hold; all branches always run.
    AllOf(Vec<Processor>),
    /// Exactly one branch must hold.
    OneOf(Vec<Processor>),
}

impl Processor {
    pub fn field(chain: Chain) -> Self {
        Self::Field(chain)
    }

    /// A field that accepts anything.
    pub fn passes() -> Self {
        Self::Field(Chain::new().then(Passes))
    }

    /// # Errors
    ///
    /// Returns [`CoreError::RedundantCombinator`] for fewer than 2 branches.
    pub fn any_of(branches: Vec<Processor>) -> Result<Self, CoreError> {
        check_arity("AnyOf", &branches)?;
        Ok(Self::AnyOf(branches))
    }

    /// # Errors
    ///
    /// Returns [`CoreError::RedundantCombinator`] for fewer than 2 branches.
    pub fn all_of(branches: Vec<Processor>) -> Result<Self, CoreError> {
        check_arity("AllOf", &branches)?;
        Ok(Self::AllOf(branches))
    }

    /// # Errors
    ///
    /// Returns [`CoreError::RedundantCombinator`] for fewer than 2 branches.
    pub fn one_of(branches: Vec<Processor>) -> Result<Self, CoreError> {
        check_arity("OneOf", &branches)?;
        Ok(Self::OneOf(branches))
    }

    /// Short name of the node kind, as used in outlines.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Field(_) => "field",
            Self::ObjectSet(_) => "object",
            Self::ArraySet(_) => "array",
            Self::AnyOf(_) => "any_of",
            Self::AllOf(_) => "all_of",
            Self::OneOf(_) => "one_of",
        }
    }

    /// Put `step` first on every route into the tree: at the head of a
    /// field's chain, of a container's `before` chain, and of every branch
    /// of a combinator. Used to decode raw text before any type check.
    pub fn preceded_by(self, step: Arc<dyn Step>) -> Self {
        match self {
            Self::Field(mut chain) => {
                chain.steps.insert(0, step);
                Self::Field(chain)
            }
            Self::ObjectSet(mut set) => {
                set.before.steps.insert(0, step);
                Self::ObjectSet(set)
            }
            Self::ArraySet(mut set) => {
                set.before.steps.insert(0, step);
                Self::ArraySet(set)
            }
            Self::AnyOf(branches) => Self::AnyOf(precede_all(branches, &step)),
            Self::AllOf(branches) => Self::AllOf(precede_all(branches, &step)),
            Self::OneOf(branches) => Self::OneOf(precede_all(branches, &step)),
        }
    }

    /// Validate and transform `value`, which lives at `path`.
    pub fn process(&self, path: &FieldPath, value: Value) -> Outcome {
        match self {
            Self::Field(chain) => chain.run(path, value),
            Self::ObjectSet(set) => set.process(path, value),
            Self::ArraySet(set) => set.process(path, value),
            Self::AnyOf(branches) => any_of(branches, path, value),
            Self::AllOf(branches) => all_of(branches, path, value),
            Self::OneOf(branches) => one_of(branches, path, value),
        }
    }

    /// Structural JSON rendering of the tree: node kinds, step
    /// descriptions and children in declaration order.
    pub fn outline(&self) -> Value {
        match self {
            Self::Field(chain) => json!({ "kind": "field", "steps": chain.descriptions() }),
            Self::ObjectSet(set) => {
                let mut outline = Map::new();
                outline.insert("kind".into(), json!("object"));
                outline.insert("before".into(), Value::Array(set.before.descriptions()));
                let properties = set
                    .properties
                    .iter()
                    .map(|(name, processor)| json!({ "name": name, "processor": processor.outline() }))
                    .collect();
                outline.insert("properties".into(), Value::Array(properties));
                if let Some(additional) = &set.additional {
                    outline.insert("additional".into(), additional.outline());
                }
                if !set.after.is_empty() {
                    outline.insert("after".into(), Value::Array(set.after.descriptions()));
                }
                Value::Object(outline)
            }
            Self::ArraySet(set) => {
                let mut outline = Map::new();
                outline.insert("kind".into(), json!("array"));
                outline.insert("before".into(), Value::Array(set.before.descriptions()));
                if let Some(items) = &set.items {
                    outline.insert("items".into(), items.outline());
                }
                if !set.after.is_empty() {
                    outline.insert("after".into(), Value::Array(set.after.descriptions()));
                }
                Value::Object(outline)
            }
            Self::AnyOf(branches) | Self::AllOf(branches) | Self::OneOf(branches) => json!({
                "kind": self.kind(),
                "branches": branches.iter().map(Processor::outline).collect::<Vec<_>>(),
            }),
        }
    }

    fn describe(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let indent = "\t".repeat(depth);
        let steps = |f: &mut fmt::Formatter<'_>, chain: &Chain| -> fmt::Result {
            for step in chain.steps() {
                write!(f, "\n{indent}\t- {step}.")?;
            }
            Ok(())
        };

        match self {
            Self::Field(chain) if chain.is_empty() => f.write_str("will return no opinion"),
            Self::Field(chain) => {
                f.write_str("value")?;
                steps(f, chain)
            }
            Self::ObjectSet(set) => {
                f.write_str("object")?;
                steps(f, &set.before)?;
                for (name, processor) in &set.properties {
                    write!(f, "\n{indent}\t\"{name}\": ")?;
                    processor.describe(f, depth + 1)?;
                }
                if let Some(additional) = &set.additional {
                    write!(f, "\n{indent}\tany other field: ")?;
                    additional.describe(f, depth + 1)?;
                }
                steps(f, &set.after)
            }
            Self::ArraySet(set) => {
                f.write_str("list")?;
                steps(f, &set.before)?;
                if let Some(items) = &set.items {
                    write!(f, "\n{indent}\teach item: ")?;
                    items.describe(f, depth + 1)?;
                }
                steps(f, &set.after)
            }
            Self::AnyOf(branches) | Self::AllOf(branches) | Self::OneOf(branches) => {
                let heading = match self {
                    Self::AnyOf(_) => "any of the following:",
                    Self::AllOf(_) => "all of the following:",
                    _ => "exactly one of the following:",
                };
                f.write_str(heading)?;
                for branch in branches {
                    write!(f, "\n{indent}\t- ")?;
                    branch.describe(f, depth + 1)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for Processor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.describe(f, 0)
    }
}

fn precede_all(branches: Vec<Processor>, step: &Arc<dyn Step>) -> Vec<Processor> {
    branches
        .into_iter()
        .map(|branch| branch.preceded_by(Arc::clone(step)))
        .collect()
}

fn check_arity(kind: &'static str, branches: &[Processor]) -> Result<(), CoreError> {
    if branches.len() < 2 {
        return Err(CoreError::RedundantCombinator {
            kind,
            given: branches.len(),
        });
    }
    Ok(())
}

fn any_of(branches: &[Processor], path: &FieldPath, value: Value) -> Outcome {
    let mut message_sets = Vec::new();
    for branch in branches {
        let outcome = branch.process(path, value.clone());
        match outcome.verdict() {
            Verdict::Valid => return outcome,
            Verdict::Invalid => message_sets.extend(outcome.message_sets().first().cloned()),
            Verdict::NoOpinion => {}
        }
    }

    if message_sets.is_empty() {
        Outcome::no_opinion(value)
    } else {
        Outcome::from_parts(value, Verdict::Invalid, message_sets)
    }
}

fn all_of(branches: &[Processor], path: &FieldPath, value: Value) -> Outcome {
    branches
        .iter()
        .map(|branch| branch.process(path, value.clone()))
        .reduce(Outcome::merge)
        .unwrap_or_else(|| Outcome::no_opinion(value))
}

fn one_of(branches: &[Processor], path: &FieldPath, value: Value) -> Outcome {
    let outcomes: Vec<Outcome> = branches
        .iter()
        .map(|branch| branch.process(path, value.clone()))
        .collect();

    let matched = outcomes.iter().filter(|outcome| outcome.is_valid()).count();
    match matched {
        1 => outcomes
            .into_iter()
            .find(Outcome::is_valid)
            .unwrap_or_else(|| Outcome::no_opinion(value)),
        0 => {
            let message_sets: Vec<MessageSet> = outcomes
                .into_iter()
                .filter(Outcome::is_invalid)
                .flat_map(|outcome| outcome.into_parts().2)
                .collect();
            if message_sets.is_empty() {
                Outcome::no_opinion(value)
            } else {
                Outcome::from_parts(value, Verdict::Invalid, message_sets)
            }
        }
        _ => {
            let message = Message::new(
                "Value matched {} of the oneOf branches, exactly one is required",
                vec![json!(matched)],
            );
            Outcome::fail(value, message).at(path)
        }
    }
}
