//! # Field Paths
//!
//! A [`FieldPath`] locates a value inside the input being processed: a chain
//! of object keys, array indices and (for request processors) an
//! operation-scoped root. Containers extend the path with the child's
//! segment before delegating, so every message set carries the exact
//! location of the violation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One step in a [`FieldPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Segment {
    /// Root scope of one API operation, named by its operation id.
    Operation(String),
    /// Object key.
    Key(String),
    /// Array position.
    Index(usize),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Operation(id) => f.write_str(id),
            Self::Key(key) => f.write_str(key),
            Self::Index(i) => write!(f, "[{i}]"),
        }
    }
}

/// Ordered chain of segments. The empty path is the root of the value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldPath {
    segments: Vec<Segment>,
}

impl FieldPath {
    /// The root path (no segments).
    pub fn root() -> Self {
        Self::default()
    }

    /// A path scoped to a single API operation.
    pub fn operation(operation_id: impl Into<String>) -> Self {
        Self {
            segments: vec![Segment::Operation(operation_id.into())],
        }
    }

    /// Build a path from explicit segments.
    pub fn from_segments(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    /// Returns a new path extended with an object key.
    pub fn key(&self, key: impl Into<String>) -> Self {
        self.push(Segment::Key(key.into()))
    }

    /// Returns a new path extended with an array index.
    pub fn index(&self, index: usize) -> Self {
        self.push(Segment::Index(index))
    }

    fn push(&self, segment: Segment) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment);
        Self { segments }
    }

    /// The segments of this path, outermost first.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// True for the empty path.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// True if `self` is a (non-strict) prefix of `other`.
    pub fn is_prefix_of(&self, other: &FieldPath) -> bool {
        other.segments.starts_with(&self.segments)
    }

    /// Two paths are mergeable when one is a prefix of the other.
    pub fn is_mergeable_with(&self, other: &FieldPath) -> bool {
        self.is_prefix_of(other) || other.is_prefix_of(self)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 && !matches!(segment, Segment::Index(_)) {
                f.write_str(".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}
