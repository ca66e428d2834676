//! # Schema Facts
//!
//! A fact is a validated, narrowed view of one schema node for one
//! primitive type. Narrowing checks that the node declares that type and
//! fails with [`CompileError::SchemaMismatch`] otherwise, so builders never
//! see a string fact built from an object schema.
//!
//! Facts borrow from the document and only live for one compilation pass.

use serde_json::{Number, Value};

use crate::document::{AdditionalProperties, Exclusive, OrderedMap, Schema, Type};
use crate::error::CompileError;

fn narrow(schema: &Schema, pointer: &str, accepted: &[Type], expected: &'static str) -> Result<(), CompileError> {
    if accepted.iter().any(|ty| schema.declares(*ty)) {
        Ok(())
    } else {
        Err(CompileError::SchemaMismatch {
            pointer: pointer.to_string(),
            expected,
            declared: schema.describe_types(),
        })
    }
}

/// Narrowed view of a schema node.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaFact<'a> {
    Strings(StringFact<'a>),
    Numeric(NumericFact<'a>),
    Booleans(BooleanFact<'a>),
    Arrays(ArrayFact<'a>),
    Objects(ObjectFact<'a>),
}

impl<'a> SchemaFact<'a> {
    /// Narrow `schema` to the fact for `ty`.
    ///
    /// # Errors
    ///
    /// [`CompileError::SchemaMismatch`] if the schema does not declare `ty`;
    /// [`CompileError::UnsupportedKeyword`] for `null`, which has no fact of
    /// its own (nullability is a flag on the other facts).
    pub fn narrow(schema: &'a Schema, ty: Type, pointer: &str) -> Result<Self, CompileError> {
        Ok(match ty {
            Type::String => Self::Strings(StringFact::from_schema(schema, pointer)?),
            Type::Number => Self::Numeric(NumericFact::from_schema(schema, pointer)?),
            Type::Integer => Self::Numeric(NumericFact::from_schema(schema, pointer)?.integer()),
            Type::Boolean => Self::Booleans(BooleanFact::from_schema(schema, pointer)?),
            Type::Array => Self::Arrays(ArrayFact::from_schema(schema, pointer)?),
            Type::Object => Self::Objects(ObjectFact::from_schema(schema, pointer)?),
            Type::Null => {
                return Err(CompileError::UnsupportedKeyword {
                    pointer: pointer.to_string(),
                    keyword: "type: null".to_string(),
                })
            }
        })
    }

    pub fn nullable(&self) -> bool {
        match self {
            Self::Strings(f) => f.nullable,
            Self::Numeric(f) => f.nullable,
            Self::Booleans(f) => f.nullable,
            Self::Arrays(f) => f.nullable,
            Self::Objects(f) => f.nullable,
        }
    }

    /// The same fact with nullability cleared, for callers that wrap
    /// several facts in one null check.
    pub fn without_null(mut self) -> Self {
        match &mut self {
            Self::Strings(f) => f.nullable = false,
            Self::Numeric(f) => f.nullable = false,
            Self::Booleans(f) => f.nullable = false,
            Self::Arrays(f) => f.nullable = false,
            Self::Objects(f) => f.nullable = false,
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StringFact<'a> {
    pub nullable: bool,
    pub format: Option<&'a str>,
    pub enumeration: Option<&'a [Value]>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<&'a str>,
}

impl<'a> StringFact<'a> {
    pub fn from_schema(schema: &'a Schema, pointer: &str) -> Result<Self, CompileError> {
        narrow(schema, pointer, &[Type::String], "string")?;
        Ok(Self {
            nullable: schema.is_nullable(),
            format: schema.format.as_deref(),
            enumeration: schema.enumeration.as_deref(),
            min_length: schema.min_length,
            max_length: schema.max_length,
            pattern: schema.pattern.as_deref(),
        })
    }
}

/// A numeric bound.
#[derive(Debug, Clone, PartialEq)]
pub struct Bound {
    pub limit: Number,
    pub exclusive: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NumericFact<'a> {
    pub nullable: bool,
    /// `integer` rather than `number`.
    pub integer: bool,
    pub format: Option<&'a str>,
    pub enumeration: Option<&'a [Value]>,
    /// Lower bounds, inclusive ones first.
    pub lower: Vec<Bound>,
    /// Upper bounds, inclusive ones first.
    pub upper: Vec<Bound>,
    pub multiple_of: Option<Number>,
}

impl<'a> NumericFact<'a> {
    /// Accepts schemas typed `number` or `integer`; which one the builder
    /// should enforce is chosen with [`NumericFact::integer`].
    pub fn from_schema(schema: &'a Schema, pointer: &str) -> Result<Self, CompileError> {
        narrow(schema, pointer, &[Type::Number, Type::Integer], "number")?;
        Ok(Self {
            nullable: schema.is_nullable(),
            integer: false,
            format: schema.format.as_deref(),
            enumeration: schema.enumeration.as_deref(),
            lower: bounds(schema.minimum.as_ref(), schema.exclusive_minimum.as_ref()),
            upper: bounds(schema.maximum.as_ref(), schema.exclusive_maximum.as_ref()),
            multiple_of: schema.multiple_of.clone(),
        })
    }

    pub fn integer(mut self) -> Self {
        self.integer = true;
        self
    }
}

/// Resolve `minimum` + `exclusiveMinimum` in either the 3.0 form (a flag on
/// `minimum`) or the 3.1 form (an independent numeric bound).
fn bounds(limit: Option<&Number>, exclusive: Option<&Exclusive>) -> Vec<Bound> {
    let mut bounds = Vec::new();
    let flagged = matches!(exclusive, Some(Exclusive::Flag(true)));
    if let Some(limit) = limit {
        bounds.push(Bound {
            limit: limit.clone(),
            exclusive: flagged,
        });
    }
    if let Some(Exclusive::Limit(limit)) = exclusive {
        bounds.push(Bound {
            limit: limit.clone(),
            exclusive: true,
        });
    }
    bounds
}

#[derive(Debug, Clone, PartialEq)]
pub struct BooleanFact<'a> {
    pub nullable: bool,
    pub enumeration: Option<&'a [Value]>,
}

impl<'a> BooleanFact<'a> {
    pub fn from_schema(schema: &'a Schema, pointer: &str) -> Result<Self, CompileError> {
        narrow(schema, pointer, &[Type::Boolean], "boolean")?;
        Ok(Self {
            nullable: schema.is_nullable(),
            enumeration: schema.enumeration.as_deref(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayFact<'a> {
    pub nullable: bool,
    pub enumeration: Option<&'a [Value]>,
    pub items: Option<&'a Schema>,
    pub min_items: Option<usize>,
    pub max_items: Option<usize>,
    pub unique_items: bool,
}

impl<'a> ArrayFact<'a> {
    pub fn from_schema(schema: &'a Schema, pointer: &str) -> Result<Self, CompileError> {
        narrow(schema, pointer, &[Type::Array], "array")?;
        Ok(Self {
            nullable: schema.is_nullable(),
            enumeration: schema.enumeration.as_deref(),
            items: schema.items.as_deref(),
            min_items: schema.min_items,
            max_items: schema.max_items,
            unique_items: schema.unique_items,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectFact<'a> {
    pub nullable: bool,
    pub enumeration: Option<&'a [Value]>,
    pub properties: &'a OrderedMap<Schema>,
    pub required: &'a [String],
    pub additional: Option<&'a AdditionalProperties>,
    pub min_properties: Option<usize>,
    pub max_properties: Option<usize>,
}

impl<'a> ObjectFact<'a> {
    pub fn from_schema(schema: &'a Schema, pointer: &str) -> Result<Self, CompileError> {
        narrow(schema, pointer, &[Type::Object], "object")?;
        Ok(Self {
            nullable: schema.is_nullable(),
            enumeration: schema.enumeration.as_deref(),
            properties: &schema.properties,
            required: &schema.required,
            additional: schema.additional_properties.as_ref(),
            min_properties: schema.min_properties,
            max_properties: schema.max_properties,
        })
    }
}
