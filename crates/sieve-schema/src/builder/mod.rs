//! # Schema Compiler
//!
//! Translates [`Schema`] nodes into [`Processor`] trees.
//!
//! ## Translation rules
//!
//! 1. A `$ref` or a `not` keyword fails compilation.
//! 2. Each declared non-null type is narrowed to a [`SchemaFact`] and
//!    handed to the builder for that primitive. Several types compile to an
//!    `AnyOf` with one branch per type.
//! 3. `allOf` / `anyOf` / `oneOf` compile every sub-schema and wrap them in
//!    the matching combinator. A single sub-schema stands for itself.
//! 4. When a node declares several of `type`, `allOf`, `anyOf` and
//!    `oneOf`, the parts are joined by `AllOf`.
//! 5. A nullable node becomes `AnyOf(is null, <node>)`.
//! 6. A node with none of the above accepts anything (or only its `enum`
//!    values, when it declares some).
//!
//! Request parameters arrive as text and compile with [`Encoding::Text`],
//! which puts a decoding pair (`IntString` + `ToInt` and friends) in front
//! of every scalar type check.

use sieve_core::step::{Contained, IsNull, Passes};
use sieve_core::{Chain, Processor};
use tracing::debug;

use crate::document::{pointer_token, Schema, Type};
use crate::error::CompileError;
use crate::fact::SchemaFact;

mod arrays;
mod booleans;
mod numeric;
mod objects;
mod strings;

pub use arrays::ArrayBuilder;
pub use booleans::BooleanBuilder;
pub use numeric::NumericBuilder;
pub use objects::ObjectBuilder;
pub use strings::StringBuilder;

/// How values reach the processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    /// Parsed JSON: types are checked as they are.
    #[default]
    Json,
    /// Raw text, as request parameters arrive: scalars are decoded first.
    Text,
}

/// Compiles schemas. Holds one builder per primitive, created up front.
#[derive(Debug, Clone, Default)]
pub struct SchemaCompiler {
    strings: StringBuilder,
    numbers: NumericBuilder,
    booleans: BooleanBuilder,
    arrays: ArrayBuilder,
    objects: ObjectBuilder,
}

impl SchemaCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile a JSON-encoded schema located at `pointer`.
    pub fn compile(&self, schema: &Schema, pointer: &str) -> Result<Processor, CompileError> {
        self.compile_encoded(schema, pointer, Encoding::Json)
    }

    /// Compile a schema whose values arrive in `encoding`.
    pub fn compile_encoded(
        &self,
        schema: &Schema,
        pointer: &str,
        encoding: Encoding,
    ) -> Result<Processor, CompileError> {
        if let Some(reference) = &schema.reference {
            return Err(CompileError::UnresolvedReference {
                pointer: pointer.to_string(),
                reference: reference.clone(),
            });
        }
        if schema.not.is_some() {
            return Err(CompileError::UnsupportedKeyword {
                pointer: pointer.to_string(),
                keyword: "not".to_string(),
            });
        }

        let types = schema.value_types();
        let composed = [
            ("allOf", &schema.all_of),
            ("anyOf", &schema.any_of),
            ("oneOf", &schema.one_of),
        ];
        let composed_count = composed.iter().filter(|(_, s)| !s.is_empty()).count();

        // A lone type keeps nullability inside its builder.
        if types.len() == 1 && composed_count == 0 {
            let fact = SchemaFact::narrow(schema, types[0], pointer)?;
            return self.build_fact(&fact, pointer, encoding);
        }

        let mut parts = Vec::new();
        if !types.is_empty() {
            let branches = types
                .iter()
                .map(|ty| {
                    let fact = SchemaFact::narrow(schema, *ty, pointer)?.without_null();
                    self.build_fact(&fact, pointer, encoding)
                })
                .collect::<Result<Vec<_>, _>>()?;
            parts.push(join(branches, Processor::AnyOf));
        }
        for (keyword, schemas) in composed {
            if schemas.is_empty() {
                continue;
            }
            let branches = schemas
                .iter()
                .enumerate()
                .map(|(i, sub)| self.compile_encoded(sub, &format!("{pointer}/{keyword}/{i}"), encoding))
                .collect::<Result<Vec<_>, _>>()?;
            let wrap: fn(Vec<Processor>) -> Processor = match keyword {
                "allOf" => Processor::AllOf,
                "anyOf" => Processor::AnyOf,
                _ => Processor::OneOf,
            };
            parts.push(join(branches, wrap));
        }

        let processor = match parts.len() {
            0 if schema.declares(Type::Null) => {
                return Ok(Processor::field(Chain::new().then(IsNull)));
            }
            0 => untyped(schema),
            _ => join(parts, Processor::AllOf),
        };

        Ok(if schema.is_nullable() {
            nullable(processor)
        } else {
            processor
        })
    }

    fn build_fact(
        &self,
        fact: &SchemaFact<'_>,
        pointer: &str,
        encoding: Encoding,
    ) -> Result<Processor, CompileError> {
        match fact {
            SchemaFact::Strings(f) => self.strings.build(f, pointer, encoding),
            SchemaFact::Numeric(f) => self.numbers.build(f, encoding),
            SchemaFact::Booleans(f) => self.booleans.build(f, encoding),
            SchemaFact::Arrays(f) => self.arrays.build(f, self, pointer, encoding),
            SchemaFact::Objects(f) => self.objects.build(f, self, pointer, encoding),
        }
    }
}

/// A single processor stands for itself; several are wrapped.
fn join(mut processors: Vec<Processor>, wrap: fn(Vec<Processor>) -> Processor) -> Processor {
    if processors.len() == 1 {
        if let Some(only) = processors.pop() {
            return only;
        }
    }
    wrap(processors)
}

/// `AnyOf(is null, processor)`.
pub(crate) fn nullable(processor: Processor) -> Processor {
    Processor::AnyOf(vec![Processor::field(Chain::new().then(IsNull)), processor])
}

/// Wrap in the null check when the fact asks for it.
pub(crate) fn wrap_nullable(processor: Processor, nullable_fact: bool) -> Processor {
    if nullable_fact {
        nullable(processor)
    } else {
        processor
    }
}

fn untyped(schema: &Schema) -> Processor {
    debug!(enumerated = schema.enumeration.is_some(), "untyped schema compiled to a pass-through");
    match &schema.enumeration {
        Some(values) => Processor::field(Chain::new().then(Contained::new(values.clone()))),
        None => Processor::field(Chain::new().then(Passes)),
    }
}

/// Pointer of a child node.
pub(crate) fn child_pointer(pointer: &str, keyword: &str, token: &str) -> String {
    format!("{pointer}/{keyword}/{}", pointer_token(token))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sieve_core::FieldPath;

    fn compile(schema: serde_json::Value) -> Result<Processor, CompileError> {
        let schema: Schema = serde_json::from_value(schema).unwrap();
        SchemaCompiler::new().compile(&schema, "#")
    }

    #[test]
    fn test_untyped_schema_passes_everything() {
        let processor = compile(json!({})).unwrap();
        assert_eq!(processor.outline(), json!({"kind": "field", "steps": ["will return valid"]}));
        assert!(processor.process(&FieldPath::root(), json!({"any": [1]})).is_valid());
    }

    #[test]
    fn test_untyped_enum() {
        let processor = compile(json!({"enum": ["a", 1]})).unwrap();
        assert!(processor.process(&FieldPath::root(), json!(1)).is_valid());
        assert!(processor.process(&FieldPath::root(), json!("b")).is_invalid());
    }

    #[test]
    fn test_not_is_unsupported() {
        assert_eq!(
            compile(json!({"type": "string", "not": {"enum": ["x"]}})).unwrap_err(),
            CompileError::UnsupportedKeyword { pointer: "#".into(), keyword: "not".into() }
        );
    }

    #[test]
    fn test_reference_is_unresolved() {
        assert!(matches!(
            compile(json!({"$ref": "#/components/schemas/Pet"})).unwrap_err(),
            CompileError::UnresolvedReference { .. }
        ));
    }

    #[test]
    fn test_single_branch_composition_degenerates() {
        let composed = compile(json!({"allOf": [{"type": "string"}]})).unwrap();
        let plain = compile(json!({"type": "string"})).unwrap();
        assert_eq!(composed.outline(), plain.outline());
    }

    #[test]
    fn test_composition_kinds() {
        let any = compile(json!({"anyOf": [{"type": "string"}, {"type": "integer"}]})).unwrap();
        assert_eq!(any.kind(), "any_of");
        let one = compile(json!({"oneOf": [{"type": "string"}, {"type": "integer"}]})).unwrap();
        assert_eq!(one.kind(), "one_of");
        let all = compile(json!({"allOf": [{"type": "integer"}, {"minimum": 0}]})).unwrap();
        assert_eq!(all.kind(), "all_of");
    }

    #[test]
    fn test_type_and_composition_join_with_all_of() {
        let processor = compile(json!({
            "type": "integer",
            "oneOf": [
                {"type": "integer", "multipleOf": 3},
                {"type": "integer", "multipleOf": 5}
            ]
        }))
        .unwrap();
        assert_eq!(processor.kind(), "all_of");
        assert!(processor.process(&FieldPath::root(), json!(9)).is_valid());
        assert!(processor.process(&FieldPath::root(), json!(10)).is_valid());
        assert!(processor.process(&FieldPath::root(), json!(15)).is_invalid());
        assert!(processor.process(&FieldPath::root(), json!("9")).is_invalid());
    }

    #[test]
    fn test_several_types_compile_to_any_of() {
        let processor = compile(json!({"type": ["string", "integer"]})).unwrap();
        assert_eq!(processor.kind(), "any_of");
        assert!(processor.process(&FieldPath::root(), json!("a")).is_valid());
        assert!(processor.process(&FieldPath::root(), json!(1)).is_valid());
        assert!(processor.process(&FieldPath::root(), json!(true)).is_invalid());
    }

    #[test]
    fn test_nullable_type_list_wraps_once() {
        let processor = compile(json!({"type": ["string", "integer", "null"]})).unwrap();
        let outline = processor.outline();
        assert_eq!(outline["kind"], "any_of");
        assert_eq!(outline["branches"][0], json!({"kind": "field", "steps": ["is null"]}));
        assert_eq!(outline["branches"][1]["kind"], "any_of");
        assert!(processor.process(&FieldPath::root(), json!(null)).is_valid());
    }

    #[test]
    fn test_null_only_type() {
        let processor = compile(json!({"type": "null"})).unwrap();
        assert!(processor.process(&FieldPath::root(), json!(null)).is_valid());
        assert!(processor.process(&FieldPath::root(), json!(0)).is_invalid());
    }

    #[test]
    fn test_errors_in_branches_carry_branch_pointer() {
        let err = compile(json!({"anyOf": [{"type": "string"}, {"type": "string", "pattern": "("}]}))
            .unwrap_err();
        assert!(matches!(err, CompileError::InvalidPattern { ref pointer, .. } if pointer == "#/anyOf/1"));
    }
}
