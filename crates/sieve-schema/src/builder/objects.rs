use sieve_core::step::{Contained, Count, IsObject, NoAdditionalFields, RequiredFields};
use sieve_core::{Chain, ObjectSet, Processor};

use super::{child_pointer, wrap_nullable, Encoding, SchemaCompiler};
use crate::document::AdditionalProperties;
use crate::error::CompileError;
use crate::fact::ObjectFact;

/// Builds `ObjectSet { before: [IsObject, Contained?, Count?, RequiredFields?,
/// NoAdditionalFields?], properties, additional }`.
#[derive(Debug, Clone, Default)]
pub struct ObjectBuilder;

impl ObjectBuilder {
    /// # Errors
    ///
    /// Objects cannot be decoded from a single text value, so
    /// [`Encoding::Text`] fails with [`CompileError::UnsupportedKeyword`].
    pub fn build(
        &self,
        fact: &ObjectFact<'_>,
        compiler: &SchemaCompiler,
        pointer: &str,
        encoding: Encoding,
    ) -> Result<Processor, CompileError> {
        if encoding == Encoding::Text {
            return Err(CompileError::UnsupportedKeyword {
                pointer: pointer.to_string(),
                keyword: "object-typed parameter".to_string(),
            });
        }

        let mut before = Chain::new().then(IsObject);
        if let Some(values) = fact.enumeration {
            before.push(Contained::new(values.to_vec()));
        }
        if fact.min_properties.is_some() || fact.max_properties.is_some() {
            before.push(Count::new(fact.min_properties.unwrap_or(0), fact.max_properties));
        }
        if !fact.required.is_empty() {
            before.push(RequiredFields::new(fact.required.to_vec()));
        }
        if let Some(AdditionalProperties::Allowed(false)) = fact.additional {
            before.push(NoAdditionalFields::new(
                fact.properties.keys().map(str::to_string).collect(),
            ));
        }

        let mut set = ObjectSet::new(before);
        for (name, schema) in fact.properties.iter() {
            let processor = compiler.compile_encoded(schema, &child_pointer(pointer, "properties", name), encoding)?;
            set = set.with_property(name, processor);
        }
        if let Some(AdditionalProperties::Schema(schema)) = fact.additional {
            let processor = compiler.compile_encoded(schema, &format!("{pointer}/additionalProperties"), encoding)?;
            set = set.with_additional(processor);
        }

        Ok(wrap_nullable(Processor::ObjectSet(set), fact.nullable))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Schema;
    use serde_json::json;
    use sieve_core::FieldPath;

    fn build(schema: serde_json::Value) -> Result<Processor, CompileError> {
        let schema: Schema = serde_json::from_value(schema).unwrap();
        let fact = ObjectFact::from_schema(&schema, "#").unwrap();
        ObjectBuilder.build(&fact, &SchemaCompiler::new(), "#", Encoding::Json)
    }

    #[test]
    fn test_object_outline_keeps_declaration_order() {
        let processor = build(json!({
            "type": "object",
            "required": ["name"],
            "properties": {
                "name": {"type": "string"},
                "age": {"type": "integer"}
            }
        }))
        .unwrap();
        assert_eq!(
            processor.outline(),
            json!({
                "kind": "object",
                "before": ["is an object", "contains the following fields: name"],
                "properties": [
                    {"name": "name", "processor": {"kind": "field", "steps": ["is a string"]}},
                    {"name": "age", "processor": {"kind": "field", "steps": ["is an integer"]}},
                ],
            })
        );
    }

    #[test]
    fn test_closed_object() {
        let processor = build(json!({
            "type": "object",
            "properties": {"id": {"type": "integer"}},
            "additionalProperties": false
        }))
        .unwrap();
        assert!(processor.process(&FieldPath::root(), json!({"id": 1})).is_valid());
        assert!(processor.process(&FieldPath::root(), json!({"id": 1, "x": 2})).is_invalid());
    }

    #[test]
    fn test_additional_properties_schema() {
        let processor = build(json!({
            "type": "object",
            "additionalProperties": {"type": "integer"}
        }))
        .unwrap();
        assert!(processor.process(&FieldPath::root(), json!({"a": 1, "b": 2})).is_valid());
        let outcome = processor.process(&FieldPath::root(), json!({"a": "x"}));
        assert_eq!(outcome.message_sets()[0].path(), Some(&FieldPath::root().key("a")));
    }

    #[test]
    fn test_property_count() {
        let processor = build(json!({"type": "object", "maxProperties": 1})).unwrap();
        assert!(processor.process(&FieldPath::root(), json!({"a": 1, "b": 2})).is_invalid());
    }

    #[test]
    fn test_property_errors_carry_escaped_pointer() {
        let err = build(json!({
            "type": "object",
            "properties": {"a/b": {"not": {}}}
        }))
        .unwrap_err();
        assert_eq!(
            err,
            CompileError::UnsupportedKeyword { pointer: "#/properties/a~1b".into(), keyword: "not".into() }
        );
    }

    #[test]
    fn test_text_encoding_is_rejected() {
        let schema = Schema::typed(crate::document::Type::Object);
        let fact = ObjectFact::from_schema(&schema, "#/p").unwrap();
        let err = ObjectBuilder
            .build(&fact, &SchemaCompiler::new(), "#/p", Encoding::Text)
            .unwrap_err();
        assert!(matches!(err, CompileError::UnsupportedKeyword { .. }));
    }
}
