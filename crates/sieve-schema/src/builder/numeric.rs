use serde_json::Number;
use sieve_core::step::{
    Contained, IntString, IsFloat, IsInt, IsNumber, Maximum, Minimum, MultipleOf, NumericString, ToInt,
    ToNumber,
};
use sieve_core::{Chain, Processor};

use super::{wrap_nullable, Encoding};
use crate::error::CompileError;
use crate::fact::NumericFact;

/// Builds `integer` and `number` fields.
#[derive(Debug, Clone, Default)]
pub struct NumericBuilder;

impl NumericBuilder {
    pub fn build(&self, fact: &NumericFact<'_>, encoding: Encoding) -> Result<Processor, CompileError> {
        let mut chain = Chain::new();

        if encoding == Encoding::Text {
            if fact.integer {
                chain.push(IntString);
                chain.push(ToInt);
            } else {
                chain.push(NumericString);
                chain.push(ToNumber);
            }
        }

        let floating = matches!(fact.format, Some("float" | "double"));
        match (fact.integer, floating, encoding) {
            (true, _, _) => chain.push(IsInt),
            // Decoded text keeps whole numbers integral, so only JSON input
            // can be held to a fractional representation.
            (false, true, Encoding::Json) => chain.push(IsFloat),
            (false, _, _) => chain.push(IsNumber),
        }

        if let Some(values) = fact.enumeration {
            chain.push(Contained::new(values.to_vec()));
        }

        if fact.integer && fact.format == Some("int32") {
            chain.push(Minimum::inclusive(Number::from(i32::MIN)));
            chain.push(Maximum::inclusive(Number::from(i32::MAX)));
        }

        for bound in &fact.lower {
            chain.push(Minimum::new(bound.limit.clone(), bound.exclusive));
        }
        for bound in &fact.upper {
            chain.push(Maximum::new(bound.limit.clone(), bound.exclusive));
        }

        if let Some(factor) = &fact.multiple_of {
            chain.push(MultipleOf::new(factor.clone()));
        }

        Ok(wrap_nullable(Processor::field(chain), fact.nullable))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Schema;
    use serde_json::json;
    use sieve_core::FieldPath;

    fn build(schema: serde_json::Value, integer: bool, encoding: Encoding) -> Processor {
        let schema: Schema = serde_json::from_value(schema).unwrap();
        let mut fact = NumericFact::from_schema(&schema, "#").unwrap();
        if integer {
            fact = fact.integer();
        }
        NumericBuilder.build(&fact, encoding).unwrap()
    }

    #[test]
    fn test_integer_steps() {
        let processor = build(
            json!({"type": "integer", "minimum": 1, "maximum": 10, "multipleOf": 2, "enum": [2, 4]}),
            true,
            Encoding::Json,
        );
        assert_eq!(
            processor.outline(),
            json!({"kind": "field", "steps": [
                "is an integer",
                "is one of the following values: [2,4]",
                "is greater than or equal to 1",
                "is less than or equal to 10",
                "is a multiple of 2",
            ]})
        );
    }

    #[test]
    fn test_float_format_narrows_type() {
        let processor = build(json!({"type": "number", "format": "double"}), false, Encoding::Json);
        assert_eq!(processor.outline(), json!({"kind": "field", "steps": ["is a float"]}));
        assert!(processor.process(&FieldPath::root(), json!(1)).is_invalid());
    }

    #[test]
    fn test_int32_bounds() {
        let processor = build(json!({"type": "integer", "format": "int32"}), true, Encoding::Json);
        assert!(processor.process(&FieldPath::root(), json!(2_147_483_647)).is_valid());
        assert!(processor.process(&FieldPath::root(), json!(2_147_483_648_i64)).is_invalid());
    }

    #[test]
    fn test_text_encoding_decodes_first() {
        let processor = build(json!({"type": "integer", "maximum": 100}), true, Encoding::Text);
        let outcome = processor.process(&FieldPath::root(), json!("42"));
        assert!(outcome.is_valid());
        assert_eq!(outcome.value(), &json!(42));
        assert!(processor.process(&FieldPath::root(), json!("abc")).is_invalid());
        assert!(processor.process(&FieldPath::root(), json!("101")).is_invalid());

        let processor = build(json!({"type": "number", "format": "float"}), false, Encoding::Text);
        assert_eq!(processor.process(&FieldPath::root(), json!("2")).value(), &json!(2));
    }

    #[test]
    fn test_exclusive_bounds() {
        let processor = build(json!({"type": "number", "exclusiveMinimum": 0}), false, Encoding::Json);
        assert!(processor.process(&FieldPath::root(), json!(0)).is_invalid());
        assert!(processor.process(&FieldPath::root(), json!(0.1)).is_valid());
    }
}
