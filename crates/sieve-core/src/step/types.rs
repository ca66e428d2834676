//! JSON type validators.

use std::fmt;

use serde_json::{json, Value};

use super::{type_name, Step};
use crate::outcome::{Message, Outcome};

macro_rules! type_check {
    ($(#[$doc:meta])* $name:ident, $describe:literal, $expects:literal, $accepts:expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
        pub struct $name;

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str($describe)
            }
        }

        impl Step for $name {
            fn apply(&self, value: Value) -> Outcome {
                let accepts: fn(&Value) -> bool = $accepts;
                if accepts(&value) {
                    return Outcome::valid(value);
                }
                let given = type_name(&value);
                Outcome::fail(
                    value,
                    Message::new(
                        concat!(stringify!($name), " validator expects ", $expects, " value, {} passed instead"),
                        vec![json!(given)],
                    ),
                )
            }
        }
    };
}

type_check!(
    /// Accepts JSON strings.
    IsString, "is a string", "string", Value::is_string
);
type_check!(
    /// Accepts integral JSON numbers.
    IsInt, "is an integer", "integer", |v| v.is_i64() || v.is_u64()
);
type_check!(
    /// Accepts any JSON number.
    IsNumber, "is a number", "number", Value::is_number
);
type_check!(
    /// Accepts JSON numbers carrying a fractional representation.
    IsFloat, "is a float", "float", Value::is_f64
);
type_check!(
    /// Accepts `true` and `false`.
    IsBool, "is a boolean", "boolean", Value::is_boolean
);
type_check!(
    /// Accepts only `null`.
    IsNull, "is null", "null", Value::is_null
);
type_check!(
    /// Accepts JSON arrays.
    IsList, "is a list", "list", Value::is_array
);
type_check!(
    /// Accepts JSON objects.
    IsObject, "is an object", "object", Value::is_object
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_string() {
        assert!(IsString.apply(json!("a")).is_valid());
        let outcome = IsString.apply(json!(1));
        assert!(outcome.is_invalid());
        assert_eq!(
            outcome.message_sets()[0].messages()[0].render(),
            "IsString validator expects string value, integer passed instead"
        );
    }

    #[test]
    fn test_is_int_rejects_floats() {
        assert!(IsInt.apply(json!(5)).is_valid());
        assert!(IsInt.apply(json!(u64::MAX)).is_valid());
        assert!(IsInt.apply(json!(5.5)).is_invalid());
        assert!(IsInt.apply(json!("5")).is_invalid());
    }

    #[test]
    fn test_is_number_and_float() {
        assert!(IsNumber.apply(json!(5)).is_valid());
        assert!(IsNumber.apply(json!(5.5)).is_valid());
        assert!(IsFloat.apply(json!(5.5)).is_valid());
        assert!(IsFloat.apply(json!(5)).is_invalid());
    }

    #[test]
    fn test_container_checks() {
        assert!(IsList.apply(json!([1, 2])).is_valid());
        assert!(IsList.apply(json!({"a": 1})).is_invalid());
        assert!(IsObject.apply(json!({"a": 1})).is_valid());
        assert!(IsObject.apply(json!([1])).is_invalid());
    }

    #[test]
    fn test_is_null_and_bool() {
        assert!(IsNull.apply(json!(null)).is_valid());
        assert!(IsNull.apply(json!(false)).is_invalid());
        assert!(IsBool.apply(json!(false)).is_valid());
        assert!(IsBool.apply(json!("false")).is_invalid());
    }

    #[test]
    fn test_value_passes_through_unchanged() {
        let outcome = IsList.apply(json!("Blink"));
        assert_eq!(outcome.value(), &json!("Blink"));
    }

    #[test]
    fn test_descriptions() {
        assert_eq!(IsString.to_string(), "is a string");
        assert_eq!(IsObject.to_string(), "is an object");
    }
}
