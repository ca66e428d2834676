//! OpenAPI parameter serialization styles.
//!
//! Each filter strips the style's framing from a raw parameter string and,
//! for array-typed parameters, splits it into a list of item strings. The
//! decoded strings are then typed by the text-decoding steps that follow
//! (`IntString` + `ToInt` and friends).
//!
//! | style    | scalar    | array, explode       | array, no explode |
//! |----------|-----------|----------------------|-------------------|
//! | `matrix` | `;id=5`   | `;id=3;id=4;id=5`    | `;id=3,4,5`       |
//! | `label`  | `.5`      | `.3.4.5`             | `.3,4,5`          |
//! | `form`   | `id=5`    | `id=3&id=4&id=5`     | `id=3,4,5`        |
//! | `simple` | `5`       | `3,4,5`              | `3,4,5`           |
//!
//! The `form` framing (`id=`) is optional since most servers hand over the
//! query value alone; an exploded form array may also arrive already split
//! into a list of strings.

use std::fmt;

use serde_json::{json, Value};

use super::{type_name, Step};
use crate::outcome::{Message, Outcome};

/// Shape of the parameter being decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Serialization {
    name: String,
    explode: bool,
    composite: bool,
}

impl Serialization {
    fn new(name: impl Into<String>, explode: bool, composite: bool) -> Self {
        Self {
            name: name.into(),
            explode,
            composite,
        }
    }

    /// Turn the unframed text into the decoded value.
    fn split(&self, body: &str, exploded_delimiter: &str) -> Value {
        if !self.composite {
            return Value::String(body.to_string());
        }
        if body.is_empty() {
            return Value::Array(Vec::new());
        }
        let delimiter = if self.explode { exploded_delimiter } else { "," };
        Value::Array(
            body.split(delimiter)
                .map(|item| Value::String(item.to_string()))
                .collect(),
        )
    }
}

fn expects_string(filter: &str, value: Value) -> Outcome {
    let given = type_name(&value);
    Outcome::fail(
        value,
        Message::new(format!("{filter} filter expects string, {{}} given"), vec![json!(given)]),
    )
}

fn malformed(filter: &str, expected: String, value: Value) -> Outcome {
    Outcome::fail(
        value,
        Message::new(
            format!("{filter} filter expects a value starting with {{}}"),
            vec![json!(expected)],
        ),
    )
}

macro_rules! style_filter {
    ($(#[$doc:meta])* $name:ident, $style:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $name {
            serialization: Serialization,
        }

        impl $name {
            /// Decoder for parameter `name`; `composite` marks array-typed
            /// parameters.
            pub fn new(name: impl Into<String>, explode: bool, composite: bool) -> Self {
                Self {
                    serialization: Serialization::new(name, explode, composite),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(concat!("format ", $style, " style value"))?;
                if self.serialization.explode {
                    f.write_str(" (exploded)")?;
                }
                Ok(())
            }
        }
    };
}

style_filter!(
    /// `matrix` style, used for path parameters (`;id=5`).
    Matrix, "matrix"
);
style_filter!(
    /// `label` style, used for path parameters (`.5`).
    Label, "label"
);
style_filter!(
    /// `form` style, the default for query and cookie parameters.
    Form, "form"
);
style_filter!(
    /// `simple` style, the default for path and header parameters.
    Simple, "simple"
);

impl Step for Matrix {
    fn apply(&self, value: Value) -> Outcome {
        let Value::String(text) = &value else {
            return expects_string("Matrix", value);
        };
        let s = &self.serialization;
        let bare = format!(";{}", s.name);
        let prefix = format!("{bare}=");
        let body = match text.strip_prefix(&prefix) {
            Some(body) => body,
            None if *text == bare => "",
            None => return malformed("Matrix", prefix, value),
        };
        Outcome::no_opinion(s.split(body, &prefix))
    }
}

impl Step for Label {
    fn apply(&self, value: Value) -> Outcome {
        let Value::String(text) = &value else {
            return expects_string("Label", value);
        };
        let Some(body) = text.strip_prefix('.') else {
            return malformed("Label", ".".to_string(), value);
        };
        Outcome::no_opinion(self.serialization.split(body, "."))
    }
}

impl Step for Form {
    fn apply(&self, value: Value) -> Outcome {
        let s = &self.serialization;
        let text = match &value {
            Value::String(text) => text,
            Value::Array(items) if s.composite && items.iter().all(Value::is_string) => {
                return Outcome::no_opinion(value);
            }
            _ => return expects_string("Form", value),
        };
        let prefix = format!("{}=", s.name);
        let body = text.strip_prefix(&prefix).unwrap_or(text);
        Outcome::no_opinion(s.split(body, &format!("&{prefix}")))
    }
}

impl Step for Simple {
    fn apply(&self, value: Value) -> Outcome {
        let Value::String(text) = &value else {
            return expects_string("Simple", value);
        };
        Outcome::no_opinion(self.serialization.split(text, ","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matrix_scalar_and_arrays() {
        assert_eq!(Matrix::new("id", false, false).apply(json!(";id=5")).value(), &json!("5"));
        assert_eq!(
            Matrix::new("id", true, true).apply(json!(";id=3;id=4;id=5")).value(),
            &json!(["3", "4", "5"])
        );
        assert_eq!(
            Matrix::new("id", false, true).apply(json!(";id=3,4,5")).value(),
            &json!(["3", "4", "5"])
        );
        assert_eq!(Matrix::new("id", false, false).apply(json!(";id")).value(), &json!(""));
    }

    #[test]
    fn test_matrix_rejects_unframed_value() {
        let outcome = Matrix::new("id", false, false).apply(json!("5"));
        assert!(outcome.is_invalid());
        assert_eq!(
            outcome.message_sets()[0].messages()[0].render(),
            "Matrix filter expects a value starting with ;id="
        );
    }

    #[test]
    fn test_label() {
        assert_eq!(Label::new("id", false, false).apply(json!(".5")).value(), &json!("5"));
        assert_eq!(
            Label::new("id", true, true).apply(json!(".3.4.5")).value(),
            &json!(["3", "4", "5"])
        );
        assert_eq!(
            Label::new("id", false, true).apply(json!(".3,4,5")).value(),
            &json!(["3", "4", "5"])
        );
        assert!(Label::new("id", false, false).apply(json!("5")).is_invalid());
    }

    #[test]
    fn test_form() {
        assert_eq!(Form::new("limit", true, false).apply(json!("10")).value(), &json!("10"));
        assert_eq!(Form::new("limit", true, false).apply(json!("limit=10")).value(), &json!("10"));
        assert_eq!(
            Form::new("tags", true, true).apply(json!("tags=a&tags=b")).value(),
            &json!(["a", "b"])
        );
        assert_eq!(
            Form::new("tags", false, true).apply(json!("a,b")).value(),
            &json!(["a", "b"])
        );
        assert_eq!(
            Form::new("tags", true, true).apply(json!(["a", "b"])).value(),
            &json!(["a", "b"])
        );
    }

    #[test]
    fn test_simple() {
        assert_eq!(Simple::new("id", false, false).apply(json!("5")).value(), &json!("5"));
        assert_eq!(
            Simple::new("id", false, true).apply(json!("3,4,5")).value(),
            &json!(["3", "4", "5"])
        );
        assert!(Simple::new("id", false, false).apply(json!(5)).is_invalid());
    }

    #[test]
    fn test_decoding_expresses_no_opinion() {
        assert!(Simple::new("id", false, false).apply(json!("5")).is_no_opinion());
        assert_eq!(Matrix::new("id", true, true).to_string(), "format matrix style value (exploded)");
    }
}
