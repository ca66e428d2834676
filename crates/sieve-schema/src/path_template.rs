//! # Path Templates
//!
//! Matches concrete request paths against OpenAPI path templates such as
//! `/pets/{petId}/photos/{photoId}` and extracts the raw parameter text,
//! ready for the `path` object of a request value.

use serde_json::{Map, Value};

use crate::error::CompileError;

#[derive(Debug, Clone)]
pub struct PathTemplate {
    template: String,
    names: Vec<String>,
    matcher: regex::Regex,
}

impl PathTemplate {
    /// Compile `template`. Each `{name}` matches one non-empty segment
    /// fragment without `/`; all other text matches literally.
    ///
    /// # Errors
    ///
    /// [`CompileError::InvalidPattern`] for an unterminated `{`.
    pub fn parse(template: &str) -> Result<Self, CompileError> {
        let invalid = |reason: &str| CompileError::InvalidPattern {
            pointer: template.to_string(),
            pattern: template.to_string(),
            reason: reason.to_string(),
        };

        let mut names = Vec::new();
        let mut pattern = String::from("^");
        let mut rest = template;
        while let Some(open) = rest.find('{') {
            pattern.push_str(&regex::escape(&rest[..open]));
            let close = rest[open..]
                .find('}')
                .map(|offset| open + offset)
                .ok_or_else(|| invalid("unterminated '{'"))?;
            names.push(rest[open + 1..close].to_string());
            pattern.push_str("([^/]+)");
            rest = &rest[close + 1..];
        }
        pattern.push_str(&regex::escape(rest));
        pattern.push('$');

        let matcher = regex::Regex::new(&pattern).map_err(|e| invalid(&e.to_string()))?;
        Ok(Self {
            template: template.to_string(),
            names,
            matcher,
        })
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// Parameter names in template order.
    pub fn parameter_names(&self) -> &[String] {
        &self.names
    }

    pub fn matches(&self, path: &str) -> bool {
        self.matcher.is_match(path)
    }

    /// Raw parameter values of `path`, or `None` if it does not match.
    pub fn extract(&self, path: &str) -> Option<Map<String, Value>> {
        let captures = self.matcher.captures(path)?;
        Some(
            self.names
                .iter()
                .enumerate()
                .filter_map(|(i, name)| {
                    captures
                        .get(i + 1)
                        .map(|m| (name.clone(), Value::String(m.as_str().to_string())))
                })
                .collect(),
        )
    }
}
