use sieve_core::step::{Contained, DateString, DateTimeString, IsString, Length, Regex, ToUpperCase};
use sieve_core::{Chain, Processor};
use tracing::debug;

use super::{wrap_nullable, Encoding};
use crate::error::CompileError;
use crate::fact::StringFact;

/// Builds string fields: type, enum, format, length, pattern.
#[derive(Debug, Clone, Default)]
pub struct StringBuilder;

impl StringBuilder {
    /// Strings need no decoding, so `encoding` does not change the chain.
    pub fn build(
        &self,
        fact: &StringFact<'_>,
        pointer: &str,
        _encoding: Encoding,
    ) -> Result<Processor, CompileError> {
        let mut chain = Chain::new().then(IsString);

        if let Some(values) = fact.enumeration {
            chain.push(Contained::new(values.to_vec()));
        }

        match fact.format {
            Some("date") => chain.push(DateString::full_date()),
            Some("date-time") => {
                chain.push(ToUpperCase);
                chain.push(DateTimeString);
            }
            Some(other) => debug!(pointer, format = other, "string format is not enforced"),
            None => {}
        }

        if fact.min_length.is_some() || fact.max_length.is_some() {
            chain.push(Length::new(fact.min_length.unwrap_or(0), fact.max_length));
        }

        if let Some(pattern) = fact.pattern {
            let regex = Regex::new(pattern).map_err(|e| CompileError::InvalidPattern {
                pointer: pointer.to_string(),
                pattern: pattern.to_string(),
                reason: e.to_string(),
            })?;
            chain.push(regex);
        }

        Ok(wrap_nullable(Processor::field(chain), fact.nullable))
    }
}
