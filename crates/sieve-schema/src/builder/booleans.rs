use sieve_core::step::{BoolString, Contained, IsBool, ToBool};
use sieve_core::{Chain, Processor};

use super::{wrap_nullable, Encoding};
use crate::error::CompileError;
use crate::fact::BooleanFact;

#[derive(Debug, Clone, Default)]
pub struct BooleanBuilder;

impl BooleanBuilder {
    pub fn build(&self, fact: &BooleanFact<'_>, encoding: Encoding) -> Result<Processor, CompileError> {
        let mut chain = Chain::new();
        if encoding == Encoding::Text {
            chain.push(BoolString);
            chain.push(ToBool);
        }
        chain.push(IsBool);
        if let Some(values) = fact.enumeration {
            chain.push(Contained::new(values.to_vec()));
        }
        Ok(wrap_nullable(Processor::field(chain), fact.nullable))
    }
}
