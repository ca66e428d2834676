use sieve_core::step::{Contained, Count, IsList, Unique};
use sieve_core::{ArraySet, Chain, Processor};

use super::{wrap_nullable, Encoding, SchemaCompiler};
use crate::error::CompileError;
use crate::fact::ArrayFact;

/// Builds `ArraySet { before: [IsList, Contained?, Count?, Unique?], items }`.
#[derive(Debug, Clone, Default)]
pub struct ArrayBuilder;

impl ArrayBuilder {
    pub fn build(
        &self,
        fact: &ArrayFact<'_>,
        compiler: &SchemaCompiler,
        pointer: &str,
        encoding: Encoding,
    ) -> Result<Processor, CompileError> {
        let mut before = Chain::new().then(IsList);
        if let Some(values) = fact.enumeration {
            before.push(Contained::new(values.to_vec()));
        }
        if fact.min_items.is_some() || fact.max_items.is_some() {
            before.push(Count::new(fact.min_items.unwrap_or(0), fact.max_items));
        }
        if fact.unique_items {
            before.push(Unique);
        }

        let mut set = ArraySet::new(before);
        if let Some(items) = fact.items {
            set = set.with_items(compiler.compile_encoded(items, &format!("{pointer}/items"), encoding)?);
        }

        Ok(wrap_nullable(Processor::ArraySet(set), fact.nullable))
    }
}
