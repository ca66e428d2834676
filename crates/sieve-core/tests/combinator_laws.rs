//! Property tests: combinator verdicts over arbitrary branch mixes.
//!
//! Branches are single-step fields with a fixed verdict, so the expected
//! classification of every combinator can be computed from the mix alone.

use proptest::prelude::*;
use serde_json::{json, Value};
use sieve_core::step::{Fails, Indifferent, Passes};
use sieve_core::{Chain, FieldPath, Processor, Verdict};

fn branch(verdict: Verdict) -> Processor {
    let chain = match verdict {
        Verdict::Valid => Chain::new().then(Passes),
        Verdict::Invalid => Chain::new().then(Fails),
        Verdict::NoOpinion => Chain::new().then(Indifferent),
    };
    Processor::field(chain)
}

fn verdicts() -> impl Strategy<Value = Vec<Verdict>> {
    prop::collection::vec(
        prop_oneof![Just(Verdict::Valid), Just(Verdict::Invalid), Just(Verdict::NoOpinion)],
        2..6,
    )
}

fn count(mix: &[Verdict], verdict: Verdict) -> usize {
    mix.iter().filter(|v| **v == verdict).count()
}

fn run(processor: &Processor, value: Value) -> sieve_core::Outcome {
    processor.process(&FieldPath::root().key("field"), value)
}

proptest! {
    #[test]
    fn test_any_of_classification(mix in verdicts(), n in any::<i64>()) {
        let processor = Processor::any_of(mix.iter().copied().map(branch).collect()).unwrap();
        let outcome = run(&processor, json!(n));
        let expected = if count(&mix, Verdict::Valid) > 0 {
            Verdict::Valid
        } else if count(&mix, Verdict::Invalid) > 0 {
            Verdict::Invalid
        } else {
            Verdict::NoOpinion
        };
        prop_assert_eq!(outcome.verdict(), expected);
        if expected == Verdict::Invalid {
            prop_assert_eq!(outcome.message_sets().len(), count(&mix, Verdict::Invalid));
        }
        prop_assert_eq!(outcome.value(), &json!(n));
    }

    #[test]
    fn test_all_of_classification(mix in verdicts()) {
        let processor = Processor::all_of(mix.iter().copied().map(branch).collect()).unwrap();
        let outcome = run(&processor, json!("x"));
        let expected = mix.iter().copied().fold(Verdict::NoOpinion, Verdict::combine);
        prop_assert_eq!(outcome.verdict(), expected);
    }

    #[test]
    fn test_one_of_classification(mix in verdicts()) {
        let processor = Processor::one_of(mix.iter().copied().map(branch).collect()).unwrap();
        let outcome = run(&processor, json!(true));
        let valid = count(&mix, Verdict::Valid);
        let expected = match valid {
            1 => Verdict::Valid,
            0 if count(&mix, Verdict::Invalid) == 0 => Verdict::NoOpinion,
            _ => Verdict::Invalid,
        };
        prop_assert_eq!(outcome.verdict(), expected);
        if valid > 1 {
            prop_assert_eq!(outcome.message_sets().len(), 1);
            prop_assert_eq!(outcome.message_sets()[0].path(), Some(&FieldPath::root().key("field")));
        }
    }

    #[test]
    fn test_invalid_messages_are_located(mix in verdicts()) {
        let processor = Processor::all_of(mix.iter().copied().map(branch).collect()).unwrap();
        let outcome = run(&processor, Value::Null);
        for set in outcome.message_sets() {
            prop_assert_eq!(set.path(), Some(&FieldPath::root().key("field")));
        }
    }
}
