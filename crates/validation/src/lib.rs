mod lookup;
mod validator;

use corpus_core::MatchOutcome;

pub use lookup::SampleLookupMatcher;
pub use validator::{AutoValidator, SampleVerdict, ValidationReport, Verdict};

pub trait IntentMatcher: Send + Sync {
    fn match_input(&self, input: &str) -> MatchOutcome;
}

impl<F> IntentMatcher for F
where
    F: Fn(&str) -> MatchOutcome + Send + Sync,
{
    fn match_input(&self, input: &str) -> MatchOutcome {
        self(input)
    }
}
