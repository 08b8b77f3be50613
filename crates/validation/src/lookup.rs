use std::collections::HashMap;

use corpus_core::{normalize_text, Curation, IntentId, MatchOutcome, Rejection};
use corpus_registry::SampleRegistry;
use serde_json::json;

use crate::IntentMatcher;

// Binds an input to the intents that declared it verbatim, ignoring case and
// spacing. A sample declared by more than one intent needs curation.
#[derive(Debug, Clone, Default)]
pub struct SampleLookupMatcher {
    owners: HashMap<String, Vec<IntentId>>,
}

impl SampleLookupMatcher {
    pub fn from_registry(registry: &SampleRegistry) -> Self {
        let mut owners: HashMap<String, Vec<IntentId>> = HashMap::new();
        for (intent_id, corpus) in registry.iter() {
            for sample in corpus.iter() {
                let entry = owners.entry(lookup_key(sample)).or_default();
                if !entry.contains(intent_id) {
                    entry.push(intent_id.clone());
                }
            }
        }
        Self { owners }
    }

    pub fn shared_samples(&self) -> Vec<(&str, &[IntentId])> {
        let mut shared = self
            .owners
            .iter()
            .filter(|(_, intents)| intents.len() > 1)
            .map(|(key, intents)| (key.as_str(), intents.as_slice()))
            .collect::<Vec<_>>();
        shared.sort_by_key(|(key, _)| *key);
        shared
    }
}

impl IntentMatcher for SampleLookupMatcher {
    fn match_input(&self, input: &str) -> MatchOutcome {
        match self.owners.get(&lookup_key(input)).map(Vec::as_slice) {
            None | Some([]) => Rejection::new("no declared sample matches the input").into(),
            Some([intent_id]) => {
                MatchOutcome::matched_with(intent_id.clone(), json!({ "matched_by": "sample" }))
            }
            Some(intents) => {
                let names = intents
                    .iter()
                    .map(IntentId::as_str)
                    .collect::<Vec<_>>()
                    .join(", ");
                Curation::new(format!("sample is declared by intents {names}")).into()
            }
        }
    }
}

fn lookup_key(text: &str) -> String {
    normalize_text(text).to_lowercase()
}
