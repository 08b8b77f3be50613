use std::collections::HashSet;

use corpus_core::{
    IntentCorpus, LoadFailurePolicy, SampleLine, SampleSourceRef, SourceKind, SourceLoadError,
    SourceLoadErrorKind,
};
use corpus_sources::SampleResolver;
use serde::Serialize;
use tracing::{debug, warn};

#[derive(Debug, Default)]
pub struct CorpusBuilder {
    seen: HashSet<SampleLine>,
    samples: Vec<SampleLine>,
}

impl CorpusBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, raw: &str) -> bool {
        let Some(line) = SampleLine::parse(raw) else {
            return false;
        };
        if self.seen.contains(&line) {
            return false;
        }
        self.seen.insert(line.clone());
        self.samples.push(line);
        true
    }

    pub fn extend<I, S>(&mut self, lines: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        lines
            .into_iter()
            .filter(|line| self.push(line.as_ref()))
            .count()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn finish(self) -> IntentCorpus {
        IntentCorpus::from_samples(self.samples)
    }
}

pub fn merge<I, L, S>(sources: I) -> IntentCorpus
where
    I: IntoIterator<Item = L>,
    L: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut builder = CorpusBuilder::new();
    for lines in sources {
        builder.extend(lines);
    }
    builder.finish()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceFailure {
    pub intent_id: String,
    pub locator: String,
    pub declared_kind: Option<SourceKind>,
    pub error_kind: SourceLoadErrorKind,
    pub message: String,
}

impl SourceFailure {
    fn new(source_ref: &SampleSourceRef, err: &SourceLoadError) -> Self {
        Self {
            intent_id: source_ref.owner_intent_id.to_string(),
            locator: err.locator().to_string(),
            declared_kind: source_ref.kind(),
            error_kind: err.kind(),
            message: err.to_string(),
        }
    }
}

#[derive(Debug)]
pub struct Assembly {
    pub corpus: IntentCorpus,
    pub sources_resolved: usize,
    pub failures: Vec<SourceFailure>,
    pub dropped: bool,
}

// Only `FailFast` turns a source failure into an error.
pub fn assemble(
    resolver: &dyn SampleResolver,
    refs: &[SampleSourceRef],
    policy: LoadFailurePolicy,
) -> Result<Assembly, SourceLoadError> {
    let mut builder = CorpusBuilder::new();
    let mut sources_resolved = 0;
    let mut failures = Vec::new();

    for source_ref in refs {
        match resolver.resolve(&source_ref.source) {
            Ok(lines) => {
                sources_resolved += 1;
                let accepted = builder.extend(&lines);
                debug!(
                    intent_id = %source_ref.owner_intent_id,
                    locator = source_ref.locator(),
                    raw_lines = lines.len(),
                    accepted,
                    "sample source merged"
                );
            }
            Err(err) => {
                if policy == LoadFailurePolicy::FailFast {
                    return Err(err);
                }

                warn!(
                    intent_id = %source_ref.owner_intent_id,
                    locator = err.locator(),
                    error_kind = %err.kind(),
                    error = %err,
                    "sample source failed to load"
                );
                failures.push(SourceFailure::new(source_ref, &err));

                if policy == LoadFailurePolicy::DropIntent {
                    return Ok(Assembly {
                        corpus: IntentCorpus::empty(),
                        sources_resolved,
                        failures,
                        dropped: true,
                    });
                }
            }
        }
    }

    Ok(Assembly {
        corpus: builder.finish(),
        sources_resolved,
        failures,
        dropped: false,
    })
}
