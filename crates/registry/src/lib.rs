mod builder;
mod catalog;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use corpus_core::{
    IntentCorpus, IntentId, LoadFailurePolicy, ModelDeclaration, SourceLoadError,
};
use corpus_observability::CorpusMetrics;
use corpus_sources::SampleResolver;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, instrument};

pub use builder::{assemble, merge, Assembly, CorpusBuilder, SourceFailure};
pub use catalog::RegistryCatalog;

static EMPTY_CORPUS: IntentCorpus = IntentCorpus::empty();

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("failed loading samples for intent `{intent_id}`: {source}")]
    SourceLoad {
        intent_id: IntentId,
        #[source]
        source: SourceLoadError,
    },
    #[error("intent `{intent_id}` is declared more than once in model `{model_id}`")]
    DuplicateIntent { model_id: String, intent_id: IntentId },
    #[error("model `{0}` declares an intent with an empty id")]
    EmptyIntentId(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct RegistryStats {
    pub model_id: String,
    pub intents: usize,
    pub samples: usize,
    pub failures: usize,
}

#[derive(Debug, Clone)]
pub struct SampleRegistry {
    model_id: String,
    order: Vec<IntentId>,
    corpora: HashMap<IntentId, IntentCorpus>,
    failures: Vec<SourceFailure>,
}

impl SampleRegistry {
    pub fn build(
        model: &ModelDeclaration,
        resolver: &dyn SampleResolver,
        policy: LoadFailurePolicy,
    ) -> Result<Self, RegistryError> {
        RegistryBuilder::new(resolver).policy(policy).build(model)
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub fn get(&self, intent_id: &str) -> &IntentCorpus {
        self.corpora.get(intent_id).unwrap_or(&EMPTY_CORPUS)
    }

    pub fn contains_intent(&self, intent_id: &str) -> bool {
        self.corpora.contains_key(intent_id)
    }

    pub fn intents(&self) -> &[IntentId] {
        &self.order
    }

    pub fn iter(&self) -> impl Iterator<Item = (&IntentId, &IntentCorpus)> {
        self.order
            .iter()
            .map(|intent_id| (intent_id, self.get(intent_id.as_str())))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn total_samples(&self) -> usize {
        self.corpora.values().map(IntentCorpus::len).sum()
    }

    pub fn failures(&self) -> &[SourceFailure] {
        &self.failures
    }

    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            model_id: self.model_id.clone(),
            intents: self.order.len(),
            samples: self.total_samples(),
            failures: self.failures.len(),
        }
    }
}

pub struct RegistryBuilder<'a> {
    resolver: &'a dyn SampleResolver,
    policy: LoadFailurePolicy,
    metrics: Option<Arc<CorpusMetrics>>,
}

impl<'a> RegistryBuilder<'a> {
    pub fn new(resolver: &'a dyn SampleResolver) -> Self {
        Self {
            resolver,
            policy: LoadFailurePolicy::default(),
            metrics: None,
        }
    }

    pub fn policy(mut self, policy: LoadFailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn metrics(mut self, metrics: Arc<CorpusMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    #[instrument(skip(self, model), fields(model_id = %model.model_id, policy = ?self.policy))]
    pub fn build(&self, model: &ModelDeclaration) -> Result<SampleRegistry, RegistryError> {
        validate_declarations(model)?;

        let mut order = Vec::with_capacity(model.intents.len());
        let mut corpora = HashMap::with_capacity(model.intents.len());
        let mut failures = Vec::new();

        for declaration in &model.intents {
            let refs = declaration.source_refs();
            let assembly = assemble(self.resolver, &refs, self.policy).map_err(|source| {
                if let Some(metrics) = &self.metrics {
                    metrics.inc_source_failure();
                }
                RegistryError::SourceLoad {
                    intent_id: declaration.intent_id.clone(),
                    source,
                }
            })?;

            if let Some(metrics) = &self.metrics {
                for _ in 0..assembly.sources_resolved {
                    metrics.inc_source_resolved();
                }
                for _ in &assembly.failures {
                    metrics.inc_source_failure();
                }
                metrics.add_samples_loaded(assembly.corpus.len());
            }

            order.push(declaration.intent_id.clone());
            corpora.insert(declaration.intent_id.clone(), assembly.corpus);
            failures.extend(assembly.failures);
        }

        let registry = SampleRegistry {
            model_id: model.model_id.clone(),
            order,
            corpora,
            failures,
        };

        if let Some(metrics) = &self.metrics {
            metrics.inc_registry_built();
        }
        info!(
            model_id = %registry.model_id,
            intents = registry.len(),
            samples = registry.total_samples(),
            failures = registry.failures.len(),
            "sample registry built"
        );

        Ok(registry)
    }
}

fn validate_declarations(model: &ModelDeclaration) -> Result<(), RegistryError> {
    let mut seen = HashSet::new();
    for declaration in &model.intents {
        if declaration.intent_id.is_blank() {
            return Err(RegistryError::EmptyIntentId(model.model_id.clone()));
        }
        if !seen.insert(&declaration.intent_id) {
            return Err(RegistryError::DuplicateIntent {
                model_id: model.model_id.clone(),
                intent_id: declaration.intent_id.clone(),
            });
        }
    }
    Ok(())
}
