use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use corpus_core::{CurationPolicy, IntentId, MatchOutcome};
use corpus_observability::CorpusMetrics;
use corpus_registry::SampleRegistry;
use serde::Serialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::IntentMatcher;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Verdict {
    Passed,
    Mismatched { actual: IntentId },
    Rejected { message: String },
    CurationNeeded { message: String },
}

impl Verdict {
    fn from_outcome(expected: &IntentId, outcome: MatchOutcome) -> Self {
        match outcome {
            MatchOutcome::Matched { intent_id, .. } if &intent_id == expected => Self::Passed,
            MatchOutcome::Matched { intent_id, .. } => Self::Mismatched { actual: intent_id },
            MatchOutcome::Rejected(rejection) => Self::Rejected {
                message: rejection.message().to_string(),
            },
            MatchOutcome::CurationNeeded(curation) => Self::CurationNeeded {
                message: curation.message().to_string(),
            },
        }
    }

    pub fn is_failure(&self, policy: CurationPolicy) -> bool {
        match self {
            Self::Passed => false,
            Self::CurationNeeded { .. } => policy == CurationPolicy::Fail,
            Self::Mismatched { .. } | Self::Rejected { .. } => true,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SampleVerdict {
    pub intent_id: IntentId,
    pub sample: String,
    #[serde(flatten)]
    pub verdict: Verdict,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub run_id: Uuid,
    pub model_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub curation_policy: CurationPolicy,
    pub verdicts: Vec<SampleVerdict>,
    pub intents_without_samples: Vec<IntentId>,
}

impl ValidationReport {
    pub fn total(&self) -> usize {
        self.verdicts.len()
    }

    pub fn passed_count(&self) -> usize {
        self.count(|verdict| matches!(verdict, Verdict::Passed))
    }

    pub fn curation_count(&self) -> usize {
        self.count(|verdict| matches!(verdict, Verdict::CurationNeeded { .. }))
    }

    pub fn failed_count(&self) -> usize {
        self.failures().count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &SampleVerdict> {
        self.verdicts
            .iter()
            .filter(|entry| entry.verdict.is_failure(self.curation_policy))
    }

    pub fn passed(&self) -> bool {
        self.failed_count() == 0
    }

    pub fn summary(&self) -> serde_json::Value {
        serde_json::json!({
            "run_id": self.run_id,
            "model_id": self.model_id,
            "total": self.total(),
            "passed": self.passed_count(),
            "curation": self.curation_count(),
            "failed": self.failed_count(),
            "ok": self.passed(),
        })
    }

    fn count(&self, predicate: impl Fn(&Verdict) -> bool) -> usize {
        self.verdicts
            .iter()
            .filter(|entry| predicate(&entry.verdict))
            .count()
    }
}

#[derive(Clone)]
pub struct AutoValidator {
    matcher: Arc<dyn IntentMatcher>,
    curation_policy: CurationPolicy,
    only: Option<HashSet<IntentId>>,
    metrics: Option<Arc<CorpusMetrics>>,
}

impl AutoValidator {
    pub fn new(matcher: Arc<dyn IntentMatcher>) -> Self {
        Self {
            matcher,
            curation_policy: CurationPolicy::default(),
            only: None,
            metrics: None,
        }
    }

    pub fn with_curation_policy(mut self, policy: CurationPolicy) -> Self {
        self.curation_policy = policy;
        self
    }

    pub fn only<I, S>(mut self, intents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<IntentId>,
    {
        self.only = Some(intents.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<CorpusMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    #[instrument(skip(self, registry), fields(model_id = %registry.model_id()))]
    pub fn validate(&self, registry: &SampleRegistry) -> ValidationReport {
        let started = Instant::now();
        let started_at = Utc::now();
        let mut verdicts = Vec::with_capacity(registry.total_samples());
        let mut intents_without_samples = Vec::new();

        for (intent_id, corpus) in registry.iter() {
            if let Some(only) = &self.only {
                if !only.contains(intent_id) {
                    continue;
                }
            }
            if corpus.is_empty() {
                intents_without_samples.push(intent_id.clone());
                continue;
            }

            for sample in corpus.iter() {
                let verdict = Verdict::from_outcome(intent_id, self.matcher.match_input(sample));
                self.record(&verdict);

                if verdict.is_failure(self.curation_policy) {
                    warn!(intent_id = %intent_id, sample, verdict = ?verdict, "sample failed validation");
                }

                verdicts.push(SampleVerdict {
                    intent_id: intent_id.clone(),
                    sample: sample.to_string(),
                    verdict,
                });
            }
        }

        let report = ValidationReport {
            run_id: Uuid::new_v4(),
            model_id: registry.model_id().to_string(),
            started_at,
            finished_at: Utc::now(),
            curation_policy: self.curation_policy,
            verdicts,
            intents_without_samples,
        };

        if let Some(metrics) = &self.metrics {
            metrics.inc_validation_run();
            metrics.observe_validation(started.elapsed());
        }
        info!(
            run_id = %report.run_id,
            total = report.total(),
            passed = report.passed_count(),
            curation = report.curation_count(),
            failed = report.failed_count(),
            "validation finished"
        );

        report
    }

    fn record(&self, verdict: &Verdict) {
        let Some(metrics) = &self.metrics else {
            return;
        };
        match verdict {
            Verdict::Passed => metrics.inc_passed(),
            Verdict::Mismatched { .. } => metrics.inc_mismatched(),
            Verdict::Rejected { .. } => metrics.inc_rejected(),
            Verdict::CurationNeeded { .. } => metrics.inc_curation(),
        }
    }
}
