use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::OnceCell;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

static TRACING_INIT: OnceCell<()> = OnceCell::new();

#[derive(Debug, Default)]
pub struct CorpusMetrics {
    registries_built_total: AtomicU64,
    sources_resolved_total: AtomicU64,
    source_failures_total: AtomicU64,
    samples_loaded_total: AtomicU64,
    validation_runs_total: AtomicU64,
    samples_validated_total: AtomicU64,
    validation_passed_total: AtomicU64,
    validation_mismatched_total: AtomicU64,
    validation_rejected_total: AtomicU64,
    validation_curation_total: AtomicU64,
    total_validation_millis: AtomicU64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub registries_built_total: u64,
    pub sources_resolved_total: u64,
    pub source_failures_total: u64,
    pub samples_loaded_total: u64,
    pub validation_runs_total: u64,
    pub samples_validated_total: u64,
    pub validation_passed_total: u64,
    pub validation_mismatched_total: u64,
    pub validation_rejected_total: u64,
    pub validation_curation_total: u64,
    pub avg_validation_millis: f64,
}

impl CorpusMetrics {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn inc_registry_built(&self) {
        self.registries_built_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_source_resolved(&self) {
        self.sources_resolved_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_source_failure(&self) {
        self.source_failures_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_samples_loaded(&self, samples: usize) {
        self.samples_loaded_total
            .fetch_add(samples as u64, Ordering::Relaxed);
    }

    pub fn inc_validation_run(&self) {
        self.validation_runs_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_passed(&self) {
        self.samples_validated_total.fetch_add(1, Ordering::Relaxed);
        self.validation_passed_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_mismatched(&self) {
        self.samples_validated_total.fetch_add(1, Ordering::Relaxed);
        self.validation_mismatched_total
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_rejected(&self) {
        self.samples_validated_total.fetch_add(1, Ordering::Relaxed);
        self.validation_rejected_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_curation(&self) {
        self.samples_validated_total.fetch_add(1, Ordering::Relaxed);
        self.validation_curation_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn observe_validation(&self, duration: Duration) {
        self.total_validation_millis
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let runs = self.validation_runs_total.load(Ordering::Relaxed);
        let millis = self.total_validation_millis.load(Ordering::Relaxed);

        MetricsSnapshot {
            registries_built_total: self.registries_built_total.load(Ordering::Relaxed),
            sources_resolved_total: self.sources_resolved_total.load(Ordering::Relaxed),
            source_failures_total: self.source_failures_total.load(Ordering::Relaxed),
            samples_loaded_total: self.samples_loaded_total.load(Ordering::Relaxed),
            validation_runs_total: runs,
            samples_validated_total: self.samples_validated_total.load(Ordering::Relaxed),
            validation_passed_total: self.validation_passed_total.load(Ordering::Relaxed),
            validation_mismatched_total: self.validation_mismatched_total.load(Ordering::Relaxed),
            validation_rejected_total: self.validation_rejected_total.load(Ordering::Relaxed),
            validation_curation_total: self.validation_curation_total.load(Ordering::Relaxed),
            avg_validation_millis: if runs == 0 {
                0.0
            } else {
                millis as f64 / runs as f64
            },
        }
    }
}

pub fn init_tracing(service_name: &str) {
    TRACING_INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}=info,corpus_registry=info,corpus_validation=info",
                service_name
            ))
        });

        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(true)
            .with_span_list(true)
            .with_writer(std::io::stderr)
            .init();
    });
}
