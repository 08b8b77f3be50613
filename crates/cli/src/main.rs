use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use corpus_core::{CorpusConfig, CurationPolicy, LoadFailurePolicy, ModelDeclaration, SourceKind};
use corpus_observability::{init_tracing, CorpusMetrics};
use corpus_registry::{merge, RegistryBuilder, RegistryCatalog, SampleRegistry};
use corpus_sources::{load_manifest, load_manifests, SourceResolver};
use corpus_validation::{AutoValidator, IntentMatcher, SampleLookupMatcher};
use serde_json::json;

#[derive(Debug, Parser)]
#[command(name = "corpus")]
#[command(about = "Intent sample corpus tooling")]
struct Cli {
    #[arg(long = "resource-root", global = true, help = "Resource root for classpath locators")]
    resource_roots: Vec<PathBuf>,

    #[arg(long, global = true, help = "Abort on the first source that fails to load")]
    fail_fast: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    Resolve {
        locator: String,
        #[arg(long, value_parser = parse_kind)]
        kind: Option<SourceKind>,
    },
    Show {
        #[arg(long)]
        manifest: PathBuf,
        #[arg(long)]
        intent: Option<String>,
    },
    Validate {
        #[arg(long)]
        manifest: PathBuf,
        #[arg(long = "intent")]
        intents: Vec<String>,
        #[arg(long)]
        fail_on_curation: bool,
    },
    Match {
        #[arg(long)]
        manifest: PathBuf,
        text: String,
    },
}

fn main() -> Result<()> {
    init_tracing("corpus_cli");
    let cli = Cli::parse();

    let mut config = CorpusConfig::from_env();
    if !cli.resource_roots.is_empty() {
        config.resource_roots = cli.resource_roots.clone();
    }
    if cli.fail_fast {
        config.load_failure_policy = LoadFailurePolicy::FailFast;
    }
    let metrics = CorpusMetrics::shared();

    match cli.command {
        Command::Resolve { locator, kind } => {
            let resolver = SourceResolver::from_config(&config)?;
            let lines = resolver.resolve_locator(&locator, kind)?;
            let samples = merge([lines.iter()]);

            print_json(&json!({
                "locator": locator,
                "kind": kind,
                "raw_lines": lines.len(),
                "samples": samples,
            }))?;
        }
        Command::Show { manifest, intent } => {
            let mut models = Vec::new();
            for (path, model) in load_models(&manifest)? {
                let registry = build_registry(&config, &path, &model, metrics.clone())?;
                models.push(match &intent {
                    Some(intent_id) => json!({
                        "model_id": registry.model_id(),
                        "intent_id": intent_id,
                        "samples": registry.get(intent_id),
                    }),
                    None => registry_json(&registry),
                });
            }

            print_json(&json!({
                "models": models,
                "metrics": metrics.snapshot(),
            }))?;
        }
        Command::Validate {
            manifest,
            intents,
            fail_on_curation,
        } => {
            if fail_on_curation {
                config.curation_policy = CurationPolicy::Fail;
            }

            let mut reports = Vec::new();
            let mut failed = 0usize;
            for (path, model) in load_models(&manifest)? {
                let registry = build_registry(&config, &path, &model, metrics.clone())?;
                let matcher = SampleLookupMatcher::from_registry(&registry);

                let mut validator = AutoValidator::new(Arc::new(matcher.clone()))
                    .with_curation_policy(config.curation_policy)
                    .with_metrics(metrics.clone());
                if !intents.is_empty() {
                    validator = validator.only(intents.iter().map(String::as_str));
                }

                let report = validator.validate(&registry);
                failed += report.failed_count();
                let shared = matcher
                    .shared_samples()
                    .into_iter()
                    .map(|(sample, owners)| json!({ "sample": sample, "intents": owners }))
                    .collect::<Vec<_>>();
                reports.push(json!({
                    "report": report,
                    "shared_samples": shared,
                }));
            }

            print_json(&json!({
                "reports": reports,
                "metrics": metrics.snapshot(),
            }))?;

            if failed > 0 {
                anyhow::bail!("auto-validation failed for {failed} sample(s)");
            }
        }
        Command::Match {
            manifest,
            text,
        } => {
            let model = load_manifest(&manifest)?;
            let registry = build_registry(&config, &manifest, &model, metrics.clone())?;
            let matcher = SampleLookupMatcher::from_registry(&registry);

            print_json(&matcher.match_input(&text).to_json())?;
        }
    }

    Ok(())
}

fn load_models(path: &Path) -> Result<Vec<(PathBuf, ModelDeclaration)>> {
    if path.is_dir() {
        load_manifests(path)
    } else {
        Ok(vec![(path.to_path_buf(), load_manifest(path)?)])
    }
}

fn build_registry(
    config: &CorpusConfig,
    manifest_path: &Path,
    model: &ModelDeclaration,
    metrics: Arc<CorpusMetrics>,
) -> Result<Arc<SampleRegistry>> {
    let mut resolver = SourceResolver::from_config(config)?;
    if config.base_dir.is_none() {
        if let Some(parent) = manifest_path.parent() {
            resolver = resolver.with_base_dir(parent);
        }
    }

    let builder = RegistryBuilder::new(&resolver)
        .policy(config.load_failure_policy)
        .metrics(metrics);

    RegistryCatalog::global()
        .deploy(model, &builder)
        .with_context(|| format!("failed loading samples for model `{}`", model.model_id))
}

fn parse_kind(value: &str) -> Result<SourceKind, String> {
    SourceKind::parse(value)
        .ok_or_else(|| format!("unknown source kind `{value}` (inline, file, classpath, url)"))
}

fn registry_json(registry: &SampleRegistry) -> serde_json::Value {
    let intents = registry
        .iter()
        .map(|(intent_id, corpus)| {
            json!({
                "intent_id": intent_id,
                "samples": corpus,
            })
        })
        .collect::<Vec<_>>();

    json!({
        "stats": registry.stats(),
        "intents": intents,
        "failures": registry.failures(),
    })
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
