use std::env;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

const DEFAULT_RESOURCE_ROOT: &str = "resources";
const DEFAULT_URL_TIMEOUT_SECONDS: u64 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadFailurePolicy {
    #[default]
    SkipSource,
    DropIntent,
    FailFast,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurationPolicy {
    #[default]
    Accept,
    Fail,
}

impl CurationPolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "accept" | "allow" | "pass" => Some(Self::Accept),
            "fail" | "deny" => Some(Self::Fail),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusConfig {
    pub resource_roots: Vec<PathBuf>,
    pub base_dir: Option<PathBuf>,
    pub url_timeout: Duration,
    pub load_failure_policy: LoadFailurePolicy,
    pub curation_policy: CurationPolicy,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            resource_roots: vec![PathBuf::from(DEFAULT_RESOURCE_ROOT)],
            base_dir: None,
            url_timeout: Duration::from_secs(DEFAULT_URL_TIMEOUT_SECONDS),
            load_failure_policy: LoadFailurePolicy::SkipSource,
            curation_policy: CurationPolicy::Accept,
        }
    }
}

impl CorpusConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let resource_roots = env::var_os("CORPUS_RESOURCE_PATH")
            .map(|paths| env::split_paths(&paths).collect::<Vec<_>>())
            .filter(|roots| !roots.is_empty())
            .unwrap_or(defaults.resource_roots);

        let base_dir = env::var("CORPUS_BASE_DIR")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        let url_timeout = env::var("CORPUS_URL_TIMEOUT_SECONDS")
            .ok()
            .and_then(|value| value.trim().parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.url_timeout);

        let load_failure_policy = if env_flag("CORPUS_FAIL_FAST") {
            LoadFailurePolicy::FailFast
        } else if env_flag("CORPUS_DROP_PARTIAL_INTENTS") {
            LoadFailurePolicy::DropIntent
        } else {
            defaults.load_failure_policy
        };

        let curation_policy = env::var("CORPUS_CURATION_POLICY")
            .ok()
            .and_then(|value| CurationPolicy::parse(&value))
            .unwrap_or(defaults.curation_policy);

        Self {
            resource_roots,
            base_dir,
            url_timeout,
            load_failure_policy,
            curation_policy,
        }
    }

    pub fn fail_fast(&self) -> bool {
        self.load_failure_policy == LoadFailurePolicy::FailFast
    }
}

fn env_flag(name: &str) -> bool {
    env::var(name)
        .map(|value| {
            matches!(
                value.trim().to_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            )
        })
        .unwrap_or(false)
}
