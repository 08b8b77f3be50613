use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::intent::{normalize_sample_line, IntentId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Inline,
    File,
    Classpath,
    Url,
}

impl SourceKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "inline" | "literal" => Some(Self::Inline),
            "file" | "path" => Some(Self::File),
            "classpath" | "resource" => Some(Self::Classpath),
            "url" | "uri" => Some(Self::Url),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Inline => "inline",
            Self::File => "file",
            Self::Classpath => "classpath",
            Self::Url => "url",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// `Ref` leaves the kind to the resolver's search order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SampleSource {
    Inline { samples: Vec<String> },
    File { locator: String },
    Classpath { locator: String },
    Url { locator: String },
    Ref { locator: String },
}

impl SampleSource {
    pub fn kind(&self) -> Option<SourceKind> {
        match self {
            Self::Inline { .. } => Some(SourceKind::Inline),
            Self::File { .. } => Some(SourceKind::File),
            Self::Classpath { .. } => Some(SourceKind::Classpath),
            Self::Url { .. } => Some(SourceKind::Url),
            Self::Ref { .. } => None,
        }
    }

    pub fn locator(&self) -> &str {
        match self {
            Self::Inline { .. } => "<inline>",
            Self::File { locator }
            | Self::Classpath { locator }
            | Self::Url { locator }
            | Self::Ref { locator } => locator,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleSourceRef {
    pub owner_intent_id: IntentId,
    pub source: SampleSource,
}

impl SampleSourceRef {
    pub fn kind(&self) -> Option<SourceKind> {
        self.source.kind()
    }

    pub fn locator(&self) -> &str {
        self.source.locator()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct SampleLine(String);

impl SampleLine {
    pub fn parse(raw: &str) -> Option<Self> {
        normalize_sample_line(raw).map(|line| Self(line.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for SampleLine {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SampleLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct IntentCorpus {
    samples: Vec<SampleLine>,
}

impl IntentCorpus {
    pub const fn empty() -> Self {
        Self {
            samples: Vec::new(),
        }
    }

    // Later duplicates are dropped, the first occurrence keeps its position.
    pub fn from_samples<I>(samples: I) -> Self
    where
        I: IntoIterator<Item = SampleLine>,
    {
        let mut seen = HashSet::new();
        let samples = samples
            .into_iter()
            .filter(|line| seen.insert(line.clone()))
            .collect();
        Self { samples }
    }

    pub fn samples(&self) -> &[SampleLine] {
        &self.samples
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.samples.iter().map(SampleLine::as_str)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn contains(&self, sample: &str) -> bool {
        self.samples.iter().any(|line| line.as_str() == sample)
    }

    pub fn to_strings(&self) -> Vec<String> {
        self.iter().map(ToString::to_string).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentDeclaration {
    pub intent_id: IntentId,
    #[serde(default)]
    pub sources: Vec<SampleSource>,
}

impl IntentDeclaration {
    pub fn new(intent_id: impl Into<IntentId>) -> Self {
        Self {
            intent_id: intent_id.into(),
            sources: Vec::new(),
        }
    }

    pub fn samples<I, S>(mut self, samples: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sources.push(SampleSource::Inline {
            samples: samples.into_iter().map(Into::into).collect(),
        });
        self
    }

    pub fn sample_ref(mut self, locator: impl Into<String>) -> Self {
        self.sources.push(SampleSource::Ref {
            locator: locator.into(),
        });
        self
    }

    pub fn file(mut self, locator: impl Into<String>) -> Self {
        self.sources.push(SampleSource::File {
            locator: locator.into(),
        });
        self
    }

    pub fn resource(mut self, locator: impl Into<String>) -> Self {
        self.sources.push(SampleSource::Classpath {
            locator: locator.into(),
        });
        self
    }

    pub fn url(mut self, locator: impl Into<String>) -> Self {
        self.sources.push(SampleSource::Url {
            locator: locator.into(),
        });
        self
    }

    pub fn source_refs(&self) -> Vec<SampleSourceRef> {
        self.sources
            .iter()
            .map(|source| SampleSourceRef {
                owner_intent_id: self.intent_id.clone(),
                source: source.clone(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDeclaration {
    pub model_id: String,
    #[serde(default)]
    pub intents: Vec<IntentDeclaration>,
}

impl ModelDeclaration {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            intents: Vec::new(),
        }
    }

    pub fn intent(mut self, declaration: IntentDeclaration) -> Self {
        self.intents.push(declaration);
        self
    }
}
