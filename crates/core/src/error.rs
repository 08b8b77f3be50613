use std::fmt;
use std::io;

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceLoadErrorKind {
    NotFound,
    IoFailure,
    Malformed,
}

impl SourceLoadErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::IoFailure => "io_failure",
            Self::Malformed => "malformed",
        }
    }
}

impl fmt::Display for SourceLoadErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// `locator` is always the one declared, never a resolved path.
#[derive(Debug, Error)]
#[error("{kind} while loading samples from `{locator}`: {detail}")]
pub struct SourceLoadError {
    kind: SourceLoadErrorKind,
    locator: String,
    detail: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl SourceLoadError {
    pub fn new(
        kind: SourceLoadErrorKind,
        locator: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            locator: locator.into(),
            detail: detail.into(),
            source: None,
        }
    }

    pub fn not_found(locator: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(SourceLoadErrorKind::NotFound, locator, detail)
    }

    pub fn io_failure(locator: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(SourceLoadErrorKind::IoFailure, locator, detail)
    }

    pub fn malformed(locator: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(SourceLoadErrorKind::Malformed, locator, detail)
    }

    pub fn from_io(locator: impl Into<String>, err: io::Error) -> Self {
        let kind = match err.kind() {
            io::ErrorKind::NotFound => SourceLoadErrorKind::NotFound,
            io::ErrorKind::InvalidData => SourceLoadErrorKind::Malformed,
            _ => SourceLoadErrorKind::IoFailure,
        };
        Self::new(kind, locator, err.to_string()).with_source(err)
    }

    pub fn with_source(
        mut self,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> SourceLoadErrorKind {
        self.kind
    }

    pub fn locator(&self) -> &str {
        &self.locator
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == SourceLoadErrorKind::NotFound
    }
}
