use std::error::Error as StdError;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

pub type RejectionCause = Arc<dyn StdError + Send + Sync + 'static>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionKind {
    Rejection,
    Curation,
}

impl fmt::Display for RejectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rejection => f.write_str("rejection"),
            Self::Curation => f.write_str("curation"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct Rejection {
    message: String,
    kind: RejectionKind,
    #[source]
    cause: Option<RejectionCause>,
}

impl Rejection {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: RejectionKind::Rejection,
            cause: None,
        }
    }

    pub fn with_cause(
        message: impl Into<String>,
        cause: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            kind: RejectionKind::Rejection,
            cause: Some(Arc::new(cause)),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> RejectionKind {
        self.kind
    }

    pub fn cause(&self) -> Option<&RejectionCause> {
        self.cause.as_ref()
    }

    pub fn is_curation(&self) -> bool {
        self.kind == RejectionKind::Curation
    }
}

#[derive(Debug, Clone, Error)]
#[error(transparent)]
pub struct Curation(Rejection);

impl Curation {
    pub fn new(message: impl Into<String>) -> Self {
        Self(Rejection {
            message: message.into(),
            kind: RejectionKind::Curation,
            cause: None,
        })
    }

    pub fn with_cause(
        message: impl Into<String>,
        cause: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self(Rejection {
            message: message.into(),
            kind: RejectionKind::Curation,
            cause: Some(Arc::new(cause)),
        })
    }

    pub fn as_rejection(&self) -> &Rejection {
        &self.0
    }
}

impl Deref for Curation {
    type Target = Rejection;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Rejection> for Curation {
    fn as_ref(&self) -> &Rejection {
        &self.0
    }
}

impl From<Curation> for Rejection {
    fn from(value: Curation) -> Self {
        value.0
    }
}

impl TryFrom<Rejection> for Curation {
    type Error = Rejection;

    fn try_from(value: Rejection) -> Result<Self, Self::Error> {
        if value.is_curation() {
            Ok(Self(value))
        } else {
            Err(value)
        }
    }
}
