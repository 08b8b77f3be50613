use serde_json::{json, Value};

use crate::intent::IntentId;
use crate::rejection::{Curation, Rejection, RejectionKind};

#[derive(Debug, Clone)]
pub enum MatchOutcome {
    Matched { intent_id: IntentId, payload: Value },
    Rejected(Rejection),
    CurationNeeded(Curation),
}

impl MatchOutcome {
    pub fn matched(intent_id: impl Into<IntentId>) -> Self {
        Self::Matched {
            intent_id: intent_id.into(),
            payload: Value::Null,
        }
    }

    pub fn matched_with(intent_id: impl Into<IntentId>, payload: Value) -> Self {
        Self::Matched {
            intent_id: intent_id.into(),
            payload,
        }
    }

    pub fn from_result(result: Result<(IntentId, Value), Rejection>) -> Self {
        match result {
            Ok((intent_id, payload)) => Self::Matched { intent_id, payload },
            Err(rejection) => rejection.into(),
        }
    }

    pub fn into_result(self) -> Result<(IntentId, Value), Rejection> {
        match self {
            Self::Matched { intent_id, payload } => Ok((intent_id, payload)),
            Self::Rejected(rejection) => Err(rejection),
            Self::CurationNeeded(curation) => Err(curation.into()),
        }
    }

    pub fn intent_id(&self) -> Option<&IntentId> {
        match self {
            Self::Matched { intent_id, .. } => Some(intent_id),
            _ => None,
        }
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Self::Matched { .. } => None,
            Self::Rejected(rejection) => Some(rejection),
            Self::CurationNeeded(curation) => Some(curation.as_rejection()),
        }
    }

    pub fn is_matched(&self) -> bool {
        matches!(self, Self::Matched { .. })
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::Matched { intent_id, payload } => json!({
                "status": "matched",
                "intent_id": intent_id,
                "payload": payload,
            }),
            Self::Rejected(rejection) => rejection_json("rejected", rejection),
            Self::CurationNeeded(curation) => {
                rejection_json("curation_needed", curation.as_rejection())
            }
        }
    }
}

impl From<Rejection> for MatchOutcome {
    fn from(value: Rejection) -> Self {
        match value.kind() {
            RejectionKind::Curation => match Curation::try_from(value) {
                Ok(curation) => Self::CurationNeeded(curation),
                Err(rejection) => Self::Rejected(rejection),
            },
            RejectionKind::Rejection => Self::Rejected(value),
        }
    }
}

impl From<Curation> for MatchOutcome {
    fn from(value: Curation) -> Self {
        Self::CurationNeeded(value)
    }
}

fn rejection_json(status: &str, rejection: &Rejection) -> Value {
    json!({
        "status": status,
        "message": rejection.message(),
        "cause": rejection.cause().map(|cause| cause.to_string()),
    })
}
