pub mod config;
pub mod error;
pub mod intent;
pub mod models;
pub mod outcome;
pub mod rejection;

pub use config::{CorpusConfig, CurationPolicy, LoadFailurePolicy};
pub use error::{SourceLoadError, SourceLoadErrorKind};
pub use intent::{is_comment_line, normalize_sample_line, normalize_text, IntentId};
pub use models::*;
pub use outcome::MatchOutcome;
pub use rejection::{Curation, Rejection, RejectionCause, RejectionKind};
