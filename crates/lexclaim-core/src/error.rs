use thiserror::Error;

/// A candidate violated the `DamageItem` contract.
///
/// These indicate a pattern bug rather than bad input; callers log and drop
/// the candidate instead of aborting the document.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClaimError {
    #[error("amount must be positive, got {0}")]
    NonPositiveAmount(u64),

    #[error("evidence text is empty")]
    EmptyEvidence,

    #[error("evidence does not contain the digits of {amount}: {raw_text}")]
    AmountNotInEvidence { amount: u64, raw_text: String },

    #[error("confidence {0} outside [0, 1]")]
    ConfidenceOutOfRange(f32),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("pattern file not found: {0}")]
    NotFound(std::path::PathBuf),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid pattern {pattern:?}: {source}")]
    Regex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("keyword family {0:?} has no terms")]
    EmptyFamily(String),

    #[error("{name} must be within [0, 1], got {value}")]
    OutOfRange { name: &'static str, value: f32 },
}
