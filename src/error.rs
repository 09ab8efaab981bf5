use thiserror::Error;

/// A grammar that cannot be built.
///
/// These come from combinator constructors and mean the grammar itself is
/// malformed. Input that does not match is a [`crate::Failure`] instead.
#[derive(Error, Debug)]
pub enum GrammarError {
    #[error("alternative needs at least one parser")]
    EmptyAlternative,
    #[error("invalid regex /{pattern}/: {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("regex /{pattern}/ has no group {group} (it has {groups})")]
    NoSuchGroup {
        pattern: String,
        group: usize,
        groups: usize,
    },
    #[error("repetition minimum {min} exceeds maximum {max}")]
    InvalidRepetition { min: usize, max: usize },
}

pub type GrammarResult<T> = Result<T, GrammarError>;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
}
