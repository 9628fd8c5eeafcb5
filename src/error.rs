use thiserror::Error;

/// Outcomes of a scoring request that are not a number.
///
/// Only `InsufficientData` ever reaches a caller of the scorer; the
/// per-indicator variants are absorbed (logged and skipped) inside the engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScoreError {
    #[error("no observations for indicator {0}")]
    NoObservations(String),

    #[error("insufficient data: no weighted indicator has an observation for this period")]
    InsufficientData,

    #[error("indicator {0} has a constant series; scaled values fall back to 0")]
    DegenerateRange(String),

    #[error("invalid period {year}-{month:02}: month must be 1-12")]
    InvalidPeriod { year: i32, month: u32 },

    #[error("a month was given without a year")]
    MonthWithoutYear,
}

/// Errors raised while loading observation files.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("observation path not found: {0}")]
    NotFound(String),

    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse observations in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("cannot derive an indicator code from file name {0}")]
    Code(String),
}
