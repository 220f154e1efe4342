//! Error types for the drill library.
//!
//! Nothing here is fatal to a running game: store errors are logged and the
//! session falls back to a zero baseline, config errors fall back to defaults.

use thiserror::Error;

/// Failure reading or writing persisted best streaks.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed best-streak data: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// A startup configuration that the controller cannot run with.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("at least one level is required")]
    NoLevels,

    #[error("level '{level}' has an empty factor range {lo}..={hi}")]
    EmptyRange { level: String, lo: u32, hi: u32 },

    #[error("level '{level}' has answers up to {largest}, longer than {max_digits} digits")]
    AnswerTooLong {
        level: String,
        largest: u64,
        max_digits: usize,
    },

    #[error("at least one streak time tier is required")]
    NoTiers,

    #[error("streak tiers must be sorted by strictly ascending threshold (at index {index})")]
    UnsortedTiers { index: usize },

    #[error("streak tier at index {index} allots zero seconds")]
    ZeroSeconds { index: usize },

    #[error("tick interval must be positive")]
    ZeroTickInterval,
}
