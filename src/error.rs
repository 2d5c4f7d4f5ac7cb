use std::path::PathBuf;

use thiserror::Error;

/// Why a pour between two bottles is not allowed. Variants are listed in the
/// order the rules are evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PourError {
    #[error("bottle index out of range")]
    UnknownBottle,
    #[error("cannot pour a bottle into itself")]
    SameBottle,
    #[error("source bottle is empty")]
    EmptySource,
    #[error("destination bottle is full")]
    DestinationFull,
    #[error("top colors do not match")]
    ColorMismatch,
    #[error("pouring a single-color bottle into an empty one changes nothing")]
    NoOp,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("color count {colors} must be between 1 and {max}")]
    ColorCount { colors: usize, max: usize },
    #[error("bottle count {bottles} must exceed color count {colors} and be at most {max}")]
    BottleCount {
        colors: usize,
        bottles: usize,
        max: usize,
    },
    #[error("level table has no levels")]
    EmptyLevelTable,
}

#[derive(Debug, Error)]
pub enum ProgressError {
    #[error("could not access progress file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("progress file {path} is malformed: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("no data directory available for saving progress")]
    NoDataDir,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("invalid layer symbol {0:?}")]
    InvalidSymbol(char),
    #[error("bottle {index} has {len} slots, expected {expected}")]
    WrongLength {
        index: usize,
        len: usize,
        expected: usize,
    },
}
