use std::collections::TryReserveError;

use thiserror::Error;

use crate::series::PairKey;

/// Failure raised by a candidate while it deduplicates a dataset.
#[derive(Debug, Error)]
pub enum CandidateError {
    #[error("could not reserve {requested} slots: {source}")]
    Allocation {
        requested: usize,
        #[source]
        source: TryReserveError,
    },
    #[error("{0}")]
    Failed(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unit size must be at least 1")]
    ZeroUnitSize,
    #[error("unit count must be at least 1")]
    ZeroUnitCount,
    #[error("largest trial size {unit_size} x {num_units} overflows usize")]
    SizeOverflow { unit_size: usize, num_units: usize },
    #[error("no strategies selected")]
    NoStrategies,
    #[error("unknown strategy {0:?}")]
    UnknownStrategy(String),
}

#[derive(Debug, Error)]
pub enum BenchError {
    #[error("{pair} failed on trial {trial}: {source}")]
    Candidate {
        pair: PairKey,
        trial: usize,
        #[source]
        source: CandidateError,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Convenient result type used throughout the crate.
pub type Result<T> = std::result::Result<T, BenchError>;
