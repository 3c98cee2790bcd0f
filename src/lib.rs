#![deny(clippy::uninlined_format_args)]
#![deny(clippy::to_string_in_format_args)]
//! Time and memory harness for string deduplication strategies.
//!
//! A [`BenchmarkDriver`] sweeps each [`Candidate`] over unique and repeated
//! datasets of growing size, measuring every trial with [`measure`] and
//! streaming the results to a [`SeriesSink`] and, once the sweep is done, a
//! [`ReportSink`].

pub mod candidate;
pub mod config;
pub mod driver;
pub mod error;
pub mod format;
pub mod generator;
pub mod hash;
pub mod memory;
pub mod report;
pub mod sampler;
pub mod series;
pub mod sink;

pub use candidate::{Candidate, Strategy};
pub use config::{BenchConfig, TrialPlan};
pub use driver::{BenchmarkDriver, DriverState, RunOutcome};
pub use error::{BenchError, CandidateError, ConfigError, Result};
pub use generator::{generate, token_width, Dataset, InputShape};
pub use memory::{AllocatorProbe, MemoryProbe, ProbeKind, ResidentProbe, TrackingAllocator};
pub use report::{ReportAggregator, ReportRow, ReportTable, Summary};
pub use sampler::{measure, Measurement, MEMORY_SENTINEL};
pub use series::{CandidateId, PairKey, SeriesKind, SeriesPoint};
pub use sink::{
    ConsoleSeriesSink, CsvReportSink, CsvSeriesSink, ReportSink, SeriesSink, TableReportSink,
};
