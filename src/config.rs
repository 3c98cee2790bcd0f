use std::path::PathBuf;
use std::time::Duration;

use crate::candidate::Strategy;
use crate::error::ConfigError;
use crate::generator::token_width;
use crate::memory::ProbeKind;

pub const DEFAULT_UNIT_SIZE: usize = 100_000;
pub const DEFAULT_NUM_UNITS: usize = 100;
pub const DEFAULT_PAUSE_MS: u64 = 10;

pub const UNIT_SIZE_ENV: &str = "DEDUPBENCH_UNIT_SIZE";
pub const NUM_UNITS_ENV: &str = "DEDUPBENCH_NUM_UNITS";
pub const PAUSE_MS_ENV: &str = "DEDUPBENCH_PAUSE_MS";

pub fn usize_env(name: &str, default: usize) -> usize {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

pub fn u64_env(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

/// Sizes and pacing of one run, fixed once the driver is built.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrialPlan {
    pub unit_size: usize,
    pub num_units: usize,
    /// Suspension after every trial.
    pub pause: Duration,
}

impl TrialPlan {
    pub fn new(unit_size: usize, num_units: usize, pause: Duration) -> Result<Self, ConfigError> {
        if unit_size == 0 {
            return Err(ConfigError::ZeroUnitSize);
        }
        if num_units == 0 {
            return Err(ConfigError::ZeroUnitCount);
        }
        if unit_size.checked_mul(num_units).is_none() {
            return Err(ConfigError::SizeOverflow {
                unit_size,
                num_units,
            });
        }
        Ok(Self {
            unit_size,
            num_units,
            pause,
        })
    }

    /// Dataset length of the 1-based `trial`.
    pub fn trial_size(&self, trial: usize) -> usize {
        self.unit_size * trial
    }

    pub fn trial_sizes(&self) -> Vec<usize> {
        (1..=self.num_units).map(|t| self.trial_size(t)).collect()
    }

    pub fn max_size(&self) -> usize {
        self.trial_size(self.num_units)
    }

    pub fn token_width(&self) -> usize {
        token_width(self.max_size())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct BenchConfig {
    pub unit_size: usize,
    pub num_units: usize,
    pub pause: Duration,
    pub probe: ProbeKind,
    pub strategies: Vec<Strategy>,
    /// Directory for CSV output, if any.
    pub output_dir: Option<PathBuf>,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            unit_size: DEFAULT_UNIT_SIZE,
            num_units: DEFAULT_NUM_UNITS,
            pause: Duration::from_millis(DEFAULT_PAUSE_MS),
            probe: ProbeKind::default(),
            strategies: Strategy::ALL.to_vec(),
            output_dir: None,
        }
    }
}

impl BenchConfig {
    /// Defaults overridden by `DEDUPBENCH_*` environment variables.
    pub fn from_env() -> Self {
        Self {
            unit_size: usize_env(UNIT_SIZE_ENV, DEFAULT_UNIT_SIZE),
            num_units: usize_env(NUM_UNITS_ENV, DEFAULT_NUM_UNITS),
            pause: Duration::from_millis(u64_env(PAUSE_MS_ENV, DEFAULT_PAUSE_MS)),
            ..Self::default()
        }
    }

    /// Replace the strategy list with names given on the command line.
    pub fn select_strategies<S: AsRef<str>>(&mut self, names: &[S]) -> Result<(), ConfigError> {
        if names.is_empty() {
            return Ok(());
        }
        let mut picked = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            let strategy = Strategy::from_name(name)
                .ok_or_else(|| ConfigError::UnknownStrategy(name.to_owned()))?;
            if !picked.contains(&strategy) {
                picked.push(strategy);
            }
        }
        // keep the declared order regardless of flag order
        picked.sort_by_key(|s| Strategy::ALL.iter().position(|a| a == s));
        self.strategies = picked;
        Ok(())
    }

    pub fn plan(&self) -> Result<TrialPlan, ConfigError> {
        if self.strategies.is_empty() {
            return Err(ConfigError::NoStrategies);
        }
        TrialPlan::new(self.unit_size, self.num_units, self.pause)
    }
}
